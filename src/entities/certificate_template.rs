//! Certificate templates available for issuance

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    #[serde(rename = "custom")]
    Custom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificateTemplate {
    pub id: Uuid,
    #[serde(default)]
    pub school_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub template_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub layout_config: Option<Value>,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub custom_width_mm: Option<f64>,
    #[serde(default)]
    pub custom_height_mm: Option<f64>,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl CertificateTemplate {
    /// Templates without a school are shared by every school.
    pub fn applies_to_school(&self, school_id: Uuid) -> bool {
        self.school_id.is_none_or(|s| s == school_id)
    }
}
