use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::entities::{GraduationType, PageSize};
use crate::numbering::CertificateNumberConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
}

impl SchoolScope {
    pub fn new(school_id: Option<Uuid>) -> Self {
        Self { school_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    pub school_id: Uuid,
    pub academic_year_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_class_id: Option<Uuid>,
    pub exam_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exam_weights: BTreeMap<Uuid, f64>,
    pub graduation_date: NaiveDate,
    pub graduation_type: GraduationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_attendance_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_attendance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_approved_leaves: Option<bool>,
}

impl CreateBatchRequest {
    /// The backend always reads the roster from `class_id`; promotion and
    /// transfer batches send their source class there.
    pub fn normalized(mut self) -> Self {
        if self.class_id.is_none() && self.graduation_type.needs_class_pair() {
            self.class_id = self.from_class_id;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_ids: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_weights: Option<BTreeMap<Uuid, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_type: Option<GraduationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_attendance_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_attendance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_approved_leaves: Option<bool>,
}

/// Update body; the backend expects the school next to the batch fields.
#[derive(Debug, Serialize)]
pub(crate) struct ScopedUpdate<'a> {
    #[serde(flatten)]
    pub payload: &'a UpdateBatchRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
}

/// One request issues the whole batch. Numbering fields are only present
/// when the operator typed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCertificatesRequest {
    pub template_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<usize>,
}

impl IssueCertificatesRequest {
    pub fn new(template_id: Uuid, school_id: Option<Uuid>, config: &CertificateNumberConfig) -> Self {
        Self {
            template_id,
            school_id,
            starting_number: config.starting_number.explicit().map(|n| n.get()),
            prefix: config.prefix.explicit().cloned(),
            certificate_type: config.certificate_type.explicit().cloned(),
            padding: config.padding.explicit().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeCertificateRequest {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFilters {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Uuid>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Mirrors `title`; the backend requires both
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_width_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_height_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl TemplatePayload {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.name = Some(title.clone());
        self.title = Some(title);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateFile {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

impl CertificateFile {
    pub const DEFAULT_NAME: &'static str = "certificate.pdf";

    /// Name safe to write into a local directory
    pub fn safe_file_name(&self) -> String {
        let name = self
            .filename
            .as_deref()
            .map(sanitize_filename::sanitize)
            .unwrap_or_default();
        if name.trim().is_empty() {
            Self::DEFAULT_NAME.to_string()
        } else {
            name
        }
    }
}
