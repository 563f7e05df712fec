use std::sync::Arc;
use uuid::Uuid;

use crate::api::GraduationApi;
use crate::api::dto::{TemplateFilters, TemplatePayload};
use crate::config::GRADUATION_TEMPLATE_TYPE;
use crate::entities::{CertificateTemplate, GraduationBatch};
use crate::error::{GraduationError, Result};
use crate::validation::ValidationErrors;

pub struct TemplateRepository {
    api: Arc<dyn GraduationApi>,
}

impl TemplateRepository {
    pub fn new(api: Arc<dyn GraduationApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &TemplateFilters) -> Result<Vec<CertificateTemplate>> {
        Ok(self.api.list_templates(filters).await?)
    }

    /// Graduation templates usable by the batch's school, shared ones included
    pub async fn list_for_batch(&self, batch: &GraduationBatch) -> Result<Vec<CertificateTemplate>> {
        let filters = TemplateFilters {
            template_type: Some(GRADUATION_TEMPLATE_TYPE.to_string()),
            school_id: Some(batch.school_id),
        };
        let templates = self.api.list_templates(&filters).await?;

        Ok(templates
            .into_iter()
            .filter(|t| t.applies_to_school(batch.school_id))
            .collect())
    }

    /// Template that must back an issuance: listed for the batch and active.
    pub async fn find_usable(
        &self,
        batch: &GraduationBatch,
        template_id: Uuid,
    ) -> Result<CertificateTemplate> {
        self.list_for_batch(batch)
            .await?
            .into_iter()
            .find(|t| t.id == template_id && t.is_active)
            .ok_or(GraduationError::TemplateUnavailable(template_id))
    }

    pub async fn create(&self, payload: &TemplatePayload) -> Result<CertificateTemplate> {
        let mut errors = ValidationErrors::new();
        if payload.template_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
            errors.add("type", "is required");
        }
        if payload.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            errors.add("title", "is required");
        }
        errors.into_result(())?;

        let template = self.api.create_template(payload).await?;
        tracing::info!(template_id = %template.id, "certificate template created");
        Ok(template)
    }

    pub async fn update(&self, id: Uuid, payload: &TemplatePayload) -> Result<CertificateTemplate> {
        Ok(self.api.update_template(id, payload).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api.delete_template(id).await?;
        tracing::info!(template_id = %id, "certificate template deleted");
        Ok(())
    }
}

/// Preselected template for a school: its own active template first, then
/// the first active shared one.
pub fn select_default(
    templates: &[CertificateTemplate],
    school_id: Uuid,
) -> Option<&CertificateTemplate> {
    templates
        .iter()
        .find(|t| t.is_active && t.school_id == Some(school_id))
        .or_else(|| {
            templates
                .iter()
                .find(|t| t.is_active && t.applies_to_school(school_id))
        })
}
