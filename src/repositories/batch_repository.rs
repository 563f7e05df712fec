use std::sync::Arc;
use uuid::Uuid;

use super::TemplateRepository;
use crate::api::GraduationApi;
use crate::api::dto::{BatchFilters, CreateBatchRequest, IssueCertificatesRequest, UpdateBatchRequest};
use crate::entities::{BatchStudent, GraduationBatch, IssuedCertificate};
use crate::error::{GraduationError, Result};
use crate::in_flight::{InFlight, Operation};
use crate::lifecycle::{self, BatchAction};
use crate::numbering::{self, CertificateNumberConfig, NumberPreview};
use crate::school::SchoolContext;
use crate::validation::{validate_create_batch, validate_update_batch};

/// Graduation batch workflow: configure, generate the roster, approve, issue.
pub struct BatchRepository {
    api: Arc<dyn GraduationApi>,
    templates: TemplateRepository,
    in_flight: InFlight,
}

impl BatchRepository {
    pub fn new(api: Arc<dyn GraduationApi>, in_flight: InFlight) -> Self {
        Self {
            templates: TemplateRepository::new(api.clone()),
            api,
            in_flight,
        }
    }

    /// List batches of the resolved school
    pub async fn list(
        &self,
        school: &SchoolContext,
        mut filters: BatchFilters,
    ) -> Result<Vec<GraduationBatch>> {
        if filters.school_id.is_none() {
            filters.school_id = Some(school.require_for_listing()?);
        }
        Ok(self.api.list_batches(&filters).await?)
    }

    pub async fn get(&self, id: Uuid, school: &SchoolContext) -> Result<GraduationBatch> {
        Ok(self.api.get_batch(id, school.resolve(None)).await?)
    }

    pub async fn create(&self, request: CreateBatchRequest) -> Result<GraduationBatch> {
        validate_create_batch(&request)?;

        let batch = self.api.create_batch(&request.normalized()).await?;
        tracing::info!(batch_id = %batch.id, graduation_type = %batch.graduation_type, "graduation batch created");
        Ok(batch)
    }

    /// Only draft batches can be edited.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateBatchRequest,
        school: &SchoolContext,
    ) -> Result<GraduationBatch> {
        let batch = self.get(id, school).await?;
        lifecycle::check(&batch, BatchAction::Modify)?;
        validate_update_batch(&batch, request)?;

        let updated = self
            .api
            .update_batch(id, request, Some(batch.school_id))
            .await?;
        tracing::info!(batch_id = %id, "graduation batch updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, school: &SchoolContext) -> Result<()> {
        let batch = self.get(id, school).await?;
        lifecycle::check(&batch, BatchAction::Modify)?;

        self.api.delete_batch(id, Some(batch.school_id)).await?;
        tracing::info!(batch_id = %id, "graduation batch deleted");
        Ok(())
    }

    /// Evaluates eligibility again and replaces the whole roster.
    pub async fn generate_students(
        &self,
        id: Uuid,
        school: &SchoolContext,
    ) -> Result<Vec<BatchStudent>> {
        let batch = self.get(id, school).await?;
        lifecycle::check(&batch, BatchAction::GenerateStudents)?;
        let _ticket = self.in_flight.begin(Operation::GenerateStudents, id)?;

        let roster = self
            .api
            .generate_students(id, Some(batch.school_id))
            .await?;
        tracing::info!(
            batch_id = %id,
            previous = batch.students.len(),
            generated = roster.len(),
            "graduation roster regenerated"
        );
        Ok(roster)
    }

    pub async fn approve(&self, id: Uuid, school: &SchoolContext) -> Result<GraduationBatch> {
        let batch = self.get(id, school).await?;
        lifecycle::check(&batch, BatchAction::Approve)?;
        let _ticket = self.in_flight.begin(Operation::ApproveBatch, id)?;

        let approved = self.api.approve_batch(id, Some(batch.school_id)).await?;
        tracing::info!(batch_id = %id, students = batch.students.len(), "graduation batch approved");
        Ok(approved)
    }

    /// Numbers the operator will see before confirming issuance
    pub fn preview_numbers(
        &self,
        batch: &GraduationBatch,
        config: &CertificateNumberConfig,
    ) -> Result<NumberPreview> {
        config.validate()?;
        Ok(numbering::preview_numbers(
            batch.graduation_date,
            batch.pass_count(),
            config,
        )?)
    }

    /// Issues one certificate per passing student with a single request.
    ///
    /// The backend issues all of them or none. A response whose size does not
    /// match the number of passing students is reported as an error rather
    /// than accepted.
    pub async fn issue_certificates(
        &self,
        id: Uuid,
        template_id: Uuid,
        config: &CertificateNumberConfig,
        school: &SchoolContext,
    ) -> Result<Vec<IssuedCertificate>> {
        config.validate()?;
        let batch = self.get(id, school).await?;
        lifecycle::check(&batch, BatchAction::IssueCertificates)?;
        let expected = batch.pass_count();
        if let Some(start) = config.starting_number.explicit() {
            numbering::last_sequence(start.get(), expected)?;
        }
        self.templates.find_usable(&batch, template_id).await?;

        let _ticket = self.in_flight.begin(Operation::IssueCertificates, id)?;
        let request = IssueCertificatesRequest::new(template_id, Some(batch.school_id), config);

        let issued = self.api.issue_certificates(id, &request).await?;
        if issued.len() != expected {
            tracing::error!(
                batch_id = %id,
                expected,
                issued = issued.len(),
                "certificate count does not match passing students"
            );
            return Err(GraduationError::IssuanceMismatch {
                expected,
                issued: issued.len(),
            });
        }

        tracing::info!(
            batch_id = %id,
            template_id = %template_id,
            count = issued.len(),
            first = issued.first().map(|c| c.certificate_no.as_str()).unwrap_or_default(),
            "certificates issued"
        );
        Ok(issued)
    }
}
