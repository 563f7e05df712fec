use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{CertificateFile, CertificateFilters, RevokeCertificateRequest};
use crate::api::{ApiError, GraduationApi};
use crate::entities::IssuedCertificate;
use crate::error::{GraduationError, Result};
use crate::in_flight::{InFlight, Operation};
use crate::school::{SchoolContext, SchoolSelectionRequired};
use crate::validation::validate_revoke_reason;

pub struct CertificateRepository {
    api: Arc<dyn GraduationApi>,
    in_flight: InFlight,
}

impl CertificateRepository {
    pub fn new(api: Arc<dyn GraduationApi>, in_flight: InFlight) -> Self {
        Self { api, in_flight }
    }

    /// Issued certificates of the resolved school
    pub async fn list(
        &self,
        school: &SchoolContext,
        mut filters: CertificateFilters,
    ) -> Result<Vec<IssuedCertificate>> {
        if filters.school_id.is_none() {
            filters.school_id = Some(school.require_for_listing()?);
        }
        Ok(self.api.list_issued_certificates(&filters).await?)
    }

    pub async fn get(&self, id: Uuid, school: &SchoolContext) -> Result<IssuedCertificate> {
        Ok(self.api.get_issued_certificate(id, school.resolve(None)).await?)
    }

    /// Fetches the rendered PDF. `record_school` is the certificate's own
    /// school when the caller already has the record.
    pub async fn download(
        &self,
        id: Uuid,
        record_school: Option<Uuid>,
        school: &SchoolContext,
    ) -> Result<CertificateFile> {
        let school_id = school.for_mutation(record_school)?;
        self.api
            .download_certificate_pdf(id, school_id)
            .await
            .map_err(|e| with_school_guidance(e, school))
    }

    /// Revokes a certificate for good. The reason is required, and a
    /// certificate that is already revoked is refused.
    pub async fn revoke(&self, id: Uuid, reason: &str, school: &SchoolContext) -> Result<()> {
        let reason = validate_revoke_reason(reason)?;

        let certificate = self.get(id, school).await?;
        if !certificate.is_valid() {
            return Err(GraduationError::AlreadyRevoked {
                certificate_no: certificate.certificate_no,
            });
        }
        let school_id = school.for_mutation(certificate.school_id)?;
        let _ticket = self.in_flight.begin(Operation::RevokeCertificate, id)?;

        let request = RevokeCertificateRequest { reason, school_id };
        self.api
            .revoke_certificate(id, &request)
            .await
            .map_err(|e| with_school_guidance(e, school))?;

        tracing::info!(
            certificate_id = %id,
            certificate_no = %certificate.certificate_no,
            "certificate revoked"
        );
        Ok(())
    }
}

/// School ambiguity reported by the backend becomes an actionable hint.
fn with_school_guidance(err: ApiError, school: &SchoolContext) -> GraduationError {
    if err.needs_school_selection() {
        GraduationError::SchoolSelection(SchoolSelectionRequired {
            guidance: format!("{} (server said: {})", school.guidance(), err),
        })
    } else {
        GraduationError::Api(err)
    }
}
