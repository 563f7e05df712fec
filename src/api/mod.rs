//! Backend API consumed by the console.
//!
//! The backend owns persistence, eligibility evaluation, continuation of
//! certificate numbering and PDF rendering. This module only describes the
//! calls made to it.

pub mod dto;
pub mod http_client;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{BatchStudent, CertificateTemplate, GraduationBatch, IssuedCertificate};
use dto::{
    BatchFilters, CertificateFile, CertificateFilters, CreateBatchRequest,
    IssueCertificatesRequest, RevokeCertificateRequest, TemplateFilters, TemplatePayload,
    UpdateBatchRequest,
};

pub use http_client::HttpGraduationApi;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success response with the message the backend reported
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("network error: unable to connect to API server at {base_url}: {source}")]
    Network {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from API server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a failed response from its JSON body. The message
    /// comes from `message`, then `error`; validation responses (400/422) get
    /// their field details appended.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut message = field("message")
            .or_else(|| field("error"))
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) {
            let details = parsed
                .as_ref()
                .and_then(|v| v.get("details").or_else(|| v.get("errors")))
                .and_then(Value::as_object)
                .map(|map| {
                    map.iter()
                        .map(|(key, messages)| format!("{key}: {}", join_messages(messages)))
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .filter(|d| !d.is_empty());
            if let Some(details) = details {
                message = format!("{message} - {details}");
            }
        }

        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// The backend could not tell which school the request was for.
    pub fn needs_school_selection(&self) -> bool {
        match self {
            ApiError::Status { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("school") || lower.contains("no default")
            }
            _ => false,
        }
    }
}

fn join_messages(messages: &Value) -> String {
    match messages {
        Value::Array(items) => items
            .iter()
            .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Batch, certificate and template endpoints of the school backend.
#[async_trait]
pub trait GraduationApi: Send + Sync {
    async fn list_batches(&self, filters: &BatchFilters) -> Result<Vec<GraduationBatch>, ApiError>;

    async fn get_batch(&self, id: Uuid, school_id: Option<Uuid>) -> Result<GraduationBatch, ApiError>;

    async fn create_batch(&self, payload: &CreateBatchRequest) -> Result<GraduationBatch, ApiError>;

    async fn update_batch(
        &self,
        id: Uuid,
        payload: &UpdateBatchRequest,
        school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError>;

    async fn delete_batch(&self, id: Uuid, school_id: Option<Uuid>) -> Result<(), ApiError>;

    /// Replaces the batch roster with a freshly evaluated one.
    async fn generate_students(
        &self,
        batch_id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<Vec<BatchStudent>, ApiError>;

    async fn approve_batch(
        &self,
        batch_id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError>;

    /// Issues certificates for every passing student in one atomic call.
    async fn issue_certificates(
        &self,
        batch_id: Uuid,
        request: &IssueCertificatesRequest,
    ) -> Result<Vec<IssuedCertificate>, ApiError>;

    async fn list_issued_certificates(
        &self,
        filters: &CertificateFilters,
    ) -> Result<Vec<IssuedCertificate>, ApiError>;

    async fn get_issued_certificate(
        &self,
        id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<IssuedCertificate, ApiError>;

    async fn download_certificate_pdf(
        &self,
        id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<CertificateFile, ApiError>;

    async fn revoke_certificate(
        &self,
        id: Uuid,
        request: &RevokeCertificateRequest,
    ) -> Result<(), ApiError>;

    async fn list_templates(
        &self,
        filters: &TemplateFilters,
    ) -> Result<Vec<CertificateTemplate>, ApiError>;

    async fn create_template(&self, payload: &TemplatePayload) -> Result<CertificateTemplate, ApiError>;

    async fn update_template(
        &self,
        id: Uuid,
        payload: &TemplatePayload,
    ) -> Result<CertificateTemplate, ApiError>;

    async fn delete_template(&self, id: Uuid) -> Result<(), ApiError>;
}
