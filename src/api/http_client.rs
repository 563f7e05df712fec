use async_trait::async_trait;
use http::{Method, header};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use super::dto::{
    BatchFilters, CertificateFile, CertificateFilters, CreateBatchRequest,
    IssueCertificatesRequest, RevokeCertificateRequest, SchoolScope, ScopedUpdate,
    TemplateFilters, TemplatePayload, UpdateBatchRequest,
};
use super::{ApiError, GraduationApi};
use crate::config::Config;
use crate::entities::{BatchStudent, CertificateTemplate, GraduationBatch, IssuedCertificate};

/// reqwest client for the school backend's JSON API
#[derive(Debug, Clone)]
pub struct HttpGraduationApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGraduationApi {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Decode(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            config.api_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_accepting(method, path, "application/json")
    }

    fn request_accepting(&self, method: Method, path: &str, accept: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut req = self.client.request(method, url).header(header::ACCEPT, accept);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req.send().await.map_err(|source| ApiError::Network {
            base_url: self.base_url.clone(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        tracing::warn!(status = status.as_u16(), "API request failed: {}", err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// For endpoints answering 204 or a body the console does not need
    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.send(req).await.map(|_| ())
    }
}

/// Extracts `filename=` from a Content-Disposition header value.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let name = rest
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    (!name.is_empty()).then(|| name.to_string())
}

#[async_trait]
impl GraduationApi for HttpGraduationApi {
    async fn list_batches(&self, filters: &BatchFilters) -> Result<Vec<GraduationBatch>, ApiError> {
        self.send_json(self.request(Method::GET, "/graduation/batches").query(filters))
            .await
    }

    async fn get_batch(&self, id: Uuid, school_id: Option<Uuid>) -> Result<GraduationBatch, ApiError> {
        let req = self
            .request(Method::GET, &format!("/graduation/batches/{id}"))
            .query(&SchoolScope::new(school_id));
        self.send_json(req).await
    }

    async fn create_batch(&self, payload: &CreateBatchRequest) -> Result<GraduationBatch, ApiError> {
        self.send_json(self.request(Method::POST, "/graduation/batches").json(payload))
            .await
    }

    async fn update_batch(
        &self,
        id: Uuid,
        payload: &UpdateBatchRequest,
        school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/graduation/batches/{id}"))
            .json(&ScopedUpdate { payload, school_id });
        self.send_json(req).await
    }

    async fn delete_batch(&self, id: Uuid, school_id: Option<Uuid>) -> Result<(), ApiError> {
        let req = self
            .request(Method::DELETE, &format!("/graduation/batches/{id}"))
            .query(&SchoolScope::new(school_id));
        self.send_empty(req).await
    }

    async fn generate_students(
        &self,
        batch_id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<Vec<BatchStudent>, ApiError> {
        let req = self
            .request(
                Method::POST,
                &format!("/graduation/batches/{batch_id}/generate-students"),
            )
            .json(&SchoolScope::new(school_id));
        self.send_json(req).await
    }

    async fn approve_batch(
        &self,
        batch_id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError> {
        let req = self
            .request(Method::POST, &format!("/graduation/batches/{batch_id}/approve"))
            .json(&SchoolScope::new(school_id));
        self.send_json(req).await
    }

    async fn issue_certificates(
        &self,
        batch_id: Uuid,
        request: &IssueCertificatesRequest,
    ) -> Result<Vec<IssuedCertificate>, ApiError> {
        let req = self
            .request(
                Method::POST,
                &format!("/graduation/batches/{batch_id}/issue-certificates"),
            )
            .json(request);
        self.send_json(req).await
    }

    async fn list_issued_certificates(
        &self,
        filters: &CertificateFilters,
    ) -> Result<Vec<IssuedCertificate>, ApiError> {
        self.send_json(self.request(Method::GET, "/certificates/issued").query(filters))
            .await
    }

    async fn get_issued_certificate(
        &self,
        id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<IssuedCertificate, ApiError> {
        let req = self
            .request(Method::GET, &format!("/certificates/issued/{id}"))
            .query(&SchoolScope::new(school_id));
        self.send_json(req).await
    }

    async fn download_certificate_pdf(
        &self,
        id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<CertificateFile, ApiError> {
        let req = self
            .request_accepting(Method::GET, &format!("/certificates/issued/{id}/pdf"), "*/*")
            .query(&SchoolScope::new(school_id));
        let response = self.send(req).await?;

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(CertificateFile { bytes, filename })
    }

    async fn revoke_certificate(
        &self,
        id: Uuid,
        request: &RevokeCertificateRequest,
    ) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, &format!("/certificates/issued/{id}/revoke"))
            .json(request);
        self.send_empty(req).await
    }

    async fn list_templates(
        &self,
        filters: &TemplateFilters,
    ) -> Result<Vec<CertificateTemplate>, ApiError> {
        self.send_json(self.request(Method::GET, "/certificates/templates").query(filters))
            .await
    }

    async fn create_template(&self, payload: &TemplatePayload) -> Result<CertificateTemplate, ApiError> {
        self.send_json(self.request(Method::POST, "/certificates/templates").json(payload))
            .await
    }

    async fn update_template(
        &self,
        id: Uuid,
        payload: &TemplatePayload,
    ) -> Result<CertificateTemplate, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/certificates/templates/{id}"))
            .json(payload);
        self.send_json(req).await
    }

    async fn delete_template(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/certificates/templates/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="NZM-GRADUATION-2025-0001.pdf""#),
            Some("NZM-GRADUATION-2025-0001.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=cert.pdf; size=10"),
            Some("cert.pdf".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpGraduationApi::new("http://localhost:8000/api/", None, Duration::from_secs(5))
            .unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000/api");
    }
}
