use anyhow::Context;
use std::sync::Arc;

use crate::api::{GraduationApi, HttpGraduationApi};
use crate::config::Config;
use crate::in_flight::InFlight;
use crate::repositories::{BatchRepository, CertificateRepository, TemplateRepository};
use crate::school::SchoolContext;

/// Repositories sharing one API client and one in-flight registry
pub struct ConsoleApp {
    pub batches: BatchRepository,
    pub certificates: CertificateRepository,
    pub templates: TemplateRepository,
    pub school: SchoolContext,
}

impl ConsoleApp {
    pub fn new(api: Arc<dyn GraduationApi>, school: SchoolContext) -> Self {
        let in_flight = InFlight::new();
        Self {
            batches: BatchRepository::new(api.clone(), in_flight.clone()),
            certificates: CertificateRepository::new(api.clone(), in_flight),
            templates: TemplateRepository::new(api),
            school,
        }
    }
}

pub fn create_app(config: &Config) -> anyhow::Result<ConsoleApp> {
    let api = HttpGraduationApi::from_config(config).context("Failed to build API client")?;
    tracing::debug!(api_url = %api.base_url(), "API client ready");

    Ok(ConsoleApp::new(Arc::new(api), config.school_context()))
}
