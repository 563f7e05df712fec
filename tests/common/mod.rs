#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use http::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use graduation_console::api::dto::{
    BatchFilters, CertificateFile, CertificateFilters, CreateBatchRequest,
    IssueCertificatesRequest, RevokeCertificateRequest, TemplateFilters, TemplatePayload,
    UpdateBatchRequest,
};
use graduation_console::api::{ApiError, GraduationApi};
use graduation_console::app::ConsoleApp;
use graduation_console::config::{
    DEFAULT_CERTIFICATE_PREFIX, DEFAULT_CERTIFICATE_TYPE, DEFAULT_NUMBER_PADDING,
};
use graduation_console::entities::{
    BatchExam, BatchStatus, BatchStudent, CertificateTemplate, GraduationBatch, GraduationType,
    IssuedCertificate, PageSize, ResultStatus,
};
use graduation_console::numbering::NumberSequence;
use graduation_console::school::SchoolContext;

#[derive(Default)]
pub struct FakeState {
    pub batches: HashMap<Uuid, GraduationBatch>,
    pub certificates: Vec<IssuedCertificate>,
    pub templates: Vec<CertificateTemplate>,
    /// Roster handed out by the next generate-students call
    pub next_roster: Vec<BatchStudent>,
    /// Last number issued per (prefix, type, year)
    pub last_numbers: HashMap<(String, String, i32), u64>,
    /// Drop this many certificates from the issue response
    pub short_issue_by: usize,
    pub calls: Vec<String>,
}

/// In-memory backend keeping just enough state for the workflow.
#[derive(Clone, Default)]
pub struct FakeApi {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn insert_batch(&self, batch: GraduationBatch) {
        self.state().batches.insert(batch.id, batch);
    }

    pub fn insert_template(&self, template: CertificateTemplate) {
        self.state().templates.push(template);
    }

    pub fn batch(&self, id: Uuid) -> GraduationBatch {
        self.state().batches[&id].clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl GraduationApi for FakeApi {
    async fn list_batches(&self, filters: &BatchFilters) -> Result<Vec<GraduationBatch>, ApiError> {
        self.record("list_batches");
        let state = self.state();
        Ok(state
            .batches
            .values()
            .filter(|b| filters.school_id.is_none_or(|s| s == b.school_id))
            .cloned()
            .collect())
    }

    async fn get_batch(&self, id: Uuid, _school_id: Option<Uuid>) -> Result<GraduationBatch, ApiError> {
        self.state()
            .batches
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("batch"))
    }

    async fn create_batch(&self, payload: &CreateBatchRequest) -> Result<GraduationBatch, ApiError> {
        self.record("create_batch");
        let batch = GraduationBatch {
            id: Uuid::new_v4(),
            organization_id: None,
            school_id: payload.school_id,
            academic_year_id: payload.academic_year_id,
            class_id: payload.class_id,
            from_class_id: payload.from_class_id,
            to_class_id: payload.to_class_id,
            graduation_type: payload.graduation_type,
            exams: payload
                .exam_ids
                .iter()
                .map(|id| BatchExam {
                    exam_id: *id,
                    weight_percentage: payload.exam_weights.get(id).copied(),
                })
                .collect(),
            graduation_date: Some(payload.graduation_date),
            status: BatchStatus::Draft,
            require_attendance: payload.require_attendance.unwrap_or(true),
            min_attendance_percentage: payload.min_attendance_percentage.unwrap_or(75.0),
            exclude_approved_leaves: payload.exclude_approved_leaves.unwrap_or(true),
            students: vec![],
            approved_at: None,
            created_at: Some(Utc::now()),
        };
        self.insert_batch(batch.clone());
        Ok(batch)
    }

    async fn update_batch(
        &self,
        id: Uuid,
        payload: &UpdateBatchRequest,
        _school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError> {
        self.record("update_batch");
        let mut state = self.state();
        let batch = state.batches.get_mut(&id).ok_or_else(|| not_found("batch"))?;
        if let Some(date) = payload.graduation_date {
            batch.graduation_date = Some(date);
        }
        if let Some(graduation_type) = payload.graduation_type {
            batch.graduation_type = graduation_type;
        }
        if let Some(required) = payload.require_attendance {
            batch.require_attendance = required;
        }
        Ok(batch.clone())
    }

    async fn delete_batch(&self, id: Uuid, _school_id: Option<Uuid>) -> Result<(), ApiError> {
        self.record("delete_batch");
        self.state()
            .batches
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("batch"))
    }

    async fn generate_students(
        &self,
        batch_id: Uuid,
        _school_id: Option<Uuid>,
    ) -> Result<Vec<BatchStudent>, ApiError> {
        self.record("generate_students");
        let mut state = self.state();
        let roster = state.next_roster.clone();
        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| not_found("batch"))?;
        batch.students = roster.clone();
        Ok(roster)
    }

    async fn approve_batch(
        &self,
        batch_id: Uuid,
        _school_id: Option<Uuid>,
    ) -> Result<GraduationBatch, ApiError> {
        self.record("approve_batch");
        let mut state = self.state();
        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| not_found("batch"))?;
        batch.status = BatchStatus::Approved;
        batch.approved_at = Some(Utc::now());
        Ok(batch.clone())
    }

    async fn issue_certificates(
        &self,
        batch_id: Uuid,
        request: &IssueCertificatesRequest,
    ) -> Result<Vec<IssuedCertificate>, ApiError> {
        self.record("issue_certificates");
        let mut guard = self.state();
        let state = &mut *guard;
        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| not_found("batch"))?;
        let year = batch.graduation_date.map(|d| chrono::Datelike::year(&d)).unwrap_or(0);

        let prefix = request
            .prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_CERTIFICATE_PREFIX.to_string());
        let certificate_type = request
            .certificate_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CERTIFICATE_TYPE.to_string());
        let padding = request.padding.unwrap_or(DEFAULT_NUMBER_PADDING);
        let key = (prefix.clone(), certificate_type.clone(), year);
        let start = request
            .starting_number
            .unwrap_or_else(|| state.last_numbers.get(&key).copied().unwrap_or(0) + 1);

        let passing: Vec<Uuid> = batch.passing_students().map(|s| s.student_id).collect();
        let numbers = NumberSequence::new(&prefix, &certificate_type, year, start, padding);
        let issued: Vec<IssuedCertificate> = passing
            .iter()
            .zip(numbers)
            .map(|(student_id, certificate_no)| IssuedCertificate {
                id: Uuid::new_v4(),
                certificate_no,
                student_id: *student_id,
                batch_id,
                template_id: request.template_id,
                school_id: Some(batch.school_id),
                verification_hash: Uuid::new_v4().simple().to_string(),
                issued_at: Utc::now(),
                revoked_at: None,
                revoke_reason: None,
            })
            .collect();

        batch.status = BatchStatus::Issued;
        if !passing.is_empty() {
            state
                .last_numbers
                .insert(key, start + passing.len() as u64 - 1);
        }
        state.certificates.extend(issued.iter().cloned());

        let keep = issued.len().saturating_sub(state.short_issue_by);
        Ok(issued.into_iter().take(keep).collect())
    }

    async fn list_issued_certificates(
        &self,
        filters: &CertificateFilters,
    ) -> Result<Vec<IssuedCertificate>, ApiError> {
        self.record("list_issued_certificates");
        Ok(self
            .state()
            .certificates
            .iter()
            .filter(|c| filters.batch_id.is_none_or(|b| b == c.batch_id))
            .filter(|c| filters.student_id.is_none_or(|s| s == c.student_id))
            .cloned()
            .collect())
    }

    async fn get_issued_certificate(
        &self,
        id: Uuid,
        _school_id: Option<Uuid>,
    ) -> Result<IssuedCertificate, ApiError> {
        self.state()
            .certificates
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("certificate"))
    }

    async fn download_certificate_pdf(
        &self,
        id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<CertificateFile, ApiError> {
        self.record("download_certificate_pdf");
        if school_id.is_none() {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "No default school set".to_string(),
            });
        }
        let cert = self.get_issued_certificate(id, school_id).await?;
        Ok(CertificateFile {
            bytes: Bytes::from_static(b"%PDF-1.7"),
            filename: Some(format!("{}.pdf", cert.certificate_no)),
        })
    }

    async fn revoke_certificate(
        &self,
        id: Uuid,
        request: &RevokeCertificateRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("revoke_certificate:{}", request.reason));
        let mut state = self.state();
        let cert = state
            .certificates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("certificate"))?;
        cert.revoked_at = Some(Utc::now());
        cert.revoke_reason = Some(request.reason.clone());
        Ok(())
    }

    async fn list_templates(
        &self,
        filters: &TemplateFilters,
    ) -> Result<Vec<CertificateTemplate>, ApiError> {
        Ok(self
            .state()
            .templates
            .iter()
            .filter(|t| {
                filters
                    .template_type
                    .as_deref()
                    .is_none_or(|ty| ty == t.template_type)
            })
            .cloned()
            .collect())
    }

    async fn create_template(&self, payload: &TemplatePayload) -> Result<CertificateTemplate, ApiError> {
        self.record("create_template");
        let template = CertificateTemplate {
            id: Uuid::new_v4(),
            school_id: payload.school_id,
            template_type: payload.template_type.clone().unwrap_or_default(),
            title: payload.title.clone().unwrap_or_default(),
            description: payload.description.clone(),
            body_html: None,
            layout_config: None,
            page_size: payload.page_size.unwrap_or_default(),
            custom_width_mm: None,
            custom_height_mm: None,
            rtl: payload.rtl.unwrap_or(false),
            font_family: None,
            is_active: payload.is_active.unwrap_or(true),
        };
        self.insert_template(template.clone());
        Ok(template)
    }

    async fn update_template(
        &self,
        id: Uuid,
        payload: &TemplatePayload,
    ) -> Result<CertificateTemplate, ApiError> {
        let mut state = self.state();
        let template = state
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("template"))?;
        if let Some(active) = payload.is_active {
            template.is_active = active;
        }
        Ok(template.clone())
    }

    async fn delete_template(&self, id: Uuid) -> Result<(), ApiError> {
        self.state().templates.retain(|t| t.id != id);
        Ok(())
    }
}

pub fn app_for(api: &FakeApi, school: SchoolContext) -> ConsoleApp {
    ConsoleApp::new(Arc::new(api.clone()), school)
}

pub fn student(status: ResultStatus) -> BatchStudent {
    BatchStudent {
        student_id: Uuid::new_v4(),
        final_result_status: status,
        position: None,
        remarks: None,
    }
}

pub fn draft_batch(school_id: Uuid) -> GraduationBatch {
    GraduationBatch {
        id: Uuid::new_v4(),
        organization_id: None,
        school_id,
        academic_year_id: Uuid::new_v4(),
        class_id: Some(Uuid::new_v4()),
        from_class_id: None,
        to_class_id: None,
        graduation_type: GraduationType::FinalYear,
        exams: vec![BatchExam {
            exam_id: Uuid::new_v4(),
            weight_percentage: None,
        }],
        graduation_date: NaiveDate::from_ymd_opt(2025, 6, 15),
        status: BatchStatus::Draft,
        require_attendance: true,
        min_attendance_percentage: 75.0,
        exclude_approved_leaves: true,
        students: vec![],
        approved_at: None,
        created_at: None,
    }
}

pub fn graduation_template(school_id: Option<Uuid>, is_active: bool) -> CertificateTemplate {
    CertificateTemplate {
        id: Uuid::new_v4(),
        school_id,
        template_type: "graduation".to_string(),
        title: "Graduation Certificate".to_string(),
        description: None,
        body_html: Some("<h1>{{student_name}}</h1>".to_string()),
        layout_config: None,
        page_size: PageSize::A4,
        custom_width_mm: None,
        custom_height_mm: None,
        rtl: false,
        font_family: None,
        is_active,
    }
}
