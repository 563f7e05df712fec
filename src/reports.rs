//! Batch summaries and issued certificate exports

use serde::Serialize;
use std::io::Write;

use crate::entities::{GraduationBatch, IssuedCertificate, ResultStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub student_count: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pending_count: usize,
    /// Percentage of passing students, rounded
    pub pass_rate: u32,
}

impl BatchSummary {
    pub fn from_batch(batch: &GraduationBatch) -> Self {
        let mut summary = BatchSummary {
            student_count: batch.students.len(),
            ..Default::default()
        };
        for student in &batch.students {
            match student.final_result_status {
                ResultStatus::Pass => summary.pass_count += 1,
                ResultStatus::Fail => summary.fail_count += 1,
                ResultStatus::Pending => summary.pending_count += 1,
            }
        }
        if summary.student_count > 0 {
            let rate = summary.pass_count as f64 * 100.0 / summary.student_count as f64;
            summary.pass_rate = rate.round() as u32;
        }
        summary
    }
}

#[derive(Debug, Serialize)]
struct CertificateRow<'a> {
    certificate_no: &'a str,
    student_id: String,
    batch_id: String,
    issued_at: String,
    status: String,
    revoked_at: String,
    revoke_reason: &'a str,
}

impl<'a> From<&'a IssuedCertificate> for CertificateRow<'a> {
    fn from(cert: &'a IssuedCertificate) -> Self {
        CertificateRow {
            certificate_no: &cert.certificate_no,
            student_id: cert.student_id.to_string(),
            batch_id: cert.batch_id.to_string(),
            issued_at: cert.issued_at.format("%Y-%m-%d %H:%M").to_string(),
            status: cert.status().to_string(),
            revoked_at: cert
                .revoked_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            revoke_reason: cert.revoke_reason.as_deref().unwrap_or("-"),
        }
    }
}

/// Writes one CSV row per certificate, header included.
pub fn write_certificate_report<W: Write>(
    certificates: &[IssuedCertificate],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for cert in certificates {
        wtr.serialize(CertificateRow::from(cert))?;
    }
    wtr.flush()?;
    Ok(())
}
