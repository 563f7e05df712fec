//! Issued certificate records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const VERIFY_ROUTE: &str = "/verify/certificate";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CertificateStatus {
    Valid,
    Revoked,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateStatus::Valid => f.write_str("Valid"),
            CertificateStatus::Revoked => f.write_str("Revoked"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCertificate {
    pub id: Uuid,
    pub certificate_no: String,
    pub student_id: Uuid,
    pub batch_id: Uuid,
    pub template_id: Uuid,
    #[serde(default)]
    pub school_id: Option<Uuid>,
    pub verification_hash: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoke_reason: Option<String>,
}

impl IssuedCertificate {
    /// A revoked certificate stays on record but is never valid again.
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none()
    }

    pub fn status(&self) -> CertificateStatus {
        if self.is_valid() {
            CertificateStatus::Valid
        } else {
            CertificateStatus::Revoked
        }
    }

    /// Public verification route for this certificate
    pub fn verification_path(&self) -> String {
        format!("{}/{}", VERIFY_ROUTE, self.verification_hash)
    }
}
