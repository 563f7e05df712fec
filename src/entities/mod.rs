pub mod certificate_template;
pub mod graduation_batch;
pub mod issued_certificate;

pub use certificate_template::{CertificateTemplate, PageSize};
pub use graduation_batch::{
    BatchExam, BatchStatus, BatchStudent, GraduationBatch, GraduationType, ResultStatus,
};
pub use issued_certificate::{CertificateStatus, IssuedCertificate};
