pub mod batch_repository;
pub mod certificate_repository;
pub mod template_repository;

pub use batch_repository::BatchRepository;
pub use certificate_repository::CertificateRepository;
pub use template_repository::{TemplateRepository, select_default};
