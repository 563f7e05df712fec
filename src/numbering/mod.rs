//! Certificate number formatting, configuration and preview

pub mod formatter;
pub mod number_config;
pub mod preview;

pub use formatter::{NumberSequence, format_certificate_number, last_sequence, year_of};
pub use number_config::{CertificateNumberConfig, Setting};
pub use preview::{NumberPreview, preview_numbers};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberingError {
    #[error("batch has no graduation date; certificate numbers need its year")]
    MissingGraduationDate,
    #[error("{count} certificates starting at {start} run past the largest certificate number")]
    SequenceOverflow { start: u64, count: usize },
}
