use uuid::Uuid;

use crate::api::ApiError;
use crate::in_flight::Operation;
use crate::lifecycle::LifecycleError;
use crate::numbering::NumberingError;
use crate::school::SchoolSelectionRequired;
use crate::validation::ValidationErrors;

pub type Result<T, E = GraduationError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum GraduationError {
    /// Caught before any request was sent
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    SchoolSelection(#[from] SchoolSelectionRequired),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{operation} is already in progress for {target}")]
    AlreadyPending { operation: Operation, target: Uuid },

    #[error("template {0} is inactive or not available for this batch's school")]
    TemplateUnavailable(Uuid),

    #[error("certificate {certificate_no} has already been revoked")]
    AlreadyRevoked { certificate_no: String },

    #[error("backend issued {issued} certificates for {expected} passing students")]
    IssuanceMismatch { expected: usize, issued: usize },
}

impl GraduationError {
    /// True when the operator can fix the input and retry immediately.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GraduationError::Validation(_)
                | GraduationError::Lifecycle(_)
                | GraduationError::Numbering(_)
                | GraduationError::SchoolSelection(_)
        )
    }
}
