//! Graduation batch state machine.
//!
//! Batches only move forward: `draft -> approved -> issued`. Every place that
//! decides whether an action is allowed goes through [`check`], which reads
//! the single [`TRANSITIONS`] table and then the per action preconditions.

use std::fmt;

use crate::entities::{BatchStatus, GraduationBatch};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BatchAction {
    /// Edit the batch configuration or delete the batch
    Modify,
    GenerateStudents,
    Approve,
    IssueCertificates,
}

impl BatchAction {
    pub const ALL: [BatchAction; 4] = [
        BatchAction::Modify,
        BatchAction::GenerateStudents,
        BatchAction::Approve,
        BatchAction::IssueCertificates,
    ];
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchAction::Modify => "modify",
            BatchAction::GenerateStudents => "generate students",
            BatchAction::Approve => "approve",
            BatchAction::IssueCertificates => "issue certificates",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: BatchStatus,
    pub action: BatchAction,
    pub to: BatchStatus,
}

pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: BatchStatus::Draft,
        action: BatchAction::Modify,
        to: BatchStatus::Draft,
    },
    Transition {
        from: BatchStatus::Draft,
        action: BatchAction::GenerateStudents,
        to: BatchStatus::Draft,
    },
    Transition {
        from: BatchStatus::Draft,
        action: BatchAction::Approve,
        to: BatchStatus::Approved,
    },
    Transition {
        from: BatchStatus::Approved,
        action: BatchAction::IssueCertificates,
        to: BatchStatus::Issued,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} a batch in status {from}")]
    InvalidTransition {
        from: BatchStatus,
        action: BatchAction,
    },
    #[error("batch has no class assigned for its graduation type")]
    MissingClass,
    #[error("batch has no exams selected")]
    NoExams,
    #[error("batch has no students; generate students first")]
    NoStudents,
    #[error("no student in this batch has passed")]
    NoPassingStudents,
    #[error("batch has no graduation date; certificate numbers need its year")]
    MissingGraduationDate,
}

/// Target status of `action` from `from`, if the table allows it.
pub fn transition(from: BatchStatus, action: BatchAction) -> Option<BatchStatus> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.action == action)
        .map(|t| t.to)
}

/// Validates `action` on `batch` and returns the status the batch ends in.
pub fn check(batch: &GraduationBatch, action: BatchAction) -> Result<BatchStatus, LifecycleError> {
    // Issuance stays blocked without passing students whatever the status.
    if action == BatchAction::IssueCertificates && !batch.has_passed_students() {
        return Err(LifecycleError::NoPassingStudents);
    }

    let to = transition(batch.status, action).ok_or(LifecycleError::InvalidTransition {
        from: batch.status,
        action,
    })?;

    match action {
        BatchAction::Modify => {}
        BatchAction::GenerateStudents => {
            let has_classes = if batch.graduation_type.needs_class_pair() {
                batch.source_class_id().is_some() && batch.to_class_id.is_some()
            } else {
                batch.class_id.is_some()
            };
            if !has_classes {
                return Err(LifecycleError::MissingClass);
            }
            if batch.exams.is_empty() {
                return Err(LifecycleError::NoExams);
            }
        }
        BatchAction::Approve => {
            if batch.students.is_empty() {
                return Err(LifecycleError::NoStudents);
            }
        }
        BatchAction::IssueCertificates => {
            if batch.graduation_date.is_none() {
                return Err(LifecycleError::MissingGraduationDate);
            }
        }
    }

    Ok(to)
}

pub fn is_allowed(batch: &GraduationBatch, action: BatchAction) -> bool {
    check(batch, action).is_ok()
}

/// Actions currently enabled for the batch
pub fn available_actions(batch: &GraduationBatch) -> Vec<BatchAction> {
    BatchAction::ALL
        .into_iter()
        .filter(|a| is_allowed(batch, *a))
        .collect()
}

/// The graduation type is locked as soon as a roster exists.
pub fn graduation_type_editable(batch: &GraduationBatch) -> bool {
    relationships_editable(batch)
}

/// School, academic year and class assignments are fixed once students
/// have been generated.
pub fn relationships_editable(batch: &GraduationBatch) -> bool {
    is_allowed(batch, BatchAction::Modify) && batch.students.is_empty()
}
