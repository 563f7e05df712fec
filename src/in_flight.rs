//! Guards against submitting the same mutation twice while one is pending.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::GraduationError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    GenerateStudents,
    ApproveBatch,
    IssueCertificates,
    RevokeCertificate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::GenerateStudents => "generate-students",
            Operation::ApproveBatch => "approve",
            Operation::IssueCertificates => "issue-certificates",
            Operation::RevokeCertificate => "revoke",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    pending: Arc<Mutex<HashSet<(Operation, Uuid)>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<(Operation, Uuid)>> {
        // The set stays consistent even if a holder panicked.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `operation` on `target` as pending until the ticket drops.
    pub fn begin(&self, operation: Operation, target: Uuid) -> Result<InFlightTicket, GraduationError> {
        if !self.lock().insert((operation, target)) {
            tracing::warn!(%operation, %target, "duplicate submission rejected");
            return Err(GraduationError::AlreadyPending { operation, target });
        }
        Ok(InFlightTicket {
            owner: self.clone(),
            key: (operation, target),
        })
    }

    pub fn is_pending(&self, operation: Operation, target: Uuid) -> bool {
        self.lock().contains(&(operation, target))
    }
}

#[derive(Debug)]
pub struct InFlightTicket {
    owner: InFlight,
    key: (Operation, Uuid),
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.key);
    }
}
