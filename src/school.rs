//! Which school a request is made for.
//!
//! The selection is carried explicitly and never stored globally.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no school selected. {guidance}")]
pub struct SchoolSelectionRequired {
    pub guidance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolContext {
    /// School picked for this session
    pub selected: Option<Uuid>,
    /// Default school from the user's profile
    pub default_school: Option<Uuid>,
    pub available: Vec<Uuid>,
}

impl SchoolContext {
    pub fn new(selected: Option<Uuid>, default_school: Option<Uuid>, available: Vec<Uuid>) -> Self {
        Self {
            selected,
            default_school,
            available,
        }
    }

    pub fn with_selected(mut self, school_id: Uuid) -> Self {
        self.selected = Some(school_id);
        self
    }

    /// Resolution order: the record's own school, the selected school, the
    /// profile default, then the only available school.
    pub fn resolve(&self, record_school: Option<Uuid>) -> Option<Uuid> {
        record_school
            .or(self.selected)
            .or(self.default_school)
            .or(match self.available.as_slice() {
                [only] => Some(*only),
                _ => None,
            })
    }

    pub fn has_multiple_schools(&self) -> bool {
        self.available.len() > 1
    }

    /// Listing endpoints are always scoped to a school.
    pub fn require_for_listing(&self) -> Result<Uuid, SchoolSelectionRequired> {
        self.resolve(None).ok_or_else(|| self.selection_error())
    }

    /// School to send with a mutation on a record. With a single school (or
    /// none known) the backend may pick it, so `None` is allowed there.
    pub fn for_mutation(
        &self,
        record_school: Option<Uuid>,
    ) -> Result<Option<Uuid>, SchoolSelectionRequired> {
        match self.resolve(record_school) {
            Some(school) => Ok(Some(school)),
            None if self.has_multiple_schools() => Err(self.selection_error()),
            None => Ok(None),
        }
    }

    pub fn guidance(&self) -> &'static str {
        if self.has_multiple_schools() {
            "Please select a school (--school-id) or ask an administrator to set a default school."
        } else {
            "Please ask an administrator to set a default school for your account."
        }
    }

    pub fn selection_error(&self) -> SchoolSelectionRequired {
        SchoolSelectionRequired {
            guidance: self.guidance().to_string(),
        }
    }
}
