//! Graduation batch as returned by the batch endpoints

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Draft,
    Approved,
    Issued,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStatus::Draft => "draft",
            BatchStatus::Approved => "approved",
            BatchStatus::Issued => "issued",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraduationType {
    #[default]
    FinalYear,
    Promotion,
    Transfer,
}

impl GraduationType {
    /// Promotion and transfer batches move students between two classes.
    pub fn needs_class_pair(&self) -> bool {
        matches!(self, GraduationType::Promotion | GraduationType::Transfer)
    }
}

impl fmt::Display for GraduationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraduationType::FinalYear => "final_year",
            GraduationType::Promotion => "promotion",
            GraduationType::Transfer => "transfer",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pass,
    Fail,
    #[default]
    Pending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchExam {
    pub exam_id: Uuid,
    #[serde(default)]
    pub weight_percentage: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchStudent {
    pub student_id: Uuid,
    #[serde(default)]
    pub final_result_status: ResultStatus,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl BatchStudent {
    pub fn is_pass(&self) -> bool {
        self.final_result_status == ResultStatus::Pass
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraduationBatch {
    pub id: Uuid,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub school_id: Uuid,
    pub academic_year_id: Uuid,
    #[serde(default)]
    pub class_id: Option<Uuid>,
    #[serde(default)]
    pub from_class_id: Option<Uuid>,
    #[serde(default)]
    pub to_class_id: Option<Uuid>,
    #[serde(default)]
    pub graduation_type: GraduationType,
    #[serde(default)]
    pub exams: Vec<BatchExam>,
    #[serde(default)]
    pub graduation_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default = "default_require_attendance")]
    pub require_attendance: bool,
    #[serde(default = "default_min_attendance")]
    pub min_attendance_percentage: f64,
    #[serde(default = "default_exclude_approved_leaves")]
    pub exclude_approved_leaves: bool,
    #[serde(default)]
    pub students: Vec<BatchStudent>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_require_attendance() -> bool {
    true
}

fn default_min_attendance() -> f64 {
    75.0
}

fn default_exclude_approved_leaves() -> bool {
    true
}

impl GraduationBatch {
    /// Exam ids in display order
    pub fn exam_ids(&self) -> Vec<Uuid> {
        self.exams.iter().map(|e| e.exam_id).collect()
    }

    /// Class the roster is drawn from. Promotion and transfer batches fall
    /// back to `from_class_id` when `class_id` was not sent.
    pub fn source_class_id(&self) -> Option<Uuid> {
        if self.graduation_type.needs_class_pair() {
            self.from_class_id.or(self.class_id)
        } else {
            self.class_id
        }
    }

    pub fn passing_students(&self) -> impl Iterator<Item = &BatchStudent> {
        self.students.iter().filter(|s| s.is_pass())
    }

    pub fn pass_count(&self) -> usize {
        self.passing_students().count()
    }

    pub fn has_passed_students(&self) -> bool {
        self.students.iter().any(BatchStudent::is_pass)
    }
}
