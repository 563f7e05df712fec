//! Client-side checks run before any request is sent

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::api::dto::{CreateBatchRequest, UpdateBatchRequest};
use crate::entities::{GraduationBatch, GraduationType};
use crate::lifecycle;

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Field level errors, keyed by the payload field they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_create_batch(request: &CreateBatchRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_classes(
        request.graduation_type,
        request.class_id,
        request.from_class_id,
        request.to_class_id,
        &mut errors,
    );
    check_exam_set(&request.exam_ids, &request.exam_weights, &mut errors);
    if let Some(p) = request.min_attendance_percentage {
        check_percentage("min_attendance_percentage", p, &mut errors);
    }

    errors.into_result(())
}

/// Checks an update against the batch it modifies. Fields missing from the
/// request keep the batch's current values.
pub fn validate_update_batch(
    current: &GraduationBatch,
    request: &UpdateBatchRequest,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let graduation_type = request.graduation_type.unwrap_or(current.graduation_type);
    if graduation_type != current.graduation_type && !lifecycle::graduation_type_editable(current)
    {
        errors.add(
            "graduation_type",
            "cannot be changed once students have been generated",
        );
    }
    if !lifecycle::relationships_editable(current) {
        let locked = [
            ("academic_year_id", request.academic_year_id, Some(current.academic_year_id)),
            ("class_id", request.class_id, current.class_id),
            ("from_class_id", request.from_class_id, current.from_class_id),
            ("to_class_id", request.to_class_id, current.to_class_id),
        ];
        for (field, requested, existing) in locked {
            check_locked(field, requested, existing, &mut errors);
        }
    }

    check_classes(
        graduation_type,
        request.class_id.or(current.class_id),
        request.from_class_id.or(current.from_class_id),
        request.to_class_id.or(current.to_class_id),
        &mut errors,
    );

    match (&request.exam_ids, &request.exam_weights) {
        (Some(exam_ids), weights) => {
            let empty = BTreeMap::new();
            check_exam_set(exam_ids, weights.as_ref().unwrap_or(&empty), &mut errors);
        }
        (None, Some(weights)) => check_exam_set(&current.exam_ids(), weights, &mut errors),
        (None, None) => {}
    }

    if let Some(p) = request.min_attendance_percentage {
        check_percentage("min_attendance_percentage", p, &mut errors);
    }

    errors.into_result(())
}

/// Returns the trimmed reason.
pub fn validate_revoke_reason(reason: &str) -> Result<String, ValidationErrors> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ValidationErrors::single("reason", "a revoke reason is required"));
    }
    Ok(reason.to_string())
}

/// A requested value for a locked field must match the current one.
fn check_locked(
    field: &str,
    requested: Option<Uuid>,
    current: Option<Uuid>,
    errors: &mut ValidationErrors,
) {
    if requested.is_some_and(|r| Some(r) != current) {
        errors.add(field, "cannot be changed once students have been generated");
    }
}

fn check_classes(
    graduation_type: GraduationType,
    class_id: Option<Uuid>,
    from_class_id: Option<Uuid>,
    to_class_id: Option<Uuid>,
    errors: &mut ValidationErrors,
) {
    if !graduation_type.needs_class_pair() {
        if class_id.is_none() {
            errors.add("class_id", "is required");
        }
        return;
    }

    if from_class_id.or(class_id).is_none() {
        errors.add("from_class_id", format!("is required for {graduation_type}"));
    }
    match to_class_id {
        None => errors.add("to_class_id", format!("is required for {graduation_type}")),
        Some(to) if Some(to) == from_class_id.or(class_id) => {
            errors.add("to_class_id", "must differ from the source class")
        }
        Some(_) => {}
    }
}

fn check_exam_set(exam_ids: &[Uuid], weights: &BTreeMap<Uuid, f64>, errors: &mut ValidationErrors) {
    if exam_ids.is_empty() {
        errors.add("exam_ids", "select at least one exam");
        return;
    }

    let mut seen = HashSet::new();
    if exam_ids.iter().any(|id| !seen.insert(*id)) {
        errors.add("exam_ids", "contains the same exam more than once");
    }

    if weights.is_empty() {
        return;
    }

    if weights.keys().any(|id| !seen.contains(id)) {
        errors.add("exam_weights", "has a weight for an exam that is not selected");
    }
    for weight in weights.values() {
        check_percentage("exam_weights", *weight, errors);
    }
    if exam_ids.len() > 1 {
        let total: f64 = weights.values().sum();
        if weights.len() != exam_ids.len() || (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.add("exam_weights", "weights must cover every exam and sum to 100");
        }
    }
}

fn check_percentage(field: &str, value: f64, errors: &mut ValidationErrors) {
    if !(0.0..=100.0).contains(&value) {
        errors.add(field, "must be between 0 and 100");
    }
}
