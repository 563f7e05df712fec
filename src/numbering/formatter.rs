use chrono::{Datelike, NaiveDate};

use super::NumberingError;

/// Formats one certificate number as `{prefix}-{type}-{year}-{sequence}`.
///
/// The sequence is left padded with zeros up to `padding` digits. Wider
/// sequences keep all their digits. The backend formats persisted numbers
/// the same way, so this output must stay byte-for-byte identical to it.
pub fn format_certificate_number(
    prefix: &str,
    certificate_type: &str,
    year: i32,
    sequence: u64,
    padding: usize,
) -> String {
    format!("{prefix}-{certificate_type}-{year}-{sequence:0padding$}")
}

/// Year component of certificate numbers for a batch
pub fn year_of(graduation_date: Option<NaiveDate>) -> Result<i32, NumberingError> {
    graduation_date
        .map(|d| d.year())
        .ok_or(NumberingError::MissingGraduationDate)
}

/// Sequence of the last of `count` numbers starting at `start`.
pub fn last_sequence(start: u64, count: usize) -> Result<u64, NumberingError> {
    let overflow = NumberingError::SequenceOverflow { start, count };
    let offset = u64::try_from(count.saturating_sub(1)).map_err(|_| overflow.clone())?;
    start.checked_add(offset).ok_or(overflow)
}

/// Consecutive certificate numbers, one per passing student in roster order.
/// Ends after `u64::MAX` instead of wrapping.
#[derive(Debug, Clone)]
pub struct NumberSequence<'a> {
    prefix: &'a str,
    certificate_type: &'a str,
    year: i32,
    start: u64,
    next: Option<u64>,
    padding: usize,
}

impl<'a> NumberSequence<'a> {
    pub fn new(
        prefix: &'a str,
        certificate_type: &'a str,
        year: i32,
        start: u64,
        padding: usize,
    ) -> Self {
        Self {
            prefix,
            certificate_type,
            year,
            start,
            next: Some(start),
            padding,
        }
    }

    /// Number at `offset` positions after the start, without advancing.
    /// `None` past the largest sequence.
    pub fn nth_from_start(&self, offset: u64) -> Option<String> {
        let sequence = self.start.checked_add(offset)?;
        Some(self.format(sequence))
    }

    fn format(&self, sequence: u64) -> String {
        format_certificate_number(
            self.prefix,
            self.certificate_type,
            self.year,
            sequence,
            self.padding,
        )
    }
}

impl Iterator for NumberSequence<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let sequence = self.next?;
        self.next = sequence.checked_add(1);
        Some(self.format(sequence))
    }
}
