use chrono::NaiveDate;
use std::fmt;

use super::formatter::{NumberSequence, last_sequence, year_of};
use super::{CertificateNumberConfig, NumberingError};
use crate::config::PREVIEW_LEADING_COUNT;

/// Numbers shown to the operator before issuing: the first few and the last.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NumberPreview {
    pub leading: Vec<String>,
    pub trailing: Option<String>,
    /// How many certificates the preview stands for
    pub total: usize,
}

impl NumberPreview {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.leading.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.trailing
            .as_deref()
            .or_else(|| self.leading.last().map(String::as_str))
    }
}

impl fmt::Display for NumberPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for number in &self.leading {
            writeln!(f, "{number}")?;
        }
        if let Some(last) = &self.trailing {
            // numbers hidden between the leading ones and the last
            if self.total > self.leading.len() + 1 {
                writeln!(f, "...")?;
            }
            writeln!(f, "{last}")?;
        }
        Ok(())
    }
}

pub fn preview_numbers(
    graduation_date: Option<NaiveDate>,
    pass_count: usize,
    config: &CertificateNumberConfig,
) -> Result<NumberPreview, NumberingError> {
    let year = year_of(graduation_date)?;
    if pass_count == 0 {
        return Ok(NumberPreview::default());
    }

    let start = config.effective_starting_number();
    let last = last_sequence(start, pass_count)?;
    let sequence = NumberSequence::new(
        config.effective_prefix(),
        config.effective_certificate_type(),
        year,
        start,
        config.effective_padding(),
    );

    let leading = sequence
        .clone()
        .take(pass_count.min(PREVIEW_LEADING_COUNT))
        .collect();
    let trailing = if pass_count > PREVIEW_LEADING_COUNT {
        sequence.nth_from_start(last - start)
    } else {
        None
    };

    Ok(NumberPreview {
        leading,
        trailing,
        total: pass_count,
    })
}
