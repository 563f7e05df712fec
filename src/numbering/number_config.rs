use std::num::NonZeroU64;

use crate::config::{
    DEFAULT_CERTIFICATE_PREFIX, DEFAULT_CERTIFICATE_TYPE, DEFAULT_NUMBER_PADDING,
    DEFAULT_STARTING_NUMBER, MAX_NUMBER_PADDING,
};
use crate::validation::ValidationErrors;

/// A numbering option the operator either left alone or typed explicitly.
///
/// Only explicit values travel to the backend. For the starting number this
/// matters: when it is left at `Default` the backend continues from the last
/// certificate it issued for the same prefix and type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Setting<T> {
    Default,
    Explicit(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Default
    }
}

impl<T> Setting<T> {
    pub fn from_input(value: Option<T>) -> Self {
        match value {
            Some(v) => Setting::Explicit(v),
            None => Setting::Default,
        }
    }

    pub fn explicit(&self) -> Option<&T> {
        match self {
            Setting::Explicit(v) => Some(v),
            Setting::Default => None,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Setting::Explicit(_))
    }
}

impl<T: Copy> Setting<T> {
    pub fn unwrap_or(&self, default: T) -> T {
        match self {
            Setting::Explicit(v) => *v,
            Setting::Default => default,
        }
    }
}

impl Setting<String> {
    /// Blank text counts as "not typed".
    pub fn from_text(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Setting::Explicit(v.to_string()),
            _ => Setting::Default,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CertificateNumberConfig {
    pub prefix: Setting<String>,
    pub certificate_type: Setting<String>,
    pub starting_number: Setting<NonZeroU64>,
    pub padding: Setting<usize>,
}

impl CertificateNumberConfig {
    /// Builds a config from raw operator input.
    pub fn from_user_input(
        prefix: Option<&str>,
        certificate_type: Option<&str>,
        starting_number: Option<u64>,
        padding: Option<usize>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let starting_number = match starting_number {
            None => Setting::Default,
            Some(n) => match NonZeroU64::new(n) {
                Some(n) => Setting::Explicit(n),
                None => {
                    errors.add("starting_number", "must be a positive number");
                    Setting::Default
                }
            },
        };

        let config = Self {
            prefix: Setting::from_text(prefix),
            certificate_type: Setting::from_text(certificate_type),
            starting_number,
            padding: Setting::from_input(padding),
        };

        if let Err(more) = config.validate() {
            errors.merge(more);
        }
        errors.into_result(config)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Setting::Explicit(prefix.into());
        self
    }

    pub fn with_certificate_type(mut self, certificate_type: impl Into<String>) -> Self {
        self.certificate_type = Setting::Explicit(certificate_type.into());
        self
    }

    pub fn with_starting_number(mut self, start: NonZeroU64) -> Self {
        self.starting_number = Setting::Explicit(start);
        self
    }

    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = Setting::Explicit(padding);
        self
    }

    pub fn effective_prefix(&self) -> &str {
        self.prefix
            .explicit()
            .map(String::as_str)
            .unwrap_or(DEFAULT_CERTIFICATE_PREFIX)
    }

    pub fn effective_certificate_type(&self) -> &str {
        self.certificate_type
            .explicit()
            .map(String::as_str)
            .unwrap_or(DEFAULT_CERTIFICATE_TYPE)
    }

    /// Starting number used for previews. The real continuation point for an
    /// unset starting number is only known to the backend.
    pub fn effective_starting_number(&self) -> u64 {
        self.starting_number
            .explicit()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_STARTING_NUMBER)
    }

    pub fn effective_padding(&self) -> usize {
        self.padding.unwrap_or(DEFAULT_NUMBER_PADDING)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(padding) = self.padding.explicit() {
            if *padding == 0 || *padding > MAX_NUMBER_PADDING {
                errors.add(
                    "padding",
                    format!("must be between 1 and {MAX_NUMBER_PADDING}"),
                );
            }
        }

        for (field, value) in [
            ("prefix", self.prefix.explicit()),
            ("certificate_type", self.certificate_type.explicit()),
        ] {
            if let Some(value) = value {
                if value.contains('-') || value.chars().any(char::is_whitespace) {
                    errors.add(field, "must not contain '-' or spaces");
                }
            }
        }

        errors.into_result(())
    }
}
