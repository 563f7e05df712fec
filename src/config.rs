use clap::Args;
use uuid::Uuid;

use crate::school::SchoolContext;

// Certificate numbering defaults
pub const DEFAULT_CERTIFICATE_PREFIX: &str = "NZM";
pub const DEFAULT_CERTIFICATE_TYPE: &str = "GRADUATION";
pub const DEFAULT_STARTING_NUMBER: u64 = 1;
pub const DEFAULT_NUMBER_PADDING: usize = 4;
pub const MAX_NUMBER_PADDING: usize = 12;

/// How many leading numbers the issuance preview shows before the last one
pub const PREVIEW_LEADING_COUNT: usize = 5;

pub const GRADUATION_TEMPLATE_TYPE: &str = "graduation";

#[derive(Debug, Args, Clone)]
pub struct Config {
    #[clap(long, env, default_value = "http://localhost:8000/api")]
    pub api_url: String,

    #[clap(long, env)]
    pub api_token: Option<String>,

    #[clap(long, env, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// School picked explicitly for this session
    #[clap(long, env)]
    pub school_id: Option<Uuid>,

    /// Default school from the user's profile
    #[clap(long, env)]
    pub default_school_id: Option<Uuid>,

    /// Schools the user can act on
    #[clap(long, env, value_delimiter = ',')]
    pub available_school_ids: Vec<Uuid>,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn school_context(&self) -> SchoolContext {
        SchoolContext::new(
            self.school_id,
            self.default_school_id,
            self.available_school_ids.clone(),
        )
    }
}
