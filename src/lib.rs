pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod in_flight;
pub mod lifecycle;
pub mod numbering;
pub mod reports;
pub mod repositories;
pub mod school;
pub mod utils;
pub mod validation;

pub use error::{GraduationError, Result};
