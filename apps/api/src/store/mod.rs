//! SQLite persistence for evaluations and job descriptions.

pub mod evaluations;
pub mod job_descriptions;
