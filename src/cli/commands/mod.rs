//! CLI command implementations

pub mod completions;
pub mod config;
pub mod course;
pub mod form;
pub mod lists;
pub mod register;
pub mod schema;
pub mod validate;
