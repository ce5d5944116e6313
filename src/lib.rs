//! Academy Forms
//!
//! Course creation and student registration: schema-validated form
//! records, a two-phase submit pipeline, and remote country/state lists.

pub mod cli;
pub mod core;
pub mod forms;
pub mod remote;
pub mod schema;
pub mod yaml;
