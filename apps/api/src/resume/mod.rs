//! Résumé workflows: optimization of an uploaded résumé and generation of a
//! new one from form data.
//!
//! Flow (optimize): extract → detect sections → prompt → complete → recover →
//! render → write file.
//! Flow (generate): validate → prompt → complete → recover → render → write file.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod optimizer;
pub mod prompts;
pub mod recovery;
