//! Exam Practice Utility Functions
//!
//! ## Current API
//!
//! - Normalize raw question records
//! - Validate question banks
//! - Generate working sets from exam config
//! - Evaluate and score answers
//! - Track a practice session and build its report
//!
pub mod attempt;
pub mod error;
pub mod evaluation;
pub mod format;
pub mod generation;
pub mod normalize;
pub mod question;
pub mod report;
pub mod validation;
