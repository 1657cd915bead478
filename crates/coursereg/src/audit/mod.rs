//! Degree requirement evaluation
//!
//! [`status`] holds the pure course-status and fulfillment rules;
//! [`RequirementEvaluator`] resolves their inputs from the store for one
//! student at a time.

mod processor;
pub mod status;
mod types;

pub use processor::RequirementEvaluator;
pub use status::{combined_status, course_statuses, fulfillment_status, tally, CourseStatuses};
pub use types::*;
