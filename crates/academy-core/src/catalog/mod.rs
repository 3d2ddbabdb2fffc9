//! Course catalog
//!
//! Typed operations over the API client and the query coordinator. Reads are
//! cached under fixed keys; writes invalidate the reads they make stale.

pub mod keys;
mod service;
mod types;

pub use service::CatalogService;
pub use types::{
    Category, Course, CourseDraft, CourseFilter, Enrollment, EnrollmentStatus, Instructor,
};
