//! Query keys used by the catalog

use crate::query::{QueryFilter, QueryKey};

pub const COURSES: &str = "courses";
pub const COURSE: &str = "course";
pub const ENROLLMENT_STATUS: &str = "enrollment-status";
pub const MY_ENROLLMENTS: &str = "my-enrollments";
pub const MY_COURSES: &str = "my-courses";

pub fn courses(category: Option<&str>, search: Option<&str>) -> QueryKey {
    QueryKey::new(COURSES)
        .with_optional_param(category)
        .with_optional_param(search)
}

pub fn course(id: &str) -> QueryKey {
    QueryKey::new(COURSE).with_param(id)
}

/// Keyed per user so a different sign-in never sees another user's status
pub fn enrollment_status(course_id: &str, user_id: &str) -> QueryKey {
    QueryKey::new(ENROLLMENT_STATUS)
        .with_param(course_id)
        .with_param(user_id)
}

pub fn my_enrollments() -> QueryKey {
    QueryKey::new(MY_ENROLLMENTS)
}

pub fn my_courses() -> QueryKey {
    QueryKey::new(MY_COURSES)
}

/// Reads made stale by enrolling in a course
pub fn after_enroll(course_id: &str) -> Vec<QueryFilter> {
    vec![
        QueryFilter::operation(ENROLLMENT_STATUS).with_param(course_id),
        QueryFilter::operation(MY_ENROLLMENTS),
    ]
}

/// Reads made stale by creating a course
pub fn after_create() -> Vec<QueryFilter> {
    vec![
        QueryFilter::operation(MY_COURSES),
        QueryFilter::operation(COURSES),
    ]
}

/// Reads made stale by editing or deleting a course
pub fn after_change(course_id: &str) -> Vec<QueryFilter> {
    vec![
        QueryFilter::operation(MY_COURSES),
        QueryFilter::operation(COURSES),
        QueryFilter::operation(COURSE).with_param(course_id),
    ]
}
