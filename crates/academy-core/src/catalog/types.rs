//! Catalog domain types

use crate::auth::Identity;
use crate::error::{ApiError, ApiErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Course category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Development,
    Design,
    Marketing,
    Data,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Development,
        Category::Design,
        Category::Marketing,
        Category::Data,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Design => "design",
            Self::Marketing => "marketing",
            Self::Data => "data",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Design => "Design",
            Self::Marketing => "Marketing",
            Self::Data => "Data Science",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}', expected one of: development, design, marketing, data",
                    s
                )
            })
    }
}

/// Course author as embedded in a course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl Instructor {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            photo_url: identity.photo_url.clone(),
        }
    }
}

/// A course as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Kept as text so unknown categories still decode
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub instructor: Option<Instructor>,
}

impl Course {
    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    /// Description with the catalog fallback text
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available for this course.")
    }
}

/// Input for creating or updating a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    pub category: Category,
    pub price: f64,
    pub duration: String,
    pub image_url: String,
    pub description: String,
    #[serde(default)]
    pub is_featured: bool,
}

impl CourseDraft {
    /// Prefill a draft from an existing course (edit flow)
    pub fn from_course(course: &Course) -> Option<Self> {
        Some(Self {
            title: course.title.clone(),
            category: course.category()?,
            price: course.price,
            duration: course.duration.clone(),
            image_url: course.image_url.clone(),
            description: course.description.clone().unwrap_or_default(),
            is_featured: course.is_featured,
        })
    }

    /// Field rules enforced before anything is sent
    pub fn validate(&self) -> Result<(), ApiError> {
        let problem = if self.title.trim().chars().count() < 3 {
            Some("Title must be at least 3 characters")
        } else if !self.price.is_finite() || self.price < 0.0 {
            Some("Price must be positive")
        } else if self.duration.trim().is_empty() {
            Some("Duration is required")
        } else if !is_http_url(&self.image_url) {
            Some("Please enter a valid URL")
        } else if self.description.trim().chars().count() < 20 {
            Some("Description must be at least 20 characters")
        } else {
            None
        };

        match problem {
            Some(message) => Err(ApiError::new(ApiErrorKind::Application).with_message(message)),
            None => Ok(()),
        }
    }
}

fn is_http_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

/// Body sent for create and update
#[derive(Debug, Serialize)]
pub(crate) struct CourseSubmission<'a> {
    #[serde(flatten)]
    pub draft: &'a CourseDraft,
    pub instructor: Instructor,
}

/// Course list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl CourseFilter {
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }
}

/// Wrapper the list endpoint answers with
#[derive(Debug, Deserialize)]
pub(crate) struct CourseList {
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// One of the caller's enrollments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id")]
    pub id: String,
    pub course: Course,
    #[serde(default)]
    pub enrolled_at: Option<String>,
}

/// Whether the caller is enrolled in a course
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentStatus {
    #[serde(default)]
    pub enrolled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> CourseDraft {
        CourseDraft {
            title: "Rust for Web Developers".into(),
            category: Category::Development,
            price: 49.5,
            duration: "8h".into(),
            image_url: "https://img/rust.png".into(),
            description: "Ownership, borrowing and async explained slowly.".into(),
            is_featured: false,
        }
    }

    #[test]
    fn test_course_decodes_backend_shape() {
        let course: Course = serde_json::from_value(json!({
            "_id": "c1",
            "title": "Design Systems",
            "category": "design",
            "price": 20,
            "imageUrl": "https://img/d.png",
            "instructor": { "name": "Amina", "photoURL": "https://img/a.png" }
        }))
        .unwrap();
        assert_eq!(course.id, "c1");
        assert_eq!(course.category(), Some(Category::Design));
        assert_eq!(course.summary(), "No description available for this course.");
        assert_eq!(
            course.instructor.and_then(|i| i.photo_url).as_deref(),
            Some("https://img/a.png")
        );
    }

    #[test]
    fn test_submission_flattens_draft_and_adds_instructor() {
        let identity = Identity::new("u1")
            .with_display_name("Amina")
            .with_email("amina@example.com");
        let draft = draft();
        let body = serde_json::to_value(CourseSubmission {
            draft: &draft,
            instructor: Instructor::from_identity(&identity),
        })
        .unwrap();

        assert_eq!(body["title"], "Rust for Web Developers");
        assert_eq!(body["category"], "development");
        assert_eq!(body["imageUrl"], "https://img/rust.png");
        assert_eq!(body["isFeatured"], false);
        assert_eq!(body["instructor"]["name"], "Amina");
        assert_eq!(body["instructor"]["photoURL"], serde_json::Value::Null);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let cases = [
            (CourseDraft { title: "Go".into(), ..draft() }, "Title must be at least 3 characters"),
            (CourseDraft { price: -1.0, ..draft() }, "Price must be positive"),
            (CourseDraft { image_url: "ftp://x".into(), ..draft() }, "Please enter a valid URL"),
            (CourseDraft { description: "too short".into(), ..draft() }, "Description must be at least 20 characters"),
        ];
        for (draft, expected) in cases {
            let err = draft.validate().unwrap_err();
            assert_eq!(err.kind, ApiErrorKind::Application);
            assert_eq!(err.message.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Design".parse::<Category>(), Ok(Category::Design));
        assert_eq!(Category::Data.label(), "Data Science");
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn test_filter_ignores_blank_search() {
        let filter = CourseFilter::default().with_search("  ");
        assert_eq!(filter.search, None);
    }
}
