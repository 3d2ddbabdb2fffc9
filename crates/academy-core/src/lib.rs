//! Academy Client Core Library
//!
//! This crate provides the client core of the Taieba Academy course
//! marketplace: a resilient backend API client, a query cache coordinator,
//! an authenticated session store and the course catalog built on them.

pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod query;

// Re-export commonly used types
pub use api::{ApiClient, RequestDescriptor, TokenSource};
pub use app::Academy;
pub use auth::{
    FileSessionStorage, FirebaseIdentityProvider, Identity, IdentityProvider,
    MemoryIdentityProvider, SessionState, SessionStorage, SessionStore,
};
pub use catalog::{
    CatalogService, Category, Course, CourseDraft, CourseFilter, Enrollment, EnrollmentStatus,
    Instructor,
};
pub use config::{ApiConfig, AppConfig, FirebaseConfig, QueryConfig, load_from_env};
pub use error::{
    AcademyError, AcademyResult, ApiError, ApiErrorKind, AuthError, AuthErrorKind,
};
pub use events::{Notification, NotificationBus, Notifier, SilentNotifier};
pub use query::{QueryClient, QueryFilter, QueryKey, QueryOptions, QueryResult, QueryStatus};
