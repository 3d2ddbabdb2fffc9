//! Catalog operations

use super::keys;
use super::types::{
    Course, CourseDraft, CourseFilter, CourseList, CourseSubmission, Enrollment,
    EnrollmentStatus, Instructor,
};
use crate::api::{ApiClient, RequestDescriptor, resource_path};
use crate::auth::{Identity, SessionStore};
use crate::config::timeouts;
use crate::error::ApiError;
use crate::events::{Notification, SharedNotifier, SilentNotifier};
use crate::query::{QueryClient, QueryFilter, QueryOptions, QueryResult};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

type Fetch = Box<dyn FnOnce() -> BoxFuture<'static, Result<Value, ApiError>> + Send>;

/// Course browsing, enrollment and course management
pub struct CatalogService {
    api: ApiClient,
    queries: QueryClient,
    session: Arc<SessionStore>,
    notifier: SharedNotifier,
    last_user: Mutex<Option<String>>,
}

impl CatalogService {
    pub fn new(api: ApiClient, queries: QueryClient, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            queries,
            session,
            notifier: Arc::new(SilentNotifier),
            last_user: Mutex::new(None),
        }
    }

    /// Where mutation successes are announced
    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Published courses, optionally narrowed by category and search text
    pub async fn list_courses(&self, filter: &CourseFilter) -> QueryResult<Vec<Course>> {
        let category = filter.category.map(|c| c.as_str());
        let search = filter.search.as_deref();
        let options = QueryOptions::new(keys::courses(category, search));
        let params = vec![
            ("category".to_string(), category.unwrap_or_default().to_string()),
            ("search".to_string(), search.unwrap_or_default().to_string()),
        ];

        let result: QueryResult<CourseList> = self
            .queries
            .query(&options, self.read("/courses".to_string(), params))
            .await;
        result.map(|list| list.courses)
    }

    /// One course
    pub async fn course(&self, id: &str) -> QueryResult<Course> {
        let options = QueryOptions::new(keys::course(id)).enabled(!id.is_empty());
        self.queries
            .query(&options, self.read(resource_path("/courses", id), Vec::new()))
            .await
    }

    /// Whether the signed-in user is enrolled; disabled while anonymous
    pub async fn enrollment_status(&self, course_id: &str) -> QueryResult<EnrollmentStatus> {
        let user = self.current_user();
        let user_id = user.as_ref().map(|u| u.id.as_str()).unwrap_or_default();
        let options = QueryOptions::new(keys::enrollment_status(course_id, user_id))
            .enabled(user.is_some() && !course_id.is_empty())
            .freshness(timeouts::query::enrollment_status_freshness());
        self.queries
            .query(
                &options,
                self.read(resource_path("/enrollments/status", course_id), Vec::new()),
            )
            .await
    }

    /// Courses the signed-in user enrolled in; disabled while anonymous
    pub async fn my_enrollments(&self) -> QueryResult<Vec<Enrollment>> {
        let options = QueryOptions::new(keys::my_enrollments()).enabled(self.current_user().is_some());
        self.queries
            .query(&options, self.read("/enrollments/mine".to_string(), Vec::new()))
            .await
    }

    /// Courses the signed-in user published; disabled while anonymous
    pub async fn my_courses(&self) -> QueryResult<Vec<Course>> {
        let options = QueryOptions::new(keys::my_courses()).enabled(self.current_user().is_some());
        self.queries
            .query(&options, self.read("/courses/mine".to_string(), Vec::new()))
            .await
    }

    /// Enroll the signed-in user in a course
    pub async fn enroll(&self, course_id: &str) -> Result<(), ApiError> {
        self.require_user()?;
        let body = json!({ "courseId": course_id });

        self.queries
            .mutate(
                self.api.post::<_, Value>("/enrollments", &body),
                |_, invalidator| {
                    for filter in keys::after_enroll(course_id) {
                        invalidator.invalidate(filter);
                    }
                },
            )
            .await?;

        info!(course = course_id, "Enrolled");
        self.notifier
            .notify(Notification::success("Enrolled successfully!"));
        Ok(())
    }

    /// Publish a new course authored by the signed-in user
    pub async fn create_course(&self, draft: &CourseDraft) -> Result<Value, ApiError> {
        let user = self.require_user()?;
        draft.validate().map_err(|e| self.reject(e))?;
        let body = CourseSubmission {
            draft,
            instructor: Instructor::from_identity(&user),
        };

        let created = self
            .queries
            .mutate(self.api.post::<_, Value>("/courses", &body), |_, invalidator| {
                for filter in keys::after_create() {
                    invalidator.invalidate(filter);
                }
            })
            .await?;

        info!(title = %draft.title, "Course created");
        self.notifier
            .notify(Notification::success("Course added successfully!"));
        Ok(created)
    }

    /// Replace a course's fields
    pub async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<(), ApiError> {
        let user = self.require_user()?;
        draft.validate().map_err(|e| self.reject(e))?;
        let body = CourseSubmission {
            draft,
            instructor: Instructor::from_identity(&user),
        };

        self.queries
            .mutate(
                self.api.put::<_, Value>(&resource_path("/courses", id), &body),
                |_, invalidator| {
                    for filter in keys::after_change(id) {
                        invalidator.invalidate(filter);
                    }
                },
            )
            .await?;

        info!(course = id, "Course updated");
        self.notifier
            .notify(Notification::success("Course updated successfully!"));
        Ok(())
    }

    /// Remove a course
    pub async fn delete_course(&self, id: &str) -> Result<(), ApiError> {
        self.require_user()?;

        self.queries
            .mutate(
                self.api.delete::<Value>(&resource_path("/courses", id)),
                |_, invalidator| {
                    for filter in keys::after_change(id) {
                        invalidator.invalidate(filter);
                    }
                },
            )
            .await?;

        info!(course = id, "Course deleted");
        self.notifier
            .notify(Notification::success("Course deleted successfully"));
        Ok(())
    }

    fn read(&self, path: String, params: Vec<(String, String)>) -> Fetch {
        let api = self.api.clone();
        Box::new(move || {
            async move {
                api.send::<Value>(RequestDescriptor::get(path).with_params(params))
                    .await
            }
            .boxed()
        })
    }

    fn require_user(&self) -> Result<Arc<Identity>, ApiError> {
        self.current_user()
            .ok_or_else(|| self.reject(ApiError::login_required()))
    }

    /// Surface a failure detected before any request was sent
    fn reject(&self, error: ApiError) -> ApiError {
        let message = error.message.clone().unwrap_or_else(|| error.user_message());
        self.notifier.notify(Notification::api_error(error.kind, message));
        error
    }

    /// Current identity; drops per-user reads when the user changed
    fn current_user(&self) -> Option<Arc<Identity>> {
        let user = self.session.current_identity();
        let user_id = user.as_ref().map(|u| u.id.clone());

        let mut last_user = self.last_user.lock();
        if *last_user != user_id {
            if last_user.is_some() {
                debug!("Signed-in user changed, dropping per-user reads");
                for operation in [keys::MY_COURSES, keys::MY_ENROLLMENTS, keys::ENROLLMENT_STATUS] {
                    self.queries.invalidate(&QueryFilter::operation(operation));
                }
            }
            *last_user = user_id;
        }
        user
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("api", &self.api)
            .field("queries", &self.queries)
            .finish()
    }
}
