//! # Record Lifecycle
//!
//! Create, list, get, update and delete student records against an
//! injected [`DocumentStore`].
//!
//! A record moves `NonExistent -> Active -> Active ... -> Deleted` and never
//! comes back from `Deleted`. Validation always runs before any store call,
//! so a rejected create or update leaves the store untouched.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{RegistryError, RegistryResult};
use super::record::{StudentRecord, StudentSubmission};
use super::validator::validate;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{DocumentStore, StoreError};

/// Result of a single-record lookup. `Absent` is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(StudentRecord),
    Absent,
}

impl Lookup {
    pub fn found(self) -> Option<StudentRecord> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }
}

/// Every active record, plus the store error if listing failed.
///
/// Listing degrades instead of failing: on a store error `students` is
/// empty and `error` carries the message for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentList {
    pub students: Vec<StudentRecord>,
    pub error: Option<String>,
}

/// Lifecycle manager for the admissions collection
pub struct Registry {
    store: Arc<dyn DocumentStore>,
    metrics: Arc<MetricsRegistry>,
}

impl Registry {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Validate and store a new student
    pub async fn create(&self, submission: &StudentSubmission) -> RegistryResult<StudentRecord> {
        let fields = validate(submission).map_err(|e| self.rejected("create", None, e.into()))?;

        let id = self
            .store
            .put(fields.to_document())
            .await
            .map_err(|e| self.store_failed("create", None, e))?;

        self.metrics.increment_registrations();
        log_event_with_fields(Event::StudentRegistered, &[("id", id.as_str())]);

        Ok(StudentRecord::new(id, fields))
    }

    /// All active students in store order
    pub async fn list(&self) -> StudentList {
        self.metrics.increment_lists();

        match self.store.stream_all().await {
            Ok(docs) => StudentList {
                students: docs
                    .iter()
                    .map(|(id, doc)| StudentRecord::from_document(id.clone(), doc))
                    .collect(),
                error: None,
            },
            Err(e) => {
                let err = self.store_failed("list", None, e);
                StudentList {
                    students: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Look up one student
    pub async fn get(&self, id: &str) -> RegistryResult<Lookup> {
        let doc = self
            .store
            .get(id)
            .await
            .map_err(|e| self.store_failed("get", Some(id), e))?;

        Ok(match doc {
            Some(doc) => Lookup::Found(StudentRecord::from_document(id, &doc)),
            None => Lookup::Absent,
        })
    }

    /// Revalidate and overwrite all five fields of an existing student
    pub async fn update(
        &self,
        id: &str,
        submission: &StudentSubmission,
    ) -> RegistryResult<StudentRecord> {
        let fields =
            validate(submission).map_err(|e| self.rejected("update", Some(id), e.into()))?;

        self.store
            .merge(id, fields.to_document())
            .await
            .map_err(|e| self.store_failed("update", Some(id), e))?;

        self.metrics.increment_updates();
        log_event_with_fields(Event::StudentUpdated, &[("id", id)]);

        Ok(StudentRecord::new(id, fields))
    }

    /// Remove a student. Removing an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> RegistryResult<()> {
        self.store
            .delete(id)
            .await
            .map_err(|e| self.store_failed("delete", Some(id), e))?;

        self.metrics.increment_deletions();
        log_event_with_fields(Event::StudentDeleted, &[("id", id)]);

        Ok(())
    }

    fn rejected(&self, op: &str, id: Option<&str>, err: RegistryError) -> RegistryError {
        self.metrics.increment_rejections();
        let kind = err.kind();
        log_event_with_fields(
            Event::SubmissionRejected,
            &[("op", op), ("id", id.unwrap_or("")), ("kind", kind)],
        );
        err
    }

    fn store_failed(&self, op: &str, id: Option<&str>, err: StoreError) -> RegistryError {
        self.metrics.increment_store_failures();
        let reason = err.to_string();
        log_event_with_fields(
            Event::StoreFailure,
            &[
                ("op", op),
                ("id", id.unwrap_or("")),
                ("backend", self.store.backend_name()),
                ("reason", reason.as_str()),
            ],
        );
        RegistryError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::errors::ValidationError;
    use crate::store::InMemoryStore;

    fn registry() -> (Registry, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let registry = Registry::new(store.clone(), Arc::new(MetricsRegistry::new()));
        (registry, store)
    }

    fn asha() -> StudentSubmission {
        StudentSubmission::new("Asha", "asha@test.in", "+919876543210", "F", "Science")
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (registry, _) = registry();
        let created = registry.create(&asha()).await.unwrap();

        let fetched = registry.get(&created.id).await.unwrap().found().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.fields.email, "asha@test.in");
        assert_eq!(registry.metrics().snapshot().registrations, 1);
    }

    #[tokio::test]
    async fn test_invalid_create_writes_nothing() {
        let (registry, store) = registry();
        let mut sub = asha();
        sub.contact = Some("9876543210".into());

        let err = registry.create(&sub).await.unwrap_err();
        assert_eq!(err.validation(), Some(ValidationError::InvalidContact));
        assert!(store.is_empty());
        assert_eq!(registry.metrics().snapshot().rejections, 1);
    }

    #[tokio::test]
    async fn test_create_store_failure() {
        let (registry, store) = registry();
        store.set_available(false);
        let err = registry.create(&asha()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(registry.metrics().snapshot().store_failures, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_absent() {
        let (registry, _) = registry();
        assert!(registry.get("missing").await.unwrap().is_absent());
    }

    #[tokio::test]
    async fn test_list_degrades_on_store_failure() {
        let (registry, store) = registry();
        registry.create(&asha()).await.unwrap();
        store.set_available(false);

        let list = registry.list().await;
        assert!(list.students.is_empty());
        assert!(list.error.unwrap().starts_with("DB Error:"));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (registry, _) = registry();
        let created = registry.create(&asha()).await.unwrap();

        let mut changed = asha();
        changed.stream = Some("Commerce".into());
        changed.email = Some("asha@school.com".into());
        let updated = registry.update(&created.id, &changed).await.unwrap();
        assert_eq!(updated.id, created.id);

        let fetched = registry.get(&created.id).await.unwrap().found().unwrap();
        assert_eq!(fetched.fields.stream, "Commerce");
        assert_eq!(fetched.fields.email, "asha@school.com");
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_record_unchanged() {
        let (registry, _) = registry();
        let created = registry.create(&asha()).await.unwrap();

        let mut bad = asha();
        bad.email = Some("bad".into());
        let err = registry.update(&created.id, &bad).await.unwrap_err();
        assert_eq!(err.validation(), Some(ValidationError::InvalidEmail));
        assert!(err.to_string().starts_with("Invalid Input"));

        let fetched = registry.get(&created.id).await.unwrap().found().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_store_error() {
        let (registry, _) = registry();
        let err = registry.update("ghost", &asha()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_twice_succeeds() {
        let (registry, _) = registry();
        let created = registry.create(&asha()).await.unwrap();

        registry.delete(&created.id).await.unwrap();
        registry.delete(&created.id).await.unwrap();
        assert!(registry.get(&created.id).await.unwrap().is_absent());
        assert!(registry.list().await.students.is_empty());
    }
}
