//! The landmark query pipeline.
//!
//! [`LandmarkPipeline`] owns the in-memory annotation list a screen renders.
//! It fetches records from a [`LandmarkBackend`], turns them into
//! [`Annotation`]s for the current user and device location, and keeps the
//! list consistent after single create/update/delete operations without a
//! full reload.
//!
//! The list is an `IndexMap` keyed by landmark id, so updates and deletes
//! address entries by id while the display order is preserved. Every
//! operation holds the list lock for its whole duration, so operations on
//! one pipeline never interleave.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::boundary::BoundaryPreference;
use crate::defaults::{EVENT_BUS_CAPACITY, QUERY_LIMIT};
use crate::error::{Error, Result};
use crate::events::{EventBus, ListEvent};
use crate::models::{
    Annotation, Coordinates, LandmarkQuery, LandmarkRecord, NearPoint, NewLandmark, ScopeFilter,
};
use crate::search::{condense_whitespace, filter_annotations};
use crate::traits::LandmarkBackend;

type AnnotationList = IndexMap<String, Annotation>;

/// Fetches, annotates and keeps the landmark list for one screen.
pub struct LandmarkPipeline {
    backend: Arc<dyn LandmarkBackend>,
    annotations: Mutex<AnnotationList>,
    events: EventBus,
}

impl LandmarkPipeline {
    /// Create a pipeline with an empty list.
    pub fn new(backend: Arc<dyn LandmarkBackend>) -> Self {
        Self {
            backend,
            annotations: Mutex::new(IndexMap::new()),
            events: EventBus::new(EVENT_BUS_CAPACITY),
        }
    }

    /// Subscribe to list change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    /// Replace the list with a fresh query result.
    ///
    /// With a known location the backend is asked for the nearest landmarks
    /// (within `boundary`, if bounded) and each annotation gets a distance
    /// hint. Without one, landmarks come back ordered by note text and carry
    /// no hint. The backend order is kept as is.
    ///
    /// On failure the current list is left untouched.
    pub async fn fetch_all(
        &self,
        current_location: Option<Coordinates>,
        boundary: BoundaryPreference,
        current_user: &str,
    ) -> Result<Vec<Annotation>> {
        let start = Instant::now();
        let mut list = self.annotations.lock().await;

        let query = LandmarkQuery {
            near: current_location.map(|origin| NearPoint {
                origin,
                within_km: boundary.radius_km(),
            }),
            limit: QUERY_LIMIT,
        };
        debug!(
            subsystem = "pipeline",
            op = "fetch_all",
            boundary = %boundary,
            radius_km = ?boundary.radius_km(),
            has_location = current_location.is_some(),
            "Querying landmarks"
        );

        let records = self
            .backend
            .query(&query)
            .await
            .inspect_err(|e| log_failure("fetch_all", None, e))?;

        *list = records
            .into_iter()
            .map(|record| {
                let annotation = Annotation::from_record(record, current_user, current_location);
                (annotation.id.clone(), annotation)
            })
            .collect();

        info!(
            subsystem = "pipeline",
            op = "fetch_all",
            result_count = list.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Landmarks loaded"
        );
        self.events.emit(ListEvent::Reloaded { count: list.len() });
        Ok(list.values().cloned().collect())
    }

    /// Store a new landmark at `location` and append it to the list.
    ///
    /// The note is expected to be validated by the caller; only an empty
    /// note is rejected here.
    pub async fn create(
        &self,
        current_user: &str,
        note: &str,
        location: Coordinates,
    ) -> Result<Annotation> {
        reject_empty_note(note)?;
        let mut list = self.annotations.lock().await;

        let record = self
            .backend
            .create(NewLandmark {
                author: current_user.to_string(),
                note: note.to_string(),
                coordinates: location,
            })
            .await
            .inspect_err(|e| log_failure("create", None, e))?;

        // Measured from the creation point, so normally "just here".
        let annotation = Annotation::from_record(record, current_user, Some(location));
        list.insert(annotation.id.clone(), annotation.clone());

        info!(
            subsystem = "pipeline",
            op = "create",
            landmark_id = %annotation.id,
            username = %current_user,
            "Landmark created"
        );
        self.events.emit(ListEvent::Added {
            id: annotation.id.clone(),
        });
        Ok(annotation)
    }

    /// Replace the note of landmark `id` and refresh its list entry in place.
    ///
    /// Fails with [`Error::RecordNotFound`] unless the backend holds exactly
    /// one record with that id. If the entry is missing from the local list
    /// the list is left as it is.
    pub async fn update(
        &self,
        id: &str,
        new_note: &str,
        current_location: Option<Coordinates>,
        current_user: &str,
    ) -> Result<Annotation> {
        reject_empty_note(new_note)?;
        let mut list = self.annotations.lock().await;

        let mut record = self
            .find_unique(id)
            .await
            .inspect_err(|e| log_failure("update", Some(id), e))?;
        record.note = new_note.to_string();
        let saved = self
            .backend
            .save(&record)
            .await
            .inspect_err(|e| log_failure("update", Some(id), e))?;

        let annotation = Annotation::from_record(saved, current_user, current_location);
        match list.get_mut(id) {
            Some(slot) => {
                *slot = annotation.clone();
                self.events.emit(ListEvent::Updated { id: id.to_string() });
            }
            None => debug!(
                subsystem = "pipeline",
                op = "update",
                landmark_id = %id,
                "Updated landmark not in local list"
            ),
        }

        info!(
            subsystem = "pipeline",
            op = "update",
            landmark_id = %id,
            "Landmark updated"
        );
        Ok(annotation)
    }

    /// Delete landmark `id` and drop it from the list.
    ///
    /// Same lookup rules as [`update`](Self::update).
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut list = self.annotations.lock().await;

        let record = self
            .find_unique(id)
            .await
            .inspect_err(|e| log_failure("delete", Some(id), e))?;
        self.backend
            .delete(&record)
            .await
            .inspect_err(|e| log_failure("delete", Some(id), e))?;

        if list.shift_remove(id).is_some() {
            self.events.emit(ListEvent::Removed { id: id.to_string() });
        } else {
            debug!(
                subsystem = "pipeline",
                op = "delete",
                landmark_id = %id,
                "Deleted landmark not in local list"
            );
        }

        info!(
            subsystem = "pipeline",
            op = "delete",
            landmark_id = %id,
            "Landmark deleted"
        );
        Ok(())
    }

    /// Ordered snapshot of the current list.
    pub async fn annotations(&self) -> Vec<Annotation> {
        self.annotations.lock().await.values().cloned().collect()
    }

    /// Look up one entry of the current list.
    pub async fn get(&self, id: &str) -> Option<Annotation> {
        self.annotations.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.annotations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.annotations.lock().await.is_empty()
    }

    /// Drop every entry, e.g. after logout.
    pub async fn clear(&self) {
        self.annotations.lock().await.clear();
        self.events.emit(ListEvent::Reloaded { count: 0 });
    }

    /// Filter the current list by text and scope.
    pub async fn search(&self, query: &str, scope: ScopeFilter) -> Vec<Annotation> {
        let source = self.annotations().await;
        let results = filter_annotations(&source, query, scope);
        debug!(
            subsystem = "pipeline",
            op = "search",
            query = %query,
            scope = %scope,
            result_count = results.len(),
            "Filtered landmarks"
        );
        results
    }

    async fn find_unique(&self, id: &str) -> Result<LandmarkRecord> {
        let mut matches = self.backend.find_by_id(id).await?;
        if matches.len() != 1 {
            return Err(Error::RecordNotFound(format!(
                "landmark {} matched {} records",
                id,
                matches.len()
            )));
        }
        matches
            .pop()
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))
    }
}

fn reject_empty_note(note: &str) -> Result<()> {
    if condense_whitespace(note).is_empty() {
        return Err(Error::InvalidInput("note is empty".to_string()));
    }
    Ok(())
}

fn log_failure(op: &str, id: Option<&str>, err: &Error) {
    warn!(
        subsystem = "pipeline",
        op,
        landmark_id = id.unwrap_or(""),
        network = err.is_network(),
        error = %err,
        "Landmark operation failed"
    );
}
