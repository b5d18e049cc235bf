//! Interactive editing session: the state a user builds up between actions.
//!
//! Each action takes the session by `&mut`, and the store hands out one async
//! mutex per session, so actions on the same session never overlap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::generation::reconcile::GenerationResult;
use crate::generation::variants::VariantSet;
use crate::models::campaign::LengthBucket;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub current_copy: String,
    pub current_plan: String,
    pub variant_set: Option<VariantSet>,
    pub selected_length: Option<LengthBucket>,
    pub adapted_copy: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            current_copy: String::new(),
            current_plan: String::new(),
            variant_set: None,
            selected_length: None,
            adapted_copy: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_copy(&self) -> bool {
        !self.current_copy.trim().is_empty()
    }

    /// Overwrites copy and plan with a finished generation. Variants belong to
    /// the previous copy, so they are dropped.
    pub fn record_generation(&mut self, result: GenerationResult, length: LengthBucket) {
        self.current_copy = result.copy;
        self.current_plan = result.plan;
        self.variant_set = None;
        self.selected_length = Some(length);
        self.touch();
    }

    pub fn record_variants(&mut self, variants: VariantSet) {
        self.variant_set = Some(variants);
        self.touch();
    }

    pub fn record_adaptation(&mut self, adapted: String) {
        self.adapted_copy = adapted;
        self.touch();
    }

    pub fn clear_generated(&mut self) {
        self.current_copy.clear();
        self.current_plan.clear();
        self.variant_set = None;
        self.touch();
    }

    pub fn clear_adapted(&mut self) {
        self.adapted_copy.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session registry. Nothing is persisted; idle sessions are
/// dropped by [`SessionStore::evict_idle`].
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session and returns a snapshot of it.
    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session.clone())));
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions untouched for longer than `max_idle` and returns how many
    /// went. A session whose lock is held is mid-action and always survives.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.updated_at >= cutoff,
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(plan: &str, copy: &str) -> GenerationResult {
        GenerationResult {
            plan: plan.to_string(),
            copy: copy.to_string(),
        }
    }

    #[test]
    fn test_record_generation_overwrites_and_drops_variants() {
        let mut session = Session::new();
        session.record_generation(result("plan one", "copy one"), LengthBucket::Short);
        session.record_variants(VariantSet {
            headlines: vec!["h".into()],
            ctas: vec!["c".into()],
        });

        session.record_generation(result("", "copy two"), LengthBucket::Long);

        assert_eq!(session.current_copy, "copy two");
        assert_eq!(session.current_plan, "", "plan is overwritten, never merged");
        assert!(session.variant_set.is_none());
        assert_eq!(session.selected_length, Some(LengthBucket::Long));
    }

    #[test]
    fn test_clear_generated_keeps_adapted_copy() {
        let mut session = Session::new();
        session.record_generation(result("p", "c"), LengthBucket::Medium);
        session.record_adaptation("adapted".into());

        session.clear_generated();

        assert!(!session.has_copy());
        assert!(session.current_plan.is_empty());
        assert_eq!(session.adapted_copy, "adapted");

        session.clear_adapted();
        assert!(session.adapted_copy.is_empty());
    }

    #[tokio::test]
    async fn test_store_create_get_remove() {
        let store = SessionStore::new();
        let session = store.create().await;
        assert_eq!(store.len().await, 1);

        let handle = store.get(session.id).await.expect("session exists");
        handle.lock().await.record_adaptation("x".into());
        assert_eq!(
            store.get(session.id).await.unwrap().lock().await.adapted_copy,
            "x"
        );

        assert!(store.remove(session.id).await);
        assert!(!store.remove(session.id).await);
        assert!(store.get(session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_unlocked_sessions() {
        let store = SessionStore::new();
        let fresh = store.create().await;
        let stale = store.create().await;
        let busy = store.create().await;

        let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
        store.get(stale.id).await.unwrap().lock().await.updated_at = an_hour_ago;
        let busy_handle = store.get(busy.id).await.unwrap();
        let mut busy_guard = busy_handle.lock().await;
        busy_guard.updated_at = an_hour_ago;

        let evicted = store.evict_idle(Duration::from_secs(600)).await;

        assert_eq!(evicted, 1);
        assert!(store.get(fresh.id).await.is_some());
        assert!(store.get(stale.id).await.is_none());
        assert!(store.get(busy.id).await.is_some(), "in-use session is kept");

        drop(busy_guard);
        assert_eq!(store.evict_idle(Duration::from_secs(600)).await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_idle_with_huge_ttl_keeps_everything() {
        let store = SessionStore::new();
        store.create().await;
        assert_eq!(store.evict_idle(Duration::MAX).await, 0);
        assert_eq!(store.len().await, 1);
    }
}
