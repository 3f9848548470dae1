use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Lifecycle of a background index rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RebuildStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Point-in-time view of the most recent rebuild.
#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct RebuildSnapshot {
    pub status: RebuildStatus,
    pub posts_indexed: usize,
    /// Failure message of the last rebuild, if it failed.
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Tracks background rebuilds so their progress is observable over HTTP.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone, Default)]
pub struct RebuildTracker {
    inner: Arc<Mutex<RebuildSnapshot>>,
}

impl RebuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition to `Running` unless a rebuild is already in flight.
    /// Returns `false` when one is.
    pub fn try_start(&self) -> bool {
        let mut snapshot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.status == RebuildStatus::Running {
            return false;
        }
        *snapshot = RebuildSnapshot {
            status: RebuildStatus::Running,
            posts_indexed: 0,
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        };
        true
    }

    pub fn finish(&self, posts_indexed: usize) {
        let mut snapshot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        snapshot.status = RebuildStatus::Succeeded;
        snapshot.posts_indexed = posts_indexed;
        snapshot.finished_at = Some(Utc::now());
    }

    pub fn fail(&self, error: String) {
        let mut snapshot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        snapshot.status = RebuildStatus::Failed;
        snapshot.error = Some(error);
        snapshot.finished_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> RebuildSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let tracker = RebuildTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, RebuildStatus::Idle);
        assert!(snapshot.started_at.is_none());
    }

    #[test]
    fn test_try_start_refuses_concurrent_rebuild() {
        let tracker = RebuildTracker::new();
        assert!(tracker.try_start());
        assert!(!tracker.try_start());
    }

    #[test]
    fn test_finish_records_count() {
        let tracker = RebuildTracker::new();
        assert!(tracker.try_start());
        tracker.finish(42);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, RebuildStatus::Succeeded);
        assert_eq!(snapshot.posts_indexed, 42);
        assert!(snapshot.finished_at.is_some());

        // A finished rebuild can be started again.
        assert!(tracker.try_start());
    }

    #[test]
    fn test_fail_records_error() {
        let tracker = RebuildTracker::new();
        assert!(tracker.try_start());
        tracker.fail("database unreachable".to_string());

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, RebuildStatus::Failed);
        assert_eq!(snapshot.error.as_deref(), Some("database unreachable"));
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = RebuildTracker::new();
        let clone = tracker.clone();
        assert!(tracker.try_start());
        assert_eq!(clone.snapshot().status, RebuildStatus::Running);
    }
}
