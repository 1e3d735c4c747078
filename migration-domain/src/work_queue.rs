//! Work Queue (C2, §4.2): the pure state machine and scheduling rules. The
//! tokio-task pool that actually runs work-item bodies lives in the
//! application crate; this module owns only the data each item carries and
//! the eligibility/ordering logic a scheduler must respect.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem<I, R> {
    pub id: Uuid,
    pub input: I,
    pub status: WorkItemStatus,
    pub result: Option<R>,
    pub error: Option<String>,
    /// Higher runs first.
    pub priority: i64,
    pub dependencies: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub attempt: u32,
    pub max_attempts: u32,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl<I, R> WorkItem<I, R> {
    pub fn new(input: I, priority: i64, max_attempts: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            status: WorkItemStatus::Pending,
            result: None,
            error: None,
            priority,
            dependencies: HashSet::new(),
            created_at,
            started_at: None,
            completed_at: None,
            attempt: 0,
            max_attempts,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = Uuid>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            WorkItemStatus::Completed | WorkItemStatus::Failed | WorkItemStatus::Cancelled
        )
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = WorkItemStatus::Running;
        self.started_at = Some(now);
        self.attempt += 1;
    }

    pub fn complete(&mut self, result: R, now: DateTime<Utc>) {
        self.status = WorkItemStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.completed_at = Some(now);
    }

    /// §4.2: a failed attempt re-enters `Pending` while attempts remain,
    /// otherwise becomes terminally `Failed`.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.error = Some(error.into());
        if self.attempt < self.max_attempts {
            self.status = WorkItemStatus::Pending;
            self.started_at = None;
        } else {
            self.status = WorkItemStatus::Failed;
            self.completed_at = Some(now);
        }
    }

    /// §4.2/§8.1: cancelling a `Pending` item is immediate and prevents
    /// retries; cancelling a `Running` item is best-effort at the caller.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        if matches!(self.status, WorkItemStatus::Pending | WorkItemStatus::Running) {
            self.status = WorkItemStatus::Cancelled;
            self.completed_at = Some(now);
            true
        } else {
            false
        }
    }
}

/// Orders items by `(priority desc, created_at asc)` - the FIFO tiebreak the
/// scheduler dequeues by.
pub fn dequeue_order<I, R>(a: &WorkItem<I, R>, b: &WorkItem<I, R>) -> Ordering {
    b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at))
}

/// §4.2: an item is eligible to run once every dependency id refers to a
/// `Completed` item. Unknown dependency ids (not present in `statuses`) are
/// treated as not yet satisfied.
pub fn is_eligible<I, R>(item: &WorkItem<I, R>, statuses: &HashMap<Uuid, WorkItemStatus>) -> bool {
    item.status == WorkItemStatus::Pending
        && item
            .dependencies
            .iter()
            .all(|dep| statuses.get(dep) == Some(&WorkItemStatus::Completed))
}

/// Picks the next eligible item to dequeue, honoring priority/FIFO order.
/// Returns `None` when nothing is currently eligible (callers should
/// re-enqueue non-eligible items rather than treat this as queue-empty).
pub fn next_eligible<'a, I, R>(
    items: &'a [WorkItem<I, R>],
    statuses: &HashMap<Uuid, WorkItemStatus>,
) -> Option<&'a WorkItem<I, R>> {
    items
        .iter()
        .filter(|item| is_eligible(item, statuses))
        .min_by(|a, b| dequeue_order(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn cancel_pending_item_skips_worker() {
        let mut item: WorkItem<u32, u32> = WorkItem::new(1, 0, 3, now());
        assert!(item.cancel(now()));
        assert_eq!(item.status, WorkItemStatus::Cancelled);
    }

    #[test]
    fn cancel_completed_item_is_noop() {
        let mut item: WorkItem<u32, u32> = WorkItem::new(1, 0, 3, now());
        item.start(now());
        item.complete(42, now());
        assert!(!item.cancel(now()));
        assert_eq!(item.status, WorkItemStatus::Completed);
    }

    #[test]
    fn failed_item_retries_until_attempts_exhausted() {
        let mut item: WorkItem<u32, u32> = WorkItem::new(1, 0, 2, now());
        item.start(now());
        item.fail("boom", now());
        assert_eq!(item.status, WorkItemStatus::Pending);
        item.start(now());
        item.fail("boom again", now());
        assert_eq!(item.status, WorkItemStatus::Failed);
        assert!(item.attempt <= item.max_attempts);
    }

    #[test]
    fn dependent_item_not_eligible_until_dependency_completes() {
        let dep_id = Uuid::new_v4();
        let mut item: WorkItem<u32, u32> = WorkItem::new(1, 0, 1, now());
        item.dependencies.insert(dep_id);

        let mut statuses = HashMap::new();
        statuses.insert(dep_id, WorkItemStatus::Pending);
        assert!(!is_eligible(&item, &statuses));

        statuses.insert(dep_id, WorkItemStatus::Completed);
        assert!(is_eligible(&item, &statuses));
        item.status = WorkItemStatus::Running;
        assert!(!is_eligible(&item, &statuses));
    }

    #[test]
    fn next_eligible_prefers_higher_priority_then_fifo() {
        let low = WorkItem::<u32, u32>::new(1, 1, 1, now());
        let high = WorkItem::<u32, u32>::new(2, 5, 1, now());
        let items = vec![low.clone(), high.clone()];
        let statuses = HashMap::new();
        let next = next_eligible(&items, &statuses).unwrap();
        assert_eq!(next.id, high.id);
    }
}
