// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Bounded-concurrency task pool (§4.2/§5) that executes the domain's pure
//! `WorkItem` state machine. The domain owns eligibility/ordering rules;
//! this module owns the tokio runtime that drives them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use migration_domain::work_queue::{dequeue_order, is_eligible, WorkItem, WorkItemStatus};

/// Runs `items` to completion, honoring dependency order, the
/// priority/FIFO dequeue tiebreak, and a cap of `max_concurrency` in-flight
/// tasks. `handler` is cloned once per dispatched item; a `Err` return
/// drives the item's own retry-until-`max_attempts` policy rather than
/// aborting the pool.
pub async fn run_pool<I, R, F, Fut>(mut items: Vec<WorkItem<I, R>>, max_concurrency: usize, handler: F) -> Vec<WorkItem<I, R>>
where
    I: Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + Clone + 'static,
    Fut: std::future::Future<Output = Result<R, String>> + Send + 'static,
{
    let max_concurrency = max_concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut join_set: JoinSet<(Uuid, Result<R, String>)> = JoinSet::new();
    let mut in_flight: HashMap<Uuid, ()> = HashMap::new();

    loop {
        let statuses: HashMap<Uuid, WorkItemStatus> = items.iter().map(|item| (item.id, item.status)).collect();

        loop {
            if in_flight.len() >= max_concurrency {
                break;
            }
            let next_id = items
                .iter()
                .filter(|item| !in_flight.contains_key(&item.id) && is_eligible(item, &statuses))
                .min_by(|a, b| dequeue_order(a, b))
                .map(|item| item.id);
            let Some(id) = next_id else { break };

            let item = items.iter_mut().find(|item| item.id == id).expect("id came from items");
            item.start(Utc::now());
            in_flight.insert(id, ());

            let input = item.input.clone();
            let handler = handler.clone();
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
            join_set.spawn(async move {
                let _permit = permit;
                (id, handler(input).await)
            });
        }

        if in_flight.is_empty() {
            if items.iter().all(WorkItem::is_terminal) {
                break;
            }
            // Nothing eligible and nothing running: remaining items are
            // blocked on dependencies that will never complete (e.g. a
            // dependency exhausted its retries). Cancel them rather than
            // spin forever.
            for item in items.iter_mut().filter(|item| !item.is_terminal()) {
                item.fail("blocked on a dependency that did not complete", Utc::now());
                if !item.is_terminal() {
                    item.cancel(Utc::now());
                }
            }
            break;
        }

        let Some(joined) = join_set.join_next().await else { break };
        let (id, outcome) = joined.expect("work item task panicked");
        in_flight.remove(&id);
        let item = items.iter_mut().find(|item| item.id == id).expect("id came from items");
        match outcome {
            Ok(result) => item.complete(result, Utc::now()),
            Err(message) => item.fail(message, Utc::now()),
        }
    }

    items
}
