//! Per-task request serialization.
//!
//! Two mutations of the same task could otherwise settle in the order
//! their responses arrive. A [`TaskPermit`] is held from before the request
//! is issued until the local patch is applied, so mutations of one task
//! settle in the order they were issued. Different tasks never wait on
//! each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use taskgrid_proto::TaskId;
use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>;

/// Hands out one permit per task id at a time, first come first served.
#[derive(Debug, Default, Clone)]
pub struct TaskSequencer {
    locks: Arc<Mutex<LockMap>>,
}

impl TaskSequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other permit for `id` is held, then returns one.
    pub async fn acquire(&self, id: &TaskId) -> TaskPermit {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        // Declared before the wait so it drops after the pending lock future
        // when this future is cancelled.
        let _waiter = Waiter {
            id,
            locks: &self.locks,
        };
        let guard = lock.lock_owned().await;
        TaskPermit {
            id: id.clone(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Returns the number of task ids with a held or awaited permit.
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Removes the entry for `id` if nobody holds or awaits its lock.
fn release_if_idle(locks: &mut LockMap, id: &TaskId) {
    // Only the map holds the lock now.
    if locks
        .get(id)
        .is_some_and(|lock| Arc::strong_count(lock) == 1)
    {
        locks.remove(id);
    }
}

/// Cleans up after an `acquire` that is dropped before it yields a permit.
struct Waiter<'a> {
    id: &'a TaskId,
    locks: &'a Mutex<LockMap>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        release_if_idle(&mut self.locks.lock(), self.id);
    }
}

/// Exclusive right to mutate one task. Released on drop.
#[derive(Debug)]
pub struct TaskPermit {
    id: TaskId,
    locks: Arc<Mutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TaskPermit {
    /// Returns the task this permit covers.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.id
    }
}

impl Drop for TaskPermit {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        drop(self.guard.take());
        release_if_idle(&mut locks, &self.id);
    }
}
