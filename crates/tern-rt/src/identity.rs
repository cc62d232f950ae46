// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Execution identity: which task is running on which thread.
//!
//! A mapping is registered by the task thread when it starts and removed by
//! the same thread on exit. The top-level interpreter thread never has one.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::warn;

use crate::error::TaskError;
use crate::task::TaskId;

#[derive(Debug, Default)]
pub struct IdentityRegistry {
    running: Mutex<HashMap<ThreadId, TaskId>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task running on the calling thread.
    pub fn self_id(&self) -> Result<TaskId, TaskError> {
        self.lookup(thread::current().id()).ok_or(TaskError::NotInTask)
    }

    pub fn lookup(&self, key: ThreadId) -> Option<TaskId> {
        self.running.lock().get(&key).copied()
    }

    /// Bind the calling thread to `id`.
    pub(crate) fn enter(&self, id: TaskId) -> ThreadId {
        let key = thread::current().id();
        if let Some(stale) = self.running.lock().insert(key, id) {
            warn!(task_id = %id, stale = %stale, "replaced stale identity mapping");
        }
        key
    }

    pub(crate) fn leave(&self, key: ThreadId) {
        self.running.lock().remove(&key);
    }

    /// Number of threads currently bound to a task.
    pub fn len(&self) -> usize {
        self.running.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
