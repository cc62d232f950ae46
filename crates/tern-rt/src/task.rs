// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task records and handles.
//!
//! A task moves from `Running` to `Completed` or `Failed` exactly once. The
//! transition and the completion broadcast happen under the same lock, so a
//! waiter either sees the terminal state or is woken by it.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::TaskError;
use crate::value::{Bindings, Closure, Value};

/// Logical task identifier. Allocated in increasing order per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) i64);

impl TaskId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        self != TaskStatus::Running
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct TaskState {
    status: TaskStatus,
    outcome: Option<Result<Value, TaskError>>,
}

/// Per-spawn state.
pub(crate) struct Task {
    id: TaskId,
    body: Arc<Closure>,
    /// Isolated snapshot; moved into the executing thread when it starts.
    variables: Mutex<Option<Bindings>>,
    state: Mutex<TaskState>,
    completed: Condvar,
}

impl Task {
    pub(crate) fn new(id: TaskId, body: Arc<Closure>, variables: Bindings) -> Arc<Self> {
        Arc::new(Self {
            id,
            body,
            variables: Mutex::new(Some(variables)),
            state: Mutex::new(TaskState {
                status: TaskStatus::Running,
                outcome: None,
            }),
            completed: Condvar::new(),
        })
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn body(&self) -> &Arc<Closure> {
        &self.body
    }

    /// Take the isolated variables. Only the executing thread calls this.
    pub(crate) fn take_variables(&self) -> Bindings {
        self.variables.lock().take().unwrap_or_default()
    }

    /// Record the terminal outcome and wake every waiter.
    ///
    /// Returns `false` if the task was already terminal; the first outcome wins.
    pub(crate) fn finish(&self, outcome: Result<Value, TaskError>) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = if outcome.is_ok() {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        state.outcome = Some(outcome);
        self.completed.notify_all();
        true
    }
}

/// Script-visible handle to a spawned task. Cheap to clone.
#[derive(Clone)]
pub struct TaskHandle {
    task: Arc<Task>,
}

impl TaskHandle {
    pub(crate) fn new(task: Arc<Task>) -> Self {
        Self { task }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn status(&self) -> TaskStatus {
        self.task.state.lock().status
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// The returned value, once the task has completed.
    pub fn result(&self) -> Option<Value> {
        match &self.task.state.lock().outcome {
            Some(Ok(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// The failure, once the task has failed.
    pub fn error(&self) -> Option<TaskError> {
        match &self.task.state.lock().outcome {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// `None` while the task is still running.
    pub fn outcome(&self) -> Option<Result<Value, TaskError>> {
        self.task.state.lock().outcome.clone()
    }

    /// Block until the task is terminal.
    pub fn wait(&self) -> Result<Value, TaskError> {
        let mut state = self.task.state.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return outcome.clone();
            }
            self.task.completed.wait(&mut state);
        }
    }

    /// Block for at most `timeout`. `None` if the task is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Value, TaskError>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.task.state.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return Some(outcome.clone());
            }
            if self.task.completed.wait_until(&mut state, deadline).timed_out() {
                return state.outcome.clone();
            }
        }
    }

    pub fn same_task(&self, other: &TaskHandle) -> bool {
        Arc::ptr_eq(&self.task, &other.task)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.task.id)
            .field("func", &self.task.body.func.name)
            .field("status", &self.status())
            .finish()
    }
}
