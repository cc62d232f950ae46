// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// How composite values are snapshotted when they cross a task boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationPolicy {
    /// Scalars are copied; composites alias the spawner's storage.
    #[default]
    Shallow,
    /// Scalars and composites are both copied.
    Deep,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Task threads are named `{thread_name_prefix}-{id}`.
    pub thread_name_prefix: String,
    /// Stack size for task threads. `None` uses the platform default.
    pub stack_size: Option<usize>,
    pub isolation: IsolationPolicy,
    /// Extra spawn arguments are bound as `{arg_prefix}0`, `{arg_prefix}1`, ...
    pub arg_prefix: String,
}

impl SchedulerConfig {
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn with_isolation(mut self, isolation: IsolationPolicy) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_arg_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.arg_prefix = prefix.into();
        self
    }

    pub(crate) fn arg_name(&self, index: usize) -> String {
        format!("{}{}", self.arg_prefix, index)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "tern-task".to_string(),
            stack_size: None,
            isolation: IsolationPolicy::Shallow,
            arg_prefix: "__arg".to_string(),
        }
    }
}
