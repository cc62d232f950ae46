// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Names handled by the task builtin dispatch.
//!
//! Keep in sync with `Runtime::call_function` and the `call_*_method`
//! handlers; `tests/method_names_test.rs` checks every entry dispatches.

pub const FUNCTIONS: &[&str] = &["spawn", "current_task_id", "JoinBarrier"];

pub const TASK_METHODS: &[&str] = &["id", "status", "is_done", "wait", "join", "result", "error"];

pub const BARRIER_METHODS: &[&str] = &["add", "done", "wait", "count"];
