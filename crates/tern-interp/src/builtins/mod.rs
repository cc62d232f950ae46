// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Methods on task runtime types: Task and JoinBarrier.

mod barrier;
mod task;

use tern_rt::Value;

use crate::runtime::{Runtime, RuntimeError};

impl Runtime {
    /// Dispatch a method call on a task runtime value.
    pub fn call_method(
        &self,
        receiver: &Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match receiver {
            Value::Task(handle) => self.call_task_method(handle, method, args),
            Value::Barrier(barrier) => self.call_barrier_method(barrier, method, args),
            _ => Err(RuntimeError::NoSuchMethod {
                ty: receiver.type_name().to_string(),
                method: method.to_string(),
            }),
        }
    }
}

fn option(value: Option<Value>) -> Value {
    match value {
        Some(v) => Value::Enum {
            name: "Option".to_string(),
            variant: "Some".to_string(),
            fields: vec![v],
        },
        None => Value::Enum {
            name: "Option".to_string(),
            variant: "None".to_string(),
            fields: vec![],
        },
    }
}
