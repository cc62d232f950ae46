// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task handle methods.

use tern_rt::{TaskHandle, Value};

use super::option;
use crate::runtime::{expect_arity, Runtime, RuntimeError};

impl Runtime {
    pub(crate) fn call_task_method(
        &self,
        handle: &TaskHandle,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match method {
            "id" => {
                expect_arity(&args, 0)?;
                Ok(Value::Int(handle.id().as_i64()))
            }
            "status" => {
                expect_arity(&args, 0)?;
                Ok(Value::string(handle.status().as_str()))
            }
            "is_done" => {
                expect_arity(&args, 0)?;
                Ok(Value::Bool(handle.is_finished()))
            }
            // Task failures are data here, not script errors.
            "wait" | "join" => {
                expect_arity(&args, 0)?;
                Ok(match handle.wait() {
                    Ok(val) => Value::ok(val),
                    Err(e) => Value::err(Value::string(e.to_string())),
                })
            }
            "result" => {
                expect_arity(&args, 0)?;
                Ok(option(handle.result()))
            }
            "error" => {
                expect_arity(&args, 0)?;
                Ok(option(handle.error().map(|e| Value::string(e.to_string()))))
            }
            _ => Err(RuntimeError::NoSuchMethod {
                ty: "Task".to_string(),
                method: method.to_string(),
            }),
        }
    }
}
