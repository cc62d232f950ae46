// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Snapshotting values that cross a task boundary.
//!
//! Scalars always get fresh storage, so a task mutating its copy of a string
//! is invisible to the spawner and vice versa. Composites alias the spawner's
//! storage under `IsolationPolicy::Shallow`; sharing them safely is the
//! script's job. `IsolationPolicy::Deep` copies them too.

use std::sync::Arc;

use crate::config::IsolationPolicy;
use crate::value::{Bindings, Closure, Value, ValueKind};

/// Snapshot a single value for use inside a task.
pub fn isolate(value: &Value, policy: IsolationPolicy) -> Value {
    match value.kind() {
        ValueKind::Scalar => value.deep_copy(),
        ValueKind::Composite => match policy {
            IsolationPolicy::Shallow => value.clone(),
            IsolationPolicy::Deep => value.deep_copy(),
        },
        ValueKind::Callable => match value {
            Value::Closure(c) => Value::Closure(Arc::new(Closure {
                func: c.func.clone(),
                params: c.params.clone(),
                captured: isolate_bindings(&c.captured, policy),
            })),
            _ => value.clone(),
        },
        ValueKind::Resource => value.clone(),
    }
}

/// Snapshot every binding, preserving order.
pub fn isolate_bindings(bindings: &Bindings, policy: IsolationPolicy) -> Bindings {
    bindings
        .iter()
        .map(|(name, value)| (name.clone(), isolate(value, policy)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FunctionRef;

    fn push(v: &Value, item: Value) {
        match v {
            Value::Vec(items) => items.lock().push(item),
            other => panic!("expected Vec, got {:?}", other),
        }
    }

    #[test]
    fn scalar_string_gets_own_buffer() {
        let original = Value::string("spawner");
        let snapshot = isolate(&original, IsolationPolicy::Shallow);
        if let Value::String(s) = &snapshot {
            s.lock().push_str("-task");
        }
        assert_eq!(original.as_string().unwrap(), "spawner");
        assert_eq!(snapshot.as_string().unwrap(), "spawner-task");
    }

    #[test]
    fn shallow_aliases_composites() {
        let original = Value::vec(vec![Value::Int(1)]);
        let snapshot = isolate(&original, IsolationPolicy::Shallow);
        push(&snapshot, Value::Int(2));
        assert_eq!(original.to_string(), "[1, 2]");
    }

    #[test]
    fn deep_copies_composites() {
        let original = Value::vec(vec![Value::Int(1)]);
        let snapshot = isolate(&original, IsolationPolicy::Deep);
        push(&snapshot, Value::Int(2));
        assert_eq!(original.to_string(), "[1]");
        assert_eq!(snapshot.to_string(), "[1, 2]");
    }

    #[test]
    fn closure_captures_are_isolated() {
        let name = Value::string("a");
        let closure = Value::closure(Closure::new(FunctionRef::new("f")).capture("name", name.clone()));
        let snapshot = isolate(&closure, IsolationPolicy::Shallow);
        let captured = &snapshot.as_closure().unwrap().captured["name"];
        if let Value::String(s) = captured {
            s.lock().push('b');
        }
        assert_eq!(name.as_string().unwrap(), "a");
    }

    #[test]
    fn bindings_keep_order() {
        let mut b = Bindings::new();
        b.insert("z".to_string(), Value::Int(1));
        b.insert("a".to_string(), Value::Int(2));
        let iso = isolate_bindings(&b, IsolationPolicy::Shallow);
        let names: Vec<_> = iso.keys().cloned().collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
