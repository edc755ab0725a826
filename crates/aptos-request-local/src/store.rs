// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! The key/value map owned by every execution context, including the
//! type-checked counter arithmetic used by `incr` and `decr`.

use crate::error::{Error, Result};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Direction of a counter update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterOp {
    Incr,
    Decr,
}

impl CounterOp {
    fn apply(self, current: &Number, count: &Number) -> Option<Number> {
        if let (Some(current), Some(count)) = (current.as_i64(), count.as_i64()) {
            let result = match self {
                CounterOp::Incr => current.checked_add(count),
                CounterOp::Decr => current.checked_sub(count),
            };
            if let Some(result) = result {
                return Some(Number::from(result));
            }
        }

        // Anything that does not fit i64 arithmetic falls back to f64
        let current = current.as_f64()?;
        let count = count.as_f64()?;
        let result = match self {
            CounterOp::Incr => current + count,
            CounterOp::Decr => current - count,
        };
        Number::from_f64(result)
    }
}

/// Returns the name a dynamically typed caller would see for `value`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    entries: HashMap<String, Value>,
}

impl Store {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn set(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Overlays `partial` on the current entries.
    ///
    /// The merged map is built off to the side and swapped in as a whole, so
    /// the store is never observed half merged.
    pub fn merge<I>(&mut self, partial: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut merged = self.entries.clone();
        merged.extend(partial);
        self.entries = merged;
    }

    /// Returns an independent copy of every entry.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies `op` to the counter under `key` and returns the new value.
    ///
    /// An absent key counts as zero. The store is left untouched on error.
    pub fn update_counter(&mut self, key: &str, count: &Number, op: CounterOp) -> Result<Number> {
        let zero = Number::from(0);
        let current = match self.entries.get(key) {
            None => &zero,
            Some(Value::Number(number)) => number,
            Some(other) => {
                return Err(Error::TypeMismatch {
                    key: key.to_string(),
                    observed: type_name(other),
                })
            },
        };

        let updated = op
            .apply(current, count)
            .ok_or_else(|| Error::CounterOverflow {
                key: key.to_string(),
            })?;
        self.entries
            .insert(key.to_string(), Value::Number(updated.clone()));
        Ok(updated)
    }
}
