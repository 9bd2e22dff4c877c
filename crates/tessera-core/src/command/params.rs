// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::fmt;

/// A single command parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// A flag.
    Bool(bool),
    /// A scalar such as a time slice or a fraction.
    Float(f32),
    /// A count or index.
    Int(i64),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

/// Name → value parameters attached to one command slot.
///
/// Slots are reused from one list build to the next, so a parameter set only
/// means something to the command currently occupying the slot. Reading a
/// name that was never written is a programming error: the typed getters
/// assert in debug builds and fall back to the type's default otherwise.
#[derive(Default, Clone, PartialEq)]
pub struct CommandParams {
    values: HashMap<&'static str, ParamValue>,
}

impl CommandParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `name`, replacing any previous value.
    pub fn set(&mut self, name: &'static str, value: impl Into<ParamValue>) {
        self.values.insert(name, value.into());
    }

    /// Returns the raw value stored under `name`.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.get(name).copied()
    }

    /// Checks whether `name` was written.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Reads a boolean parameter.
    pub fn bool(&self, name: &str) -> bool {
        match self.get(name) {
            Some(ParamValue::Bool(v)) => v,
            other => {
                Self::report_mismatch(name, "bool", other);
                false
            }
        }
    }

    /// Reads a float parameter.
    pub fn float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(ParamValue::Float(v)) => v,
            other => {
                Self::report_mismatch(name, "float", other);
                0.0
            }
        }
    }

    /// Reads an integer parameter.
    pub fn int(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(ParamValue::Int(v)) => v,
            other => {
                Self::report_mismatch(name, "int", other);
                0
            }
        }
    }

    /// Removes every parameter.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of parameters written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter was written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn report_mismatch(name: &str, expected: &str, found: Option<ParamValue>) {
        debug_assert!(
            false,
            "command parameter '{name}' read as {expected}, found {found:?}"
        );
        log::warn!("Command parameter '{name}' read as {expected}, found {found:?}.");
    }
}

impl fmt::Debug for CommandParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
