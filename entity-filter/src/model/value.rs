// Copyright 2023 The Entity Filter Authors
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

use std::cmp::Ordering;
use std::fmt;

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;

/// Declared type of an entity field or a filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    Text,
}

impl ScalarType {
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }

    /// Whether a value of this runtime type may be bound where `self` is declared.
    ///
    /// `Int` widens to `Float`; `Null` is never accepted.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value.scalar_type()) {
            (_, None) => false,
            (ScalarType::Float, Some(ScalarType::Int)) => true,
            (declared, Some(actual)) => declared == actual,
        }
    }

    /// Whether operands of the two types can be compared with each other.
    pub fn comparable_with(self, other: ScalarType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// Converts an accepted value to the canonical representation of this type.
    pub(crate) fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (ScalarType::Float, Value::Int(i)) => Value::Float(i as f64),
            (_, value) => value,
        }
    }
}

/// Scalar value read from an entity field, bound to a parameter or embedded
/// as a literal in a predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(CheetahString),
}

impl Value {
    /// Runtime type of the value, `None` for `Null`.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Int(_) => Some(ScalarType::Int),
            Value::Float(_) => Some(ScalarType::Float),
            Value::Text(_) => Some(ScalarType::Text),
        }
    }

    /// Name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Compares two values.
    ///
    /// Integers and floats compare numerically with each other. `Null` is equal
    /// to `Null` and unordered against everything else. Values of incompatible
    /// types are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Text(s) => write!(f, "'{}'", s.as_str().replace('\'', "''")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(CheetahString::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(CheetahString::from(value))
    }
}

impl From<CheetahString> for Value {
    fn from(value: CheetahString) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
