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

use crate::model::Value;

/// Comparison operator of a predicate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Applies the operator. Ordering operators never match `Null`.
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        if self.is_ordering() && (left.is_null() || right.is_null()) {
            return false;
        }
        match (self, left.compare(right)) {
            (_, None) => false,
            (CompareOp::Eq, Some(ord)) => ord == Ordering::Equal,
            (CompareOp::Ne, Some(ord)) => ord != Ordering::Equal,
            (CompareOp::Lt, Some(ord)) => ord == Ordering::Less,
            (CompareOp::Le, Some(ord)) => ord != Ordering::Greater,
            (CompareOp::Gt, Some(ord)) => ord == Ordering::Greater,
            (CompareOp::Ge, Some(ord)) => ord != Ordering::Less,
        }
    }

    #[inline]
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
