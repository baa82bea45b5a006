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

use std::collections::HashMap;

use ahash::RandomState;
use cheetah_string::CheetahString;

use crate::model::Value;

/// Caller-supplied values consulted when a filter parameter declares a
/// context key but the session has no explicit binding for it.
///
/// The context is passed into each interception call. Nothing is read from
/// global or thread-local state.
///
/// # Example
///
/// ```ignore
/// let context = FilterContext::new().with("currentTenant", 1);
/// let predicate = engine.intercept_with_context(&entity, None, &session, &context)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterContext {
    values: HashMap<CheetahString, Value, RandomState>,
}

impl FilterContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the previous one if any.
    #[inline]
    pub fn put(&mut self, key: impl Into<CheetahString>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<CheetahString>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
