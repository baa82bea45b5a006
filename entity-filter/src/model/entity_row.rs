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

use crate::model::entity_type::EntityType;
use crate::model::value::Value;

/// Read access to a materialized entity.
///
/// Compiled predicates evaluate against this trait, so any row representation
/// of the mapping layer can be filtered in memory.
pub trait EntityRow {
    /// Entity type of the row.
    fn entity_type(&self) -> &EntityType;

    /// Value of field `name`, `None` if the row has no such field.
    fn get(&self, name: &str) -> Option<&Value>;
}

/// Field-map backed [`EntityRow`].
///
/// # Example
///
/// ```ignore
/// let row = MapEntityRow::new("BlogEntry")
///     .with("Id", 1)
///     .with("TenantId", 1);
/// assert_eq!(row.get("TenantId"), Some(&Value::Int(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntityRow {
    entity_type: EntityType,
    fields: HashMap<CheetahString, Value, RandomState>,
}

impl MapEntityRow {
    pub fn new(entity_type: impl Into<EntityType>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: HashMap::with_hasher(RandomState::default()),
        }
    }

    /// Sets a field, returning the previous value if any.
    #[inline]
    pub fn put(&mut self, name: impl Into<CheetahString>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<CheetahString>, value: impl Into<Value>) -> Self {
        self.put(name, value);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl EntityRow for MapEntityRow {
    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
