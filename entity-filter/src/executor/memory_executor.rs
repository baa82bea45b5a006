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

use std::sync::Arc;

use entity_filter_error::FilterResult;
use parking_lot::RwLock;

use crate::executor::Query;
use crate::executor::QueryExecutor;
use crate::expression::CompiledPredicate;
use crate::model::EntityRow;
use crate::model::MapEntityRow;

/// In-memory [`QueryExecutor`] over [`MapEntityRow`]s.
///
/// Evaluates the query predicate row by row, then the injected filters through
/// their cached closures. Useful for tests and demos of the filter engine
/// without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    rows: Arc<RwLock<Vec<MapEntityRow>>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, row: MapEntityRow) {
        self.rows.write().push(row);
    }

    pub fn with_rows(rows: impl IntoIterator<Item = MapEntityRow>) -> Self {
        let executor = Self::new();
        executor.rows.write().extend(rows);
        executor
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl QueryExecutor for MemoryExecutor {
    type Row = MapEntityRow;

    fn execute(&self, query: &Query) -> FilterResult<Vec<MapEntityRow>> {
        let predicate = query.predicate().cloned().map(CompiledPredicate::compile).transpose()?;
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|row| row.entity_type() == query.entity_type())
            .filter(|row| predicate.as_ref().is_none_or(|predicate| predicate.matches(*row)))
            .filter(|row| query.filters().iter().all(|filter| filter.matches(*row)))
            .cloned()
            .collect())
    }
}
