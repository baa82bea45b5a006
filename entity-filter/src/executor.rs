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

//! Execution seam between the filter engine and the data-access layer.
//!
//! The data-access layer implements [`QueryExecutor`]. [`FilteredExecutor`]
//! wraps it and runs the query interceptor exactly once per issued query,
//! after the query is built and before it reaches the executor.
//!
//! An intercepted [`Query`] keeps the caller's predicate and the compiled
//! filters apart. Executors that translate queries into another language read
//! [`Query::effective_predicate`]; in-memory executors evaluate
//! [`Query::filters`] directly, reusing the cached closures.

mod memory_executor;

use std::sync::Arc;

use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;

pub use memory_executor::MemoryExecutor;

use crate::engine::FilterEngine;
use crate::expression::CompiledPredicate;
use crate::expression::Expr;
use crate::filter::inject;
use crate::filter::FilterContext;
use crate::filter::SessionFilterState;
use crate::model::EntityType;
use crate::model::Value;

/// A query against one root entity type.
#[derive(Debug, Clone)]
pub struct Query {
    entity_type: EntityType,
    predicate: Option<Expr>,
    /// Filters injected by the interceptor, in registration order.
    filters: Vec<Arc<CompiledPredicate>>,
}

impl Query {
    /// Selects every entity of `entity_type`.
    pub fn all(entity_type: impl Into<EntityType>) -> Self {
        Self {
            entity_type: entity_type.into(),
            predicate: None,
            filters: Vec::new(),
        }
    }

    /// Selects the entity whose `key_field` equals `key`.
    pub fn by_key(entity_type: impl Into<EntityType>, key_field: &str, key: impl Into<Value>) -> Self {
        Self::all(entity_type).filter(Expr::eq(Expr::field(key_field), Expr::lit(key)))
    }

    /// Narrows the query with an additional predicate.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.conjoin(predicate),
            None => predicate,
        });
        self
    }

    #[inline]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// The caller's predicate, without injected filters.
    #[inline]
    pub fn predicate(&self) -> Option<&Expr> {
        self.predicate.as_ref()
    }

    #[inline]
    pub fn filters(&self) -> &[Arc<CompiledPredicate>] {
        &self.filters
    }

    /// The caller's predicate with every injected filter AND-ed on.
    pub fn effective_predicate(&self) -> Option<Expr> {
        inject(self.predicate.clone(), &self.filters)
    }

    fn with_filters(mut self, filters: Vec<Arc<CompiledPredicate>>) -> Self {
        self.filters = filters;
        self
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type
            && self.predicate == other.predicate
            && self.filters.len() == other.filters.len()
            && self.filters.iter().zip(&other.filters).all(|(a, b)| a.expr() == b.expr())
    }
}

/// Executes fully built queries. Implemented by the data-access layer.
///
/// Implementations must honor both the predicate and the injected filters of
/// a query, either through [`Query::effective_predicate`] or by evaluating
/// [`Query::filters`].
pub trait QueryExecutor {
    type Row;

    fn execute(&self, query: &Query) -> FilterResult<Vec<Self::Row>>;
}

/// Runs every query through the filter engine before handing it to the
/// wrapped executor.
#[derive(Debug, Clone)]
pub struct FilteredExecutor<E> {
    engine: FilterEngine,
    inner: E,
}

impl<E: QueryExecutor> FilteredExecutor<E> {
    pub fn new(engine: FilterEngine, inner: E) -> Self {
        Self { engine, inner }
    }

    pub fn execute(&self, query: &Query, session: &SessionFilterState) -> FilterResult<Vec<E::Row>> {
        self.execute_with_context(query, session, &FilterContext::default())
    }

    /// Intercepts `query` with the session's enabled filters and executes the
    /// rewritten query. A binding failure aborts before execution.
    pub fn execute_with_context(
        &self,
        query: &Query,
        session: &SessionFilterState,
        context: &FilterContext,
    ) -> FilterResult<Vec<E::Row>> {
        let filters = self
            .engine
            .compiled_filters(query.entity_type(), session, context)?;
        let intercepted = query.clone().with_filters(filters);
        self.inner.execute(&intercepted)
    }

    /// Looks up one entity by primary key. Entities excluded by an enabled
    /// filter are reported as not found.
    pub fn find(
        &self,
        entity_type: impl Into<EntityType>,
        key: impl Into<Value>,
        session: &SessionFilterState,
    ) -> FilterResult<Option<E::Row>> {
        let entity_type = entity_type.into();
        let schema = self
            .engine
            .catalog()
            .schema(entity_type.as_str())
            .ok_or_else(|| FilterError::intercept(format!("entity type '{entity_type}' is not mapped")))?;
        let query = Query::by_key(entity_type.clone(), schema.primary_key(), key);
        Ok(self.execute(&query, session)?.into_iter().next())
    }

    #[inline]
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    #[inline]
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_key_builds_equality() {
        let query = Query::by_key("BlogEntry", "Id", 2);
        assert_eq!(query.entity_type().as_str(), "BlogEntry");
        assert_eq!(query.predicate().unwrap().to_string(), "Id = 2");
    }

    #[test]
    fn filter_conjoins_predicates() {
        let query = Query::all("BlogEntry")
            .filter(Expr::gt(Expr::field("Id"), Expr::lit(0)))
            .filter(Expr::lt(Expr::field("Id"), Expr::lit(10)));
        assert_eq!(query.predicate().unwrap().to_string(), "(Id > 0 AND Id < 10)");
        assert!(Query::all("BlogEntry").predicate().is_none());
    }
}
