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

//! Query Interceptor
//!
//! The interceptor runs once per issued query, after the query is fully built
//! and before it is executed. For every filter registered on the query's
//! entity type and enabled in the session, the bound predicate is AND-ed onto
//! the query's predicate tree, in registration order.
//!
//! An enabled filter with an unbound parameter aborts the query with
//! `FilterError::MissingBinding`. The query is never run without the filter.

use std::borrow::Cow;
use std::sync::Arc;

use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;
use tracing::debug;
use tracing::warn;

use crate::expression::CompiledPredicate;
use crate::expression::Expr;
use crate::filter::filter_compiler::BoundParams;
use crate::filter::filter_compiler::FilterCompiler;
use crate::filter::filter_context::FilterContext;
use crate::filter::filter_definition::FilterDefinition;
use crate::filter::filter_store::FilterStore;
use crate::filter::session_state::SessionFilterState;
use crate::model::EntityType;

/// Injects the enabled filters of a session into outgoing query predicates.
#[derive(Debug, Clone)]
pub struct QueryInterceptor {
    store: Arc<FilterStore>,
    compiler: Arc<FilterCompiler>,
}

impl QueryInterceptor {
    pub fn new(store: Arc<FilterStore>, compiler: Arc<FilterCompiler>) -> Self {
        Self { store, compiler }
    }

    /// Returns `predicate` augmented with the session's enabled filters for
    /// `entity_type`. `None` stands for a query without a predicate.
    pub fn intercept(
        &self,
        entity_type: &EntityType,
        predicate: Option<Expr>,
        session: &SessionFilterState,
    ) -> FilterResult<Option<Expr>> {
        self.intercept_with_context(entity_type, predicate, session, &FilterContext::default())
    }

    /// Like [`intercept`](QueryInterceptor::intercept), consulting `context`
    /// for parameters that declare a context key and have no explicit binding.
    ///
    /// # Errors
    ///
    /// * `MissingBinding` - an enabled filter has a parameter with no value
    /// * `TypeMismatch` - a context value has the wrong type for its parameter
    /// * `Intercept` - the session belongs to a different filter store
    pub fn intercept_with_context(
        &self,
        entity_type: &EntityType,
        predicate: Option<Expr>,
        session: &SessionFilterState,
        context: &FilterContext,
    ) -> FilterResult<Option<Expr>> {
        let filters = self.compiled_filters(entity_type, session, context)?;
        Ok(inject(predicate, &filters))
    }

    /// The compiled predicates of the session's enabled filters on
    /// `entity_type`, in registration order. These are the shared cache
    /// entries, so in-memory executors can evaluate them without recompiling.
    ///
    /// Fails under the same conditions as
    /// [`intercept_with_context`](QueryInterceptor::intercept_with_context).
    pub fn compiled_filters(
        &self,
        entity_type: &EntityType,
        session: &SessionFilterState,
        context: &FilterContext,
    ) -> FilterResult<Vec<Arc<CompiledPredicate>>> {
        if !Arc::ptr_eq(session.store(), &self.store) {
            return Err(FilterError::intercept(format!(
                "session {} was not created by this filter engine",
                session.id()
            )));
        }

        let definitions = self.store.filters_for(entity_type.as_str());
        let mut names = Vec::new();
        let mut filters = Vec::new();
        for definition in &definitions {
            let Some(explicit) = session.enabled_bindings(definition.name()) else {
                continue;
            };
            let compiled = resolve_bindings(definition, explicit, context)
                .and_then(|bound| self.compiler.compile(definition, &bound))
                .inspect_err(|e| {
                    warn!(
                        "Session {} query on '{}' aborted by filter '{}': {}",
                        session.id(),
                        entity_type,
                        definition.name(),
                        e
                    )
                })?;
            names.push(definition.name());
            filters.push(compiled);
        }
        if !filters.is_empty() {
            debug!(
                "Session {} injecting filter(s) [{}] into query on '{}'",
                session.id(),
                names.join(", "),
                entity_type
            );
        }
        Ok(filters)
    }
}

/// AND-s each filter's bound tree onto `predicate`, in order. `None` stands
/// for a query without a predicate.
pub(crate) fn inject(predicate: Option<Expr>, filters: &[Arc<CompiledPredicate>]) -> Option<Expr> {
    filters.iter().fold(predicate, |acc, compiled| {
        let filter = compiled.expr().clone();
        Some(match acc {
            Some(acc) => acc.conjoin(filter),
            None => filter,
        })
    })
}

/// Merges explicit session bindings with context values for parameters that
/// declare a context key. Explicit bindings win.
fn resolve_bindings<'a>(
    definition: &FilterDefinition,
    explicit: &'a BoundParams,
    context: &FilterContext,
) -> FilterResult<Cow<'a, BoundParams>> {
    let mut bound = Cow::Borrowed(explicit);
    for spec in definition.parameters() {
        if explicit.contains_key(spec.name.as_str()) {
            continue;
        }
        let Some(value) = spec.context_key.as_ref().and_then(|key| context.get(key.as_str())) else {
            continue;
        };
        if !spec.ty.accepts(value) {
            return Err(FilterError::type_mismatch(
                definition.name(),
                spec.name.as_str(),
                spec.ty,
                value.type_name(),
            ));
        }
        bound.to_mut().insert(spec.name.clone(), spec.ty.coerce(value.clone()));
    }
    Ok(bound)
}
