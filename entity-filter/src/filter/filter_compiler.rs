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
use std::sync::Arc;

use cheetah_string::CheetahString;
use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;
use serde::Serialize;
use tracing::debug;

use crate::expression::Binder;
use crate::expression::CompiledPredicate;
use crate::filter::filter_definition::FilterDefinition;
use crate::filter::predicate_cache::CacheKey;
use crate::filter::predicate_cache::CacheStats;
use crate::filter::predicate_cache::PredicateCache;
use crate::model::Value;

/// Parameter values bound for one filter, keyed by parameter name.
pub type BoundParams = HashMap<CheetahString, Value>;

/// Binds filter templates to parameter values and compiles them, memoizing the
/// result in a shared [`PredicateCache`].
#[derive(Debug)]
pub struct FilterCompiler {
    cache: PredicateCache,
}

impl FilterCompiler {
    pub fn new(cache: PredicateCache) -> Self {
        Self { cache }
    }

    /// Compiles `definition` with the values in `bound`.
    ///
    /// Identical `(definition, bound)` pairs always yield predicates that accept
    /// exactly the same entities, and normally the very same cached instance.
    ///
    /// # Errors
    ///
    /// * `MissingBinding` - a declared parameter has no value in `bound`
    pub fn compile(&self, definition: &FilterDefinition, bound: &BoundParams) -> FilterResult<Arc<CompiledPredicate>> {
        let values = definition
            .parameters()
            .iter()
            .map(|spec| {
                bound
                    .get(spec.name.as_str())
                    .ok_or_else(|| FilterError::missing_binding(definition.name(), spec.name.as_str()))
            })
            .collect::<FilterResult<Vec<&Value>>>()?;

        let key = CacheKey::new(
            definition.entity_type().clone(),
            CheetahString::from(definition.name()),
            value_signature(&values)?,
        );
        self.cache.get_or_try_insert_with(key, || {
            let bound_expr = Binder::new(definition.name(), bound).bind(definition.template())?;
            debug!(
                "Compiled filter '{}' for entity '{}': {}",
                definition.name(),
                definition.entity_type(),
                bound_expr
            );
            CompiledPredicate::compile(bound_expr)
        })
    }

    #[inline]
    pub fn cache(&self) -> &PredicateCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Stable encoding of bound values, in declared-parameter order.
///
/// Distinct values always yield distinct signatures. Floats are encoded by
/// their bit pattern, since JSON has no representation for infinities or NaN.
pub fn value_signature(values: &[&Value]) -> FilterResult<String> {
    let values = values.iter().map(|value| SignatureValue::from(*value)).collect::<Vec<_>>();
    serde_json::to_string(&values).map_err(|e| FilterError::intercept(format!("cannot encode bound values: {e}")))
}

#[derive(Serialize)]
#[serde(tag = "type", content = "value")]
enum SignatureValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Text(&'a str),
}

impl<'a> From<&'a Value> for SignatureValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => SignatureValue::Null,
            Value::Bool(b) => SignatureValue::Bool(*b),
            Value::Int(i) => SignatureValue::Int(*i),
            Value::Float(f) => SignatureValue::FloatBits(f.to_bits()),
            Value::Text(s) => SignatureValue::Text(s.as_str()),
        }
    }
}
