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

use cheetah_string::CheetahString;
use entity_filter_error::FilterResult;
use tracing::debug;

use crate::config::FilterEngineConfig;
use crate::expression::CompiledPredicate;
use crate::expression::Expr;
use crate::filter::BoundParams;
use crate::filter::CacheStats;
use crate::filter::FilterCompiler;
use crate::filter::FilterContext;
use crate::filter::FilterDefinition;
use crate::filter::FilterStore;
use crate::filter::ParameterSpec;
use crate::filter::PredicateCache;
use crate::filter::QueryInterceptor;
use crate::filter::SessionFilterState;
use crate::model::EntityCatalog;
use crate::model::EntityType;

/// Entry point for the surrounding data-access layer.
///
/// Cloning an engine is cheap; clones share the definition store and the
/// compiled predicate cache.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    store: Arc<FilterStore>,
    compiler: Arc<FilterCompiler>,
    interceptor: QueryInterceptor,
    config: Arc<FilterEngineConfig>,
}

impl FilterEngine {
    pub fn new(catalog: Arc<dyn EntityCatalog>, config: FilterEngineConfig) -> Self {
        let config = config.normalized();
        let store = Arc::new(FilterStore::new(catalog));
        let compiler = Arc::new(FilterCompiler::new(PredicateCache::new(
            config.predicate_cache_capacity,
            config.predicate_cache_shards,
        )));
        let interceptor = QueryInterceptor::new(Arc::clone(&store), Arc::clone(&compiler));
        debug!(
            "Filter engine created, predicate cache capacity {} in {} shard(s)",
            config.predicate_cache_capacity, config.predicate_cache_shards
        );
        Self {
            store,
            compiler,
            interceptor,
            config: Arc::new(config),
        }
    }

    pub fn with_defaults(catalog: Arc<dyn EntityCatalog>) -> Self {
        Self::new(catalog, FilterEngineConfig::default())
    }

    /// Registers a filter on one entity type. See [`FilterStore::register`].
    pub fn register_filter(
        &self,
        entity_type: impl Into<EntityType>,
        name: impl Into<CheetahString>,
        parameters: Vec<ParameterSpec>,
        template: Expr,
    ) -> FilterResult<Arc<FilterDefinition>> {
        self.store.register(entity_type, name, parameters, template)
    }

    /// Registers a filter on every entity type carrying the template's fields.
    pub fn register_convention(
        &self,
        name: impl Into<CheetahString>,
        parameters: Vec<ParameterSpec>,
        template: Expr,
    ) -> FilterResult<Vec<EntityType>> {
        self.store.register_convention(name, parameters, template)
    }

    /// Freezes the definition store. Returns `false` if it was already active.
    pub fn activate(&self) -> bool {
        self.store.activate()
    }

    /// Starts the filter state of a new unit of work, with nothing enabled.
    ///
    /// Unless disabled in the configuration, the first session freezes the
    /// definition store.
    pub fn begin_session(&self) -> SessionFilterState {
        if self.config.activate_on_first_session && !self.store.is_active() {
            self.store.activate();
        }
        let session = SessionFilterState::new(Arc::clone(&self.store));
        debug!("Session {} started", session.id());
        session
    }

    pub fn intercept_query(
        &self,
        entity_type: &EntityType,
        predicate: Option<Expr>,
        session: &SessionFilterState,
    ) -> FilterResult<Option<Expr>> {
        self.interceptor.intercept(entity_type, predicate, session)
    }

    pub fn intercept_with_context(
        &self,
        entity_type: &EntityType,
        predicate: Option<Expr>,
        session: &SessionFilterState,
        context: &FilterContext,
    ) -> FilterResult<Option<Expr>> {
        self.interceptor
            .intercept_with_context(entity_type, predicate, session, context)
    }

    /// Compiled predicates of the session's enabled filters on `entity_type`.
    /// See [`QueryInterceptor::compiled_filters`].
    pub fn compiled_filters(
        &self,
        entity_type: &EntityType,
        session: &SessionFilterState,
        context: &FilterContext,
    ) -> FilterResult<Vec<Arc<CompiledPredicate>>> {
        self.interceptor.compiled_filters(entity_type, session, context)
    }

    /// Compiles filter `name` of `entity_type` with explicit values.
    pub fn compile(
        &self,
        entity_type: &str,
        name: &str,
        bound: &BoundParams,
    ) -> FilterResult<Arc<CompiledPredicate>> {
        let definition = self.store.lookup(entity_type, name)?;
        self.compiler.compile(&definition, bound)
    }

    pub fn lookup(&self, entity_type: &str, name: &str) -> FilterResult<Arc<FilterDefinition>> {
        self.store.lookup(entity_type, name)
    }

    pub fn filters_for(&self, entity_type: &str) -> Vec<Arc<FilterDefinition>> {
        self.store.filters_for(entity_type)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.compiler.cache_stats()
    }

    #[inline]
    pub fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }

    #[inline]
    pub fn catalog(&self) -> &Arc<dyn EntityCatalog> {
        self.store.catalog()
    }

    #[inline]
    pub fn config(&self) -> &FilterEngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use entity_filter_error::FilterError;

    use super::*;
    use crate::model::EntitySchema;
    use crate::model::MapEntityRow;
    use crate::model::ScalarType;
    use crate::model::SchemaCatalog;
    use crate::model::Value;

    fn catalog() -> Arc<dyn EntityCatalog> {
        Arc::new(
            SchemaCatalog::new().with_schema(
                EntitySchema::new("BlogEntry", "Id")
                    .with_field("Id", ScalarType::Int)
                    .with_field("TenantId", ScalarType::Int),
            ),
        )
    }

    fn engine(config: FilterEngineConfig) -> FilterEngine {
        let engine = FilterEngine::new(catalog(), config);
        engine
            .register_filter(
                "BlogEntry",
                "Tenant",
                vec![ParameterSpec::new("tenantId", ScalarType::Int)],
                Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
            )
            .unwrap();
        engine
    }

    #[test]
    fn first_session_freezes_store() {
        let engine = engine(FilterEngineConfig::default());
        assert!(!engine.store().is_active());
        let _session = engine.begin_session();
        assert!(engine.store().is_active());

        let err = engine
            .register_filter("BlogEntry", "Late", vec![], Expr::gt(Expr::field("Id"), Expr::lit(0)))
            .unwrap_err();
        assert_eq!(err, FilterError::store_frozen("BlogEntry", "Late"));
    }

    #[test]
    fn lazy_activation_can_be_disabled() {
        let engine = engine(FilterEngineConfig {
            activate_on_first_session: false,
            ..FilterEngineConfig::default()
        });
        let _session = engine.begin_session();
        assert!(!engine.store().is_active());
        assert!(engine.activate());
        assert!(!engine.activate());
    }

    #[test]
    fn compile_by_name_hits_cache() {
        let engine = engine(FilterEngineConfig::default());
        let mut bound = BoundParams::new();
        bound.insert("tenantId".into(), Value::Int(1));

        let first = engine.compile("BlogEntry", "Tenant", &bound).unwrap();
        let second = engine.compile("BlogEntry", "Tenant", &bound).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = engine.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.len, 1);

        let row = MapEntityRow::new("BlogEntry").with("Id", 7).with("TenantId", 1);
        assert!(first.matches(&row));
    }

    #[test]
    fn clones_share_state() {
        let engine = engine(FilterEngineConfig::default());
        let clone = engine.clone();
        let mut session = clone.begin_session();
        session.enable("Tenant").unwrap().set_parameter("tenantId", 3).unwrap();

        let rewritten = engine
            .intercept_query(&EntityType::from("BlogEntry"), None, &session)
            .unwrap();
        assert_eq!(rewritten.unwrap().to_string(), "TenantId = 3");
    }

    #[test]
    fn sessions_of_other_engines_are_rejected() {
        let a = engine(FilterEngineConfig::default());
        let b = engine(FilterEngineConfig::default());
        let session = b.begin_session();
        let err = a
            .intercept_query(&EntityType::from("BlogEntry"), None, &session)
            .unwrap_err();
        assert!(matches!(err, FilterError::Intercept(_)));
    }
}
