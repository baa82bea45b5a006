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

//! Filter Definition Store
//!
//! This module provides the registry that associates entity types with named
//! predicate templates. The store is populated during process initialization
//! and then activated; from that point on it is read-only and any further
//! registration fails with `FilterError::StoreFrozen`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use entity_filter::expression::Expr;
//! use entity_filter::filter::{FilterStore, ParameterSpec};
//! use entity_filter::model::ScalarType;
//!
//! let store = FilterStore::new(catalog);
//! store.register(
//!     "BlogEntry",
//!     "Tenant",
//!     vec![ParameterSpec::new("tenantId", ScalarType::Int)],
//!     Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
//! )?;
//! store.activate();
//!
//! for definition in store.filters_for("BlogEntry") {
//!     println!("{} on {}", definition.name(), definition.entity_type());
//! }
//! ```

use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;
use parking_lot::RwLock;
use tracing::info;
use tracing::warn;

use crate::expression::Expr;
use crate::expression::TemplateResolver;
use crate::filter::filter_definition::FilterDefinition;
use crate::filter::filter_definition::ParameterSpec;
use crate::model::EntityCatalog;
use crate::model::EntityType;

/// Registry of filter definitions keyed by entity type and filter name.
///
/// # Thread Safety
///
/// Both indexes are `DashMap`s, so lookups never block each other. Writes only
/// happen before [`FilterStore::activate`] is called: a registration holds the
/// read side of the activation lock until its definition is inserted, and
/// activation takes the write side, so no definition lands after the freeze.
pub struct FilterStore {
    catalog: Arc<dyn EntityCatalog>,
    /// Definitions per entity type, in registration order.
    by_entity: DashMap<EntityType, Vec<Arc<FilterDefinition>>>,
    /// Definitions per filter name, across entity types.
    by_name: DashMap<CheetahString, Vec<Arc<FilterDefinition>>>,
    active: RwLock<bool>,
    sequence: AtomicUsize,
}

impl FilterStore {
    pub fn new(catalog: Arc<dyn EntityCatalog>) -> Self {
        Self {
            catalog,
            by_entity: DashMap::new(),
            by_name: DashMap::new(),
            active: RwLock::new(false),
            sequence: AtomicUsize::new(0),
        }
    }

    /// Registers a filter for one entity type.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - The entity type the filter applies to
    /// * `name` - Filter name, unique per entity type
    /// * `parameters` - Declared parameters, in binding order
    /// * `template` - Predicate template over the entity's fields
    ///
    /// # Errors
    ///
    /// * `StoreFrozen` - the store was already activated
    /// * `DuplicateFilter` - `(entity_type, name)` is already registered
    /// * `InvalidTemplate` - unknown entity type or field, undeclared
    ///   parameter, ill-typed comparison, or a parameter whose type conflicts
    ///   with a same-named filter on another entity type
    pub fn register(
        &self,
        entity_type: impl Into<EntityType>,
        name: impl Into<CheetahString>,
        parameters: Vec<ParameterSpec>,
        template: Expr,
    ) -> FilterResult<Arc<FilterDefinition>> {
        let entity_type = entity_type.into();
        let name = name.into();

        // Held until the definition is inserted.
        let active = self.active.read();
        if *active {
            warn!(
                "Rejected registration of filter '{}' for entity '{}': store is active",
                name, entity_type
            );
            return Err(FilterError::store_frozen(entity_type.as_str(), name.as_str()));
        }
        if self.lookup(entity_type.as_str(), name.as_str()).is_ok() {
            return Err(FilterError::duplicate_filter(entity_type.as_str(), name.as_str()));
        }

        let schema = self.catalog.schema(entity_type.as_str()).ok_or_else(|| {
            FilterError::invalid_template(entity_type.as_str(), name.as_str(), "entity type is not mapped")
        })?;
        let resolved = TemplateResolver::new(&schema, &parameters)
            .resolve(template)
            .map_err(|reason| FilterError::invalid_template(entity_type.as_str(), name.as_str(), reason))?;
        self.check_shared_parameters(&entity_type, &name, &parameters)?;

        let definition = {
            let mut definitions = self.by_entity.entry(entity_type.clone()).or_default();
            if definitions.iter().any(|definition| definition.name() == name.as_str()) {
                return Err(FilterError::duplicate_filter(entity_type.as_str(), name.as_str()));
            }
            let definition = Arc::new(FilterDefinition::new(
                name.clone(),
                entity_type.clone(),
                parameters,
                resolved,
                self.sequence.fetch_add(1, Ordering::Relaxed),
            ));
            definitions.push(Arc::clone(&definition));
            definition
        };
        self.by_name.entry(name).or_default().push(Arc::clone(&definition));

        info!(
            "Registered filter '{}' for entity '{}' with {} parameter(s): {}",
            definition.name(),
            definition.entity_type(),
            definition.parameters().len(),
            definition.template()
        );
        Ok(definition)
    }

    /// Registers `template` under `name` on every mapped entity type whose
    /// schema carries all fields the template reads.
    ///
    /// Returns the entity types the filter was registered for, in catalog order.
    pub fn register_convention(
        &self,
        name: impl Into<CheetahString>,
        parameters: Vec<ParameterSpec>,
        template: Expr,
    ) -> FilterResult<Vec<EntityType>> {
        let name = name.into();
        let fields = template.referenced_fields();
        let mut registered = Vec::new();
        for entity_type in self.catalog.entity_types() {
            let Some(schema) = self.catalog.schema(entity_type.as_str()) else {
                continue;
            };
            if fields.iter().all(|field| schema.field(field.as_str()).is_some()) {
                self.register(entity_type.clone(), name.clone(), parameters.clone(), template.clone())?;
                registered.push(entity_type);
            }
        }
        if registered.is_empty() {
            return Err(FilterError::invalid_template(
                "*",
                name.as_str(),
                "no mapped entity type carries the fields the template reads",
            ));
        }
        Ok(registered)
    }

    /// Retrieves the definition registered as `(entity_type, name)`.
    pub fn lookup(&self, entity_type: &str, name: &str) -> FilterResult<Arc<FilterDefinition>> {
        self.by_entity
            .get(entity_type)
            .and_then(|definitions| definitions.iter().find(|definition| definition.name() == name).cloned())
            .ok_or_else(|| FilterError::unknown_filter(name))
    }

    /// All definitions for `entity_type`, in registration order. Empty if the
    /// entity type has no filters.
    pub fn filters_for(&self, entity_type: &str) -> Vec<Arc<FilterDefinition>> {
        self.by_entity
            .get(entity_type)
            .map(|definitions| definitions.value().clone())
            .unwrap_or_default()
    }

    /// Whether `entity_type` has at least one registered filter.
    pub fn has_filters(&self, entity_type: &str) -> bool {
        self.by_entity
            .get(entity_type)
            .is_some_and(|definitions| !definitions.is_empty())
    }

    /// All definitions registered under `name`, across entity types.
    pub fn definitions_named(&self, name: &str) -> Vec<Arc<FilterDefinition>> {
        self.by_name
            .get(name)
            .map(|definitions| definitions.value().clone())
            .unwrap_or_default()
    }

    /// Whether a filter called `name` exists for any entity type.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Declaration of parameter `parameter` on filter `filter`.
    ///
    /// Same-named filters agree on parameter types, so the first declaration
    /// found is authoritative.
    pub fn parameter_spec(&self, filter: &str, parameter: &str) -> Option<ParameterSpec> {
        self.by_name.get(filter).and_then(|definitions| {
            definitions
                .iter()
                .find_map(|definition| definition.parameter(parameter).cloned())
        })
    }

    /// Freezes the store. Returns `true` if this call performed the transition.
    pub fn activate(&self) -> bool {
        let activated = {
            let mut active = self.active.write();
            !std::mem::replace(&mut *active, true)
        };
        if activated {
            info!(
                "Filter store activated with {} filter definition(s) over {} entity type(s)",
                self.len(),
                self.by_entity.len()
            );
        }
        activated
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        *self.active.read()
    }

    /// Total number of definitions.
    pub fn len(&self) -> usize {
        self.by_entity.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct filter names, sorted.
    pub fn filter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.iter().map(|entry| entry.key().to_string()).collect();
        names.sort();
        names
    }

    pub fn catalog(&self) -> &Arc<dyn EntityCatalog> {
        &self.catalog
    }

    fn check_shared_parameters(
        &self,
        entity_type: &EntityType,
        name: &CheetahString,
        parameters: &[ParameterSpec],
    ) -> FilterResult<()> {
        let Some(existing) = self.by_name.get(name.as_str()) else {
            return Ok(());
        };
        for spec in parameters {
            for other in existing.iter() {
                if let Some(declared) = other.parameter(spec.name.as_str()) {
                    if declared.ty != spec.ty {
                        return Err(FilterError::invalid_template(
                            entity_type.as_str(),
                            name.as_str(),
                            format!(
                                "parameter '{}' is declared as {} by the same filter on entity '{}'",
                                spec.name,
                                declared.ty,
                                other.entity_type()
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("filters", &self.filter_names())
            .field("definitions", &self.len())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntitySchema;
    use crate::model::ScalarType;
    use crate::model::SchemaCatalog;

    fn catalog() -> Arc<dyn EntityCatalog> {
        Arc::new(
            SchemaCatalog::new()
                .with_schema(
                    EntitySchema::new("BlogEntry", "Id")
                        .with_field("Id", ScalarType::Int)
                        .with_field("TenantId", ScalarType::Int)
                        .with_field("Title", ScalarType::Text),
                )
                .with_schema(
                    EntitySchema::new("Comment", "Id")
                        .with_field("Id", ScalarType::Int)
                        .with_field("TenantId", ScalarType::Int),
                )
                .with_schema(EntitySchema::new("Tenant", "Id").with_field("Id", ScalarType::Int)),
        )
    }

    fn tenant_params() -> Vec<ParameterSpec> {
        vec![ParameterSpec::new("tenantId", ScalarType::Int)]
    }

    fn tenant_template() -> Expr {
        Expr::eq(Expr::field("TenantId"), Expr::param("tenantId"))
    }

    #[test]
    fn register_and_lookup() {
        let store = FilterStore::new(catalog());
        store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap();

        let definition = store.lookup("BlogEntry", "Tenant").unwrap();
        assert_eq!(definition.name(), "Tenant");
        assert_eq!(definition.entity_type().as_str(), "BlogEntry");
        assert_eq!(definition.parameters().len(), 1);
        assert!(store.contains("Tenant"));
        assert!(store.has_filters("BlogEntry"));
        assert!(!store.has_filters("Comment"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lookup_unknown_filter() {
        let store = FilterStore::new(catalog());
        let err = store.lookup("BlogEntry", "Tenant").unwrap_err();
        assert_eq!(err, FilterError::unknown_filter("Tenant"));
        assert!(store.filters_for("BlogEntry").is_empty());
    }

    #[test]
    fn duplicate_registration_fails() {
        let store = FilterStore::new(catalog());
        store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap();
        let err = store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap_err();
        assert!(matches!(err, FilterError::DuplicateFilter { .. }));
    }

    #[test]
    fn invalid_templates_fail() {
        let store = FilterStore::new(catalog());
        let err = store
            .register("Unmapped", "Tenant", tenant_params(), tenant_template())
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidTemplate { .. }));

        let err = store
            .register("Tenant", "Tenant", tenant_params(), tenant_template())
            .unwrap_err();
        assert!(err.to_string().contains("unknown field 'TenantId'"));

        let err = store.register("BlogEntry", "Tenant", vec![], tenant_template()).unwrap_err();
        assert!(err.to_string().contains("not declared"));
        assert!(store.is_empty());
    }

    #[test]
    fn filters_for_keeps_registration_order() {
        let store = FilterStore::new(catalog());
        store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap();
        store
            .register(
                "BlogEntry",
                "NonEmptyTitle",
                vec![],
                Expr::ne(Expr::field("Title"), Expr::lit("")),
            )
            .unwrap();
        store
            .register("BlogEntry", "Recent", vec![], Expr::gt(Expr::field("Id"), Expr::lit(100)))
            .unwrap();

        let names: Vec<_> = store
            .filters_for("BlogEntry")
            .iter()
            .map(|definition| definition.name().to_string())
            .collect();
        assert_eq!(names, vec!["Tenant", "NonEmptyTitle", "Recent"]);
    }

    #[test]
    fn frozen_store_rejects_registration() {
        let store = FilterStore::new(catalog());
        assert!(store.activate());
        assert!(!store.activate());
        assert!(store.is_active());

        let err = store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap_err();
        assert_eq!(err, FilterError::store_frozen("BlogEntry", "Tenant"));
    }

    #[test]
    fn no_registration_lands_after_activation() {
        let store = Arc::new(FilterStore::new(catalog()));
        let handles = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let mut accepted = 0;
                    for i in 0..500 {
                        let template = Expr::gt(Expr::field("Id"), Expr::lit(i));
                        match store.register("BlogEntry", format!("Min{worker}_{i}"), vec![], template) {
                            Ok(_) => accepted += 1,
                            Err(err) => {
                                assert_eq!(err, FilterError::store_frozen("BlogEntry", format!("Min{worker}_{i}")));
                                assert!(store.is_active());
                            }
                        }
                    }
                    accepted
                })
            })
            .collect::<Vec<_>>();

        std::thread::yield_now();
        assert!(store.activate());
        let frozen_len = store.len();

        let accepted: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();
        assert_eq!(store.len(), frozen_len);
        assert_eq!(accepted, frozen_len);
    }

    #[test]
    fn shared_name_requires_consistent_parameter_types() {
        let store = FilterStore::new(catalog());
        store
            .register("BlogEntry", "Tenant", tenant_params(), tenant_template())
            .unwrap();
        store
            .register("Comment", "Tenant", tenant_params(), tenant_template())
            .unwrap();
        assert_eq!(store.definitions_named("Tenant").len(), 2);
        assert_eq!(store.filter_names(), vec!["Tenant".to_string()]);

        let err = store
            .register(
                "Tenant",
                "Tenant",
                vec![ParameterSpec::new("tenantId", ScalarType::Text)],
                Expr::ne(Expr::param("tenantId"), Expr::lit("")),
            )
            .unwrap_err();
        assert!(err.to_string().contains("declared as Int"));
        assert_eq!(
            store.parameter_spec("Tenant", "tenantId").map(|spec| spec.ty),
            Some(ScalarType::Int)
        );
    }

    #[test]
    fn convention_registers_on_matching_entities() {
        let store = FilterStore::new(catalog());
        let registered = store
            .register_convention("Tenant", tenant_params(), tenant_template())
            .unwrap();
        let names: Vec<_> = registered.iter().map(|t| t.as_str().to_string()).collect();
        assert_eq!(names, vec!["BlogEntry", "Comment"]);
        assert!(store.lookup("Comment", "Tenant").is_ok());
        assert!(store.lookup("Tenant", "Tenant").is_err());

        let err = store
            .register_convention(
                "Owner",
                vec![],
                Expr::eq(Expr::field("OwnerId"), Expr::lit(1)),
            )
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidTemplate { .. }));
    }
}
