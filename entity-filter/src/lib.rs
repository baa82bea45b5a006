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

//! Session-scoped global query filters.
//!
//! Filters are named, parameterized predicates registered once per entity
//! type. Each unit of work enables the filters it needs and binds their
//! parameters; every query issued in that unit of work is then rewritten to
//! include the enabled filters before it is executed.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use entity_filter::executor::FilteredExecutor;
//! use entity_filter::executor::MemoryExecutor;
//! use entity_filter::executor::Query;
//! use entity_filter::expression::Expr;
//! use entity_filter::filter::ParameterSpec;
//! use entity_filter::model::EntitySchema;
//! use entity_filter::model::MapEntityRow;
//! use entity_filter::model::ScalarType;
//! use entity_filter::model::SchemaCatalog;
//! use entity_filter::FilterEngine;
//!
//! let catalog = SchemaCatalog::new().with_schema(
//!     EntitySchema::new("BlogEntry", "Id")
//!         .with_field("Id", ScalarType::Int)
//!         .with_field("TenantId", ScalarType::Int),
//! );
//! let engine = FilterEngine::with_defaults(Arc::new(catalog));
//! engine.register_filter(
//!     "BlogEntry",
//!     "Tenant",
//!     vec![ParameterSpec::new("tenantId", ScalarType::Int)],
//!     Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
//! )?;
//!
//! let executor = FilteredExecutor::new(
//!     engine.clone(),
//!     MemoryExecutor::with_rows([
//!         MapEntityRow::new("BlogEntry").with("Id", 1).with("TenantId", 1),
//!         MapEntityRow::new("BlogEntry").with("Id", 2).with("TenantId", 2),
//!     ]),
//! );
//!
//! let mut session = engine.begin_session();
//! session.enable("Tenant")?.set_parameter("tenantId", 1)?;
//! assert_eq!(executor.execute(&Query::all("BlogEntry"), &session)?.len(), 1);
//!
//! session.disable("Tenant");
//! assert_eq!(executor.execute(&Query::all("BlogEntry"), &session)?.len(), 2);
//! # Ok::<(), entity_filter::FilterError>(())
//! ```

pub mod config;
pub mod constant;
pub mod engine;
pub mod executor;
pub mod expression;
pub mod filter;
pub mod log;
pub mod model;

pub use entity_filter_error::FilterError;
pub use entity_filter_error::FilterResult;

pub use crate::config::FilterEngineConfig;
pub use crate::engine::FilterEngine;
pub use crate::filter::FilterHandle;
pub use crate::filter::SessionFilterState;
