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

//! Global Query Filter Module
//!
//! Named, parameterized predicates attached to entity types once, toggled per
//! unit of work, and injected into every query issued against those types.
//!
//! # Architecture
//!
//! 1. **Filter Store**: process-wide registry of filter definitions, written during startup and
//!    frozen on activation
//! 2. **Session Filter State**: per unit of work enablement and parameter bindings
//! 3. **Filter Compiler**: binds parameters into templates, memoized by a sharded LRU cache
//! 4. **Query Interceptor**: conjoins enabled filters onto outgoing query predicates
//!
//! # Usage
//!
//! ```rust,ignore
//! use entity_filter::filter::{FilterStore, ParameterSpec, SessionFilterState};
//!
//! let store = Arc::new(FilterStore::new(catalog));
//! store.register(
//!     "BlogEntry",
//!     "Tenant",
//!     vec![ParameterSpec::new("tenantId", ScalarType::Int)],
//!     Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
//! )?;
//! store.activate();
//!
//! let mut session = SessionFilterState::new(store);
//! session.enable("Tenant")?.set_parameter("tenantId", 1)?;
//! ```
//!
//! # Thread Safety
//!
//! - The store uses `DashMap` and is shared behind an `Arc`
//! - Each compiled predicate is immutable and shared through the cache
//! - Session state is owned by a single unit of work and never shared

mod filter_compiler;
mod filter_context;
mod filter_definition;
mod filter_store;
mod interceptor;
mod predicate_cache;
mod session_state;

pub use filter_compiler::value_signature;
pub use filter_compiler::BoundParams;
pub use filter_compiler::FilterCompiler;
pub use filter_context::FilterContext;
pub use filter_definition::FilterDefinition;
pub use filter_definition::ParameterSpec;
pub use filter_store::FilterStore;
pub(crate) use interceptor::inject;
pub use interceptor::QueryInterceptor;
pub use predicate_cache::CacheKey;
pub use predicate_cache::CacheStats;
pub use predicate_cache::PredicateCache;
pub use session_state::FilterHandle;
pub use session_state::SessionFilterState;
