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

//! # Entity Filter Error Handling
//!
//! This crate provides the error taxonomy shared by every layer of the entity
//! filter engine.
//!
//! Errors fall into three families:
//! - **Registration errors**: raised synchronously while the filter store is
//!   populated; they indicate a programming or configuration mistake and are
//!   never retried.
//! - **Binding errors**: raised while a session binds parameters or while a
//!   query is intercepted; the offending query is aborted instead of running
//!   unfiltered.
//! - **Interception errors**: unexpected failures while composing the
//!   rewritten predicate tree.
//!
//! ### Usage
//!
//! ```rust
//! use entity_filter_error::FilterError;
//! use entity_filter_error::FilterResult;
//!
//! fn require_tenant(bound: Option<i64>) -> FilterResult<i64> {
//!     bound.ok_or_else(|| FilterError::missing_binding("Tenant", "tenantId"))
//! }
//! # assert!(require_tenant(None).is_err());
//! ```

// Filter error module
pub mod filter_error;

pub use filter_error::FilterError;
pub use filter_error::FilterResult;
