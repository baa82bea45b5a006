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

//! Filter engine error types
//!
//! Every failure raised by the filter store, the session state, the predicate
//! compiler and the query interceptor is expressed as a [`FilterError`].

use thiserror::Error;

/// Filter engine error types
///
/// Errors that can occur while:
/// - Registering filter definitions
/// - Enabling filters and binding parameters on a session
/// - Compiling and injecting filter predicates into a query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A filter with the same name is already registered for the entity type
    #[error("Filter '{name}' is already registered for entity '{entity_type}'")]
    DuplicateFilter { entity_type: String, name: String },

    /// The predicate template failed validation against the entity schema
    #[error("Invalid template for filter '{name}' on entity '{entity_type}': {reason}")]
    InvalidTemplate {
        entity_type: String,
        name: String,
        reason: String,
    },

    /// No filter with this name is registered
    #[error("Unknown filter: {name}")]
    UnknownFilter { name: String },

    /// The parameter is not declared on the filter
    #[error("Filter '{filter}' declares no parameter named '{parameter}'")]
    UnknownParameter { filter: String, parameter: String },

    /// The bound value is incompatible with the declared parameter type
    #[error("Parameter '{parameter}' of filter '{filter}' expects {expected}, got {actual}")]
    TypeMismatch {
        filter: String,
        parameter: String,
        expected: String,
        actual: String,
    },

    /// An enabled filter was used by a query before all its parameters were bound
    #[error("Filter '{filter}' is enabled but parameter '{parameter}' is not bound")]
    MissingBinding { filter: String, parameter: String },

    /// Registration attempted after the store was activated
    #[error("Filter store is frozen, cannot register '{name}' for entity '{entity_type}'")]
    StoreFrozen { entity_type: String, name: String },

    /// Unexpected failure while composing the query predicate tree
    #[error("Intercept error: {0}")]
    Intercept(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for filter engine operations
pub type FilterResult<T> = std::result::Result<T, FilterError>;

impl FilterError {
    pub fn duplicate_filter(entity_type: impl Into<String>, name: impl Into<String>) -> Self {
        FilterError::DuplicateFilter {
            entity_type: entity_type.into(),
            name: name.into(),
        }
    }

    pub fn invalid_template(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FilterError::InvalidTemplate {
            entity_type: entity_type.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_filter(name: impl Into<String>) -> Self {
        FilterError::UnknownFilter { name: name.into() }
    }

    pub fn unknown_parameter(filter: impl Into<String>, parameter: impl Into<String>) -> Self {
        FilterError::UnknownParameter {
            filter: filter.into(),
            parameter: parameter.into(),
        }
    }

    pub fn type_mismatch(
        filter: impl Into<String>,
        parameter: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        FilterError::TypeMismatch {
            filter: filter.into(),
            parameter: parameter.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn missing_binding(filter: impl Into<String>, parameter: impl Into<String>) -> Self {
        FilterError::MissingBinding {
            filter: filter.into(),
            parameter: parameter.into(),
        }
    }

    pub fn store_frozen(entity_type: impl Into<String>, name: impl Into<String>) -> Self {
        FilterError::StoreFrozen {
            entity_type: entity_type.into(),
            name: name.into(),
        }
    }

    pub fn intercept(message: impl Into<String>) -> Self {
        FilterError::Intercept(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        FilterError::Config(message.into())
    }

    /// Returns `true` for errors raised while populating the filter store.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            FilterError::DuplicateFilter { .. } | FilterError::InvalidTemplate { .. } | FilterError::StoreFrozen { .. }
        )
    }

    /// Returns `true` for errors that abort a single query or binding call.
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            FilterError::UnknownParameter { .. } | FilterError::TypeMismatch { .. } | FilterError::MissingBinding { .. }
        )
    }
}
