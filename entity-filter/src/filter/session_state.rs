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

//! Session Filter State
//!
//! Per unit-of-work record of which filters are enabled and which parameter
//! values are bound to them. A [`SessionFilterState`] is owned by exactly one
//! session and is not shared, so it needs no synchronization. It starts empty
//! and is discarded when dropped, on every exit path of the unit of work.
//!
//! # Filter lifecycle within one session
//!
//! ```text
//! Unset --enable--> Enabled-Unbound --set_parameter(all)--> Enabled-Bound
//! Enabled-Bound --disable--> Disabled (bindings kept, inert)
//! Disabled --enable--> Enabled-Bound
//! Disabled --set_parameter--> Disabled (bindings updated for the next enable)
//! ```

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use cheetah_string::CheetahString;
use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;
use tracing::debug;
use tracing::trace;

use crate::filter::filter_compiler::BoundParams;
use crate::filter::filter_store::FilterStore;
use crate::model::Value;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default, PartialEq)]
struct FilterBinding {
    enabled: bool,
    values: BoundParams,
}

/// Filter enablement and parameter bindings of one session.
#[derive(Debug)]
pub struct SessionFilterState {
    id: u64,
    store: Arc<FilterStore>,
    filters: HashMap<CheetahString, FilterBinding>,
}

impl SessionFilterState {
    /// Creates an empty state over `store`. Nothing is enabled.
    pub fn new(store: Arc<FilterStore>) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        trace!("Session {} filter state created", id);
        Self {
            id,
            store,
            filters: HashMap::new(),
        }
    }

    /// Process-unique identifier, for log correlation.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Enables `name` for every entity type it is registered on.
    ///
    /// Enabling an enabled filter is a no-op that keeps existing bindings.
    ///
    /// # Errors
    ///
    /// * `UnknownFilter` - no entity type has a filter called `name`
    pub fn enable(&mut self, name: &str) -> FilterResult<FilterHandle<'_>> {
        let mut handle = self.filter(name)?;
        if !handle.binding.enabled {
            handle.binding.enabled = true;
            debug!("Session {} enabled filter '{}'", handle.session_id, name);
        }
        Ok(handle)
    }

    /// Disables `name`. Bindings are kept for a later [`enable`]. Disabling a
    /// filter that is not enabled, or not registered, does nothing.
    ///
    /// [`enable`]: SessionFilterState::enable
    pub fn disable(&mut self, name: &str) {
        if let Some(binding) = self.filters.get_mut(name) {
            if binding.enabled {
                binding.enabled = false;
                debug!("Session {} disabled filter '{}'", self.id, name);
            }
        }
    }

    /// Handle to `name` without changing whether it is enabled, so parameters
    /// can be bound ahead of a later enable.
    ///
    /// # Errors
    ///
    /// * `UnknownFilter` - no entity type has a filter called `name`
    pub fn filter(&mut self, name: &str) -> FilterResult<FilterHandle<'_>> {
        if !self.store.contains(name) {
            return Err(FilterError::unknown_filter(name));
        }
        let binding = self.filters.entry(CheetahString::from(name)).or_default();
        Ok(FilterHandle {
            session_id: self.id,
            name: CheetahString::from(name),
            store: &self.store,
            binding,
        })
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.filters.get(name).is_some_and(|binding| binding.enabled)
    }

    /// Names of the enabled filters, sorted.
    pub fn enabled_filters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .filters
            .iter()
            .filter(|(_, binding)| binding.enabled)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Value bound to `parameter` of `filter`, whether or not it is enabled.
    pub fn parameter(&self, filter: &str, parameter: &str) -> Option<&Value> {
        self.filters.get(filter).and_then(|binding| binding.values.get(parameter))
    }

    /// Bindings of `name` if it is enabled.
    pub(crate) fn enabled_bindings(&self, name: &str) -> Option<&BoundParams> {
        self.filters
            .get(name)
            .filter(|binding| binding.enabled)
            .map(|binding| &binding.values)
    }

    pub(crate) fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }
}

impl Drop for SessionFilterState {
    fn drop(&mut self) {
        trace!(
            "Session {} filter state discarded with {} enabled filter(s)",
            self.id,
            self.filters.values().filter(|binding| binding.enabled).count()
        );
    }
}

/// Mutable view of one filter within a session, returned by
/// [`SessionFilterState::enable`] and [`SessionFilterState::filter`].
///
/// # Example
///
/// ```ignore
/// session.enable("Tenant")?.set_parameter("tenantId", 1)?;
/// ```
#[derive(Debug)]
pub struct FilterHandle<'a> {
    session_id: u64,
    name: CheetahString,
    store: &'a FilterStore,
    binding: &'a mut FilterBinding,
}

impl FilterHandle<'_> {
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.binding.enabled
    }

    /// Binds `value` to parameter `parameter`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// * `UnknownParameter` - the filter declares no such parameter
    /// * `TypeMismatch` - the value's type is incompatible with the declaration
    pub fn set_parameter(&mut self, parameter: &str, value: impl Into<Value>) -> FilterResult<&mut Self> {
        let value = value.into();
        let spec = self
            .store
            .parameter_spec(self.name.as_str(), parameter)
            .ok_or_else(|| FilterError::unknown_parameter(self.name.as_str(), parameter))?;
        if !spec.ty.accepts(&value) {
            return Err(FilterError::type_mismatch(
                self.name.as_str(),
                parameter,
                spec.ty,
                value.type_name(),
            ));
        }
        debug!(
            "Session {} bound {}.{} = {}",
            self.session_id, self.name, parameter, value
        );
        self.binding.values.insert(spec.name, spec.ty.coerce(value));
        Ok(self)
    }

    pub fn parameter(&self, parameter: &str) -> Option<&Value> {
        self.binding.values.get(parameter)
    }
}
