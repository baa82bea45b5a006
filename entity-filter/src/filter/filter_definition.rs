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

use cheetah_string::CheetahString;

use crate::expression::Expr;
use crate::expression::ResolvedTemplate;
use crate::model::EntityType;
use crate::model::ScalarType;

/// Declaration of one filter parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: CheetahString,
    pub ty: ScalarType,
    /// Key consulted in the caller-supplied [`FilterContext`] when the session
    /// has no explicit binding for this parameter.
    ///
    /// [`FilterContext`]: crate::filter::FilterContext
    pub context_key: Option<CheetahString>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<CheetahString>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
            context_key: None,
        }
    }

    /// Falls back to `key` in the filter context when no value is bound.
    pub fn from_context(mut self, key: impl Into<CheetahString>) -> Self {
        self.context_key = Some(key.into());
        self
    }
}

/// A registered filter: a resolved predicate template scoped to one entity
/// type. Immutable once registered; identity is `(entity_type, name)`.
#[derive(Debug, Clone)]
pub struct FilterDefinition {
    name: CheetahString,
    entity_type: EntityType,
    parameters: Vec<ParameterSpec>,
    template: ResolvedTemplate,
    ordinal: usize,
}

impl FilterDefinition {
    pub(crate) fn new(
        name: CheetahString,
        entity_type: EntityType,
        parameters: Vec<ParameterSpec>,
        template: ResolvedTemplate,
        ordinal: usize,
    ) -> Self {
        Self {
            name,
            entity_type,
            parameters,
            template,
            ordinal,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Declared parameters, in declaration order.
    #[inline]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|spec| spec.name.as_str() == name)
    }

    /// The unbound predicate template.
    #[inline]
    pub fn template(&self) -> &Expr {
        self.template.expr()
    }

    #[inline]
    pub fn resolved(&self) -> &ResolvedTemplate {
        &self.template
    }

    /// Position of this definition in global registration order.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}
