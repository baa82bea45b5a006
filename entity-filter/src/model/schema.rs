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

use crate::model::entity_type::EntityType;
use crate::model::value::ScalarType;

/// A typed field of an entity shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: CheetahString,
    pub ty: ScalarType,
}

impl FieldDef {
    pub fn new(name: impl Into<CheetahString>, ty: ScalarType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Field layout of one entity type as reported by the mapping layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    entity_type: EntityType,
    fields: Vec<FieldDef>,
    primary_key: CheetahString,
}

impl EntitySchema {
    /// Creates a schema whose primary key is `primary_key`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let schema = EntitySchema::new("BlogEntry", "Id")
    ///     .with_field("Id", ScalarType::Int)
    ///     .with_field("TenantId", ScalarType::Int);
    /// ```
    pub fn new(entity_type: impl Into<EntityType>, primary_key: impl Into<CheetahString>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: Vec::new(),
            primary_key: primary_key.into(),
        }
    }

    pub fn with_field(mut self, name: impl Into<CheetahString>, ty: ScalarType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    #[inline]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    #[inline]
    pub fn primary_key(&self) -> &str {
        self.primary_key.as_str()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name.as_str() == name)
    }

    pub fn field_type(&self, name: &str) -> Option<ScalarType> {
        self.field(name).map(|field| field.ty)
    }
}

/// Reflection surface of the surrounding data-access layer.
///
/// The filter store validates templates against it at registration time.
pub trait EntityCatalog: Send + Sync {
    /// Schema of `entity_type`, `None` if the type is not mapped.
    fn schema(&self, entity_type: &str) -> Option<Arc<EntitySchema>>;

    /// All mapped entity types, in a stable order.
    fn entity_types(&self) -> Vec<EntityType>;
}

/// In-memory [`EntityCatalog`] filled by the mapping layer at startup.
#[derive(Debug, Default, Clone)]
pub struct SchemaCatalog {
    order: Vec<EntityType>,
    schemas: HashMap<EntityType, Arc<EntitySchema>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the schema of an entity type.
    pub fn insert(&mut self, schema: EntitySchema) -> &mut Self {
        let entity_type = schema.entity_type().clone();
        if self.schemas.insert(entity_type.clone(), Arc::new(schema)).is_none() {
            self.order.push(entity_type);
        }
        self
    }

    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.insert(schema);
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl EntityCatalog for SchemaCatalog {
    fn schema(&self, entity_type: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.get(entity_type).cloned()
    }

    fn entity_types(&self) -> Vec<EntityType> {
        self.order.clone()
    }
}
