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

//! Entity model consumed by the filter engine.
//!
//! The storage engine and the object-relational mapping live outside this crate.
//! What the engine needs from them is captured here: a name for each entity
//! shape, the typed fields of that shape, a scalar value representation and a
//! way to read a field from a materialized row.

mod entity_row;
mod entity_type;
mod schema;
mod value;

pub use entity_row::EntityRow;
pub use entity_row::MapEntityRow;
pub use entity_type::EntityType;
pub use schema::EntityCatalog;
pub use schema::EntitySchema;
pub use schema::FieldDef;
pub use schema::SchemaCatalog;
pub use value::ScalarType;
pub use value::Value;
