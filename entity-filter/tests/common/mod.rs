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

#![allow(dead_code)]

use std::sync::Arc;

use entity_filter::executor::FilteredExecutor;
use entity_filter::executor::MemoryExecutor;
use entity_filter::expression::Expr;
use entity_filter::filter::ParameterSpec;
use entity_filter::model::EntitySchema;
use entity_filter::model::MapEntityRow;
use entity_filter::model::ScalarType;
use entity_filter::model::SchemaCatalog;
use entity_filter::FilterEngine;
use entity_filter::FilterEngineConfig;

pub const BLOG_ENTRY: &str = "BlogEntry";
pub const TENANT: &str = "Tenant";
pub const CATEGORY: &str = "Category";

pub fn blog_catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with_schema(
            EntitySchema::new(BLOG_ENTRY, "Id")
                .with_field("Id", ScalarType::Int)
                .with_field("TenantId", ScalarType::Int)
                .with_field("CategoryId", ScalarType::Int)
                .with_field("Title", ScalarType::Text)
                .with_field("IsDeleted", ScalarType::Bool),
        )
        .with_schema(
            EntitySchema::new(TENANT, "Id")
                .with_field("Id", ScalarType::Int)
                .with_field("Name", ScalarType::Text),
        )
        .with_schema(
            EntitySchema::new(CATEGORY, "Id")
                .with_field("Id", ScalarType::Int)
                .with_field("Name", ScalarType::Text)
                .with_field("IsDeleted", ScalarType::Bool),
        )
}

/// Engine with the `Tenant` filter (`TenantId = :tenantId`, bindable from the
/// `currentTenant` context key) and the parameterless `BadCategory` filter
/// (`CategoryId <> 2`), both on `BlogEntry`. The store is left open.
pub fn blog_engine() -> FilterEngine {
    blog_engine_with(FilterEngineConfig::default())
}

pub fn blog_engine_with(config: FilterEngineConfig) -> FilterEngine {
    let engine = FilterEngine::new(Arc::new(blog_catalog()), config);
    engine
        .register_filter(
            BLOG_ENTRY,
            "Tenant",
            vec![ParameterSpec::new("tenantId", ScalarType::Int).from_context("currentTenant")],
            Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
        )
        .unwrap();
    engine
        .register_filter(
            BLOG_ENTRY,
            "BadCategory",
            vec![],
            Expr::ne(Expr::field("CategoryId"), Expr::lit(2)),
        )
        .unwrap();
    engine
}

/// Two blog entries, one per tenant, plus the tenants and categories.
pub fn blog_rows() -> Vec<MapEntityRow> {
    vec![
        MapEntityRow::new(BLOG_ENTRY)
            .with("Id", 1)
            .with("TenantId", 1)
            .with("CategoryId", 1)
            .with("Title", "Hello from tenant 1")
            .with("IsDeleted", false),
        MapEntityRow::new(BLOG_ENTRY)
            .with("Id", 2)
            .with("TenantId", 2)
            .with("CategoryId", 2)
            .with("Title", "Hello from tenant 2")
            .with("IsDeleted", true),
        MapEntityRow::new(TENANT).with("Id", 1).with("Name", "Acme"),
        MapEntityRow::new(TENANT).with("Id", 2).with("Name", "Globex"),
        MapEntityRow::new(CATEGORY)
            .with("Id", 1)
            .with("Name", "News")
            .with("IsDeleted", false),
        MapEntityRow::new(CATEGORY)
            .with("Id", 2)
            .with("Name", "Spam")
            .with("IsDeleted", true),
    ]
}

pub fn blog_executor(engine: &FilterEngine) -> FilteredExecutor<MemoryExecutor> {
    FilteredExecutor::new(engine.clone(), MemoryExecutor::with_rows(blog_rows()))
}
