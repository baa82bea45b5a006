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

use std::sync::Arc;

use entity_filter::executor::FilteredExecutor;
use entity_filter::executor::MemoryExecutor;
use entity_filter::executor::Query;
use entity_filter::expression::Expr;
use entity_filter::filter::FilterContext;
use entity_filter::filter::ParameterSpec;
use entity_filter::log::init_logger;
use entity_filter::model::EntitySchema;
use entity_filter::model::MapEntityRow;
use entity_filter::model::ScalarType;
use entity_filter::model::SchemaCatalog;
use entity_filter::FilterEngine;
use entity_filter::FilterResult;
use tracing::info;

fn main() -> FilterResult<()> {
    init_logger();

    let catalog = SchemaCatalog::new().with_schema(
        EntitySchema::new("BlogEntry", "Id")
            .with_field("Id", ScalarType::Int)
            .with_field("TenantId", ScalarType::Int)
            .with_field("Title", ScalarType::Text)
            .with_field("IsDeleted", ScalarType::Bool),
    );
    let engine = FilterEngine::with_defaults(Arc::new(catalog));
    engine.register_filter(
        "BlogEntry",
        "Tenant",
        vec![ParameterSpec::new("tenantId", ScalarType::Int).from_context("currentTenant")],
        Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
    )?;
    engine.register_convention(
        "SoftDelete",
        vec![],
        Expr::not(Expr::field("IsDeleted")),
    )?;

    let executor = FilteredExecutor::new(
        engine.clone(),
        MemoryExecutor::with_rows([
            MapEntityRow::new("BlogEntry")
                .with("Id", 1)
                .with("TenantId", 1)
                .with("Title", "Tenant 1 post")
                .with("IsDeleted", false),
            MapEntityRow::new("BlogEntry")
                .with("Id", 2)
                .with("TenantId", 2)
                .with("Title", "Tenant 2 post")
                .with("IsDeleted", false),
            MapEntityRow::new("BlogEntry")
                .with("Id", 3)
                .with("TenantId", 1)
                .with("Title", "Removed post")
                .with("IsDeleted", true),
        ]),
    );
    let all = Query::all("BlogEntry");

    let mut session = engine.begin_session();
    info!("No filters: {} entries", executor.execute(&all, &session)?.len());

    session.enable("SoftDelete")?;
    session.enable("Tenant")?.set_parameter("tenantId", 1)?;
    info!("Tenant 1, not deleted: {} entries", executor.execute(&all, &session)?.len());
    info!(
        "Entry 2 as tenant 1: {}",
        executor.find("BlogEntry", 2, &session)?.map(|_| "found").unwrap_or("not found")
    );

    session.disable("Tenant");
    info!("All tenants, not deleted: {} entries", executor.execute(&all, &session)?.len());
    drop(session);

    let mut request = engine.begin_session();
    request.enable("Tenant")?;
    let context = FilterContext::new().with("currentTenant", 2);
    info!(
        "Tenant from request context: {} entries",
        executor.execute_with_context(&all, &request, &context)?.len()
    );

    let stats = engine.cache_stats();
    info!(
        "Predicate cache: {} entries, {} hits, {} misses",
        stats.len, stats.hits, stats.misses
    );
    Ok(())
}
