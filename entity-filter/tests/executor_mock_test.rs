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

mod common;

use std::sync::Arc;

use common::blog_engine;
use common::BLOG_ENTRY;
use common::TENANT;
use entity_filter::executor::FilteredExecutor;
use entity_filter::executor::Query;
use entity_filter::executor::QueryExecutor;
use entity_filter::filter::BoundParams;
use entity_filter::filter::FilterContext;
use entity_filter::model::MapEntityRow;
use entity_filter::model::Value;
use entity_filter::FilterError;
use entity_filter::FilterResult;
use mockall::mock;

mock! {
    pub Executor {}

    impl QueryExecutor for Executor {
        type Row = MapEntityRow;

        fn execute(&self, query: &Query) -> FilterResult<Vec<MapEntityRow>>;
    }
}

fn predicate_text(query: &Query) -> Option<String> {
    query.effective_predicate().map(|predicate| predicate.to_string())
}

#[test]
fn interceptor_runs_once_per_query() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .withf(|query| {
            query.entity_type().as_str() == BLOG_ENTRY
                && predicate_text(query).as_deref() == Some("(Id > 0 AND TenantId = 1 AND CategoryId <> 2)")
        })
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let mut session = engine.begin_session();
    session.enable("BadCategory").unwrap();
    session.enable("Tenant").unwrap().set_parameter("tenantId", 1).unwrap();

    let query = Query::all(BLOG_ENTRY).filter(entity_filter::expression::Expr::gt(
        entity_filter::expression::Expr::field("Id"),
        entity_filter::expression::Expr::lit(0),
    ));
    assert!(executor.execute(&query, &session).unwrap().is_empty());
}

#[test]
fn missing_binding_never_reaches_executor() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner.expect_execute().never();
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let mut session = engine.begin_session();
    session.enable("Tenant").unwrap();

    let err = executor.execute(&Query::all(BLOG_ENTRY), &session).unwrap_err();
    assert_eq!(err, FilterError::missing_binding("Tenant", "tenantId"));
    let err = executor.find(BLOG_ENTRY, 1, &session).unwrap_err();
    assert_eq!(err, FilterError::missing_binding("Tenant", "tenantId"));
}

#[test]
fn unfiltered_entity_query_passes_through_untouched() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .withf(|query| {
            query.entity_type().as_str() == TENANT && query.predicate().is_none() && query.filters().is_empty()
        })
        .times(1)
        .returning(|_| Ok(vec![MapEntityRow::new(TENANT).with("Id", 1)]));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let mut session = engine.begin_session();
    session.enable("Tenant").unwrap().set_parameter("tenantId", 1).unwrap();
    assert_eq!(executor.execute(&Query::all(TENANT), &session).unwrap().len(), 1);
}

#[test]
fn find_uses_primary_key_and_filters() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .withf(|query| predicate_text(query).as_deref() == Some("(Id = 2 AND TenantId = 1)"))
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let mut session = engine.begin_session();
    session.enable("Tenant").unwrap().set_parameter("tenantId", 1).unwrap();
    assert!(executor.find(BLOG_ENTRY, 2, &session).unwrap().is_none());
}

#[test]
fn context_binding_reaches_executor() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .withf(|query| predicate_text(query).as_deref() == Some("TenantId = 7"))
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let mut session = engine.begin_session();
    session.enable("Tenant").unwrap();
    let context = FilterContext::new().with("currentTenant", 7);
    executor
        .execute_with_context(&Query::all(BLOG_ENTRY), &session, &context)
        .unwrap();
}

#[test]
fn executor_errors_propagate() {
    let engine = blog_engine();
    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .times(1)
        .returning(|_| Err(FilterError::intercept("connection lost")));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    let session = engine.begin_session();
    let err = executor.execute(&Query::all(BLOG_ENTRY), &session).unwrap_err();
    assert_eq!(err, FilterError::intercept("connection lost"));
}

#[test]
fn executor_receives_cached_filter_closures() {
    let engine = blog_engine();
    let mut session = engine.begin_session();
    session.enable("Tenant").unwrap().set_parameter("tenantId", 1).unwrap();

    let mut bound = BoundParams::new();
    bound.insert("tenantId".into(), Value::Int(1));
    let cached = engine.compile(BLOG_ENTRY, "Tenant", &bound).unwrap();

    let mut inner = MockExecutor::new();
    inner
        .expect_execute()
        .withf(move |query| {
            query.predicate().is_none()
                && query.filters().len() == 1
                && Arc::ptr_eq(&query.filters()[0], &cached)
        })
        .times(2)
        .returning(|_| Ok(Vec::new()));
    let executor = FilteredExecutor::new(engine.clone(), inner);

    executor.execute(&Query::all(BLOG_ENTRY), &session).unwrap();
    executor.execute(&Query::all(BLOG_ENTRY), &session).unwrap();
    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.len, 1);
}
