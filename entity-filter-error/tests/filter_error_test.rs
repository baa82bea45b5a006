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

//! Integration tests for FilterError propagation

use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;

fn bind(value: Option<i64>) -> FilterResult<i64> {
    value.ok_or_else(|| FilterError::missing_binding("Tenant", "tenantId"))
}

fn run_query(value: Option<i64>) -> FilterResult<String> {
    let tenant = bind(value)?;
    Ok(format!("TenantId = {tenant}"))
}

#[test]
fn test_filter_error_result_propagation() {
    assert_eq!(run_query(Some(1)).unwrap(), "TenantId = 1");

    let err = run_query(None).unwrap_err();
    assert!(matches!(err, FilterError::MissingBinding { .. }));
    assert!(err.to_string().contains("tenantId"));
}

#[test]
fn test_filter_error_is_std_error() {
    let err: Box<dyn std::error::Error + Send + Sync> = Box::new(FilterError::unknown_filter("Tenant"));
    assert_eq!(err.to_string(), "Unknown filter: Tenant");
}

#[test]
fn test_filter_error_equality() {
    assert_eq!(
        FilterError::unknown_parameter("Tenant", "x"),
        FilterError::UnknownParameter {
            filter: "Tenant".to_string(),
            parameter: "x".to_string(),
        }
    );
}
