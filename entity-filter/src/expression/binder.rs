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

use cheetah_string::CheetahString;
use entity_filter_error::FilterError;

use crate::constant::compare_op::CompareOp;
use crate::expression::expr::Expr;
use crate::expression::expr::FieldRef;
use crate::expression::expr::ParamRef;
use crate::expression::visitor::ExprVisitor;
use crate::model::Value;

/// Produces a parameter-free copy of a template by replacing every parameter
/// reference with the bound literal. The template itself is never modified.
pub struct Binder<'a> {
    filter: &'a str,
    values: &'a HashMap<CheetahString, Value>,
}

impl<'a> Binder<'a> {
    pub fn new(filter: &'a str, values: &'a HashMap<CheetahString, Value>) -> Self {
        Self { filter, values }
    }

    pub fn bind(mut self, template: &Expr) -> Result<Expr, FilterError> {
        template.accept(&mut self)
    }

    fn bind_all(&mut self, children: &[Expr]) -> Result<Vec<Expr>, FilterError> {
        children.iter().map(|child| child.accept(&mut *self)).collect()
    }
}

impl ExprVisitor for Binder<'_> {
    type Output = Expr;
    type Error = FilterError;

    fn visit_field(&mut self, field: &FieldRef) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Field(field.clone()))
    }

    fn visit_param(&mut self, param: &ParamRef) -> Result<Self::Output, Self::Error> {
        self.values
            .get(param.name.as_str())
            .map(|value| Expr::Literal(value.clone()))
            .ok_or_else(|| FilterError::missing_binding(self.filter, param.name.as_str()))
    }

    fn visit_literal(&mut self, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Literal(value.clone()))
    }

    fn visit_compare(&mut self, op: CompareOp, left: &Expr, right: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(Expr::compare(op, left.accept(self)?, right.accept(self)?))
    }

    fn visit_and(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(Expr::And(self.bind_all(children)?))
    }

    fn visit_or(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Or(self.bind_all(children)?))
    }

    fn visit_not(&mut self, inner: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(Expr::not(inner.accept(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_parameters_without_touching_template() {
        let template = Expr::and(vec![
            Expr::eq(Expr::field("TenantId"), Expr::param("tenantId")),
            Expr::not(Expr::field("IsDeleted")),
        ]);
        let mut values = HashMap::new();
        values.insert(CheetahString::from("tenantId"), Value::Int(7));

        let bound = Binder::new("Tenant", &values).bind(&template).unwrap();
        assert!(bound.is_parameter_free());
        assert_eq!(bound.to_string(), "(TenantId = 7 AND NOT (IsDeleted))");
        assert!(!template.is_parameter_free());
    }

    #[test]
    fn missing_value_is_missing_binding() {
        let template = Expr::eq(Expr::field("TenantId"), Expr::param("tenantId"));
        let values = HashMap::new();
        let err = Binder::new("Tenant", &values).bind(&template).unwrap_err();
        assert_eq!(err, FilterError::missing_binding("Tenant", "tenantId"));
    }
}
