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

//! Registration-time resolution of predicate templates.
//!
//! A template is checked once against the schema of the entity type it is
//! registered for and against its declared parameters. After this pass every
//! field and parameter reference is known to exist and every comparison is
//! known to be well typed, so binding and compilation never consult the
//! schema again.

use cheetah_string::CheetahString;

use crate::constant::compare_op::CompareOp;
use crate::expression::expr::Expr;
use crate::expression::expr::FieldRef;
use crate::expression::expr::ParamRef;
use crate::expression::visitor::ExprVisitor;
use crate::filter::ParameterSpec;
use crate::model::EntitySchema;
use crate::model::ScalarType;
use crate::model::Value;

/// A template that passed resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    expr: Expr,
    fields: Vec<(CheetahString, ScalarType)>,
    params: Vec<CheetahString>,
}

impl ResolvedTemplate {
    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Fields read by the template together with their schema types.
    #[inline]
    pub fn fields(&self) -> &[(CheetahString, ScalarType)] {
        &self.fields
    }

    /// Parameters the template actually references.
    #[inline]
    pub fn params(&self) -> &[CheetahString] {
        &self.params
    }
}

/// Type-checking visitor; the output is the type a node evaluates to, `None`
/// for an untyped `NULL` literal.
pub struct TemplateResolver<'a> {
    schema: &'a EntitySchema,
    parameters: &'a [ParameterSpec],
    fields: Vec<(CheetahString, ScalarType)>,
    params: Vec<CheetahString>,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(schema: &'a EntitySchema, parameters: &'a [ParameterSpec]) -> Self {
        Self {
            schema,
            parameters,
            fields: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Resolves `template`, returning the reason on failure.
    pub fn resolve(mut self, template: Expr) -> Result<ResolvedTemplate, String> {
        for (i, spec) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|other| other.name == spec.name) {
                return Err(format!("parameter '{}' is declared more than once", spec.name));
            }
        }
        match template.accept(&mut self)? {
            Some(ScalarType::Bool) => Ok(ResolvedTemplate {
                expr: template,
                fields: self.fields,
                params: self.params,
            }),
            other => Err(format!(
                "template must evaluate to Bool, found {}",
                other.map_or_else(|| "Null".to_string(), |ty| ty.to_string())
            )),
        }
    }

    fn require_bool(&mut self, expr: &Expr, context: &str) -> Result<(), String> {
        match expr.accept(self)? {
            Some(ScalarType::Bool) => Ok(()),
            _ => Err(format!("operand of {context} must be Bool: {expr}")),
        }
    }
}

impl ExprVisitor for TemplateResolver<'_> {
    type Output = Option<ScalarType>;
    type Error = String;

    fn visit_field(&mut self, field: &FieldRef) -> Result<Self::Output, Self::Error> {
        let ty = self.schema.field_type(field.name.as_str()).ok_or_else(|| {
            format!(
                "unknown field '{}' on entity '{}'",
                field.name,
                self.schema.entity_type()
            )
        })?;
        if !self.fields.iter().any(|(name, _)| *name == field.name) {
            self.fields.push((field.name.clone(), ty));
        }
        Ok(Some(ty))
    }

    fn visit_param(&mut self, param: &ParamRef) -> Result<Self::Output, Self::Error> {
        let spec = self
            .parameters
            .iter()
            .find(|spec| spec.name == param.name)
            .ok_or_else(|| format!("parameter '{}' is not declared", param.name))?;
        if !self.params.contains(&param.name) {
            self.params.push(param.name.clone());
        }
        Ok(Some(spec.ty))
    }

    fn visit_literal(&mut self, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(value.scalar_type())
    }

    fn visit_compare(&mut self, op: CompareOp, left: &Expr, right: &Expr) -> Result<Self::Output, Self::Error> {
        let left_ty = left.accept(self)?;
        let right_ty = right.accept(self)?;
        if let (Some(l), Some(r)) = (left_ty, right_ty) {
            if !l.comparable_with(r) {
                return Err(format!("cannot apply '{op}' to {l} and {r}"));
            }
        }
        Ok(Some(ScalarType::Bool))
    }

    fn visit_and(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        for child in children {
            self.require_bool(child, "AND")?;
        }
        Ok(Some(ScalarType::Bool))
    }

    fn visit_or(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        for child in children {
            self.require_bool(child, "OR")?;
        }
        Ok(Some(ScalarType::Bool))
    }

    fn visit_not(&mut self, inner: &Expr) -> Result<Self::Output, Self::Error> {
        self.require_bool(inner, "NOT")?;
        Ok(Some(ScalarType::Bool))
    }
}
