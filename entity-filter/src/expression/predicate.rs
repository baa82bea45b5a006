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

//! Executable predicates.
//!
//! A parameter-free [`Expr`] is compiled once into a tree of closures. The
//! resulting [`CompiledPredicate`] is immutable, cheap to clone and safe to
//! share between threads, which is what allows the compiled-predicate cache to
//! hand the same entry to several sessions.

use std::fmt;
use std::sync::Arc;

use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;

use crate::constant::compare_op::CompareOp;
use crate::expression::expr::Expr;
use crate::expression::expr::FieldRef;
use crate::expression::expr::ParamRef;
use crate::expression::visitor::ExprVisitor;
use crate::model::EntityRow;
use crate::model::Value;

type Evaluator = Arc<dyn Fn(&dyn EntityRow) -> Value + Send + Sync>;

/// A bound predicate tree together with its compiled evaluator.
#[derive(Clone)]
pub struct CompiledPredicate {
    expr: Arc<Expr>,
    evaluator: Evaluator,
}

impl CompiledPredicate {
    /// Compiles a parameter-free predicate tree.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Intercept` if the tree still contains a parameter
    /// reference.
    pub fn compile(expr: Expr) -> FilterResult<Self> {
        let evaluator = expr.accept(&mut EvaluatorBuilder)?;
        Ok(Self {
            expr: Arc::new(expr),
            evaluator,
        })
    }

    /// Returns `true` if the row satisfies the predicate.
    ///
    /// Missing fields read as `NULL`; a non-boolean result never matches.
    #[inline]
    pub fn matches(&self, row: &dyn EntityRow) -> bool {
        (self.evaluator)(row).is_true()
    }

    /// The bound tree this predicate was compiled from, for injection into a
    /// query's predicate tree.
    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Debug for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("expr", &format_args!("{}", self.expr))
            .finish()
    }
}

struct EvaluatorBuilder;

impl EvaluatorBuilder {
    fn build_all(&mut self, children: &[Expr]) -> FilterResult<Vec<Evaluator>> {
        children.iter().map(|child| child.accept(&mut *self)).collect()
    }
}

impl ExprVisitor for EvaluatorBuilder {
    type Output = Evaluator;
    type Error = FilterError;

    fn visit_field(&mut self, field: &FieldRef) -> Result<Self::Output, Self::Error> {
        let name = field.name.clone();
        Ok(Arc::new(move |row: &dyn EntityRow| {
            row.get(name.as_str()).cloned().unwrap_or(Value::Null)
        }))
    }

    fn visit_param(&mut self, param: &ParamRef) -> Result<Self::Output, Self::Error> {
        Err(FilterError::intercept(format!(
            "parameter ':{}' is not bound in executable predicate",
            param.name
        )))
    }

    fn visit_literal(&mut self, value: &Value) -> Result<Self::Output, Self::Error> {
        let value = value.clone();
        Ok(Arc::new(move |_: &dyn EntityRow| value.clone()))
    }

    fn visit_compare(&mut self, op: CompareOp, left: &Expr, right: &Expr) -> Result<Self::Output, Self::Error> {
        let left = left.accept(self)?;
        let right = right.accept(self)?;
        Ok(Arc::new(move |row: &dyn EntityRow| {
            Value::Bool(op.apply(&left(row), &right(row)))
        }))
    }

    fn visit_and(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        let children = self.build_all(children)?;
        Ok(Arc::new(move |row: &dyn EntityRow| {
            Value::Bool(children.iter().all(|child| child(row).is_true()))
        }))
    }

    fn visit_or(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error> {
        let children = self.build_all(children)?;
        Ok(Arc::new(move |row: &dyn EntityRow| {
            Value::Bool(children.iter().any(|child| child(row).is_true()))
        }))
    }

    fn visit_not(&mut self, inner: &Expr) -> Result<Self::Output, Self::Error> {
        let inner = inner.accept(self)?;
        Ok(Arc::new(move |row: &dyn EntityRow| match inner(row) {
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Bool(false),
        }))
    }
}
