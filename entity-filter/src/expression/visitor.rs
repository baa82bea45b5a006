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

use crate::constant::compare_op::CompareOp;
use crate::expression::expr::Expr;
use crate::expression::expr::FieldRef;
use crate::expression::expr::ParamRef;
use crate::model::Value;

/// Visitor over [`Expr`] nodes.
///
/// Each pass over a predicate tree (template resolution, parameter binding,
/// closure compilation) is one implementation of this trait. Composite nodes
/// receive their children unvisited so a pass decides how and whether to
/// recurse, typically through [`Expr::accept`].
pub trait ExprVisitor {
    type Output;
    type Error;

    fn visit_field(&mut self, field: &FieldRef) -> Result<Self::Output, Self::Error>;

    fn visit_param(&mut self, param: &ParamRef) -> Result<Self::Output, Self::Error>;

    fn visit_literal(&mut self, value: &Value) -> Result<Self::Output, Self::Error>;

    fn visit_compare(&mut self, op: CompareOp, left: &Expr, right: &Expr) -> Result<Self::Output, Self::Error>;

    fn visit_and(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error>;

    fn visit_or(&mut self, children: &[Expr]) -> Result<Self::Output, Self::Error>;

    fn visit_not(&mut self, inner: &Expr) -> Result<Self::Output, Self::Error>;
}
