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

use std::fmt;

use cheetah_string::CheetahString;

use crate::constant::compare_op::CompareOp;
use crate::expression::visitor::ExprVisitor;
use crate::model::Value;

/// Reference to a field of the entity being queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub name: CheetahString,
}

/// Reference to a named filter parameter, replaced by a literal when bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamRef {
    pub name: CheetahString,
}

/// Predicate tree over entity fields, literals and parameter slots.
///
/// Trees are immutable once built. Binding, injection and compilation all
/// produce new trees or closures and leave the input untouched.
///
/// # Example
///
/// ```ignore
/// // BlogEntry.TenantId == :tenantId
/// let template = Expr::eq(Expr::field("TenantId"), Expr::param("tenantId"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(FieldRef),
    Param(ParamRef),
    Literal(Value),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn field(name: impl Into<CheetahString>) -> Self {
        Expr::Field(FieldRef { name: name.into() })
    }

    pub fn param(name: impl Into<CheetahString>) -> Self {
        Expr::Param(ParamRef { name: name.into() })
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Le, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ge, left, right)
    }

    pub fn and(children: Vec<Expr>) -> Self {
        Expr::And(children)
    }

    pub fn or(children: Vec<Expr>) -> Self {
        Expr::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Logical AND of `self` and `other`, flattening nested conjunctions so
    /// repeated injection yields a single `And` node with operands in order.
    pub fn conjoin(self, other: Expr) -> Expr {
        let mut children = match self {
            Expr::And(children) => children,
            expr => vec![expr],
        };
        match other {
            Expr::And(more) => children.extend(more),
            expr => children.push(expr),
        }
        Expr::And(children)
    }

    /// Dispatches to the visitor method matching this node.
    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> Result<V::Output, V::Error> {
        match self {
            Expr::Field(field) => visitor.visit_field(field),
            Expr::Param(param) => visitor.visit_param(param),
            Expr::Literal(value) => visitor.visit_literal(value),
            Expr::Compare { op, left, right } => visitor.visit_compare(*op, left, right),
            Expr::And(children) => visitor.visit_and(children),
            Expr::Or(children) => visitor.visit_or(children),
            Expr::Not(inner) => visitor.visit_not(inner),
        }
    }

    /// Names of all fields referenced by the tree, in first-seen order.
    pub fn referenced_fields(&self) -> Vec<CheetahString> {
        let mut fields = Vec::new();
        self.walk(&mut |expr| {
            if let Expr::Field(field) = expr {
                if !fields.contains(&field.name) {
                    fields.push(field.name.clone());
                }
            }
        });
        fields
    }

    /// Names of all parameters referenced by the tree, in first-seen order.
    pub fn referenced_params(&self) -> Vec<CheetahString> {
        let mut params = Vec::new();
        self.walk(&mut |expr| {
            if let Expr::Param(param) = expr {
                if !params.contains(&param.name) {
                    params.push(param.name.clone());
                }
            }
        });
        params
    }

    pub fn is_parameter_free(&self) -> bool {
        self.referenced_params().is_empty()
    }

    fn walk(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Field(_) | Expr::Param(_) | Expr::Literal(_) => {}
            Expr::Compare { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::And(children) | Expr::Or(children) => children.iter().for_each(|child| child.walk(f)),
            Expr::Not(inner) => inner.walk(f),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(field) => write!(f, "{}", field.name),
            Expr::Param(param) => write!(f, ":{}", param.name),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Compare { op, left, right } => write!(f, "{left} {op} {right}"),
            Expr::And(children) => write_joined(f, children, " AND ", "TRUE"),
            Expr::Or(children) => write_joined(f, children, " OR ", "FALSE"),
            Expr::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Expr], separator: &str, empty: &str) -> fmt::Result {
    if children.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}
