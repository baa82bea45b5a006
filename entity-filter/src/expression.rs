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

//! Predicate expressions.
//!
//! Templates are built as [`Expr`] trees, resolved once against an entity
//! schema, bound to parameter values and finally compiled into a
//! [`CompiledPredicate`].

mod binder;
mod expr;
mod predicate;
mod resolver;
mod visitor;

pub use binder::Binder;
pub use expr::Expr;
pub use expr::FieldRef;
pub use expr::ParamRef;
pub use predicate::CompiledPredicate;
pub use resolver::ResolvedTemplate;
pub use resolver::TemplateResolver;
pub use visitor::ExprVisitor;

pub use crate::constant::compare_op::CompareOp;
