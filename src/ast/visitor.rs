// Copyright 2024 OctoFHIR Team
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

//! Visitor pattern for expression tree traversal

use super::expression::{ExpressionNode, LiteralValue};

/// Trait for visiting expression nodes
pub trait Visitor: Sized {
    /// The result type of visiting a node
    type Result;

    /// Visit an expression node
    fn visit_expression(&mut self, expr: &ExpressionNode) -> Self::Result {
        walk_expression(self, expr)
    }

    /// Visit a literal expression
    fn visit_literal(&mut self, literal: &LiteralValue) -> Self::Result;

    /// Visit a function call
    fn visit_function_call(&mut self, name: &str, args: &[ExpressionNode]) -> Self::Result;
}

/// Default implementation of walking an expression tree
pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &ExpressionNode) -> V::Result {
    match expr {
        ExpressionNode::Literal(literal) => visitor.visit_literal(literal),
        ExpressionNode::FunctionCall(call) => visitor.visit_function_call(&call.name, &call.args),
    }
}

/// Collects the names of all functions called in an expression, in visit order
pub struct FunctionNameCollector {
    names: Vec<String>,
}

impl FunctionNameCollector {
    /// Collect called function names from `expr`
    pub fn collect(expr: &ExpressionNode) -> Vec<String> {
        let mut collector = Self { names: Vec::new() };
        collector.visit_expression(expr);
        collector.names
    }
}

impl Visitor for FunctionNameCollector {
    type Result = ();

    fn visit_literal(&mut self, _literal: &LiteralValue) {}

    fn visit_function_call(&mut self, name: &str, args: &[ExpressionNode]) {
        self.names.push(name.to_string());
        for arg in args {
            self.visit_expression(arg);
        }
    }
}
