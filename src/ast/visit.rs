//! Depth-first traversal of bodies and expressions.
//!
//! Analyses implement [`AstVisitor`], overriding only the hooks they care about,
//! and drive the traversal with the `walk_*` functions. `visit_*` hooks run before
//! the children of a node and return whether to descend; `end_visit_*` hooks run
//! after them. Every hook is fallible and errors abort the walk.
//!
//! Children are visited in source order: a call visits its callee before its
//! arguments, a member access visits the accessed expression before the
//! `end_visit_member_access` hook fires, and a function visits its modifier
//! invocations before its body.

use crate::{
    ast::{
        Block, Expression, ExpressionKind, FunctionCall, FunctionDefinition, Identifier,
        MemberAccess, ModifierDefinition, ModifierInvocation, NewExpression, Statement,
    },
    Result,
};

/// Hooks invoked during a walk. All defaults do nothing and descend.
pub trait AstVisitor {
    /// Called for every call-like expression before its callee and arguments
    ///
    /// Returning `false` skips the callee and the arguments.
    fn visit_function_call(&mut self, _expression: &Expression, _call: &FunctionCall) -> Result<bool> {
        Ok(true)
    }

    /// Called for every identifier
    fn visit_identifier(&mut self, _expression: &Expression, _identifier: &Identifier) -> Result<()> {
        Ok(())
    }

    /// Called for every member access after the accessed expression
    fn end_visit_member_access(
        &mut self,
        _expression: &Expression,
        _access: &MemberAccess,
    ) -> Result<()> {
        Ok(())
    }

    /// Called for every `new T` expression
    fn visit_new(&mut self, _expression: &NewExpression) -> Result<()> {
        Ok(())
    }

    /// Called for every `emit` statement with its event call
    ///
    /// Returning `false` skips the event call.
    fn visit_emit(&mut self, _event_call: &Expression) -> Result<bool> {
        Ok(true)
    }

    /// Called for every `_;` placeholder
    fn visit_placeholder(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called for every modifier invocation after its arguments
    fn end_visit_modifier_invocation(&mut self, _invocation: &ModifierInvocation) -> Result<()> {
        Ok(())
    }
}

/// Walks a function: its modifier invocations in order, then its body
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_function<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    function: &FunctionDefinition,
) -> Result<()> {
    for invocation in &function.modifiers {
        walk_modifier_invocation(visitor, invocation)?;
    }
    if let Some(body) = &function.body {
        walk_block(visitor, body)?;
    }
    Ok(())
}

/// Walks a modifier body
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_modifier<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    modifier: &ModifierDefinition,
) -> Result<()> {
    match &modifier.body {
        Some(body) => walk_block(visitor, body),
        None => Ok(()),
    }
}

/// Walks the arguments of a modifier invocation, then fires its end hook
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_modifier_invocation<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    invocation: &ModifierInvocation,
) -> Result<()> {
    for argument in &invocation.arguments {
        walk_expression(visitor, argument)?;
    }
    visitor.end_visit_modifier_invocation(invocation)
}

/// Walks every statement of a block
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_block<V: AstVisitor + ?Sized>(visitor: &mut V, block: &Block) -> Result<()> {
    for statement in &block.statements {
        walk_statement(visitor, statement)?;
    }
    Ok(())
}

/// Walks a statement and everything nested in it
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_statement<V: AstVisitor + ?Sized>(visitor: &mut V, statement: &Statement) -> Result<()> {
    match statement {
        Statement::Block(block) | Statement::UncheckedBlock(block) => walk_block(visitor, block),
        Statement::Expression(expression) | Statement::Revert(expression) => {
            walk_expression(visitor, expression)
        }
        Statement::Return(value) => walk_optional(visitor, value.as_ref()),
        Statement::VariableDeclaration { initial_value, .. } => {
            walk_optional(visitor, initial_value.as_ref())
        }
        Statement::Emit(event_call) => {
            if visitor.visit_emit(event_call)? {
                walk_expression(visitor, event_call)?;
            }
            Ok(())
        }
        Statement::If {
            condition,
            true_body,
            false_body,
        } => {
            walk_expression(visitor, condition)?;
            walk_statement(visitor, true_body)?;
            match false_body {
                Some(body) => walk_statement(visitor, body),
                None => Ok(()),
            }
        }
        Statement::While {
            condition,
            body,
            is_do_while,
        } => {
            if *is_do_while {
                walk_statement(visitor, body)?;
                walk_expression(visitor, condition)
            } else {
                walk_expression(visitor, condition)?;
                walk_statement(visitor, body)
            }
        }
        Statement::For {
            init,
            condition,
            loop_expression,
            body,
        } => {
            if let Some(init) = init {
                walk_statement(visitor, init)?;
            }
            walk_optional(visitor, condition.as_ref())?;
            walk_optional(visitor, loop_expression.as_ref())?;
            walk_statement(visitor, body)
        }
        Statement::Placeholder => visitor.visit_placeholder(),
        Statement::Break | Statement::Continue => Ok(()),
    }
}

fn walk_optional<V: AstVisitor + ?Sized>(visitor: &mut V, expression: Option<&Expression>) -> Result<()> {
    match expression {
        Some(expression) => walk_expression(visitor, expression),
        None => Ok(()),
    }
}

/// Walks an expression and all of its subexpressions
///
/// # Errors
///
/// Propagates the first error returned by a hook.
pub fn walk_expression<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> Result<()> {
    match &expression.kind {
        ExpressionKind::Literal(_) | ExpressionKind::ElementaryTypeName(_) => Ok(()),
        ExpressionKind::Identifier(identifier) => visitor.visit_identifier(expression, identifier),
        ExpressionKind::MemberAccess(access) => {
            walk_expression(visitor, &access.expression)?;
            visitor.end_visit_member_access(expression, access)
        }
        ExpressionKind::FunctionCall(call) => {
            if visitor.visit_function_call(expression, call)? {
                walk_expression(visitor, &call.expression)?;
                for argument in &call.arguments {
                    walk_expression(visitor, argument)?;
                }
            }
            Ok(())
        }
        ExpressionKind::New(new) => visitor.visit_new(new),
        ExpressionKind::IndexAccess { base, index } => {
            walk_expression(visitor, base)?;
            walk_optional(visitor, index.as_deref())
        }
        ExpressionKind::UnaryOperation { sub_expression, .. } => {
            walk_expression(visitor, sub_expression)
        }
        ExpressionKind::BinaryOperation { left, right, .. }
        | ExpressionKind::Assignment { left, right, .. } => {
            walk_expression(visitor, left)?;
            walk_expression(visitor, right)
        }
        ExpressionKind::Conditional {
            condition,
            true_expression,
            false_expression,
        } => {
            walk_expression(visitor, condition)?;
            walk_expression(visitor, true_expression)?;
            walk_expression(visitor, false_expression)
        }
        ExpressionKind::Tuple(components) => {
            for component in components.iter().flatten() {
                walk_expression(visitor, component)?;
            }
            Ok(())
        }
    }
}
