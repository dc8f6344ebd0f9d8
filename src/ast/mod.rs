//! The resolved syntax tree consumed by the analyses.
//!
//! This module models the subset of a type-checked contract compilation that
//! call graph construction needs. Parsing and name resolution happen upstream:
//! by the time an [`Ast`] exists, every identifier and member access carries the
//! declaration it refers to, how that declaration is looked up
//! ([`VirtualLookup`]), and the kind of function type it has
//! ([`FunctionTypeKind`]). Every contract carries its C3 linearization.
//!
//! # Components
//!
//! - [`Ast`]: immutable arena of all declarations, indexed by [`AstId`]
//! - [`AstBuilder`]: constructs trees and computes linearizations
//! - [`Declaration`] and the definition types: contracts, functions, modifiers,
//!   events and variables
//! - [`Expression`] and [`Statement`]: bodies, with their annotations
//! - [`AstVisitor`] and the `walk_*` functions: depth-first traversal

mod builder;
mod declaration;
mod expression;
mod id;
mod statement;
mod tree;
mod visit;

pub use builder::{AstBuilder, ContractBuilder, FunctionBuilder, ModifierBuilder, VariableBuilder};
pub use declaration::{
    Callable, ContractDefinition, ContractKind, Declaration, DeclarationFlags, EventDefinition,
    FunctionDefinition, FunctionKind, InheritanceSpecifier, ModifierDefinition, ModifierInvocation,
    Parameter, VariableDeclaration, Visibility,
};
pub use expression::{
    Expression, ExpressionAnnotation, ExpressionKind, FunctionCall, FunctionCallKind,
    FunctionTypeKind, Identifier, MemberAccess, NewExpression, VirtualLookup,
};
pub use id::AstId;
pub use statement::{Block, Statement};
pub use tree::Ast;
pub use visit::{
    walk_block, walk_expression, walk_function, walk_modifier, walk_modifier_invocation,
    walk_statement, AstVisitor,
};
