//! # solscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the solscope library. Import this module to get quick access to the syntax tree
//! and the call graph analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all solscope operations
pub use crate::Error;

/// The result type used throughout solscope
pub use crate::Result;

// ================================================================================================
// Syntax Tree
// ================================================================================================

/// The resolved syntax tree and its identifiers
pub use crate::ast::{Ast, AstId};

/// Programmatic tree construction
pub use crate::ast::{AstBuilder, ContractBuilder, FunctionBuilder, ModifierBuilder, VariableBuilder};

/// Declarations
pub use crate::ast::{
    Callable, ContractDefinition, ContractKind, Declaration, DeclarationFlags, EventDefinition,
    FunctionDefinition, FunctionKind, ModifierDefinition, ModifierInvocation, VariableDeclaration,
    Visibility,
};

/// Statements and expressions
pub use crate::ast::{Block, Expression, FunctionTypeKind, Statement, VirtualLookup};

/// Tree traversal
pub use crate::ast::AstVisitor;

// ================================================================================================
// Call Graph Analysis
// ================================================================================================

/// Call graphs and their nodes
pub use crate::analysis::callgraph::{ContractCallGraph, Node, ProgramCallGraphs};

/// Call graph construction options
pub use crate::analysis::callgraph::CallGraphConfig;

/// Call site classification and dispatch resolution
pub use crate::analysis::callgraph::{CallResolver, CallSite, CallTarget, CallType};

/// Graph statistics
pub use crate::analysis::callgraph::{CallGraphStats, ResolverStats};
