use thiserror::Error;

use crate::ast::AstId;

macro_rules! inconsistent_tree {
    // Single string version
    ($msg:expr) => {
        crate::Error::InconsistentTree {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InconsistentTree {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every failure this library can report.
///
/// Call graph construction is a pure analysis over a syntax tree that upstream phases
/// (name resolution, type checking, inheritance linearization) have already validated.
/// None of these errors is a user-facing diagnostic: each one signals that the tree
/// handed to the builder breaks an invariant those phases are supposed to guarantee.
/// A build that fails returns no partial graph.
///
/// # Error Categories
///
/// ## Tree Consistency Errors
/// - [`Error::InconsistentTree`] - An annotation is missing or contradicts the tree
/// - [`Error::DeclarationNotFound`] - A referenced id has no declaration
/// - [`Error::UnexpectedDeclaration`] - A referenced id names the wrong kind of declaration
///
/// ## Construction Errors
/// - [`Error::Linearization`] - The inheritance graph has no C3 linearization
/// - [`Error::ContractMismatch`] - A creation graph was supplied for another contract
///
/// # Examples
///
/// ```rust
/// use solscope::{ast::AstBuilder, ContractCallGraph, Error};
///
/// let mut builder = AstBuilder::new();
/// let token = builder.contract("Token").id();
/// let ast = builder.build()?;
///
/// match ContractCallGraph::creation(&ast, token) {
///     Ok(graph) => println!("{} callables reachable", graph.callables().count()),
///     Err(Error::InconsistentTree { message, file, line }) => {
///         eprintln!("broken tree: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok::<(), solscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The syntax tree violates an invariant of the resolution phases.
    ///
    /// Raised for call expressions without a resolved function type, `emit`
    /// statements that do not name an event, `super` lookups that find no
    /// implementation, and similar contract violations. The error carries the
    /// source location where the inconsistency was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the broken invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Inconsistent syntax tree - {file}:{line}: {message}")]
    InconsistentTree {
        /// The message to be printed for the InconsistentTree error
        message: String,
        /// The source file in which this error occurred
        file: &'static str,
        /// The source line in which this error occurred
        line: u32,
    },

    /// A declaration id does not resolve in the syntax tree.
    ///
    /// The associated [`AstId`] is the id that could not be found.
    #[error("Declaration not found in syntax tree - {0}")]
    DeclarationNotFound(AstId),

    /// A declaration id resolves, but to a different kind of declaration.
    ///
    /// For example a modifier invocation whose annotation points at an event.
    #[error("Declaration {id} is not a {expected}")]
    UnexpectedDeclaration {
        /// The offending declaration id
        id: AstId,
        /// The kind of declaration that was expected
        expected: &'static str,
    },

    /// The inheritance hierarchy of a contract cannot be linearized.
    ///
    /// Produced by [`crate::ast::AstBuilder::build`] when the C3 merge fails, which
    /// happens for cyclic or order-inconsistent base lists.
    #[error("Failed to linearize inheritance - {0}")]
    Linearization(String),

    /// A creation graph was supplied for a different contract.
    ///
    /// The deployment graph consults the creation graph of the *same* contract;
    /// mixing graphs of different contracts is a caller error.
    #[error("Creation graph belongs to contract {found}, expected {expected}")]
    ContractMismatch {
        /// The contract the deployment graph is built for
        expected: AstId,
        /// The contract the supplied creation graph describes
        found: AstId,
    },
}
