//! Call site representation and call target types.
//!
//! This module defines the types used to represent the individual references
//! discovered while walking a callable, and how each one turns into an edge of
//! the call graph.

use strum::{EnumCount, EnumIter};

use crate::{
    analysis::callgraph::Node,
    ast::{AstId, FunctionCall, FunctionCallKind, FunctionTypeKind},
    Result,
};

/// Kind of reference to a callable.
///
/// The kind decides where an edge starts and ends: references made at a call
/// site originate at the node being walked, references that only take a
/// function as a value originate at [`Node::InternalDispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CallType {
    /// The callable is the immediate callee of a call (`f()`, `Base.f()`, `super.f()`).
    Direct,
    /// The callable is used as a value (`fptr = f`) and may later be called indirectly.
    Reference,
    /// A call through an internal function pointer (`fptr()`).
    Indirect,
    /// A modifier invocation attached to a function.
    Modifier,
    /// A modifier continuing into the function it modifies through `_;`.
    Placeholder,
    /// A message call, built-in or other call leaving the contract's internal code.
    External,
}

impl CallType {
    /// Classifies a call expression by the function type of its callee.
    ///
    /// # Arguments
    ///
    /// * `call` - The call expression
    ///
    /// # Returns
    ///
    /// `None` for type conversions and struct constructor calls, which are not
    /// calls at all. Otherwise [`CallType::Direct`] or [`CallType::Indirect`] for
    /// internal function types and [`CallType::External`] for everything else.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InconsistentTree`] if the callee of a real call has
    /// no resolved function type.
    pub fn of_call(call: &FunctionCall) -> Result<Option<CallType>> {
        if call.kind != FunctionCallKind::FunctionCall {
            return Ok(None);
        }

        match call.expression.function_type() {
            None => Err(inconsistent_tree!(
                "function call without a resolved callee function type"
            )),
            Some(FunctionTypeKind::Internal) if call.expression.is_called_directly() => {
                Ok(Some(CallType::Direct))
            }
            Some(FunctionTypeKind::Internal) => Ok(Some(CallType::Indirect)),
            Some(_) => Ok(Some(CallType::External)),
        }
    }

    /// Classifies a reference to a callable by whether it is called on the spot.
    #[must_use]
    pub const fn of_reference(called_directly: bool) -> CallType {
        if called_directly {
            CallType::Direct
        } else {
            CallType::Reference
        }
    }

    /// Returns `true` if the reference produces an edge.
    #[must_use]
    pub const fn has_edge(&self) -> bool {
        !matches!(self, Self::External)
    }
}

/// Resolved target of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallTarget {
    /// Resolved to a callable of the contract.
    Resolved {
        /// The declaration named at the reference site.
        declared: AstId,
        /// The implementation that executes after override resolution.
        target: AstId,
    },

    /// Any function whose pointer was taken.
    InternalDispatch,

    /// Code outside the contract's internal functions.
    Outside,
}

impl CallTarget {
    /// Creates a target that needs no override resolution.
    #[must_use]
    pub const fn exact(id: AstId) -> Self {
        Self::Resolved {
            declared: id,
            target: id,
        }
    }

    /// Returns the callable that executes, if the target is a callable.
    #[must_use]
    pub const fn callable(&self) -> Option<AstId> {
        match self {
            Self::Resolved { target, .. } => Some(*target),
            Self::InternalDispatch | Self::Outside => None,
        }
    }

    /// Returns the graph node standing for the target, if there is one.
    #[must_use]
    pub const fn node(&self) -> Option<Node> {
        match self {
            Self::Resolved { target, .. } => Some(Node::Callable(*target)),
            Self::InternalDispatch => Some(Node::InternalDispatch),
            Self::Outside => None,
        }
    }
}

/// A single reference discovered while walking a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// The node being walked when the reference was found.
    pub caller: Node,
    /// Kind of reference.
    pub call_type: CallType,
    /// Resolved target.
    pub target: CallTarget,
}

impl CallSite {
    /// Creates a new call site.
    ///
    /// # Arguments
    ///
    /// * `caller` - The node being walked
    /// * `call_type` - The kind of reference
    /// * `target` - The resolved target
    #[must_use]
    pub const fn new(caller: Node, call_type: CallType, target: CallTarget) -> Self {
        Self {
            caller,
            call_type,
            target,
        }
    }

    /// Returns the edge this reference adds to the graph.
    ///
    /// # Returns
    ///
    /// - `(caller, target)` for direct calls, modifier invocations and placeholders
    /// - `(InternalDispatch, target)` for callables used as values
    /// - `(caller, InternalDispatch)` for indirect calls
    /// - `None` for references leaving the contract or without a node target
    #[must_use]
    pub const fn edge(&self) -> Option<(Node, Node)> {
        let Some(target) = self.target.node() else {
            return None;
        };
        match self.call_type {
            CallType::Direct | CallType::Modifier | CallType::Placeholder => {
                Some((self.caller, target))
            }
            CallType::Reference => Some((Node::InternalDispatch, target)),
            CallType::Indirect => Some((self.caller, Node::InternalDispatch)),
            CallType::External => None,
        }
    }

    /// Returns `true` if override resolution picked a different implementation
    /// than the declaration named at the reference site.
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        matches!(
            self.target,
            CallTarget::Resolved { declared, target } if declared.0 != target.0
        )
    }
}
