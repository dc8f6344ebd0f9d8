//! Call graph nodes.
//!
//! A node is either a callable declaration (function or modifier) or one of two
//! synthetic nodes: [`Node::Entry`], standing for the outside world starting an
//! execution, and [`Node::InternalDispatch`], standing for the dispatch routine
//! that internal function pointer calls go through.

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::ast::{Ast, AstId, Callable, FunctionKind};

/// A vertex of a [`crate::analysis::ContractCallGraph`].
///
/// Nodes are ordered by their [`id`](Node::id): the synthetic nodes carry reserved
/// negative ids and therefore sort before every declaration, `InternalDispatch`
/// first. Ordering, equality and hashing agree with the ordering of the ids, which
/// is what allows looking nodes up in ordered sets by raw id (see the `Borrow`
/// implementations).
#[derive(Debug, Clone, Copy)]
pub enum Node {
    /// A function or modifier declaration
    Callable(AstId),
    /// The external entry point of the contract
    Entry,
    /// The internal function pointer dispatch routine
    InternalDispatch,
}

impl Node {
    /// Reserved id of [`Node::InternalDispatch`]
    pub const INTERNAL_DISPATCH_ID: AstId = AstId(-2);

    /// Reserved id of [`Node::Entry`]
    pub const ENTRY_ID: AstId = AstId(-1);

    /// Returns the ordering key of the node
    #[must_use]
    pub const fn id(&self) -> AstId {
        match self {
            Node::Callable(id) => *id,
            Node::Entry => Self::ENTRY_ID,
            Node::InternalDispatch => Self::INTERNAL_DISPATCH_ID,
        }
    }

    /// Returns the declaration id, or `None` for the synthetic nodes
    #[must_use]
    pub const fn callable(&self) -> Option<AstId> {
        match self {
            Node::Callable(id) => Some(*id),
            Node::Entry | Node::InternalDispatch => None,
        }
    }

    /// Returns `true` for [`Node::Entry`] and [`Node::InternalDispatch`]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(self, Node::Entry | Node::InternalDispatch)
    }

    /// Returns a [`Display`](fmt::Display) adapter rendering the node with names
    /// looked up in `ast`
    ///
    /// Synthetic nodes render as `Entry` and `InternalDispatch`. Callables render
    /// as their kind, qualified name and parameter types, e.g.
    /// `function Token.transfer(address,uint256)`, `modifier Token.onlyOwner()`,
    /// `constructor Token()`, `fallback Token()`. Unnamed functions other than the
    /// special ones render as `#<id>`, and ids that do not resolve to a callable
    /// render as `<unknown #id>`.
    #[must_use]
    pub fn display<'a>(&self, ast: &'a Ast) -> NodeDisplay<'a> {
        NodeDisplay { node: *self, ast }
    }
}

impl From<AstId> for Node {
    fn from(id: AstId) -> Self {
        Node::Callable(id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

// Lookups by raw id. Only sound because `Ord`, `Eq` and `Hash` are all defined
// through `id()`, which these return.
impl Borrow<AstId> for Node {
    fn borrow(&self) -> &AstId {
        match self {
            Node::Callable(id) => id,
            Node::Entry => &Self::ENTRY_ID,
            Node::InternalDispatch => &Self::INTERNAL_DISPATCH_ID,
        }
    }
}

impl Borrow<i64> for Node {
    fn borrow(&self) -> &i64 {
        let id: &AstId = self.borrow();
        &id.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Callable(id) => write!(f, "{id}"),
            Node::Entry => f.write_str("Entry"),
            Node::InternalDispatch => f.write_str("InternalDispatch"),
        }
    }
}

/// Renders a [`Node`] with declaration names, returned by [`Node::display`].
pub struct NodeDisplay<'a> {
    node: Node,
    ast: &'a Ast,
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Node::Callable(id) = self.node else {
            return write!(f, "{}", self.node);
        };
        let Some(callable) = self.ast.callable(id) else {
            return write!(f, "<unknown {id}>");
        };

        let contract = callable
            .scope()
            .and_then(|scope| self.ast.contract(scope))
            .map(|contract| contract.name.as_str());

        match callable {
            Callable::Modifier(modifier) => {
                f.write_str("modifier ")?;
                write_qualified(f, contract, &modifier.name, id)?;
            }
            Callable::Function(function) => match function.kind {
                FunctionKind::Constructor | FunctionKind::Fallback | FunctionKind::Receive => {
                    let keyword = match function.kind {
                        FunctionKind::Constructor => "constructor",
                        FunctionKind::Fallback => "fallback",
                        _ => "receive",
                    };
                    write!(f, "{keyword} {}", contract.unwrap_or_default())?;
                }
                FunctionKind::Function => {
                    f.write_str("function ")?;
                    write_qualified(f, contract, &function.name, id)?;
                }
            },
        }

        f.write_str("(")?;
        for (index, parameter) in callable.parameters().iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(&parameter.type_name)?;
        }
        f.write_str(")")
    }
}

fn write_qualified(
    f: &mut fmt::Formatter<'_>,
    contract: Option<&str>,
    name: &str,
    id: AstId,
) -> fmt::Result {
    if let Some(contract) = contract {
        write!(f, "{contract}.")?;
    }
    if name.is_empty() {
        write!(f, "{id}")
    } else {
        f.write_str(name)
    }
}
