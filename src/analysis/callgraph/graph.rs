//! Call graph representation and queries.
//!
//! This module provides the [`ContractCallGraph`] structure, which records the
//! call relationships reachable in one contract together with the side effects
//! (emitted events, created contracts) of the reachable code. Graphs are built
//! by [`ContractCallGraph::creation`] and [`ContractCallGraph::deployment`] and
//! are immutable afterwards.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write;

use crate::{
    analysis::callgraph::Node,
    ast::{Ast, AstId, ContractDefinition},
    utils::escape_dot,
};

/// Static call graph of a single contract.
///
/// The graph captures, for one of the two points in a contract's lifecycle
/// (construction or execution of deployed code), which functions and modifiers
/// can run and which ones can cause which others to run.
///
/// Every node in the graph was discovered by traversal from [`Node::Entry`]: a
/// callable that can never execute never appears. A callable that was reached has
/// a (possibly empty) entry in the adjacency map, so absence of outgoing edges is
/// not the same as absence from the graph; use [`contains`](Self::contains) for
/// membership.
///
/// # Example
///
/// ```rust
/// use solscope::{ast::{AstBuilder, Block, Expression, Statement}, ContractCallGraph, Node};
///
/// let mut builder = AstBuilder::new();
/// let token = builder.contract("Token").id();
/// let burn = builder.function(token, "burn").internal().id();
/// let transfer = builder
///     .function(token, "transfer")
///     .body(Block::new(vec![Statement::expression(Expression::internal_call(
///         "burn",
///         burn,
///         vec![],
///     ))]))
///     .id();
/// let ast = builder.build()?;
///
/// let creation = ContractCallGraph::creation(&ast, token)?;
/// let deployed = ContractCallGraph::deployment(&ast, token, &creation)?;
///
/// assert!(deployed.has_edge(Node::Entry, Node::Callable(transfer)));
/// assert!(deployed.has_edge(Node::Callable(transfer), Node::Callable(burn)));
/// assert!(!creation.contains(Node::Callable(burn)));
/// # Ok::<(), solscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContractCallGraph<'a> {
    /// The contract the graph was built for.
    pub(crate) contract: &'a ContractDefinition,
    /// Adjacency sets, keyed by caller.
    pub(crate) edges: BTreeMap<Node, BTreeSet<Node>>,
    /// Contracts reachable code instantiates with `new`.
    pub(crate) created_contracts: BTreeSet<AstId>,
    /// Events reachable code emits.
    pub(crate) emitted_events: BTreeSet<AstId>,
    /// Functions reachable code takes as internal function pointers.
    pub(crate) pointer_targets: BTreeSet<AstId>,
}

impl<'a> ContractCallGraph<'a> {
    /// Creates an empty graph bound to `contract`.
    pub(crate) fn new(contract: &'a ContractDefinition) -> Self {
        Self {
            contract,
            edges: BTreeMap::new(),
            created_contracts: BTreeSet::new(),
            emitted_events: BTreeSet::new(),
            pointer_targets: BTreeSet::new(),
        }
    }

    /// Returns the contract the graph was built for.
    #[must_use]
    pub fn contract(&self) -> &'a ContractDefinition {
        self.contract
    }

    /// Returns the adjacency map.
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<Node, BTreeSet<Node>> {
        &self.edges
    }

    /// Returns the contracts reachable code can create.
    #[must_use]
    pub fn created_contracts(&self) -> &BTreeSet<AstId> {
        &self.created_contracts
    }

    /// Returns the events reachable code can emit.
    #[must_use]
    pub fn emitted_events(&self) -> &BTreeSet<AstId> {
        &self.emitted_events
    }

    /// Returns the functions reachable code takes as internal function pointers.
    ///
    /// A pointer taken here only becomes a dispatch target once reachable code
    /// also calls through a pointer; until then the function is absent from the
    /// graph. The set survives that distinction so that pointers stored during
    /// construction can be dispatched to by the deployed code.
    #[must_use]
    pub fn pointer_targets(&self) -> &BTreeSet<AstId> {
        &self.pointer_targets
    }

    /// Returns the direct callees of `node`, in node order.
    pub fn callees(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.edges.get(&node).into_iter().flatten().copied()
    }

    /// Returns the direct callers of `node`, in node order.
    #[must_use]
    pub fn callers(&self, node: Node) -> Vec<Node> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains(&node))
            .map(|(&caller, _)| caller)
            .collect()
    }

    /// Returns `true` if the graph has an edge `from -> to`.
    #[must_use]
    pub fn has_edge(&self, from: Node, to: Node) -> bool {
        self.edges
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Returns `true` if `node` is part of the graph.
    ///
    /// [`Node::Entry`] is always part of the graph; any other node is part of it
    /// when it was reached from `Entry`.
    #[must_use]
    pub fn contains(&self, node: Node) -> bool {
        matches!(node, Node::Entry)
            || self.edges.contains_key(&node)
            || self.edges.values().any(|targets| targets.contains(&node))
    }

    /// Returns every node of the graph, in node order.
    #[must_use]
    pub fn nodes(&self) -> BTreeSet<Node> {
        let mut nodes: BTreeSet<Node> = self.edges.keys().copied().collect();
        nodes.extend(self.edges.values().flatten().copied());
        nodes.insert(Node::Entry);
        nodes
    }

    /// Returns the ids of the reachable functions and modifiers, in id order.
    pub fn callables(&self) -> impl Iterator<Item = AstId> + '_ {
        self.edges.keys().filter_map(Node::callable)
    }

    /// Returns `true` if code reachable from `Entry` can call through an
    /// internal function pointer.
    #[must_use]
    pub fn is_dispatch_reachable(&self) -> bool {
        self.reachable_from(Node::Entry).contains(&Node::InternalDispatch)
    }

    /// Returns the callables internal function pointer calls can land in.
    #[must_use]
    pub fn dispatch_targets(&self) -> Vec<AstId> {
        self.callees(Node::InternalDispatch)
            .filter_map(|node| node.callable())
            .collect()
    }

    /// Returns every node reachable from `start` through one or more edges,
    /// plus `start` itself.
    #[must_use]
    pub fn reachable_from(&self, start: Node) -> BTreeSet<Node> {
        let mut reached = BTreeSet::new();
        let mut worklist = VecDeque::from([start]);

        while let Some(node) = worklist.pop_front() {
            if !reached.insert(node) {
                continue;
            }
            worklist.extend(self.callees(node).filter(|callee| !reached.contains(callee)));
        }

        reached
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Returns statistics about the graph.
    #[must_use]
    pub fn stats(&self) -> CallGraphStats {
        let callables: Vec<AstId> = self.callables().collect();
        let leaf_callables = callables
            .iter()
            .filter(|&&id| self.callees(Node::Callable(id)).next().is_none())
            .count();
        let indirect_callers = self
            .edges
            .iter()
            .filter(|(_, targets)| targets.contains(&Node::InternalDispatch))
            .count();

        CallGraphStats {
            node_count: self.nodes().len(),
            callable_count: callables.len(),
            edge_count: self.edge_count(),
            entry_points: self.callees(Node::Entry).count(),
            dispatch_targets: self.callees(Node::InternalDispatch).count(),
            indirect_callers,
            leaf_callables,
            created_contracts: self.created_contracts.len(),
            emitted_events: self.emitted_events.len(),
        }
    }

    /// Generates a DOT format representation of this call graph.
    ///
    /// Nodes are labelled with [`Node::display`]. The synthetic nodes are
    /// highlighted: `Entry` in green, `InternalDispatch` in yellow. Created
    /// contracts and emitted events are listed in the graph label.
    ///
    /// # Arguments
    ///
    /// * `ast` - The syntax tree the graph was built from, for names
    /// * `title` - Optional title for the graph, defaults to the contract name
    ///
    /// # Returns
    ///
    /// A string containing the DOT representation of the call graph.
    #[must_use]
    pub fn to_dot(&self, ast: &Ast, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CallGraph {\n");
        let title = title.unwrap_or(self.contract.name.as_str());
        let _ = write!(dot, "    label=\"{}", escape_dot(title));
        for &contract in &self.created_contracts {
            let name = ast.contract(contract).map_or("?", |c| c.name.as_str());
            let _ = write!(dot, "\\ncreates {}", escape_dot(name));
        }
        for &event in &self.emitted_events {
            let name = ast.event(event).map_or("?", |e| e.name.as_str());
            let _ = write!(dot, "\\nemits {}", escape_dot(name));
        }
        dot.push_str("\";\n");
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    rankdir=TB;\n\n");

        for node in self.nodes() {
            let style = match node {
                Node::Entry => ", style=filled, fillcolor=lightgreen",
                Node::InternalDispatch => ", style=filled, fillcolor=lightyellow",
                Node::Callable(_) => "",
            };
            let _ = writeln!(
                dot,
                "    \"{}\" [label=\"{}\"{style}];",
                node.id(),
                escape_dot(&node.display(ast).to_string()),
            );
        }

        dot.push('\n');

        for (caller, callees) in &self.edges {
            for callee in callees {
                let _ = writeln!(dot, "    \"{}\" -> \"{}\";", caller.id(), callee.id());
            }
        }

        dot.push_str("}\n");
        dot
    }
}

impl PartialEq for ContractCallGraph<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.contract.id == other.contract.id
            && self.edges == other.edges
            && self.created_contracts == other.created_contracts
            && self.emitted_events == other.emitted_events
            && self.pointer_targets == other.pointer_targets
    }
}

impl Eq for ContractCallGraph<'_> {}

/// Statistics about a contract call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraphStats {
    /// Number of nodes, synthetic nodes included.
    pub node_count: usize,
    /// Number of reachable functions and modifiers.
    pub callable_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Number of callables `Entry` invokes directly.
    pub entry_points: usize,
    /// Number of callables reachable through internal function pointers.
    pub dispatch_targets: usize,
    /// Number of nodes calling through an internal function pointer.
    pub indirect_callers: usize,
    /// Number of callables without outgoing edges.
    pub leaf_callables: usize,
    /// Number of contracts created by reachable code.
    pub created_contracts: usize,
    /// Number of events emitted by reachable code.
    pub emitted_events: usize,
}

impl CallGraphStats {
    /// Returns the share of callables reachable through function pointers, as a percentage.
    ///
    /// # Returns
    ///
    /// The percentage of dispatch targets among all callables (0.0 to 100.0).
    /// Returns 0.0 if the graph has no callables.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dispatch_rate(&self) -> f64 {
        if self.callable_count == 0 {
            0.0
        } else {
            (self.dispatch_targets as f64 / self.callable_count as f64) * 100.0
        }
    }
}
