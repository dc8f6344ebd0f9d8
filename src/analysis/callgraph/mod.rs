//! Static call graph construction for contracts.
//!
//! This module builds, for a single contract, a graph of which functions and
//! modifiers can cause which others to run, together with the events that can be
//! emitted and the contracts that can be created by the reachable code. Compiler
//! analyses use it for reachability-based dead code elimination, recursion
//! detection and side effect propagation.
//!
//! # Architecture
//!
//! Two graphs are built per contract, because a contract's code runs at two points
//! in its lifecycle:
//!
//! - The **creation graph**, rooted at the deployment transaction: state variable
//!   initializers, constructors of the contract and its bases, and base
//!   constructor arguments.
//! - The **deployment graph**, rooted at an incoming message call: every
//!   externally callable function plus the fallback and receive functions.
//!
//! Each graph is built by a worklist traversal from the synthetic
//! [`Node::Entry`]. Calls that target a runtime-computed internal function
//! pointer go through the synthetic [`Node::InternalDispatch`], whose successors
//! are all the functions whose pointers were taken. Virtual references are
//! resolved to the most-derived override in the contract's linearization.
//!
//! # Components
//!
//! - [`ContractCallGraph`]: The graph of one contract, with queries and DOT output
//! - [`Node`]: A callable or one of the two synthetic nodes
//! - [`CallSite`]: A reference found in a body, with its [`CallType`] and [`CallTarget`]
//! - [`CallResolver`]: Virtual and `super` dispatch over the linearization
//! - [`CallGraphConfig`]: Construction options
//! - [`ProgramCallGraphs`]: Both graphs of every deployable contract
//!
//! # Example
//!
//! ```rust
//! use solscope::{ast::{AstBuilder, Block, Expression, Statement}, ContractCallGraph, Node};
//!
//! let mut builder = AstBuilder::new();
//! let wallet = builder.contract("Wallet").id();
//! let paid = builder.event(wallet, "Paid", &[("amount", "uint256")]);
//! let pay = builder
//!     .function(wallet, "pay")
//!     .body(Block::new(vec![Statement::Emit(Expression::event_call(
//!         "Paid",
//!         paid,
//!         vec![Expression::literal("1")],
//!     ))]))
//!     .id();
//! let ast = builder.build()?;
//!
//! let creation = ContractCallGraph::creation(&ast, wallet)?;
//! let deployed = ContractCallGraph::deployment(&ast, wallet, &creation)?;
//!
//! for callee in deployed.callees(Node::Entry) {
//!     println!("callable from outside: {}", callee.display(&ast));
//! }
//! assert!(deployed.contains(Node::Callable(pay)));
//! assert!(deployed.emitted_events().contains(&paid));
//! assert!(creation.emitted_events().is_empty());
//! # Ok::<(), solscope::Error>(())
//! ```

mod builder;
mod config;
mod graph;
mod node;
mod program;
mod resolution;
mod site;

pub use config::CallGraphConfig;
pub use graph::{CallGraphStats, ContractCallGraph};
pub use node::{Node, NodeDisplay};
pub use program::{ContractGraphs, ProgramCallGraphs};
pub use resolution::{CallResolver, ResolverStats};
pub use site::{CallSite, CallTarget, CallType};
