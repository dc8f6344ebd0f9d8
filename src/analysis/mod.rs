//! Program analyses over resolved syntax trees.
//!
//! # Architecture
//!
//! The analysis module is organized into focused sub-modules:
//!
//! - [`callgraph`] - Static call graphs of contracts
//!
//! # Usage
//!
//! ```rust
//! use solscope::analysis::{CallGraphConfig, ProgramCallGraphs};
//! use solscope::ast::AstBuilder;
//!
//! let mut builder = AstBuilder::new();
//! let _vault = builder.contract("Vault").id();
//! let ast = builder.build()?;
//!
//! let graphs = ProgramCallGraphs::build(&ast, &CallGraphConfig::sequential())?;
//! for (contract, graphs) in graphs.iter() {
//!     println!("{contract}: {} deployed callables", graphs.deployment.callables().count());
//! }
//! # Ok::<(), solscope::Error>(())
//! ```

pub mod callgraph;

// Re-export primary types at module level
pub use callgraph::{
    CallGraphConfig, CallGraphStats, CallResolver, CallSite, CallTarget, CallType,
    ContractCallGraph, ContractGraphs, Node, NodeDisplay, ProgramCallGraphs, ResolverStats,
};
