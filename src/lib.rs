// Copyright 2025 Johann Kempter
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
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # solscope
//!
//! Static call graphs for Solidity-style contracts.
//!
//! `solscope` takes a resolved and type-checked contract syntax tree and computes, for
//! every contract, which functions and modifiers can ever run, which of them can reach
//! which others, which events can be emitted and which contracts can be created. The
//! result feeds compiler passes such as unreachable code elimination, recursion
//! detection and side-effect propagation.
//!
//! ## Features
//!
//! - **Two graphs per contract** - one for contract creation, one for the deployed code
//! - **Virtual dispatch** - references resolve to the most-derived override in the C3
//!   linearization, `super` calls to the next implementation after the calling contract
//! - **Internal dispatch** - calls through internal function pointers are modelled by a
//!   single synthetic node whose successors are all functions whose address was taken
//! - **Side effects** - emitted events and created contracts are tracked per graph
//! - **Parallel batch builds** - all deployable contracts of a program can be processed
//!   concurrently
//! - **DOT export** - graphs render with Graphviz
//!
//! ## Quick Start
//!
//! ```rust
//! use solscope::prelude::*;
//!
//! let mut builder = AstBuilder::new();
//! let token = builder.contract("Token").id();
//! let mint = builder.function(token, "_mint").internal().id();
//! let _mint = builder
//!     .function(token, "mint")
//!     .external()
//!     .body(Block::new(vec![Statement::expression(Expression::internal_call(
//!         "_mint",
//!         mint,
//!         vec![],
//!     ))]))
//!     .id();
//! let ast = builder.build()?;
//!
//! let creation = ContractCallGraph::creation(&ast, token)?;
//! let deployed = ContractCallGraph::deployment(&ast, token, &creation)?;
//!
//! assert!(deployed.contains(Node::Callable(mint)));
//! println!("{}", deployed.to_dot(&ast, None));
//! # Ok::<(), solscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ast`] - The resolved syntax tree consumed by the analyses, plus an [`ast::AstBuilder`]
//!   for assembling trees programmatically
//! - [`analysis`] - The analyses, currently [`analysis::callgraph`]
//! - [`prelude`] - Glob-importable selection of the common types
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). The analyses trust the syntax tree
//! they are given: every error reports a tree that breaks an invariant the upstream
//! resolution phases guarantee, never a problem in the analysed program itself.
//!
//! ```rust
//! use solscope::{ast::AstBuilder, ast::AstId, ContractCallGraph, Error};
//!
//! let ast = AstBuilder::new().build()?;
//! match ContractCallGraph::creation(&ast, AstId::new(7)) {
//!     Err(Error::DeclarationNotFound(id)) => println!("no declaration {}", id),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! # Ok::<(), solscope::Error>(())
//! ```
//!
//! ## Logging
//!
//! Construction steps are reported through the [`log`](https://docs.rs/log) facade at
//! `debug` and `trace` level. Install any logger implementation to see them.
#[macro_use]
pub(crate) mod error;

pub(crate) mod utils;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use solscope::prelude::*;
///
/// let ast = AstBuilder::new().build()?;
/// let graphs = ProgramCallGraphs::build(&ast, &CallGraphConfig::default())?;
/// assert!(graphs.is_empty());
/// # Ok::<(), solscope::Error>(())
/// ```
pub mod prelude;

/// The resolved contract syntax tree.
///
/// Declarations, statements and expressions carry the annotations of name resolution
/// and type checking: referenced declarations, virtual lookup kinds and function
/// types. Trees are normally produced by a frontend; [`ast::AstBuilder`] assembles them
/// directly and computes the inheritance linearization.
pub mod ast;

/// Program analyses over resolved syntax trees.
pub mod analysis;

/// `solscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use solscope::{ast::{Ast, AstId}, ContractCallGraph, Result};
///
/// fn reachable(ast: &Ast, contract: AstId) -> Result<usize> {
///     Ok(ContractCallGraph::creation(ast, contract)?.callables().count())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `solscope` Error type
///
/// The error type of every fallible operation in this crate.
pub use error::Error;

/// Call graph of a single contract, see [`analysis::callgraph`].
pub use analysis::callgraph::ContractCallGraph;

/// Options for call graph construction
pub use analysis::callgraph::CallGraphConfig;

/// Node of a call graph
pub use analysis::callgraph::Node;

/// Call graphs of all deployable contracts of a program
pub use analysis::callgraph::ProgramCallGraphs;
