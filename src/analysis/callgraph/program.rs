//! Call graphs for every deployable contract of a program.

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;

use crate::{
    analysis::callgraph::{CallGraphConfig, ContractCallGraph},
    ast::{Ast, AstId, ContractDefinition},
    Result,
};

/// The creation and deployment graphs of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractGraphs<'a> {
    /// What runs while the contract is deployed
    pub creation: ContractCallGraph<'a>,
    /// What the deployed code can run
    pub deployment: ContractCallGraph<'a>,
}

/// Call graphs of all contracts that produce bytecode, keyed by contract id.
///
/// Abstract contracts and interfaces are skipped. Each contract is independent of
/// the others, so with [`CallGraphConfig::parallel`] set the contracts are
/// processed concurrently; the result does not depend on the setting.
///
/// # Example
///
/// ```rust
/// use solscope::{ast::AstBuilder, CallGraphConfig, ProgramCallGraphs};
///
/// let mut builder = AstBuilder::new();
/// let token = builder.contract("Token").id();
/// let _itoken = builder.contract("IToken").interface().id();
/// let ast = builder.build()?;
///
/// let graphs = ProgramCallGraphs::build(&ast, &CallGraphConfig::default())?;
/// assert_eq!(graphs.len(), 1);
/// assert!(graphs.get(token).is_some());
/// # Ok::<(), solscope::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramCallGraphs<'a> {
    graphs: BTreeMap<AstId, ContractGraphs<'a>>,
}

impl<'a> ProgramCallGraphs<'a> {
    /// Builds both graphs for every deployable contract in `ast`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first contract (in id order) whose graphs
    /// could not be built, whether or not the contracts were built in parallel.
    pub fn build(ast: &'a Ast, config: &CallGraphConfig) -> Result<Self> {
        let contracts: Vec<&'a ContractDefinition> = ast
            .contracts()
            .filter(|contract| contract.can_be_deployed())
            .collect();
        debug!(
            "building call graphs of {} contracts ({})",
            contracts.len(),
            if config.parallel { "parallel" } else { "sequential" }
        );

        let build = |contract: &&'a ContractDefinition| -> Result<(AstId, ContractGraphs<'a>)> {
            let creation = ContractCallGraph::creation(ast, contract.id)?;
            let deployment =
                ContractCallGraph::deployment_with_config(ast, contract.id, &creation, config)?;
            Ok((
                contract.id,
                ContractGraphs {
                    creation,
                    deployment,
                },
            ))
        };

        let graphs = if config.parallel {
            // Collected in contract order first, so the reported error does not
            // depend on scheduling.
            contracts
                .par_iter()
                .map(build)
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<BTreeMap<_, _>>>()?
        } else {
            contracts.iter().map(build).collect::<Result<BTreeMap<_, _>>>()?
        };

        Ok(Self { graphs })
    }

    /// Returns the graphs of a contract
    #[must_use]
    pub fn get(&self, contract: AstId) -> Option<&ContractGraphs<'a>> {
        self.graphs.get(&contract)
    }

    /// Returns all graphs, in contract id order
    pub fn iter(&self) -> impl Iterator<Item = (AstId, &ContractGraphs<'a>)> {
        self.graphs.iter().map(|(&id, graphs)| (id, graphs))
    }

    /// Returns the number of contracts with graphs
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns `true` if no contract produced graphs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
