//! Call target resolution over a contract's linearized inheritance hierarchy.
//!
//! This module provides resolution of call targets for the call graph, including:
//! - Virtual dispatch to the most-derived override
//! - `super` lookups relative to a base in the linearization
//! - The external interface of a contract (the functions the outside world can call)
//! - Constructor, fallback and receive lookup
//!
//! Unlike class hierarchy analysis over an open type system, the set of contracts
//! a call can dispatch into is closed: a contract is compiled together with all of
//! its bases, so every virtual reference resolves to exactly one implementation.

use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Ast, AstId, Callable, ContractDefinition, FunctionDefinition, FunctionKind},
    Result,
};

/// Resolves call targets in the context of one contract.
///
/// The resolver precomputes the virtual dispatch table of the contract from its
/// linearization: for every callable of every base, the implementation that a
/// virtual reference to it ends up executing.
#[derive(Debug)]
pub struct CallResolver<'a> {
    /// The syntax tree.
    ast: &'a Ast,
    /// All bases, most derived first, starting with the contract itself.
    linearization: Vec<&'a ContractDefinition>,
    /// Map from callable to the implementation virtual references to it dispatch to.
    virtual_dispatch_table: HashMap<AstId, AstId>,
    /// Map from callable to every declaration it transitively overrides, itself included.
    overridden: HashMap<AstId, HashSet<AstId>>,
    /// Functions whose external interface entry is taken over by a public state variable.
    getter_overrides: HashSet<AstId>,
}

impl<'a> CallResolver<'a> {
    /// Builds a call resolver for `contract`.
    ///
    /// # Arguments
    ///
    /// * `ast` - The syntax tree the contract lives in
    /// * `contract` - The contract whose calls are resolved
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DeclarationNotFound`] or
    /// [`crate::Error::UnexpectedDeclaration`] if a linearized base, a member or an
    /// overridden declaration does not resolve to the expected kind.
    pub fn new(ast: &'a Ast, contract: &'a ContractDefinition) -> Result<Self> {
        let mut linearization = Vec::with_capacity(contract.linearized_base_contracts.len());
        for &base in &contract.linearized_base_contracts {
            linearization.push(ast.require_contract(base)?);
        }
        if linearization.is_empty() {
            linearization.push(contract);
        }

        let mut resolver = Self {
            ast,
            linearization,
            virtual_dispatch_table: HashMap::new(),
            overridden: HashMap::new(),
            getter_overrides: HashSet::new(),
        };

        resolver.build_virtual_dispatch_table()?;
        resolver.build_getter_overrides()?;

        Ok(resolver)
    }

    /// Builds the virtual dispatch table.
    ///
    /// Walking the linearization from the most derived contract, the first
    /// callable that (transitively) overrides a declaration is its implementation.
    fn build_virtual_dispatch_table(&mut self) -> Result<()> {
        for index in 0..self.linearization.len() {
            let base = self.linearization[index];
            for &id in base.functions.iter().chain(&base.modifiers) {
                let closure = self.override_closure(id)?;
                for &overridden in &closure {
                    self.virtual_dispatch_table.entry(overridden).or_insert(id);
                }
                self.overridden.insert(id, closure);
            }
        }
        Ok(())
    }

    /// Collects the functions overridden by public state variable getters.
    fn build_getter_overrides(&mut self) -> Result<()> {
        for index in 0..self.linearization.len() {
            let base = self.linearization[index];
            for &id in &base.state_variables {
                let variable = self.ast.require_variable(id)?;
                if !variable.visibility.is_externally_visible() {
                    continue;
                }
                for &function in &variable.overrides {
                    let closure = self.override_closure(function)?;
                    self.getter_overrides.extend(closure);
                }
            }
        }
        Ok(())
    }

    /// Returns `id` and every declaration it transitively overrides.
    fn override_closure(&self, id: AstId) -> Result<HashSet<AstId>> {
        let mut closure = HashSet::new();
        let mut worklist = vec![id];

        while let Some(current) = worklist.pop() {
            if !closure.insert(current) {
                continue;
            }
            let callable = self.ast.require_callable(current)?;
            worklist.extend_from_slice(callable.overrides());
        }

        Ok(closure)
    }

    /// Resolves the target of a virtual reference.
    ///
    /// # Arguments
    ///
    /// * `id` - The declaration the reference names
    ///
    /// # Returns
    ///
    /// The most-derived implementation of `id` in the contract. Declarations that
    /// are not part of the hierarchy (free functions, library functions) resolve to
    /// themselves.
    #[must_use]
    pub fn resolve_virtual(&self, id: AstId) -> AstId {
        self.virtual_dispatch_table.get(&id).copied().unwrap_or(id)
    }

    /// Resolves the target of `super.f` written inside `scope`.
    ///
    /// # Arguments
    ///
    /// * `id` - The declaration `f` resolved to in the bases of `scope`
    /// * `scope` - The contract containing the `super` reference
    ///
    /// # Returns
    ///
    /// The first callable after `scope` in the linearization that is `id` or
    /// overrides it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InconsistentTree`] if `scope` is not a base of the
    /// contract or no base after it implements `id`.
    pub fn resolve_super(&self, id: AstId, scope: AstId) -> Result<AstId> {
        let Some(position) = self.linearization.iter().position(|base| base.id == scope) else {
            return Err(inconsistent_tree!(
                "super reference in contract {} which is not a base of {}",
                scope,
                self.contract().name
            ));
        };

        for base in &self.linearization[position + 1..] {
            for &candidate in base.functions.iter().chain(&base.modifiers) {
                if self
                    .overridden
                    .get(&candidate)
                    .is_some_and(|closure| closure.contains(&id))
                {
                    return Ok(candidate);
                }
            }
        }

        Err(inconsistent_tree!(
            "no implementation of {} after {} in the linearization of {}",
            id,
            scope,
            self.contract().name
        ))
    }

    /// Returns `true` if virtual references to `id` execute a different declaration.
    #[must_use]
    pub fn is_overridden(&self, id: AstId) -> bool {
        self.resolve_virtual(id) != id
    }

    /// Returns the contract the resolver was built for.
    #[must_use]
    pub fn contract(&self) -> &'a ContractDefinition {
        self.linearization[0]
    }

    /// Returns the linearized bases, most derived first.
    #[must_use]
    pub fn linearization(&self) -> &[&'a ContractDefinition] {
        &self.linearization
    }

    /// Returns the functions the outside world can call.
    ///
    /// These are the public and external functions of every base that are neither
    /// overridden by a more derived function nor replaced by a public state
    /// variable's getter, in linearization order.
    #[must_use]
    pub fn interface_functions(&self) -> Vec<&'a FunctionDefinition> {
        let mut functions = Vec::new();
        for base in &self.linearization {
            for &id in &base.functions {
                let Some(function) = self.ast.function(id) else {
                    continue;
                };
                if function.kind == FunctionKind::Function
                    && function.visibility.is_externally_visible()
                    && !self.is_overridden(id)
                    && !self.getter_overrides.contains(&id)
                {
                    functions.push(function);
                }
            }
        }
        functions
    }

    fn most_derived(&self, kind: FunctionKind) -> Option<&'a FunctionDefinition> {
        self.linearization.iter().find_map(|base| {
            base.functions
                .iter()
                .filter_map(|&id| self.ast.function(id))
                .find(|function| function.kind == kind)
        })
    }

    /// Returns the most derived fallback function.
    #[must_use]
    pub fn fallback(&self) -> Option<&'a FunctionDefinition> {
        self.most_derived(FunctionKind::Fallback)
    }

    /// Returns the most derived receive function.
    #[must_use]
    pub fn receive(&self) -> Option<&'a FunctionDefinition> {
        self.most_derived(FunctionKind::Receive)
    }

    /// Returns the constructor declared in `base`, if any.
    #[must_use]
    pub fn constructor(&self, base: &ContractDefinition) -> Option<&'a FunctionDefinition> {
        base.functions
            .iter()
            .filter_map(|&id| self.ast.function(id))
            .find(|function| function.kind == FunctionKind::Constructor)
    }

    /// Returns statistics about the resolver state.
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        let virtual_callables = self
            .overridden
            .keys()
            .filter(|&&id| match self.ast.callable(id) {
                Some(Callable::Function(function)) => function.is_virtual(),
                Some(Callable::Modifier(modifier)) => modifier.is_virtual(),
                None => false,
            })
            .count();

        let overridden_callables = self
            .virtual_dispatch_table
            .iter()
            .filter(|(declared, target)| declared != target)
            .count();

        ResolverStats {
            bases: self.linearization.len(),
            total_callables: self.overridden.len(),
            virtual_callables,
            overridden_callables,
            getter_overrides: self.getter_overrides.len(),
        }
    }
}

/// Statistics about the call resolver state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Number of contracts in the linearization.
    pub bases: usize,
    /// Total number of functions and modifiers in the hierarchy.
    pub total_callables: usize,
    /// Number of callables marked `virtual`.
    pub virtual_callables: usize,
    /// Number of declarations whose virtual references dispatch elsewhere.
    pub overridden_callables: usize,
    /// Number of functions replaced by state variable getters.
    pub getter_overrides: usize,
}
