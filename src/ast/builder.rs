//! Programmatic construction of resolved syntax trees.
//!
//! [`AstBuilder`] hands out ids in declaration order and records the membership of
//! every declaration in its contract. The per-declaration builders borrow the
//! [`AstBuilder`] mutably and finish with `id()`. Bodies frequently reference
//! declarations created later, so they can also be attached afterwards with
//! [`AstBuilder::set_body`] and [`AstBuilder::set_value`].
//!
//! [`AstBuilder::build`] computes the C3 linearization of every contract and
//! returns the immutable [`Ast`].
//!
//! # Example
//!
//! ```rust
//! use solscope::ast::{AstBuilder, Block, Expression, Statement};
//!
//! let mut builder = AstBuilder::new();
//! let base = builder.contract("Base").id();
//! let token = builder.contract("Token").inherits(base, vec![]).id();
//! let mint = builder.function(token, "mint").internal().id();
//! let _deposit = builder
//!     .function(token, "deposit")
//!     .body(Block::new(vec![Statement::expression(Expression::internal_call(
//!         "mint",
//!         mint,
//!         vec![],
//!     ))]))
//!     .id();
//!
//! let ast = builder.build()?;
//! assert_eq!(
//!     ast.contract(token).map(|c| c.linearized_base_contracts.clone()),
//!     Some(vec![token, base])
//! );
//! # Ok::<(), solscope::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    ast::{
        Ast, AstId, Block, ContractDefinition, ContractKind, Declaration, DeclarationFlags,
        EventDefinition, Expression, FunctionDefinition, FunctionKind, InheritanceSpecifier,
        ModifierDefinition, ModifierInvocation, Parameter, Statement, VariableDeclaration,
        Visibility, VirtualLookup,
    },
    Error, Result,
};

/// Incremental builder for an [`Ast`].
#[derive(Debug, Default)]
pub struct AstBuilder {
    declarations: Vec<Declaration>,
    contracts: Vec<AstId>,
    error: Option<Error>,
}

impl AstBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> AstId {
        AstId(self.declarations.len() as i64)
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn contract_mut(&mut self, id: AstId) -> Option<&mut ContractDefinition> {
        match self.declarations.get_mut(id.index()?) {
            Some(Declaration::Contract(contract)) => Some(contract),
            _ => None,
        }
    }

    /// Registers `member` with its contract, recording an error if `contract` is not one
    fn attach(&mut self, contract: AstId, member: impl FnOnce(&mut ContractDefinition)) {
        match self.contract_mut(contract) {
            Some(definition) => member(definition),
            None => self.fail(Error::UnexpectedDeclaration {
                id: contract,
                expected: "contract",
            }),
        }
    }

    fn push(&mut self, declaration: Declaration) -> usize {
        self.declarations.push(declaration);
        self.declarations.len() - 1
    }

    /// Starts a new contract
    pub fn contract(&mut self, name: &str) -> ContractBuilder<'_> {
        let id = self.next_id();
        self.contracts.push(id);
        let index = self.push(Declaration::Contract(ContractDefinition {
            id,
            name: name.to_string(),
            kind: ContractKind::Contract,
            is_abstract: false,
            base_contracts: Vec::new(),
            linearized_base_contracts: Vec::new(),
            functions: Vec::new(),
            modifiers: Vec::new(),
            events: Vec::new(),
            state_variables: Vec::new(),
        }));
        ContractBuilder { ast: self, index }
    }

    fn start_function(
        &mut self,
        scope: Option<AstId>,
        name: &str,
        kind: FunctionKind,
        visibility: Visibility,
    ) -> FunctionBuilder<'_> {
        let id = self.next_id();
        if let Some(contract) = scope {
            self.attach(contract, |c| c.functions.push(id));
        }
        let index = self.push(Declaration::Function(FunctionDefinition {
            id,
            name: name.to_string(),
            scope,
            kind,
            visibility,
            flags: DeclarationFlags::empty(),
            overrides: Vec::new(),
            parameters: Vec::new(),
            modifiers: Vec::new(),
            body: Some(Block::default()),
        }));
        FunctionBuilder { ast: self, index }
    }

    /// Starts a public function in `contract`
    pub fn function(&mut self, contract: AstId, name: &str) -> FunctionBuilder<'_> {
        self.start_function(Some(contract), name, FunctionKind::Function, Visibility::Public)
    }

    /// Starts the constructor of `contract`
    pub fn constructor(&mut self, contract: AstId) -> FunctionBuilder<'_> {
        self.start_function(Some(contract), "", FunctionKind::Constructor, Visibility::Public)
    }

    /// Starts the fallback function of `contract`
    pub fn fallback(&mut self, contract: AstId) -> FunctionBuilder<'_> {
        self.start_function(Some(contract), "", FunctionKind::Fallback, Visibility::External)
    }

    /// Starts the receive function of `contract`
    pub fn receive(&mut self, contract: AstId) -> FunctionBuilder<'_> {
        self.start_function(Some(contract), "", FunctionKind::Receive, Visibility::External)
    }

    /// Starts a file-level function
    pub fn free_function(&mut self, name: &str) -> FunctionBuilder<'_> {
        self.start_function(None, name, FunctionKind::Function, Visibility::Internal)
    }

    /// Starts a modifier in `contract`, with a body of a single `_;`
    pub fn modifier(&mut self, contract: AstId, name: &str) -> ModifierBuilder<'_> {
        let id = self.next_id();
        self.attach(contract, |c| c.modifiers.push(id));
        let index = self.push(Declaration::Modifier(ModifierDefinition {
            id,
            name: name.to_string(),
            scope: contract,
            flags: DeclarationFlags::empty(),
            overrides: Vec::new(),
            parameters: Vec::new(),
            body: Some(Block::new(vec![Statement::Placeholder])),
        }));
        ModifierBuilder { ast: self, index }
    }

    /// Declares an event in `contract`
    pub fn event(&mut self, contract: AstId, name: &str, parameters: &[(&str, &str)]) -> AstId {
        let id = self.next_id();
        self.attach(contract, |c| c.events.push(id));
        self.push_event(id, Some(contract), name, parameters)
    }

    /// Declares a file-level event
    pub fn free_event(&mut self, name: &str, parameters: &[(&str, &str)]) -> AstId {
        let id = self.next_id();
        self.push_event(id, None, name, parameters)
    }

    fn push_event(
        &mut self,
        id: AstId,
        scope: Option<AstId>,
        name: &str,
        parameters: &[(&str, &str)],
    ) -> AstId {
        self.push(Declaration::Event(EventDefinition {
            id,
            name: name.to_string(),
            scope,
            parameters: parameters
                .iter()
                .map(|(name, type_name)| Parameter::new(name, type_name))
                .collect(),
        }));
        id
    }

    /// Starts an internal state variable in `contract`
    pub fn state_variable(
        &mut self,
        contract: AstId,
        name: &str,
        type_name: &str,
    ) -> VariableBuilder<'_> {
        let id = self.next_id();
        self.attach(contract, |c| c.state_variables.push(id));
        self.start_variable(id, Some(contract), name, type_name)
    }

    /// Starts a file-level constant
    pub fn free_constant(&mut self, name: &str, type_name: &str) -> VariableBuilder<'_> {
        let id = self.next_id();
        self.start_variable(id, None, name, type_name).constant()
    }

    fn start_variable(
        &mut self,
        id: AstId,
        scope: Option<AstId>,
        name: &str,
        type_name: &str,
    ) -> VariableBuilder<'_> {
        let index = self.push(Declaration::Variable(VariableDeclaration {
            id,
            name: name.to_string(),
            scope,
            type_name: type_name.to_string(),
            visibility: Visibility::Internal,
            flags: DeclarationFlags::empty(),
            overrides: Vec::new(),
            value: None,
        }));
        VariableBuilder { ast: self, index }
    }

    /// Replaces the body of an existing function or modifier
    pub fn set_body(&mut self, id: AstId, body: Block) {
        match id.index().and_then(|index| self.declarations.get_mut(index)) {
            Some(Declaration::Function(function)) => function.body = Some(body),
            Some(Declaration::Modifier(modifier)) => modifier.body = Some(body),
            Some(_) => self.fail(Error::UnexpectedDeclaration {
                id,
                expected: "callable",
            }),
            None => self.fail(Error::DeclarationNotFound(id)),
        }
    }

    /// Replaces the initializer of an existing variable
    pub fn set_value(&mut self, id: AstId, value: Expression) {
        match id.index().and_then(|index| self.declarations.get_mut(index)) {
            Some(Declaration::Variable(variable)) => variable.value = Some(value),
            Some(_) => self.fail(Error::UnexpectedDeclaration {
                id,
                expected: "variable",
            }),
            None => self.fail(Error::DeclarationNotFound(id)),
        }
    }

    /// Finishes the tree, linearizing every contract's inheritance hierarchy
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building (a member attached to
    /// something that is not a contract, a body set on a non-callable), or
    /// [`Error::Linearization`] if an inheritance hierarchy is cyclic or has no
    /// consistent C3 order.
    pub fn build(mut self) -> Result<Ast> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let mut bases: HashMap<AstId, Vec<AstId>> = HashMap::new();
        for &contract in &self.contracts {
            if let Some(Declaration::Contract(definition)) =
                contract.index().and_then(|index| self.declarations.get(index))
            {
                bases.insert(
                    contract,
                    definition.base_contracts.iter().map(|s| s.base).collect(),
                );
            }
        }

        let mut linearizer = Linearizer {
            bases: &bases,
            done: HashMap::new(),
            in_progress: Vec::new(),
        };
        for &contract in &self.contracts {
            linearizer.linearize(contract)?;
        }
        let mut linearizations = linearizer.done;

        for contract in self.contracts.clone() {
            let order = linearizations.remove(&contract).unwrap_or_default();
            if let Some(definition) = self.contract_mut(contract) {
                definition.linearized_base_contracts = order;
            }
        }

        Ok(Ast::from_parts(self.declarations, self.contracts))
    }
}

struct Linearizer<'a> {
    bases: &'a HashMap<AstId, Vec<AstId>>,
    done: HashMap<AstId, Vec<AstId>>,
    in_progress: Vec<AstId>,
}

impl Linearizer<'_> {
    /// C3 linearization, most derived first.
    ///
    /// Bases are written most base-like first, so the merge runs over the direct
    /// bases in reverse.
    fn linearize(&mut self, contract: AstId) -> Result<Vec<AstId>> {
        if let Some(order) = self.done.get(&contract) {
            return Ok(order.clone());
        }
        if self.in_progress.contains(&contract) {
            return Err(Error::Linearization(format!(
                "cyclic inheritance through contract {contract}"
            )));
        }
        let Some(direct) = self.bases.get(&contract) else {
            return Err(Error::UnexpectedDeclaration {
                id: contract,
                expected: "contract",
            });
        };

        self.in_progress.push(contract);
        let mut sequences = Vec::with_capacity(direct.len() + 1);
        for &base in direct.iter().rev() {
            sequences.push(self.linearize(base)?);
        }
        sequences.push(direct.iter().rev().copied().collect());
        self.in_progress.pop();

        let mut order = vec![contract];
        order.extend(merge(sequences).ok_or_else(|| {
            Error::Linearization(format!(
                "no consistent base order for contract {contract}"
            ))
        })?);

        self.done.insert(contract, order.clone());
        Ok(order)
    }
}

fn merge(mut sequences: Vec<Vec<AstId>>) -> Option<Vec<AstId>> {
    let mut result = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let candidate = sequences.iter().map(|sequence| sequence[0]).find(|&head| {
            sequences
                .iter()
                .all(|sequence| !sequence[1..].contains(&head))
        })?;

        result.push(candidate);
        for sequence in &mut sequences {
            if sequence[0] == candidate {
                sequence.remove(0);
            }
        }
    }
}

/// Builder for a contract, returned by [`AstBuilder::contract`].
pub struct ContractBuilder<'a> {
    ast: &'a mut AstBuilder,
    index: usize,
}

impl ContractBuilder<'_> {
    fn update(self, apply: impl FnOnce(&mut ContractDefinition)) -> Self {
        if let Some(Declaration::Contract(contract)) = self.ast.declarations.get_mut(self.index) {
            apply(contract);
        }
        self
    }

    /// Sets the contract kind
    #[must_use]
    pub fn kind(self, kind: ContractKind) -> Self {
        self.update(|c| c.kind = kind)
    }

    /// Marks the contract `abstract`
    #[must_use]
    pub fn abstract_(self) -> Self {
        self.update(|c| c.is_abstract = true)
    }

    /// Makes the contract an interface
    #[must_use]
    pub fn interface(self) -> Self {
        self.kind(ContractKind::Interface)
    }

    /// Makes the contract a library
    #[must_use]
    pub fn library(self) -> Self {
        self.kind(ContractKind::Library)
    }

    /// Appends a direct base, with base constructor arguments
    #[must_use]
    pub fn inherits(self, base: AstId, arguments: Vec<Expression>) -> Self {
        self.update(|c| c.base_contracts.push(InheritanceSpecifier { base, arguments }))
    }

    /// Finishes the contract
    pub fn id(self) -> AstId {
        AstId(self.index as i64)
    }
}

/// Builder for a function, returned by [`AstBuilder::function`] and friends.
///
/// Functions start out implemented with an empty body.
pub struct FunctionBuilder<'a> {
    ast: &'a mut AstBuilder,
    index: usize,
}

impl FunctionBuilder<'_> {
    fn update(self, apply: impl FnOnce(&mut FunctionDefinition)) -> Self {
        if let Some(Declaration::Function(function)) = self.ast.declarations.get_mut(self.index) {
            apply(function);
        }
        self
    }

    fn declaration_name(&self, id: AstId) -> String {
        id.index()
            .and_then(|index| self.ast.declarations.get(index))
            .map(|declaration| declaration.name().to_string())
            .unwrap_or_default()
    }

    /// Sets the visibility
    #[must_use]
    pub fn visibility(self, visibility: Visibility) -> Self {
        self.update(|f| f.visibility = visibility)
    }

    /// Makes the function `external`
    #[must_use]
    pub fn external(self) -> Self {
        self.visibility(Visibility::External)
    }

    /// Makes the function `internal`
    #[must_use]
    pub fn internal(self) -> Self {
        self.visibility(Visibility::Internal)
    }

    /// Makes the function `private`
    #[must_use]
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Marks the function `virtual`
    #[must_use]
    pub fn virtual_(self) -> Self {
        self.update(|f| f.flags |= DeclarationFlags::VIRTUAL)
    }

    /// Adds a directly overridden base function
    #[must_use]
    pub fn overrides(self, base: AstId) -> Self {
        self.update(|f| f.overrides.push(base))
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(self, name: &str, type_name: &str) -> Self {
        self.update(|f| f.parameters.push(Parameter::new(name, type_name)))
    }

    /// Attaches a modifier invocation, looked up virtually
    #[must_use]
    pub fn modifier(self, modifier: AstId, arguments: Vec<Expression>) -> Self {
        let name = self.declaration_name(modifier);
        self.invocation(ModifierInvocation {
            name,
            referenced_declaration: Some(modifier),
            required_lookup: VirtualLookup::Virtual,
            arguments,
        })
    }

    /// Attaches a base constructor call `Base(arguments)` to a constructor
    #[must_use]
    pub fn base_constructor(self, base: AstId, arguments: Vec<Expression>) -> Self {
        let name = self.declaration_name(base);
        self.invocation(ModifierInvocation {
            name,
            referenced_declaration: Some(base),
            required_lookup: VirtualLookup::Static,
            arguments,
        })
    }

    /// Attaches an arbitrary modifier invocation
    #[must_use]
    pub fn invocation(self, invocation: ModifierInvocation) -> Self {
        self.update(|f| f.modifiers.push(invocation))
    }

    /// Sets the body
    #[must_use]
    pub fn body(self, body: Block) -> Self {
        self.update(|f| f.body = Some(body))
    }

    /// Removes the body, leaving the function unimplemented
    #[must_use]
    pub fn unimplemented(self) -> Self {
        self.update(|f| f.body = None)
    }

    /// Finishes the function
    pub fn id(self) -> AstId {
        AstId(self.index as i64)
    }
}

/// Builder for a modifier, returned by [`AstBuilder::modifier`].
pub struct ModifierBuilder<'a> {
    ast: &'a mut AstBuilder,
    index: usize,
}

impl ModifierBuilder<'_> {
    fn update(self, apply: impl FnOnce(&mut ModifierDefinition)) -> Self {
        if let Some(Declaration::Modifier(modifier)) = self.ast.declarations.get_mut(self.index) {
            apply(modifier);
        }
        self
    }

    /// Marks the modifier `virtual`
    #[must_use]
    pub fn virtual_(self) -> Self {
        self.update(|m| m.flags |= DeclarationFlags::VIRTUAL)
    }

    /// Adds a directly overridden base modifier
    #[must_use]
    pub fn overrides(self, base: AstId) -> Self {
        self.update(|m| m.overrides.push(base))
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(self, name: &str, type_name: &str) -> Self {
        self.update(|m| m.parameters.push(Parameter::new(name, type_name)))
    }

    /// Sets the body
    #[must_use]
    pub fn body(self, body: Block) -> Self {
        self.update(|m| m.body = Some(body))
    }

    /// Removes the body, leaving the modifier unimplemented
    #[must_use]
    pub fn unimplemented(self) -> Self {
        self.update(|m| m.body = None)
    }

    /// Finishes the modifier
    pub fn id(self) -> AstId {
        AstId(self.index as i64)
    }
}

/// Builder for a state variable or constant.
pub struct VariableBuilder<'a> {
    ast: &'a mut AstBuilder,
    index: usize,
}

impl VariableBuilder<'_> {
    fn update(self, apply: impl FnOnce(&mut VariableDeclaration)) -> Self {
        if let Some(Declaration::Variable(variable)) = self.ast.declarations.get_mut(self.index) {
            apply(variable);
        }
        self
    }

    /// Makes the variable `public`, synthesizing a getter
    #[must_use]
    pub fn public(self) -> Self {
        self.update(|v| v.visibility = Visibility::Public)
    }

    /// Marks the variable `constant`
    #[must_use]
    pub fn constant(self) -> Self {
        self.update(|v| v.flags |= DeclarationFlags::CONSTANT)
    }

    /// Marks the variable `immutable`
    #[must_use]
    pub fn immutable(self) -> Self {
        self.update(|v| v.flags |= DeclarationFlags::IMMUTABLE)
    }

    /// Declares that the getter overrides an external function
    #[must_use]
    pub fn overrides(self, function: AstId) -> Self {
        self.update(|v| v.overrides.push(function))
    }

    /// Sets the initializer
    #[must_use]
    pub fn value(self, value: Expression) -> Self {
        self.update(|v| v.value = Some(value))
    }

    /// Finishes the variable
    pub fn id(self) -> AstId {
        AstId(self.index as i64)
    }
}
