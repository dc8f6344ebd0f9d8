//! Call graph construction.
//!
//! The builder walks callables in the order they are discovered, starting from
//! [`Node::Entry`]. While a callable's body is walked it is the *current* node:
//! direct calls add edges from it and calls through function pointers add an
//! edge from it to [`Node::InternalDispatch`]. Functions taken as values are
//! held back until some walked callable calls through a pointer; from then on
//! each of them is an `InternalDispatch` successor. Every newly referenced
//! callable is queued and walked exactly once, so only callables reachable from
//! [`Node::Entry`] ever appear in the graph.

use std::collections::{BTreeSet, VecDeque};

use log::{debug, trace};

use crate::{
    analysis::callgraph::{
        CallGraphConfig, CallResolver, CallSite, CallTarget, CallType, ContractCallGraph, Node,
    },
    ast::{
        walk_expression, walk_function, walk_modifier, Ast, AstId, AstVisitor, Callable,
        ContractDefinition, Declaration, Expression, ExpressionKind, FunctionCall, Identifier,
        MemberAccess, ModifierInvocation, NewExpression, VirtualLookup,
    },
    Error, Result,
};

impl<'a> ContractCallGraph<'a> {
    /// Builds the creation graph of a contract.
    ///
    /// The creation graph describes what runs while the contract is deployed:
    /// the initializers of all non-constant state variables, the constructors of
    /// the contract and all of its bases, the arguments passed to base
    /// constructors, and everything reachable from those. `Entry` stands for the
    /// deployment transaction.
    ///
    /// # Arguments
    ///
    /// * `ast` - The syntax tree
    /// * `contract` - The contract to build the graph for
    ///
    /// # Errors
    ///
    /// Returns an error if `contract` is not a contract or the tree violates an
    /// invariant of the resolution phases (see [`Error`]).
    pub fn creation(ast: &'a Ast, contract: AstId) -> Result<Self> {
        let contract = ast.require_contract(contract)?;
        CallGraphBuilder::new(ast, contract)?.build_creation()
    }

    /// Builds the deployment graph of a contract with the default configuration.
    ///
    /// The deployment graph describes what the deployed code can run: `Entry`
    /// stands for an incoming message call and reaches every externally callable
    /// function plus the fallback and receive functions.
    ///
    /// # Arguments
    ///
    /// * `ast` - The syntax tree
    /// * `contract` - The contract to build the graph for
    /// * `creation` - The creation graph of the same contract
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContractMismatch`] if `creation` belongs to another
    /// contract, or any error [`ContractCallGraph::creation`] can return.
    pub fn deployment(
        ast: &'a Ast,
        contract: AstId,
        creation: &ContractCallGraph<'_>,
    ) -> Result<Self> {
        Self::deployment_with_config(ast, contract, creation, &CallGraphConfig::default())
    }

    /// Builds the deployment graph of a contract.
    ///
    /// With [`CallGraphConfig::carry_creation_dispatch`] set, and only if code
    /// reachable from `Entry` can call through an internal function pointer, the
    /// functions whose pointers were taken during construction (see
    /// [`ContractCallGraph::pointer_targets`]) become dispatch targets of the
    /// deployment graph as well: a pointer stored in state by the constructor
    /// can still be called afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`ContractCallGraph::deployment`].
    pub fn deployment_with_config(
        ast: &'a Ast,
        contract: AstId,
        creation: &ContractCallGraph<'_>,
        config: &CallGraphConfig,
    ) -> Result<Self> {
        let contract = ast.require_contract(contract)?;
        if creation.contract().id != contract.id {
            return Err(Error::ContractMismatch {
                expected: contract.id,
                found: creation.contract().id,
            });
        }
        CallGraphBuilder::new(ast, contract)?.build_deployment(creation, config)
    }
}

/// Worklist state of a single graph build.
struct CallGraphBuilder<'a> {
    ast: &'a Ast,
    resolver: CallResolver<'a>,
    graph: ContractCallGraph<'a>,
    current: Node,
    queue: VecDeque<AstId>,
    /// Set once a walked node calls through a function pointer.
    dispatch_reached: bool,
}

impl<'a> CallGraphBuilder<'a> {
    fn new(ast: &'a Ast, contract: &'a ContractDefinition) -> Result<Self> {
        Ok(Self {
            ast,
            resolver: CallResolver::new(ast, contract)?,
            graph: ContractCallGraph::new(contract),
            current: Node::Entry,
            queue: VecDeque::new(),
            dispatch_reached: false,
        })
    }

    fn build_creation(mut self) -> Result<ContractCallGraph<'a>> {
        debug!("building creation call graph of {}", self.graph.contract.name);

        let ast = self.ast;
        // Most basic contract first: that is the order construction runs in.
        let linearization = self.resolver.linearization().to_vec();
        for base in linearization.into_iter().rev() {
            self.current = Node::Entry;
            for &id in &base.state_variables {
                let variable = ast.require_variable(id)?;
                if variable.is_constant() {
                    continue;
                }
                if let Some(value) = &variable.value {
                    walk_expression(&mut self, value)?;
                }
            }

            if let Some(constructor) = self.resolver.constructor(base) {
                self.record(CallSite::new(
                    Node::Entry,
                    CallType::Direct,
                    CallTarget::exact(constructor.id),
                ));
                self.current = Node::Callable(constructor.id);
            }

            for specifier in &base.base_contracts {
                for argument in &specifier.arguments {
                    walk_expression(&mut self, argument)?;
                }
            }
        }
        self.current = Node::Entry;

        self.process_queue()?;
        Ok(self.finish("creation"))
    }

    fn build_deployment(
        mut self,
        creation: &ContractCallGraph<'_>,
        config: &CallGraphConfig,
    ) -> Result<ContractCallGraph<'a>> {
        debug!("building deployment call graph of {}", self.graph.contract.name);

        let entry_points = self
            .resolver
            .interface_functions()
            .into_iter()
            .chain(self.resolver.fallback())
            .chain(self.resolver.receive())
            .map(|function| function.id)
            .collect::<Vec<_>>();
        for id in entry_points {
            self.record(CallSite::new(Node::Entry, CallType::Direct, CallTarget::exact(id)));
        }

        self.process_queue()?;

        if config.carry_creation_dispatch && self.graph.is_dispatch_reachable() {
            let targets = creation.pointer_targets();
            trace!(
                "carrying {} creation pointer targets into {}",
                targets.len(),
                self.graph.contract.name
            );

            for &id in targets {
                self.record(CallSite::new(
                    Node::InternalDispatch,
                    CallType::Reference,
                    CallTarget::exact(id),
                ));
            }

            self.process_queue()?;
        }

        Ok(self.finish("deployment"))
    }

    fn finish(self, variant: &str) -> ContractCallGraph<'a> {
        debug!(
            "{} call graph of {}: {} callables, {} edges, {} events, {} created contracts",
            variant,
            self.graph.contract.name,
            self.graph.edges.keys().filter(|node| !node.is_special()).count(),
            self.graph.edge_count(),
            self.graph.emitted_events.len(),
            self.graph.created_contracts.len()
        );
        self.graph
    }

    /// Walks queued callables until the queue is empty.
    fn process_queue(&mut self) -> Result<()> {
        debug_assert!(self.current == Node::Entry);

        let ast = self.ast;
        while let Some(id) = self.queue.pop_front() {
            self.current = Node::Callable(id);
            match ast.require_callable(id)? {
                Callable::Function(function) => walk_function(self, function)?,
                Callable::Modifier(modifier) => walk_modifier(self, modifier)?,
            }
        }

        self.current = Node::Entry;
        Ok(())
    }

    fn enqueue(&mut self, id: AstId) {
        let node = Node::Callable(id);
        if !self.graph.edges.contains_key(&node) {
            trace!("queueing {}", node.display(self.ast));
            self.queue.push_back(id);
            self.graph.edges.insert(node, BTreeSet::new());
        }
    }

    fn add_edge(&mut self, from: Node, to: Node) {
        debug_assert!(from.is_special() || self.graph.edges.contains_key(&from));
        self.graph.edges.entry(from).or_default().insert(to);
    }

    /// Adds the edge of a call site and queues its target.
    ///
    /// Pointer references only add their edge once dispatch is reached; the
    /// first indirect call releases every reference taken before it.
    fn record(&mut self, site: CallSite) {
        if site.call_type == CallType::Reference {
            if let Some(id) = site.target.callable() {
                self.graph.pointer_targets.insert(id);
                if self.dispatch_reached {
                    self.dispatch_to(id);
                }
            }
            return;
        }

        if let Some((from, to)) = site.edge() {
            self.add_edge(from, to);
        }
        if let Some(id) = site.target.callable() {
            self.enqueue(id);
        }

        if site.call_type == CallType::Indirect && !self.dispatch_reached {
            self.dispatch_reached = true;
            let pending: Vec<AstId> = self.graph.pointer_targets.iter().copied().collect();
            trace!("dispatch reached, releasing {} pointer targets", pending.len());
            for id in pending {
                self.dispatch_to(id);
            }
        }
    }

    fn dispatch_to(&mut self, id: AstId) {
        self.add_edge(Node::InternalDispatch, Node::Callable(id));
        self.enqueue(id);
    }

    fn reference(&mut self, target: CallTarget, called_directly: bool) {
        self.record(CallSite::new(
            self.current,
            CallType::of_reference(called_directly),
            target,
        ));
    }

    fn resolve(&self, declared: AstId, lookup: VirtualLookup) -> Result<CallTarget> {
        let target = match lookup {
            VirtualLookup::Virtual => self.resolver.resolve_virtual(declared),
            VirtualLookup::Static => declared,
            VirtualLookup::Super { scope } => self.resolver.resolve_super(declared, scope)?,
        };
        Ok(CallTarget::Resolved { declared, target })
    }

    /// Handles an identifier or member access naming `declared`.
    fn declaration_referenced(
        &mut self,
        expression: &Expression,
        declared: AstId,
        lookup: VirtualLookup,
    ) -> Result<()> {
        let ast = self.ast;
        match ast.declaration(declared) {
            None => Err(Error::DeclarationNotFound(declared)),
            Some(Declaration::Variable(variable)) if variable.is_constant() => {
                match &variable.value {
                    Some(value) => walk_expression(self, value),
                    None => Ok(()),
                }
            }
            Some(Declaration::Function(_) | Declaration::Modifier(_))
                if expression.function_type().is_some_and(|kind| kind.is_internal()) =>
            {
                let target = self.resolve(declared, lookup)?;
                self.reference(target, expression.is_called_directly());
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }
}

impl AstVisitor for CallGraphBuilder<'_> {
    fn visit_function_call(&mut self, _expression: &Expression, call: &FunctionCall) -> Result<bool> {
        if CallType::of_call(call)? == Some(CallType::Indirect) {
            self.record(CallSite::new(
                self.current,
                CallType::Indirect,
                CallTarget::InternalDispatch,
            ));
        }
        Ok(true)
    }

    fn visit_identifier(&mut self, expression: &Expression, identifier: &Identifier) -> Result<()> {
        match identifier.referenced_declaration {
            Some(declared) => {
                self.declaration_referenced(expression, declared, identifier.required_lookup)
            }
            None => Ok(()),
        }
    }

    fn end_visit_member_access(&mut self, expression: &Expression, access: &MemberAccess) -> Result<()> {
        match access.referenced_declaration {
            Some(declared) => self.declaration_referenced(expression, declared, access.required_lookup),
            None => Ok(()),
        }
    }

    fn visit_new(&mut self, expression: &NewExpression) -> Result<()> {
        if let Some(contract) = expression.contract {
            self.graph.created_contracts.insert(contract);
        }
        Ok(())
    }

    fn visit_emit(&mut self, event_call: &Expression) -> Result<bool> {
        let ExpressionKind::FunctionCall(call) = &event_call.kind else {
            return Err(inconsistent_tree!("emit statement without an event call"));
        };
        let Some(event) = call.expression.referenced_declaration() else {
            return Err(inconsistent_tree!("emit statement with an unresolved event"));
        };

        match self.ast.declaration(event) {
            Some(Declaration::Event(_)) => {
                self.graph.emitted_events.insert(event);
                Ok(true)
            }
            Some(other) => Err(inconsistent_tree!(
                "emit statement names {} {} instead of an event",
                other.kind_name(),
                event
            )),
            None => Err(Error::DeclarationNotFound(event)),
        }
    }

    fn end_visit_modifier_invocation(&mut self, invocation: &ModifierInvocation) -> Result<()> {
        let Some(declared) = invocation.referenced_declaration else {
            return Err(inconsistent_tree!(
                "modifier invocation {} without a resolved declaration",
                invocation.name
            ));
        };

        match self.ast.declaration(declared) {
            // Base constructor call; its arguments have been walked already.
            Some(Declaration::Contract(_)) => Ok(()),
            Some(Declaration::Modifier(_)) => {
                let Some(function) = self.current.callable() else {
                    return Err(inconsistent_tree!(
                        "modifier invocation {} outside of a function",
                        invocation.name
                    ));
                };

                let target = self.resolve(declared, invocation.required_lookup)?;
                self.record(CallSite::new(self.current, CallType::Modifier, target));

                if let Some(modifier) = target.callable() {
                    if self.ast.require_modifier(modifier)?.contains_placeholder() {
                        self.record(CallSite::new(
                            Node::Callable(modifier),
                            CallType::Placeholder,
                            CallTarget::exact(function),
                        ));
                    }
                }
                Ok(())
            }
            Some(_) => Err(Error::UnexpectedDeclaration {
                id: declared,
                expected: "modifier",
            }),
            None => Err(Error::DeclarationNotFound(declared)),
        }
    }
}
