//! Call graph integration tests.
//!
//! These tests verify creation and deployment graphs using the public API:
//! 1. Assemble a resolved syntax tree with `AstBuilder`
//! 2. Build the creation graph of a contract
//! 3. Build the deployment graph from it
//! 4. Verify reachability, edges and side-effect sets

use solscope::{
    analysis::CallGraphStats,
    ast::{Ast, AstBuilder, AstId, Block, Expression, FunctionTypeKind, Statement},
    CallGraphConfig, ContractCallGraph, Error, Node, ProgramCallGraphs, Result,
};

/// Wraps expressions into a block of expression statements.
fn calls(expressions: Vec<Expression>) -> Block {
    Block::new(expressions.into_iter().map(Statement::expression).collect())
}

/// An unresolved local or parameter.
fn local(name: &str) -> Expression {
    Expression::identifier(name, None)
}

/// Builds both graphs of `contract` with the given configuration.
///
/// Both graphs are checked for nodes not reachable from `Entry`.
fn graphs<'a>(
    ast: &'a Ast,
    contract: AstId,
    config: &CallGraphConfig,
) -> Result<(ContractCallGraph<'a>, ContractCallGraph<'a>)> {
    let creation = ContractCallGraph::creation(ast, contract)?;
    let deployment = ContractCallGraph::deployment_with_config(ast, contract, &creation, config)?;
    assert_no_orphans(&creation);
    assert_no_orphans(&deployment);
    Ok((creation, deployment))
}

/// Every node of the graph must be reachable from `Entry`.
fn assert_no_orphans(graph: &ContractCallGraph<'_>) {
    let reachable = graph.reachable_from(Node::Entry);
    for node in graph.nodes() {
        assert!(
            reachable.contains(&node),
            "{node} is in the graph of {} but not reachable from Entry",
            graph.contract().name
        );
    }
}

#[test]
fn test_no_orphan_nodes() -> Result<()> {
    let mut builder = AstBuilder::new();
    let vault = builder.contract("Vault").id();
    let factory = builder.contract("Factory").id();
    let deployed = builder.event(factory, "Deployed", &[("vault", "address")]);
    let only_admin = builder.modifier(factory, "onlyAdmin").id();
    let pick = builder.function(factory, "_pick").private().id();
    let fast = builder.function(factory, "_fast").private().id();
    let slow = builder.function(factory, "_slow").private().id();
    let setup = builder.function(factory, "_setup").internal().id();
    let _constructor = builder
        .constructor(factory)
        .body(calls(vec![Expression::internal_call("_setup", setup, vec![])]))
        .id();
    let _deploy = builder
        .function(factory, "deploy")
        .external()
        .modifier(only_admin, vec![])
        .body(Block::new(vec![
            Statement::VariableDeclaration {
                names: vec!["strategy".to_string()],
                initial_value: Some(Expression::internal_call("_pick", pick, vec![])),
            },
            Statement::expression(Expression::call(
                local("strategy").with_function_type(FunctionTypeKind::Internal),
                vec![],
            )),
            Statement::Emit(Expression::event_call(
                "Deployed",
                deployed,
                vec![Expression::new_contract("Vault", vault, vec![])],
            )),
        ]))
        .id();
    builder.set_body(
        pick,
        Block::new(vec![Statement::Return(Some(Expression::conditional(
            local("cheap"),
            Expression::function_ref("_fast", fast),
            Expression::function_ref("_slow", slow),
        )))]),
    );
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, factory, &CallGraphConfig::default())?;
    assert_eq!(deployment.callables().count(), 5);
    Ok(())
}

#[test]
fn test_public_leaf_present_private_helper_absent() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Pinger").id();
    let ping = builder.function(c, "ping").id();
    let helper = builder.function(c, "_helper").private().id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(deployment.contains(Node::Callable(ping)));
    assert!(deployment.has_edge(Node::Entry, Node::Callable(ping)));
    assert_eq!(deployment.callees(Node::Callable(ping)).count(), 0);
    assert!(!deployment.contains(Node::Callable(helper)));
    assert!(!creation.contains(Node::Callable(helper)));
    assert!(!creation.contains(Node::Callable(ping)));
    Ok(())
}

#[test]
fn test_virtual_call_resolves_to_most_derived() -> Result<()> {
    let mut builder = AstBuilder::new();
    let base = builder.contract("Base").id();
    let hook = builder.function(base, "_hook").internal().virtual_().id();
    let run = builder
        .function(base, "run")
        .body(calls(vec![Expression::internal_call("_hook", hook, vec![])]))
        .id();
    let derived = builder.contract("Derived").inherits(base, vec![]).id();
    let derived_hook = builder
        .function(derived, "_hook")
        .internal()
        .overrides(hook)
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, derived, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(run), Node::Callable(derived_hook)));
    assert!(!deployment.has_edge(Node::Callable(run), Node::Callable(hook)));
    assert!(!deployment.contains(Node::Callable(hook)));

    // The base on its own still runs its own implementation.
    let (_, deployment) = graphs(&ast, base, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(run), Node::Callable(hook)));
    Ok(())
}

#[test]
fn test_qualified_call_bypasses_overrides() -> Result<()> {
    let mut builder = AstBuilder::new();
    let base = builder.contract("Base").id();
    let hook = builder.function(base, "_hook").internal().virtual_().id();
    let derived = builder.contract("Derived").inherits(base, vec![]).id();
    let derived_hook = builder
        .function(derived, "_hook")
        .internal()
        .overrides(hook)
        .id();
    let run = builder
        .function(derived, "run")
        .body(calls(vec![Expression::static_call("Base", "_hook", hook, vec![])]))
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, derived, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(run), Node::Callable(hook)));
    assert!(!deployment.contains(Node::Callable(derived_hook)));
    Ok(())
}

#[test]
fn test_super_calls_follow_linearization() -> Result<()> {
    let mut builder = AstBuilder::new();
    let a = builder.contract("A").id();
    let fa = builder.function(a, "f").internal().virtual_().id();
    let b = builder.contract("B").inherits(a, vec![]).id();
    let fb = builder.function(b, "f").internal().virtual_().overrides(fa).id();
    let c = builder.contract("C").inherits(a, vec![]).id();
    let fc = builder.function(c, "f").internal().virtual_().overrides(fa).id();
    let d = builder
        .contract("D")
        .inherits(b, vec![])
        .inherits(c, vec![])
        .id();
    let fd = builder
        .function(d, "f")
        .internal()
        .overrides(fb)
        .overrides(fc)
        .id();
    let run = builder
        .function(d, "run")
        .body(calls(vec![Expression::internal_call("f", fa, vec![])]))
        .id();
    builder.set_body(fd, calls(vec![Expression::super_call(d, "f", fa, vec![])]));
    builder.set_body(fc, calls(vec![Expression::super_call(c, "f", fa, vec![])]));
    builder.set_body(fb, calls(vec![Expression::super_call(b, "f", fa, vec![])]));
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, d, &CallGraphConfig::default())?;
    let chain = [run, fd, fc, fb, fa].map(Node::Callable);
    for pair in chain.windows(2) {
        assert!(
            deployment.has_edge(pair[0], pair[1]),
            "missing edge {} -> {}",
            pair[0].display(&ast),
            pair[1].display(&ast)
        );
    }
    assert_eq!(deployment.callables().count(), 5);
    Ok(())
}

#[test]
fn test_indirect_call_through_function_pointer() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Router").id();
    let fast = builder.function(c, "_fast").private().id();
    let slow = builder.function(c, "_slow").private().id();
    let never = builder.function(c, "_never").private().id();
    let route = builder
        .function(c, "route")
        .param("cheap", "bool")
        .body(Block::new(vec![
            Statement::VariableDeclaration {
                names: vec!["target".to_string()],
                initial_value: Some(Expression::conditional(
                    local("cheap"),
                    Expression::function_ref("_fast", fast),
                    Expression::function_ref("_slow", slow),
                )),
            },
            Statement::expression(Expression::call(
                local("target").with_function_type(FunctionTypeKind::Internal),
                vec![],
            )),
        ]))
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(route), Node::InternalDispatch));
    assert!(deployment.has_edge(Node::InternalDispatch, Node::Callable(fast)));
    assert!(deployment.has_edge(Node::InternalDispatch, Node::Callable(slow)));
    assert!(!deployment.has_edge(Node::Callable(route), Node::Callable(fast)));
    assert!(!deployment.contains(Node::Callable(never)));
    assert_eq!(deployment.dispatch_targets(), [fast, slow]);
    assert_eq!(deployment.callers(Node::InternalDispatch), [Node::Callable(route)]);
    Ok(())
}

#[test]
fn test_pointer_taken_without_indirect_call() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Registry").id();
    let handler = builder.function(c, "_handler").private().id();
    let slot = builder
        .state_variable(c, "stored", "function() internal")
        .id();
    let _register = builder
        .function(c, "register")
        .body(calls(vec![Expression::assign(
            Expression::variable("stored", slot),
            Expression::function_ref("_handler", handler),
        )]))
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(!deployment.contains(Node::Callable(handler)));
    assert!(!deployment.contains(Node::InternalDispatch));
    assert!(!deployment.is_dispatch_reachable());
    assert!(deployment.dispatch_targets().is_empty());
    assert!(deployment.pointer_targets().contains(&handler));
    assert!(!deployment.contains(Node::Callable(slot)));
    Ok(())
}

#[test]
fn test_pointer_called_only_from_unreachable_code() -> Result<()> {
    // contract Registry {
    //     function() internal stored;
    //     constructor() { stored = _init; }
    //     function _init() private {}
    //     function _handler() private { stored(); }
    //     function register() public { stored = _handler; }
    // }
    let mut builder = AstBuilder::new();
    let c = builder.contract("Registry").id();
    let slot = builder
        .state_variable(c, "stored", "function() internal")
        .id();
    let init = builder.function(c, "_init").private().id();
    let handler = builder
        .function(c, "_handler")
        .private()
        .body(calls(vec![Expression::call(
            Expression::function_pointer("stored", slot),
            vec![],
        )]))
        .id();
    let _constructor = builder
        .constructor(c)
        .body(calls(vec![Expression::assign(
            Expression::variable("stored", slot),
            Expression::function_ref("_init", init),
        )]))
        .id();
    let register = builder
        .function(c, "register")
        .body(calls(vec![Expression::assign(
            Expression::variable("stored", slot),
            Expression::function_ref("_handler", handler),
        )]))
        .id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert_eq!(creation.pointer_targets().iter().copied().collect::<Vec<_>>(), [init]);
    assert!(!creation.contains(Node::Callable(init)));

    assert_eq!(deployment.callables().collect::<Vec<_>>(), [register]);
    assert!(!deployment.is_dispatch_reachable());
    assert!(!deployment.contains(Node::Callable(handler)));
    assert!(!deployment.contains(Node::Callable(init)));
    Ok(())
}

#[test]
fn test_events_and_creations_are_not_nodes() -> Result<()> {
    let mut builder = AstBuilder::new();
    let vault = builder.contract("Vault").id();
    let vault_constructor = builder.constructor(vault).id();
    let factory = builder.contract("Factory").id();
    let created = builder.event(factory, "Created", &[("vault", "address")]);
    let unused_event = builder.event(factory, "Unused", &[]);
    let deploy = builder
        .function(factory, "deploy")
        .body(Block::new(vec![Statement::Emit(Expression::event_call(
            "Created",
            created,
            vec![Expression::new_contract("Vault", vault, vec![])],
        ))]))
        .id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, factory, &CallGraphConfig::default())?;
    assert_eq!(deployment.created_contracts().iter().copied().collect::<Vec<_>>(), [vault]);
    assert_eq!(deployment.emitted_events().iter().copied().collect::<Vec<_>>(), [created]);
    assert!(!deployment.emitted_events().contains(&unused_event));
    assert_eq!(
        deployment.nodes().into_iter().collect::<Vec<_>>(),
        [Node::Entry, Node::Callable(deploy)]
    );
    assert!(!deployment.contains(Node::Callable(vault_constructor)));
    assert!(creation.created_contracts().is_empty());
    assert!(creation.emitted_events().is_empty());
    Ok(())
}

#[test]
fn test_calls_leaving_the_contract_add_no_edges() -> Result<()> {
    let mut builder = AstBuilder::new();
    let token = builder.contract("Token").id();
    let transfer = builder.function(token, "transfer").external().id();
    let math = builder.contract("Math").library().id();
    let mul_div = builder.function(math, "mulDiv").internal().id();
    let sqrt = builder.function(math, "sqrt").id();
    let wallet = builder.contract("Wallet").id();
    let pay = builder
        .function(wallet, "pay")
        .body(calls(vec![
            Expression::external_call(local("token"), "transfer", Some(transfer), vec![]),
            Expression::call(
                Expression::member_access(
                    local("Math"),
                    "sqrt",
                    Some(sqrt),
                    solscope::ast::VirtualLookup::Static,
                )
                .with_function_type(FunctionTypeKind::DelegateCall),
                vec![Expression::literal("4")],
            ),
            Expression::builtin_call("require", vec![Expression::literal("true")]),
            Expression::static_call("Math", "mulDiv", mul_div, vec![]),
        ]))
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, wallet, &CallGraphConfig::default())?;
    assert_eq!(
        deployment.callees(Node::Callable(pay)).collect::<Vec<_>>(),
        [Node::Callable(mul_div)]
    );
    assert!(!deployment.contains(Node::Callable(transfer)));
    assert!(!deployment.contains(Node::Callable(sqrt)));
    Ok(())
}

#[test]
fn test_creation_and_deployment_are_independent() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Pool").id();
    let setup = builder.function(c, "_setup").internal().id();
    let work = builder.function(c, "_work").private().id();
    let constructor = builder
        .constructor(c)
        .body(calls(vec![Expression::internal_call("_setup", setup, vec![])]))
        .id();
    let run = builder
        .function(c, "run")
        .external()
        .body(calls(vec![Expression::internal_call("_work", work, vec![])]))
        .id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(creation.has_edge(Node::Entry, Node::Callable(constructor)));
    assert!(creation.has_edge(Node::Callable(constructor), Node::Callable(setup)));
    assert!(!creation.contains(Node::Callable(run)));
    assert!(!creation.contains(Node::Callable(work)));

    assert!(deployment.has_edge(Node::Callable(run), Node::Callable(work)));
    assert!(!deployment.contains(Node::Callable(constructor)));
    assert!(!deployment.contains(Node::Callable(setup)));
    Ok(())
}

#[test]
fn test_modifier_without_placeholder_has_no_back_edge() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Paused").id();
    let when_paused = builder
        .modifier(c, "whenNotPaused")
        .body(calls(vec![Expression::builtin_call(
            "revert",
            vec![Expression::literal("\"paused\"")],
        )]))
        .id();
    let guarded = builder.modifier(c, "guarded").id();
    let f = builder.function(c, "f").modifier(when_paused, vec![]).id();
    let g = builder.function(c, "g").modifier(guarded, vec![]).id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(f), Node::Callable(when_paused)));
    assert!(!deployment.has_edge(Node::Callable(when_paused), Node::Callable(f)));
    assert!(deployment.has_edge(Node::Callable(g), Node::Callable(guarded)));
    assert!(deployment.has_edge(Node::Callable(guarded), Node::Callable(g)));
    Ok(())
}

#[test]
fn test_placeholder_in_nested_statement() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Gate").id();
    let open = builder
        .modifier(c, "whenOpen")
        .param("flag", "bool")
        .body(Block::new(vec![Statement::If {
            condition: local("flag"),
            true_body: Box::new(Statement::Block(Block::new(vec![Statement::Placeholder]))),
            false_body: None,
        }]))
        .id();
    let f = builder
        .function(c, "f")
        .modifier(open, vec![Expression::literal("true")])
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(open), Node::Callable(f)));
    Ok(())
}

#[test]
fn test_virtual_modifier_resolves_to_override() -> Result<()> {
    let mut builder = AstBuilder::new();
    let base = builder.contract("Base").id();
    let check = builder.modifier(base, "check").virtual_().id();
    let f = builder.function(base, "f").modifier(check, vec![]).id();
    let derived = builder.contract("Derived").inherits(base, vec![]).id();
    let derived_check = builder.modifier(derived, "check").overrides(check).id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, derived, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(f), Node::Callable(derived_check)));
    assert!(deployment.has_edge(Node::Callable(derived_check), Node::Callable(f)));
    assert!(!deployment.contains(Node::Callable(check)));
    Ok(())
}

#[test]
fn test_build_is_idempotent() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Counter").id();
    let changed = builder.event(c, "Changed", &[("value", "uint256")]);
    let bump = builder
        .function(c, "_bump")
        .internal()
        .body(Block::new(vec![Statement::Emit(Expression::event_call(
            "Changed",
            changed,
            vec![Expression::literal("1")],
        ))]))
        .id();
    let _increment = builder
        .function(c, "increment")
        .body(calls(vec![Expression::internal_call("_bump", bump, vec![])]))
        .id();
    let _constructor = builder
        .constructor(c)
        .body(calls(vec![Expression::internal_call("_bump", bump, vec![])]))
        .id();
    let ast = builder.build()?;

    let (first_creation, first_deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    let (second_creation, second_deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert_eq!(first_creation, second_creation);
    assert_eq!(first_deployment, second_deployment);
    Ok(())
}

#[test]
fn test_constructor_chain_and_base_arguments() -> Result<()> {
    let mut builder = AstBuilder::new();
    let default_owner = builder.free_function("defaultOwner").id();
    let default_cap = builder.free_function("defaultCap").id();
    let seed = builder.free_function("seed").id();

    let owned = builder.contract("Owned").id();
    let owned_constructor = builder.constructor(owned).param("owner", "address").id();
    let capped = builder.contract("Capped").id();
    let capped_constructor = builder.constructor(capped).param("cap", "uint256").id();

    let token = builder
        .contract("Token")
        .inherits(
            owned,
            vec![Expression::internal_call("defaultOwner", default_owner, vec![])],
        )
        .inherits(capped, vec![])
        .id();
    let token_constructor = builder
        .constructor(token)
        .base_constructor(
            capped,
            vec![Expression::internal_call("defaultCap", default_cap, vec![])],
        )
        .id();

    let plain = builder
        .contract("Plain")
        .inherits(owned, vec![Expression::internal_call("seed", seed, vec![])])
        .id();
    let ast = builder.build()?;

    let creation = ContractCallGraph::creation(&ast, token)?;
    assert_eq!(
        creation.callees(Node::Entry).collect::<Vec<_>>(),
        [
            Node::Callable(owned_constructor),
            Node::Callable(capped_constructor),
            Node::Callable(token_constructor),
        ]
    );
    let token_constructor = Node::Callable(token_constructor);
    assert!(creation.has_edge(token_constructor, Node::Callable(default_owner)));
    assert!(creation.has_edge(token_constructor, Node::Callable(default_cap)));
    assert!(!creation.has_edge(token_constructor, Node::Callable(capped_constructor)));
    assert!(!creation.has_edge(Node::Entry, Node::Callable(default_owner)));

    // Without a constructor of its own, base arguments are evaluated from Entry.
    let creation = ContractCallGraph::creation(&ast, plain)?;
    assert!(creation.has_edge(Node::Entry, Node::Callable(owned_constructor)));
    assert!(creation.has_edge(Node::Entry, Node::Callable(seed)));
    assert_eq!(creation.callables().count(), 2);
    Ok(())
}

#[test]
fn test_constant_initializers_are_inlined() -> Result<()> {
    let mut builder = AstBuilder::new();
    let fee_basis = builder.free_function("feeBasis").id();
    let c = builder.contract("Exchange").id();
    let fee = builder
        .state_variable(c, "FEE", "uint256")
        .constant()
        .value(Expression::internal_call("feeBasis", fee_basis, vec![]))
        .id();
    let quote = builder
        .function(c, "quote")
        .body(Block::new(vec![Statement::Return(Some(Expression::binary(
            local("amount"),
            "*",
            Expression::variable("FEE", fee),
        )))]))
        .id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert!(deployment.has_edge(Node::Callable(quote), Node::Callable(fee_basis)));
    assert!(!creation.contains(Node::Callable(fee_basis)));
    assert!(!deployment.contains(Node::Callable(fee)));
    Ok(())
}

#[test]
fn test_fallback_and_receive_are_entry_points() -> Result<()> {
    let mut builder = AstBuilder::new();
    let proxy = builder.contract("Proxy").id();
    let forward = builder.function(proxy, "_forward").internal().id();
    let fallback = builder
        .fallback(proxy)
        .body(calls(vec![Expression::internal_call("_forward", forward, vec![])]))
        .id();
    let receive = builder.receive(proxy).id();
    let ast = builder.build()?;

    let (creation, deployment) = graphs(&ast, proxy, &CallGraphConfig::default())?;
    assert_eq!(
        deployment.callees(Node::Entry).collect::<Vec<_>>(),
        [Node::Callable(fallback), Node::Callable(receive)]
    );
    assert!(deployment.has_edge(Node::Callable(fallback), Node::Callable(forward)));
    assert_eq!(creation.callables().count(), 0);
    assert_eq!(Node::Callable(fallback).display(&ast).to_string(), "fallback Proxy()");
    assert_eq!(Node::Callable(receive).display(&ast).to_string(), "receive Proxy()");
    Ok(())
}

#[test]
fn test_getters_are_not_entry_points() -> Result<()> {
    let mut builder = AstBuilder::new();
    let iface = builder.contract("IOwned").interface().id();
    let owner_decl = builder
        .function(iface, "owner")
        .external()
        .unimplemented()
        .id();
    let c = builder.contract("Owned").inherits(iface, vec![]).id();
    let _owner = builder
        .state_variable(c, "owner", "address")
        .public()
        .overrides(owner_decl)
        .id();
    let ping = builder.function(c, "ping").external().id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, c, &CallGraphConfig::default())?;
    assert_eq!(
        deployment.callees(Node::Entry).collect::<Vec<_>>(),
        [Node::Callable(ping)]
    );
    assert!(!deployment.contains(Node::Callable(owner_decl)));
    Ok(())
}

/// A contract storing a function pointer in its constructor.
///
/// ```text
/// contract Strategy {
///     function() internal hook;
///     constructor() { hook = _apply; }
///     function _apply() private {}
///     function run() external { hook(); }
///     function peek() external {}
/// }
/// ```
struct StoredHook {
    ast: Ast,
    strategy: AstId,
    apply: AstId,
    run: AstId,
}

fn stored_hook(call_hook: bool) -> Result<StoredHook> {
    let mut builder = AstBuilder::new();
    let strategy = builder.contract("Strategy").id();
    let hook = builder
        .state_variable(strategy, "hook", "function() internal")
        .id();
    let apply = builder.function(strategy, "_apply").private().id();
    let _constructor = builder
        .constructor(strategy)
        .body(calls(vec![Expression::assign(
            Expression::variable("hook", hook),
            Expression::function_ref("_apply", apply),
        )]))
        .id();
    let body = if call_hook {
        calls(vec![Expression::call(Expression::function_pointer("hook", hook), vec![])])
    } else {
        Block::default()
    };
    let run = builder.function(strategy, "run").external().body(body).id();
    let _peek = builder.function(strategy, "peek").external().id();
    let ast = builder.build()?;
    Ok(StoredHook {
        ast,
        strategy,
        apply,
        run,
    })
}

#[test]
fn test_creation_dispatch_targets_carry_into_deployment() -> Result<()> {
    let fixture = stored_hook(true)?;
    let (creation, deployment) =
        graphs(&fixture.ast, fixture.strategy, &CallGraphConfig::default())?;

    assert!(creation.pointer_targets().contains(&fixture.apply));
    assert!(creation.dispatch_targets().is_empty());
    assert!(!creation.contains(Node::Callable(fixture.apply)));

    assert!(deployment.has_edge(Node::Callable(fixture.run), Node::InternalDispatch));
    assert!(deployment.has_edge(Node::InternalDispatch, Node::Callable(fixture.apply)));
    assert_eq!(deployment.dispatch_targets(), [fixture.apply]);
    Ok(())
}

#[test]
fn test_isolated_deployment_ignores_creation_dispatch() -> Result<()> {
    let fixture = stored_hook(true)?;
    let (_, deployment) = graphs(&fixture.ast, fixture.strategy, &CallGraphConfig::isolated())?;

    assert!(deployment.has_edge(Node::Callable(fixture.run), Node::InternalDispatch));
    assert!(deployment.dispatch_targets().is_empty());
    assert!(!deployment.contains(Node::Callable(fixture.apply)));
    Ok(())
}

#[test]
fn test_no_carry_without_indirect_calls() -> Result<()> {
    let fixture = stored_hook(false)?;
    let (_, deployment) = graphs(&fixture.ast, fixture.strategy, &CallGraphConfig::default())?;

    assert!(!deployment.contains(Node::InternalDispatch));
    assert!(!deployment.contains(Node::Callable(fixture.apply)));
    Ok(())
}

#[test]
fn test_deployment_rejects_foreign_creation_graph() -> Result<()> {
    let mut builder = AstBuilder::new();
    let first = builder.contract("First").id();
    let second = builder.contract("Second").id();
    let ast = builder.build()?;

    let creation = ContractCallGraph::creation(&ast, first)?;
    match ContractCallGraph::deployment(&ast, second, &creation) {
        Err(Error::ContractMismatch { expected, found }) => {
            assert_eq!(expected, second);
            assert_eq!(found, first);
        }
        other => panic!("expected a contract mismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unresolved_call_is_rejected() -> Result<()> {
    let mut builder = AstBuilder::new();
    let c = builder.contract("Broken").id();
    let _f = builder
        .function(c, "f")
        .body(calls(vec![Expression::call(local("g"), vec![])]))
        .id();
    let ast = builder.build()?;

    let creation = ContractCallGraph::creation(&ast, c)?;
    assert!(matches!(
        ContractCallGraph::deployment(&ast, c, &creation),
        Err(Error::InconsistentTree { .. })
    ));
    Ok(())
}

#[test]
fn test_node_rendering() -> Result<()> {
    let mut builder = AstBuilder::new();
    let helper = builder.free_function("helper").param("x", "uint256").id();
    let c = builder.contract("Token").id();
    let constructor = builder.constructor(c).param("supply", "uint256").id();
    let transfer = builder
        .function(c, "transfer")
        .param("to", "address")
        .param("amount", "uint256")
        .id();
    let only_owner = builder.modifier(c, "onlyOwner").id();
    let ast = builder.build()?;

    let render = |node: Node| node.display(&ast).to_string();
    assert_eq!(render(Node::Entry), "Entry");
    assert_eq!(render(Node::InternalDispatch), "InternalDispatch");
    assert_eq!(render(Node::Callable(constructor)), "constructor Token(uint256)");
    assert_eq!(
        render(Node::Callable(transfer)),
        "function Token.transfer(address,uint256)"
    );
    assert_eq!(render(Node::Callable(only_owner)), "modifier Token.onlyOwner()");
    assert_eq!(render(Node::Callable(helper)), "function helper(uint256)");
    assert_eq!(render(Node::Callable(AstId::new(99))), "<unknown #99>");

    assert!(Node::InternalDispatch < Node::Entry);
    assert!(Node::Entry < Node::Callable(helper));
    Ok(())
}

#[test]
fn test_dot_output() -> Result<()> {
    let mut builder = AstBuilder::new();
    let vault = builder.contract("Vault").id();
    let factory = builder.contract("Factory").id();
    let created = builder.event(factory, "Created", &[]);
    let deploy = builder
        .function(factory, "deploy")
        .body(Block::new(vec![
            Statement::expression(Expression::new_contract("Vault", vault, vec![])),
            Statement::Emit(Expression::event_call("Created", created, vec![])),
        ]))
        .id();
    let ast = builder.build()?;

    let (_, deployment) = graphs(&ast, factory, &CallGraphConfig::default())?;
    let dot = deployment.to_dot(&ast, None);
    assert!(dot.starts_with("digraph CallGraph {\n"));
    assert!(dot.contains("label=\"Factory\\ncreates Vault\\nemits Created\";"));
    assert!(dot.contains("[label=\"Entry\", style=filled, fillcolor=lightgreen];"));
    assert!(dot.contains("[label=\"function Factory.deploy()\"];"));
    assert!(dot.contains(&format!("\"#-1\" -> \"{}\";", deploy)));
    assert!(dot.trim_end().ends_with('}'));

    let titled = deployment.to_dot(&ast, Some("Factory (deployed)"));
    assert!(titled.contains("label=\"Factory (deployed)\\n"));
    Ok(())
}

#[test]
fn test_graph_stats() -> Result<()> {
    let fixture = stored_hook(true)?;
    let (_, deployment) = graphs(&fixture.ast, fixture.strategy, &CallGraphConfig::default())?;

    assert_eq!(
        deployment.stats(),
        CallGraphStats {
            // Entry, InternalDispatch, run, peek, _apply
            node_count: 5,
            callable_count: 3,
            edge_count: 4,
            entry_points: 2,
            dispatch_targets: 1,
            indirect_callers: 1,
            leaf_callables: 2,
            created_contracts: 0,
            emitted_events: 0,
        }
    );
    Ok(())
}

#[test]
fn test_program_graphs_parallel_matches_sequential() -> Result<()> {
    let mut builder = AstBuilder::new();
    let base = builder.contract("Base").abstract_().id();
    let hook = builder.function(base, "_hook").internal().virtual_().id();
    let mut contracts = Vec::new();
    for index in 0..8 {
        let contract = builder
            .contract(&format!("Impl{index}"))
            .inherits(base, vec![])
            .id();
        let implementation = builder
            .function(contract, "_hook")
            .internal()
            .overrides(hook)
            .id();
        let _run = builder
            .function(contract, "run")
            .body(calls(vec![Expression::internal_call("_hook", hook, vec![])]))
            .id();
        contracts.push((contract, implementation));
    }
    let ast = builder.build()?;

    let parallel = ProgramCallGraphs::build(&ast, &CallGraphConfig::default())?;
    let sequential = ProgramCallGraphs::build(&ast, &CallGraphConfig::sequential())?;
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.len(), contracts.len());
    assert!(parallel.get(base).is_none());

    for (contract, implementation) in contracts {
        let graphs = parallel.get(contract).ok_or(Error::DeclarationNotFound(contract))?;
        assert!(graphs.deployment.contains(Node::Callable(implementation)));
        assert!(!graphs.deployment.contains(Node::Callable(hook)));
    }
    Ok(())
}
