//! Fixtures shared by the unit tests.
//!
//! The syntax trees built here mirror small but realistic contract layouts, so
//! tests in different modules can reason about the same program.

use crate::ast::{Ast, AstBuilder, AstId, Block, Expression, Statement, VirtualLookup};

/// Wraps calls into a block of expression statements
pub fn calls(expressions: Vec<Expression>) -> Block {
    Block::new(expressions.into_iter().map(Statement::expression).collect())
}

/// An unresolved identifier, as used for locals and parameters
pub fn local(name: &str) -> Expression {
    Expression::identifier(name, None)
}

/// `msg.sender`
pub fn msg_sender() -> Expression {
    Expression::member_access(local("msg"), "sender", None, VirtualLookup::Static)
}

/// Ids of the declarations in [`token_fixture`].
pub struct TokenFixture {
    pub ast: Ast,
    pub ownable: AstId,
    pub token: AstId,
    pub ownership_transferred: AstId,
    pub transfer_event: AstId,
    pub owner_constructor: AstId,
    pub only_owner: AstId,
    pub check_owner: AstId,
    pub transfer_ownership: AstId,
    pub token_constructor: AstId,
    pub initial_supply: AstId,
    pub total_supply: AstId,
    pub transfer: AstId,
    pub mint: AstId,
    pub transfer_internal: AstId,
    pub check_owner_override: AstId,
    pub unused: AstId,
}

/// Builds an ownable token.
///
/// ```text
/// contract Ownable {
///     event OwnershipTransferred(address previousOwner, address newOwner);
///     constructor() { _transferOwnership(msg.sender); }
///     modifier onlyOwner() { _checkOwner(); _; }
///     function _checkOwner() internal view virtual {}
///     function _transferOwnership(address newOwner) internal virtual {
///         emit OwnershipTransferred(address(0), newOwner);
///     }
/// }
///
/// contract Token is Ownable {
///     event Transfer(address from, address to, uint256 value);
///     uint256 totalSupply = _initialSupply();
///     constructor() { _transfer(address(0), msg.sender, totalSupply); }
///     function _initialSupply() private pure returns (uint256) {}
///     function transfer(address to, uint256 amount) external { _transfer(msg.sender, to, amount); }
///     function mint(address to, uint256 amount) external onlyOwner { _transfer(address(0), to, amount); }
///     function _transfer(address from, address to, uint256 amount) internal virtual {
///         emit Transfer(from, to, amount);
///     }
///     function _checkOwner() internal view override {}
///     function _unused() private {}
/// }
/// ```
pub fn token_fixture() -> TokenFixture {
    let mut builder = AstBuilder::new();

    let ownable = builder.contract("Ownable").id();
    let ownership_transferred = builder.event(
        ownable,
        "OwnershipTransferred",
        &[("previousOwner", "address"), ("newOwner", "address")],
    );
    let owner_constructor = builder.constructor(ownable).id();
    let only_owner = builder.modifier(ownable, "onlyOwner").id();
    let check_owner = builder
        .function(ownable, "_checkOwner")
        .internal()
        .virtual_()
        .id();
    let transfer_ownership = builder
        .function(ownable, "_transferOwnership")
        .internal()
        .virtual_()
        .param("newOwner", "address")
        .body(Block::new(vec![Statement::Emit(Expression::event_call(
            "OwnershipTransferred",
            ownership_transferred,
            vec![
                Expression::type_conversion("address", Expression::literal("0")),
                local("newOwner"),
            ],
        ))]))
        .id();
    builder.set_body(
        owner_constructor,
        calls(vec![Expression::internal_call(
            "_transferOwnership",
            transfer_ownership,
            vec![msg_sender()],
        )]),
    );
    builder.set_body(
        only_owner,
        Block::new(vec![
            Statement::expression(Expression::internal_call("_checkOwner", check_owner, vec![])),
            Statement::Placeholder,
        ]),
    );

    let token = builder.contract("Token").inherits(ownable, vec![]).id();
    let transfer_event = builder.event(
        token,
        "Transfer",
        &[("from", "address"), ("to", "address"), ("value", "uint256")],
    );
    let initial_supply = builder.function(token, "_initialSupply").private().id();
    let total_supply = builder
        .state_variable(token, "totalSupply", "uint256")
        .value(Expression::internal_call("_initialSupply", initial_supply, vec![]))
        .id();
    let token_constructor = builder.constructor(token).id();
    let transfer_internal = builder
        .function(token, "_transfer")
        .internal()
        .virtual_()
        .param("from", "address")
        .param("to", "address")
        .param("amount", "uint256")
        .body(Block::new(vec![Statement::Emit(Expression::event_call(
            "Transfer",
            transfer_event,
            vec![local("from"), local("to"), local("amount")],
        ))]))
        .id();
    builder.set_body(
        token_constructor,
        calls(vec![Expression::internal_call(
            "_transfer",
            transfer_internal,
            vec![
                Expression::type_conversion("address", Expression::literal("0")),
                msg_sender(),
                Expression::variable("totalSupply", total_supply),
            ],
        )]),
    );
    let transfer = builder
        .function(token, "transfer")
        .external()
        .param("to", "address")
        .param("amount", "uint256")
        .body(calls(vec![Expression::internal_call(
            "_transfer",
            transfer_internal,
            vec![msg_sender(), local("to"), local("amount")],
        )]))
        .id();
    let mint = builder
        .function(token, "mint")
        .external()
        .param("to", "address")
        .param("amount", "uint256")
        .modifier(only_owner, vec![])
        .body(calls(vec![Expression::internal_call(
            "_transfer",
            transfer_internal,
            vec![
                Expression::type_conversion("address", Expression::literal("0")),
                local("to"),
                local("amount"),
            ],
        )]))
        .id();
    let check_owner_override = builder
        .function(token, "_checkOwner")
        .internal()
        .overrides(check_owner)
        .id();
    let unused = builder.function(token, "_unused").private().id();

    let ast = match builder.build() {
        Ok(ast) => ast,
        Err(e) => panic!("token fixture does not build: {e}"),
    };

    TokenFixture {
        ast,
        ownable,
        token,
        ownership_transferred,
        transfer_event,
        owner_constructor,
        only_owner,
        check_owner,
        transfer_ownership,
        token_constructor,
        initial_supply,
        total_supply,
        transfer,
        mint,
        transfer_internal,
        check_owner_override,
        unused,
    }
}
