//! Declarations of the syntax tree.
//!
//! Every declaration carries the [`AstId`] it was registered under in the [`crate::ast::Ast`]
//! arena. Cross references between declarations (members of a contract, overridden
//! functions, linearized bases) are stored as ids, never as owning pointers.

use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

use crate::ast::{AstId, Block, Expression, VirtualLookup};

bitflags! {
    /// Declaration attribute flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct DeclarationFlags: u8 {
        /// Function or modifier may be overridden in derived contracts
        const VIRTUAL = 0x01;
        /// State variable is a compile-time constant, inlined at every use
        const CONSTANT = 0x02;
        /// State variable is assigned once during construction
        const IMMUTABLE = 0x04;
    }
}

/// Visibility of a function or state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum Visibility {
    /// Only callable from outside the contract
    External,
    /// Callable from outside and inside the contract
    Public,
    /// Callable from the contract and derived contracts
    Internal,
    /// Callable from the declaring contract only
    Private,
}

impl Visibility {
    /// Returns `true` if the member is part of the contract's external interface
    #[must_use]
    pub const fn is_externally_visible(&self) -> bool {
        matches!(self, Self::External | Self::Public)
    }
}

/// Kind of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum FunctionKind {
    /// Regular named function
    Function,
    /// Contract constructor
    Constructor,
    /// Fallback function, invoked when no other function matches
    Fallback,
    /// Receive function, invoked on plain value transfers
    Receive,
}

/// Kind of a contract definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum ContractKind {
    /// Regular contract
    Contract,
    /// Interface, no implementation
    Interface,
    /// Library
    Library,
}

/// A named, typed parameter of a callable or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name, may be empty
    pub name: String,
    /// Canonical type name, e.g. `uint256`
    pub type_name: String,
}

impl Parameter {
    /// Creates a parameter of the given type
    #[must_use]
    pub fn new(name: &str, type_name: &str) -> Self {
        Parameter {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// A base contract in an `is` list, with optional constructor arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceSpecifier {
    /// The base contract
    pub base: AstId,
    /// Arguments passed to the base constructor, evaluated during construction
    pub arguments: Vec<Expression>,
}

/// A modifier invocation attached to a function, `onlyOwner` or `Base(x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierInvocation {
    /// Name as written at the invocation site
    pub name: String,
    /// Resolved declaration: a modifier, or a base contract for constructor calls
    pub referenced_declaration: Option<AstId>,
    /// How the modifier is looked up
    pub required_lookup: VirtualLookup,
    /// Invocation arguments
    pub arguments: Vec<Expression>,
}

/// A contract, interface or library.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDefinition {
    /// Declaration id
    pub id: AstId,
    /// Contract name
    pub name: String,
    /// Contract kind
    pub kind: ContractKind,
    /// `abstract contract`
    pub is_abstract: bool,
    /// Direct bases, in the order they were written
    pub base_contracts: Vec<InheritanceSpecifier>,
    /// All bases, most derived first, starting with the contract itself
    pub linearized_base_contracts: Vec<AstId>,
    /// Functions declared in this contract, including constructor, fallback and receive
    pub functions: Vec<AstId>,
    /// Modifiers declared in this contract
    pub modifiers: Vec<AstId>,
    /// Events declared in this contract
    pub events: Vec<AstId>,
    /// State variables declared in this contract
    pub state_variables: Vec<AstId>,
}

impl ContractDefinition {
    /// Returns `true` if bytecode is produced for this contract
    #[must_use]
    pub fn can_be_deployed(&self) -> bool {
        !self.is_abstract && self.kind != ContractKind::Interface
    }
}

/// A function, constructor, fallback or receive function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// Declaration id
    pub id: AstId,
    /// Function name, empty for constructor, fallback and receive
    pub name: String,
    /// Declaring contract, `None` for free functions
    pub scope: Option<AstId>,
    /// Function kind
    pub kind: FunctionKind,
    /// Visibility
    pub visibility: Visibility,
    /// Attribute flags
    pub flags: DeclarationFlags,
    /// Base functions (or modifiers) this function directly overrides
    pub overrides: Vec<AstId>,
    /// Parameters
    pub parameters: Vec<Parameter>,
    /// Attached modifier invocations, in source order
    pub modifiers: Vec<ModifierInvocation>,
    /// Body, `None` for unimplemented functions
    pub body: Option<Block>,
}

impl FunctionDefinition {
    /// Returns `true` if the function may be overridden
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags.contains(DeclarationFlags::VIRTUAL)
    }

    /// Returns `true` for a file-level function
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.scope.is_none()
    }

    /// Returns `true` if the function has a body
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.body.is_some()
    }
}

/// A modifier definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierDefinition {
    /// Declaration id
    pub id: AstId,
    /// Modifier name
    pub name: String,
    /// Declaring contract
    pub scope: AstId,
    /// Attribute flags
    pub flags: DeclarationFlags,
    /// Base modifiers this modifier directly overrides
    pub overrides: Vec<AstId>,
    /// Parameters
    pub parameters: Vec<Parameter>,
    /// Body, `None` for unimplemented modifiers
    pub body: Option<Block>,
}

impl ModifierDefinition {
    /// Returns `true` if the modifier may be overridden
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags.contains(DeclarationFlags::VIRTUAL)
    }

    /// Returns `true` if control can continue into the modified function
    ///
    /// That is the case when the body contains at least one `_;` placeholder,
    /// however deeply nested.
    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        self.body.as_ref().is_some_and(Block::contains_placeholder)
    }
}

/// An event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    /// Declaration id
    pub id: AstId,
    /// Event name
    pub name: String,
    /// Declaring contract, `None` for file-level events
    pub scope: Option<AstId>,
    /// Parameters
    pub parameters: Vec<Parameter>,
}

/// A state variable or file-level constant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Declaration id
    pub id: AstId,
    /// Variable name
    pub name: String,
    /// Declaring contract, `None` for file-level constants
    pub scope: Option<AstId>,
    /// Canonical type name
    pub type_name: String,
    /// Visibility; public state variables get a synthesized getter
    pub visibility: Visibility,
    /// Attribute flags
    pub flags: DeclarationFlags,
    /// External functions this variable's getter overrides
    pub overrides: Vec<AstId>,
    /// Initializer
    pub value: Option<Expression>,
}

impl VariableDeclaration {
    /// Returns `true` for a `constant` variable
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.flags.contains(DeclarationFlags::CONSTANT)
    }
}

/// Any declaration stored in the [`crate::ast::Ast`] arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// Contract, interface or library
    Contract(ContractDefinition),
    /// Function
    Function(FunctionDefinition),
    /// Modifier
    Modifier(ModifierDefinition),
    /// Event
    Event(EventDefinition),
    /// State variable or constant
    Variable(VariableDeclaration),
}

impl Declaration {
    /// Returns the declaration id
    #[must_use]
    pub fn id(&self) -> AstId {
        match self {
            Declaration::Contract(d) => d.id,
            Declaration::Function(d) => d.id,
            Declaration::Modifier(d) => d.id,
            Declaration::Event(d) => d.id,
            Declaration::Variable(d) => d.id,
        }
    }

    /// Returns the declared name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Declaration::Contract(d) => &d.name,
            Declaration::Function(d) => &d.name,
            Declaration::Modifier(d) => &d.name,
            Declaration::Event(d) => &d.name,
            Declaration::Variable(d) => &d.name,
        }
    }

    /// Returns a short description of the declaration kind
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Contract(_) => "contract",
            Declaration::Function(_) => "function",
            Declaration::Modifier(_) => "modifier",
            Declaration::Event(_) => "event",
            Declaration::Variable(_) => "variable",
        }
    }
}

/// A borrowed callable declaration: the unit a call graph node refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Callable<'a> {
    /// A function
    Function(&'a FunctionDefinition),
    /// A modifier
    Modifier(&'a ModifierDefinition),
}

impl<'a> Callable<'a> {
    /// Returns the declaration id
    #[must_use]
    pub fn id(&self) -> AstId {
        match self {
            Callable::Function(f) => f.id,
            Callable::Modifier(m) => m.id,
        }
    }

    /// Returns the declared name
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Callable::Function(f) => &f.name,
            Callable::Modifier(m) => &m.name,
        }
    }

    /// Returns the declaring contract, if any
    #[must_use]
    pub fn scope(&self) -> Option<AstId> {
        match self {
            Callable::Function(f) => f.scope,
            Callable::Modifier(m) => Some(m.scope),
        }
    }

    /// Returns the directly overridden declarations
    #[must_use]
    pub fn overrides(&self) -> &'a [AstId] {
        match self {
            Callable::Function(f) => &f.overrides,
            Callable::Modifier(m) => &m.overrides,
        }
    }

    /// Returns the parameters
    #[must_use]
    pub fn parameters(&self) -> &'a [Parameter] {
        match self {
            Callable::Function(f) => &f.parameters,
            Callable::Modifier(m) => &m.parameters,
        }
    }
}
