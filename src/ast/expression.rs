//! Expressions and their resolution annotations.
//!
//! The annotations are what name and type resolution attach to the tree before any
//! analysis runs: which declaration an identifier or member access refers to, how
//! that declaration has to be looked up in the inheritance hierarchy, the kind of
//! function type an expression has, and whether it is the callee of a call.
//!
//! The constructors on [`Expression`] produce nodes annotated the way a resolver
//! would annotate the corresponding source construct.

use strum::{EnumCount, EnumIter};

use crate::ast::AstId;

/// How a referenced callable is looked up at the reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VirtualLookup {
    /// Unqualified reference, subject to override dispatch (`f()`)
    #[default]
    Virtual,
    /// Qualified reference to exactly the named declaration (`Base.f()`, `Lib.f()`)
    Static,
    /// `super.f()` written inside `scope`: the next implementation after `scope`
    /// in the linearization of the contract being compiled
    Super {
        /// The contract whose `super` is referenced
        scope: AstId,
    },
}

/// Kind of function type an expression evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum FunctionTypeKind {
    /// Internal function, compiled into the same contract
    Internal,
    /// External function, called through a message call
    External,
    /// External library function, called through `delegatecall`
    DelegateCall,
    /// Low-level `call`, `staticcall` or `delegatecall` on an address
    BareCall,
    /// Contract creation through `new`
    Creation,
    /// Event, only valid inside `emit`
    Event,
    /// Custom error, only valid inside `revert`
    Error,
    /// Built-in or global function (`require`, `keccak256`, ...)
    Builtin,
}

impl FunctionTypeKind {
    /// Returns `true` for internal function types
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// What a call expression syntactically stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCallKind {
    /// A real function call
    FunctionCall,
    /// `uint8(x)`, `IERC20(addr)`
    TypeConversion,
    /// `S({a: 1})`
    StructConstructorCall,
}

/// Resolution data attached to every expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpressionAnnotation {
    /// Function type of the expression, if it has one
    pub function_type: Option<FunctionTypeKind>,
    /// The expression names a callable and is the immediate callee of a call
    pub called_directly: bool,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// Name as written
    pub name: String,
    /// Resolved declaration, `None` for built-ins and magic variables
    pub referenced_declaration: Option<AstId>,
    /// Lookup mode
    pub required_lookup: VirtualLookup,
}

/// A member access, `expression.member_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    /// The accessed expression
    pub expression: Box<Expression>,
    /// Member name
    pub member_name: String,
    /// Resolved declaration, if the member is a declaration
    pub referenced_declaration: Option<AstId>,
    /// Lookup mode
    pub required_lookup: VirtualLookup,
}

/// A call-like expression, `expression(arguments)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The callee
    pub expression: Box<Expression>,
    /// Arguments
    pub arguments: Vec<Expression>,
    /// What the call syntactically stands for
    pub kind: FunctionCallKind,
}

/// A `new T` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    /// Type name as written
    pub type_name: String,
    /// The created contract, `None` when creating arrays or `bytes`
    pub contract: Option<AstId>,
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Literal value
    Literal(String),
    /// Elementary type name, as used in type conversions
    ElementaryTypeName(String),
    /// Identifier
    Identifier(Identifier),
    /// Member access
    MemberAccess(MemberAccess),
    /// Call
    FunctionCall(FunctionCall),
    /// `new T`
    New(NewExpression),
    /// `base[index]`
    IndexAccess {
        /// Indexed expression
        base: Box<Expression>,
        /// Index, `None` for `T[]` type expressions
        index: Option<Box<Expression>>,
    },
    /// Prefix or postfix operation
    UnaryOperation {
        /// Operator
        operator: String,
        /// Operand
        sub_expression: Box<Expression>,
    },
    /// Binary operation
    BinaryOperation {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: String,
        /// Right operand
        right: Box<Expression>,
    },
    /// Assignment, plain or compound
    Assignment {
        /// Assigned location
        left: Box<Expression>,
        /// Operator, `=` or compound
        operator: String,
        /// Assigned value
        right: Box<Expression>,
    },
    /// `condition ? true_expression : false_expression`
    Conditional {
        /// Condition
        condition: Box<Expression>,
        /// Value if true
        true_expression: Box<Expression>,
        /// Value if false
        false_expression: Box<Expression>,
    },
    /// Tuple or parenthesized expression, components may be omitted
    Tuple(Vec<Option<Expression>>),
}

/// An annotated expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The expression itself
    pub kind: ExpressionKind,
    /// Resolution annotation
    pub annotation: ExpressionAnnotation,
}

impl Expression {
    /// Creates an expression with an empty annotation
    #[must_use]
    pub fn new(kind: ExpressionKind) -> Self {
        Expression {
            kind,
            annotation: ExpressionAnnotation::default(),
        }
    }

    /// Sets the function type annotation
    #[must_use]
    pub fn with_function_type(mut self, function_type: FunctionTypeKind) -> Self {
        self.annotation.function_type = Some(function_type);
        self
    }

    /// Marks the expression as the immediate callee of a call
    #[must_use]
    pub fn called_directly(mut self) -> Self {
        self.annotation.called_directly = true;
        self
    }

    /// A literal
    #[must_use]
    pub fn literal(value: &str) -> Self {
        Self::new(ExpressionKind::Literal(value.to_string()))
    }

    /// An elementary type name
    #[must_use]
    pub fn type_name(name: &str) -> Self {
        Self::new(ExpressionKind::ElementaryTypeName(name.to_string()))
    }

    /// An identifier with the given resolution
    #[must_use]
    pub fn identifier(name: &str, referenced_declaration: Option<AstId>) -> Self {
        Self::new(ExpressionKind::Identifier(Identifier {
            name: name.to_string(),
            referenced_declaration,
            required_lookup: VirtualLookup::Virtual,
        }))
    }

    /// A reference to a state variable, local or constant
    #[must_use]
    pub fn variable(name: &str, variable: AstId) -> Self {
        Self::identifier(name, Some(variable))
    }

    /// A reference to a variable of internal function type (`fptr` in `fptr()`)
    #[must_use]
    pub fn function_pointer(name: &str, variable: AstId) -> Self {
        Self::variable(name, variable).with_function_type(FunctionTypeKind::Internal)
    }

    /// An internal function used as a value, `g` in `fptr = g`
    #[must_use]
    pub fn function_ref(name: &str, function: AstId) -> Self {
        Self::identifier(name, Some(function)).with_function_type(FunctionTypeKind::Internal)
    }

    /// A plain call `g(arguments)` of an internal function
    #[must_use]
    pub fn internal_call(name: &str, function: AstId, arguments: Vec<Expression>) -> Self {
        Self::call(Self::function_ref(name, function).called_directly(), arguments)
    }

    /// A qualified call `Qualifier.g(arguments)`, bypassing override dispatch
    #[must_use]
    pub fn static_call(
        qualifier: &str,
        name: &str,
        function: AstId,
        arguments: Vec<Expression>,
    ) -> Self {
        let callee = Self::member_access(
            Self::identifier(qualifier, None),
            name,
            Some(function),
            VirtualLookup::Static,
        )
        .with_function_type(FunctionTypeKind::Internal)
        .called_directly();
        Self::call(callee, arguments)
    }

    /// `super.g(arguments)` written inside contract `scope`
    ///
    /// `function` is the declaration the resolver found for `g` in the bases of `scope`.
    #[must_use]
    pub fn super_call(scope: AstId, name: &str, function: AstId, arguments: Vec<Expression>) -> Self {
        let callee = Self::member_access(
            Self::identifier("super", None),
            name,
            Some(function),
            VirtualLookup::Super { scope },
        )
        .with_function_type(FunctionTypeKind::Internal)
        .called_directly();
        Self::call(callee, arguments)
    }

    /// A message call `target.name(arguments)` to another contract
    #[must_use]
    pub fn external_call(
        target: Expression,
        name: &str,
        function: Option<AstId>,
        arguments: Vec<Expression>,
    ) -> Self {
        let callee = Self::member_access(target, name, function, VirtualLookup::Static)
            .with_function_type(FunctionTypeKind::External);
        Self::call(callee, arguments)
    }

    /// A call of a built-in such as `require` or `keccak256`
    #[must_use]
    pub fn builtin_call(name: &str, arguments: Vec<Expression>) -> Self {
        Self::call(
            Self::identifier(name, None).with_function_type(FunctionTypeKind::Builtin),
            arguments,
        )
    }

    /// The event call inside `emit E(arguments)`
    #[must_use]
    pub fn event_call(name: &str, event: AstId, arguments: Vec<Expression>) -> Self {
        Self::call(
            Self::identifier(name, Some(event)).with_function_type(FunctionTypeKind::Event),
            arguments,
        )
    }

    /// `new Contract(arguments)`
    #[must_use]
    pub fn new_contract(name: &str, contract: AstId, arguments: Vec<Expression>) -> Self {
        let callee = Self::new(ExpressionKind::New(NewExpression {
            type_name: name.to_string(),
            contract: Some(contract),
        }))
        .with_function_type(FunctionTypeKind::Creation);
        Self::call(callee, arguments)
    }

    /// A type conversion `type_name(argument)`
    #[must_use]
    pub fn type_conversion(type_name: &str, argument: Expression) -> Self {
        Self::new(ExpressionKind::FunctionCall(FunctionCall {
            expression: Box::new(Self::type_name(type_name)),
            arguments: vec![argument],
            kind: FunctionCallKind::TypeConversion,
        }))
    }

    /// A function call of an arbitrary callee, annotations taken as given
    #[must_use]
    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::FunctionCall(FunctionCall {
            expression: Box::new(callee),
            arguments,
            kind: FunctionCallKind::FunctionCall,
        }))
    }

    /// A member access
    #[must_use]
    pub fn member_access(
        expression: Expression,
        member_name: &str,
        referenced_declaration: Option<AstId>,
        required_lookup: VirtualLookup,
    ) -> Self {
        Self::new(ExpressionKind::MemberAccess(MemberAccess {
            expression: Box::new(expression),
            member_name: member_name.to_string(),
            referenced_declaration,
            required_lookup,
        }))
    }

    /// `base[index]`
    #[must_use]
    pub fn index(base: Expression, index: Expression) -> Self {
        Self::new(ExpressionKind::IndexAccess {
            base: Box::new(base),
            index: Some(Box::new(index)),
        })
    }

    /// `left operator right`
    #[must_use]
    pub fn binary(left: Expression, operator: &str, right: Expression) -> Self {
        Self::new(ExpressionKind::BinaryOperation {
            left: Box::new(left),
            operator: operator.to_string(),
            right: Box::new(right),
        })
    }

    /// `left = right`
    #[must_use]
    pub fn assign(left: Expression, right: Expression) -> Self {
        Self::new(ExpressionKind::Assignment {
            left: Box::new(left),
            operator: "=".to_string(),
            right: Box::new(right),
        })
    }

    /// `condition ? true_expression : false_expression`
    #[must_use]
    pub fn conditional(
        condition: Expression,
        true_expression: Expression,
        false_expression: Expression,
    ) -> Self {
        Self::new(ExpressionKind::Conditional {
            condition: Box::new(condition),
            true_expression: Box::new(true_expression),
            false_expression: Box::new(false_expression),
        })
    }

    /// Returns the function type annotation
    #[must_use]
    pub fn function_type(&self) -> Option<FunctionTypeKind> {
        self.annotation.function_type
    }

    /// Returns `true` if the expression is the direct callee of a call
    #[must_use]
    pub fn is_called_directly(&self) -> bool {
        self.annotation.called_directly
    }

    /// Returns the declaration an identifier or member access refers to
    #[must_use]
    pub fn referenced_declaration(&self) -> Option<AstId> {
        match &self.kind {
            ExpressionKind::Identifier(identifier) => identifier.referenced_declaration,
            ExpressionKind::MemberAccess(access) => access.referenced_declaration,
            _ => None,
        }
    }
}
