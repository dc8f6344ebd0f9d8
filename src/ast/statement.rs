use crate::ast::Expression;

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// Statements in source order
    pub statements: Vec<Statement>,
}

impl Block {
    /// Creates a block from statements
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }

    /// Returns `true` if any statement, at any depth, is a `_;` placeholder
    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        self.statements.iter().any(Statement::contains_placeholder)
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Nested block
    Block(Block),
    /// `unchecked { ... }`
    UncheckedBlock(Block),
    /// `_;` inside a modifier body
    Placeholder,
    /// Expression statement
    Expression(Expression),
    /// Local variable declaration, `(a, b) = value` or `uint x = value`
    VariableDeclaration {
        /// Declared local names
        names: Vec<String>,
        /// Initial value
        initial_value: Option<Expression>,
    },
    /// `if (condition) true_body else false_body`
    If {
        /// Condition
        condition: Expression,
        /// Taken branch
        true_body: Box<Statement>,
        /// Else branch
        false_body: Option<Box<Statement>>,
    },
    /// `while` and `do ... while` loops
    While {
        /// Loop condition
        condition: Expression,
        /// Loop body
        body: Box<Statement>,
        /// `do { body } while (condition)`
        is_do_while: bool,
    },
    /// `for (init; condition; loop_expression) body`
    For {
        /// Initialization statement
        init: Option<Box<Statement>>,
        /// Condition
        condition: Option<Expression>,
        /// Expression evaluated after every iteration
        loop_expression: Option<Expression>,
        /// Loop body
        body: Box<Statement>,
    },
    /// `return value`
    Return(Option<Expression>),
    /// `emit E(...)`, holding the event call
    Emit(Expression),
    /// `revert E(...)`, holding the error call
    Revert(Expression),
    /// `break`
    Break,
    /// `continue`
    Continue,
}

impl Statement {
    /// Creates an expression statement
    #[must_use]
    pub fn expression(expression: Expression) -> Self {
        Statement::Expression(expression)
    }

    /// Returns `true` if this statement is, or contains, a `_;` placeholder
    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        match self {
            Statement::Placeholder => true,
            Statement::Block(block) | Statement::UncheckedBlock(block) => {
                block.contains_placeholder()
            }
            Statement::If {
                true_body,
                false_body,
                ..
            } => {
                true_body.contains_placeholder()
                    || false_body
                        .as_ref()
                        .is_some_and(|body| body.contains_placeholder())
            }
            Statement::While { body, .. } => body.contains_placeholder(),
            Statement::For { init, body, .. } => {
                body.contains_placeholder()
                    || init.as_ref().is_some_and(|init| init.contains_placeholder())
            }
            Statement::Expression(_)
            | Statement::VariableDeclaration { .. }
            | Statement::Return(_)
            | Statement::Emit(_)
            | Statement::Revert(_)
            | Statement::Break
            | Statement::Continue => false,
        }
    }
}
