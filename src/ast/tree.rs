//! The declaration arena.
//!
//! [`Ast`] owns every declaration of a compilation and hands out borrowed views by
//! [`AstId`]. It is immutable once built, so any number of analyses (and threads)
//! can borrow it at the same time.

use crate::{
    ast::{
        AstId, Callable, ContractDefinition, Declaration, EventDefinition, FunctionDefinition,
        ModifierDefinition, VariableDeclaration,
    },
    Error, Result,
};

/// An immutable, fully resolved syntax tree.
///
/// Declarations are stored in a flat table indexed by their [`AstId`]; the id of a
/// declaration equals its slot, so lookups are O(1). Contracts are additionally
/// listed in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    declarations: Vec<Declaration>,
    contracts: Vec<AstId>,
}

macro_rules! declaration_getters {
    ($(($get:ident, $require:ident, $variant:ident, $ty:ty, $expected:literal)),* $(,)?) => {
        $(
            #[doc = concat!("Returns the ", $expected, " with the given id")]
            #[must_use]
            pub fn $get(&self, id: AstId) -> Option<&$ty> {
                match self.declaration(id)? {
                    Declaration::$variant(declaration) => Some(declaration),
                    _ => None,
                }
            }

            #[doc = concat!("Returns the ", $expected, " with the given id, or an error")]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns [`Error::DeclarationNotFound`] if the id does not resolve and"]
            #[doc = concat!("[`Error::UnexpectedDeclaration`] if it is not a ", $expected, ".")]
            pub fn $require(&self, id: AstId) -> Result<&$ty> {
                match self.declaration(id) {
                    Some(Declaration::$variant(declaration)) => Ok(declaration),
                    Some(_) => Err(Error::UnexpectedDeclaration {
                        id,
                        expected: $expected,
                    }),
                    None => Err(Error::DeclarationNotFound(id)),
                }
            }
        )*
    };
}

impl Ast {
    pub(crate) fn from_parts(declarations: Vec<Declaration>, contracts: Vec<AstId>) -> Self {
        Ast {
            declarations,
            contracts,
        }
    }

    /// Returns the declaration with the given id
    #[must_use]
    pub fn declaration(&self, id: AstId) -> Option<&Declaration> {
        self.declarations.get(id.index()?)
    }

    declaration_getters!(
        (contract, require_contract, Contract, ContractDefinition, "contract"),
        (function, require_function, Function, FunctionDefinition, "function"),
        (modifier, require_modifier, Modifier, ModifierDefinition, "modifier"),
        (event, require_event, Event, EventDefinition, "event"),
        (variable, require_variable, Variable, VariableDeclaration, "variable"),
    );

    /// Returns the function or modifier with the given id
    #[must_use]
    pub fn callable(&self, id: AstId) -> Option<Callable<'_>> {
        match self.declaration(id)? {
            Declaration::Function(function) => Some(Callable::Function(function)),
            Declaration::Modifier(modifier) => Some(Callable::Modifier(modifier)),
            _ => None,
        }
    }

    /// Returns the function or modifier with the given id, or an error
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeclarationNotFound`] if the id does not resolve and
    /// [`Error::UnexpectedDeclaration`] if it is neither a function nor a modifier.
    pub fn require_callable(&self, id: AstId) -> Result<Callable<'_>> {
        match self.declaration(id) {
            Some(Declaration::Function(function)) => Ok(Callable::Function(function)),
            Some(Declaration::Modifier(modifier)) => Ok(Callable::Modifier(modifier)),
            Some(_) => Err(Error::UnexpectedDeclaration {
                id,
                expected: "callable",
            }),
            None => Err(Error::DeclarationNotFound(id)),
        }
    }

    /// Returns all contracts in source order
    pub fn contracts(&self) -> impl Iterator<Item = &ContractDefinition> {
        self.contracts.iter().filter_map(|&id| self.contract(id))
    }

    /// Returns the first contract with the given name
    #[must_use]
    pub fn contract_by_name(&self, name: &str) -> Option<&ContractDefinition> {
        self.contracts().find(|contract| contract.name == name)
    }

    /// Returns the function called `name` declared directly in `contract`
    #[must_use]
    pub fn function_by_name(&self, contract: AstId, name: &str) -> Option<&FunctionDefinition> {
        self.contract(contract)?
            .functions
            .iter()
            .filter_map(|&id| self.function(id))
            .find(|function| function.name == name)
    }

    /// Returns all declarations in id order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Returns the number of declarations
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Returns `true` if the tree has no declarations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
