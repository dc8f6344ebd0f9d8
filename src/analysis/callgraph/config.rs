//! Call graph construction configuration
//!
//! This module provides the options that change which edges the builders add
//! and how a whole program is processed.

/// Configuration for call graph construction
///
/// The defaults reproduce what a compiler needs for code generation: function
/// pointers stored during construction stay callable after deployment, and the
/// contracts of a program are processed in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallGraphConfig {
    /// Carry the internal dispatch targets of the creation graph into the deployment graph
    /// Only applies when the deployed code can call through a function pointer at all
    pub carry_creation_dispatch: bool,

    /// Build the graphs of independent contracts concurrently (program builds only)
    pub parallel: bool,
}

impl Default for CallGraphConfig {
    fn default() -> Self {
        Self {
            carry_creation_dispatch: true,
            parallel: true,
        }
    }
}

impl CallGraphConfig {
    /// Creates a configuration that keeps the two graph variants fully independent
    ///
    /// Deployment graphs only contain what deployed code reaches on its own, which
    /// may miss functions called through pointers stored by a constructor.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            carry_creation_dispatch: false,
            ..Self::default()
        }
    }

    /// Creates a configuration that processes contracts one after another
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}
