use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::{stdlib, value::Function};

/// Symbol table shared by every evaluation of a session.
///
/// Constants are fixed at construction. Variables and functions live behind
/// their own `RwLock`, so an `Arc<Environment>` can be handed to any number of
/// threads; every method takes `&self`.
#[derive(Debug)]
pub struct Environment {
    constants: IndexMap<String, f64>,
    variables: RwLock<IndexMap<String, f64>>,
    functions: RwLock<IndexMap<String, Function>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment seeded with the standard constants and
    /// built-in functions.
    pub fn new() -> Self {
        let env = Self {
            constants: stdlib::constants(),
            variables: RwLock::new(IndexMap::new()),
            functions: RwLock::new(IndexMap::new()),
        };
        stdlib::install(&env);
        env
    }

    /// Creates an environment with the standard constants but no functions.
    pub fn bare() -> Self {
        Self {
            constants: stdlib::constants(),
            variables: RwLock::new(IndexMap::new()),
            functions: RwLock::new(IndexMap::new()),
        }
    }

    fn read_variables(&self) -> RwLockReadGuard<'_, IndexMap<String, f64>> {
        self.variables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_variables(&self) -> RwLockWriteGuard<'_, IndexMap<String, f64>> {
        self.variables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_functions(&self) -> RwLockReadGuard<'_, IndexMap<String, Function>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_functions(&self) -> RwLockWriteGuard<'_, IndexMap<String, Function>> {
        self.functions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks `name` up as a variable first, then as a constant.
    pub fn lookup(&self, name: &str) -> Option<f64> {
        if let Some(value) = self.read_variables().get(name) {
            return Some(*value);
        }
        self.constants.get(name).copied()
    }

    pub fn lookup_constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    /// Returns a handle to the function registered under `name`.
    pub fn lookup_function(&self, name: &str) -> Option<Function> {
        self.read_functions().get(name).cloned()
    }

    /// Defines or overwrites a variable. Returns the previous value, if any.
    pub fn assign_variable(&self, name: impl Into<String>, value: f64) -> Option<f64> {
        let name = name.into();
        tracing::debug!(%name, value, "assigning variable");
        self.write_variables().insert(name, value)
    }

    /// Removes a variable, unshadowing any constant of the same name.
    pub fn remove_variable(&self, name: &str) -> Option<f64> {
        self.write_variables().shift_remove(name)
    }

    /// Registers a function under `name`, replacing any existing one.
    pub fn assign_function(&self, name: impl Into<String>, function: Function) -> Option<Function> {
        let name = name.into();
        tracing::debug!(%name, arity = function.arity, "registering function");
        self.write_functions().insert(name, function)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.read_functions().contains_key(name)
    }

    /// Snapshot of all variables in definition order.
    pub fn variables(&self) -> IndexMap<String, f64> {
        self.read_variables().clone()
    }

    pub fn constants(&self) -> &IndexMap<String, f64> {
        &self.constants
    }

    /// Registered functions as `(name, arity)` pairs in registration order.
    pub fn function_signatures(&self) -> Vec<(String, usize)> {
        self.read_functions()
            .iter()
            .map(|(name, function)| (name.clone(), function.arity))
            .collect()
    }
}
