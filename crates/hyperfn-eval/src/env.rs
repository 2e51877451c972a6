//! Scoped variable environment for the evaluator.

use std::collections::BTreeMap;

use crate::value::Value;

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// Scoped variable environment with push/pop semantics.
///
/// Variables are looked up from the innermost local scope outward, then in
/// the globals. `define` always creates in the innermost scope. A call
/// swaps out the caller's locals so the callee only sees its own frame and
/// the globals.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    globals: Scope,
    scopes: Vec<Scope>,
}

/// The caller's local scopes while a callee runs.
#[derive(Debug)]
pub struct SavedFrame(Vec<Scope>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new scope (blocks, call frames).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost local scope. The globals are never popped.
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Start a call: the current locals are set aside and one empty scope
    /// is pushed for the callee.
    pub fn enter_call(&mut self) -> SavedFrame {
        let saved = std::mem::take(&mut self.scopes);
        self.push_scope();
        SavedFrame(saved)
    }

    /// Finish a call and restore the caller's locals.
    pub fn leave_call(&mut self, frame: SavedFrame) {
        self.scopes = frame.0;
    }

    /// Define a variable in the innermost scope, or in the globals when no
    /// local scope is open.
    pub fn define(&mut self, name: &str, value: Value) {
        let scope = self.scopes.last_mut().unwrap_or(&mut self.globals);
        scope.bindings.insert(name.to_string(), value);
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .chain(std::iter::once(&self.globals))
            .find_map(|scope| scope.bindings.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.scopes
            .iter_mut()
            .rev()
            .chain(std::iter::once(&mut self.globals))
            .find_map(|scope| scope.bindings.get_mut(name))
    }

    /// Update a variable in the first scope where it exists.
    /// Returns `true` if found and updated, `false` if not found.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_and_pops() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        env.push_scope();
        env.define("x", Value::Int(2));
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn set_updates_the_defining_scope() {
        let mut env = Environment::new();
        env.push_scope();
        env.define("x", Value::Int(1));
        env.push_scope();
        assert!(env.set("x", Value::Int(5)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(5)));
        assert!(!env.set("missing", Value::Null));
    }

    #[test]
    fn call_frames_hide_caller_locals() {
        let mut env = Environment::new();
        env.define("global", Value::Bool(true));
        env.push_scope();
        env.define("local", Value::Int(1));
        let frame = env.enter_call();
        assert!(env.get("local").is_none());
        assert_eq!(env.get("global"), Some(&Value::Bool(true)));
        env.leave_call(frame);
        assert_eq!(env.get("local"), Some(&Value::Int(1)));
    }
}
