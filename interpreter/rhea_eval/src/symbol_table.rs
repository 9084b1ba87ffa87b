//! Lexical scope chain with advisory locks and async task handles.
//!
//! A scope is shared by handle: cloning a `SymbolTable` clones the `Arc`,
//! not the scope. Resolution order is preserved from the original
//! implementation: reads prefer the parent chain, writes update the
//! innermost scope already holding the name (silently dropped when that
//! binding is locked) and otherwise create the binding locally.
//!
//! Locks are advisory and scope-keyed: `lock` tags the binding with the
//! requesting scope's random id, and only that scope can unlock it. A
//! locked binding rejects writes silently; reads are unaffected. There is
//! no blocking.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};
use rhea_ir::Token;
use rustc_hash::FxHashMap;

use crate::signal::{EvalResult, Unwind};
use crate::value::Value;

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    locked: bool,
    owner: String,
}

#[derive(Debug)]
struct Inner {
    /// Random identifier; advisory locks record it as the owner key.
    id: String,
    parent: Option<SymbolTable>,
    /// Shared with task clones; guarded for concurrent task access.
    bindings: Arc<RwLock<FxHashMap<String, Binding>>>,
    /// Pending parallel tasks spawned in this scope.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// A handle to one scope in the chain.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    inner: Arc<Inner>,
}

fn unique_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl SymbolTable {
    /// A fresh root scope.
    pub fn new() -> Self {
        SymbolTable {
            inner: Arc::new(Inner {
                id: unique_key(),
                parent: None,
                bindings: Arc::new(RwLock::new(FxHashMap::default())),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A child scope for blocks, calls, and catch-handle bodies.
    pub fn with_parent(parent: &SymbolTable) -> Self {
        SymbolTable {
            inner: Arc::new(Inner {
                id: unique_key(),
                parent: Some(parent.clone()),
                bindings: Arc::new(RwLock::new(FxHashMap::default())),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The scope handed to a parallel task: fresh id, same parent link,
    /// bindings map shared by reference, its own empty task list.
    pub fn task_clone(&self) -> Self {
        SymbolTable {
            inner: Arc::new(Inner {
                id: unique_key(),
                parent: self.inner.parent.clone(),
                bindings: Arc::clone(&self.inner.bindings),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    fn holds_locally(&self, name: &str) -> bool {
        self.inner.bindings.read().contains_key(name)
    }

    /// Is `name` bound anywhere in this chain?
    pub fn has(&self, name: &str) -> bool {
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.has(name))
            || self.holds_locally(name)
    }

    /// Resolve `name`, preferring the parent chain over local bindings.
    pub fn get(&self, reference: &Token, name: &str) -> EvalResult {
        if let Some(parent) = &self.inner.parent {
            if parent.has(name) {
                return parent.get(reference, name);
            }
        }

        let bindings = self.inner.bindings.read();
        match bindings.get(name) {
            Some(binding) => Ok(binding.value.clone()),
            None => Err(Unwind::node(
                reference,
                format!("Cannot resolve symbol: {name}"),
            )),
        }
    }

    /// Bind `name`, updating the innermost scope that already holds it.
    ///
    /// A locked binding drops the write silently.
    pub fn set(&self, name: &str, value: Value) {
        {
            let mut bindings = self.inner.bindings.write();
            if let Some(binding) = bindings.get_mut(name) {
                if binding.locked {
                    return;
                }
                binding.value = value;
                return;
            }
        }

        if let Some(parent) = &self.inner.parent {
            if parent.has(name) {
                parent.set(name, value);
                return;
            }
        }

        self.inner.bindings.write().insert(
            name.to_string(),
            Binding {
                value,
                locked: false,
                owner: String::new(),
            },
        );
    }

    fn remove_silent(&self, name: &str) {
        if let Some(parent) = &self.inner.parent {
            if parent.has(name) {
                parent.remove_silent(name);
                return;
            }
        }

        let mut bindings = self.inner.bindings.write();
        if bindings.get(name).is_some_and(|binding| !binding.locked) {
            bindings.remove(name);
        }
    }

    /// Remove a binding; unknown names are a structural error, locked
    /// bindings stay put silently.
    pub fn remove(&self, reference: &Token) -> Result<(), Unwind> {
        let name = reference.image();

        if let Some(parent) = &self.inner.parent {
            if parent.has(name) {
                parent.remove_silent(name);
                return Ok(());
            }
        }

        if self.holds_locally(name) {
            let mut bindings = self.inner.bindings.write();
            if bindings.get(name).is_some_and(|binding| !binding.locked) {
                bindings.remove(name);
            }
            return Ok(());
        }

        Err(Unwind::node(
            reference,
            format!("Cannot remove symbol: {name}"),
        ))
    }

    /// Advisory-lock `name` for `requester`; a no-op when the name is
    /// missing or already locked.
    pub fn lock(&self, name: &str, requester: &SymbolTable) {
        if !self.has(name) {
            return;
        }

        {
            let mut bindings = self.inner.bindings.write();
            if let Some(binding) = bindings.get_mut(name) {
                if binding.locked {
                    return;
                }
                binding.owner = requester.id().to_string();
                binding.locked = true;
                return;
            }
        }

        if let Some(parent) = &self.inner.parent {
            parent.lock(name, requester);
        }
    }

    /// Release an advisory lock; only the owning scope's unlock succeeds.
    pub fn unlock(&self, name: &str, requester: &SymbolTable) {
        if !self.has(name) {
            return;
        }

        {
            let mut bindings = self.inner.bindings.write();
            if let Some(binding) = bindings.get_mut(name) {
                if binding.owner == requester.id() {
                    binding.locked = false;
                    binding.owner = String::new();
                    return;
                }
            }
        }

        if let Some(parent) = &self.inner.parent {
            parent.unlock(name, requester);
        }
    }

    /// Lock state of a binding in this scope's chain, for diagnostics and
    /// tests: `(locked, owner)`.
    pub fn lock_state(&self, name: &str) -> Option<(bool, String)> {
        {
            let bindings = self.inner.bindings.read();
            if let Some(binding) = bindings.get(name) {
                return Some((binding.locked, binding.owner.clone()));
            }
        }
        self.inner
            .parent
            .as_ref()
            .and_then(|parent| parent.lock_state(name))
    }

    /// Register a spawned parallel task in this scope.
    pub fn add_task(&self, handle: JoinHandle<()>) {
        self.inner.tasks.lock().push(handle);
    }

    /// How many tasks are pending in this scope alone.
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// Join every pending task, children before parent. The task-list
    /// lock is released around each join so a task can still spawn into
    /// this scope while we drain it.
    pub fn wait_for_tasks(&self) {
        loop {
            let handle = self.inner.tasks.lock().pop();
            match handle {
                Some(handle) => {
                    let _ = handle.join();
                }
                None => break,
            }
        }

        if let Some(parent) = &self.inner.parent {
            parent.wait_for_tasks();
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rhea_ir::TokenCategory;

    fn token(name: &str) -> Token {
        Token::new(name, "test.rhea", 1, 1, TokenCategory::Identifier)
    }

    #[test]
    fn set_then_get_round_trips() {
        let scope = SymbolTable::new();
        scope.set("x", Value::Number(1.0));
        assert_eq!(scope.get(&token("x"), "x").ok(), Some(Value::Number(1.0)));
    }

    #[test]
    fn unknown_name_is_a_structural_error() {
        let scope = SymbolTable::new();
        assert!(matches!(
            scope.get(&token("ghost"), "ghost"),
            Err(Unwind::Node(_))
        ));
    }

    #[test]
    fn reads_prefer_the_parent_chain() {
        let outer = SymbolTable::new();
        outer.set("x", Value::Number(1.0));

        let inner = SymbolTable::with_parent(&outer);
        // A set through the child updates the outer holder rather than
        // shadowing it.
        inner.set("x", Value::Number(2.0));

        assert_eq!(outer.get(&token("x"), "x").ok(), Some(Value::Number(2.0)));
        assert_eq!(inner.get(&token("x"), "x").ok(), Some(Value::Number(2.0)));
    }

    #[test]
    fn fresh_names_bind_locally() {
        let outer = SymbolTable::new();
        let inner = SymbolTable::with_parent(&outer);
        inner.set("y", Value::Number(5.0));

        assert!(inner.has("y"));
        assert!(!outer.has("y"));
    }

    #[test]
    fn locked_bindings_drop_writes_silently() {
        let scope = SymbolTable::new();
        scope.set("x", Value::Number(1.0));
        scope.lock("x", &scope);

        scope.set("x", Value::Number(2.0));
        assert_eq!(scope.get(&token("x"), "x").ok(), Some(Value::Number(1.0)));

        scope.unlock("x", &scope);
        scope.set("x", Value::Number(3.0));
        assert_eq!(scope.get(&token("x"), "x").ok(), Some(Value::Number(3.0)));
    }

    #[test]
    fn only_the_owner_can_unlock() {
        let scope = SymbolTable::new();
        scope.set("x", Value::Number(1.0));

        let stranger = SymbolTable::new();
        scope.lock("x", &scope);
        scope.unlock("x", &stranger);

        assert_eq!(scope.lock_state("x"), Some((true, scope.id().to_string())));

        scope.unlock("x", &scope);
        assert_eq!(scope.lock_state("x"), Some((false, String::new())));
    }

    #[test]
    fn locking_an_unknown_name_is_a_no_op() {
        let scope = SymbolTable::new();
        scope.lock("missing", &scope);
        assert_eq!(scope.lock_state("missing"), None);
    }

    #[test]
    fn remove_walks_the_chain_and_skips_locked() {
        let outer = SymbolTable::new();
        outer.set("x", Value::Number(1.0));
        let inner = SymbolTable::with_parent(&outer);

        assert!(inner.remove(&token("x")).is_ok());
        assert!(!outer.has("x"));

        outer.set("y", Value::Number(2.0));
        outer.lock("y", &outer);
        assert!(outer.remove(&token("y")).is_ok());
        assert!(outer.has("y"));

        assert!(inner.remove(&token("ghost")).is_err());
    }

    #[test]
    fn task_clone_shares_bindings_but_not_tasks() {
        let scope = SymbolTable::new();
        scope.set("shared", Value::Number(1.0));

        let clone = scope.task_clone();
        assert_ne!(scope.id(), clone.id());

        clone.set("shared", Value::Number(9.0));
        assert_eq!(
            scope.get(&token("shared"), "shared").ok(),
            Some(Value::Number(9.0))
        );

        scope.add_task(std::thread::spawn(|| {}));
        assert_eq!(scope.pending_tasks(), 1);
        assert_eq!(clone.pending_tasks(), 0);

        scope.wait_for_tasks();
        assert_eq!(scope.pending_tasks(), 0);
    }

    #[test]
    fn wait_drains_children_then_parent() {
        let parent = SymbolTable::new();
        let child = SymbolTable::with_parent(&parent);

        parent.add_task(std::thread::spawn(|| {}));
        child.add_task(std::thread::spawn(|| {}));

        child.wait_for_tasks();
        assert_eq!(child.pending_tasks(), 0);
        assert_eq!(parent.pending_tasks(), 0);
    }
}
