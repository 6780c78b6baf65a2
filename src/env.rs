// ABOUTME: Environments, symbols, refcounted handles and the global scope

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A named location with three slots: variable value, function value and
/// property list. Each slot holds `Nil` while unset. Symbols are owned by
/// exactly one environment at a time; `home` tracks it as the symbol
/// migrates between scopes.
#[derive(Debug)]
pub struct Symbol {
    name: String,
    value: RefCell<Value>,
    function: RefCell<Value>,
    property_list: RefCell<Value>,
    home: RefCell<Weak<Environment>>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A symbol whose three slots are all `Nil` carries no information
    /// and may be dropped once its refcount reaches zero.
    fn is_useless(&self) -> bool {
        matches!(*self.value.borrow(), Value::Nil)
            && matches!(*self.function.borrow(), Value::Nil)
            && matches!(*self.property_list.borrow(), Value::Nil)
    }
}

/// Shared owner of a symbol. Cloning registers another reference with the
/// owning environment; dropping runs `release`, which is the only point
/// where symbols are removed.
pub struct SymbolHandle {
    sym: Rc<Symbol>,
}

impl SymbolHandle {
    pub fn name(&self) -> &str {
        self.sym.name()
    }

    /// The value slot, signalling `void-variable` while unset.
    pub fn value(&self) -> Result<Value, EvalError> {
        let value = self.sym.value.borrow().clone();
        match value {
            Value::Nil => Err(EvalError::VoidVariable(self.sym.name.clone())),
            value => Ok(value),
        }
    }

    /// The function slot, signalling `void-function` while unset.
    pub fn function(&self) -> Result<Value, EvalError> {
        let function = self.sym.function.borrow().clone();
        match function {
            Value::Nil => Err(EvalError::VoidFunction(self.sym.name.clone())),
            function => Ok(function),
        }
    }

    pub fn set_value(&self, value: Value) {
        *self.sym.value.borrow_mut() = value;
    }

    pub fn set_function(&self, function: Value) {
        *self.sym.function.borrow_mut() = function;
    }

    pub fn property_list(&self) -> Value {
        self.sym.property_list.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &SymbolHandle) -> bool {
        Rc::ptr_eq(&self.sym, &other.sym)
    }

    fn home(&self) -> Option<Rc<Environment>> {
        self.sym.home.borrow().upgrade()
    }
}

impl Clone for SymbolHandle {
    fn clone(&self) -> Self {
        if let Some(env) = self.home() {
            env.retain(&self.sym);
        }
        SymbolHandle {
            sym: self.sym.clone(),
        }
    }
}

impl Drop for SymbolHandle {
    fn drop(&mut self) {
        if let Some(env) = self.home() {
            env.release(&self.sym);
        }
    }
}

impl fmt::Debug for SymbolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolHandle")
            .field("name", &self.sym.name)
            .finish()
    }
}

#[derive(Debug)]
struct SymbolEntry {
    sym: Rc<Symbol>,
    /// Number of live handles to the symbol.
    refcount: usize,
}

/// A symbol table with an optional parent scope. Lookups walk the parent
/// chain; fresh symbols are created in the root. The environment owns the
/// storage of each symbol and counts the handles given out.
#[derive(Debug)]
pub struct Environment {
    parent: Option<Rc<Environment>>,
    table: RefCell<HashMap<String, SymbolEntry>>,
}

impl Environment {
    /// Creates a root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            parent: None,
            table: RefCell::new(HashMap::new()),
        })
    }

    /// Creates a child scope of `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            parent: Some(parent),
            table: RefCell::new(HashMap::new()),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Fetches the named symbol. A local hit registers another handle;
    /// otherwise the parent chain is consulted, and a miss at the root
    /// creates a fresh symbol with all slots unset.
    pub fn get(self: &Rc<Self>, name: &str) -> SymbolHandle {
        {
            let mut table = self.table.borrow_mut();
            if let Some(entry) = table.get_mut(name) {
                entry.refcount += 1;
                return SymbolHandle {
                    sym: entry.sym.clone(),
                };
            }
        }
        if let Some(parent) = &self.parent {
            return parent.get(name);
        }
        self.insert_new(name)
    }

    /// Creates the symbol strictly in this scope, without consulting the
    /// parent. Meant for fresh lexical bindings such as function
    /// parameters; an existing local entry is a caller logic error.
    pub fn create(self: &Rc<Self>, name: &str) -> Result<SymbolHandle, EvalError> {
        if self.table.borrow().contains_key(name) {
            return Err(EvalError::DuplicateBinding(name.to_string()));
        }
        Ok(self.insert_new(name))
    }

    fn insert_new(self: &Rc<Self>, name: &str) -> SymbolHandle {
        let sym = Rc::new(Symbol {
            name: name.to_string(),
            value: RefCell::new(Value::Nil),
            function: RefCell::new(Value::Nil),
            property_list: RefCell::new(Value::Nil),
            home: RefCell::new(Rc::downgrade(self)),
        });
        self.table.borrow_mut().insert(
            name.to_string(),
            SymbolEntry {
                sym: sym.clone(),
                refcount: 1,
            },
        );
        SymbolHandle { sym }
    }

    fn retain(&self, sym: &Rc<Symbol>) {
        if let Some(entry) = self.table.borrow_mut().get_mut(sym.name()) {
            if Rc::ptr_eq(&entry.sym, sym) {
                entry.refcount += 1;
            }
        }
    }

    /// Drops one reference. At zero a useless symbol is removed from the
    /// table. The identity check keeps a stale handle from decrementing a
    /// different symbol that later took the same name.
    fn release(&self, sym: &Rc<Symbol>) {
        let mut table = self.table.borrow_mut();
        let remove = match table.get_mut(sym.name()) {
            Some(entry) if Rc::ptr_eq(&entry.sym, sym) => {
                debug_assert!(entry.refcount > 0);
                entry.refcount = entry.refcount.saturating_sub(1);
                entry.refcount == 0 && entry.sym.is_useless()
            }
            _ => false,
        };
        let removed = if remove { table.remove(sym.name()) } else { None };
        // The removed entry is dropped outside the table borrow; its
        // slots may hold handles into this same table.
        drop(table);
        drop(removed);
    }

    /// Ends this scope. Symbols still referenced from outside migrate
    /// into the parent so that closures keep resolving them; everything
    /// else is dropped. Run by function application after the body.
    pub fn teardown(self: &Rc<Self>) {
        let entries: Vec<(String, SymbolEntry)> = self.table.borrow_mut().drain().collect();
        for (name, entry) in entries {
            if entry.refcount == 0 {
                continue;
            }
            let Some(parent) = &self.parent else {
                continue;
            };
            *entry.sym.home.borrow_mut() = Rc::downgrade(parent);
            let mut detached = None;
            {
                let mut table = parent.table.borrow_mut();
                match table.entry(name) {
                    Entry::Vacant(slot) => {
                        slot.insert(entry);
                    }
                    Entry::Occupied(_) => {
                        // The parent already has a binding for this name,
                        // e.g. a parameter that shadowed a global. The
                        // migrating symbol is detached: its handles keep
                        // it alive, release becomes a no-op.
                        *entry.sym.home.borrow_mut() = Weak::new();
                        detached = Some(entry);
                    }
                }
            }
            drop(detached);
        }
    }

    #[cfg(test)]
    fn local_refcount(&self, name: &str) -> Option<usize> {
        self.table.borrow().get(name).map(|e| e.refcount)
    }

    #[cfg(test)]
    fn contains_local(&self, name: &str) -> bool {
        self.table.borrow().contains_key(name)
    }
}

thread_local! {
    static GLOBAL_ENV: Rc<Environment> = {
        log::debug!("initializing global environment");
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        env
    };
}

/// The process-wide global environment. Initialized lazily on first
/// request; the built-in bindings are installed exactly once.
pub fn global_env() -> Rc<Environment> {
    GLOBAL_ENV.with(|env| env.clone())
}
