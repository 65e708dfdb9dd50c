//! Component change hooks.
//!
//! A hook is registered for one component key and runs synchronously after
//! every add, overwrite, or removal of that key on any entity of its World.
//! It receives the entity, the old value and the new value; `None` stands
//! for "absent".

use std::collections::HashMap;
use std::fmt;

use kindred_foundation::{ComponentKey, Entity, Value};

/// Callback run when a component changes.
pub type ComponentHook = Box<dyn FnMut(Entity, Option<&Value>, Option<&Value>)>;

/// Handle returned on registration, used to remove the hook again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

/// The hooks of one World.
#[derive(Default)]
pub struct ChangeHooks {
    next: u64,
    hooks: HashMap<ComponentKey, Vec<(HookId, ComponentHook)>>,
}

impl ChangeHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for `key`. Hooks for one key run in registration order.
    pub fn register(&mut self, key: ComponentKey, hook: ComponentHook) -> HookId {
        let id = HookId(self.next);
        self.next += 1;
        self.hooks.entry(key).or_default().push((id, hook));
        id
    }

    /// Removes a hook. Returns false if it was not registered.
    pub fn remove(&mut self, id: HookId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (key, hooks) in &mut self.hooks {
            if let Some(pos) = hooks.iter().position(|(hid, _)| *hid == id) {
                hooks.remove(pos);
                found = true;
                if hooks.is_empty() {
                    emptied = Some(key.clone());
                }
                break;
            }
        }
        if let Some(key) = emptied {
            self.hooks.remove(&key);
        }
        found
    }

    /// Runs every hook registered for `key`.
    pub fn notify(&mut self, key: &ComponentKey, entity: Entity, old: Option<&Value>, new: Option<&Value>) {
        if let Some(hooks) = self.hooks.get_mut(key) {
            for (_, hook) in hooks {
                hook(entity, old, new);
            }
        }
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    /// Returns true if no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for ChangeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHooks")
            .field("keys", &self.hooks.keys().collect::<Vec<_>>())
            .field("len", &self.len())
            .finish()
    }
}
