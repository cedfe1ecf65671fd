use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct Trigger<C> {
    pub callback: C,
    /// Bumped on every registration so a timer can tell it was replaced.
    pub generation: u64,
}

#[derive(Debug)]
struct TableState<C> {
    entries: HashMap<String, Trigger<C>>,
    next_generation: u64,
}

/// Named callbacks shared between the script runtime and timer threads.
///
/// Every method holds the lock only for the map operation itself. Callers
/// get clones of the callback and run them after the lock is released.
#[derive(Debug)]
pub struct TriggerTable<C> {
    state: Mutex<TableState<C>>,
}

impl<C: Clone> Default for TriggerTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> TriggerTable<C> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                entries: HashMap::new(),
                next_generation: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableState<C>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `callback` under `name`, replacing any previous entry, and return
    /// the generation assigned to it.
    pub fn register(&self, name: &str, callback: C) -> u64 {
        let mut state = self.lock();
        let generation = state.next_generation;
        state.next_generation += 1;
        state.entries.insert(
            name.to_string(),
            Trigger {
                callback,
                generation,
            },
        );
        generation
    }

    pub fn lookup(&self, name: &str) -> Option<Trigger<C>> {
        self.lock().entries.get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> bool {
        self.lock().entries.remove(name).is_some()
    }

    /// Remove `name` only if it still holds the given registration.
    pub fn remove_if_generation(&self, name: &str, generation: u64) -> bool {
        let mut state = self.lock();
        match state.entries.get(name) {
            Some(trigger) if trigger.generation == generation => {
                state.entries.remove(name);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
