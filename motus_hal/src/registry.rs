//! Joint registry.
//!
//! Owns every joint cell of a hardware backend and hands out handles by name.
//! Constructed at startup and passed by reference; no global state.

use motus_common::hal::{
    CommandInterface, HalError, JointHandle, JointState, LookupError, ResourceDirectory,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct Entry {
    name: Arc<str>,
    interface: CommandInterface,
    state: Arc<JointState>,
}

/// Registry of named joints.
#[derive(Default)]
pub struct JointRegistry {
    entries: Vec<Entry>,
    index: HashMap<Arc<str>, usize>,
}

impl JointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a joint and return its shared cell.
    ///
    /// # Errors
    /// Returns `HalError::DuplicateJoint` if the name is already registered.
    pub fn register(
        &mut self,
        name: &str,
        interface: CommandInterface,
        initial_position: f64,
    ) -> Result<Arc<JointState>, HalError> {
        if self.index.contains_key(name) {
            return Err(HalError::DuplicateJoint(name.to_string()));
        }
        let name: Arc<str> = Arc::from(name);
        let state = Arc::new(JointState::new(initial_position));
        self.index.insert(Arc::clone(&name), self.entries.len());
        self.entries.push(Entry {
            name,
            interface,
            state: Arc::clone(&state),
        });
        Ok(state)
    }

    /// Number of registered joints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no joint is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shared cell of a registered joint.
    pub fn state(&self, name: &str) -> Option<&Arc<JointState>> {
        self.index.get(name).map(|&i| &self.entries[i].state)
    }
}

impl ResourceDirectory for JointRegistry {
    fn lookup(&self, name: &str, interface: CommandInterface) -> Result<JointHandle, LookupError> {
        let Some(&i) = self.index.get(name) else {
            return Err(LookupError::NotFound {
                name: name.to_string(),
            });
        };
        let entry = &self.entries[i];
        if entry.interface != interface {
            return Err(LookupError::WrongInterface {
                name: name.to_string(),
                requested: interface,
                actual: entry.interface,
            });
        }
        debug!("Handing out {} handle for joint '{}'", interface, name);
        Ok(JointHandle::new(
            Arc::clone(&entry.name),
            entry.interface,
            Arc::clone(&entry.state),
        ))
    }

    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.to_string()).collect()
    }
}
