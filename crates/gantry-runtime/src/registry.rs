use crate::{Accelerator, ConfigurationError};
use std::sync::Arc;

static GLOBAL: AcceleratorRegistry = AcceleratorRegistry::new();

/// Registered accelerator.
#[derive(new, Debug, Clone)]
pub struct RegistryEntry {
    /// The name used to select the accelerator.
    pub name: String,
    /// The accelerator.
    pub accelerator: Arc<dyn Accelerator>,
    /// Free-form description shown to users.
    pub description: String,
}

/// Maps backend names to [accelerators](Accelerator).
///
/// Entries keep their registration order, which is also the preference order used when the
/// user asks for `"auto"`. Names are matched case-insensitively.
#[derive(Debug)]
pub struct AcceleratorRegistry {
    entries: spin::Mutex<Vec<RegistryEntry>>,
}

impl Default for AcceleratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AcceleratorRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: spin::Mutex::new(Vec::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static AcceleratorRegistry {
        &GLOBAL
    }

    /// Register an accelerator under the given name.
    ///
    /// Fails if the name is already taken, see [register_override](Self::register_override)
    /// to replace an existing entry.
    pub fn register<A: Accelerator>(
        &self,
        name: &str,
        accelerator: A,
        description: &str,
    ) -> Result<(), ConfigurationError> {
        let mut entries = self.entries.lock();
        let name = normalize(name);

        if entries.iter().any(|entry| entry.name == name) {
            return Err(ConfigurationError::AlreadyRegistered { name });
        }

        log::debug!("Registering accelerator `{name}`");
        entries.push(RegistryEntry::new(
            name,
            Arc::new(accelerator),
            description.to_string(),
        ));

        Ok(())
    }

    /// Register an accelerator, replacing any accelerator already registered under the name.
    ///
    /// A replaced entry keeps its position in the preference order.
    pub fn register_override<A: Accelerator>(&self, name: &str, accelerator: A, description: &str) {
        let mut entries = self.entries.lock();
        let entry = RegistryEntry::new(normalize(name), Arc::new(accelerator), description.to_string());

        match entries.iter_mut().find(|current| current.name == entry.name) {
            Some(current) => {
                log::debug!("Replacing accelerator `{}`", entry.name);
                *current = entry;
            }
            None => entries.push(entry),
        }
    }

    /// Get the accelerator registered under the given name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Accelerator>> {
        self.entry(name).map(|entry| entry.accelerator)
    }

    /// Get the full entry registered under the given name.
    pub fn entry(&self, name: &str) -> Option<RegistryEntry> {
        let name = normalize(name);

        self.entries
            .lock()
            .iter()
            .find(|entry| entry.name == name)
            .cloned()
    }

    /// The description of the accelerator registered under the given name.
    pub fn description(&self, name: &str) -> Option<String> {
        self.entry(name).map(|entry| entry.description)
    }

    /// Whether an accelerator is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Remove the accelerator registered under the given name, returning whether one was.
    pub fn remove(&self, name: &str) -> bool {
        let name = normalize(name);
        let mut entries = self.entries.lock();
        let len = entries.len();

        entries.retain(|entry| entry.name != name);
        entries.len() != len
    }

    /// The registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// The names of the registered accelerators that can run on this machine.
    pub fn available(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.accelerator.is_available())
            .map(|entry| entry.name)
            .collect()
    }

    /// A snapshot of every entry, in registration order.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.entries.lock().clone()
    }

    /// The number of registered accelerators.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no accelerator is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
