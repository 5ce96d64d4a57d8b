use std::collections::HashMap;

use thiserror::Error;

use super::background_subtractor::BackgroundSubtractor;

pub type ConstructorError = Box<dyn std::error::Error + Send + Sync>;

/// Zero-argument constructor stored under an algorithm name.
pub type Constructor =
    Box<dyn Fn() -> Result<Box<dyn BackgroundSubtractor>, ConstructorError> + Send + Sync>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unknown algorithm name '{0}'")]
    UnknownAlgorithm(String),
    #[error("failed to create algorithm '{name}': {source}")]
    ConstructionFailed {
        name: String,
        #[source]
        source: ConstructorError,
    },
}

/// Maps algorithm names to constructors.
///
/// Populate once at startup, then pass by reference to whatever needs to
/// build algorithms. Registering a name twice keeps the latest constructor.
#[derive(Default)]
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<Box<dyn BackgroundSubtractor>, ConstructorError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            log::warn!("Overwriting existing constructor for '{name}'");
        }
        self.constructors.insert(name, Box::new(constructor));
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn BackgroundSubtractor>, RegistryError> {
        let Some(constructor) = self.constructors.get(name) else {
            log::error!("Algorithm '{name}' not found in registry");
            return Err(RegistryError::UnknownAlgorithm(name.to_string()));
        };
        constructor().map_err(|source| {
            log::error!("Error creating instance of {name}: {source}");
            RegistryError::ConstructionFailed {
                name: name.to_string(),
                source,
            }
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted for display. Callers must not rely on order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
