//! (source, destination) -> converter class registry.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{Error, Result};

/// A registered conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterEntry {
    pub class_name: String,
    pub source: String,
    pub destination: String,
}

pub trait ConverterRegistry: Send + Sync {
    /// Register `class_name` as the converter from `source` to `destination`.
    ///
    /// Registering the identical triple again is a no-op; a different class
    /// for the same conversion fails.
    fn register_converter(&self, class_name: &str, source: &str, destination: &str) -> Result<()>;

    /// The converter class for a conversion.
    fn converter_name(&self, source: &str, destination: &str) -> Option<String>;

    /// All conversions, sorted by (source, destination).
    fn converters(&self) -> Vec<ConverterEntry>;
}

#[derive(Debug, Default)]
pub struct DefaultConverterRegistry {
    converters: RwLock<BTreeMap<(String, String), String>>,
}

impl DefaultConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConverterRegistry for DefaultConverterRegistry {
    fn register_converter(&self, class_name: &str, source: &str, destination: &str) -> Result<()> {
        let mut converters = self.converters.write();
        let key = (source.to_string(), destination.to_string());
        match converters.get(&key) {
            Some(existing) if existing == class_name => Ok(()),
            Some(existing) => Err(Error::ConverterConflict {
                from: source.to_string(),
                to: destination.to_string(),
                existing: existing.clone(),
                class_name: class_name.to_string(),
            }),
            None => {
                converters.insert(key, class_name.to_string());
                tracing::debug!("Registered converter {} ({} -> {})", class_name, source, destination);
                Ok(())
            }
        }
    }

    fn converter_name(&self, source: &str, destination: &str) -> Option<String> {
        self.converters
            .read()
            .get(&(source.to_string(), destination.to_string()))
            .cloned()
    }

    fn converters(&self) -> Vec<ConverterEntry> {
        self.converters
            .read()
            .iter()
            .map(|((source, destination), class_name)| ConverterEntry {
                class_name: class_name.clone(),
                source: source.clone(),
                destination: destination.clone(),
            })
            .collect()
    }
}
