//! Name → property lookup.
//!
//! A [`PropertyRegistry`] is assembled once through a [`RegistryBuilder`]
//! and is read-only afterwards.  The bundled properties live in a
//! process-wide registry that is built on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::error::{Result, UnipropError};

use super::binding::{PropertyBinding, PropertyValue, RangeValues};
use super::digit;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only map from property names to bindings.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    bindings: HashMap<String, PropertyBinding>,
}

impl PropertyRegistry {
    /// Start assembling a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Return the binding registered under `name`.
    pub fn get(&self, name: &str) -> Result<&PropertyBinding> {
        self.bindings
            .get(name)
            .ok_or_else(|| UnipropError::UnknownProperty(name.to_string()))
    }

    /// Return true if a property with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Collects bindings for a [`PropertyRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    bindings: HashMap<String, PropertyBinding>,
}

impl RegistryBuilder {
    /// Add a binding.  Names must be unique.
    pub fn register(mut self, binding: PropertyBinding) -> Result<Self> {
        if self.bindings.contains_key(binding.name()) {
            return Err(UnipropError::DuplicateProperty(binding.name().to_string()));
        }
        self.bindings.insert(binding.name().to_string(), binding);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn finish(self) -> PropertyRegistry {
        PropertyRegistry {
            bindings: self.bindings,
        }
    }
}

// ---------------------------------------------------------------------------
// Singleton registry
// ---------------------------------------------------------------------------

fn build_standard_registry() -> Result<PropertyRegistry> {
    let registry = PropertyRegistry::builder()
        .register(digit::digit_value_binding()?)?
        .register(digit::decimal_digit_value_binding()?)?
        .finish();
    log::info!(
        "standard property registry initialized: {}",
        registry.names().join(", ")
    );
    Ok(registry)
}

/// Global registry of the bundled properties (initialized once).
pub fn standard_registry() -> Result<&'static PropertyRegistry> {
    static REGISTRY: OnceLock<Result<PropertyRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(build_standard_registry)
        .as_ref()
        .map_err(|e| e.clone())
}

// ---------------------------------------------------------------------------
// Query interface
// ---------------------------------------------------------------------------

/// Look up a bundled property by name.
pub fn get_property(name: &str) -> Result<&'static PropertyBinding> {
    standard_registry()?.get(name)
}

/// Value of `binding` for codepoint `c`.
pub fn value_of(binding: &PropertyBinding, c: u32) -> Result<PropertyValue> {
    binding.value_of(c)
}

/// Lazily yield `(codepoint, value)` for `low..=high`.
pub fn for_each_value_in_range(
    binding: &PropertyBinding,
    low: u32,
    high: u32,
) -> Result<RangeValues<'_>> {
    binding.values_in_range(low, high)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
