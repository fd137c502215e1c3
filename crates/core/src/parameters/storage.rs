//! Parameter Storage Types
//!
//! Provides the parameter value type and the `ParameterStore` holding the
//! tunable configuration (ArduPilot-style names, 16 characters max).

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::{FnvIndexMap, String};

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 64;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is hidden from parameter listings
        const HIDDEN = 0b00000001;
        /// Parameter cannot be modified after registration
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Boolean parameter
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit floating point
    Float(f32),
}

impl ParamValue {
    /// Type discriminant
    pub fn type_id(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 2,
            ParamValue::Float(_) => 3,
        }
    }

    /// Numeric view, integers and booleans widened to `f32`
    pub fn as_f32(&self) -> f32 {
        match *self {
            ParamValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            ParamValue::Int(i) => i as f32,
            ParamValue::Float(f) => f,
        }
    }

    /// Integer view, floats truncated
    pub fn as_i32(&self) -> i32 {
        match *self {
            ParamValue::Bool(b) => b as i32,
            ParamValue::Int(i) => i,
            ParamValue::Float(f) => f as i32,
        }
    }

    /// Boolean view, nonzero numbers are true
    pub fn as_bool(&self) -> bool {
        match *self {
            ParamValue::Bool(b) => b,
            ParamValue::Int(i) => i != 0,
            ParamValue::Float(f) => f != 0.0,
        }
    }
}

/// Parameter metadata
#[derive(Debug, Clone)]
pub struct ParamMetadata {
    /// Parameter flags
    pub flags: ParamFlags,
}

/// Parameter store for configuration management
///
/// Stores parameters as key-value pairs with metadata (flags). Parameter
/// groups register their defaults once at startup, then read themselves
/// back with `from_store`.
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, ParamValue, MAX_PARAMS>,
    metadata: FnvIndexMap<String<PARAM_NAME_LEN>, ParamMetadata, MAX_PARAMS>,
}

fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::<PARAM_NAME_LEN>::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidName)?;
    Ok(key)
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
            metadata: FnvIndexMap::new(),
        }
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(&key(name).ok()?)
    }

    /// Float value of `name`, or `default` when missing
    pub fn get_f32(&self, name: &str, default: f32) -> f32 {
        self.get(name).map(ParamValue::as_f32).unwrap_or(default)
    }

    /// Float value of `name`, or `default` when missing, NaN or infinite
    pub fn get_finite_f32(&self, name: &str, default: f32) -> f32 {
        let value = self.get_f32(name, default);
        if value.is_finite() {
            value
        } else {
            default
        }
    }

    /// Integer value of `name`, or `default` when missing
    pub fn get_i32(&self, name: &str, default: i32) -> i32 {
        self.get(name).map(ParamValue::as_i32).unwrap_or(default)
    }

    /// Boolean value of `name`, or `default` when missing
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name).map(ParamValue::as_bool).unwrap_or(default)
    }

    /// Set parameter value
    ///
    /// The parameter must exist, be writable, and keep its value type.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;

        let current = self
            .parameters
            .get(&key)
            .ok_or(ParameterError::UnknownParameter)?;
        if current.type_id() != value.type_id() {
            return Err(ParameterError::TypeMismatch);
        }

        if let Some(meta) = self.metadata.get(&key) {
            if meta.flags.contains(ParamFlags::READ_ONLY) {
                return Err(ParameterError::ReadOnly);
            }
        }

        self.parameters
            .insert(key, value)
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Register a new parameter with default value and flags
    ///
    /// If the parameter already exists, this is a no-op (idempotent).
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;

        if self.parameters.contains_key(&key) {
            // Already exists, don't overwrite
            return Ok(());
        }

        self.parameters
            .insert(key.clone(), default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        self.metadata
            .insert(key, ParamMetadata { flags })
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Check if parameter is hidden
    pub fn is_hidden(&self, name: &str) -> bool {
        match key(name) {
            Ok(key) => self
                .metadata
                .get(&key)
                .map(|meta| meta.flags.contains(ParamFlags::HIDDEN))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get all parameter names (excluding hidden parameters)
    pub fn iter_names(&self) -> impl Iterator<Item = &String<PARAM_NAME_LEN>> {
        self.parameters
            .keys()
            .filter(|name| !self.is_hidden(name.as_str()))
    }

    /// Get parameter count (excluding hidden parameters)
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    /// Get total parameter count (including hidden parameters)
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_views() {
        assert_eq!(ParamValue::Int(3).as_f32(), 3.0);
        assert_eq!(ParamValue::Float(2.7).as_i32(), 2);
        assert!(ParamValue::Int(1).as_bool());
        assert!(!ParamValue::Float(0.0).as_bool());
        assert_eq!(ParamValue::Bool(true).as_i32(), 1);
    }

    #[test]
    fn test_parameter_store_register_and_get() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Int(42)));
        assert_eq!(store.get_i32("TEST", 0), 42);
        assert_eq!(store.get_f32("MISSING", 1.5), 1.5);
    }

    #[test]
    fn test_parameter_store_set() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Float(1.0), ParamFlags::empty())
            .unwrap();
        store.set("TEST", ParamValue::Float(2.5)).unwrap();
        assert_eq!(store.get_f32("TEST", 0.0), 2.5);
    }

    #[test]
    fn test_parameter_store_set_errors() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("UNKNOWN", ParamValue::Int(1)),
            Err(ParameterError::UnknownParameter)
        );
        assert_eq!(
            store.set("NAME_FAR_TOO_LONG_FOR_STORE", ParamValue::Int(1)),
            Err(ParameterError::InvalidName)
        );

        store
            .register("TEST", ParamValue::Float(1.0), ParamFlags::empty())
            .unwrap();
        assert_eq!(
            store.set("TEST", ParamValue::Int(1)),
            Err(ParameterError::TypeMismatch)
        );
    }

    #[test]
    fn test_parameter_store_register_idempotent() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        store.set("TEST", ParamValue::Int(100)).unwrap();
        // Re-register should not overwrite
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Int(100)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parameter_hidden() {
        let mut store = ParameterStore::new();
        store
            .register("A", ParamValue::Int(1), ParamFlags::empty())
            .unwrap();
        store
            .register("SECRET", ParamValue::Int(7), ParamFlags::HIDDEN)
            .unwrap();
        assert!(store.is_hidden("SECRET"));
        assert!(!store.is_hidden("A"));
        assert_eq!(store.count(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_parameter_read_only() {
        let mut store = ParameterStore::new();
        store
            .register("READONLY", ParamValue::Int(42), ParamFlags::READ_ONLY)
            .unwrap();
        assert_eq!(
            store.set("READONLY", ParamValue::Int(100)),
            Err(ParameterError::ReadOnly)
        );
    }

    #[test]
    fn test_store_full() {
        let mut store = ParameterStore::new();
        let mut name = String::<PARAM_NAME_LEN>::new();
        for i in 0..MAX_PARAMS {
            name.clear();
            core::fmt::write(&mut name, format_args!("P{}", i)).unwrap();
            store
                .register(name.as_str(), ParamValue::Int(0), ParamFlags::empty())
                .unwrap();
        }
        assert_eq!(
            store.register("ONE_MORE", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
    }
}
