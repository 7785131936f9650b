//! Codec configuration

use arri_protocol::KeyCasing;

/// Default nesting bound for encode and decode calls
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling for type-definition recursion
pub const TYPEDEF_MAX_DEPTH: usize = 1000;

/// Options shared by every encode/decode call of a validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecOptions {
    /// Casing applied to struct field names without an explicit key
    pub key_casing: KeyCasing,
    /// Maximum number of nested objects/arrays in a single value
    pub max_depth: usize,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_casing(mut self, key_casing: KeyCasing) -> Self {
        self.key_casing = key_casing;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            key_casing: KeyCasing::Camel,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
