//! Static metadata emitted by `#[derive(ArriModel)]`

use arri_protocol::{KeyCasing, TypeDef};

/// A named model type: struct, enum or discriminated union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Canonical name; becomes `metadata.id`
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub deprecated: bool,
    /// Reject unknown keys on decode; `false` is emitted as `strict: false`
    pub strict: bool,
}

impl ModelInfo {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            description: None,
            deprecated: false,
            strict: true,
        }
    }

    pub(crate) fn apply(&self, def: TypeDef) -> TypeDef {
        let def = def.with_id(self.name).with_deprecated(self.deprecated);
        match self.description {
            Some(description) => def.with_description(description),
            None => def,
        }
    }
}

/// A struct field (or a field of an inline union variant)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Serial key per casing, indexed by [`KeyCasing::index`].
    /// An explicit `key` attribute fills all three slots.
    pub keys: [&'static str; 3],
    pub description: Option<&'static str>,
    pub deprecated: bool,
}

impl FieldInfo {
    pub const fn new(keys: [&'static str; 3]) -> Self {
        Self {
            keys,
            description: None,
            deprecated: false,
        }
    }

    pub fn key(&self, casing: KeyCasing) -> &'static str {
        self.keys[casing.index()]
    }

    pub(crate) fn apply(&self, mut def: TypeDef) -> TypeDef {
        if let Some(description) = self.description {
            def = def.with_description(description);
        }
        def.with_deprecated(self.deprecated)
    }
}

/// A variant of a discriminated union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    /// Discriminator value selecting this variant
    pub tag: &'static str,
    pub description: Option<&'static str>,
    pub deprecated: bool,
}

impl VariantInfo {
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            description: None,
            deprecated: false,
        }
    }

    pub(crate) fn apply(&self, mut def: TypeDef) -> TypeDef {
        if let Some(description) = self.description {
            def = def.with_description(description);
        }
        def.with_deprecated(self.deprecated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_per_casing() {
        let info = FieldInfo::new(["createdAt", "CreatedAt", "created_at"]);
        assert_eq!(info.key(KeyCasing::Camel), "createdAt");
        assert_eq!(info.key(KeyCasing::Pascal), "CreatedAt");
        assert_eq!(info.key(KeyCasing::Snake), "created_at");
    }

    #[test]
    fn test_model_metadata() {
        let info = ModelInfo {
            description: Some("A user"),
            deprecated: true,
            ..ModelInfo::new("User")
        };
        let def = info.apply(TypeDef::any());
        assert_eq!(def.id(), Some("User"));
        let metadata = def.metadata.unwrap();
        assert_eq!(metadata.description.as_deref(), Some("A user"));
        assert_eq!(metadata.is_deprecated, Some(true));
    }
}
