//! Type definition documents
//!
//! A [`TypeDef`] is the language-agnostic schema node produced for every model
//! type. At most one of the discriminating fields (`type`, `enum`, `elements`,
//! `values`, `properties`/`optionalProperties`, `discriminator`/`mapping`,
//! `ref`) is set on any node. An empty node describes "any JSON value".

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Leaf kinds of a [`TypeDef`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    String,
    Boolean,
    Timestamp,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl TypeKind {
    /// Wire name of this kind, as it appears in the `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Boolean => "boolean",
            TypeKind::Timestamp => "timestamp",
            TypeKind::Float32 => "float32",
            TypeKind::Float64 => "float64",
            TypeKind::Int8 => "int8",
            TypeKind::Int16 => "int16",
            TypeKind::Int32 => "int32",
            TypeKind::Int64 => "int64",
            TypeKind::Uint8 => "uint8",
            TypeKind::Uint16 => "uint16",
            TypeKind::Uint32 => "uint32",
            TypeKind::Uint64 => "uint64",
        }
    }

    /// 64-bit integers travel as JSON strings
    pub fn is_large_integer(&self) -> bool {
        matches!(self, TypeKind::Int64 | TypeKind::Uint64)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a [`TypeDef`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefMetadata {
    /// Canonical type name; registry key and `ref` target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
}

impl TypeDefMetadata {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.description.is_none() && self.is_deprecated.is_none()
    }
}

/// A canonical schema node
///
/// Field order matches the serialized document order; `properties`,
/// `optionalProperties` and `mapping` keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TypeDefMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_kind: Option<TypeKind>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<TypeDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<TypeDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, TypeDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_properties: Option<IndexMap<String, TypeDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, TypeDef>>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl TypeDef {
    /// Schema accepting any JSON value
    pub fn any() -> Self {
        Self::default()
    }

    /// Leaf schema of the given kind
    pub fn leaf(kind: TypeKind) -> Self {
        Self {
            type_kind: Some(kind),
            ..Self::default()
        }
    }

    /// String enum schema; values keep their given order
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Array schema
    pub fn elements(element: TypeDef) -> Self {
        Self {
            elements: Some(Box::new(element)),
            ..Self::default()
        }
    }

    /// String-keyed map schema
    pub fn values(value: TypeDef) -> Self {
        Self {
            values: Some(Box::new(value)),
            ..Self::default()
        }
    }

    /// Object schema with required and optional properties.
    ///
    /// An empty optional-property map is left out of the document; an empty
    /// required-property map is kept so that the node still reads as an object.
    pub fn object(
        properties: IndexMap<String, TypeDef>,
        optional_properties: IndexMap<String, TypeDef>,
    ) -> Self {
        Self {
            properties: Some(properties),
            optional_properties: if optional_properties.is_empty() {
                None
            } else {
                Some(optional_properties)
            },
            ..Self::default()
        }
    }

    /// Discriminated union schema
    pub fn discriminated(key: impl Into<String>, mapping: IndexMap<String, TypeDef>) -> Self {
        Self {
            discriminator: Some(key.into()),
            mapping: Some(mapping),
            ..Self::default()
        }
    }

    /// Reference to a previously declared type
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = if nullable { Some(true) } else { None };
        self
    }

    /// Objects are strict unless marked otherwise, so only `false` is written
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = if strict { None } else { Some(false) };
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.get_or_insert_with(Default::default).id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.get_or_insert_with(Default::default).description =
            Some(description.into());
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        if deprecated {
            self.metadata.get_or_insert_with(Default::default).is_deprecated = Some(true);
        }
        self
    }

    /// Canonical name of this node, if it has one
    pub fn id(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.id.as_deref())
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
    }

    /// True for `properties`/`optionalProperties` nodes
    pub fn is_object(&self) -> bool {
        self.properties.is_some() || self.optional_properties.is_some()
    }

    pub fn is_discriminator(&self) -> bool {
        self.discriminator.is_some()
    }

    /// Collect every `ref` target reachable from this node, in document order
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(name) = &self.reference {
            out.push(name);
        }
        for child in [&self.elements, &self.values].into_iter().flatten() {
            child.collect_refs(out);
        }
        for map in [&self.properties, &self.optional_properties, &self.mapping]
            .into_iter()
            .flatten()
        {
            for child in map.values() {
                child.collect_refs(out);
            }
        }
    }
}
