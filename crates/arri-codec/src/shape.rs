//! Normalized structural kind of a model type

use arri_protocol::TypeKind;

/// What a model type looks like on the wire.
///
/// Derived types report `Struct`, `Enum` or `Discriminator`; the built-in
/// implementations report the rest. Checks that cannot be made from syntax
/// alone (a `Nullable` wrapping an `Option` behind an alias, a discriminator
/// variant that is itself a union) are made against this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Leaf(TypeKind),
    Enum,
    Array,
    Map,
    Option,
    Nullable,
    Struct,
    Discriminator,
    Any,
    /// `()`: no params or no response
    Empty,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Leaf(kind) => kind.as_str(),
            Shape::Enum => "enum",
            Shape::Array => "array",
            Shape::Map => "map",
            Shape::Option => "option",
            Shape::Nullable => "nullable",
            Shape::Struct => "struct",
            Shape::Discriminator => "discriminator",
            Shape::Any => "any",
            Shape::Empty => "empty",
        }
    }

    /// Named shapes carry a `metadata.id` and may be registered as definitions
    pub fn is_named(&self) -> bool {
        matches!(self, Shape::Struct | Shape::Discriminator | Shape::Enum)
    }

    /// Shapes a procedure may take as params or return
    pub fn is_procedure_type(&self) -> bool {
        matches!(self, Shape::Struct | Shape::Discriminator | Shape::Empty)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Option)
    }
}
