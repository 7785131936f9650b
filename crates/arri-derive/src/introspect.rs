//! Reads a `DeriveInput` into the model the code generator works from.
//!
//! Everything that can be rejected from syntax alone is rejected here, so a
//! bad model fails to compile instead of failing when its schema is derived.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Data, DataEnum, DeriveInput, Error, Field, Fields, GenericArgument, Ident, PathArguments,
    Result, Type,
};

use crate::attrs::{
    extract_container_meta, extract_field_meta, extract_variant_meta, first_duplicate,
};

pub const DEFAULT_DISCRIMINATOR: &str = "type";

#[derive(Debug)]
pub struct Model {
    pub ident: Ident,
    /// Canonical name: the `id` attribute or the type's identifier
    pub name: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub strict: bool,
    pub body: ModelDef,
}

#[derive(Debug)]
pub enum ModelDef {
    Struct(Vec<FieldDef>),
    Enum(Vec<EnumValue>),
    Discriminator(UnionDef),
}

#[derive(Debug)]
pub struct FieldDef {
    pub member: Ident,
    pub ty: Type,
    /// Serial keys in camel, Pascal and snake casing
    pub keys: [String; 3],
    pub description: Option<String>,
    pub deprecated: bool,
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct EnumValue {
    pub ident: Ident,
    pub value: String,
}

#[derive(Debug)]
pub struct UnionDef {
    pub key: String,
    pub variants: Vec<VariantDef>,
}

#[derive(Debug)]
pub struct VariantDef {
    pub ident: Ident,
    pub tag: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub payload: VariantPayload,
}

#[derive(Debug)]
pub enum VariantPayload {
    /// `Variant { .. }`
    Inline(Vec<FieldDef>),
    /// `Variant(Payload)` where `Payload` is a struct model
    Newtype(Type),
}

pub fn introspect(input: &DeriveInput) -> Result<Model> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "ArriModel cannot be derived for generic types",
        ));
    }

    let meta = extract_container_meta(&input.attrs)?;
    let ident = input.ident.clone();
    let name = meta.id.clone().unwrap_or_else(|| ident.unraw().to_string());

    let body = match &input.data {
        Data::Struct(data) => {
            if meta.discriminator.is_some() {
                return Err(Error::new(
                    ident.span(),
                    "`discriminator` only applies to enums with data variants",
                ));
            }
            let Fields::Named(named) = &data.fields else {
                return Err(Error::new(
                    ident.span(),
                    "ArriModel structs must have named fields",
                ));
            };
            if named.named.is_empty() {
                return Err(Error::new(
                    ident.span(),
                    "ArriModel structs must declare at least one field",
                ));
            }
            ModelDef::Struct(collect_fields(named.named.iter(), None)?)
        }
        Data::Enum(data) => introspect_enum(&ident, data, meta.discriminator.as_deref(), meta.strict)?,
        Data::Union(_) => {
            return Err(Error::new(
                ident.span(),
                "ArriModel cannot be derived for unions",
            ));
        }
    };

    Ok(Model {
        ident,
        name,
        description: meta.description,
        deprecated: meta.deprecated,
        strict: meta.strict.unwrap_or(true),
        body,
    })
}

fn introspect_enum(
    ident: &Ident,
    data: &DataEnum,
    discriminator: Option<&str>,
    strict: Option<bool>,
) -> Result<ModelDef> {
    if data.variants.is_empty() {
        return Err(Error::new(
            ident.span(),
            "ArriModel enums must declare at least one variant",
        ));
    }

    let unit_count = data
        .variants
        .iter()
        .filter(|variant| matches!(variant.fields, Fields::Unit))
        .count();

    if unit_count == data.variants.len() {
        if discriminator.is_some() {
            return Err(Error::new(
                ident.span(),
                "`discriminator` requires data variants; declare empty variants as `Variant {}`",
            ));
        }
        if strict.is_some() {
            return Err(Error::new(
                ident.span(),
                "`strict` has no effect on string enums",
            ));
        }
        return introspect_string_enum(data).map(ModelDef::Enum);
    }

    if let Some(unit) = data
        .variants
        .iter()
        .find(|variant| matches!(variant.fields, Fields::Unit))
    {
        return Err(Error::new(
            unit.ident.span(),
            "enums cannot mix unit and data variants; declare empty variants as `Variant {}`",
        ));
    }

    let key = discriminator.unwrap_or(DEFAULT_DISCRIMINATOR).to_string();
    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        let meta = extract_variant_meta(&variant.attrs)?;
        let payload = match &variant.fields {
            Fields::Named(named) => {
                VariantPayload::Inline(collect_fields(named.named.iter(), Some(&key))?)
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let ty = unnamed.unnamed[0].ty.clone();
                check_nullable_option(&ty)?;
                VariantPayload::Newtype(ty)
            }
            Fields::Unnamed(unnamed) => {
                return Err(Error::new(
                    unnamed.span(),
                    "tuple variants must wrap exactly one struct model",
                ));
            }
            Fields::Unit => {
                return Err(Error::new(
                    variant.ident.span(),
                    "unit variants cannot appear in a discriminated union",
                ));
            }
        };
        variants.push(VariantDef {
            ident: variant.ident.clone(),
            tag: meta
                .rename
                .unwrap_or_else(|| variant.ident.unraw().to_string()),
            description: meta.description,
            deprecated: meta.deprecated,
            payload,
        });
    }

    let tags: Vec<String> = variants.iter().map(|v| v.tag.clone()).collect();
    if let Some(duplicate) = first_duplicate(&tags) {
        return Err(Error::new(
            ident.span(),
            format!("duplicate discriminator value `{duplicate}`"),
        ));
    }

    Ok(ModelDef::Discriminator(UnionDef { key, variants }))
}

fn introspect_string_enum(data: &DataEnum) -> Result<Vec<EnumValue>> {
    let mut values = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        let meta = extract_variant_meta(&variant.attrs)?;
        if meta.description.is_some() || meta.deprecated {
            return Err(Error::new(
                variant.ident.span(),
                "string enum values carry no metadata; only `rename` is allowed",
            ));
        }
        values.push(EnumValue {
            ident: variant.ident.clone(),
            value: meta
                .rename
                .unwrap_or_else(|| variant.ident.unraw().to_string()),
        });
    }
    let names: Vec<String> = values.iter().map(|v| v.value.clone()).collect();
    if let Some(duplicate) = first_duplicate(&names) {
        return Err(Error::new(
            data.variants.span(),
            format!("duplicate enum value `{duplicate}`"),
        ));
    }
    Ok(values)
}

fn collect_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
    discriminator: Option<&str>,
) -> Result<Vec<FieldDef>> {
    let mut collected: Vec<FieldDef> = Vec::new();
    for field in fields {
        let def = field_def(field)?;
        if let Some(key) = discriminator {
            if def.keys.iter().any(|k| k == key) {
                return Err(Error::new(
                    def.member.span(),
                    format!("field key collides with the discriminator `{key}`"),
                ));
            }
        }
        for slot in 0..3 {
            if collected.iter().any(|other| other.keys[slot] == def.keys[slot]) {
                return Err(Error::new(
                    def.member.span(),
                    format!("duplicate field key `{}`", def.keys[slot]),
                ));
            }
        }
        collected.push(def);
    }
    Ok(collected)
}

fn field_def(field: &Field) -> Result<FieldDef> {
    let member = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "expected a named field"))?;
    let meta = extract_field_meta(&field.attrs)?;
    check_nullable_option(&field.ty)?;
    check_nested_option(&field.ty)?;
    let keys = match &meta.key {
        Some(key) => [key.clone(), key.clone(), key.clone()],
        None => field_keys(&member),
    };
    Ok(FieldDef {
        member,
        ty: field.ty.clone(),
        keys,
        description: meta.description,
        deprecated: meta.deprecated,
        enum_values: meta.enum_values,
    })
}

/// `[camel, Pascal, snake]` keys derived from a field identifier
pub fn field_keys(member: &Ident) -> [String; 3] {
    let name = member.unraw().to_string();
    [
        name.to_lower_camel_case(),
        name.to_upper_camel_case(),
        name.to_snake_case(),
    ]
}

fn check_nullable_option(ty: &Type) -> Result<()> {
    if nullable_wraps_option(ty) {
        return Err(Error::new(
            ty.span(),
            "`Nullable<Option<T>>` is not supported; use `Option<Nullable<T>>`",
        ));
    }
    Ok(())
}

fn check_nested_option(ty: &Type) -> Result<()> {
    if let Some(option) = nested_option(ty, true) {
        return Err(Error::new(
            option.span(),
            "`Option<T>` is only allowed as the field type itself; use `Nullable<T>` inside collections",
        ));
    }
    Ok(())
}

/// The first `Option<..>` in `ty` that is not the field's own carrier.
///
/// `Box`, `Rc` and `Arc` are transparent, so `Box<Option<T>>` is still a
/// field-level option.
pub fn nested_option(ty: &Type, field_level: bool) -> Option<&Type> {
    match ty {
        Type::Path(path) => {
            let segment = path.path.segments.last()?;
            if segment.ident == "Option" && !field_level {
                return Some(ty);
            }
            let inner_level = field_level
                && matches!(segment.ident.to_string().as_str(), "Box" | "Rc" | "Arc");
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return None;
            };
            args.args.iter().find_map(|arg| match arg {
                GenericArgument::Type(ty) => nested_option(ty, inner_level),
                _ => None,
            })
        }
        Type::Group(group) => nested_option(&group.elem, field_level),
        Type::Paren(paren) => nested_option(&paren.elem, field_level),
        _ => None,
    }
}

/// Whether `Nullable<Option<..>>` appears anywhere in `ty`
pub fn nullable_wraps_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path.path.segments.iter().any(|segment| {
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return false;
            };
            let inner: Vec<&Type> = args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect();
            let direct = segment.ident == "Nullable"
                && inner.first().is_some_and(|ty| last_segment_is(ty, "Option"));
            direct || inner.iter().any(|ty| nullable_wraps_option(ty))
        }),
        Type::Group(group) => nullable_wraps_option(&group.elem),
        Type::Paren(paren) => nullable_wraps_option(&paren.elem),
        _ => false,
    }
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        Type::Group(group) => last_segment_is(&group.elem, name),
        Type::Paren(paren) => last_segment_is(&paren.elem, name),
        _ => false,
    }
}
