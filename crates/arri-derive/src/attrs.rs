//! Parsing of `#[arri(...)]` attributes

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitBool, LitStr, Result, Token};

/// Options on the struct or enum itself
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContainerMeta {
    pub id: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// `None` unless given; models are strict by default
    pub strict: Option<bool>,
    pub discriminator: Option<String>,
}

/// Options on a struct field or an inline variant field
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldMeta {
    pub key: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub enum_values: Option<Vec<String>>,
}

/// Options on an enum variant
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VariantMeta {
    pub rename: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
}

pub fn extract_container_meta(attrs: &[Attribute]) -> Result<ContainerMeta> {
    let mut meta = ContainerMeta::default();
    for attr in arri_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("id") {
                meta.id = Some(non_empty_str(&nested, "id")?);
            } else if nested.path.is_ident("description") {
                meta.description = Some(string_value(&nested)?);
            } else if nested.path.is_ident("deprecated") {
                meta.deprecated = flag_value(&nested)?;
            } else if nested.path.is_ident("strict") {
                meta.strict = Some(flag_value(&nested)?);
            } else if nested.path.is_ident("discriminator") {
                meta.discriminator = Some(non_empty_str(&nested, "discriminator")?);
            } else {
                return Err(nested.error(
                    "unknown arri container attribute; expected one of \
                     `id`, `description`, `deprecated`, `strict`, `discriminator`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn extract_field_meta(attrs: &[Attribute]) -> Result<FieldMeta> {
    let mut meta = FieldMeta::default();
    for attr in arri_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("key") {
                meta.key = Some(non_empty_str(&nested, "key")?);
            } else if nested.path.is_ident("description") {
                meta.description = Some(string_value(&nested)?);
            } else if nested.path.is_ident("deprecated") {
                meta.deprecated = flag_value(&nested)?;
            } else if nested.path.is_ident("enum_values") {
                let lit: LitStr = nested.value()?.parse()?;
                let values: Vec<String> = lit
                    .value()
                    .split(',')
                    .map(|value| value.trim().to_string())
                    .collect();
                if values.iter().any(String::is_empty) {
                    return Err(syn::Error::new(
                        lit.span(),
                        "`enum_values` must be a comma separated list of non-empty values",
                    ));
                }
                if let Some(duplicate) = first_duplicate(&values) {
                    return Err(syn::Error::new(
                        lit.span(),
                        format!("duplicate enum value `{duplicate}`"),
                    ));
                }
                meta.enum_values = Some(values);
            } else {
                return Err(nested.error(
                    "unknown arri field attribute; expected one of \
                     `key`, `description`, `deprecated`, `enum_values`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn extract_variant_meta(attrs: &[Attribute]) -> Result<VariantMeta> {
    let mut meta = VariantMeta::default();
    for attr in arri_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                meta.rename = Some(non_empty_str(&nested, "rename")?);
            } else if nested.path.is_ident("description") {
                meta.description = Some(string_value(&nested)?);
            } else if nested.path.is_ident("deprecated") {
                meta.deprecated = flag_value(&nested)?;
            } else {
                return Err(nested.error(
                    "unknown arri variant attribute; expected one of \
                     `rename`, `description`, `deprecated`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

fn arri_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("arri"))
}

fn string_value(meta: &ParseNestedMeta) -> Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn non_empty_str(meta: &ParseNestedMeta, name: &str) -> Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    let value = lit.value();
    if value.is_empty() {
        return Err(syn::Error::new(lit.span(), format!("`{name}` must not be empty")));
    }
    Ok(value)
}

/// `flag` alone or `flag = true|false`
fn flag_value(meta: &ParseNestedMeta) -> Result<bool> {
    if meta.input.peek(Token![=]) {
        let lit: LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

pub fn first_duplicate(values: &[String]) -> Option<&str> {
    values
        .iter()
        .enumerate()
        .find(|(index, value)| values[..*index].contains(value))
        .map(|(_, value)| value.as_str())
}
