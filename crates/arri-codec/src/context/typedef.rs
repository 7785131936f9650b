use std::collections::BTreeSet;

use arri_protocol::{IndexMap, KeyCasing, TypeDef};

use super::Paths;
use crate::error::TypeDefError;
use crate::info::{FieldInfo, ModelInfo, VariantInfo};
use crate::model::{ArriModel, EnumString};
use crate::options::TYPEDEF_MAX_DEPTH;
use crate::shape::Shape;

/// State of a single [`TypeDef`] derivation.
///
/// Keeps the stack of named types currently being built so that recursion
/// is closed with `{ref: name}`, and collects the full definition of every
/// type that was referenced that way.
#[derive(Debug)]
pub struct TypeDefContext {
    key_casing: KeyCasing,
    max_depth: usize,
    parent_stack: Vec<&'static str>,
    pub(crate) paths: Paths,
    referenced: BTreeSet<&'static str>,
    definitions: IndexMap<String, TypeDef>,
    /// Types whose standalone definition an enclosing derivation is building
    standalone_pending: BTreeSet<&'static str>,
}

impl TypeDefContext {
    pub fn new(key_casing: KeyCasing) -> Self {
        Self {
            key_casing,
            max_depth: TYPEDEF_MAX_DEPTH,
            parent_stack: Vec::new(),
            paths: Paths::default(),
            referenced: BTreeSet::new(),
            definitions: IndexMap::new(),
            standalone_pending: BTreeSet::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn key_casing(&self) -> KeyCasing {
        self.key_casing
    }

    /// Names of the types currently being built, outermost first
    pub fn parent_stack(&self) -> &[&'static str] {
        &self.parent_stack
    }

    /// Schema location currently being built
    pub fn schema_path(&self) -> &str {
        self.paths.schema()
    }

    /// Definitions of every type closed with a `ref`, in the order they
    /// were completed
    pub fn definitions(&self) -> &IndexMap<String, TypeDef> {
        &self.definitions
    }

    pub fn into_definitions(self) -> IndexMap<String, TypeDef> {
        self.definitions
    }

    /// Build a named struct: a `ref` if it is already being built, otherwise
    /// an object node carrying its metadata.
    pub fn struct_def<F>(&mut self, info: &ModelInfo, build: F) -> Result<TypeDef, TypeDefError>
    where
        F: Fn(&mut Self, &mut ObjectDefBuilder) -> Result<(), TypeDefError>,
    {
        self.named(info, &|ctx| {
            let mut object = ObjectDefBuilder::new();
            build(ctx, &mut object)?;
            if object.is_empty() {
                return Err(TypeDefError::EmptyStruct {
                    name: info.name.to_string(),
                });
            }
            Ok(object.finish(info.strict))
        })
    }

    /// Build the object node of a struct used as a union variant.
    ///
    /// Variants are built with the stack of the union that holds them; the
    /// struct's own name is neither checked nor pushed.
    pub fn variant_struct_def<F>(
        &mut self,
        info: &ModelInfo,
        build: F,
    ) -> Result<TypeDef, TypeDefError>
    where
        F: FnOnce(&mut Self, &mut ObjectDefBuilder) -> Result<(), TypeDefError>,
    {
        let mut object = ObjectDefBuilder::new();
        build(self, &mut object)?;
        Ok(object.finish(info.strict))
    }

    /// Build a named discriminated union
    pub fn discriminator_def<F>(
        &mut self,
        info: &ModelInfo,
        key: &'static str,
        build: F,
    ) -> Result<TypeDef, TypeDefError>
    where
        F: Fn(&mut Self, &mut MappingDefBuilder) -> Result<(), TypeDefError>,
    {
        self.named(info, &|ctx| {
            let mut mapping = MappingDefBuilder::new(info.name, key, info.strict);
            build(ctx, &mut mapping)?;
            Ok(mapping.finish())
        })
    }

    /// Build a named string enum
    pub fn enum_def(&mut self, info: &ModelInfo, values: &[&str]) -> TypeDef {
        info.apply(TypeDef::string_enum(values.iter().copied()))
    }

    fn named(&mut self, info: &ModelInfo, build: &NamedBuild<'_>) -> Result<TypeDef, TypeDefError> {
        if self.parent_stack.contains(&info.name) {
            self.referenced.insert(info.name);
            return Ok(TypeDef::reference(info.name));
        }
        if self.parent_stack.len() >= self.max_depth {
            return Err(TypeDefError::MaxDepthExceeded {
                name: info.name.to_string(),
                max: self.max_depth,
            });
        }

        let nested = !self.parent_stack.is_empty();
        self.parent_stack.push(info.name);
        let built = build(self);
        self.parent_stack.pop();

        let def = info.apply(built?);
        if self.referenced.contains(info.name) && !self.definitions.contains_key(info.name) {
            if !nested {
                tracing::debug!(name = info.name, "collected recursive definition");
                self.definitions.insert(info.name.to_string(), def.clone());
            } else if !self.standalone_pending.contains(info.name) {
                // below the root the node may hold refs to its parents; the
                // registry needs the type as its own root
                let standalone = self.standalone(info, build)?;
                tracing::debug!(name = info.name, "collected recursive definition");
                self.definitions
                    .entry(info.name.to_string())
                    .or_insert(standalone);
            }
        }
        Ok(def)
    }

    /// Derive `info` again with an empty parent stack
    fn standalone(&mut self, info: &ModelInfo, build: &NamedBuild<'_>) -> Result<TypeDef, TypeDefError> {
        let mut fresh = TypeDefContext::new(self.key_casing).with_max_depth(self.max_depth);
        fresh.definitions = self.definitions.clone();
        fresh.standalone_pending = self.standalone_pending.clone();
        fresh.standalone_pending.insert(info.name);
        let def = fresh.named(info, build)?;
        for (id, collected) in fresh.definitions {
            if id != info.name {
                self.definitions.entry(id).or_insert(collected);
            }
        }
        Ok(def)
    }
}

type NamedBuild<'a> = dyn Fn(&mut TypeDefContext) -> Result<TypeDef, TypeDefError> + 'a;

/// Collects the fields of an object node in declaration order
#[derive(Debug, Default)]
pub struct ObjectDefBuilder {
    properties: IndexMap<String, TypeDef>,
    optional_properties: IndexMap<String, TypeDef>,
}

impl ObjectDefBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; `Option<T>` fields land in `optionalProperties`
    pub fn field<T: ArriModel>(
        &mut self,
        ctx: &mut TypeDefContext,
        info: &FieldInfo,
    ) -> Result<&mut Self, TypeDefError> {
        let key = info.key(ctx.key_casing);
        let optional = T::shape().is_optional();
        let mark = ctx.paths.enter_field(key, optional);
        let def = T::field_type_def(ctx);
        ctx.paths.restore(mark);
        self.insert(key, optional, info.apply(def?));
        Ok(self)
    }

    /// Add a string field restricted to `values`
    pub fn enum_field<T: EnumString>(
        &mut self,
        ctx: &mut TypeDefContext,
        info: &FieldInfo,
        values: &'static [&'static str],
    ) -> Result<&mut Self, TypeDefError> {
        let key = info.key(ctx.key_casing);
        let optional = T::shape().is_optional();
        let mark = ctx.paths.enter_field(key, optional);
        let def = T::enum_type_def(ctx, values);
        ctx.paths.restore(mark);
        self.insert(key, optional, info.apply(def?));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.optional_properties.is_empty()
    }

    pub fn finish(self, strict: bool) -> TypeDef {
        TypeDef::object(self.properties, self.optional_properties).with_strict(strict)
    }

    fn insert(&mut self, key: &str, optional: bool, def: TypeDef) {
        let target = if optional {
            &mut self.optional_properties
        } else {
            &mut self.properties
        };
        target.insert(key.to_string(), def);
    }
}

/// Collects the variants of a discriminated union in declaration order
#[derive(Debug)]
pub struct MappingDefBuilder {
    name: &'static str,
    key: &'static str,
    strict: bool,
    mapping: IndexMap<String, TypeDef>,
}

impl MappingDefBuilder {
    fn new(name: &'static str, key: &'static str, strict: bool) -> Self {
        Self {
            name,
            key,
            strict,
            mapping: IndexMap::new(),
        }
    }

    /// Add a variant whose payload is a named struct
    pub fn variant<P: ArriModel>(
        &mut self,
        ctx: &mut TypeDefContext,
        info: &VariantInfo,
    ) -> Result<&mut Self, TypeDefError> {
        let shape = P::shape();
        if shape != Shape::Struct {
            return Err(TypeDefError::VariantNotStruct {
                name: self.name.to_string(),
                variant: info.tag.to_string(),
                found: shape.name(),
            });
        }
        let mark = ctx.paths.enter_variant(info.tag);
        let def = P::variant_type_def(ctx);
        ctx.paths.restore(mark);
        let def = def?;
        let collides = [&def.properties, &def.optional_properties]
            .into_iter()
            .flatten()
            .any(|fields| fields.contains_key(self.key));
        if collides {
            return Err(TypeDefError::DiscriminatorCollision {
                name: self.name.to_string(),
                variant: info.tag.to_string(),
                key: self.key.to_string(),
            });
        }
        self.mapping.insert(info.tag.to_string(), info.apply(def));
        Ok(self)
    }

    /// Add a variant declared with named fields directly on the union
    pub fn inline_variant<F>(
        &mut self,
        ctx: &mut TypeDefContext,
        info: &VariantInfo,
        build: F,
    ) -> Result<&mut Self, TypeDefError>
    where
        F: FnOnce(&mut TypeDefContext, &mut ObjectDefBuilder) -> Result<(), TypeDefError>,
    {
        let mark = ctx.paths.enter_variant(info.tag);
        let mut object = ObjectDefBuilder::new();
        let built = build(ctx, &mut object);
        ctx.paths.restore(mark);
        built?;
        self.mapping
            .insert(info.tag.to_string(), info.apply(object.finish(self.strict)));
        Ok(self)
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    fn finish(self) -> TypeDef {
        TypeDef::discriminated(self.key, self.mapping)
    }
}
