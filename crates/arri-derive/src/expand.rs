//! Code generation for `#[derive(ArriModel)]`

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{DeriveInput, Ident, Result};

use crate::introspect::{
    EnumValue, FieldDef, Model, ModelDef, UnionDef, VariantPayload, introspect,
};

pub fn derive_arri_model_impl(input: DeriveInput) -> Result<TokenStream> {
    let model = introspect(&input)?;
    let body = match &model.body {
        ModelDef::Struct(fields) => expand_struct(&model, fields),
        ModelDef::Enum(values) => expand_enum(&model, values),
        ModelDef::Discriminator(union) => expand_discriminator(&model, union),
    };
    Ok(quote! {
        #[allow(unused_variables)]
        const _: () = {
            use ::arri_codec::__private as __arri;
            #body
        };
    })
}

fn expand_struct(model: &Model, fields: &[FieldDef]) -> TokenStream {
    let ident = &model.ident;
    let model_info = model_info(model);
    let statics = format_ident!("__FIELDS");
    let field_infos = field_infos(fields);
    let count = fields.len();

    let build = build_fields(fields, &statics);
    let accessors: Vec<TokenStream> = fields
        .iter()
        .map(|field| {
            let member = &field.member;
            quote!(&self.#member)
        })
        .collect();
    let encode = encode_fields(fields, &statics, &accessors);
    let (decode_lets, decode_inits) = decode_fields(fields, &statics, quote!(__object));
    let (query_lets, query_inits) = query_fields(fields, &statics);

    quote! {
        static __MODEL: __arri::ModelInfo = #model_info;
        static #statics: [__arri::FieldInfo; #count] = [#(#field_infos),*];

        impl __arri::ArriModel for #ident {
            fn shape() -> __arri::Shape {
                __arri::Shape::Struct
            }

            fn type_def(
                ctx: &mut __arri::TypeDefContext,
            ) -> ::core::result::Result<__arri::TypeDef, __arri::TypeDefError> {
                ctx.struct_def(&__MODEL, |ctx, object| {
                    #(#build)*
                    ::core::result::Result::Ok(())
                })
            }

            fn variant_type_def(
                ctx: &mut __arri::TypeDefContext,
            ) -> ::core::result::Result<__arri::TypeDef, __arri::TypeDefError> {
                ctx.variant_struct_def(&__MODEL, |ctx, object| {
                    #(#build)*
                    ::core::result::Result::Ok(())
                })
            }

            fn encode_json(
                &self,
                ctx: &mut __arri::EncodingContext,
            ) -> ::core::result::Result<(), __arri::EncodeError> {
                let scope = ctx.begin_object()?;
                #(#encode)*
                ctx.end_object(scope);
                ::core::result::Result::Ok(())
            }

            fn decode_json(
                node: &__arri::JsonValue,
                ctx: &mut __arri::ValidationContext,
            ) -> ::core::option::Option<Self> {
                let __object = __arri::begin_struct(node, ctx, &__MODEL, &#statics)?;
                #(#decode_lets)*
                __arri::end_struct(ctx);
                ::core::option::Option::Some(Self { #(#decode_inits),* })
            }

            fn decode_query(
                query: &__arri::QueryParams,
                ctx: &mut __arri::ValidationContext,
            ) -> ::core::option::Option<Self> {
                __arri::begin_query_struct(query, ctx, &__MODEL, &#statics);
                #(#query_lets)*
                ::core::option::Option::Some(Self { #(#query_inits),* })
            }
        }
    }
}

fn expand_enum(model: &Model, values: &[EnumValue]) -> TokenStream {
    let ident = &model.ident;
    let model_info = model_info(model);
    let literals: Vec<&str> = values.iter().map(|v| v.value.as_str()).collect();

    let encode_arms = values.iter().enumerate().map(|(index, value)| {
        let variant = &value.ident;
        quote!(Self::#variant => __VALUES[#index])
    });
    let decode_arms: Vec<TokenStream> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let variant = &value.ident;
            quote!(#index => ::core::option::Option::Some(Self::#variant))
        })
        .collect();

    quote! {
        static __MODEL: __arri::ModelInfo = #model_info;
        const __VALUES: &[&str] = &[#(#literals),*];

        impl __arri::ArriModel for #ident {
            fn shape() -> __arri::Shape {
                __arri::Shape::Enum
            }

            fn type_def(
                ctx: &mut __arri::TypeDefContext,
            ) -> ::core::result::Result<__arri::TypeDef, __arri::TypeDefError> {
                ::core::result::Result::Ok(ctx.enum_def(&__MODEL, __VALUES))
            }

            fn encode_json(
                &self,
                ctx: &mut __arri::EncodingContext,
            ) -> ::core::result::Result<(), __arri::EncodeError> {
                let value = match self {
                    #(#encode_arms,)*
                };
                ctx.write_string(value);
                ::core::result::Result::Ok(())
            }

            fn decode_json(
                node: &__arri::JsonValue,
                ctx: &mut __arri::ValidationContext,
            ) -> ::core::option::Option<Self> {
                match __arri::decode_enum_index(node, ctx, __VALUES)? {
                    #(#decode_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn decode_query_value(
                raw: &str,
                ctx: &mut __arri::ValidationContext,
            ) -> ::core::option::Option<Self> {
                match __arri::decode_enum_query_index(raw, ctx, __VALUES)? {
                    #(#decode_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

fn expand_discriminator(model: &Model, union: &UnionDef) -> TokenStream {
    let ident = &model.ident;
    let model_info = model_info(model);
    let key = &union.key;
    let tags: Vec<&str> = union.variants.iter().map(|v| v.tag.as_str()).collect();
    let count = union.variants.len();

    let mut statics = Vec::new();
    let mut mapping = Vec::new();
    let mut encode_arms = Vec::new();
    let mut decode_arms = Vec::new();

    for (index, variant) in union.variants.iter().enumerate() {
        let name = &variant.ident;
        match &variant.payload {
            VariantPayload::Inline(fields) => {
                let fields_static = format_ident!("__FIELDS_{}", index);
                let field_infos = field_infos(fields);
                let field_count = fields.len();
                statics.push(quote! {
                    static #fields_static: [__arri::FieldInfo; #field_count] = [#(#field_infos),*];
                });

                let build = build_fields(fields, &fields_static);
                mapping.push(quote! {
                    mapping.inline_variant(ctx, &__VARIANTS[#index], |ctx, object| {
                        #(#build)*
                        ::core::result::Result::Ok(())
                    })?;
                });

                let bindings: Vec<Ident> = (0..fields.len()).map(binding).collect();
                let members: Vec<&Ident> = fields.iter().map(|f| &f.member).collect();
                let accessors: Vec<TokenStream> =
                    bindings.iter().map(|binding| quote!(#binding)).collect();
                let encode = encode_fields(fields, &fields_static, &accessors);
                encode_arms.push(quote! {
                    Self::#name { #(#members: #bindings),* } => {
                        __arri::encode_inline_variant(ctx, __KEY, __TAGS[#index], |ctx| {
                            #(#encode)*
                            ::core::result::Result::Ok(())
                        })
                    }
                });

                let (lets, inits) = decode_fields(fields, &fields_static, quote!(__object));
                decode_arms.push(quote! {
                    #index => __arri::decode_inline_variant(
                        node,
                        ctx,
                        &__MODEL,
                        __KEY,
                        __TAGS[#index],
                        &#fields_static,
                        |__object, ctx| {
                            #(#lets)*
                            ::core::option::Option::Some(Self::#name { #(#inits),* })
                        },
                    )
                });
            }
            VariantPayload::Newtype(ty) => {
                mapping.push(quote! {
                    mapping.variant::<#ty>(ctx, &__VARIANTS[#index])?;
                });
                encode_arms.push(quote! {
                    Self::#name(__payload) => __arri::encode_variant(ctx, __KEY, __TAGS[#index], __payload)
                });
                decode_arms.push(quote! {
                    #index => __arri::decode_variant::<#ty>(node, ctx, __KEY, __TAGS[#index]).map(Self::#name)
                });
            }
        }
    }

    let variant_infos = union.variants.iter().map(|variant| {
        let tag = &variant.tag;
        let description = optional_str(variant.description.as_deref());
        let deprecated = variant.deprecated;
        quote! {
            __arri::VariantInfo {
                tag: #tag,
                description: #description,
                deprecated: #deprecated,
            }
        }
    });

    quote! {
        static __MODEL: __arri::ModelInfo = #model_info;
        const __KEY: &str = #key;
        const __TAGS: &[&str] = &[#(#tags),*];
        static __VARIANTS: [__arri::VariantInfo; #count] = [#(#variant_infos),*];
        #(#statics)*

        impl __arri::ArriModel for #ident {
            fn shape() -> __arri::Shape {
                __arri::Shape::Discriminator
            }

            fn type_def(
                ctx: &mut __arri::TypeDefContext,
            ) -> ::core::result::Result<__arri::TypeDef, __arri::TypeDefError> {
                ctx.discriminator_def(&__MODEL, __KEY, |ctx, mapping| {
                    #(#mapping)*
                    ::core::result::Result::Ok(())
                })
            }

            fn encode_json(
                &self,
                ctx: &mut __arri::EncodingContext,
            ) -> ::core::result::Result<(), __arri::EncodeError> {
                match self {
                    #(#encode_arms,)*
                }
            }

            fn decode_json(
                node: &__arri::JsonValue,
                ctx: &mut __arri::ValidationContext,
            ) -> ::core::option::Option<Self> {
                match __arri::discriminator_tag(node, ctx, __KEY, __TAGS)? {
                    #(#decode_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

fn model_info(model: &Model) -> TokenStream {
    let name = &model.name;
    let description = optional_str(model.description.as_deref());
    let deprecated = model.deprecated;
    let strict = model.strict;
    quote! {
        __arri::ModelInfo {
            name: #name,
            description: #description,
            deprecated: #deprecated,
            strict: #strict,
        }
    }
}

fn field_infos(fields: &[FieldDef]) -> Vec<TokenStream> {
    fields
        .iter()
        .map(|field| {
            let [camel, pascal, snake] = &field.keys;
            let description = optional_str(field.description.as_deref());
            let deprecated = field.deprecated;
            quote! {
                __arri::FieldInfo {
                    keys: [#camel, #pascal, #snake],
                    description: #description,
                    deprecated: #deprecated,
                }
            }
        })
        .collect()
}

fn enum_values(values: &[String]) -> TokenStream {
    quote!(&[#(#values),*])
}

fn build_fields(fields: &[FieldDef], statics: &Ident) -> Vec<TokenStream> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let ty = &field.ty;
            match &field.enum_values {
                Some(values) => {
                    let values = enum_values(values);
                    quote!(object.enum_field::<#ty>(ctx, &#statics[#index], #values)?;)
                }
                None => quote!(object.field::<#ty>(ctx, &#statics[#index])?;),
            }
        })
        .collect()
}

fn encode_fields(
    fields: &[FieldDef],
    statics: &Ident,
    accessors: &[TokenStream],
) -> Vec<TokenStream> {
    fields
        .iter()
        .zip(accessors)
        .enumerate()
        .map(|(index, (field, accessor))| match &field.enum_values {
            Some(values) => {
                let values = enum_values(values);
                quote!(__arri::encode_enum_field(ctx, &#statics[#index], #accessor, #values)?;)
            }
            None => quote!(__arri::encode_field(ctx, &#statics[#index], #accessor)?;),
        })
        .collect()
}

/// `let` statements decoding every field, then the initialisers that
/// unwrap them once all errors have been collected
fn decode_fields(
    fields: &[FieldDef],
    statics: &Ident,
    object: TokenStream,
) -> (Vec<TokenStream>, Vec<TokenStream>) {
    let mut lets = Vec::with_capacity(fields.len());
    let mut inits = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let ty = &field.ty;
        let member = &field.member;
        let binding = binding(index);
        lets.push(match &field.enum_values {
            Some(values) => {
                let values = enum_values(values);
                quote! {
                    let #binding = __arri::decode_enum_field::<#ty>(#object, ctx, &#statics[#index], #values);
                }
            }
            None => quote! {
                let #binding = __arri::decode_field::<#ty>(#object, ctx, &#statics[#index]);
            },
        });
        inits.push(quote!(#member: #binding?));
    }
    (lets, inits)
}

fn query_fields(fields: &[FieldDef], statics: &Ident) -> (Vec<TokenStream>, Vec<TokenStream>) {
    let mut lets = Vec::with_capacity(fields.len());
    let mut inits = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let ty = &field.ty;
        let member = &field.member;
        let binding = binding(index);
        lets.push(match &field.enum_values {
            Some(values) => {
                let values = enum_values(values);
                quote! {
                    let #binding = __arri::decode_query_enum_field::<#ty>(query, ctx, &#statics[#index], #values);
                }
            }
            None => quote! {
                let #binding = __arri::decode_query_field::<#ty>(query, ctx, &#statics[#index]);
            },
        });
        inits.push(quote!(#member: #binding?));
    }
    (lets, inits)
}

fn binding(index: usize) -> Ident {
    Ident::new(&format!("__f{index}"), Span::call_site())
}

fn optional_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}
