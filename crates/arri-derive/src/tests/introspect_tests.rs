use quote::quote;
use syn::{DeriveInput, Type, parse_quote};

use crate::introspect::{
    ModelDef, VariantPayload, field_keys, introspect, nested_option, nullable_wraps_option,
};

fn rejection(input: DeriveInput) -> String {
    introspect(&input).unwrap_err().to_string()
}

#[test]
fn test_struct_fields_and_keys() {
    let input: DeriveInput = parse_quote! {
        struct User {
            user_id: String,
            #[arri(key = "EMAIL")]
            email: Option<String>,
            r#type: String,
        }
    };
    let model = introspect(&input).unwrap();
    assert_eq!(model.name, "User");
    let ModelDef::Struct(fields) = &model.body else {
        panic!("expected a struct model");
    };
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].keys, ["userId", "UserId", "user_id"].map(String::from));
    assert_eq!(fields[1].keys, ["EMAIL", "EMAIL", "EMAIL"].map(String::from));
    assert_eq!(fields[2].keys, ["type", "Type", "type"].map(String::from));
}

#[test]
fn test_id_overrides_name() {
    let input: DeriveInput = parse_quote! {
        #[arri(id = "UserRecord")]
        struct User { id: String }
    };
    assert_eq!(introspect(&input).unwrap().name, "UserRecord");
}

#[test]
fn test_field_keys_from_identifiers() {
    let ident: syn::Ident = parse_quote!(created_at);
    assert_eq!(field_keys(&ident), ["createdAt", "CreatedAt", "created_at"].map(String::from));
}

#[test]
fn test_string_enum_values() {
    let input: DeriveInput = parse_quote! {
        enum Status {
            Active,
            #[arri(rename = "ON_HOLD")]
            OnHold,
        }
    };
    let ModelDef::Enum(values) = introspect(&input).unwrap().body else {
        panic!("expected an enum model");
    };
    let values: Vec<&str> = values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(values, ["Active", "ON_HOLD"]);
}

#[test]
fn test_discriminated_union() {
    let input: DeriveInput = parse_quote! {
        #[arri(discriminator = "kind")]
        enum Shape {
            Circle { radius: f64 },
            #[arri(rename = "RECT")]
            Rect(RectShape),
            Empty {},
        }
    };
    let ModelDef::Discriminator(union) = introspect(&input).unwrap().body else {
        panic!("expected a discriminated union");
    };
    assert_eq!(union.key, "kind");
    let tags: Vec<&str> = union.variants.iter().map(|v| v.tag.as_str()).collect();
    assert_eq!(tags, ["Circle", "RECT", "Empty"]);
    assert!(matches!(&union.variants[0].payload, VariantPayload::Inline(fields) if fields.len() == 1));
    assert!(matches!(&union.variants[1].payload, VariantPayload::Newtype(_)));
    assert!(matches!(&union.variants[2].payload, VariantPayload::Inline(fields) if fields.is_empty()));
}

#[test]
fn test_default_discriminator_key() {
    let input: DeriveInput = parse_quote! {
        enum Event { Created { id: String } }
    };
    let ModelDef::Discriminator(union) = introspect(&input).unwrap().body else {
        panic!("expected a discriminated union");
    };
    assert_eq!(union.key, "type");
}

#[test]
fn test_rejects_generics() {
    assert!(rejection(parse_quote!(struct Page<T> { items: Vec<T> })).contains("generic"));
}

#[test]
fn test_rejects_tuple_and_unit_structs() {
    assert!(rejection(parse_quote!(struct Id(String);)).contains("named fields"));
    assert!(rejection(parse_quote!(struct Marker;)).contains("named fields"));
}

#[test]
fn test_rejects_empty_struct() {
    assert!(rejection(parse_quote!(struct Nothing {})).contains("at least one field"));
}

#[test]
fn test_rejects_empty_enum() {
    assert!(rejection(parse_quote!(enum Never {})).contains("at least one variant"));
}

#[test]
fn test_rejects_mixed_variants() {
    let message = rejection(parse_quote! {
        enum Mixed { Plain, Data { id: String } }
    });
    assert!(message.contains("cannot mix unit and data variants"));
}

#[test]
fn test_rejects_wide_tuple_variants() {
    let message = rejection(parse_quote! {
        enum Pair { Both(A, B) }
    });
    assert!(message.contains("exactly one"));
}

#[test]
fn test_rejects_discriminator_collisions() {
    let message = rejection(parse_quote! {
        #[arri(discriminator = "kind")]
        enum Shape { Circle { kind: String } }
    });
    assert!(message.contains("collides with the discriminator"));
}

#[test]
fn test_rejects_duplicate_keys_and_tags() {
    let keys = rejection(parse_quote! {
        struct User {
            user_id: String,
            #[arri(key = "userId")]
            other: String,
        }
    });
    assert!(keys.contains("duplicate field key `userId`"));

    let tags = rejection(parse_quote! {
        enum Event {
            Created { id: String },
            #[arri(rename = "Created")]
            Updated { id: String },
        }
    });
    assert!(tags.contains("duplicate discriminator value"));
}

#[test]
fn test_rejects_misplaced_container_options() {
    assert!(rejection(parse_quote! {
        #[arri(discriminator = "kind")]
        struct User { id: String }
    })
    .contains("only applies to enums"));
    assert!(rejection(parse_quote! {
        #[arri(discriminator = "kind")]
        enum Status { Active }
    })
    .contains("requires data variants"));
    assert!(rejection(parse_quote! {
        #[arri(strict)]
        enum Status { Active }
    })
    .contains("no effect"));
}

#[test]
fn test_rejects_nullable_option() {
    let message = rejection(parse_quote! {
        struct User { nickname: Nullable<Option<String>> }
    });
    assert!(message.contains("Option<Nullable<T>>"));
}

#[test]
fn test_nullable_option_detection() {
    let cases: [(Type, bool); 5] = [
        (parse_quote!(Nullable<Option<String>>), true),
        (parse_quote!(Vec<arri_codec::Nullable<std::option::Option<u8>>>), true),
        (parse_quote!(Option<Nullable<String>>), false),
        (parse_quote!(Nullable<Vec<Option<String>>>), false),
        (parse_quote!(String), false),
    ];
    for (ty, expected) in cases {
        assert_eq!(nullable_wraps_option(&ty), expected, "{}", quote!(#ty));
    }
}

#[test]
fn test_rejects_option_inside_collections() {
    let message = rejection(parse_quote! {
        struct Tags { items: Vec<Option<Nullable<String>>> }
    });
    assert!(message.contains("only allowed as the field type itself"));
}

#[test]
fn test_nested_option_detection() {
    let cases: [(Type, bool); 7] = [
        (parse_quote!(Option<String>), false),
        (parse_quote!(Option<Nullable<String>>), false),
        (parse_quote!(Box<Option<u8>>), false),
        (parse_quote!(Option<Box<Node>>), false),
        (parse_quote!(Vec<Option<String>>), true),
        (parse_quote!(HashMap<String, std::option::Option<u8>>), true),
        (parse_quote!(Option<Option<u8>>), true),
    ];
    for (ty, expected) in cases {
        assert_eq!(nested_option(&ty, true).is_some(), expected, "{}", quote!(#ty));
    }
}
