//! Derived models end to end: schema, ArriJSON encoding and validation

use std::collections::{BTreeMap, HashMap};

use arri_codec::prelude::*;
use arri_codec::{
    DecodeErrorKind, DerivedSchema, EncodeErrorKind, decode_json_with, derive_typedef,
    encode_json_with,
};
use arri_protocol::RpcError;
use chrono::{DateTime, TimeZone, Utc};

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
#[arri(description = "A registered user")]
struct User {
    user_id: String,
    email: Option<String>,
    nickname: Nullable<String>,
    #[arri(enum_values = "ADMIN,MEMBER")]
    role: String,
    #[arri(deprecated)]
    login_count: u64,
    created_at: DateTime<Utc>,
}

#[derive(ArriModel, Debug, Clone, Copy, PartialEq)]
enum Status {
    Active,
    #[arri(rename = "ON_HOLD")]
    OnHold,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct Account {
    status: Status,
    tags: BTreeMap<String, bool>,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
#[arri(discriminator = "typeName")]
enum Message {
    A { id: String },
    B { id: String, name: String },
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct CreatedEvent {
    id: String,
    at: DateTime<Utc>,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
enum Event {
    Created(CreatedEvent),
    #[arri(rename = "DELETED", description = "Soft delete")]
    Deleted { id: String },
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct TreeNode {
    value: i32,
    children: Vec<TreeNode>,
    next: Option<Box<TreeNode>>,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct StrictParams {
    id: String,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
#[arri(strict = false)]
struct LooseParams {
    id: String,
}

fn options() -> CodecOptions {
    CodecOptions::default()
}

fn encode<T: ArriModel>(value: &T) -> String {
    String::from_utf8(encode_json_with(value, &options()).unwrap()).unwrap()
}

fn decode<T: ArriModel>(json: &str) -> Result<T, ValidationErrors> {
    decode_json_with(json.as_bytes(), &options())
}

fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 1, 1, 16, 0, 0).unwrap()
}

fn sample_user() -> User {
    User {
        user_id: "u1".to_string(),
        email: None,
        nickname: Nullable::Null,
        role: "ADMIN".to_string(),
        login_count: 9_007_199_254_740_993,
        created_at: timestamp(),
    }
}

#[test]
fn test_struct_schema() {
    let schema = DerivedSchema::derive::<User>(KeyCasing::Camel).unwrap();
    let def = serde_json::to_value(&schema.type_def).unwrap();
    assert_eq!(
        def,
        serde_json::json!({
            "metadata": {"id": "User", "description": "A registered user"},
            "properties": {
                "userId": {"type": "string"},
                "nickname": {"nullable": true, "type": "string"},
                "role": {"enum": ["ADMIN", "MEMBER"]},
                "loginCount": {"metadata": {"isDeprecated": true}, "type": "uint64"},
                "createdAt": {"type": "timestamp"}
            },
            "optionalProperties": {
                "email": {"type": "string"}
            }
        })
    );
    let keys: Vec<&String> = schema.type_def.properties.as_ref().unwrap().keys().collect();
    assert_eq!(keys, ["userId", "nickname", "role", "loginCount", "createdAt"]);
    assert!(schema.definitions.is_empty());
}

#[test]
fn test_scalar_fields_on_the_wire() {
    #[derive(ArriModel)]
    struct Small {
        x: i32,
    }
    #[derive(ArriModel)]
    struct Large {
        x: i64,
    }
    #[derive(ArriModel)]
    struct Stamp {
        t: DateTime<Utc>,
    }
    assert_eq!(encode(&Small { x: 42 }), r#"{"x":42}"#);
    assert_eq!(encode(&Large { x: 1000 }), r#"{"x":"1000"}"#);
    assert_eq!(
        encode(&Stamp { t: timestamp() }),
        r#"{"t":"2001-01-01T16:00:00.000Z"}"#
    );
}

#[test]
fn test_user_round_trip() {
    let user = sample_user();
    let json = encode(&user);
    assert_eq!(
        json,
        r#"{"userId":"u1","nickname":null,"role":"ADMIN","loginCount":"9007199254740993","createdAt":"2001-01-01T16:00:00.000Z"}"#
    );
    assert_eq!(decode::<User>(&json).unwrap(), user);

    let with_email = User {
        email: Some("a@b.c".to_string()),
        nickname: Nullable::Value("al".to_string()),
        ..sample_user()
    };
    assert_eq!(decode::<User>(&encode(&with_email)).unwrap(), with_email);
}

#[test]
fn test_optional_and_nullable_states() {
    #[derive(ArriModel, Debug, PartialEq)]
    struct Profile {
        a: String,
        b: Option<String>,
        c: Option<Nullable<String>>,
    }
    let absent = Profile {
        a: "x".to_string(),
        b: None,
        c: None,
    };
    assert_eq!(encode(&absent), r#"{"a":"x"}"#);
    assert_eq!(decode::<Profile>(r#"{"a":"x"}"#).unwrap(), absent);

    let null = Profile {
        c: Some(Nullable::Null),
        ..absent
    };
    assert_eq!(encode(&null), r#"{"a":"x","c":null}"#);
    assert_eq!(decode::<Profile>(r#"{"a":"x","c":null}"#).unwrap(), null);

    // optional without nullable does not accept null
    let errors = decode::<Profile>(r#"{"a":"x","b":null}"#).unwrap_err();
    assert_eq!(errors.instance_paths(), vec!["/b"]);
}

#[test]
fn test_nullable_field_must_be_present() {
    #[derive(ArriModel, Debug, PartialEq)]
    struct Named {
        a: Nullable<String>,
    }
    assert_eq!(encode(&Named { a: Nullable::Null }), r#"{"a":null}"#);
    let errors = decode::<Named>("{}").unwrap_err();
    assert_eq!(errors.0[0].kind, DecodeErrorKind::MissingRequiredField);
    assert_eq!(errors.0[0].instance_path, "/a");
    assert_eq!(errors.0[0].schema_path, "/properties/a");
}

#[test]
fn test_nullable_option_rejected_at_derivation() {
    type MaybeName = Option<String>;

    #[derive(ArriModel)]
    struct Aliased {
        name: Nullable<MaybeName>,
    }
    let err = derive_typedef::<Aliased>(KeyCasing::Camel).unwrap_err();
    assert_eq!(
        err,
        TypeDefError::NullableOption {
            path: "/properties/name".to_string()
        }
    );
}

#[test]
fn test_option_inside_collection_rejected_at_derivation() {
    type Slot = Option<Nullable<String>>;

    #[derive(ArriModel)]
    struct Tags {
        items: Vec<Slot>,
    }
    let err = derive_typedef::<Tags>(KeyCasing::Camel).unwrap_err();
    assert_eq!(
        err,
        TypeDefError::OptionOutsideField {
            path: "/properties/items/elements".to_string()
        }
    );
}

#[test]
fn test_string_enum() {
    let def = derive_typedef::<Status>(KeyCasing::Camel).unwrap();
    assert_eq!(
        def.type_def.enum_values,
        Some(vec!["Active".to_string(), "ON_HOLD".to_string()])
    );
    assert_eq!(def.id(), Some("Status"));

    let account = Account {
        status: Status::OnHold,
        tags: BTreeMap::new(),
    };
    assert_eq!(encode(&account), r#"{"status":"ON_HOLD","tags":{}}"#);
    assert_eq!(decode::<Account>(r#"{"status":"ON_HOLD","tags":{}}"#).unwrap(), account);

    let errors = decode::<Account>(r#"{"status":"on_hold","tags":{}}"#).unwrap_err();
    assert_eq!(
        errors.0[0].kind,
        DecodeErrorKind::EnumNotMember {
            permitted: vec!["Active".to_string(), "ON_HOLD".to_string()]
        }
    );
    assert_eq!(errors.0[0].instance_path, "/status");
    assert_eq!(errors.0[0].schema_path, "/properties/status/enum");
}

#[test]
fn test_enum_values_field_rejects_non_members() {
    let json = encode(&sample_user()).replace("ADMIN", "OWNER");
    let errors = decode::<User>(&json).unwrap_err();
    assert_eq!(errors.instance_paths(), vec!["/role"]);
}

#[test]
fn test_map_keys_are_sorted() {
    #[derive(ArriModel)]
    struct Flags {
        m: HashMap<String, bool>,
    }
    let flags = Flags {
        m: HashMap::from([("b".to_string(), false), ("a".to_string(), true)]),
    };
    assert_eq!(encode(&flags), r#"{"m":{"a":true,"b":false}}"#);
}

#[test]
fn test_inline_discriminator() {
    let value = Message::B {
        id: "1".to_string(),
        name: "n".to_string(),
    };
    let json = encode(&value);
    assert_eq!(json, r#"{"typeName":"B","id":"1","name":"n"}"#);
    assert_eq!(decode::<Message>(&json).unwrap(), value);
    assert_eq!(
        decode::<Message>(r#"{"id":"2","typeName":"A"}"#).unwrap(),
        Message::A { id: "2".to_string() }
    );

    let schema = derive_typedef::<Message>(KeyCasing::Camel).unwrap();
    let def = serde_json::to_value(&schema.type_def).unwrap();
    assert_eq!(
        def,
        serde_json::json!({
            "metadata": {"id": "Message"},
            "discriminator": "typeName",
            "mapping": {
                "A": {"properties": {"id": {"type": "string"}}},
                "B": {"properties": {"id": {"type": "string"}, "name": {"type": "string"}}}
            }
        })
    );
}

#[test]
fn test_discriminator_errors() {
    let missing = decode::<Message>(r#"{"id":"1"}"#).unwrap_err();
    assert_eq!(
        missing.0[0].kind,
        DecodeErrorKind::MissingDiscriminatorKey {
            key: "typeName".to_string()
        }
    );
    assert_eq!(missing.0[0].instance_path, "/typeName");
    assert_eq!(missing.0[0].schema_path, "/discriminator");

    let unknown = decode::<Message>(r#"{"typeName":"C","id":"1"}"#).unwrap_err();
    assert!(matches!(
        &unknown.0[0].kind,
        DecodeErrorKind::UnknownDiscriminator { value, permitted, .. }
            if value == "C" && permitted == &["A".to_string(), "B".to_string()]
    ));

    let bad_field = decode::<Message>(r#"{"typeName":"B","id":"1"}"#).unwrap_err();
    assert_eq!(bad_field.0[0].instance_path, "/name");
    assert_eq!(bad_field.0[0].schema_path, "/mapping/B/properties/name");
}

#[test]
fn test_newtype_variant() {
    let event = Event::Created(CreatedEvent {
        id: "e1".to_string(),
        at: timestamp(),
    });
    let json = encode(&event);
    assert_eq!(
        json,
        r#"{"type":"Created","id":"e1","at":"2001-01-01T16:00:00.000Z"}"#
    );
    assert_eq!(decode::<Event>(&json).unwrap(), event);

    let deleted = Event::Deleted { id: "e2".to_string() };
    assert_eq!(encode(&deleted), r#"{"type":"DELETED","id":"e2"}"#);

    let schema = derive_typedef::<Event>(KeyCasing::Camel).unwrap();
    let mapping = schema.type_def.mapping.as_ref().unwrap();
    let tags: Vec<&String> = mapping.keys().collect();
    assert_eq!(tags, ["Created", "DELETED"]);
    assert!(mapping["Created"].is_object());
    assert_eq!(
        mapping["DELETED"]
            .metadata
            .as_ref()
            .and_then(|m| m.description.as_deref()),
        Some("Soft delete")
    );
}

#[test]
fn test_variant_must_be_a_struct() {
    #[derive(ArriModel)]
    enum Wrapper {
        Tagged(Status),
    }
    let err = derive_typedef::<Wrapper>(KeyCasing::Camel).unwrap_err();
    assert!(matches!(err, TypeDefError::VariantNotStruct { found: "enum", .. }));
}

#[test]
fn test_variant_payload_cannot_reuse_discriminator_key() {
    #[derive(ArriModel)]
    struct Tagged {
        kind: String,
        id: String,
    }

    #[derive(ArriModel)]
    #[arri(discriminator = "kind")]
    enum Item {
        Tagged(Tagged),
    }
    let err = derive_typedef::<Item>(KeyCasing::Camel).unwrap_err();
    assert_eq!(
        err,
        TypeDefError::DiscriminatorCollision {
            name: "Item".to_string(),
            variant: "Tagged".to_string(),
            key: "kind".to_string(),
        }
    );
}

#[test]
fn test_recursive_model_uses_ref() {
    let schema = derive_typedef::<TreeNode>(KeyCasing::Camel).unwrap();
    let properties = schema.type_def.properties.as_ref().unwrap();
    assert_eq!(
        properties["children"].elements.as_ref().unwrap().reference.as_deref(),
        Some("TreeNode")
    );
    let optional = schema.type_def.optional_properties.as_ref().unwrap();
    assert_eq!(optional["next"].reference.as_deref(), Some("TreeNode"));
    assert_eq!(schema.definitions.keys().collect::<Vec<_>>(), ["TreeNode"]);
    assert_eq!(schema.definitions["TreeNode"], schema.type_def);

    let tree = TreeNode {
        value: 1,
        children: vec![TreeNode {
            value: 2,
            children: Vec::new(),
            next: None,
        }],
        next: Some(Box::new(TreeNode {
            value: 3,
            children: Vec::new(),
            next: None,
        })),
    };
    let json = encode(&tree);
    assert_eq!(
        json,
        r#"{"value":1,"children":[{"value":2,"children":[]}],"next":{"value":3,"children":[]}}"#
    );
    assert_eq!(decode::<TreeNode>(&json).unwrap(), tree);
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct Folder {
    entry: Entry,
}

#[derive(ArriModel, Debug, Clone, PartialEq)]
struct Entry {
    parent: Option<Box<Folder>>,
    next: Option<Box<Entry>>,
}

#[test]
fn test_mutual_recursion_definitions_do_not_depend_on_the_root() {
    let from_folder = derive_typedef::<Folder>(KeyCasing::Camel).unwrap();
    let from_entry = derive_typedef::<Entry>(KeyCasing::Camel).unwrap();

    // each collected definition is the type derived as its own root
    assert_eq!(from_folder.definitions["Entry"], from_entry.type_def);
    assert_eq!(from_folder.definitions["Folder"], from_folder.type_def);
    assert_eq!(from_entry.definitions["Entry"], from_entry.type_def);
    assert!(!from_entry.definitions.contains_key("Folder"));

    for (id, def) in from_entry.definitions.iter().chain(&from_folder.definitions) {
        assert_eq!(def.id(), Some(id.as_str()));
    }

    let folder = Folder {
        entry: Entry {
            parent: Some(Box::new(Folder {
                entry: Entry {
                    parent: None,
                    next: None,
                },
            })),
            next: None,
        },
    };
    let json = encode(&folder);
    assert_eq!(json, r#"{"entry":{"parent":{"entry":{}}}}"#);
    assert_eq!(decode::<Folder>(&json).unwrap(), folder);
}

#[test]
fn test_depth_bound() {
    let mut chain = TreeNode {
        value: 0,
        children: Vec::new(),
        next: None,
    };
    for value in 1..5 {
        chain = TreeNode {
            value,
            children: Vec::new(),
            next: Some(Box::new(chain)),
        };
    }
    let shallow = CodecOptions::default().with_max_depth(3);
    let err = encode_json_with(&chain, &shallow).unwrap_err();
    assert_eq!(err.kind, EncodeErrorKind::MaxDepthExceeded { max: 3 });

    let json = encode(&chain);
    let errors = decode_json_with::<TreeNode>(json.as_bytes(), &shallow).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.0[0].kind, DecodeErrorKind::MaxDepthExceeded { max: 3 });
}

#[test]
fn test_error_accumulation() {
    let errors = decode::<Point>(r#"{"x":"not-an-int","y":"not-an-int"}"#).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.instance_paths(), vec!["/x", "/y"]);
    assert_eq!(errors.0[0].schema_path, "/properties/x/type");

    let missing = decode::<Point>("{}").unwrap_err();
    assert_eq!(missing.instance_paths(), vec!["/x", "/y"]);
}

#[test]
fn test_strict_rejects_unknown_keys() {
    assert!(decode::<StrictParams>(r#"{"id":"1"}"#).is_ok());
    let errors = decode::<StrictParams>(r#"{"id":"1","extra":true}"#).unwrap_err();
    assert_eq!(errors.0[0].kind, DecodeErrorKind::UnknownProperty);
    assert_eq!(errors.0[0].instance_path, "/extra");
    assert_eq!(errors.0[0].schema_path, "/strict");

    let errors = decode::<Point>(r#"{"x":1,"y":2,"z":3}"#).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.0[0].kind, DecodeErrorKind::UnknownProperty);
    assert_eq!(errors.0[0].instance_path, "/z");

    // strict is the default and is left off the schema
    let schema = derive_typedef::<StrictParams>(KeyCasing::Camel).unwrap();
    assert_eq!(schema.type_def.strict, None);
}

#[test]
fn test_strict_opt_out_accepts_unknown_keys() {
    assert_eq!(
        decode::<LooseParams>(r#"{"id":"1","extra":true}"#).unwrap(),
        LooseParams { id: "1".into() }
    );
    let schema = derive_typedef::<LooseParams>(KeyCasing::Camel).unwrap();
    assert_eq!(
        serde_json::to_value(&schema.type_def).unwrap(),
        serde_json::json!({
            "metadata": {"id": "LooseParams"},
            "properties": {"id": {"type": "string"}},
            "strict": false
        })
    );
}

#[test]
fn test_key_casing() {
    let snake = CodecOptions::default().with_key_casing(KeyCasing::Snake);
    let pascal = CodecOptions::default().with_key_casing(KeyCasing::Pascal);
    let user = sample_user();

    let json = String::from_utf8(encode_json_with(&user, &snake).unwrap()).unwrap();
    assert!(json.starts_with(r#"{"user_id":"u1","nickname":null"#));
    assert_eq!(decode_json_with::<User>(json.as_bytes(), &snake).unwrap(), user);

    let json = String::from_utf8(encode_json_with(&user, &pascal).unwrap()).unwrap();
    assert!(json.contains(r#""LoginCount":"9007199254740993""#));

    let schema = derive_typedef::<User>(KeyCasing::Snake).unwrap();
    assert!(schema.type_def.properties.as_ref().unwrap().contains_key("created_at"));
}

#[test]
fn test_query_decoding() {
    #[derive(ArriModel, Debug, PartialEq)]
    struct Search {
        q: String,
        limit: Option<u32>,
        status: Status,
        since: Option<DateTime<Utc>>,
        exact: bool,
    }
    let validator = Validator::<Search, Vec<String>>::new(options()).unwrap();
    let search = validator
        .decode_query([
            ("q", "rust"),
            ("limit", "20"),
            ("status", "ON_HOLD"),
            ("exact", "true"),
        ])
        .unwrap();
    assert_eq!(
        search,
        Search {
            q: "rust".to_string(),
            limit: Some(20),
            status: Status::OnHold,
            since: None,
            exact: true,
        }
    );

    let errors = validator
        .decode_query([("limit", "lots"), ("status", "Gone"), ("exact", "yes")])
        .unwrap_err();
    assert_eq!(errors.instance_paths(), vec!["/q", "/limit", "/status", "/exact"]);
}

#[test]
fn test_query_rejects_nested_fields() {
    let validator = Validator::<Account, Point>::new(options()).unwrap();
    let errors = validator
        .decode_query([("status", "Active"), ("tags", "x")])
        .unwrap_err();
    assert_eq!(errors.0[0].kind, DecodeErrorKind::NestedInQuery { shape: "map" });
    assert_eq!(errors.0[0].instance_path, "/tags");
}

#[test]
fn test_validator_reports_rpc_error() {
    let validator = Validator::<Point, User>::new(options()).unwrap();
    let err: RpcError = validator.decode_json(br#"{"x":true}"#).unwrap_err().into();
    assert_eq!(err.code, 400);
    let entries = err.validation_errors();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].instance_path, "/x");
    assert_eq!(entries[1].message, "Missing required field");
}

#[test]
fn test_schema_is_stable() {
    let first = serde_json::to_string(&DerivedSchema::derive::<User>(KeyCasing::Camel).unwrap().type_def)
        .unwrap();
    let second = serde_json::to_string(&DerivedSchema::derive::<User>(KeyCasing::Camel).unwrap().type_def)
        .unwrap();
    assert_eq!(first, second);
}
