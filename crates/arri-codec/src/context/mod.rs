//! Per-call state for schema building, encoding and decoding

mod decode;
mod encode;
mod typedef;

pub use decode::{QueryParams, ValidationContext};
pub use encode::{EncodingContext, ScopeMark};
pub use typedef::{MappingDefBuilder, ObjectDefBuilder, TypeDefContext};

use crate::wire::escape_pointer_token;

/// Position to return to after a descent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PathMark {
    instance: usize,
    schema: usize,
}

/// Instance and schema JSON pointers, grown on descent and truncated on return
#[derive(Debug, Clone, Default)]
pub(crate) struct Paths {
    instance: String,
    schema: String,
}

impl Paths {
    pub(crate) fn mark(&self) -> PathMark {
        PathMark {
            instance: self.instance.len(),
            schema: self.schema.len(),
        }
    }

    pub(crate) fn restore(&mut self, mark: PathMark) {
        self.instance.truncate(mark.instance);
        self.schema.truncate(mark.schema);
    }

    pub(crate) fn push_instance(&mut self, token: &str) {
        self.instance.push('/');
        self.instance.push_str(&escape_pointer_token(token));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        use std::fmt::Write;
        let _ = write!(self.instance, "/{}", index);
    }

    pub(crate) fn push_schema(&mut self, token: &str) {
        self.schema.push('/');
        self.schema.push_str(&escape_pointer_token(token));
    }

    /// `/<key>` in the instance, `/properties/<key>` or
    /// `/optionalProperties/<key>` in the schema
    pub(crate) fn enter_field(&mut self, key: &str, optional: bool) -> PathMark {
        let mark = self.mark();
        self.push_instance(key);
        self.push_schema(if optional {
            "optionalProperties"
        } else {
            "properties"
        });
        self.push_schema(key);
        mark
    }

    pub(crate) fn enter_element(&mut self, index: usize) -> PathMark {
        let mark = self.mark();
        self.push_index(index);
        self.push_schema("elements");
        mark
    }

    pub(crate) fn enter_value(&mut self, key: &str) -> PathMark {
        let mark = self.mark();
        self.push_instance(key);
        self.push_schema("values");
        mark
    }

    /// Variants share their object with the union, so only the schema moves
    pub(crate) fn enter_variant(&mut self, tag: &str) -> PathMark {
        let mark = self.mark();
        self.push_schema("mapping");
        self.push_schema(tag);
        mark
    }

    pub(crate) fn instance(&self) -> &str {
        &self.instance
    }

    pub(crate) fn schema(&self) -> &str {
        &self.schema
    }
}
