//! [`ArriModel`](crate::ArriModel) for std, chrono and serde_json types

mod any;
mod collections;
mod scalar;
mod wrappers;

use serde_json::Value;

use crate::context::ValidationContext;
use crate::error::DecodeErrorKind;
use crate::wire::json_type_name;

/// Record a `TypeMismatch` against the `type` keyword of the current node
pub(crate) fn type_mismatch(ctx: &mut ValidationContext, expected: &str, node: &Value) {
    mismatch_at(ctx, expected, json_type_name(node), "type");
}

pub(crate) fn mismatch_at(
    ctx: &mut ValidationContext,
    expected: &str,
    got: &'static str,
    keyword: &str,
) {
    ctx.push_keyword_error(
        DecodeErrorKind::TypeMismatch {
            expected: expected.to_string(),
            got,
        },
        keyword,
    );
}
