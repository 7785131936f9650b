//! JSON pointer tokens (RFC 6901)

use std::borrow::Cow;

/// Escape `~` as `~0` and `/` as `~1`
pub fn escape_pointer_token(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}
