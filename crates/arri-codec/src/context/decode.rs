use arri_protocol::KeyCasing;

use super::{PathMark, Paths};
use crate::error::{DecodeError, DecodeErrorKind};
use crate::options::CodecOptions;

/// State of a single decode call.
///
/// Decoders report problems through [`push_error`](Self::push_error) and keep
/// going; only exceeding the depth bound halts the call.
#[derive(Debug)]
pub struct ValidationContext {
    key_casing: KeyCasing,
    max_depth: usize,
    current_depth: usize,
    paths: Paths,
    errors: Vec<DecodeError>,
    halted: bool,
    /// Set by a union decoder for the variant struct it is about to decode
    discriminator_key: Option<&'static str>,
}

impl ValidationContext {
    pub fn new(options: &CodecOptions) -> Self {
        Self {
            key_casing: options.key_casing,
            max_depth: options.max_depth,
            current_depth: 0,
            paths: Paths::default(),
            errors: Vec::new(),
            halted: false,
            discriminator_key: None,
        }
    }

    pub fn key_casing(&self) -> KeyCasing {
        self.key_casing
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    pub fn instance_path(&self) -> &str {
        self.paths.instance()
    }

    pub fn schema_path(&self) -> &str {
        self.paths.schema()
    }

    /// Step into an object or array. Returns `false` and halts the call
    /// once `max_depth` would be exceeded.
    pub fn enter(&mut self) -> bool {
        if self.halted {
            return false;
        }
        if self.current_depth >= self.max_depth {
            self.push_error(DecodeErrorKind::MaxDepthExceeded {
                max: self.max_depth,
            });
            self.halted = true;
            return false;
        }
        self.current_depth += 1;
        true
    }

    pub fn leave(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// True after a fatal error; decoders stop visiting siblings
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Record an error at the current position
    pub fn push_error(&mut self, kind: DecodeErrorKind) {
        self.push_error_at(kind, None);
    }

    /// Record an error whose schema location is one keyword below the
    /// current position (`type`, `enum`, `discriminator`, ...)
    pub fn push_keyword_error(&mut self, kind: DecodeErrorKind, keyword: &str) {
        self.push_error_at(kind, Some(keyword));
    }

    fn push_error_at(&mut self, kind: DecodeErrorKind, keyword: Option<&str>) {
        if self.halted {
            return;
        }
        let mut schema_path = self.paths.schema().to_string();
        if let Some(keyword) = keyword {
            schema_path.push('/');
            schema_path.push_str(keyword);
        }
        tracing::debug!(
            instance_path = self.paths.instance(),
            schema_path = %schema_path,
            "rejected input: {}",
            kind
        );
        self.errors.push(DecodeError {
            kind,
            instance_path: self.paths.instance().to_string(),
            schema_path,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<DecodeError> {
        self.errors
    }

    pub fn enter_field(&mut self, key: &str, optional: bool) -> PathMark {
        self.paths.enter_field(key, optional)
    }

    pub fn enter_element(&mut self, index: usize) -> PathMark {
        self.paths.enter_element(index)
    }

    pub fn enter_value(&mut self, key: &str) -> PathMark {
        self.paths.enter_value(key)
    }

    pub fn enter_variant(&mut self, tag: &str) -> PathMark {
        self.paths.enter_variant(tag)
    }

    /// Descend into a named key of the instance without moving the schema
    pub fn enter_instance_key(&mut self, key: &str) -> PathMark {
        let mark = self.paths.mark();
        self.paths.push_instance(key);
        mark
    }

    pub fn restore_path(&mut self, mark: PathMark) {
        self.paths.restore(mark);
    }

    pub fn set_discriminator_key(&mut self, key: &'static str) {
        self.discriminator_key = Some(key);
    }

    /// The discriminator key of the enclosing union, consumed by the first
    /// struct decoded after it was set
    pub fn take_discriminator_key(&mut self) -> Option<&'static str> {
        self.discriminator_key.take()
    }
}

/// Decoded URL query string: ordered `(key, value)` pairs, keys may repeat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_carry_paths() {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        let mark = ctx.enter_field("x", false);
        ctx.push_keyword_error(
            DecodeErrorKind::TypeMismatch {
                expected: "int32".to_string(),
                got: "string",
            },
            "type",
        );
        ctx.restore_path(mark);
        let mark = ctx.enter_field("y", true);
        ctx.push_error(DecodeErrorKind::BadTimestamp);
        ctx.restore_path(mark);

        let errors = ctx.into_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].instance_path, "/x");
        assert_eq!(errors[0].schema_path, "/properties/x/type");
        assert_eq!(errors[1].schema_path, "/optionalProperties/y");
    }

    #[test]
    fn test_depth_halts() {
        let mut ctx = ValidationContext::new(&CodecOptions::default().with_max_depth(2));
        assert!(ctx.enter());
        assert!(ctx.enter());
        assert!(!ctx.enter());
        assert!(ctx.is_halted());
        ctx.push_error(DecodeErrorKind::MissingRequiredField);
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(
            ctx.errors()[0].kind,
            DecodeErrorKind::MaxDepthExceeded { max: 2 }
        );
    }

    #[test]
    fn test_discriminator_key_is_consumed_once() {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        ctx.set_discriminator_key("type");
        assert_eq!(ctx.take_discriminator_key(), Some("type"));
        assert_eq!(ctx.take_discriminator_key(), None);
    }

    #[test]
    fn test_query_params() {
        let query: QueryParams = [("a", "1"), ("b", "x"), ("a", "2")].into_iter().collect();
        assert_eq!(query.get("a"), Some("1"));
        assert_eq!(query.get_all("a").collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(query.contains_key("b"));
        assert_eq!(query.get("c"), None);
        assert_eq!(query.len(), 3);
    }
}
