use arri_protocol::KeyCasing;

use super::{PathMark, Paths};
use crate::error::{EncodeError, EncodeErrorKind};
use crate::options::CodecOptions;
use crate::wire;

/// Saved separator state of the enclosing object or array
#[derive(Debug)]
#[must_use]
pub struct ScopeMark {
    has_keys: bool,
}

/// State of a single encode call: the output buffer plus everything needed
/// to place commas, bound depth and locate errors.
#[derive(Debug)]
pub struct EncodingContext {
    buffer: Vec<u8>,
    key_casing: KeyCasing,
    max_depth: usize,
    current_depth: usize,
    /// Whether the innermost open object/array already holds an entry
    has_keys: bool,
    paths: Paths,
    /// Key/value pair the next object must open with
    discriminator: Option<(&'static str, &'static str)>,
}

impl EncodingContext {
    pub fn new(options: &CodecOptions) -> Self {
        Self::with_buffer(options, Vec::new())
    }

    /// Reuse an allocation; the buffer is cleared first
    pub fn with_buffer(options: &CodecOptions, mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        Self {
            buffer,
            key_casing: options.key_casing,
            max_depth: options.max_depth,
            current_depth: 0,
            has_keys: false,
            paths: Paths::default(),
            discriminator: None,
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

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Direct access for custom encoders; the caller is responsible for
    /// producing valid JSON
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_null(&mut self) {
        self.buffer.extend_from_slice(b"null");
    }

    /// Write a quoted, escaped string
    pub fn write_string(&mut self, value: &str) {
        wire::append_normalized_string(&mut self.buffer, value);
    }

    /// Open an object. A pending discriminator pair is written as the first
    /// entry.
    pub fn begin_object(&mut self) -> Result<ScopeMark, EncodeError> {
        self.descend()?;
        self.buffer.push(b'{');
        let mark = ScopeMark {
            has_keys: self.has_keys,
        };
        self.has_keys = false;
        if let Some((key, value)) = self.discriminator.take() {
            self.write_key(key);
            self.write_string(value);
        }
        Ok(mark)
    }

    pub fn end_object(&mut self, mark: ScopeMark) {
        self.buffer.push(b'}');
        self.ascend(mark);
    }

    pub fn begin_array(&mut self) -> Result<ScopeMark, EncodeError> {
        self.descend()?;
        self.buffer.push(b'[');
        let mark = ScopeMark {
            has_keys: self.has_keys,
        };
        self.has_keys = false;
        Ok(mark)
    }

    pub fn end_array(&mut self, mark: ScopeMark) {
        self.buffer.push(b']');
        self.ascend(mark);
    }

    /// Comma before every entry but the first
    pub fn write_separator(&mut self) {
        if self.has_keys {
            self.buffer.push(b',');
        }
        self.has_keys = true;
    }

    /// Separator, quoted key and colon
    pub fn write_key(&mut self, key: &str) {
        self.write_separator();
        self.write_string(key);
        self.buffer.push(b':');
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

    /// Move the instance path only, for values with no schema below them
    pub fn enter_instance_key(&mut self, key: &str) -> PathMark {
        let mark = self.paths.mark();
        self.paths.push_instance(key);
        mark
    }

    pub fn enter_instance_index(&mut self, index: usize) -> PathMark {
        let mark = self.paths.mark();
        self.paths.push_index(index);
        mark
    }

    pub fn restore_path(&mut self, mark: PathMark) {
        self.paths.restore(mark);
    }

    /// Make the next [`begin_object`](Self::begin_object) open with
    /// `"key":"value"`
    pub fn set_discriminator(&mut self, key: &'static str, value: &'static str) {
        self.discriminator = Some((key, value));
    }

    pub fn has_pending_discriminator(&self) -> bool {
        self.discriminator.is_some()
    }

    pub(crate) fn clear_discriminator(&mut self) {
        self.discriminator = None;
    }

    /// An error located at the current position
    pub fn error(&self, kind: EncodeErrorKind) -> EncodeError {
        EncodeError {
            kind,
            instance_path: self.paths.instance().to_string(),
            schema_path: self.paths.schema().to_string(),
        }
    }

    fn descend(&mut self) -> Result<(), EncodeError> {
        if self.current_depth >= self.max_depth {
            return Err(self.error(EncodeErrorKind::MaxDepthExceeded {
                max: self.max_depth,
            }));
        }
        self.current_depth += 1;
        Ok(())
    }

    fn ascend(&mut self, mark: ScopeMark) {
        self.current_depth = self.current_depth.saturating_sub(1);
        self.has_keys = mark.has_keys;
    }
}
