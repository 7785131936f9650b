//! Wire-level helpers shared by every encoder and decoder

pub mod number;
pub mod pointer;
pub mod string;
pub mod timestamp;
pub mod value;

pub use number::{append_float32, append_float64, append_integer, append_quoted_integer};
pub use pointer::escape_pointer_token;
pub use string::{append_normalized_bytes, append_normalized_string};
pub use timestamp::{append_timestamp, format_timestamp, parse_timestamp};
pub use value::{append_scalar, json_type_name, value_depth};
