#![no_std]
#![warn(missing_docs)]

//! Dynamic byte strings with compact capacity headers.
//!
//! The one type here, [`ByteString`], keeps short contents inline in the
//! value itself and moves longer contents to a heap buffer whose capacity
//! is tracked as a two-byte mantissa/exponent pair. On top of that sit
//! byte-level editing, search and in-place replace operations, a
//! codepoint-level view that decodes UTF-8 on the fly without trusting the
//! contents, and two interchange encodings (quoted literals and a
//! variable-width length prefix).
//!
//! ```
//! use corda::ByteString;
//!
//! let mut s = ByteString::from_bytes(b"Hello, world!");
//! assert!(s.is_inline());
//!
//! s.replace_first(b"world", b"Juliette");
//! assert_eq!(s, *"Hello, Juliette!");
//! assert_eq!(s.codepoint_count(), 16);
//! ```

extern crate alloc;

pub mod codec;
pub mod string;
pub mod utf8;

mod storage;

pub use crate::codec::{read_length_prefix, write_length_prefix, DecodeError};
pub use crate::storage::TryReserveError;
pub use crate::string::ByteString;
pub use crate::utf8::{CodepointIndices, Codepoints, InvalidUtf8};
