===== src/lib.rs =====
//! A single-pass JSON parser that writes a flat, contiguous array of
//! fixed-size tokens rather than a heap-linked tree. Containers carry
//! `parent`/`end` indices into that same array, so subtree skipping,
//! key lookup, and comparison are all array walks with no allocation.
//!
//! ```
//! use flatjson::{parse, Config};
//!
//! let doc = parse(br#"{"a":1,"b":[2,3]}"#, &Config::default()).unwrap();
//! assert_eq!(doc.members(), 2);
//! ```

pub mod binary;
pub mod classify;
pub mod compare;
pub mod config;
pub mod document;
pub mod error;
#[cfg(feature = "mmap")]
pub mod io;
pub mod navigator;
pub mod parser;
pub mod serializer;
pub mod simd;
pub mod token;

pub use compare::{CompareMode, CompareOutcome, CompareResult};
pub use config::Config;
pub use document::Document;
pub use error::{ErrorCode, ParseError, Result};
pub use navigator::Iter;
pub use serializer::Indent;
pub use token::{SourceSpan, Token, TokenFlags, TokenType};

/// Parses `src` and returns a [`Document`] that owns a copy of the
/// source bytes alongside its token buffer.
pub fn parse(src: &[u8], cfg: &Config) -> Result<Document> {
    Document::parse(src, cfg)
}

/// Parses `src` directly into a caller-owned token buffer, borrowing
/// `src` for the lifetime of the call. Prefer this over [`parse`] when
/// the source buffer already outlives the tokens and an extra copy
/// would be wasted.
pub fn parse_into(tokens: &mut Vec<Token>, src: &[u8], cfg: &Config) -> Result<usize> {
    parser::parse_into(tokens, src, cfg, None)
}

/// Counts the tokens `src` would need without materializing them; see
/// [`parser::count_tokens`] for the two-pass sizing discipline this
/// supports.
pub fn count_tokens(src: &[u8], cfg: &Config) -> Result<usize> {
    parser::count_tokens(src, cfg)
}
