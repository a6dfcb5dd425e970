===== src/error.rs =====
//! Error taxonomy and the diagnostic record attached to a failed parse.
//!
//! Mirrors the `e_fj_error_code` taxonomy of the reference implementation:
//! every fallible operation returns one of these variants, and parse
//! failures additionally populate [`ParseError`] with enough context to
//! print a caret diagnostic.

use std::fmt;

/// The width of the context window kept around a failing byte.
const CONTEXT_WINDOW: usize = 16;

/// Error kinds, in the taxonomy of spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorCode {
    #[error("ok")]
    Ok,
    #[error("invalid syntax")]
    Invalid,
    #[error("unexpected end of input")]
    Incomplete,
    #[error("non-whitespace bytes remain after the top-level value")]
    ExtraData,
    #[error("caller-provided token buffer is too small")]
    NoFreeTokens,
    #[error("key length exceeds the configured width")]
    KeyLenOverflow,
    #[error("value length exceeds the configured width")]
    ValueLenOverflow,
    #[error("child count exceeds the configured width")]
    ChildsOverflow,
    #[error("nesting depth exceeds the configured maximum")]
    DepthExceeded,
    #[error("binary blob is truncated or malformed")]
    Truncated,
}

/// A window of source bytes around the offset that failed, plus the
/// offset of the failing byte within that window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    bytes: [u8; CONTEXT_WINDOW],
    len: usize,
    /// Index of the failing byte within `bytes[..len]`.
    pub cursor: usize,
}

impl ContextWindow {
    fn capture(src: &[u8], at: usize) -> Self {
        let start = at.saturating_sub(CONTEXT_WINDOW / 2);
        let end = (start + CONTEXT_WINDOW).min(src.len());
        let start = end.saturating_sub(CONTEXT_WINDOW.min(end));
        let slice = &src[start..end];
        let mut bytes = [0u8; CONTEXT_WINDOW];
        bytes[..slice.len()].copy_from_slice(slice);
        ContextWindow {
            bytes,
            len: slice.len(),
            cursor: at - start,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Full diagnostic record for a failed parse: offset, context window,
/// and the call-chain of parser functions that were active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    /// Byte offset into the source buffer where the failure was detected.
    pub offset: usize,
    pub context: ContextWindow,
    /// Name of the function that raised the error.
    pub reporter: &'static str,
    /// Name of the enclosing parser function, if any.
    pub caller: Option<&'static str>,
}

impl ParseError {
    pub fn new(
        code: ErrorCode,
        src: &[u8],
        offset: usize,
        reporter: &'static str,
        caller: Option<&'static str>,
    ) -> Self {
        log::debug!("parse error {:?} at byte {} in {}", code, offset, reporter);
        ParseError {
            code,
            offset,
            context: ContextWindow::capture(src, offset.min(src.len())),
            reporter,
            caller,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at byte {} (in {})", self.code, self.offset, self.reporter)?;
        if let Some(caller) = self.caller {
            writeln!(f, "  called from {caller}")?;
        }
        let window = self.context.as_bytes();
        let rendered: String = window
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(f, "  {rendered}")?;
        write!(f, "  {}^", " ".repeat(self.context.cursor))
    }
}

impl std::error::Error for ParseError {}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_centers_on_offset() {
        let src = b"0123456789abcdefghij";
        let err = ParseError::new(ErrorCode::Invalid, src, 10, "parse_value", None);
        assert_eq!(err.offset, 10);
        assert!(err.context.as_bytes().len() <= CONTEXT_WINDOW);
    }

    #[test]
    fn context_window_near_start_of_buffer() {
        let src = b"ab";
        let err = ParseError::new(ErrorCode::Incomplete, src, 1, "parse_string", Some("parse_object"));
        assert_eq!(err.context.as_bytes(), b"ab");
        assert_eq!(err.caller, Some("parse_object"));
    }

    #[test]
    fn display_includes_caret() {
        let src = b"{\"a\":}";
        let err = ParseError::new(ErrorCode::Invalid, src, 5, "parse_value", Some("parse_object"));
        let rendered = err.to_string();
        assert!(rendered.contains('^'));
        assert!(rendered.contains("parse_value"));
    }
}


