===== src/token.rs =====
//! The flat token representation (component C3's output, component C4's
//! storage unit).
//!
//! A [`Token`] never owns bytes: [`SourceSpan`] is an offset/length pair
//! into the source buffer that produced it, and `parent`/`end` are
//! indices into the same `Vec<Token>` rather than pointers — the
//! safe-Rust lowering of spec §9's "flat token buffer instead of
//! heap-linked tree" design note.

use bitflags::bitflags;

/// One of the nine structural/leaf kinds a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    Invalid = 0,
    String = 1,
    Number = 2,
    Bool = 3,
    Null = 4,
    Object = 5,
    ObjectEnd = 6,
    Array = 7,
    ArrayEnd = 8,
}

impl TokenType {
    pub const fn name(self) -> &'static str {
        match self {
            TokenType::Invalid => "INVALID",
            TokenType::String => "STRING",
            TokenType::Number => "NUMBER",
            TokenType::Bool => "BOOL",
            TokenType::Null => "NULL",
            TokenType::Object => "OBJECT",
            TokenType::ObjectEnd => "OBJECT_END",
            TokenType::Array => "ARRAY",
            TokenType::ArrayEnd => "ARRAY_END",
        }
    }

    pub const fn is_container_start(self) -> bool {
        matches!(self, TokenType::Object | TokenType::Array)
    }

    pub const fn is_container_end(self) -> bool {
        matches!(self, TokenType::ObjectEnd | TokenType::ArrayEnd)
    }

    /// `TryFrom<u8>` without pulling in `num_enum` for nine variants.
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => TokenType::Invalid,
            1 => TokenType::String,
            2 => TokenType::Number,
            3 => TokenType::Bool,
            4 => TokenType::Null,
            5 => TokenType::Object,
            6 => TokenType::ObjectEnd,
            7 => TokenType::Array,
            8 => TokenType::ArrayEnd,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Token-level hint bits. Bit 0 ("simple-only") is an optimization
    /// hint for iteration; correctness never depends on it except for
    /// fast-path selection (spec §3 invariant 7).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        const SIMPLE_ONLY = 0b0000_0001;
    }
}

/// A byte range `[offset, offset+len)` into a source buffer. Empty spans
/// (`len == 0`) stand in for "no reference" (spec §3: key_ref/val_ref
/// "empty" cases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub offset: u32,
    pub len: u32,
}

impl SourceSpan {
    pub const EMPTY: SourceSpan = SourceSpan { offset: 0, len: 0 };

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    pub fn get(self, src: &[u8]) -> &[u8] {
        &src[self.offset as usize..self.offset as usize + self.len as usize]
    }
}

/// One fixed-size record describing a JSON structural element or leaf.
///
/// `parent`/`end` are `Option<u32>` indices into the enclosing
/// `Vec<Token>`: `None` for `parent` marks the root, `None` for `end`
/// marks a leaf (only OBJECT/ARRAY start tokens ever set it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub key: SourceSpan,
    pub val: SourceSpan,
    pub parent: Option<u32>,
    pub end: Option<u32>,
    /// For containers: immediate member slots plus the END token (a
    /// nested container counts as a single slot regardless of its own
    /// subtree size — see SPEC_FULL.md's clarification of this field).
    /// Zero for leaves.
    pub childs: u32,
    pub flags: TokenFlags,
}

impl Token {
    pub fn leaf(kind: TokenType, val: SourceSpan, parent: Option<u32>) -> Self {
        Token {
            kind,
            key: SourceSpan::EMPTY,
            val,
            parent,
            end: None,
            childs: 0,
            flags: TokenFlags::empty(),
        }
    }

    pub fn container_start(kind: TokenType, parent: Option<u32>) -> Self {
        Token {
            kind,
            key: SourceSpan::EMPTY,
            val: SourceSpan::EMPTY,
            parent,
            end: None,
            childs: 0,
            flags: TokenFlags::SIMPLE_ONLY,
        }
    }

    pub fn container_end(kind: TokenType, parent: u32) -> Self {
        Token {
            kind,
            key: SourceSpan::EMPTY,
            val: SourceSpan::EMPTY,
            parent: Some(parent),
            end: None,
            childs: 0,
            flags: TokenFlags::empty(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Number of user-visible member slots (spec §4.5: `childs - 1`).
    pub fn members(&self) -> u32 {
        self.childs.saturating_sub(1)
    }

    pub fn is_simple_only(&self) -> bool {
        self.flags.contains(TokenFlags::SIMPLE_ONLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_type_roundtrips_through_u8() {
        for raw in 0u8..=8 {
            let t = TokenType::from_u8(raw).unwrap();
            assert_eq!(t as u8, raw);
        }
        assert!(TokenType::from_u8(9).is_none());
    }

    #[test]
    fn source_span_empty_semantics() {
        assert!(SourceSpan::EMPTY.is_empty());
        assert!(!SourceSpan { offset: 0, len: 1 }.is_empty());
    }

    #[test]
    fn members_subtracts_end_token() {
        let mut tok = Token::container_start(TokenType::Object, None);
        tok.childs = 6;
        assert_eq!(tok.members(), 5);
    }
}


