//! The value parser (component C3): recursive-descent dispatch over the
//! first non-whitespace byte, emitting tokens in document order.
//!
//! The `count_only` / `fill_tokens` duality of spec §4.3 is realized here
//! as a single generic function parameterized over a [`Sink`], so the two
//! passes are *guaranteed* by the type system to walk identical control
//! flow — a document that fails one pass fails the other the same way
//! (spec §9: "the count pass must execute every branch of the parser
//! that can fail").

use crate::classify;
use crate::config::Config;
use crate::error::{ErrorCode, ParseError, Result};
use crate::simd;
use crate::token::{SourceSpan, Token, TokenFlags, TokenType};

/// Abstracts over "count tokens" vs "write tokens" so the recursive
/// descent in [`Driver`] is written once and compiled into both passes.
trait Sink {
    fn alloc(&mut self) -> std::result::Result<u32, ()>;
    fn set(&mut self, index: u32, token: Token);
    fn get(&self, index: u32) -> Token;
    fn set_flags(&mut self, index: u32, flags: TokenFlags);
    fn bump_childs(&mut self, index: u32, max_childs: u64) -> std::result::Result<(), ()>;
    fn len(&self) -> u32;
}

/// Counts how many tokens a document needs, tracking real per-index
/// state (not just a single throw-away slot): overflow bookkeeping
/// (`childs` on an open container, preserved keys on a reused member
/// slot) depends on the same index being read back correctly while
/// sibling containers are also live, so a single shared scratch token
/// would corrupt unrelated tokens' fields and let this pass disagree
/// with the fill pass right at the overflow boundary (spec §4.3, §9).
/// The token buffer itself is discarded; only its length is reported.
struct CountingSink {
    tokens: Vec<Token>,
}

impl CountingSink {
    fn new() -> Self {
        CountingSink { tokens: Vec::new() }
    }
}

impl Sink for CountingSink {
    fn alloc(&mut self) -> std::result::Result<u32, ()> {
        let idx = self.tokens.len() as u32;
        self.tokens
            .push(Token::leaf(TokenType::Invalid, SourceSpan::EMPTY, None));
        Ok(idx)
    }

    fn set(&mut self, index: u32, token: Token) {
        self.tokens[index as usize] = token;
    }

    fn get(&self, index: u32) -> Token {
        self.tokens[index as usize]
    }

    fn set_flags(&mut self, index: u32, flags: TokenFlags) {
        self.tokens[index as usize].flags = flags;
    }

    fn bump_childs(&mut self, index: u32, max_childs: u64) -> std::result::Result<(), ()> {
        let tok = &mut self.tokens[index as usize];
        if tok.childs as u64 >= max_childs {
            return Err(());
        }
        tok.childs += 1;
        Ok(())
    }

    fn len(&self) -> u32 {
        self.tokens.len() as u32
    }
}

/// Materializes tokens into a caller-provided `Vec<Token>`. `capacity`
/// refuses to grow past a fixed bound (spec §4.4 shapes 1/3); `None`
/// grows freely (shapes 2/4).
struct WritingSink<'t> {
    tokens: &'t mut Vec<Token>,
    capacity: Option<usize>,
}

impl<'t> Sink for WritingSink<'t> {
    fn alloc(&mut self) -> std::result::Result<u32, ()> {
        if let Some(cap) = self.capacity {
            if self.tokens.len() >= cap {
                return Err(());
            }
        }
        let idx = self.tokens.len() as u32;
        self.tokens
            .push(Token::leaf(TokenType::Invalid, SourceSpan::EMPTY, None));
        Ok(idx)
    }

    fn set(&mut self, index: u32, token: Token) {
        self.tokens[index as usize] = token;
    }

    fn get(&self, index: u32) -> Token {
        self.tokens[index as usize]
    }

    fn set_flags(&mut self, index: u32, flags: TokenFlags) {
        self.tokens[index as usize].flags = flags;
    }

    fn bump_childs(&mut self, index: u32, max_childs: u64) -> std::result::Result<(), ()> {
        let tok = &mut self.tokens[index as usize];
        if tok.childs as u64 >= max_childs {
            return Err(());
        }
        tok.childs += 1;
        Ok(())
    }

    fn len(&self) -> u32 {
        self.tokens.len() as u32
    }
}

struct Cursor<'s> {
    src: &'s [u8],
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self, despaced: bool) {
        if despaced {
            return;
        }
        while let Some(b) = self.byte() {
            if classify::is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_trailing_ws(&mut self) {
        while let Some(b) = self.byte() {
            if classify::is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

/// Drives one full parse: dispatch, object/array/string/number/keyword
/// sub-parsers, and the overflow/depth checks of spec §4.3.
struct Driver<'s, S: Sink> {
    cur: Cursor<'s>,
    sink: S,
    cfg: &'s Config,
    depth: usize,
    /// Kind of the leaf most recently scanned by `parse_leaf_value`;
    /// threaded through because the scan and the token write happen in
    /// different call frames (object members write into an
    /// already-allocated slot; array elements allocate after scanning).
    last_leaf_kind: TokenType,
}

macro_rules! bail {
    ($self:expr, $code:expr, $func:expr) => {
        return Err(ParseError::new($code, $self.cur.src, $self.cur.pos, $func, None))
    };
    ($self:expr, $code:expr, $func:expr, $caller:expr) => {
        return Err(ParseError::new($code, $self.cur.src, $self.cur.pos, $func, Some($caller)))
    };
}

impl<'s, S: Sink> Driver<'s, S> {
    fn alloc(&mut self, func: &'static str) -> Result<u32> {
        self.sink.alloc().map_err(|_| {
            ParseError::new(ErrorCode::NoFreeTokens, self.cur.src, self.cur.pos, func, None)
        })
    }

    fn bump_childs_or_overflow(&mut self, idx: u32, func: &'static str) -> Result<()> {
        let max = if self.cfg.dont_check_overflow {
            u64::MAX
        } else {
            self.cfg.max_childs()
        };
        self.sink.bump_childs(idx, max).map_err(|_| {
            ParseError::new(ErrorCode::ChildsOverflow, self.cur.src, self.cur.pos, func, None)
        })
    }

    fn enter_container(&mut self, func: &'static str) -> Result<()> {
        self.depth += 1;
        if let Some(max) = self.cfg.max_depth {
            if self.depth > max {
                bail!(self, ErrorCode::DepthExceeded, func);
            }
        }
        Ok(())
    }

    fn leave_container(&mut self) {
        self.depth -= 1;
    }

    fn incomplete_or_invalid(&self) -> ErrorCode {
        if self.cur.pos >= self.cur.src.len() {
            ErrorCode::Incomplete
        } else {
            ErrorCode::Invalid
        }
    }

    fn clear_simple_only(&mut self, container_idx: u32) {
        self.sink.set_flags(container_idx, TokenFlags::empty());
    }

    /// Top-level dispatch (spec §4.3 "Dispatch" table).
    fn parse_value(&mut self, parent: Option<u32>, caller: &'static str) -> Result<u32> {
        self.cur.skip_ws(self.cfg.despaced_input);
        let Some(b) = self.cur.byte() else {
            bail!(self, ErrorCode::Incomplete, "parse_value", caller);
        };
        match b {
            b'{' => self.parse_object(parent, None),
            b'[' => self.parse_array(parent),
            b'"' => self.parse_string(parent),
            b'-' | b'0'..=b'9' => self.parse_number(parent),
            b't' | b'f' | b'n' => self.parse_keyword_token(parent),
            _ => bail!(self, ErrorCode::Invalid, "parse_value", caller),
        }
    }

    /// Parses a leaf value only (no allocation): used where the caller
    /// already owns the destination slot (object members) or allocates
    /// it after the fact (array elements).
    fn parse_leaf_value(&mut self, caller: &'static str) -> Result<SourceSpan> {
        let Some(b) = self.cur.byte() else {
            bail!(self, ErrorCode::Incomplete, "parse_value", caller);
        };
        match b {
            b'"' => {
                let span = self.scan_string_span(caller)?;
                self.last_leaf_kind = TokenType::String;
                Ok(span)
            }
            b'-' | b'0'..=b'9' => self.scan_number_span(caller),
            b't' => self.scan_keyword_span(b"true", TokenType::Bool, caller),
            b'f' => self.scan_keyword_span(b"false", TokenType::Bool, caller),
            b'n' => self.scan_keyword_span(b"null", TokenType::Null, caller),
            _ => bail!(self, ErrorCode::Invalid, "parse_value", caller),
        }
    }

    fn parse_object(&mut self, parent: Option<u32>, reuse: Option<u32>) -> Result<u32> {
        self.enter_container("parse_object")?;
        self.cur.pos += 1; // consume '{'
        let obj_idx = match reuse {
            Some(idx) => idx,
            None => self.alloc("parse_object")?,
        };
        let preserved_key = reuse.map(|idx| self.sink.get(idx).key).unwrap_or(SourceSpan::EMPTY);
        self.sink.set(
            obj_idx,
            Token {
                key: preserved_key,
                ..Token::container_start(TokenType::Object, parent)
            },
        );
        if let Some(p) = parent {
            self.bump_childs_or_overflow(p, "parse_object")?;
        }

        self.cur.skip_ws(self.cfg.despaced_input);
        if self.cur.byte() == Some(b'}') {
            self.cur.pos += 1;
            self.leave_container();
            return self.finish_container(obj_idx, TokenType::ObjectEnd);
        }

        loop {
            self.cur.skip_ws(self.cfg.despaced_input);
            if self.cur.byte() != Some(b'"') {
                bail!(self, self.incomplete_or_invalid(), "parse_object");
            }
            let member_idx = self.alloc("parse_object")?;
            let key_span = self.scan_string_span("parse_object")?;
            if !self.cfg.dont_check_overflow && key_span.len as u64 > self.cfg.max_key_len() {
                bail!(self, ErrorCode::KeyLenOverflow, "parse_object");
            }
            {
                let mut t = self.sink.get(member_idx);
                t.key = key_span;
                t.parent = Some(obj_idx);
                self.sink.set(member_idx, t);
            }

            self.cur.skip_ws(self.cfg.despaced_input);
            if self.cur.byte() != Some(b':') {
                bail!(self, self.incomplete_or_invalid(), "parse_object");
            }
            self.cur.pos += 1;
            self.cur.skip_ws(self.cfg.despaced_input);

            match self.cur.byte() {
                Some(b'{') => {
                    self.parse_object(Some(obj_idx), Some(member_idx))?;
                    self.clear_simple_only(obj_idx);
                }
                Some(b'[') => {
                    let arr_idx = self.parse_array_reusing(Some(obj_idx), member_idx)?;
                    debug_assert_eq!(arr_idx, member_idx);
                    self.clear_simple_only(obj_idx);
                }
                _ => {
                    let val = self.parse_leaf_value("parse_object")?;
                    if !self.cfg.dont_check_overflow && val.len as u64 > self.cfg.max_value_len() {
                        bail!(self, ErrorCode::ValueLenOverflow, "parse_object");
                    }
                    let kind = self.last_leaf_kind;
                    {
                        let mut t = self.sink.get(member_idx);
                        t.kind = kind;
                        t.val = val;
                        self.sink.set(member_idx, t);
                    }
                    self.bump_childs_or_overflow(obj_idx, "parse_object")?;
                }
            }

            self.cur.skip_ws(self.cfg.despaced_input);
            match self.cur.byte() {
                Some(b',') => {
                    self.cur.pos += 1;
                    self.cur.skip_ws(self.cfg.despaced_input);
                    if self.cur.byte() == Some(b'}') {
                        bail!(self, ErrorCode::Invalid, "parse_object");
                    }
                }
                Some(b'}') => {
                    self.cur.pos += 1;
                    self.leave_container();
                    return self.finish_container(obj_idx, TokenType::ObjectEnd);
                }
                _ => bail!(self, self.incomplete_or_invalid(), "parse_object"),
            }
        }
    }

    fn parse_array(&mut self, parent: Option<u32>) -> Result<u32> {
        let idx = self.alloc("parse_array")?;
        self.parse_array_reusing(parent, idx)
    }

    /// Array parsing proper, given an already-allocated start slot.
    /// Top-level callers always allocate fresh (arrays have no
    /// preceding key token); object members reuse their key slot the
    /// same way `parse_object`'s nested-container branch does.
    fn parse_array_reusing(&mut self, parent: Option<u32>, arr_idx: u32) -> Result<u32> {
        self.enter_container("parse_array")?;
        self.cur.pos += 1; // consume '['
        let preserved_key = self.sink.get(arr_idx).key;
        self.sink.set(
            arr_idx,
            Token {
                key: preserved_key,
                ..Token::container_start(TokenType::Array, parent)
            },
        );
        if let Some(p) = parent {
            self.bump_childs_or_overflow(p, "parse_array")?;
        }

        self.cur.skip_ws(self.cfg.despaced_input);
        if self.cur.byte() == Some(b']') {
            self.cur.pos += 1;
            self.leave_container();
            return self.finish_container(arr_idx, TokenType::ArrayEnd);
        }

        loop {
            self.cur.skip_ws(self.cfg.despaced_input);
            match self.cur.byte() {
                Some(b'{') => {
                    self.parse_object(Some(arr_idx), None)?;
                    self.clear_simple_only(arr_idx);
                }
                Some(b'[') => {
                    self.parse_array(Some(arr_idx))?;
                    self.clear_simple_only(arr_idx);
                }
                _ => {
                    let elem_idx = self.alloc("parse_array")?;
                    let val = self.parse_leaf_value("parse_array")?;
                    if !self.cfg.dont_check_overflow && val.len as u64 > self.cfg.max_value_len() {
                        bail!(self, ErrorCode::ValueLenOverflow, "parse_array");
                    }
                    let kind = self.last_leaf_kind;
                    self.sink.set(elem_idx, Token::leaf(kind, val, Some(arr_idx)));
                    self.bump_childs_or_overflow(arr_idx, "parse_array")?;
                }
            }

            self.cur.skip_ws(self.cfg.despaced_input);
            match self.cur.byte() {
                Some(b',') => {
                    self.cur.pos += 1;
                    self.cur.skip_ws(self.cfg.despaced_input);
                    if self.cur.byte() == Some(b']') {
                        bail!(self, ErrorCode::Invalid, "parse_array");
                    }
                }
                Some(b']') => {
                    self.cur.pos += 1;
                    self.leave_container();
                    return self.finish_container(arr_idx, TokenType::ArrayEnd);
                }
                _ => bail!(self, self.incomplete_or_invalid(), "parse_array"),
            }
        }
    }

    fn finish_container(&mut self, start_idx: u32, end_kind: TokenType) -> Result<u32> {
        let end_idx = self.alloc("finish_container")?;
        self.sink.set(end_idx, Token::container_end(end_kind, start_idx));
        self.bump_childs_or_overflow(start_idx, "finish_container")?;
        let mut start_tok = self.sink.get(start_idx);
        start_tok.end = Some(end_idx);
        self.sink.set(start_idx, start_tok);
        Ok(start_idx)
    }

    fn parse_string(&mut self, parent: Option<u32>) -> Result<u32> {
        let span = self.scan_string_span("parse_string")?;
        let idx = self.alloc("parse_string")?;
        self.sink.set(idx, Token::leaf(TokenType::String, span, parent));
        Ok(idx)
    }

    fn parse_number(&mut self, parent: Option<u32>) -> Result<u32> {
        let span = self.scan_number_span("parse_number")?;
        let idx = self.alloc("parse_number")?;
        self.sink.set(idx, Token::leaf(TokenType::Number, span, parent));
        Ok(idx)
    }

    fn parse_keyword_token(&mut self, parent: Option<u32>) -> Result<u32> {
        let b = self.cur.byte().expect("dispatch guarantees a byte is present");
        let span = match b {
            b't' => self.scan_keyword_span(b"true", TokenType::Bool, "parse_value")?,
            b'f' => self.scan_keyword_span(b"false", TokenType::Bool, "parse_value")?,
            b'n' => self.scan_keyword_span(b"null", TokenType::Null, "parse_value")?,
            _ => unreachable!("dispatch only routes t/f/n here"),
        };
        let idx = self.alloc("parse_value")?;
        self.sink.set(idx, Token::leaf(self.last_leaf_kind, span, parent));
        Ok(idx)
    }

    fn scan_keyword_span(&mut self, word: &'static [u8], kind: TokenType, caller: &'static str) -> Result<SourceSpan> {
        let start = self.cur.pos;
        let end = start + word.len();
        if end > self.cur.src.len() {
            bail!(self, ErrorCode::Incomplete, "parse_value", caller);
        }
        if &self.cur.src[start..end] != word {
            bail!(self, ErrorCode::Invalid, "parse_value", caller);
        }
        self.cur.pos = end;
        self.last_leaf_kind = kind;
        Ok(SourceSpan {
            offset: start as u32,
            len: word.len() as u32,
        })
    }

    /// Scans a `"..."`-delimited string (spec §4.3 "String branch"),
    /// returning the span *between* the quotes (quotes excluded).
    fn scan_string_span(&mut self, caller: &'static str) -> Result<SourceSpan> {
        debug_assert_eq!(self.cur.byte(), Some(b'"'));
        self.cur.pos += 1;
        let start = self.cur.pos;
        loop {
            self.cur.pos = if self.cfg.dont_use_simd {
                simd::scalar::string_body_advance(self.cur.src, self.cur.pos)
            } else {
                simd::string_body_advance(self.cur.src, self.cur.pos)
            };
            let Some(b) = self.cur.byte() else {
                bail!(self, ErrorCode::Incomplete, "parse_string", caller);
            };
            if b < 0x20 {
                bail!(self, ErrorCode::Invalid, "parse_string", caller);
            }
            if b >= 0x80 {
                let len = classify::utf8_length(b);
                if len == 0 || self.cur.pos + len as usize > self.cur.src.len() {
                    bail!(self, ErrorCode::Incomplete, "parse_string", caller);
                }
                for i in 1..len as usize {
                    if self.cur.src[self.cur.pos + i] & 0xC0 != 0x80 {
                        bail!(self, ErrorCode::Invalid, "parse_string", caller);
                    }
                }
                self.cur.pos += len as usize;
                continue;
            }
            if b == b'\\' {
                self.scan_escape(caller)?;
                continue;
            }
            debug_assert_eq!(b, b'"');
            let span = SourceSpan {
                offset: start as u32,
                len: (self.cur.pos - start) as u32,
            };
            self.cur.pos += 1; // consume closing quote
            return Ok(span);
        }
    }

    fn scan_escape(&mut self, caller: &'static str) -> Result<()> {
        debug_assert_eq!(self.cur.byte(), Some(b'\\'));
        let Some(escape) = self.cur.src.get(self.cur.pos + 1).copied() else {
            bail!(self, ErrorCode::Incomplete, "parse_string", caller);
        };
        match escape {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                self.cur.pos += 2;
                Ok(())
            }
            b'u' => {
                if self.cur.pos + 6 > self.cur.src.len() {
                    bail!(self, ErrorCode::Incomplete, "parse_string", caller);
                }
                let digits = &self.cur.src[self.cur.pos + 2..self.cur.pos + 6];
                if !digits.iter().all(|&b| classify::is_hex_digit(b)) {
                    bail!(self, ErrorCode::Invalid, "parse_string", caller);
                }
                self.cur.pos += 6;
                Ok(())
            }
            _ => bail!(self, ErrorCode::Invalid, "parse_string", caller),
        }
    }

    /// Scans a JSON number (spec §4.3 "Number branch"); the `0x` hex
    /// extension is gated behind `Config::hex_numbers` (off = strict
    /// RFC 8259, per spec §9's open question).
    fn scan_number_span(&mut self, caller: &'static str) -> Result<SourceSpan> {
        let start = self.cur.pos;
        self.last_leaf_kind = TokenType::Number;
        if self.cur.byte() == Some(b'-') {
            self.cur.pos += 1;
        }
        let Some(first) = self.cur.byte() else {
            bail!(self, ErrorCode::Incomplete, "parse_number", caller);
        };
        if !classify::is_digit(first) {
            bail!(self, ErrorCode::Invalid, "parse_number", caller);
        }

        if first == b'0' {
            self.cur.pos += 1;
            if self.cfg.hex_numbers && matches!(self.cur.byte(), Some(b'x') | Some(b'X')) {
                self.cur.pos += 1;
                let hex_start = self.cur.pos;
                while self.cur.byte().map(classify::is_hex_digit).unwrap_or(false) {
                    self.cur.pos += 1;
                }
                if self.cur.pos == hex_start {
                    bail!(self, ErrorCode::Invalid, "parse_number", caller);
                }
                return Ok(SourceSpan {
                    offset: start as u32,
                    len: (self.cur.pos - start) as u32,
                });
            }
            if self.cur.byte().map(classify::is_digit).unwrap_or(false) {
                bail!(self, ErrorCode::Invalid, "parse_number", caller);
            }
        } else {
            self.cur.pos += 1;
            self.cur.pos = self.advance_digits();
        }

        if self.cur.byte() == Some(b'.') {
            self.cur.pos += 1;
            let frac_start = self.cur.pos;
            self.cur.pos = self.advance_digits();
            if self.cur.pos == frac_start {
                bail!(self, ErrorCode::Invalid, "parse_number", caller);
            }
        }

        if matches!(self.cur.byte(), Some(b'e') | Some(b'E')) {
            self.cur.pos += 1;
            if matches!(self.cur.byte(), Some(b'+') | Some(b'-')) {
                self.cur.pos += 1;
            }
            let exp_start = self.cur.pos;
            self.cur.pos = self.advance_digits();
            if self.cur.pos == exp_start {
                bail!(self, ErrorCode::Invalid, "parse_number", caller);
            }
        }

        Ok(SourceSpan {
            offset: start as u32,
            len: (self.cur.pos - start) as u32,
        })
    }

    fn advance_digits(&self) -> usize {
        if self.cfg.dont_use_simd {
            simd::scalar::digits_advance(self.cur.src, self.cur.pos)
        } else {
            simd::digits_advance(self.cur.src, self.cur.pos)
        }
    }

    fn parse_document(&mut self) -> Result<u32> {
        let root = self.parse_value(None, "parse")?;
        self.cur.skip_trailing_ws();
        if self.cur.pos != self.cur.src.len() {
            bail!(self, ErrorCode::ExtraData, "parse");
        }
        Ok(root)
    }
}

/// Counts the tokens a document needs, executing the exact control flow
/// `parse_into` will later take — a document that would fail the fill
/// pass fails the count pass identically (spec §4.3, §9).
pub fn count_tokens(src: &[u8], cfg: &Config) -> Result<usize> {
    let mut driver = Driver {
        cur: Cursor { src, pos: 0 },
        sink: CountingSink::new(),
        cfg,
        depth: 0,
        last_leaf_kind: TokenType::Invalid,
    };
    driver.parse_document()?;
    Ok(driver.sink.len() as usize)
}

/// Parses `src` into a caller-provided buffer. `capacity` caps growth
/// (spec §4.4 shapes 1/3, `NoFreeTokens` on overflow); `None` grows
/// freely (shapes 2/4).
pub fn parse_into(tokens: &mut Vec<Token>, src: &[u8], cfg: &Config, capacity: Option<usize>) -> Result<usize> {
    log::trace!("parse_into: {} source bytes, capacity {:?}", src.len(), capacity);
    let mut driver = Driver {
        cur: Cursor { src, pos: 0 },
        sink: WritingSink { tokens, capacity },
        cfg,
        depth: 0,
        last_leaf_kind: TokenType::Invalid,
    };
    driver.parse_document()?;
    Ok(driver.sink.len() as usize)
}
