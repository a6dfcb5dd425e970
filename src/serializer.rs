//! Text serializer (component C6): a single generic walk that either
//! counts the bytes it would emit or actually emits them, so a caller
//! can `reserve` the exact capacity before writing (spec §4.6).

use crate::navigator;
use crate::token::{Token, TokenType};

/// How much whitespace to add between siblings. `0` means compact
/// output (no newline, no indent run, matching the reference
/// implementation's default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent(pub u32);

impl Indent {
    pub const NONE: Indent = Indent(0);
}

trait Sink {
    fn write_bytes(&mut self, b: &[u8]);
}

struct CountingSink {
    len: usize,
}

impl Sink for CountingSink {
    fn write_bytes(&mut self, b: &[u8]) {
        self.len += b.len();
    }
}

struct BufSink<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> Sink for BufSink<'a> {
    fn write_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }
}

const NEWLINE: &[u8] = b"\n";
const SPACES: &[u8] = b"                                                                ";

fn indent_run<S: Sink>(sink: &mut S, indent: Indent, depth: u32) {
    if indent.0 == 0 {
        return;
    }
    sink.write_bytes(NEWLINE);
    let mut remaining = (indent.0 * depth) as usize;
    while remaining > 0 {
        let chunk = remaining.min(SPACES.len());
        sink.write_bytes(&SPACES[..chunk]);
        remaining -= chunk;
    }
}

/// Walks `[start..=end_of(start)]` emitting through `sink`. Shared by
/// both the counting and the materializing entry points below so they
/// can never disagree on byte count (spec §4.6: "length-only walk must
/// return the exact byte count the emission walk would write").
fn walk<S: Sink>(tokens: &[Token], src: &[u8], start: u32, indent: Indent, sink: &mut S) {
    emit_node(tokens, src, start, indent, 0, sink);
}

fn emit_node<S: Sink>(tokens: &[Token], src: &[u8], idx: u32, indent: Indent, depth: u32, sink: &mut S) {
    let tok = tokens[idx as usize];
    emit_key(tok, src, sink);

    match tok.kind {
        TokenType::Object => emit_container(tokens, src, idx, b'{', b'}', indent, depth, sink),
        TokenType::Array => emit_container(tokens, src, idx, b'[', b']', indent, depth, sink),
        TokenType::String => {
            sink.write_bytes(b"\"");
            sink.write_bytes(tok.val.get(src));
            sink.write_bytes(b"\"");
        }
        _ => sink.write_bytes(tok.val.get(src)),
    }
}

fn emit_key<S: Sink>(tok: Token, src: &[u8], sink: &mut S) {
    if tok.has_key() {
        sink.write_bytes(b"\"");
        sink.write_bytes(tok.key.get(src));
        sink.write_bytes(b"\":");
    }
}

fn emit_container<S: Sink>(
    tokens: &[Token],
    src: &[u8],
    idx: u32,
    open: u8,
    close: u8,
    indent: Indent,
    depth: u32,
    sink: &mut S,
) {
    sink.write_bytes(&[open]);
    let scope = navigator::iter_descend(tokens, idx);
    let mut it = navigator::iter_next(tokens, scope);
    let mut first = true;
    while !it.is_end() {
        if !first {
            sink.write_bytes(b",");
        }
        first = false;
        indent_run(sink, indent, depth + 1);
        emit_node(tokens, src, it.current, indent, depth + 1, sink);
        it = navigator::iter_next(tokens, it);
    }
    if !first {
        indent_run(sink, indent, depth);
    }
    sink.write_bytes(&[close]);
}

/// Returns the exact number of bytes `emit` would write for the subtree
/// rooted at `start`, without allocating an output buffer.
pub fn calc_length(tokens: &[Token], src: &[u8], start: u32, indent: Indent) -> usize {
    let mut sink = CountingSink { len: 0 };
    walk(tokens, src, start, indent, &mut sink);
    sink.len
}

/// Serializes the subtree rooted at `start` into `out`, appending
/// (never clearing first).
pub fn emit(tokens: &[Token], src: &[u8], start: u32, indent: Indent, out: &mut Vec<u8>) {
    let mut sink = BufSink { buf: out };
    walk(tokens, src, start, indent, &mut sink);
}

/// Convenience wrapper that reserves exactly the bytes `calc_length`
/// reports before emitting, avoiding reallocation mid-write.
pub fn to_vec(tokens: &[Token], src: &[u8], start: u32, indent: Indent) -> Vec<u8> {
    let len = calc_length(tokens, src, start, indent);
    let mut out = Vec::with_capacity(len);
    emit(tokens, src, start, indent, &mut out);
    debug_assert_eq!(out.len(), len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse_into;

    fn parse(src: &str) -> Vec<Token> {
        let cfg = Config::default();
        let mut toks = Vec::new();
        parse_into(&mut toks, src.as_bytes(), &cfg, None).expect("valid json");
        toks
    }

    #[test]
    fn round_trips_flat_object_compact() {
        let src = r#"{"a":true,"b":false,"c":null,"d":0,"e":"e"}"#;
        let toks = parse(src);
        let out = to_vec(&toks, src.as_bytes(), 0, Indent::NONE);
        assert_eq!(out, src.as_bytes());
    }

    #[test]
    fn round_trips_nested_array_and_object() {
        let src = r#"[1,2,[3,4],{"a":1}]"#;
        let toks = parse(src);
        let out = to_vec(&toks, src.as_bytes(), 0, Indent::NONE);
        assert_eq!(out, src.as_bytes());
    }

    #[test]
    fn round_trips_single_leaf() {
        for src in ["true", "42", "null", "\"x\""] {
            let toks = parse(src);
            let out = to_vec(&toks, src.as_bytes(), 0, Indent::NONE);
            assert_eq!(out, src.as_bytes());
        }
    }

    #[test]
    fn calc_length_matches_emitted_byte_count() {
        let src = r#"{"a":[4,3,2,1],"b":{"x":1}}"#;
        let toks = parse(src);
        let predicted = calc_length(&toks, src.as_bytes(), 0, Indent(4));
        let mut out = Vec::new();
        emit(&toks, src.as_bytes(), 0, Indent(4), &mut out);
        assert_eq!(predicted, out.len());
    }

    #[test]
    fn pretty_print_scenario_is_154_bytes() {
        let src = r#"{"a":true,"b":{"c":{"d":1,"e":2}},"c":[0,1,2,3]}"#;
        let toks = parse(src);
        let out = to_vec(&toks, src.as_bytes(), 0, Indent(4));
        assert_eq!(out.len(), 154);
        assert!(out.starts_with(b"{\n    \"a\":true,\n    \"b\":{\n        \"c\":{\n"));
        assert!(out.ends_with(b"    ]\n}"));
    }

    #[test]
    fn whitespace_between_sibling_leaves_reproduces_input_shape() {
        let compact = r#"[0,1,2,3]"#;
        let toks = parse(compact);
        let pretty = to_vec(&toks, compact.as_bytes(), 0, Indent(2));
        assert_eq!(pretty, b"[\n  0,\n  1,\n  2,\n  3\n]".to_vec());
    }

    #[test]
    fn empty_containers_emit_no_interior_whitespace() {
        let toks = parse("{}");
        let out = to_vec(&toks, b"{}", 0, Indent(4));
        assert_eq!(out, b"{}".to_vec());
    }
}
