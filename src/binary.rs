//! Binary pack/unpack codec (component C6, spec §4.6): a compact
//! on-wire form built from the same index-based `parent`/`end` links
//! the in-memory token buffer already uses, so offsets fall out as
//! small deltas almost for free.
//!
//! Layout: `[u32 json_length][json bytes][u32 token_count][packed tokens]`.
//! Each token writes eight fields in order: `type`, `key_offset`,
//! `key_length`, `val_offset`, `val_length`, `parent_offset`, `childs`,
//! `end_offset`. Every field uses the variable-length encoding of
//! [`write_varint`]/[`read_varint`]; `key_offset`/`val_offset` are
//! zig-zag encoded since their delta can run either direction.

use crate::error::{ErrorCode, ParseError, Result};
use crate::token::{SourceSpan, Token, TokenFlags, TokenType};

fn truncated(src: &[u8], at: usize, reporter: &'static str) -> ParseError {
    ParseError::new(ErrorCode::Truncated, src, at.min(src.len()), reporter, None)
}

fn write_u32_le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn read_u32_le(blob: &[u8], pos: &mut usize) -> Result<u32> {
    if *pos + 4 > blob.len() {
        return Err(truncated(blob, *pos, "unpack"));
    }
    let bytes = [blob[*pos], blob[*pos + 1], blob[*pos + 2], blob[*pos + 3]];
    *pos += 4;
    Ok(u32::from_le_bytes(bytes))
}

/// Writes `value` using the one-byte fast form when it fits in 7 bits,
/// else a length-prefix byte (2..5) followed by that many minus one
/// little-endian bytes.
fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0x80 {
        out.push(0x80 | value as u8);
        return;
    }
    let bits = 64usize - value.leading_zeros() as usize;
    let bytes_needed = ((bits + 7) / 8).max(1);
    out.push((bytes_needed + 1) as u8);
    let le = value.to_le_bytes();
    out.extend_from_slice(&le[..bytes_needed]);
}

fn read_varint(blob: &[u8], pos: &mut usize) -> Result<u64> {
    let Some(&prefix) = blob.get(*pos) else {
        return Err(truncated(blob, *pos, "unpack"));
    };
    *pos += 1;
    if prefix & 0x80 != 0 {
        return Ok((prefix & 0x7F) as u64);
    }
    let bytes_needed = prefix as usize - 1;
    if bytes_needed == 0 || bytes_needed > 8 || *pos + bytes_needed > blob.len() {
        return Err(truncated(blob, *pos, "unpack"));
    }
    let mut le = [0u8; 8];
    le[..bytes_needed].copy_from_slice(&blob[*pos..*pos + bytes_needed]);
    *pos += bytes_needed;
    Ok(u64::from_le_bytes(le))
}

fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn write_offset_delta(out: &mut Vec<u8>, absolute: u32, anchor: u32) {
    write_varint(out, zigzag_encode(absolute as i64 - anchor as i64));
}

fn read_offset_delta(blob: &[u8], pos: &mut usize, anchor: u32) -> Result<u32> {
    let delta = zigzag_decode(read_varint(blob, pos)?);
    Ok((anchor as i64 + delta) as u32)
}

/// Serializes `tokens` (which must reference `src`) into the wire
/// format described above.
pub fn pack(tokens: &[Token], src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + tokens.len() * 4 + 8);
    write_u32_le(&mut out, src.len() as u32);
    out.extend_from_slice(src);
    write_u32_le(&mut out, tokens.len() as u32);

    let mut prev_key_anchor = 0u32;
    let mut prev_val_anchor = 0u32;

    for (i, tok) in tokens.iter().enumerate() {
        out.push(tok.kind as u8);

        write_offset_delta(&mut out, tok.key.offset, prev_key_anchor);
        write_varint(&mut out, tok.key.len as u64);
        write_offset_delta(&mut out, tok.val.offset, prev_val_anchor);
        write_varint(&mut out, tok.val.len as u64);

        let parent_offset = match tok.parent {
            Some(p) => (i as u32) - p,
            None => 0,
        };
        write_varint(&mut out, parent_offset as u64);

        write_varint(&mut out, tok.childs as u64);

        let end_offset = match tok.end {
            Some(e) => e - (i as u32),
            None => 0,
        };
        write_varint(&mut out, end_offset as u64);

        prev_key_anchor = if tok.key.is_empty() { 0 } else { tok.key.offset };
        prev_val_anchor = if tok.val.is_empty() { 0 } else { tok.val.offset };
    }

    out
}

/// Reverses [`pack`]. Returns the embedded JSON bytes and the
/// reconstructed token buffer; on any truncation or malformed field,
/// no partial token buffer is published (spec §4.6).
pub fn unpack(blob: &[u8]) -> Result<(Vec<u8>, Vec<Token>)> {
    let mut pos = 0usize;
    let json_length = read_u32_le(blob, &mut pos)? as usize;
    if pos + json_length > blob.len() {
        return Err(truncated(blob, pos, "unpack"));
    }
    let json = blob[pos..pos + json_length].to_vec();
    pos += json_length;

    let token_count = read_u32_le(blob, &mut pos)? as usize;
    let mut tokens = Vec::with_capacity(token_count);

    let mut prev_key_anchor = 0u32;
    let mut prev_val_anchor = 0u32;

    for i in 0..token_count {
        let Some(&raw_kind) = blob.get(pos) else {
            return Err(truncated(blob, pos, "unpack"));
        };
        pos += 1;
        let kind = TokenType::from_u8(raw_kind).ok_or_else(|| truncated(blob, pos - 1, "unpack"))?;

        let key_offset = read_offset_delta(blob, &mut pos, prev_key_anchor)?;
        let key_len = read_varint(blob, &mut pos)? as u32;
        let val_offset = read_offset_delta(blob, &mut pos, prev_val_anchor)?;
        let val_len = read_varint(blob, &mut pos)? as u32;
        let parent_offset = read_varint(blob, &mut pos)? as u32;
        let childs = read_varint(blob, &mut pos)? as u32;
        let end_offset = read_varint(blob, &mut pos)? as u32;

        let key = SourceSpan { offset: key_offset, len: key_len };
        let val = SourceSpan { offset: val_offset, len: val_len };
        let parent = if parent_offset == 0 { None } else { Some(i as u32 - parent_offset) };
        let end = if end_offset == 0 { None } else { Some(i as u32 + end_offset) };

        // The simple-only flag is not part of the wire format (it is a
        // pure fast-path hint, spec §9); start by assuming it holds and
        // clear it below for any container proven to have a nested
        // container member.
        let flags = if kind.is_container_start() {
            TokenFlags::SIMPLE_ONLY
        } else {
            TokenFlags::empty()
        };

        tokens.push(Token { kind, key, val, parent, end, childs, flags });

        prev_key_anchor = if key.is_empty() { 0 } else { key_offset };
        prev_val_anchor = if val.is_empty() { 0 } else { val_offset };
    }

    for i in 0..tokens.len() {
        if tokens[i].kind.is_container_start() {
            if let Some(p) = tokens[i].parent {
                tokens[p as usize].flags = TokenFlags::empty();
            }
        }
    }

    Ok((json, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{self, CompareMode};
    use crate::config::Config;
    use crate::parser::parse_into;

    fn parse(src: &str) -> Vec<Token> {
        let cfg = Config::default();
        let mut toks = Vec::new();
        parse_into(&mut toks, src.as_bytes(), &cfg, None).expect("valid json");
        toks
    }

    #[test]
    fn varint_roundtrips_fast_form() {
        for v in [0u64, 1, 42, 127] {
            let mut out = Vec::new();
            write_varint(&mut out, v);
            assert_eq!(out.len(), 1);
            let mut pos = 0;
            assert_eq!(read_varint(&out, &mut pos).unwrap(), v);
        }
    }

    #[test]
    fn varint_roundtrips_multi_byte_form() {
        for v in [128u64, 255, 300, 70_000, u32::MAX as u64] {
            let mut out = Vec::new();
            write_varint(&mut out, v);
            assert!(out[0] & 0x80 == 0);
            let mut pos = 0;
            assert_eq!(read_varint(&out, &mut pos).unwrap(), v);
        }
    }

    #[test]
    fn zigzag_roundtrips_negative_and_positive() {
        for v in [-100i64, -1, 0, 1, 100] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn pack_unpack_roundtrip_preserves_full_comparison() {
        let src = r#"{"a":0,"b":12,"c":{"d":2,"e":3},"f":4}"#;
        let toks = parse(src);
        assert_eq!(toks.len(), 9);
        let blob = pack(&toks, src.as_bytes());
        let (json, restored) = unpack(&blob).expect("unpack should succeed");
        assert_eq!(json, src.as_bytes());
        let outcome = compare::compare(&toks, src.as_bytes(), 0, &restored, &json, 0, CompareMode::Full);
        assert_eq!(outcome.result, compare::CompareResult::Ok);
    }

    #[test]
    fn pack_unpack_roundtrip_nested_and_mixed() {
        let src = r#"{"a":[4,3,2,1],"b":[{"a":0,"b":1,"c":2},{"b":4,"a":3,"c":5}],"c":[0,1,2,3]}"#;
        let toks = parse(src);
        let blob = pack(&toks, src.as_bytes());
        let (json, restored) = unpack(&blob).unwrap();
        let outcome = compare::compare(&toks, src.as_bytes(), 0, &restored, &json, 0, CompareMode::Full);
        assert_eq!(outcome.result, compare::CompareResult::Ok);
    }

    #[test]
    fn truncated_blob_is_rejected_without_publishing_tokens() {
        let src = r#"{"a":1}"#;
        let toks = parse(src);
        let mut blob = pack(&toks, src.as_bytes());
        blob.truncate(blob.len() - 2);
        let err = unpack(&blob).unwrap_err();
        assert_eq!(err.code, ErrorCode::Truncated);
    }

    #[test]
    fn empty_object_roundtrips() {
        let src = "{}";
        let toks = parse(src);
        let blob = pack(&toks, src.as_bytes());
        let (json, restored) = unpack(&blob).unwrap();
        let outcome = compare::compare(&toks, src.as_bytes(), 0, &restored, &json, 0, CompareMode::Full);
        assert_eq!(outcome.result, compare::CompareResult::Ok);
    }
}
