===== src/compare.rs =====
//! Document comparison (component C5): structural diff between two
//! parsed documents without ever materializing either as a tree.

use crate::navigator::{self, Iter};
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Only token types must match.
    MarkupOnly,
    /// Markup plus key/value text lengths.
    LengthOnly,
    /// Markup plus exact byte equality of key and value text.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Ok,
    Type,
    Key,
    NoKey,
    Length,
    Value,
    Longer,
    Shorter,
}

/// A side-by-side pair of diverging positions, present whenever
/// [`CompareResult`] is not `Ok`.
#[derive(Debug, Clone, Copy)]
pub struct Divergence {
    pub left: Iter,
    pub right: Iter,
}

pub struct CompareOutcome {
    pub result: CompareResult,
    pub at: Option<Divergence>,
}

fn ok() -> CompareOutcome {
    CompareOutcome { result: CompareResult::Ok, at: None }
}

fn diff(result: CompareResult, left: Iter, right: Iter) -> CompareOutcome {
    CompareOutcome { result, at: Some(Divergence { left, right }) }
}

/// Compares two documents per spec §4.5 "Document compare": token-count
/// check, then root type, then a recursive structural walk (object
/// members matched by key, simple-only arrays matched positionally,
/// other arrays matched by index).
pub fn compare(
    left_tokens: &[Token],
    left_src: &[u8],
    left_root: u32,
    right_tokens: &[Token],
    right_src: &[u8],
    right_root: u32,
    mode: CompareMode,
) -> CompareOutcome {
    if left_tokens.len() != right_tokens.len() {
        let l = navigator::iter_begin(left_tokens, left_root);
        let r = navigator::iter_begin(right_tokens, right_root);
        let result = if right_tokens.len() > left_tokens.len() {
            CompareResult::Longer
        } else {
            CompareResult::Shorter
        };
        return diff(result, l, r);
    }
    compare_node(left_tokens, left_src, left_root, right_tokens, right_src, right_root, mode)
}

fn compare_node(
    lt: &[Token],
    ls: &[u8],
    left: u32,
    rt: &[Token],
    rs: &[u8],
    right: u32,
    mode: CompareMode,
) -> CompareOutcome {
    let ltok = lt[left as usize];
    let rtok = rt[right as usize];

    if ltok.kind != rtok.kind {
        return diff(
            CompareResult::Type,
            navigator::iter_descend(lt, left),
            navigator::iter_descend(rt, right),
        );
    }

    if !ltok.kind.is_container_start() {
        return compare_leaf(lt, ls, left, rt, rs, right, mode);
    }

    let l_scope = navigator::iter_descend(lt, left);
    let r_scope = navigator::iter_descend(rt, right);
    let mut l_it = navigator::iter_next(lt, l_scope);
    let mut r_it = navigator::iter_next(rt, r_scope);

    let is_object = matches!(ltok.kind, crate::token::TokenType::Object);

    if is_object {
        while !l_it.is_end() {
            let key = lt[l_it.current as usize].key.get(ls);
            let found = navigator::find_key(rt, rs, right, key);
            if found.is_end() {
                return diff(CompareResult::NoKey, l_it, r_scope);
            }
            let outcome = compare_node(lt, ls, l_it.current, rt, rs, found.current, mode);
            if outcome.result != CompareResult::Ok {
                return outcome;
            }
            l_it = navigator::iter_next(lt, l_it);
        }
        return ok();
    }

    // Array: simple-only compares positionally by construction of
    // iter_next; non-simple-only also advances position by position,
    // since JSON arrays are order-significant either way.
    while !l_it.is_end() && !r_it.is_end() {
        let outcome = compare_node(lt, ls, l_it.current, rt, rs, r_it.current, mode);
        if outcome.result != CompareResult::Ok {
            return outcome;
        }
        l_it = navigator::iter_next(lt, l_it);
        r_it = navigator::iter_next(rt, r_it);
    }
    if l_it.is_end() != r_it.is_end() {
        let result = if r_it.is_end() { CompareResult::Shorter } else { CompareResult::Longer };
        return diff(result, l_it, r_it);
    }
    ok()
}

fn compare_leaf(
    lt: &[Token],
    ls: &[u8],
    left: u32,
    rt: &[Token],
    rs: &[u8],
    right: u32,
    mode: CompareMode,
) -> CompareOutcome {
    let l_it = navigator::iter_descend(lt, left);
    let r_it = navigator::iter_descend(rt, right);
    if mode == CompareMode::MarkupOnly {
        return ok();
    }
    let ltok = lt[left as usize];
    let rtok = rt[right as usize];
    if ltok.val.len != rtok.val.len {
        return diff(CompareResult::Length, l_it, r_it);
    }
    if mode == CompareMode::LengthOnly {
        return ok();
    }
    if ltok.val.get(ls) != rtok.val.get(rs) {
        return diff(CompareResult::Value, l_it, r_it);
    }
    ok()
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
    fn identical_documents_compare_ok() {
        let a = r#"{"a":1,"b":[1,2,3]}"#;
        let ta = parse(a);
        let tb = parse(a);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, a.as_bytes(), 0, CompareMode::Full);
        assert_eq!(outcome.result, CompareResult::Ok);
    }

    #[test]
    fn reordered_keys_still_compare_ok() {
        let a = r#"{"a":1,"b":2}"#;
        let b = r#"{"b":2,"a":1}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::Full);
        assert_eq!(outcome.result, CompareResult::Ok);
    }

    #[test]
    fn missing_key_is_reported() {
        let a = r#"{"a":1,"b":2}"#;
        let b = r#"{"a":1}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::Full);
        assert_eq!(outcome.result, CompareResult::Shorter);
    }

    #[test]
    fn differing_value_is_reported_in_full_mode() {
        let a = r#"{"a":1}"#;
        let b = r#"{"a":2}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::Full);
        assert_eq!(outcome.result, CompareResult::Value);
    }

    #[test]
    fn differing_value_same_length_passes_length_only_mode() {
        let a = r#"{"a":1}"#;
        let b = r#"{"a":2}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::LengthOnly);
        assert_eq!(outcome.result, CompareResult::Ok);
    }

    #[test]
    fn differing_type_is_reported() {
        let a = r#"{"a":1}"#;
        let b = r#"{"a":"1"}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::MarkupOnly);
        assert_eq!(outcome.result, CompareResult::Type);
    }

    #[test]
    fn missing_key_reported_as_no_key_when_counts_happen_to_match() {
        let a = r#"{"a":1,"c":3}"#;
        let b = r#"{"a":1,"b":3}"#;
        let ta = parse(a);
        let tb = parse(b);
        let outcome = compare(&ta, a.as_bytes(), 0, &tb, b.as_bytes(), 0, CompareMode::Full);
        assert_eq!(outcome.result, CompareResult::NoKey);
    }
}


