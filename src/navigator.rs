//! Document navigation (component C5): iterate members, look up keys
//! and indices, and measure distance between positions, all in terms of
//! the flat token buffer — no tree is ever materialized.
//!
//! Skipping a subtree is O(1) via the container's `end` link rather than
//! a recursive walk; this is the whole point of the flat representation
//! (spec §4.5, §9 "O(1) subtree skip").

use crate::token::{Token, TokenType};

/// A `(begin_of_scope, current, end_of_scope)` triple (spec §4.5).
/// `begin_of_scope`/`end_of_scope` bound the set of siblings being
/// walked; `current` is the cursor within that scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iter {
    pub begin: u32,
    pub current: u32,
    pub end: u32,
}

impl Iter {
    pub fn is_end(&self) -> bool {
        self.current >= self.end
    }
}

/// Constructs the iterator spanning the whole document: for a container
/// root, `begin == current == root`, `end == root.end` (the matching
/// container end, same convention [`iter_descend`] uses); for a
/// simple-typed root, `end == root + 1` (spec §4.5 "For a simple-typed
/// root, begin_of_scope = current, end_of_scope = current + 1").
pub fn iter_begin(tokens: &[Token], root: u32) -> Iter {
    iter_descend(tokens, root)
}

/// Descends into a container's members: `begin` and `current` become
/// the container start, `end` becomes its matching END token. Leaves
/// produce a single-step range covering just themselves.
pub fn iter_descend(tokens: &[Token], container: u32) -> Iter {
    let tok = tokens[container as usize];
    match tok.end {
        Some(e) => Iter { begin: container, current: container, end: e },
        None => Iter { begin: container, current: container, end: container + 1 },
    }
}

/// Advances to the next sibling within the same scope, or to `end` when
/// exhausted (spec §4.5 "Advance").
pub fn iter_next(tokens: &[Token], it: Iter) -> Iter {
    if it.is_end() {
        return it;
    }
    let mut idx = it.current;
    idx = if idx == it.begin {
        // Stepping off the scope's own container start: its `end` is
        // this container's matching END token, not a member's subtree
        // to skip, so the first member always starts right after it.
        idx + 1
    } else {
        // Step past the current token's own subtree (O(1) via `end`).
        match tokens[idx as usize].end {
            Some(e) => e + 1,
            None => idx + 1,
        }
    };
    while idx < it.end {
        if tokens[idx as usize].parent == Some(it.begin) {
            return Iter { begin: it.begin, current: idx, end: it.end };
        }
        idx = match tokens[idx as usize].end {
            Some(e) => e + 1,
            None => idx + 1,
        };
    }
    Iter { begin: it.begin, current: it.end, end: it.end }
}

/// Number of member slots a container holds (spec §4.5 "Member count"),
/// or 1/0 for a valid/invalid simple root.
pub fn members(tokens: &[Token], node: u32) -> u32 {
    let tok = tokens[node as usize];
    if tok.kind.is_container_start() {
        tok.members()
    } else if tok.kind == TokenType::Invalid {
        0
    } else {
        1
    }
}

/// Finds an object member by key (spec §4.5 "Key lookup"): linear scan
/// comparing length first, then bytes. Returns an iterator descended
/// into the match's subtree, or the scope's end iterator on miss.
pub fn find_key(tokens: &[Token], src: &[u8], object: u32, key: &[u8]) -> Iter {
    find_key_from(tokens, src, object, key, 0)
}

/// Like [`find_key`], but skips the first `skip` matches. JSON permits
/// duplicate object keys; callers that need to pair same-key members
/// positionally (e.g. [`crate::compare`]) use `skip` to walk past
/// earlier occurrences instead of always landing on the first.
pub fn find_key_from(tokens: &[Token], src: &[u8], object: u32, key: &[u8], skip: usize) -> Iter {
    let scope = iter_descend(tokens, object);
    let mut it = iter_next(tokens, scope);
    let mut remaining = skip;
    while !it.is_end() {
        let tok = tokens[it.current as usize];
        if tok.key.len as usize == key.len() && tok.key.get(src) == key {
            if remaining == 0 {
                return iter_descend(tokens, it.current);
            }
            remaining -= 1;
        }
        it = iter_next(tokens, it);
    }
    it
}

/// Finds an array element by position (spec §4.5 "Index lookup"): an
/// O(1) direct offset when the array has the simple-only flag, else a
/// linear skip. Out-of-range returns the scope's end iterator.
pub fn find_index(tokens: &[Token], array: u32, index: u32) -> Iter {
    let tok = tokens[array as usize];
    if index >= tok.members() {
        let scope = iter_descend(tokens, array);
        return Iter { begin: scope.begin, current: scope.end, end: scope.end };
    }
    if tok.is_simple_only() {
        let target = array + 1 + index;
        return iter_descend(tokens, target);
    }
    let scope = iter_descend(tokens, array);
    let mut it = iter_next(tokens, scope);
    for _ in 0..index {
        it = iter_next(tokens, it);
    }
    iter_descend(tokens, it.current)
}

/// Number of `iter_next` steps from `from` to `to` within the same
/// scope. Simple-only containers use direct index arithmetic (spec
/// §4.5 "Distance"); others walk.
pub fn distance(tokens: &[Token], from: Iter, to: u32) -> u32 {
    let begin_tok = tokens[from.begin as usize];
    if begin_tok.is_simple_only() && !from.is_end() {
        return to.saturating_sub(from.current);
    }
    let mut it = from;
    let mut steps = 0;
    while it.current != to && !it.is_end() {
        it = iter_next(tokens, it);
        steps += 1;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse_into;

    fn parse(src: &str) -> (Vec<Token>, &'static str) {
        let cfg = Config::default();
        let mut toks = Vec::new();
        parse_into(&mut toks, src.as_bytes(), &cfg, None).expect("valid json");
        (toks, Box::leak(src.to_string().into_boxed_str()))
    }

    #[test]
    fn iterates_flat_object_members() {
        let (toks, src) = parse(r#"{"a":1,"b":2,"c":3}"#);
        let scope = iter_descend(&toks, 0);
        let mut it = iter_next(&toks, scope);
        let mut keys = Vec::new();
        while !it.is_end() {
            keys.push(String::from_utf8_lossy(toks[it.current as usize].key.get(src.as_bytes())).to_string());
            it = iter_next(&toks, it);
        }
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn skips_nested_subtree_in_one_step() {
        let (toks, _src) = parse(r#"{"a":[1,2,3],"b":9}"#);
        let scope = iter_descend(&toks, 0);
        let first = iter_next(&toks, scope);
        assert_eq!(toks[first.current as usize].kind, TokenType::Array);
        let second = iter_next(&toks, first);
        assert_eq!(toks[second.current as usize].kind, TokenType::Number);
    }

    #[test]
    fn find_key_locates_member() {
        let (toks, src) = parse(r#"{"a":1,"b":2,"c":3}"#);
        let it = find_key(&toks, src.as_bytes(), 0, b"b");
        assert!(!it.is_end());
        assert_eq!(toks[it.current as usize].val.get(src.as_bytes()), b"2");
    }

    #[test]
    fn find_key_reports_miss_as_end_iterator() {
        let (toks, src) = parse(r#"{"a":1}"#);
        let it = find_key(&toks, src.as_bytes(), 0, b"z");
        assert!(it.is_end());
    }

    #[test]
    fn find_key_from_skips_earlier_occurrences_of_duplicate_key() {
        let (toks, src) = parse(r#"{"f":1,"f":2}"#);
        let first = find_key_from(&toks, src.as_bytes(), 0, b"f", 0);
        let second = find_key_from(&toks, src.as_bytes(), 0, b"f", 1);
        assert_eq!(toks[first.current as usize].val.get(src.as_bytes()), b"1");
        assert_eq!(toks[second.current as usize].val.get(src.as_bytes()), b"2");
    }

    #[test]
    fn find_index_uses_direct_offset_for_simple_only_array() {
        let (toks, src) = parse(r#"[10,20,30]"#);
        assert!(toks[0].is_simple_only());
        let it = find_index(&toks, 0, 1);
        assert_eq!(toks[it.current as usize].val.get(src.as_bytes()), b"20");
    }

    #[test]
    fn find_index_walks_when_not_simple_only() {
        let (toks, src) = parse(r#"[{"x":1},20,30]"#);
        assert!(!toks[0].is_simple_only());
        let it = find_index(&toks, 0, 1);
        assert_eq!(toks[it.current as usize].val.get(src.as_bytes()), b"20");
    }

    #[test]
    fn find_index_out_of_range_returns_end() {
        let (toks, _src) = parse(r#"[1,2]"#);
        let it = find_index(&toks, 0, 5);
        assert!(it.is_end());
    }

    #[test]
    fn members_counts_excluding_end_token() {
        let (toks, _src) = parse(r#"{"a":1,"b":2}"#);
        assert_eq!(members(&toks, 0), 2);
    }

    #[test]
    fn distance_counts_steps_for_non_simple_scope() {
        let (toks, _src) = parse(r#"[{"x":1},2,3]"#);
        let scope = iter_descend(&toks, 0);
        let first = iter_next(&toks, scope);
        let third_idx = find_index(&toks, 0, 2).current;
        assert_eq!(distance(&toks, first, third_idx), 2);
    }
}
