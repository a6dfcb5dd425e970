//! Universal invariants from spec §8, checked against randomly
//! generated JSON documents.

use proptest::prelude::*;

use flatjson::compare::CompareMode;
use flatjson::navigator;
use flatjson::token::TokenType;
use flatjson::{count_tokens, parse, parse_into, Config, Indent};

#[derive(Debug, Clone)]
enum Json {
    Null,
    Bool(bool),
    Num(i64),
    Str(String),
    Arr(Vec<Json>),
    Obj(Vec<(String, Json)>),
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}".prop_map(|s| s.to_string())
}

fn json_strategy() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i16>().prop_map(|n| Json::Num(n as i64)),
        ident().prop_map(Json::Str),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Arr),
            prop::collection::vec((ident(), inner), 0..6).prop_map(Json::Obj),
        ]
    })
}

fn render(value: &Json, out: &mut String) {
    match value {
        Json::Null => out.push_str("null"),
        Json::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Json::Num(n) => out.push_str(&n.to_string()),
        Json::Str(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Json::Arr(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(item, out);
            }
            out.push(']');
        }
        Json::Obj(members) => {
            out.push('{');
            for (i, (key, item)) in members.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(key);
                out.push_str("\":");
                render(item, out);
            }
            out.push('}');
        }
    }
}

fn to_compact_json(value: &Json) -> String {
    let mut out = String::new();
    render(value, &mut out);
    out
}

proptest! {
    #[test]
    fn count_only_matches_fill_tokens(value in json_strategy()) {
        let src = to_compact_json(&value);
        let cfg = Config::default();
        let count = count_tokens(src.as_bytes(), &cfg).unwrap();
        let mut toks = Vec::new();
        let filled = parse_into(&mut toks, src.as_bytes(), &cfg).unwrap();
        prop_assert_eq!(count, filled);
        prop_assert_eq!(count, toks.len());
    }

    #[test]
    fn serialize_of_parse_round_trips_compact_source(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        prop_assert_eq!(doc.to_vec_with_indent(Indent::NONE), src.into_bytes());
    }

    #[test]
    fn length_only_matches_emit_byte_count(value in json_strategy(), indent in 0u32..8) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        let predicted = flatjson::serializer::calc_length(doc.tokens(), doc.src(), doc.root(), Indent(indent));
        let emitted = doc.to_vec_with_indent(Indent(indent));
        prop_assert_eq!(predicted, emitted.len());
    }

    #[test]
    fn pack_unpack_round_trip_compares_ok(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        let blob = doc.pack();
        let restored = flatjson::Document::from_packed(&blob).unwrap();
        let outcome = doc.compare(&restored, CompareMode::Full);
        prop_assert_eq!(outcome.result, flatjson::compare::CompareResult::Ok);
    }

    #[test]
    fn container_childs_matches_span_and_end_parent_links_back(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        let tokens = doc.tokens();
        for (i, tok) in tokens.iter().enumerate() {
            if tok.kind.is_container_start() {
                let end = tok.end.expect("container start always has an end link") as usize;
                // `childs` counts immediate member slots plus the END token,
                // not the subtree's total token span (nested containers each
                // occupy exactly one slot regardless of their own size).
                let scope = navigator::iter_descend(tokens, i as u32);
                let mut it = navigator::iter_next(tokens, scope);
                let mut immediate_members = 0u32;
                while !it.is_end() {
                    immediate_members += 1;
                    it = navigator::iter_next(tokens, it);
                }
                prop_assert_eq!(immediate_members + 1, tok.childs);
                prop_assert_eq!(tokens[end].parent, Some(i as u32));
            }
        }
    }

    #[test]
    fn non_root_parent_points_strictly_earlier_to_a_container(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        let tokens = doc.tokens();
        for (i, tok) in tokens.iter().enumerate() {
            if let Some(p) = tok.parent {
                prop_assert!((p as usize) < i);
                prop_assert!(tokens[p as usize].kind.is_container_start());
            }
        }
    }

    #[test]
    fn object_member_keys_are_never_empty(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        let tokens = doc.tokens();
        for tok in tokens {
            if let Some(p) = tok.parent {
                if tokens[p as usize].kind == TokenType::Object && !tok.kind.is_container_end() {
                    prop_assert!(tok.key.len > 0);
                }
            }
        }
    }

    #[test]
    fn find_key_hit_parent_is_the_searched_object(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        if let Json::Obj(members) = &value {
            for (key, _) in members {
                let it = doc.find_key(key.as_bytes());
                prop_assert!(!it.is_end(), "key {:?} must be found in its own object", key);
                prop_assert_eq!(doc.tokens()[it.current as usize].parent, Some(0));
            }
        }
    }

    #[test]
    fn simple_only_array_index_lands_at_fixed_offset(value in json_strategy()) {
        let src = to_compact_json(&value);
        let doc = parse(src.as_bytes(), &Config::default()).unwrap();
        if doc.tokens()[0].kind == TokenType::Array && doc.tokens()[0].is_simple_only() {
            let members = doc.tokens()[0].members();
            for i in 0..members {
                let it = doc.find_index(i);
                prop_assert_eq!(it.current, doc.root() + 1 + i);
            }
        }
    }
}
