===== tests/integration.rs =====
//! End-to-end scenarios, one per spec §8 "End-to-end scenarios" entry.

use flatjson::{compare::CompareMode, parse, Config, Indent, TokenType};

#[test]
fn flat_object_scenario() {
    let doc = parse(br#"{"a":true,"b":false,"c":null,"d":0,"e":"e"}"#, &Config::default()).unwrap();
    assert_eq!(doc.tokens().len(), 7);
    assert_eq!(doc.tokens()[0].childs, 6);

    let d = doc.find_key(b"d");
    assert!(!d.is_end());
    let tok = doc.tokens()[d.current as usize];
    assert_eq!(tok.kind, TokenType::Number);
    assert_eq!(tok.val.get(doc.src()), b"0");
}

#[test]
fn nested_and_mixed_scenario() {
    let src = r#"{"a":[4,3,2,1],"b":[{"a":0,"b":1,"c":2},{"b":4,"a":3,"c":5},{"c":8,"b":7,"a":6}],"c":[0,1,2,3]}"#;
    let doc = parse(src.as_bytes(), &Config::default()).unwrap();
    assert_eq!(doc.tokens().len(), 31);

    let b = doc.find_key(b"b");
    assert!(!b.is_end());
    assert_eq!(doc.tokens()[b.current as usize].kind, TokenType::Array);
    assert_eq!(doc.tokens()[b.current as usize].members(), 3);

    let first_member = flatjson::navigator::iter_next(
        doc.tokens(),
        flatjson::navigator::iter_descend(doc.tokens(), b.current),
    );
    let inner_a = flatjson::navigator::find_key(doc.tokens(), doc.src(), first_member.current, b"a");
    assert_eq!(doc.tokens()[inner_a.current as usize].val.get(doc.src()), b"0");
}

#[test]
fn pretty_print_round_trip_scenario() {
    let src = r#"{"a":true,"b":{"c":{"d":1,"e":2}},"c":[0,1,2,3]}"#;
    let doc = parse(src.as_bytes(), &Config::default()).unwrap();
    let out = doc.to_vec_with_indent(Indent(4));
    assert_eq!(out.len(), 154);
    assert!(out.starts_with(b"{\n    \"a\":true,\n    \"b\":{\n        \"c\":{\n"));
    assert!(out.ends_with(b"    ]\n}"));
}

#[test]
fn compare_detects_swapped_keys_under_markup() {
    let left = parse(br#"{"a":0,"b":1}"#, &Config::default()).unwrap();
    let right = parse(br#"{"b":1,"a":0}"#, &Config::default()).unwrap();
    let outcome = left.compare(&right, CompareMode::MarkupOnly);
    assert_eq!(outcome.result, flatjson::compare::CompareResult::Ok);
}

#[test]
fn compare_detects_differing_value_under_full_mode() {
    let left = parse(br#"{"a":0,"b":12}"#, &Config::default()).unwrap();
    let right = parse(br#"{"a":0,"b":11}"#, &Config::default()).unwrap();
    let outcome = left.compare(&right, CompareMode::Full);
    assert_eq!(outcome.result, flatjson::compare::CompareResult::Value);
    let divergence = outcome.at.expect("value mismatch reports a divergence");
    let left_key = left.tokens()[divergence.left.current as usize].key.get(left.src());
    let right_key = right.tokens()[divergence.right.current as usize].key.get(right.src());
    assert_eq!(left_key, b"b");
    assert_eq!(right_key, b"b");
}

#[test]
fn binary_pack_unpack_scenario() {
    let src = r#"{"a":0,"b":12,"c":{"d":2,"e":3},"f":4}"#;
    let doc = parse(src.as_bytes(), &Config::default()).unwrap();
    assert_eq!(doc.tokens().len(), 9);

    let blob = doc.pack();
    let restored = flatjson::Document::from_packed(&blob).unwrap();
    let outcome = doc.compare(&restored, CompareMode::Full);
    assert_eq!(outcome.result, flatjson::compare::CompareResult::Ok);

    let d = restored.find_key(b"d");
    assert!(d.is_end(), "\"d\" is nested under \"c\", not a top-level key");
    let c = restored.find_key(b"c");
    let inner_d = flatjson::navigator::find_key(restored.tokens(), restored.src(), c.current, b"d");
    assert!(!inner_d.is_end());
    assert_eq!(
        restored.tokens()[inner_d.current as usize].val.get(restored.src()),
        b"2"
    );
}

#[test]
fn boundary_empty_object_has_two_tokens_and_childs_one() {
    let doc = parse(b"{}", &Config::default()).unwrap();
    assert_eq!(doc.tokens().len(), 2);
    assert_eq!(doc.tokens()[0].childs, 1);
}

#[test]
fn boundary_empty_array_has_two_tokens() {
    let doc = parse(b"[]", &Config::default()).unwrap();
    assert_eq!(doc.tokens().len(), 2);
}

#[test]
fn boundary_single_leaf_document_has_one_token_no_end() {
    for src in [&b"true"[..], b"42", b"\"x\"", b"null"] {
        let doc = parse(src, &Config::default()).unwrap();
        assert_eq!(doc.tokens().len(), 1);
        assert_eq!(doc.tokens()[0].end, None);
    }
}

#[test]
fn boundary_trailing_comma_is_invalid() {
    assert!(parse(b"[1,2,]", &Config::default()).is_err());
    assert!(parse(br#"{"a":1,}"#, &Config::default()).is_err());
}

#[test]
fn boundary_leading_zero_followed_by_digit_is_invalid() {
    assert!(parse(b"01", &Config::default()).is_err());
}

#[test]
fn boundary_string_with_control_byte_is_invalid() {
    assert!(parse(b"\"a\x01b\"", &Config::default()).is_err());
}

#[test]
fn boundary_truncated_unicode_escape_is_incomplete() {
    let err = parse(br#""\u00"#, &Config::default()).unwrap_err();
    assert_eq!(err.code, flatjson::ErrorCode::Incomplete);
}

#[test]
fn boundary_key_length_limits() {
    let cfg = Config { key_length_width: 4, ..Config::default() };
    let at_limit = format!("{{\"{}\":1}}", "a".repeat(15));
    let over_limit = format!("{{\"{}\":1}}", "a".repeat(16));
    assert!(parse(at_limit.as_bytes(), &cfg).is_ok());
    let err = parse(over_limit.as_bytes(), &cfg).unwrap_err();
    assert_eq!(err.code, flatjson::ErrorCode::KeyLenOverflow);
}


