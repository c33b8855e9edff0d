use super::*;
use mcc_types::Elmtype;
use pretty_assertions::assert_eq;

fn int_ok(text: &str) -> ParsedInt {
    match parse_int(text) {
        Some(parsed) => parsed,
        None => panic!("'{text}' parses"),
    }
}

#[test]
fn decimal_octal_hex_bases() {
    assert_eq!(int_ok("42").value, 42);
    assert_eq!(int_ok("052").value, 42);
    assert_eq!(int_ok("0x2a").value, 42);
    assert_eq!(int_ok("0X2A").value, 42);
    assert_eq!(int_ok("0").value, 0);
}

#[test]
fn suffixes_set_the_notated_type() {
    assert_eq!(int_ok("1").elm, Elmtype::Int);
    assert_eq!(int_ok("1u").elm, Elmtype::UInt);
    assert_eq!(int_ok("1l").elm, Elmtype::Long);
    assert_eq!(int_ok("1ul").elm, Elmtype::ULong);
    assert_eq!(int_ok("1lu").elm, Elmtype::ULong);
    assert_eq!(int_ok("1ll").elm, Elmtype::LongLong);
    assert_eq!(int_ok("1ULL").elm, Elmtype::ULongLong);
}

#[test]
fn magnitude_checked_against_the_notated_type() {
    assert!(!int_ok("32767").too_large);
    assert!(int_ok("32768").too_large);
    assert!(!int_ok("65535u").too_large);
    assert!(int_ok("65536u").too_large);
    assert!(!int_ok("2147483647l").too_large);
    assert!(int_ok("2147483648l").too_large);
}

#[test]
fn malformed_spellings_are_rejected() {
    assert_eq!(parse_int("1x"), None);
    assert_eq!(parse_int("0x"), None);
    assert_eq!(parse_int("1uu"), None);
    assert_eq!(parse_int("1lll"), None);
}

#[test]
fn mask_to_truncates_and_sign_extends() {
    assert_eq!(mask_to(0x1_0000, Elmtype::Int), 0);
    assert_eq!(mask_to(0xFFFF, Elmtype::Int), -1);
    assert_eq!(mask_to(0xFFFF, Elmtype::UInt), 0xFFFF);
    assert_eq!(mask_to(0x80, Elmtype::Char), -128);
    assert_eq!(mask_to(0x80, Elmtype::UChar), 128);
    assert_eq!(mask_to(-1, Elmtype::ULong), 0xFFFF_FFFF);
}

#[test]
fn char_literals_and_escapes() {
    let parsed = |t: &str| match parse_char(t) {
        Some(parsed) => parsed,
        None => panic!("'{t}' parses"),
    };
    assert_eq!(parsed("'a'").value, 97);
    assert_eq!(parsed("'\\n'").value, 10);
    assert_eq!(parsed("'\\0'").value, 0);
    assert_eq!(parsed("'\\101'").value, 65);
    assert_eq!(parsed("'\\x41'").value, 65);
    assert!(!parsed("'a'").wide);
    assert!(parsed("L'a'").wide);
    // Octal stops after three digits.
    assert_eq!(parse_char("'\\1234'"), None);
}

#[test]
fn wide_char_range_is_wider() {
    let Some(narrow) = parse_char("'\\x80'") else {
        panic!("parses");
    };
    assert!(narrow.too_large);
    let Some(wide) = parse_char("L'\\x80'") else {
        panic!("parses");
    };
    assert!(!wide.too_large);
}

#[test]
fn string_literals_decode_per_character() {
    let Some(parsed) = parse_str("\"ab\\n\"") else {
        panic!("parses");
    };
    assert_eq!(parsed.chars, vec![97, 98, 10]);
    assert!(!parsed.wide);

    let Some(wide) = parse_str("L\"A\"") else {
        panic!("parses");
    };
    assert!(wide.wide);
    assert_eq!(wide.chars, vec![65]);
}

#[test]
fn hex_escape_runs_until_non_hex() {
    let Some(parsed) = parse_str("\"\\x41B\"") else {
        panic!("parses");
    };
    // \x41B consumes 41B as hex digits.
    assert_eq!(parsed.chars.len(), 1);
    assert_eq!(parsed.chars[0], 0x41B);
}
