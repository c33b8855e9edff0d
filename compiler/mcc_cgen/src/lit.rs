//! Numeric, character, and string literal parsing.
//!
//! Tokens arrive with their spelling intact; this module turns them
//! into values plus the notated type, and flags magnitudes that do not
//! fit. Escape processing mirrors C: octal escapes take up to three
//! digits, hex escapes run until the first non-hex character.

use mcc_types::Elmtype;

/// A parsed integer literal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParsedInt {
    /// The value, masked to the notated type's width.
    pub value: i64,
    /// The notated type (from the suffix; `int` by default).
    pub elm: Elmtype,
    /// The written magnitude exceeds the notated type.
    pub too_large: bool,
    /// The written magnitude exceeds even `unsigned long long`.
    pub overflow: bool,
}

/// Parse an integer literal: decimal, octal (leading `0`), or hex
/// (`0x`), with `u`/`l`/`ll` suffixes in either case and order.
/// Returns `None` on a malformed spelling (the lexer does not produce
/// those).
pub fn parse_int(text: &str) -> Option<ParsedInt> {
    let bytes = text.as_bytes();
    let (digits, radix) = if bytes.len() >= 2 && (text.starts_with("0x") || text.starts_with("0X"))
    {
        (&text[2..], 16u32)
    } else if bytes.len() >= 2 && bytes[0] == b'0' {
        (&text[1..], 8u32)
    } else {
        (text, 10u32)
    };

    // Split off the suffix.
    let end = digits
        .find(|c: char| !c.is_digit(radix.max(10)))
        .unwrap_or(digits.len());
    // For octal/decimal the digit scan above is too permissive (it
    // accepts any decimal digit); validity is checked below.
    let (num, suffix) = digits.split_at(end);
    if num.is_empty() && radix != 8 {
        return None;
    }

    let mut unsigned = false;
    let mut long_count = 0u32;
    let mut rest = suffix;
    while !rest.is_empty() {
        if rest.starts_with('u') || rest.starts_with('U') {
            if unsigned {
                return None;
            }
            unsigned = true;
            rest = &rest[1..];
        } else if rest.starts_with("ll") || rest.starts_with("LL") {
            if long_count != 0 {
                return None;
            }
            long_count = 2;
            rest = &rest[2..];
        } else if rest.starts_with('l') || rest.starts_with('L') {
            if long_count != 0 {
                return None;
            }
            long_count = 1;
            rest = &rest[1..];
        } else {
            return None;
        }
    }

    let mut value: u64 = 0;
    let mut overflow = false;
    if num.is_empty() {
        // A lone "0" was consumed as the octal prefix.
    } else {
        for c in num.chars() {
            let digit = c.to_digit(radix)?;
            value = match value
                .checked_mul(u64::from(radix))
                .and_then(|v| v.checked_add(u64::from(digit)))
            {
                Some(v) => v,
                None => {
                    overflow = true;
                    0
                }
            };
            if overflow {
                break;
            }
        }
    }

    let rank = match long_count {
        0 => mcc_types::IntRank::Int,
        1 => mcc_types::IntRank::Long,
        _ => mcc_types::IntRank::LongLong,
    };
    let elm = Elmtype::int_by(!unsigned, rank);
    let too_large = overflow || !fits(value, elm);
    Some(ParsedInt {
        value: mask_to(value as i64, elm),
        elm,
        too_large,
        overflow,
    })
}

/// Whether an unsigned magnitude fits the given integer type.
fn fits(value: u64, elm: Elmtype) -> bool {
    let width = elm.width();
    if width >= 64 {
        if elm.is_signed() {
            return value <= i64::MAX as u64;
        }
        return true;
    }
    let max = if elm.is_signed() {
        (1u64 << (width - 1)) - 1
    } else {
        (1u64 << width) - 1
    };
    value <= max
}

/// Mask a value to the width of the given type, sign-extending when
/// the type is signed.
pub fn mask_to(value: i64, elm: Elmtype) -> i64 {
    let width = elm.width();
    if width >= 64 {
        return value;
    }
    let masked = (value as u64) & ((1u64 << width) - 1);
    if elm.is_signed() && masked & (1u64 << (width - 1)) != 0 {
        (masked | !((1u64 << width) - 1)) as i64
    } else {
        masked as i64
    }
}

/// A parsed character literal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParsedChar {
    pub value: i64,
    /// `L'…'` — the literal has type `int` instead of `char`.
    pub wide: bool,
    /// The character value exceeds the literal type's maximum.
    pub too_large: bool,
}

/// Parse a character literal (`'a'`, `'\n'`, `L'x'`).
pub fn parse_char(text: &str) -> Option<ParsedChar> {
    let (wide, body) = match text.strip_prefix('L') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = body.chars().peekable();
    let value = unescape(&mut chars)?;
    if chars.next().is_some() {
        // Multi-character constants are not supported.
        return None;
    }
    let max = if wide { 32767 } else { 127 };
    Some(ParsedChar {
        value,
        wide,
        too_large: value > max,
    })
}

/// A parsed string literal, decoded to element values.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParsedStr {
    pub chars: Vec<i64>,
    /// `L"…"` — elements have rank `int` instead of `char`.
    pub wide: bool,
    /// Some element exceeds the element type's maximum.
    pub too_large: bool,
}

/// Parse a string literal (`"abc"`, `L"abc"`).
pub fn parse_str(text: &str) -> Option<ParsedStr> {
    let (wide, body) = match text.strip_prefix('L') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body.strip_prefix('"')?.strip_suffix('"')?;
    let mut chars = body.chars().peekable();
    let mut out = Vec::new();
    let mut too_large = false;
    let max = if wide { 32767 } else { 127 };
    while chars.peek().is_some() {
        let value = unescape(&mut chars)?;
        if value > max {
            too_large = true;
        }
        out.push(value);
    }
    Some(ParsedStr {
        chars: out,
        wide,
        too_large,
    })
}

/// Decode one character, processing a leading escape if present.
fn unescape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<i64> {
    let c = chars.next()?;
    if c != '\\' {
        return Some(i64::from(c as u32));
    }
    let e = chars.next()?;
    Some(match e {
        'n' => 10,
        't' => 9,
        'r' => 13,
        'a' => 7,
        'b' => 8,
        'f' => 12,
        'v' => 11,
        '\\' => 92,
        '\'' => 39,
        '"' => 34,
        '?' => 63,
        '0'..='7' => {
            // Octal: up to three digits including the one just read.
            let mut value = i64::from(e as u32 - u32::from(b'0'));
            for _ in 0..2 {
                match chars.peek() {
                    Some(&d) if ('0'..='7').contains(&d) => {
                        value = value * 8 + i64::from(d as u32 - u32::from(b'0'));
                        chars.next();
                    }
                    _ => break,
                }
            }
            value
        }
        'x' => {
            // Hex: until the first non-hex character.
            let mut value: i64 = 0;
            let mut any = false;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) {
                value = value.wrapping_mul(16).wrapping_add(i64::from(d));
                chars.next();
                any = true;
            }
            if !any {
                return None;
            }
            value
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests;
