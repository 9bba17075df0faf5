//! Selecting the code points to convert.
//!
//! A charset list is a comma or whitespace separated list of tokens. Each
//! token is either the name of a predefined charset (`english`,
//! `greek`, ...) or a hex code point or range, optionally prefixed with
//! `U+` or `0x`: `41`, `U+00C4`, `0x20-0x7F`.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::error::Error;

/// One token of a charset list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Charset {
    /// A predefined charset, see [`names`].
    Named(String),
    /// An inclusive range of code points.
    Range(u32, u32),
    Single(u32),
}

#[derive(Clone, Copy, Debug)]
enum Member {
    Range(u32, u32),
    Charset(&'static str),
}

use Member::{Charset as Set, Range};

static NAMED_CHARSETS: &[(&str, &[Member])] = &[
    ("basicLatin", &[Range(0x20, 0x7F)]),
    ("latinSupplement", &[Range(0x80, 0xFF)]),
    ("extendedLatinA", &[Range(0x100, 0x17F)]),
    ("extendedLatinB", &[Range(0x180, 0x24F)]),
    ("ipaExtension", &[Range(0x250, 0x2AF)]),
    ("ipaExtensions", &[Set("ipaExtension")]),
    ("greek", &[Range(0x370, 0x3FF)]),
    ("phonetic", &[Range(0x1D00, 0x1DBF)]),
    ("punctuation", &[Range(0x2000, 0x206F)]),
    // only the symbols assigned when the table was drawn up
    ("currencySymbols", &[Range(0x20A0, 0x20BA)]),
    ("mathSymbols", &[Range(0x2200, 0x227F)]),
    (
        "latinLowercase",
        &[Range(0x61, 0x7A), Range(0xC0, 0xD6), Range(0xD8, 0xDE)],
    ),
    (
        "latinUppercase",
        &[Range(0x41, 0x5A), Range(0xDF, 0xF6), Range(0xF8, 0xFF)],
    ),
    (
        "extendedSymbols",
        &[Range(0xA0, 0xBF), Range(0xD7, 0xD7), Range(0xF7, 0xF7)],
    ),
    (
        "english",
        &[Set("basicLatin"), Set("extendedSymbols"), Set("punctuation")],
    ),
    (
        "german",
        &[
            Set("english"),
            Range(0xC4, 0xC4), // Ä
            Range(0xD6, 0xD6), // Ö
            Range(0xDC, 0xDC), // Ü
            Range(0xE4, 0xE4), // ä
            Range(0xF6, 0xF6), // ö
            Range(0xFC, 0xFC), // ü
        ],
    ),
    (
        "westernEuropean",
        &[
            Set("basicLatin"),
            Set("latinSupplement"),
            Set("extendedLatinA"),
            Set("extendedLatinB"),
            Set("ipaExtension"),
            Set("phonetic"),
            Set("punctuation"),
            Set("currencySymbols"),
        ],
    ),
];

/// The largest Unicode scalar value.
const MAX_CODE_POINT: u32 = 0x10FFFF;

static CODE_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[uU]\+|0[xX])?([0-9a-fA-F]+)(?:-(?:[uU]\+|0[xX])?([0-9a-fA-F]+))?$").unwrap()
});

/// Parse a comma or whitespace separated charset list.
///
/// Names are resolved eagerly, so an unknown name is reported here rather
/// than during expansion.
pub fn parse_charsets(input: &str) -> Result<Vec<Charset>, Error> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|raw| !raw.is_empty())
        .map(parse_one)
        .collect()
}

fn parse_one(raw: &str) -> Result<Charset, Error> {
    let Some(captures) = CODE_POINT_RE.captures(raw) else {
        if lookup(raw).is_some() {
            return Ok(Charset::Named(raw.to_owned()));
        }
        // a token that looks numeric but is not a valid code point
        if raw.starts_with(|c: char| c.is_ascii_digit()) || raw.contains('+') {
            return Err(Error::InvalidCodePoint(raw.to_owned()));
        }
        return Err(Error::UnknownCharset(raw.to_owned()));
    };
    let parse_hex = |s: &str| {
        u32::from_str_radix(s, 16)
            .ok()
            .filter(|code_point| *code_point <= MAX_CODE_POINT)
            .ok_or_else(|| Error::InvalidCodePoint(raw.to_owned()))
    };
    let start = parse_hex(&captures[1])?;
    let charset = match captures.get(2) {
        Some(end) => Charset::Range(start, parse_hex(end.as_str())?),
        None => Charset::Single(start),
    };
    check(&charset)?;
    Ok(charset)
}

/// Ranges must be ascending and within Unicode; single code points must
/// also not be surrogates.
fn check(charset: &Charset) -> Result<(), Error> {
    match *charset {
        Charset::Named(_) => Ok(()),
        Charset::Range(start, end) if start > end || end > MAX_CODE_POINT => {
            Err(Error::InvalidRange { start, end })
        }
        Charset::Range(..) => Ok(()),
        Charset::Single(code_point) if char::from_u32(code_point).is_none() => {
            Err(Error::InvalidCodePoint(format!("{code_point:X}")))
        }
        Charset::Single(_) => Ok(()),
    }
}

/// The names of every predefined charset.
pub fn names() -> impl Iterator<Item = &'static str> {
    NAMED_CHARSETS.iter().map(|(name, _)| *name)
}

fn lookup(name: &str) -> Option<&'static [Member]> {
    NAMED_CHARSETS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, members)| *members)
}

/// Resolve charset lists into a sorted set of unique code points.
///
/// The result is everything in `charsets` that is not in `exclude`, plus
/// everything in `include`.
pub fn expand(
    charsets: &[Charset],
    include: &[Charset],
    exclude: &[Charset],
) -> Result<BTreeSet<u32>, Error> {
    let mut subset = collect(charsets)?;
    for code_point in collect(exclude)? {
        subset.remove(&code_point);
    }
    subset.extend(collect(include)?);
    Ok(subset)
}

fn collect(charsets: &[Charset]) -> Result<BTreeSet<u32>, Error> {
    let mut result = BTreeSet::new();
    for charset in charsets {
        check(charset)?;
        match charset {
            Charset::Named(name) => add_named(name, &mut result)?,
            Charset::Range(start, end) => result.extend(*start..=*end),
            Charset::Single(code_point) => {
                result.insert(*code_point);
            }
        }
    }
    Ok(result)
}

fn add_named(name: &str, result: &mut BTreeSet<u32>) -> Result<(), Error> {
    let members = lookup(name).ok_or_else(|| Error::UnknownCharset(name.to_owned()))?;
    for member in members {
        match member {
            Member::Range(start, end) => result.extend(*start..=*end),
            Member::Charset(name) => add_named(name, result)?,
        }
    }
    Ok(())
}
