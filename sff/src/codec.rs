//! Compressing textual glyph paths into a type-tagged byte stream.
//!
//! A path such as `M0 0L10 20Z` is split into command letters and numeric
//! operands. Each operand is written as a *control byte* followed by the
//! operand's big-endian bytes. The control byte packs the command that
//! introduced the operand into its high nibble and the operand's
//! [`ValueType`] into its low nibble:
//!
//! ```text
//! control = (command << 4) | value_type
//! ```
//!
//! An operand that directly follows another operand (with no command letter
//! in between, e.g. the `-20` in `L10-20`) is written with a zero high
//! nibble, mirroring the implicit command repetition of the path grammar.
//! A command without operands (e.g. `Z`) is written as a bare control byte
//! with a zero low nibble. The stream ends with [`END_MARKER`].

use crate::{error::Error, value::ValueType};

/// The byte that terminates every encoded path.
pub const END_MARKER: u8 = 0xF0;

/// How far ahead the lexer looks when matching a numeric operand.
///
/// Longer operands are split in two, so path text must not contain them.
pub(crate) const NUMBER_LOOKAHEAD: usize = 16;

/// A path command, identified by its letter in the path text.
///
/// The discriminant is the code stored in the high nibble of a control byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// `A`
    Arc = 1,
    /// `C`
    CurveTo = 2,
    /// `H`
    Horizontal = 3,
    /// `L`
    LineTo = 4,
    /// `M`
    MoveTo = 5,
    /// `Q`
    QuadTo = 6,
    /// `S`
    SmoothCurveTo = 7,
    /// `T`
    SmoothQuadTo = 8,
    /// `V`
    Vertical = 9,
    /// `Z`
    ClosePath = 10,
    /// A literal space.
    ///
    /// The bit pattern is preserved as-is; what it means is up to the
    /// renderer consuming the container.
    Blank = 14,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Arc,
        Command::CurveTo,
        Command::Horizontal,
        Command::LineTo,
        Command::MoveTo,
        Command::QuadTo,
        Command::SmoothCurveTo,
        Command::SmoothQuadTo,
        Command::Vertical,
        Command::ClosePath,
        Command::Blank,
    ];

    /// Look up the command for a character of path text.
    pub fn from_char(c: u8) -> Option<Command> {
        Some(match c {
            b'A' => Command::Arc,
            b'C' => Command::CurveTo,
            b'H' => Command::Horizontal,
            b'L' => Command::LineTo,
            b'M' => Command::MoveTo,
            b'Q' => Command::QuadTo,
            b'S' => Command::SmoothCurveTo,
            b'T' => Command::SmoothQuadTo,
            b'V' => Command::Vertical,
            b'Z' => Command::ClosePath,
            b' ' => Command::Blank,
            _ => return None,
        })
    }

    /// The character this command is written as.
    pub fn as_char(self) -> char {
        match self {
            Command::Arc => 'A',
            Command::CurveTo => 'C',
            Command::Horizontal => 'H',
            Command::LineTo => 'L',
            Command::MoveTo => 'M',
            Command::QuadTo => 'Q',
            Command::SmoothCurveTo => 'S',
            Command::SmoothQuadTo => 'T',
            Command::Vertical => 'V',
            Command::ClosePath => 'Z',
            Command::Blank => ' ',
        }
    }

    /// The code stored in the high nibble of a control byte.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a command by its control byte code.
    pub fn from_code(code: u8) -> Option<Command> {
        Command::ALL.into_iter().find(|cmd| cmd.code() == code)
    }
}

/// A lexical element of path text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathToken {
    Command(Command),
    Number(f64),
}

/// An iterator over the tokens of some path text.
///
/// Yields an error (and then stops) at the first character that starts
/// neither a command nor a number.
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Tokens {
            text,
            pos: 0,
            failed: false,
        }
    }

    /// Match `-?\d+(\.\d+)?` at the cursor, within the lookahead window.
    ///
    /// Returns the length of the match.
    fn match_number(&self) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let window = &bytes[self.pos..bytes.len().min(self.pos + NUMBER_LOOKAHEAD)];
        let mut len = usize::from(window.first() == Some(&b'-'));
        let int_digits = count_digits(&window[len..]);
        if int_digits == 0 {
            return None;
        }
        len += int_digits;
        if window.get(len) == Some(&b'.') {
            let frac_digits = count_digits(&window[len + 1..]);
            if frac_digits > 0 {
                len += 1 + frac_digits;
            }
        }
        Some(len)
    }

    fn malformed(&mut self) -> Error {
        self.failed = true;
        let fragment = self
            .text
            .get(self.pos..)
            .unwrap_or_default()
            .chars()
            .take(NUMBER_LOOKAHEAD)
            .collect();
        Error::MalformedPath {
            position: self.pos,
            fragment,
        }
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

impl Iterator for Tokens<'_> {
    type Item = Result<PathToken, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = *self.text.as_bytes().get(self.pos)?;
        if let Some(cmd) = Command::from_char(next) {
            self.pos += 1;
            return Some(Ok(PathToken::Command(cmd)));
        }
        let Some(len) = self.match_number() else {
            return Some(Err(self.malformed()));
        };
        // the match is pure ascii, and therefore on char boundaries
        let raw = &self.text[self.pos..self.pos + len];
        match raw.parse::<f64>() {
            Ok(value) => {
                self.pos += len;
                Some(Ok(PathToken::Number(value)))
            }
            Err(_) => Some(Err(self.malformed())),
        }
    }
}

/// The compressed form of a path.
///
/// Always terminated by [`END_MARKER`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EncodedPath(Vec<u8>);

impl EncodedPath {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for EncodedPath {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The state needed while compressing a single path.
#[derive(Debug, Default)]
pub struct PathEncoder {
    out: Vec<u8>,
    /// A command byte that has not been written yet; an operand may still
    /// claim it by OR-ing in its value type.
    pending: Option<u8>,
}

impl PathEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        PathEncoder {
            out: Vec::with_capacity(capacity),
            pending: None,
        }
    }

    fn flush_pending(&mut self) {
        if let Some(byte) = self.pending.take() {
            self.out.push(byte);
        }
    }

    /// Start a new command, writing out any command still waiting for an
    /// operand.
    pub fn push_command(&mut self, cmd: Command) {
        self.flush_pending();
        self.pending = Some(cmd.code() << 4);
    }

    /// Write an operand, tagged onto the pending command if there is one.
    pub fn push_number(&mut self, value: f64) {
        let ty = ValueType::classify(value);
        let control = self.pending.take().unwrap_or(0) | ty.code();
        self.out.push(control);
        ty.write_be(value, &mut self.out);
    }

    pub fn push_token(&mut self, token: PathToken) {
        match token {
            PathToken::Command(cmd) => self.push_command(cmd),
            PathToken::Number(value) => self.push_number(value),
        }
    }

    /// Flush the pending command and append the end marker.
    pub fn finish(mut self) -> EncodedPath {
        self.flush_pending();
        self.out.push(END_MARKER);
        self.out.shrink_to_fit();
        EncodedPath(self.out)
    }
}

/// Compress path text.
///
/// Fails on the first character that is neither a command letter, a space
/// nor the start of a number; nothing is returned in that case.
pub fn encode_path(path: &str) -> Result<EncodedPath, Error> {
    let mut encoder = PathEncoder::with_capacity(path.len() * 2);
    for token in Tokens::new(path) {
        encoder.push_token(token?);
    }
    Ok(encoder.finish())
}
