//! Converting OpenType fonts into SFF glyph containers.
//!
//! SFF ("simple font format") is a small, self-contained binary container
//! holding normalized glyph outlines, advance widths and a sparse kerning
//! map. It is meant to be consumed by a runtime renderer that has no
//! OpenType parser of its own.
//!
//! The crate is organized bottom-up:
//!
//! * [`value`] and [`codec`] compress textual glyph paths into a dense,
//!   type-tagged byte stream.
//! * [`write`] and [`validate`] provide the big-endian packing primitives
//!   (strings, integers, byte sequences, arrays and tables).
//! * [`tables`] describes the container itself.
//! * [`builder`] assembles a [`Container`] from any [`FontSource`], and
//!   [`convert`] drives the whole thing for font files on disk.
//!
//! ```no_run
//! use sff::{charset, convert::ConvertOptions};
//!
//! let subset = charset::expand(&charset::parse_charsets("english")?, &[], &[])?;
//! sff::convert_file("Roboto.ttf", "out/Roboto.sff", &subset, &ConvertOptions::default())?;
//! # Ok::<_, sff::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod charset;
pub mod codec;
pub mod convert;
mod error;
pub mod kern;
pub mod pens;
pub mod source;
pub mod tables;
pub mod validate;
pub mod value;
pub mod write;

pub use builder::ContainerBuilder;
pub use codec::{encode_path, EncodedPath};
pub use convert::{convert_file, convert_font};
pub use error::Error;
pub use source::{FontInfo, FontSource, Glyph, SkrifaSource};
pub use tables::Container;
pub use value::ValueType;
pub use write::{dump_table, FontWrite, TableWriter};

/// Expose the font reading crate we are built on.
pub extern crate skrifa;
