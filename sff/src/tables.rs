//! The tables that make up an SFF container.
//!
//! All integers are big endian, all strings are utf-8.
//!
//! ```text
//! magic:   3 bytes, "SFF"
//! version: uint16
//! (TABLE) header {
//!     (UTF8_STRING) postscript name
//!     (UTF8_STRING) copyright
//!     (UTF8_STRING) version
//!     (uint16) units per em (always 1000)
//!     (int16) ascent
//!     (int16) descent
//!     (int16) lineGap
//!     (int16) underlinePosition (y = ascent - underlinePosition)
//!     (int16) underlineThickness
//! }
//! (ARRAY) glyphs [
//!     (TABLE) {
//!         (ARRAY) code points [ (uint16) code point ]
//!         (uint16) advance width
//!         (BYTE_SEQ) compressed path
//!     }
//! ]
//! (ARRAY) kerning [
//!     (TABLE) {
//!         (uint16) left code point
//!         (ARRAY) [
//!             (TABLE) {
//!                 (uint16) right code point
//!                 (int16) advance offset
//!             }
//!         ]
//!     }
//! ]
//! ```

use crate::{
    codec::EncodedPath,
    error::Error,
    validate::{Validate, ValidationCtx},
    write::{dump_table, FontWrite, TableWriter},
};

/// The tag at the start of every container.
pub const MAGIC: [u8; 3] = *b"SFF";

/// The container format version.
pub const VERSION: u16 = 1;

/// Every glyph and metric is normalized to this many units per em.
pub const UNITS_PER_EM: u16 = 1000;

/// Font-wide names and metrics, in normalized units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontHeader {
    pub postscript_name: String,
    pub copyright: String,
    pub version: String,
    pub units_per_em: u16,
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
    pub underline_position: i32,
    pub underline_thickness: i32,
}

/// One distinct glyph, shared by every code point that renders identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    /// Ascending; never empty.
    pub code_points: Vec<u32>,
    pub advance_width: u32,
    pub path: EncodedPath,
}

/// A non-zero kerning adjustment for a (left, right) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KerningEntry {
    pub right: u32,
    pub offset: i32,
}

/// All non-zero kerning adjustments that share a left code point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KerningGroup {
    pub left: u32,
    /// Never empty.
    pub pairs: Vec<KerningEntry>,
}

/// A complete container, ready to be dumped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Container {
    pub header: FontHeader,
    pub glyphs: Vec<GlyphRecord>,
    pub kerning: Vec<KerningGroup>,
}

impl Container {
    /// Serialize the container, file header included.
    pub fn dump(&self) -> Result<Vec<u8>, Error> {
        Ok(dump_table(self)?)
    }

    /// Look up the kerning offset for a pair, if there is one.
    pub fn kerning_offset(&self, left: u32, right: u32) -> Option<i32> {
        let group = self.kerning.iter().find(|group| group.left == left)?;
        group
            .pairs
            .iter()
            .find(|pair| pair.right == right)
            .map(|pair| pair.offset)
    }

    /// Look up the glyph used for a code point.
    pub fn glyph_for(&self, code_point: u32) -> Option<&GlyphRecord> {
        self.glyphs
            .iter()
            .find(|glyph| glyph.code_points.contains(&code_point))
    }
}

impl FontWrite for FontHeader {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_table(&[
            &self.postscript_name,
            &self.copyright,
            &self.version,
            &self.units_per_em,
            &(self.ascent as i16),
            &(self.descent as i16),
            &(self.line_gap as i16),
            &(self.underline_position as i16),
            &(self.underline_thickness as i16),
        ]);
    }
}

impl FontWrite for GlyphRecord {
    fn write_into(&self, writer: &mut TableWriter) {
        let code_points = self
            .code_points
            .iter()
            .map(|cp| *cp as u16)
            .collect::<Vec<_>>();
        writer.write_array(&code_points);
        (self.advance_width as u16).write_into(writer);
        writer.write_bytes(self.path.as_bytes());
    }
}

impl FontWrite for KerningEntry {
    fn write_into(&self, writer: &mut TableWriter) {
        (self.right as u16).write_into(writer);
        (self.offset as i16).write_into(writer);
    }
}

impl FontWrite for KerningGroup {
    fn write_into(&self, writer: &mut TableWriter) {
        (self.left as u16).write_into(writer);
        writer.write_array(&self.pairs);
    }
}

impl FontWrite for Container {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_slice(&MAGIC);
        VERSION.write_into(writer);
        self.header.write_into(writer);
        writer.write_array(&self.glyphs);
        writer.write_array(&self.kerning);
    }
}

impl Validate for FontHeader {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("FontHeader", |ctx| {
            ctx.in_field("postscript_name", |ctx| {
                ctx.check_u16_len(self.postscript_name.len())
            });
            ctx.in_field("copyright", |ctx| ctx.check_u16_len(self.copyright.len()));
            ctx.in_field("version", |ctx| ctx.check_u16_len(self.version.len()));
            ctx.in_field("ascent", |ctx| ctx.check_i16(self.ascent));
            ctx.in_field("descent", |ctx| ctx.check_i16(self.descent));
            ctx.in_field("line_gap", |ctx| ctx.check_i16(self.line_gap));
            ctx.in_field("underline_position", |ctx| {
                ctx.check_i16(self.underline_position)
            });
            ctx.in_field("underline_thickness", |ctx| {
                ctx.check_i16(self.underline_thickness)
            });
        })
    }
}

impl Validate for GlyphRecord {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("GlyphRecord", |ctx| {
            ctx.in_field("code_points", |ctx| {
                if self.code_points.is_empty() {
                    ctx.report("glyph has no code points");
                }
                ctx.in_array(&self.code_points, |ctx, cp| ctx.check_u16(*cp));
            });
            ctx.in_field("advance_width", |ctx| ctx.check_u16(self.advance_width));
            ctx.in_field("path", |ctx| ctx.check_u16_len(self.path.len()));
        })
    }
}

impl Validate for KerningEntry {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("KerningEntry", |ctx| {
            ctx.in_field("right", |ctx| ctx.check_u16(self.right));
            ctx.in_field("offset", |ctx| {
                if self.offset == 0 {
                    ctx.report("zero offsets are never stored");
                }
                ctx.check_i16(self.offset)
            });
        })
    }
}

impl Validate for KerningGroup {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("KerningGroup", |ctx| {
            ctx.in_field("left", |ctx| ctx.check_u16(self.left));
            ctx.in_field("pairs", |ctx| {
                if self.pairs.is_empty() {
                    ctx.report("kerning group has no pairs");
                }
                self.pairs.validate_impl(ctx)
            });
        })
    }
}

impl Validate for Container {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("Container", |ctx| {
            ctx.in_field("header", |ctx| self.header.validate_impl(ctx));
            ctx.in_field("glyphs", |ctx| self.glyphs.validate_impl(ctx));
            ctx.in_field("kerning", |ctx| self.kerning.validate_impl(ctx));
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::encode_path;

    fn header() -> FontHeader {
        FontHeader {
            postscript_name: "Test-Regular".into(),
            copyright: "(c)".into(),
            version: "1.0".into(),
            units_per_em: UNITS_PER_EM,
            ascent: 800,
            descent: -200,
            line_gap: 0,
            underline_position: -100,
            underline_thickness: 50,
        }
    }

    #[test]
    fn header_layout() {
        let bytes = dump_table(&header()).unwrap();
        let mut expected = vec![0, 12];
        expected.extend(b"Test-Regular");
        expected.extend([0, 3]);
        expected.extend(b"(c)");
        expected.extend([0, 3]);
        expected.extend(b"1.0");
        expected.extend([0x03, 0xE8]); // 1000
        expected.extend([0x03, 0x20]); // 800
        expected.extend([0xFF, 0x38]); // -200
        expected.extend([0x00, 0x00]);
        expected.extend([0xFF, 0x9C]); // -100
        expected.extend([0x00, 0x32]); // 50
        assert_eq!(bytes, expected);
    }

    #[test]
    fn container_layout() {
        let container = Container {
            header: FontHeader::default(),
            glyphs: vec![GlyphRecord {
                code_points: vec![0x41, 0xC0],
                advance_width: 600,
                path: encode_path("M0 0Z").unwrap(),
            }],
            kerning: vec![KerningGroup {
                left: 0x41,
                pairs: vec![KerningEntry {
                    right: 0x56,
                    offset: -80,
                }],
            }],
        };
        let bytes = container.dump().unwrap();
        let mut expected = b"SFF".to_vec();
        expected.extend([0, 1]);
        // empty strings, zero metrics
        expected.extend([0; 6 + 2 + 10]);
        // one glyph, two code points
        expected.extend([0, 1, 0, 2, 0x00, 0x41, 0x00, 0xC0]);
        expected.extend([0x02, 0x58]);
        expected.extend([0, 6, 0x51, 0x00, 0xE1, 0x00, 0xA0, 0xF0]);
        // one kerning group with one pair
        expected.extend([0, 1, 0x00, 0x41, 0, 1, 0x00, 0x56, 0xFF, 0xB0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_container() {
        let bytes = Container::default().dump().unwrap();
        assert_eq!(bytes.len(), 3 + 2 + 18 + 2 + 2);
        assert_eq!(&bytes[bytes.len() - 4..], [0, 0, 0, 0]);
    }

    #[test]
    fn code_point_outside_bmp_is_rejected() {
        let container = Container {
            glyphs: vec![GlyphRecord {
                code_points: vec![0x1F600],
                advance_width: 1000,
                path: encode_path("").unwrap(),
            }],
            ..Default::default()
        };
        match container.dump() {
            Err(Error::Packing(report)) => {
                assert!(report.to_string().contains("code_points[0]"))
            }
            other => panic!("expected packing error, got {other:?}"),
        }
    }

    #[test]
    fn metrics_must_fit_int16() {
        let container = Container {
            header: FontHeader {
                ascent: 40_000,
                ..header()
            },
            ..Default::default()
        };
        assert!(matches!(container.dump(), Err(Error::Packing(_))));
    }

    #[test]
    fn zero_kerning_is_rejected() {
        let container = Container {
            kerning: vec![KerningGroup {
                left: 0x41,
                pairs: vec![KerningEntry {
                    right: 0x41,
                    offset: 0,
                }],
            }],
            ..Default::default()
        };
        assert!(container.dump().is_err());
    }

    #[test]
    fn lookups() {
        let container = Container {
            glyphs: vec![GlyphRecord {
                code_points: vec![0x20, 0xA0],
                advance_width: 250,
                path: encode_path("").unwrap(),
            }],
            kerning: vec![KerningGroup {
                left: 0x54,
                pairs: vec![KerningEntry {
                    right: 0x6F,
                    offset: -60,
                }],
            }],
            ..Default::default()
        };
        assert_eq!(container.glyph_for(0xA0).unwrap().advance_width, 250);
        assert!(container.glyph_for(0x41).is_none());
        assert_eq!(container.kerning_offset(0x54, 0x6F), Some(-60));
        assert_eq!(container.kerning_offset(0x6F, 0x54), None);
    }
}
