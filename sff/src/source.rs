//! Reading glyphs, metrics and kerning out of a font.

use std::path::Path;

use kurbo::BezPath;
use skrifa::{
    charmap::Charmap,
    instance::{LocationRef, Size},
    metrics::GlyphMetrics,
    outline::{DrawSettings, OutlineGlyphCollection},
    raw::FontRef,
    string::StringId,
    GlyphId, MetadataProvider,
};

use crate::{error::Error, kern::KerningTable, pens::BezPathPen};

/// Font-wide names and metrics, in font units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontInfo {
    pub postscript_name: String,
    pub copyright: String,
    pub version: String,
    pub units_per_em: u16,
    pub ascent: f32,
    /// Negative below the baseline.
    pub descent: f32,
    pub line_gap: f32,
    /// Distance from the baseline to the top of the underline, negative
    /// below the baseline.
    pub underline_position: f32,
    pub underline_thickness: f32,
}

/// The outline and advance of a single glyph, in font units.
///
/// The outline is in the font's own y-up coordinate space.
#[derive(Clone, Debug, Default)]
pub struct Glyph {
    pub outline: BezPath,
    pub advance_width: f32,
}

/// Everything the container builder needs to know about a font.
///
/// All values are in font units; the builder does the normalization.
pub trait FontSource {
    fn info(&self) -> FontInfo;

    /// `true` if the font maps `code_point` to a glyph other than `.notdef`.
    fn has_glyph(&self, code_point: u32) -> bool;

    /// The glyph for `code_point`, or `None` if there is no such glyph.
    fn glyph(&self, code_point: u32) -> Result<Option<Glyph>, Error>;

    /// The change in advance of `left` when it is followed by `right`.
    fn kern_advance(&self, left: u32, right: u32) -> i32;
}

/// A [`FontSource`] for OpenType fonts and collections.
pub struct SkrifaSource<'a> {
    charmap: Charmap<'a>,
    glyph_metrics: GlyphMetrics<'a>,
    outlines: OutlineGlyphCollection<'a>,
    kerning: KerningTable<'a>,
    info: FontInfo,
}

impl<'a> SkrifaSource<'a> {
    /// Read the font at `index` in `data`.
    ///
    /// `path` is only used in error messages.
    pub fn new(data: &'a [u8], index: u32, path: &Path) -> Result<Self, Error> {
        let unreadable = |reason: String| Error::SourceUnreadable {
            path: path.to_owned(),
            reason,
        };
        let font = FontRef::from_index(data, index).map_err(|e| unreadable(e.to_string()))?;
        let kerning = KerningTable::new(&font)
            .map_err(|e| unreadable(format!("bad kerning data: {e}")))?;
        let info = read_info(&font);
        if info.units_per_em == 0 {
            return Err(unreadable("units per em is zero".into()));
        }
        log::debug!(
            "read {}: {} units per em, kerning {}",
            path.display(),
            info.units_per_em,
            if kerning.is_empty() { "absent" } else { "present" }
        );
        Ok(SkrifaSource {
            charmap: font.charmap(),
            glyph_metrics: font.glyph_metrics(Size::unscaled(), LocationRef::default()),
            outlines: font.outline_glyphs(),
            kerning,
            info,
        })
    }

    fn glyph_id(&self, code_point: u32) -> Option<GlyphId> {
        self.charmap
            .map(code_point)
            .filter(|gid| *gid != GlyphId::NOTDEF)
    }
}

fn read_info(font: &FontRef) -> FontInfo {
    let metrics = font.metrics(Size::unscaled(), LocationRef::default());
    let string = |id: StringId| {
        font.localized_strings(id)
            .english_or_first()
            .map(|s| s.to_string())
            .unwrap_or_default()
    };
    let underline = metrics.underline.unwrap_or_default();
    FontInfo {
        postscript_name: string(StringId::POSTSCRIPT_NAME),
        copyright: string(StringId::COPYRIGHT_NOTICE),
        version: string(StringId::VERSION_STRING),
        units_per_em: metrics.units_per_em,
        ascent: metrics.ascent,
        descent: metrics.descent,
        line_gap: metrics.leading,
        underline_position: underline.offset,
        underline_thickness: underline.thickness,
    }
}

impl FontSource for SkrifaSource<'_> {
    fn info(&self) -> FontInfo {
        self.info.clone()
    }

    fn has_glyph(&self, code_point: u32) -> bool {
        self.glyph_id(code_point).is_some()
    }

    fn glyph(&self, code_point: u32) -> Result<Option<Glyph>, Error> {
        let Some(gid) = self.glyph_id(code_point) else {
            return Ok(None);
        };
        let advance_width = self.glyph_metrics.advance_width(gid).unwrap_or_default();
        let Some(outline) = self.outlines.get(gid) else {
            // mapped, but with no outline data (bitmap-only fonts)
            return Ok(None);
        };
        let mut pen = BezPathPen::new();
        outline
            .draw(
                DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                &mut pen,
            )
            .map_err(|e| Error::Outline {
                code_point,
                reason: e.to_string(),
            })?;
        Ok(Some(Glyph {
            outline: pen.into_inner(),
            advance_width,
        }))
    }

    fn kern_advance(&self, left: u32, right: u32) -> i32 {
        match (self.glyph_id(left), self.glyph_id(right)) {
            (Some(left), Some(right)) => self.kerning.kerning(left, right),
            _ => 0,
        }
    }
}
