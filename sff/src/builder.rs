//! Assembling a container from a font.

use std::{collections::BTreeSet, path::PathBuf};

use indexmap::IndexMap;

use crate::{
    codec::encode_path,
    error::Error,
    pens::{normalize, MAX_PRECISION},
    source::FontSource,
    tables::{Container, FontHeader, GlyphRecord, KerningEntry, KerningGroup, UNITS_PER_EM},
};

/// The number of decimal places glyph coordinates are rounded to.
pub const DEFAULT_PRECISION: u32 = 1;

/// Builds a [`Container`] for a subset of the code points in a font.
///
/// The phases run in a fixed order: the glyph map is built first (and the
/// build fails if it is empty), then the header, glyph table and kerning
/// map are derived from it.
pub struct ContainerBuilder<'a, S> {
    source: &'a S,
    subset: &'a BTreeSet<u32>,
    precision: u32,
    path: PathBuf,
}

/// A glyph in the glyph map, before encoding.
struct GlyphEntry {
    code_points: Vec<u32>,
    advance_width: u32,
    path: String,
}

/// Glyphs keyed by the hash of their content, in order of first use.
type GlyphMap = IndexMap<md5::Digest, GlyphEntry>;

impl<'a, S: FontSource> ContainerBuilder<'a, S> {
    pub fn new(source: &'a S, subset: &'a BTreeSet<u32>) -> Self {
        ContainerBuilder {
            source,
            subset,
            precision: DEFAULT_PRECISION,
            path: PathBuf::from("<memory>"),
        }
    }

    /// Set the number of decimal places glyph coordinates are rounded to.
    ///
    /// At most [`MAX_PRECISION`]; [`build`][Self::build] fails otherwise.
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Set the path of the font, for error messages.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Build the container.
    pub fn build(&self) -> Result<Container, Error> {
        if self.precision > MAX_PRECISION {
            return Err(Error::InvalidPrecision {
                precision: self.precision,
                max: MAX_PRECISION,
            });
        }
        let info = self.source.info();
        let scale = UNITS_PER_EM as f64 / info.units_per_em as f64;
        let scaled = |value: f32| (value as f64 * scale).round() as i32;

        let (glyph_map, included) = self.glyph_map(scale, info.ascent as f64 * scale)?;
        log::info!(
            "{} of {} code points found, {} distinct glyphs",
            included.len(),
            self.subset.len(),
            glyph_map.len()
        );

        let header = FontHeader {
            postscript_name: info.postscript_name,
            copyright: info.copyright,
            version: info.version,
            units_per_em: UNITS_PER_EM,
            ascent: scaled(info.ascent),
            descent: scaled(info.descent),
            line_gap: scaled(info.line_gap),
            underline_position: scaled(info.underline_position),
            underline_thickness: scaled(info.underline_thickness),
        };
        let glyphs = glyph_table(glyph_map)?;
        let kerning = self.kerning_map(&included, scale);
        log::info!("{} code points have kerning pairs", kerning.len());

        Ok(Container {
            header,
            glyphs,
            kerning,
        })
    }

    /// Collect every glyph in the subset, merging code points whose glyphs
    /// are identical.
    ///
    /// Also returns the code points that were found, in ascending order.
    fn glyph_map(&self, scale: f64, translate_y: f64) -> Result<(GlyphMap, Vec<u32>), Error> {
        let mut glyph_map = GlyphMap::new();
        let mut included = Vec::new();
        for &code_point in self.subset {
            if !self.source.has_glyph(code_point) {
                log::debug!("no glyph for U+{code_point:04X}");
                continue;
            }
            let Some(glyph) = self.source.glyph(code_point)? else {
                log::debug!("no outline for U+{code_point:04X}");
                continue;
            };
            included.push(code_point);

            let path = normalize(&glyph.outline, scale, translate_y, self.precision)?;
            let advance_width = (glyph.advance_width as f64 * scale).round().max(0.0) as u32;
            let mut hashed = advance_width.to_string().into_bytes();
            hashed.extend(path.as_bytes());
            let entry = glyph_map
                .entry(md5::compute(&hashed))
                .or_insert_with(|| GlyphEntry {
                    code_points: Vec::new(),
                    advance_width,
                    path,
                });
            if !entry.code_points.is_empty() {
                log::debug!(
                    "U+{code_point:04X} shares a glyph with U+{:04X}",
                    entry.code_points[0]
                );
            }
            entry.code_points.push(code_point);
        }
        if glyph_map.is_empty() {
            return Err(Error::EmptySubset {
                path: self.path.clone(),
            });
        }
        Ok((glyph_map, included))
    }

    /// Probe every ordered pair of included code points, keeping the pairs
    /// whose normalized offset is not zero.
    fn kerning_map(&self, included: &[u32], scale: f64) -> Vec<KerningGroup> {
        included
            .iter()
            .filter_map(|&left| {
                let pairs = included
                    .iter()
                    .filter_map(|&right| {
                        let offset = self.source.kern_advance(left, right) as f64 * scale;
                        let offset = offset.round() as i32;
                        (offset != 0).then_some(KerningEntry { right, offset })
                    })
                    .collect::<Vec<_>>();
                (!pairs.is_empty()).then_some(KerningGroup { left, pairs })
            })
            .collect()
    }
}

/// Encode the glyph map, ordered by the lowest code point of each glyph.
fn glyph_table(glyph_map: GlyphMap) -> Result<Vec<GlyphRecord>, Error> {
    let mut glyphs = glyph_map
        .into_values()
        .map(|entry| {
            Ok(GlyphRecord {
                path: encode_path(&entry.path)?,
                code_points: entry.code_points,
                advance_width: entry.advance_width,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    // subset iteration is ascending, so this is already sorted; keep it
    // that way regardless of how the map was filled
    glyphs.sort_by_key(|glyph| glyph.code_points[0]);
    Ok(glyphs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use kurbo::BezPath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::source::{FontInfo, Glyph};

    #[derive(Default)]
    struct TestFont {
        units_per_em: u16,
        ascent: f32,
        glyphs: HashMap<u32, Glyph>,
        kerning: HashMap<(u32, u32), i32>,
    }

    impl TestFont {
        fn new(units_per_em: u16) -> Self {
            TestFont {
                units_per_em,
                ascent: units_per_em as f32 * 0.8,
                ..Default::default()
            }
        }

        fn with_box(mut self, code_point: u32, advance: f32, size: f64) -> Self {
            let mut outline = BezPath::new();
            outline.move_to((0.0, 0.0));
            outline.line_to((size, 0.0));
            outline.line_to((size, size));
            outline.close_path();
            self.glyphs.insert(
                code_point,
                Glyph {
                    outline,
                    advance_width: advance,
                },
            );
            self
        }

        fn with_kern(mut self, left: u32, right: u32, value: i32) -> Self {
            self.kerning.insert((left, right), value);
            self
        }
    }

    impl FontSource for TestFont {
        fn info(&self) -> FontInfo {
            FontInfo {
                postscript_name: "Test-Regular".into(),
                units_per_em: self.units_per_em,
                ascent: self.ascent,
                descent: -(self.units_per_em as f32) * 0.2,
                underline_position: -(self.units_per_em as f32) * 0.1,
                underline_thickness: self.units_per_em as f32 * 0.05,
                ..Default::default()
            }
        }

        fn has_glyph(&self, code_point: u32) -> bool {
            self.glyphs.contains_key(&code_point)
        }

        fn glyph(&self, code_point: u32) -> Result<Option<Glyph>, Error> {
            Ok(self.glyphs.get(&code_point).cloned())
        }

        fn kern_advance(&self, left: u32, right: u32) -> i32 {
            self.kerning.get(&(left, right)).copied().unwrap_or(0)
        }
    }

    fn subset(code_points: &[u32]) -> BTreeSet<u32> {
        code_points.iter().copied().collect()
    }

    #[test]
    fn header_is_normalized() {
        let font = TestFont::new(2048).with_box(0x41, 1024.0, 10.0);
        let container = ContainerBuilder::new(&font, &subset(&[0x41]))
            .build()
            .unwrap();
        let header = container.header;
        assert_eq!(header.postscript_name, "Test-Regular");
        assert_eq!(header.units_per_em, 1000);
        assert_eq!(header.ascent, 800);
        assert_eq!(header.descent, -200);
        assert_eq!(header.underline_position, -100);
        assert_eq!(header.underline_thickness, 50);
    }

    #[test]
    fn glyphs_are_scaled_and_moved_to_the_baseline() {
        let font = TestFont::new(2000).with_box(0x41, 1200.0, 100.0);
        let container = ContainerBuilder::new(&font, &subset(&[0x41]))
            .build()
            .unwrap();
        let glyph = container.glyph_for(0x41).unwrap();
        assert_eq!(glyph.advance_width, 600);
        assert_eq!(glyph.path, encode_path("M0 800L50 800 50 850Z").unwrap());
    }

    #[test]
    fn identical_glyphs_share_a_record() {
        let font = TestFont::new(1000)
            .with_box(0x20, 250.0, 0.0)
            .with_box(0x41, 600.0, 50.0)
            .with_box(0xA0, 250.0, 0.0)
            .with_box(0xC0, 600.0, 50.0)
            // same outline, different advance
            .with_box(0x42, 500.0, 50.0);
        let container = ContainerBuilder::new(&font, &subset(&[0x20, 0x41, 0x42, 0xA0, 0xC0]))
            .build()
            .unwrap();
        let code_points = container
            .glyphs
            .iter()
            .map(|glyph| glyph.code_points.clone())
            .collect::<Vec<_>>();
        assert_eq!(code_points, [vec![0x20, 0xA0], vec![0x41, 0xC0], vec![0x42]]);
    }

    #[test]
    fn missing_code_points_are_skipped() {
        let font = TestFont::new(1000).with_box(0x41, 600.0, 50.0);
        let container = ContainerBuilder::new(&font, &subset(&[0x40, 0x41, 0x42]))
            .build()
            .unwrap();
        assert_eq!(container.glyphs.len(), 1);
        assert_eq!(container.glyphs[0].code_points, [0x41]);
    }

    #[test]
    fn empty_subset() {
        let font = TestFont::new(1000).with_box(0x41, 600.0, 50.0);
        let result = ContainerBuilder::new(&font, &subset(&[0x61, 0x62]))
            .path("fonts/Test.ttf")
            .build();
        match result {
            Err(Error::EmptySubset { path }) => assert_eq!(path, PathBuf::from("fonts/Test.ttf")),
            other => panic!("expected empty subset, got {other:?}"),
        }
    }

    #[test]
    fn kerning_is_sparse_and_normalized() {
        let font = TestFont::new(4000)
            .with_box(0x41, 2400.0, 100.0)
            .with_box(0x56, 2400.0, 120.0)
            .with_box(0x57, 2800.0, 120.0)
            .with_kern(0x41, 0x56, -320)
            .with_kern(0x41, 0x41, 80)
            // rounds to zero once normalized
            .with_kern(0x56, 0x41, 1)
            // not in the subset
            .with_kern(0x41, 0x58, -100);
        let container = ContainerBuilder::new(&font, &subset(&[0x41, 0x56, 0x57, 0x58]))
            .build()
            .unwrap();
        assert_eq!(
            container.kerning,
            [KerningGroup {
                left: 0x41,
                pairs: vec![
                    KerningEntry {
                        right: 0x41,
                        offset: 20
                    },
                    KerningEntry {
                        right: 0x56,
                        offset: -80
                    },
                ],
            }]
        );
    }

    #[test]
    fn precision_is_applied() {
        let font = TestFont::new(1000).with_box(0x41, 600.0, 33.333);
        let container = ContainerBuilder::new(&font, &subset(&[0x41]))
            .precision(2)
            .build()
            .unwrap();
        assert_eq!(
            container.glyphs[0].path,
            encode_path("M0 800L33.33 800 33.33 833.33Z").unwrap()
        );
    }

    #[test]
    fn precision_out_of_range() {
        let font = TestFont::new(1000).with_box(0x41, 600.0, 33.333);
        let result = ContainerBuilder::new(&font, &subset(&[0x41]))
            .precision(MAX_PRECISION + 1)
            .build();
        assert!(matches!(
            result,
            Err(Error::InvalidPrecision { precision: 7, .. })
        ));
    }

    #[test]
    fn max_precision_keeps_every_operand() {
        let font = TestFont::new(1500).with_box(0x41, 900.0, 7.0);
        let container = ContainerBuilder::new(&font, &subset(&[0x41]))
            .precision(MAX_PRECISION)
            .build()
            .unwrap();
        assert_eq!(
            container.glyphs[0].path,
            encode_path("M0 800L4.666667 800 4.666667 804.666667Z").unwrap()
        );
    }

    #[test]
    fn output_is_deterministic() {
        let font = TestFont::new(1000)
            .with_box(0x41, 600.0, 50.0)
            .with_box(0x42, 600.0, 60.0)
            .with_box(0x43, 600.0, 50.0)
            .with_kern(0x41, 0x42, -30);
        let subset = subset(&[0x41, 0x42, 0x43]);
        let first = ContainerBuilder::new(&font, &subset).build().unwrap();
        let second = ContainerBuilder::new(&font, &subset).build().unwrap();
        assert_eq!(first.dump().unwrap(), second.dump().unwrap());
    }
}
