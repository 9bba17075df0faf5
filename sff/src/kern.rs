//! Pair kerning from the `GPOS` or `kern` table.
//!
//! Only what is needed to answer "how much does the advance of `left`
//! change when it is followed by `right`" is looked at: the pair adjustment
//! lookups referenced by the `kern` feature or, when a font has none, the
//! horizontal format 0 subtables of the legacy `kern` table.

use std::collections::BTreeSet;

use read_fonts::{
    tables::{
        gpos::{Gpos, PairPos, PositionSubtables},
        kern::{Kern, Subtable0, SubtableKind},
    },
    types::{GlyphId, Tag},
    FontData, FontRead, FontRef, ReadError,
};

const GPOS: Tag = Tag::new(b"GPOS");
const KERN: Tag = Tag::new(b"kern");
const KERN_FEATURE: Tag = Tag::new(b"kern");

/// The pair kerning of a font, in font units.
///
/// Subtables are parsed up front; individual pairs are read on demand.
#[derive(Clone, Default)]
pub struct KerningTable<'a> {
    /// Pair adjustment subtables, grouped by lookup.
    lookups: Vec<Vec<PairPos<'a>>>,
    legacy: Vec<Subtable0<'a>>,
}

impl<'a> KerningTable<'a> {
    pub fn new(font: &FontRef<'a>) -> Result<Self, ReadError> {
        Self::from_tables(font.table_data(GPOS), font.table_data(KERN))
    }

    /// Read kerning from raw `GPOS` and `kern` table data.
    ///
    /// `GPOS` takes precedence; the `kern` table is only read if `GPOS` is
    /// missing or has no pair adjustments for the `kern` feature.
    pub fn from_tables(
        gpos: Option<FontData<'a>>,
        kern: Option<FontData<'a>>,
    ) -> Result<Self, ReadError> {
        let lookups = match gpos {
            Some(data) => pair_lookups(&Gpos::read(data)?)?,
            None => Vec::new(),
        };
        if !lookups.is_empty() {
            return Ok(KerningTable {
                lookups,
                legacy: Vec::new(),
            });
        }
        let legacy = match kern {
            Some(data) => legacy_subtables(&Kern::read(data)?)?,
            None => Vec::new(),
        };
        Ok(KerningTable { lookups, legacy })
    }

    /// `true` if no pair in this font is kerned.
    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty() && self.legacy.is_empty()
    }

    /// The change in the advance of `left` when followed by `right`.
    ///
    /// A subtable whose pair data cannot be read does not apply.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> i32 {
        if !self.lookups.is_empty() {
            // within a lookup the first subtable that applies wins
            return self
                .lookups
                .iter()
                .filter_map(|subtables| {
                    subtables
                        .iter()
                        .find_map(|subtable| adjustment(subtable, left, right).ok().flatten())
                })
                .map(i32::from)
                .sum();
        }
        self.legacy
            .iter()
            .filter_map(|subtable| subtable.kerning(left, right))
            .map(i32::from)
            .sum()
    }
}

/// The pair adjustment subtables of every lookup in a `kern` feature.
///
/// Lookups are applied in lookup list order, whichever script they are for.
fn pair_lookups<'a>(gpos: &Gpos<'a>) -> Result<Vec<Vec<PairPos<'a>>>, ReadError> {
    let feature_list = gpos.feature_list()?;
    let mut indices = BTreeSet::new();
    for record in feature_list.feature_records() {
        if record.feature_tag() != KERN_FEATURE {
            continue;
        }
        let feature = record.feature(feature_list.offset_data())?;
        indices.extend(feature.lookup_list_indices().iter().map(|index| index.get()));
    }

    let lookup_list = gpos.lookup_list()?;
    let lookups = lookup_list.lookups();
    let mut result = Vec::new();
    for index in indices {
        if index >= lookup_list.lookup_count() {
            log::debug!("kern feature references missing lookup {index}");
            continue;
        }
        let PositionSubtables::Pair(subtables) = lookups.get(index as usize)?.subtables()? else {
            continue;
        };
        let subtables = subtables.iter().collect::<Result<Vec<_>, _>>()?;
        if !subtables.is_empty() {
            result.push(subtables);
        }
    }
    Ok(result)
}

/// The x advance adjustment of the first glyph, or `None` if this subtable
/// does not cover the pair.
fn adjustment(
    subtable: &PairPos,
    left: GlyphId,
    right: GlyphId,
) -> Result<Option<i16>, ReadError> {
    match subtable {
        PairPos::Format1(pairs) => {
            let Some(index) = pairs.coverage()?.get(left) else {
                return Ok(None);
            };
            let pair_set = pairs.pair_sets().get(index as usize)?;
            for record in pair_set.pair_value_records().iter() {
                let record = record?;
                if GlyphId::from(record.second_glyph()) == right {
                    return Ok(Some(record.value_record1().x_advance().unwrap_or_default()));
                }
            }
            Ok(None)
        }
        PairPos::Format2(classes) => {
            if classes.coverage()?.get(left).is_none() {
                return Ok(None);
            }
            let class1 = classes.class_def1()?.get(left);
            let class2 = classes.class_def2()?.get(right);
            if class1 >= classes.class1_count() || class2 >= classes.class2_count() {
                return Ok(None);
            }
            let class1_record = classes.class1_records().get(class1 as usize)?;
            let record = class1_record.class2_records().get(class2 as usize)?;
            Ok(Some(record.value_record1().x_advance().unwrap_or_default()))
        }
    }
}

/// The format 0 subtables that hold horizontal advance adjustments.
fn legacy_subtables<'a>(kern: &Kern<'a>) -> Result<Vec<Subtable0<'a>>, ReadError> {
    let mut result = Vec::new();
    for subtable in kern.subtables() {
        let subtable = subtable?;
        // cross-stream values move glyphs perpendicular to the text
        if !subtable.is_horizontal() || subtable.is_cross_stream() {
            continue;
        }
        if let SubtableKind::Format0(pairs) = subtable.kind()? {
            result.push(pairs);
        }
    }
    Ok(result)
}
