//! Converting font files on disk.

use std::{collections::BTreeSet, io::Write, path::Path};

use tempfile::NamedTempFile;

use crate::{
    builder::{ContainerBuilder, DEFAULT_PRECISION},
    error::Error,
    source::{FontSource, SkrifaSource},
};

/// Options that control a conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// The number of decimal places glyph coordinates are rounded to.
    pub precision: u32,
    /// The font to convert, for font collections.
    pub font_index: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            precision: DEFAULT_PRECISION,
            font_index: 0,
        }
    }
}

/// Convert a font to a container, returning the container's bytes.
///
/// `path` is only used in error messages.
pub fn convert_font(
    source: &impl FontSource,
    subset: &BTreeSet<u32>,
    options: &ConvertOptions,
    path: &Path,
) -> Result<Vec<u8>, Error> {
    ContainerBuilder::new(source, subset)
        .precision(options.precision)
        .path(path)
        .build()?
        .dump()
}

/// Convert the font file at `src`, writing the container to `dest`.
///
/// The container is built in memory and only then written out, so on
/// failure `dest` is left untouched.
pub fn convert_file(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    subset: &BTreeSet<u32>,
    options: &ConvertOptions,
) -> Result<(), Error> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let data = std::fs::read(src).map_err(|e| Error::SourceUnreadable {
        path: src.to_owned(),
        reason: e.to_string(),
    })?;
    let source = SkrifaSource::new(&data, options.font_index, src)?;
    let bytes = convert_font(&source, subset, options, src)?;
    write_atomic(dest, &bytes)?;
    log::info!("Created file {}", dest.display());
    Ok(())
}

/// Write to a temporary file next to `dest`, then move it into place.
fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), Error> {
    let io_err = |source| Error::Io {
        path: dest.to_owned(),
        source,
    };
    let dir = match dest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.persist(dest).map_err(|e| io_err(e.error))?;
    Ok(())
}
