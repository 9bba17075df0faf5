//! Batch converter from OpenType fonts to SFF containers
//!
//! Every input font is converted with the same character subset and
//! written to `<output dir>/<font name>.sff`.

use std::path::{Path, PathBuf};

use clap::Parser;
use sff::{charset, convert::ConvertOptions, pens::MAX_PRECISION};

/// The font file extensions we know how to read.
const FONT_EXTENSIONS: &[&str] = &["otf", "ttf", "ttc"];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The font files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// The directory the containers are written to; created if missing.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Charsets to include: names (english, german, greek, ...) or hex
    /// code points and ranges (41, U+00C4, 0x20-0x7F).
    #[arg(short, long, default_value = "english")]
    charsets: String,

    /// Code points added after exclusions are applied.
    #[arg(long)]
    include: Option<String>,

    /// Code points removed from the charsets.
    #[arg(long)]
    exclude: Option<String>,

    /// Decimal places kept in glyph coordinates.
    #[arg(
        long,
        default_value_t = ConvertOptions::default().precision,
        value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64)
    )]
    precision: u32,

    /// The font to convert in font collections.
    #[arg(long, default_value_t = 0)]
    font_index: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let parse = |list: Option<&str>| charset::parse_charsets(list.unwrap_or_default());
    let subset = charset::expand(
        &parse(Some(args.charsets.as_str()))?,
        &parse(args.include.as_deref())?,
        &parse(args.exclude.as_deref())?,
    )?;
    if subset.is_empty() {
        return Err("Selected character subset contains no characters.".into());
    }

    if args.output_dir.is_file() {
        return Err(format!(
            "Destination must be a directory, file given: {}",
            args.output_dir.display()
        )
        .into());
    }
    std::fs::create_dir_all(&args.output_dir).map_err(|source| sff::Error::Io {
        path: args.output_dir.clone(),
        source,
    })?;

    let options = ConvertOptions {
        precision: args.precision,
        font_index: args.font_index,
    };
    for input in &args.inputs {
        if let Err(reason) = check_input(input) {
            log::warn!("{reason}: {}", input.display());
            continue;
        }
        let dest = output_path(input, &args.output_dir);
        sff::convert_file(input, &dest, &subset, &options)?;
    }
    Ok(())
}

/// Inputs that fail this check are skipped rather than treated as errors.
fn check_input(path: &Path) -> Result<(), &'static str> {
    if !path.exists() {
        return Err("File not found");
    }
    if !path.is_file() {
        return Err("Not a file");
    }
    let is_font = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if !is_font {
        return Err("Not an OTF/TTF/TTC file");
    }
    Ok(())
}

fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(".sff");
    output_dir.join(name)
}
