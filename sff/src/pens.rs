//! Capturing glyph outlines and normalizing them into compact path text.

use std::fmt::Write;

use kurbo::{Affine, BezPath, PathEl, Point};
use skrifa::outline::OutlinePen;

use crate::{codec::NUMBER_LOOKAHEAD, error::Error};

/// The largest number of decimal places [`normalize`] accepts.
///
/// With this many places, any coordinate within ±10⁸ still fits in a
/// single path operand.
pub const MAX_PRECISION: u32 = 6;

/// A pen that records an outline as a [`BezPath`].
#[derive(Debug, Default)]
pub struct BezPathPen {
    path: BezPath,
}

fn as_kurbo_point(x: f32, y: f32) -> Point {
    Point {
        x: x as f64,
        y: y as f64,
    }
}

impl BezPathPen {
    pub fn new() -> BezPathPen {
        BezPathPen {
            path: BezPath::new(),
        }
    }

    pub fn into_inner(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for BezPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(as_kurbo_point(x, y))
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(as_kurbo_point(x, y))
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path
            .quad_to(as_kurbo_point(cx0, cy0), as_kurbo_point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            as_kurbo_point(cx0, cy0),
            as_kurbo_point(cx1, cy1),
            as_kurbo_point(x, y),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Scale an outline, move it vertically and write it as path text.
///
/// Coordinates are scaled by `scale`, shifted by `translate_y` and rounded
/// to `precision` decimal places. The text uses absolute upper-case
/// commands; a command that repeats the previous one (other than `M`) is
/// not restated, and operands are separated by a single space unless the
/// operand is negative.
///
/// Fails if `precision` exceeds [`MAX_PRECISION`], or if a coordinate is
/// too long to be read back as a single operand:
///
/// ```
/// # use kurbo::BezPath;
/// let mut path = BezPath::new();
/// path.move_to((0.0, 0.0));
/// path.line_to((10.0, -20.0));
/// path.line_to((30.0, 40.0));
/// path.close_path();
/// assert_eq!(sff::pens::normalize(&path, 0.5, 100.0, 1)?, "M0 100L5 90 15 120Z");
/// # Ok::<_, sff::Error>(())
/// ```
pub fn normalize(
    outline: &BezPath,
    scale: f64,
    translate_y: f64,
    precision: u32,
) -> Result<String, Error> {
    if precision > MAX_PRECISION {
        return Err(Error::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        });
    }
    let transform = Affine::translate((0.0, translate_y)) * Affine::scale(scale);
    let mut writer = PathTextWriter::new(precision);
    for el in outline.elements() {
        writer.push(transform * *el)?;
    }
    Ok(writer.text)
}

/// Formats path elements in the compact text form the path codec reads.
struct PathTextWriter {
    text: String,
    factor: f64,
    prev: Option<char>,
}

impl PathTextWriter {
    fn new(precision: u32) -> Self {
        PathTextWriter {
            text: String::new(),
            factor: 10f64.powi(precision as i32),
            prev: None,
        }
    }

    fn push(&mut self, el: PathEl) -> Result<(), Error> {
        let (cmd, points) = match el {
            PathEl::MoveTo(p) => ('M', vec![p]),
            PathEl::LineTo(p) => ('L', vec![p]),
            PathEl::QuadTo(p0, p1) => ('Q', vec![p0, p1]),
            PathEl::CurveTo(p0, p1, p2) => ('C', vec![p0, p1, p2]),
            PathEl::ClosePath => ('Z', vec![]),
        };
        let repeated = self.prev == Some(cmd) && !matches!(cmd, 'M' | 'Z');
        if !repeated {
            self.text.push(cmd);
        }
        let coords = points.iter().flat_map(|p| [p.x, p.y]);
        for (i, value) in coords.enumerate() {
            let value = self.round(value);
            if (i > 0 || repeated) && value >= 0.0 {
                self.text.push(' ');
            }
            let start = self.text.len();
            let _ = write!(self.text, "{value}");
            if self.text.len() - start > NUMBER_LOOKAHEAD {
                return Err(Error::OperandTooLong(self.text.split_off(start)));
            }
        }
        self.prev = Some(cmd);
        Ok(())
    }

    fn round(&self, value: f64) -> f64 {
        let rounded = (value * self.factor).round() / self.factor;
        // avoid writing "-0"
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> BezPath {
        let mut pen = BezPathPen::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.line_to(100.0, 100.0);
        pen.line_to(0.0, 100.0);
        pen.close();
        pen.into_inner()
    }

    #[test]
    fn pen_records_every_command() {
        let mut pen = BezPathPen::new();
        pen.move_to(1.0, 2.0);
        pen.quad_to(3.0, 4.0, 5.0, 6.0);
        pen.curve_to(7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
        pen.close();
        let path = pen.into_inner();
        assert_eq!(
            path.elements(),
            [
                PathEl::MoveTo((1.0, 2.0).into()),
                PathEl::QuadTo((3.0, 4.0).into(), (5.0, 6.0).into()),
                PathEl::CurveTo((7.0, 8.0).into(), (9.0, 10.0).into(), (11.0, 12.0).into()),
                PathEl::ClosePath,
            ]
        );
    }

    #[test]
    fn identity() {
        assert_eq!(
            normalize(&square(), 1.0, 0.0, 1).unwrap(),
            "M0 0L100 0 100 100 0 100Z"
        );
    }

    #[test]
    fn scale_then_translate() {
        // 2048 units per em down to 1000, baseline moved up by the ascent
        let text = normalize(&square(), 1000.0 / 2048.0, 800.0, 1).unwrap();
        assert_eq!(text, "M0 800L48.8 800 48.8 848.8 0 848.8Z");
    }

    #[test]
    fn negative_operands_are_not_separated() {
        let text = normalize(&square(), 1.0, -150.0, 0).unwrap();
        assert_eq!(text, "M0-150L100-150 100-50 0-50Z");
    }

    #[test]
    fn rounding_precision() {
        let mut path = BezPath::new();
        path.move_to((1.26, -0.04));
        path.curve_to((0.333, 0.666), (2.5, 2.56), (-3.46, 9.999));
        assert_eq!(normalize(&path, 1.0, 0.0, 0).unwrap(), "M1 0C0 1 3 3-3 10");
        assert_eq!(
            normalize(&path, 1.0, 0.0, 1).unwrap(),
            "M1.3 0C0.3 0.7 2.5 2.6-3.5 10"
        );
        assert_eq!(
            normalize(&path, 1.0, 0.0, 2).unwrap(),
            "M1.26-0.04C0.33 0.67 2.5 2.56-3.46 10"
        );
    }

    #[test]
    fn subpaths_restate_move() {
        let mut path = square();
        path.extend(square());
        let text = normalize(&path, 1.0, 0.0, 0).unwrap();
        assert_eq!(text, "M0 0L100 0 100 100 0 100ZM0 0L100 0 100 100 0 100Z");
    }

    #[test]
    fn output_is_accepted_by_codec() {
        let text = normalize(&square(), 0.37, -12.3, 1).unwrap();
        assert!(crate::codec::encode_path(&text).is_ok());
    }

    #[test]
    fn empty_outline() {
        assert_eq!(normalize(&BezPath::new(), 0.5, 800.0, 1).unwrap(), "");
    }

    #[test]
    fn precision_is_bounded() {
        let result = normalize(&square(), 1.0, 0.0, MAX_PRECISION + 1);
        assert!(matches!(
            result,
            Err(Error::InvalidPrecision { precision: 7, max: 6 })
        ));
    }

    /// Every operand must come back out of the codec as exactly one number.
    #[test]
    fn operands_survive_encoding_at_max_precision() {
        let mut path = BezPath::new();
        path.move_to((1234.0, 0.0));
        path.line_to((7.0, 5.0));
        path.line_to((-98765.4321, 3.0));
        let text = normalize(&path, 1000.0 / 1500.0, 0.0, MAX_PRECISION).unwrap();
        assert_eq!(text, "M822.666667 0L4.666667 3.333333-65843.6214 2");
        let operands = crate::codec::Tokens::new(&text)
            .filter(|token| matches!(token, Ok(crate::codec::PathToken::Number(_))))
            .count();
        assert_eq!(operands, 6);
    }

    #[test]
    fn huge_coordinates_are_rejected() {
        let mut path = BezPath::new();
        path.move_to((1.0e20, 0.0));
        let result = normalize(&path, 1.0, 0.0, MAX_PRECISION);
        assert!(matches!(result, Err(Error::OperandTooLong(text)) if text == "100000000000000000000"));
    }
}
