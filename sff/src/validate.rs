//! The pre-packing validation pass

use std::fmt::Display;

/// Pre-packing validation of tables.
///
/// Every field in the container has a fixed wire format (a `uint16` code
/// point, a string whose byte length fits in a `uint16`, and so on). The
/// in-memory types are wider than that, so before anything is written we
/// check that each value fits the format it will be packed with.
pub trait Validate {
    /// Ensure that this table is well-formed, reporting any errors.
    fn validate(&self) -> Result<(), ValidationReport> {
        let mut ctx = Default::default();
        self.validate_impl(&mut ctx);
        if ctx.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport { errors: ctx.errors })
        }
    }

    /// Validate this table.
    ///
    /// An implementation should look something like:
    ///
    /// ```rust
    /// # use sff::validate::{Validate, ValidationCtx};
    /// struct MyRecord {
    ///     my_values: Vec<u16>,
    /// }
    ///
    /// impl Validate for MyRecord {
    ///     fn validate_impl(&self, ctx: &mut ValidationCtx) {
    ///         ctx.in_table("MyRecord", |ctx| {
    ///             ctx.in_field("my_values", |ctx| {
    ///                 ctx.check_u16_len(self.my_values.len());
    ///             })
    ///         })
    ///     }
    /// }
    /// ```
    fn validate_impl(&self, ctx: &mut ValidationCtx);
}

/// A context for collecting validation errors.
///
/// This tracks the position in the container at which a given error is
/// reported, via calls to [in_table][Self::in_table],
/// [in_field][Self::in_field] and [in_array][Self::in_array].
#[derive(Clone, Debug, Default)]
pub struct ValidationCtx {
    cur_location: Vec<LocationElem>,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
struct ValidationError {
    error: String,
    location: Vec<LocationElem>,
}

/// One or more validation errors.
#[derive(Debug)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
enum LocationElem {
    Table(&'static str),
    Field(&'static str),
    Index(usize),
}

impl ValidationCtx {
    /// Run the provided closure in the context of a new table.
    pub fn in_table(&mut self, name: &'static str, f: impl FnOnce(&mut ValidationCtx)) {
        self.with_elem(LocationElem::Table(name), f);
    }

    /// Run the provided closure in the context of a new field.
    pub fn in_field(&mut self, name: &'static str, f: impl FnOnce(&mut ValidationCtx)) {
        self.with_elem(LocationElem::Field(name), f);
    }

    /// Validate each item of an array, reporting errors with their index.
    pub fn in_array<T>(&mut self, items: &[T], mut f: impl FnMut(&mut ValidationCtx, &T)) {
        self.check_u16_len(items.len());
        for (i, item) in items.iter().enumerate() {
            self.with_elem(LocationElem::Index(i), |ctx| f(ctx, item));
        }
    }

    /// Report a new error, associating it with the current path.
    pub fn report(&mut self, msg: impl Display) {
        self.errors.push(ValidationError {
            location: self.cur_location.clone(),
            error: msg.to_string(),
        });
    }

    /// Check that a length or count can be written as a `uint16` prefix.
    pub fn check_u16_len(&mut self, len: usize) {
        if len > u16::MAX as usize {
            self.report(format_args!("length {len} does not fit in uint16"));
        }
    }

    /// Check that a value can be written as a `uint16`.
    pub fn check_u16(&mut self, value: impl Into<i64>) {
        let value = value.into();
        if u16::try_from(value).is_err() {
            self.report(format_args!("value {value} does not fit in uint16"));
        }
    }

    /// Check that a value can be written as an `int16`.
    pub fn check_i16(&mut self, value: impl Into<i64>) {
        let value = value.into();
        if i16::try_from(value).is_err() {
            self.report(format_args!("value {value} does not fit in int16"));
        }
    }

    fn with_elem(&mut self, elem: LocationElem, f: impl FnOnce(&mut ValidationCtx)) {
        self.cur_location.push(elem);
        f(self);
        self.cur_location.pop();
    }
}

impl ValidationReport {
    /// The number of errors in this report.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Written as the location, e.g. `Container.glyphs[3].GlyphRecord.code_points[0]`,
/// then the message.
impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, elem) in self.location.iter().enumerate() {
            match elem {
                LocationElem::Table(name) | LocationElem::Field(name) if i == 0 => {
                    f.write_str(name)
                }
                LocationElem::Table(name) | LocationElem::Field(name) => write!(f, ".{name}"),
                LocationElem::Index(idx) => write!(f, "[{idx}]"),
            }?;
        }
        write!(f, ": {}", self.error)
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_array(self, |ctx, item| item.validate_impl(ctx));
    }
}
