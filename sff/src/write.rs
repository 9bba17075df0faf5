//! Big-endian packing primitives.
//!
//! The container is built from five shapes:
//!
//! ```text
//! UTF8_STRING = uint16 (byte length) + utf-8 bytes
//! BYTE_SEQ    = uint16 (byte length) + raw bytes
//! ARRAY<T>    = uint16 (item count) + concatenated items
//! TABLE       = concatenated fields, no added length
//! intN        = fixed width, big-endian
//! ```
//!
//! Only 16 and 32-bit integers are written at this layer; 8-bit operands
//! only appear inside encoded paths.

use crate::validate::{Validate, ValidationReport};

/// A type that can be written out as part of a container.
pub trait FontWrite {
    /// Write our data into this [TableWriter].
    fn write_into(&self, writer: &mut TableWriter);
}

/// An object that accumulates the bytes of a serialized table.
///
/// The length-prefixed writers are only reachable through [`FontWrite`]
/// impls in this crate, which [`dump_table`] validates before writing.
#[derive(Debug, Default)]
pub struct TableWriter {
    data: Vec<u8>,
}

/// Attempt to serialize a table.
///
/// If a value does not fit its wire format, this will return an
/// Err([`ValidationReport`]), otherwise it will return the bytes encoding
/// the table.
pub fn dump_table<T: FontWrite + Validate>(table: &T) -> Result<Vec<u8>, ValidationReport> {
    table.validate()?;
    let mut writer = TableWriter::default();
    table.write_into(&mut writer);
    Ok(writer.into_data())
}

impl TableWriter {
    /// Write raw bytes into this table.
    ///
    /// The caller is responsible for ensuring bytes are in big-endian order.
    #[inline]
    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes)
    }

    /// Write a `UTF8_STRING`: the byte length, then the utf-8 bytes.
    pub(crate) fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Write a `BYTE_SEQ`: the byte length, then the bytes themselves.
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        self.write_slice(bytes);
    }

    /// Write an `ARRAY`: the item count, then each item.
    pub(crate) fn write_array<T: FontWrite>(&mut self, items: &[T]) {
        self.write_len(items.len());
        items.write_into(self);
    }

    /// Write the fields of a `TABLE`, in order.
    pub(crate) fn write_table(&mut self, fields: &[&dyn FontWrite]) {
        fields.iter().for_each(|field| field.write_into(self));
    }

    /// Length prefixes are checked by the validation pass, so an overflow
    /// here means a table skipped validation.
    fn write_len(&mut self, len: usize) {
        let len = u16::try_from(len)
            .unwrap_or_else(|_| panic!("length {len} exceeds uint16, table was not validated"));
        len.write_into(self);
    }

    /// The bytes written so far.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

macro_rules! write_be_bytes {
    ($ty:ty) => {
        impl FontWrite for $ty {
            #[inline]
            fn write_into(&self, writer: &mut TableWriter) {
                writer.write_slice(&self.to_be_bytes())
            }
        }
    };
}

//NOTE: no 8-bit or float impls; those only exist inside encoded paths
write_be_bytes!(u16);
write_be_bytes!(i16);
write_be_bytes!(u32);
write_be_bytes!(i32);

/// A table is written as the plain concatenation of its fields.
impl<T: FontWrite> FontWrite for [T] {
    fn write_into(&self, writer: &mut TableWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }
}

impl<T: FontWrite> FontWrite for Vec<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        self.as_slice().write_into(writer)
    }
}

impl FontWrite for str {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_string(self)
    }
}

impl FontWrite for String {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_string(self)
    }
}

impl<T: FontWrite + ?Sized> FontWrite for &T {
    fn write_into(&self, writer: &mut TableWriter) {
        (**self).write_into(writer)
    }
}
