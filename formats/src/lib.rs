//! # Conduit Formats
//!
//! Structural conversion between the payload formats the bus carries:
//! JSON (canonical in-transit form), XML, and CSV. XML↔CSV is composed
//! through JSON, so every supported pair shares one set of rules.
//!
//! Conversion is structural, not schema-aware: type information narrows to
//! strings on the CSV path by design.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
mod json_csv;
mod json_xml;

pub use error::{Error, Result};
pub use json_csv::{csv_to_json, json_to_csv};
pub use json_xml::{json_to_xml, xml_to_json};

use bus_core::FileFormat;

/// Convert `data` between two wire formats.
///
/// Identity when the formats are equal; any pair outside
/// {JSON, XML, CSV}² fails with [`Error::UnsupportedConversion`].
pub fn convert(data: &[u8], from: FileFormat, to: FileFormat) -> Result<Vec<u8>> {
    if from == to {
        return Ok(data.to_vec());
    }

    use FileFormat::{Csv, Json, Xml};
    match (from, to) {
        (Json, Xml) => json_to_xml(data),
        (Xml, Json) => xml_to_json(data),
        (Json, Csv) => json_to_csv(data),
        (Csv, Json) => csv_to_json(data),
        // Composed through JSON; errors at either stage propagate
        (Xml, Csv) => json_to_csv(&xml_to_json(data)?),
        (Csv, Xml) => json_to_xml(&csv_to_json(data)?),
        (from, to) => Err(Error::UnsupportedConversion { from, to }),
    }
}
