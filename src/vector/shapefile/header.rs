/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 21/06/2017
Last Modified: 17/10/2026
License: MIT
*/
use super::geometry::{ShapeType, ShapeTypeDimension};
use crate::error::{Result, ShapefileError};
use crate::io_utils::{ByteOrderReader, Endianness};
use crate::structures::{BoundingBox, ValueRange};
use std::fmt;

/// Length of the header shared by the main and index files, in bytes.
pub const HEADER_LENGTH: usize = 100;
pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;

/// The 100-byte header of a .shp or .shx file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShapefileHeader {
    pub file_code: i32,        // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian; in 16-bit words, including the header
    pub version: i32,          // LittleEndian; value is 1000
    pub shape_type: ShapeType, // LittleEndian
    pub bounding_box: BoundingBox,
    pub z_range: ValueRange, // 0f64 if the shape type carries no z
    pub m_range: ValueRange, // 0f64 if the shape type carries no measures
}

impl ShapefileHeader {
    pub fn parse(bytes: &[u8]) -> Result<ShapefileHeader> {
        if bytes.is_empty() {
            return Err(ShapefileError::invalid_argument("header bytes are empty"));
        }
        if bytes.len() < HEADER_LENGTH {
            return Err(ShapefileError::field_mismatch(
                "header length",
                format!("{} bytes", HEADER_LENGTH),
                format!("{} bytes", bytes.len()),
            ));
        }

        // Note: the header uses mixed endianness. The file code and length
        // are big-endian, everything from the version onwards is little-endian.
        let mut bor = ByteOrderReader::new(&bytes[..HEADER_LENGTH], Endianness::BigEndian);
        let file_code = bor.read_i32()?;
        if file_code != FILE_CODE {
            return Err(ShapefileError::field_mismatch("file code", FILE_CODE, file_code));
        }
        bor.seek(24);
        let file_length = bor.read_i32()?;

        bor.set_byte_order(Endianness::LittleEndian);
        let version = bor.read_i32()?;
        if version != VERSION {
            return Err(ShapefileError::field_mismatch("version", VERSION, version));
        }
        let shape_type = ShapeType::from_int(bor.read_i32()?)?;

        let x_min = bor.read_f64()?;
        let y_min = bor.read_f64()?;
        let x_max = bor.read_f64()?;
        let y_max = bor.read_f64()?;
        let mut z_range = ValueRange::new(bor.read_f64()?, bor.read_f64()?);
        let mut m_range = ValueRange::new(bor.read_f64()?, bor.read_f64()?);
        match shape_type.dimension() {
            ShapeTypeDimension::XY => {
                z_range = ValueRange::default();
                m_range = ValueRange::default();
            }
            ShapeTypeDimension::Measure => z_range = ValueRange::default(),
            ShapeTypeDimension::Z => {}
        }

        Ok(ShapefileHeader {
            file_code,
            file_length,
            version,
            shape_type,
            bounding_box: BoundingBox::new(x_min, x_max, y_min, y_max),
            z_range,
            m_range,
        })
    }

    /// The declared file length in bytes.
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length.max(0) as u64 * 2
    }
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = format!(
            "file_code: {}
file_length: {}
version: {}
shape_type: {}
x_min: {}
x_max: {}
y_min: {}
y_max: {}
z_min: {}
z_max: {}
m_min: {}
m_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.bounding_box.min_x,
            self.bounding_box.max_x,
            self.bounding_box.min_y,
            self.bounding_box.max_y,
            self.z_range.min,
            self.z_range.max,
            self.m_range.min,
            self.m_range.max
        );
        write!(f, "{}", s)
    }
}
