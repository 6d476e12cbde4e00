/*
This file is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 10/04/2018
Last Modified: 17/10/2026
License: MIT

NOTE: Structures and functions for handling the Shapefile attribute table info
contained with the associated .dbf file. Rows are joined to geometries by
position, so every source is a forward cursor that can be rewound.
*/
use crate::error::{Result, ShapefileError};
use crate::io_utils::{ByteOrderReader, Endianness};
use chrono::NaiveDate;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

/// An ordered, position-synchronized cursor over attribute rows.
pub trait AttributeSource {
    /// Column names, in the order values are returned.
    fn field_names(&self) -> Vec<String>;

    /// Number of rows the source reports.
    fn num_records(&self) -> usize;

    /// Moves to the next row. Returns false once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// The values of the current row, in column order.
    fn current_row(&self) -> Result<Vec<FieldData>>;

    /// Rewinds so the next `advance` lands on the first row.
    fn reset(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i32),
    Int64(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldData::Int(v) => write!(f, "{}", v),
            FieldData::Int64(v) => write!(f, "{}", v),
            FieldData::Real(v) => write!(f, "{}", v),
            FieldData::Text(v) => write!(f, "{}", v),
            FieldData::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            FieldData::Bool(v) => write!(f, "{}", v),
            FieldData::Null => Ok(()),
        }
    }
}

/// Rows held in memory, for callers that join their own table.
#[derive(Debug, Default, Clone)]
pub struct MemoryAttributes {
    names: Vec<String>,
    rows: Vec<Vec<FieldData>>,
    position: Option<usize>,
}

impl MemoryAttributes {
    pub fn new(names: Vec<String>, rows: Vec<Vec<FieldData>>) -> Result<MemoryAttributes> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(ShapefileError::invalid_argument(format!(
                    "row {} has {} values for {} fields",
                    i,
                    row.len(),
                    names.len()
                )));
            }
        }
        Ok(MemoryAttributes {
            names,
            rows,
            position: None,
        })
    }
}

impl AttributeSource for MemoryAttributes {
    fn field_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn num_records(&self) -> usize {
        self.rows.len()
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next >= self.rows.len() {
            self.position = Some(self.rows.len());
            return Ok(false);
        }
        self.position = Some(next);
        Ok(true)
    }

    fn current_row(&self) -> Result<Vec<FieldData>> {
        match self.position {
            Some(p) if p < self.rows.len() => Ok(self.rows[p].clone()),
            _ => Err(ShapefileError::state("attribute cursor is not on a row")),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.position = None;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeHeader {
    pub version: u8,
    pub last_update: Option<NaiveDate>,
    pub num_records: u32,
    pub num_fields: u32, // not actually stored in file but derived
    pub bytes_in_header: u16,
    pub bytes_in_record: u16,
    pub incomplete_transaction: u8,
    pub encryption_flag: u8,
    pub mdx_flag: u8,
    pub language_driver_id: u8,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: char,
    pub field_length: u8,
    pub decimal_count: u8,
}

impl AttributeField {
    pub fn new(
        name: &str,
        field_type: char,
        field_length: u8,
        decimal_count: u8,
    ) -> AttributeField {
        AttributeField {
            name: name.to_string(),
            field_type: field_type,
            field_length: field_length,
            decimal_count: decimal_count,
        }
    }

    /// Parses this field's slice of a record.
    pub fn parse_value(&self, raw: &[u8]) -> Result<FieldData> {
        let str_rep = String::from_utf8_lossy(raw)
            .replace(char::from(0), "")
            .trim()
            .to_string();
        if str_rep.replace(' ', "").replace('?', "").is_empty() {
            return Ok(FieldData::Null);
        }
        match self.field_type {
            'N' | 'F' | 'I' | 'O' => {
                if self.decimal_count == 0 {
                    if let Ok(v) = str_rep.parse::<i32>() {
                        return Ok(FieldData::Int(v));
                    }
                    if let Ok(v) = str_rep.parse::<i64>() {
                        return Ok(FieldData::Int64(v));
                    }
                }
                str_rep
                    .parse::<f64>()
                    .map(FieldData::Real)
                    .map_err(|_| self.bad_value("a number", &str_rep))
            }
            'D' => {
                if str_rep.chars().all(|c| c == '0') {
                    return Ok(FieldData::Null);
                }
                NaiveDate::parse_from_str(&str_rep, "%Y%m%d")
                    .map(FieldData::Date)
                    .map_err(|_| self.bad_value("a YYYYMMDD date", &str_rep))
            }
            'L' => match str_rep.chars().next() {
                Some('T') | Some('t') | Some('Y') | Some('y') => Ok(FieldData::Bool(true)),
                Some('F') | Some('f') | Some('N') | Some('n') => Ok(FieldData::Bool(false)),
                _ => Err(self.bad_value("a logical value", &str_rep)),
            },
            _ => {
                // treat it like a string
                Ok(FieldData::Text(str_rep))
            }
        }
    }

    fn bad_value(&self, expected: &str, actual: &str) -> ShapefileError {
        ShapefileError::field_mismatch(format!("attribute field {}", self.name), expected, actual)
    }
}

const DBASE_PREAMBLE_LENGTH: usize = 32;
const FIELD_DESCRIPTOR_LENGTH: usize = 32;
const FIELD_TERMINATOR: u8 = 0x0d;
const DELETED_FLAG: u8 = 0x2a;

/// A .dbf attribute table read one record at a time.
pub struct DbaseTable<R: Read + Seek> {
    reader: R,
    pub header: AttributeHeader,
    pub fields: Vec<AttributeField>,
    position: Option<usize>,
    current: Option<Vec<FieldData>>,
    current_deleted: bool,
}

impl<R: Read + Seek> DbaseTable<R> {
    pub fn new(mut reader: R) -> Result<DbaseTable<R>> {
        let mut preamble = vec![0u8; DBASE_PREAMBLE_LENGTH];
        reader.seek(SeekFrom::Start(0))?;
        reader
            .read_exact(&mut preamble)
            .map_err(|_| ShapefileError::format("dBase file does not contain a valid header"))?;
        let mut bor = ByteOrderReader::new(&preamble, Endianness::LittleEndian);

        let mut header = AttributeHeader {
            version: bor.read_u8()?,
            ..Default::default()
        };
        let year = 1900 + bor.read_u8()? as i32;
        let month = bor.read_u8()? as u32;
        let day = bor.read_u8()? as u32;
        header.last_update = NaiveDate::from_ymd_opt(year, month, day);
        header.num_records = bor.read_u32()?;
        header.bytes_in_header = bor.read_u16()?;
        header.bytes_in_record = bor.read_u16()?;
        // reserved bytes
        bor.inc_pos(2);
        header.incomplete_transaction = bor.read_u8()?;
        header.encryption_flag = bor.read_u8()?;
        // skip free record thread for LAN only, and the multi-user dBASE reserve
        bor.inc_pos(12);
        header.mdx_flag = bor.read_u8()?;
        header.language_driver_id = bor.read_u8()?;

        let header_length = header.bytes_in_header as usize;
        if header_length < DBASE_PREAMBLE_LENGTH + 1 {
            return Err(ShapefileError::field_mismatch(
                "dBase header length",
                format!("at least {} bytes", DBASE_PREAMBLE_LENGTH + 1),
                header_length,
            ));
        }
        let mut descriptors = vec![0u8; header_length - DBASE_PREAMBLE_LENGTH];
        reader
            .read_exact(&mut descriptors)
            .map_err(|_| ShapefileError::format("dBase field descriptors are truncated"))?;
        let fields = read_field_descriptors(&descriptors)?;

        let record_length: usize =
            1 + fields.iter().map(|f| f.field_length as usize).sum::<usize>();
        if record_length != header.bytes_in_record as usize {
            return Err(ShapefileError::field_mismatch(
                "dBase record length",
                format!("{} bytes", record_length),
                format!("{} bytes", header.bytes_in_record),
            ));
        }
        header.num_fields = fields.len() as u32;

        Ok(DbaseTable {
            reader,
            header,
            fields,
            position: None,
            current: None,
            current_deleted: false,
        })
    }

    pub fn get_field_num(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// True when the current record carries the deletion flag.
    pub fn is_current_deleted(&self) -> bool {
        self.current_deleted
    }

    fn read_record(&mut self, index: usize) -> Result<()> {
        let record_length = self.header.bytes_in_record as usize;
        let offset = self.header.bytes_in_header as u64 + (index * record_length) as u64;
        let mut buffer = vec![0u8; record_length];
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut buffer).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ShapefileError::format(format!(
                    "dBase record {} is past the end of the file",
                    index
                ))
            } else {
                ShapefileError::Io(e)
            }
        })?;

        self.current_deleted = buffer[0] == DELETED_FLAG;
        if self.current_deleted {
            tracing::warn!("dBase record {} is flagged as deleted", index);
        }
        let mut row = Vec::with_capacity(self.fields.len());
        let mut start = 1usize;
        for field in &self.fields {
            let end = start + field.field_length as usize;
            row.push(field.parse_value(&buffer[start..end])?);
            start = end;
        }
        self.current = Some(row);
        Ok(())
    }
}

fn read_field_descriptors(bytes: &[u8]) -> Result<Vec<AttributeField>> {
    let mut bor = ByteOrderReader::new(bytes, Endianness::LittleEndian);
    let mut fields = vec![];
    // Checks for end of field descriptor array (0x0d). Valid .dbf files
    // will have this flag.
    loop {
        let flag = bor.peek_u8().map_err(|_| {
            ShapefileError::format("dBase field descriptor array is not terminated")
        })?;
        if flag == FIELD_TERMINATOR {
            break;
        }
        if bor.pos() + FIELD_DESCRIPTOR_LENGTH > bor.len() {
            return Err(ShapefileError::format(
                "dBase field descriptor array is not terminated",
            ));
        }
        let start = bor.pos();
        let name = bor.read_utf8(11)?.replace(char::from(0), "");
        let field_type = char::from(bor.read_u8()?);
        bor.inc_pos(4);
        let field_length = bor.read_u8()?;
        let decimal_count = bor.read_u8()?;
        // work area id, set field flag, index field flag and reserved bytes
        bor.seek(start + FIELD_DESCRIPTOR_LENGTH);
        fields.push(AttributeField::new(
            name.trim(),
            field_type,
            field_length,
            decimal_count,
        ));
    }
    Ok(fields)
}

impl<R: Read + Seek> AttributeSource for DbaseTable<R> {
    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn num_records(&self) -> usize {
        self.header.num_records as usize
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.current = None;
        if next >= self.num_records() {
            self.position = Some(self.num_records());
            return Ok(false);
        }
        self.position = Some(next);
        self.read_record(next)?;
        Ok(true)
    }

    fn current_row(&self) -> Result<Vec<FieldData>> {
        self.current
            .clone()
            .ok_or_else(|| ShapefileError::state("attribute cursor is not on a row"))
    }

    fn reset(&mut self) -> Result<()> {
        self.position = None;
        self.current = None;
        self.current_deleted = false;
        Ok(())
    }
}
