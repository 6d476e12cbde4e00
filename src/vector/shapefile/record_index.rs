/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 14/10/2026
Last Modified: 17/10/2026
License: MIT

Notes: The .shx file is the 100-byte header followed by one 8-byte entry
per record: the record's offset and content length in the .shp file, both
big-endian and both in 16-bit words.
*/
use super::header::{ShapefileHeader, HEADER_LENGTH};
use crate::error::{Result, ShapefileError};
use crate::io_utils::{read_i32, Endianness};
use std::io::{Read, Seek, SeekFrom};

const ENTRY_LENGTH: usize = 8;
/// The record number and content length that precede every .shp record.
pub const RECORD_HEADER_LENGTH: usize = 8;

/// Where a record lives in the main file. `length` includes the 8-byte
/// record header.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RecordLocation {
    pub offset: u64,
    pub length: usize,
}

pub struct RecordIndex<R: Read + Seek> {
    reader: R,
    num_records: usize,
}

impl<R: Read + Seek> RecordIndex<R> {
    /// Wraps an index file whose header has already been parsed.
    pub fn new(reader: R, header: &ShapefileHeader) -> Result<RecordIndex<R>> {
        Ok(RecordIndex {
            reader,
            num_records: record_count(header.file_length)?,
        })
    }

    pub fn len(&self) -> usize {
        self.num_records
    }

    pub fn is_empty(&self) -> bool {
        self.num_records == 0
    }

    /// Returns the offset and length of a record, numbered from zero.
    pub fn locate(&mut self, record: usize) -> Result<RecordLocation> {
        if record >= self.num_records {
            return Err(ShapefileError::invalid_argument(format!(
                "record {} is out of range; the index holds {} records",
                record, self.num_records
            )));
        }
        let mut entry = [0u8; ENTRY_LENGTH];
        self.reader
            .seek(SeekFrom::Start((HEADER_LENGTH + record * ENTRY_LENGTH) as u64))?;
        self.reader.read_exact(&mut entry).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ShapefileError::format(format!(
                    "index entry {} is past the end of the index file",
                    record
                ))
            } else {
                ShapefileError::Io(e)
            }
        })?;

        let offset_words = read_i32(&entry, 0, Endianness::BigEndian)?;
        let length_words = read_i32(&entry, 4, Endianness::BigEndian)?;
        if offset_words < 0 || (offset_words as usize) * 2 < HEADER_LENGTH {
            return Err(ShapefileError::field_mismatch(
                format!("offset of record {}", record),
                format!("at least {} words", HEADER_LENGTH / 2),
                offset_words,
            ));
        }
        if length_words < 0 {
            return Err(ShapefileError::field_mismatch(
                format!("content length of record {}", record),
                "a non-negative length",
                length_words,
            ));
        }

        let location = RecordLocation {
            offset: offset_words as u64 * 2,
            length: length_words as usize * 2 + RECORD_HEADER_LENGTH,
        };
        tracing::debug!(
            "record {} at byte {} ({} bytes)",
            record,
            location.offset,
            location.length
        );
        Ok(location)
    }
}

/// Number of records described by an index file of `file_length` words.
pub fn record_count(file_length: i32) -> Result<usize> {
    let header_words = (HEADER_LENGTH / 2) as i32;
    let entry_words = (ENTRY_LENGTH / 2) as i32;
    let table_words = file_length.saturating_sub(header_words);
    if table_words < 0 || table_words % entry_words != 0 {
        return Err(ShapefileError::field_mismatch(
            "index file length",
            format!("{} words plus a multiple of {}", header_words, entry_words),
            format!("{} words", file_length),
        ));
    }
    Ok((table_words / entry_words) as usize)
}
