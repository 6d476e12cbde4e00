/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 14/10/2026
Last Modified: 17/10/2026
License: MIT

Notes: The geometry cursor and the attribute cursor move together. Rows are
joined to records by position only, so shapes can only be read in order.
*/
use super::attributes::AttributeSource;
use super::geometry::{decode, ShapeType};
use super::record_index::{RecordIndex, RECORD_HEADER_LENGTH};
use super::shape::{AttributeRecord, Metadata, Shape};
use crate::error::{Result, ShapefileError};
use crate::io_utils::{read_i32, Endianness};
use std::io::{Read, Seek, SeekFrom};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StreamState {
    NotStarted,
    /// On the record with this zero-based index.
    Positioned(usize),
    Exhausted,
    /// A read failed; the stream can no longer be used.
    Failed,
}

/// Enumerates the shapes of a Shapefile in record order.
pub struct ShapeStream<'a, M, I, A>
where
    M: Read + Seek,
    I: Read + Seek,
    A: AttributeSource,
{
    main: &'a mut M,
    index: &'a mut RecordIndex<I>,
    attributes: &'a mut A,
    shape_type: ShapeType,
    raw_metadata_only: bool,
    field_names: Vec<String>,
    state: StreamState,
}

impl<'a, M, I, A> ShapeStream<'a, M, I, A>
where
    M: Read + Seek,
    I: Read + Seek,
    A: AttributeSource,
{
    /// Creates a stream positioned before the first record. The attribute
    /// source is rewound first.
    pub fn new(
        main: &'a mut M,
        index: &'a mut RecordIndex<I>,
        attributes: &'a mut A,
        shape_type: ShapeType,
        raw_metadata_only: bool,
    ) -> Result<ShapeStream<'a, M, I, A>> {
        attributes.reset()?;
        if attributes.num_records() != index.len() {
            tracing::warn!(
                "attribute table reports {} rows for {} records",
                attributes.num_records(),
                index.len()
            );
        }
        let field_names = attributes.field_names();
        Ok(ShapeStream {
            main,
            index,
            attributes,
            shape_type,
            raw_metadata_only,
            field_names,
            state: StreamState::NotStarted,
        })
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of records in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Moves both cursors to the next record. Returns false at the end.
    pub fn advance(&mut self) -> Result<bool> {
        let next = match self.state {
            StreamState::Failed => return Err(failed()),
            StreamState::Exhausted => return Ok(false),
            StreamState::NotStarted => 0,
            StreamState::Positioned(i) => i + 1,
        };
        if next >= self.index.len() {
            self.state = StreamState::Exhausted;
            return Ok(false);
        }
        match self.attributes.advance() {
            Ok(true) => {
                self.state = StreamState::Positioned(next);
                Ok(true)
            }
            Ok(false) => {
                self.state = StreamState::Failed;
                Err(ShapefileError::state(format!(
                    "attribute source exhausted before record {}",
                    next + 1
                )))
            }
            Err(e) => {
                self.state = StreamState::Failed;
                Err(e)
            }
        }
    }

    /// Reads and decodes the record the stream is positioned on.
    pub fn current(&mut self) -> Result<Shape> {
        let record = match self.state {
            StreamState::Positioned(i) => i,
            StreamState::NotStarted => {
                return Err(ShapefileError::state("advance must be called before current"))
            }
            StreamState::Exhausted => {
                return Err(ShapefileError::state("the stream is exhausted"))
            }
            StreamState::Failed => return Err(failed()),
        };
        self.read_shape(record).map_err(|e| {
            self.state = StreamState::Failed;
            e
        })
    }

    /// Rewinds both cursors to before the first record.
    pub fn reset(&mut self) -> Result<()> {
        if self.state == StreamState::Failed {
            return Err(failed());
        }
        if let Err(e) = self.attributes.reset() {
            self.state = StreamState::Failed;
            return Err(e);
        }
        self.state = StreamState::NotStarted;
        Ok(())
    }

    fn read_shape(&mut self, record: usize) -> Result<Shape> {
        let location = self.index.locate(record)?;
        let mut buffer = vec![0u8; location.length];
        self.main.seek(SeekFrom::Start(location.offset))?;
        self.main.read_exact(&mut buffer).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ShapefileError::format(format!(
                    "record {} ({} bytes at byte {}) extends past the end of the main file",
                    record + 1,
                    location.length,
                    location.offset
                ))
            } else {
                ShapefileError::Io(e)
            }
        })?;

        // The 8-byte record header is big-endian.
        let record_number = read_i32(&buffer, 0, Endianness::BigEndian)?;
        let content_words = read_i32(&buffer, 4, Endianness::BigEndian)?;
        let content_length = location.length - RECORD_HEADER_LENGTH;
        if content_words < 0 || content_words as usize * 2 != content_length {
            return Err(ShapefileError::field_mismatch(
                format!("content length of record {}", record + 1),
                format!("{} words, as in the index", content_length / 2),
                format!("{} words", content_words),
            ));
        }
        if content_length == 0 {
            return Err(ShapefileError::format(format!(
                "record {} has no content",
                record + 1
            )));
        }
        if record_number as i64 != record as i64 + 1 {
            tracing::warn!(
                "record {} is numbered {} in the main file",
                record + 1,
                record_number
            );
        }

        let row = self.attributes.current_row()?;
        let metadata = if self.raw_metadata_only {
            Metadata::Raw(row)
        } else {
            Metadata::Attributes(AttributeRecord::new(&self.field_names, &row))
        };

        let geometry = decode(self.shape_type, &buffer[RECORD_HEADER_LENGTH..])?;
        Ok(Shape {
            record_number: record + 1,
            metadata,
            geometry,
        })
    }
}

fn failed() -> ShapefileError {
    ShapefileError::state("the stream failed on an earlier record and cannot continue")
}

impl<'a, M, I, A> Iterator for ShapeStream<'a, M, I, A>
where
    M: Read + Seek,
    I: Read + Seek,
    A: AttributeSource,
{
    type Item = Result<Shape>;

    fn next(&mut self) -> Option<Result<Shape>> {
        if self.state == StreamState::Failed {
            return None;
        }
        match self.advance() {
            Ok(true) => Some(self.current()),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
