/*
This file is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 10/04/2018
Last Modified: 17/10/2026
License: MIT

Notes: Record payloads are little-endian throughout. Every variable-length
payload is checked against the length implied by its NumParts/NumPoints
counts before any offset derived from them is trusted.
*/
use crate::error::{Result, ShapefileError};
use crate::io_utils::{read_i32, ByteOrderReader, Endianness};
use crate::structures::{BoundingBox, Point2D, PointM, PointZ, ValueRange};
use std::fmt;

/// Size of a bounding box (four doubles).
const BOX_LENGTH: usize = 32;
/// Size of one x,y pair.
const POINT_LENGTH: usize = 16;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

impl ShapeType {
    pub fn from_int(value: i32) -> Result<ShapeType> {
        match value {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            31 => Ok(ShapeType::MultiPatch),
            _ => Err(ShapefileError::field_mismatch(
                "shape type",
                "a known shape type code",
                value,
            )),
        }
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
            ShapeType::MultiPatch => ShapeType::MultiPatch,
        }
    }

    pub fn dimension(&self) -> ShapeTypeDimension {
        match self {
            ShapeType::Null
            | ShapeType::MultiPoint
            | ShapeType::Point
            | ShapeType::Polygon
            | ShapeType::PolyLine => ShapeTypeDimension::XY,
            ShapeType::MultiPointM
            | ShapeType::PointM
            | ShapeType::PolygonM
            | ShapeType::PolyLineM => ShapeTypeDimension::Measure,
            ShapeType::MultiPointZ
            | ShapeType::PointZ
            | ShapeType::PolygonZ
            | ShapeType::PolyLineZ
            | ShapeType::MultiPatch => ShapeTypeDimension::Z,
        }
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeTypeDimension {
    XY,
    Measure,
    Z,
}

impl Default for ShapeType {
    fn default() -> ShapeType {
        ShapeType::Null
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
            ShapeType::MultiPatch => "MultiPatch",
        };
        write!(f, "{}", printable)
    }
}

/// A Z or M block: its stored range and one value per point, aligned with
/// the point array across all parts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueArray {
    pub range: ValueRange,
    pub values: Vec<f64>,
}

/// PolyLine and Polygon payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PartGeometry {
    pub bounding_box: BoundingBox,
    pub parts: Vec<Vec<Point2D>>,
}

/// PolyLineM and PolygonM payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PartGeometryM {
    pub bounding_box: BoundingBox,
    pub parts: Vec<Vec<Point2D>>,
    pub m: ValueArray,
}

/// PolyLineZ and PolygonZ payload. Measures are optional in Z records.
#[derive(Clone, Debug, PartialEq)]
pub struct PartGeometryZ {
    pub bounding_box: BoundingBox,
    pub parts: Vec<Vec<Point2D>>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointGeometry {
    pub bounding_box: BoundingBox,
    pub points: Vec<Point2D>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointGeometryM {
    pub bounding_box: BoundingBox,
    pub points: Vec<Point2D>,
    pub m: ValueArray,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointGeometryZ {
    pub bounding_box: BoundingBox,
    pub points: Vec<Point2D>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatchType {
    TriangleStrip = 0,
    TriangleFan = 1,
    OuterRing = 2,
    InnerRing = 3,
    FirstRing = 4,
    Ring = 5,
}

impl PatchType {
    pub fn from_int(value: i32) -> Result<PatchType> {
        match value {
            0 => Ok(PatchType::TriangleStrip),
            1 => Ok(PatchType::TriangleFan),
            2 => Ok(PatchType::OuterRing),
            3 => Ok(PatchType::InnerRing),
            4 => Ok(PatchType::FirstRing),
            5 => Ok(PatchType::Ring),
            _ => Err(ShapefileError::field_mismatch(
                "multipatch part type",
                "a code between 0 and 5",
                value,
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub part_type: PatchType,
    pub points: Vec<Point2D>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPatchGeometry {
    pub bounding_box: BoundingBox,
    pub parts: Vec<Patch>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

/// A decoded record payload, one variant per shape type.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Null,
    Point(Point2D),
    PointM(PointM),
    PointZ(PointZ),
    PolyLine(PartGeometry),
    Polygon(PartGeometry),
    PolyLineM(PartGeometryM),
    PolygonM(PartGeometryM),
    PolyLineZ(PartGeometryZ),
    PolygonZ(PartGeometryZ),
    MultiPoint(MultiPointGeometry),
    MultiPointM(MultiPointGeometryM),
    MultiPointZ(MultiPointGeometryZ),
    MultiPatch(MultiPatchGeometry),
}

impl Geometry {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::Null => ShapeType::Null,
            Geometry::Point(_) => ShapeType::Point,
            Geometry::PointM(_) => ShapeType::PointM,
            Geometry::PointZ(_) => ShapeType::PointZ,
            Geometry::PolyLine(_) => ShapeType::PolyLine,
            Geometry::Polygon(_) => ShapeType::Polygon,
            Geometry::PolyLineM(_) => ShapeType::PolyLineM,
            Geometry::PolygonM(_) => ShapeType::PolygonM,
            Geometry::PolyLineZ(_) => ShapeType::PolyLineZ,
            Geometry::PolygonZ(_) => ShapeType::PolygonZ,
            Geometry::MultiPoint(_) => ShapeType::MultiPoint,
            Geometry::MultiPointM(_) => ShapeType::MultiPointM,
            Geometry::MultiPointZ(_) => ShapeType::MultiPointZ,
            Geometry::MultiPatch(_) => ShapeType::MultiPatch,
        }
    }

    /// The stored bounding box. Null and point records carry none.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Null | Geometry::Point(_) | Geometry::PointM(_) | Geometry::PointZ(_) => {
                None
            }
            Geometry::PolyLine(g) | Geometry::Polygon(g) => Some(g.bounding_box),
            Geometry::PolyLineM(g) | Geometry::PolygonM(g) => Some(g.bounding_box),
            Geometry::PolyLineZ(g) | Geometry::PolygonZ(g) => Some(g.bounding_box),
            Geometry::MultiPoint(g) => Some(g.bounding_box),
            Geometry::MultiPointM(g) => Some(g.bounding_box),
            Geometry::MultiPointZ(g) => Some(g.bounding_box),
            Geometry::MultiPatch(g) => Some(g.bounding_box),
        }
    }

    /// The parts of a PolyLine or Polygon record of any dimension.
    pub fn parts(&self) -> Option<&[Vec<Point2D>]> {
        match self {
            Geometry::PolyLine(g) | Geometry::Polygon(g) => Some(&g.parts),
            Geometry::PolyLineM(g) | Geometry::PolygonM(g) => Some(&g.parts),
            Geometry::PolyLineZ(g) | Geometry::PolygonZ(g) => Some(&g.parts),
            _ => None,
        }
    }

    /// All x,y coordinates of the record in storage order.
    pub fn points(&self) -> Vec<Point2D> {
        match self {
            Geometry::Null => vec![],
            Geometry::Point(p) => vec![*p],
            Geometry::PointM(p) => vec![p.to_point2d()],
            Geometry::PointZ(p) => vec![p.to_point2d()],
            Geometry::MultiPoint(g) => g.points.clone(),
            Geometry::MultiPointM(g) => g.points.clone(),
            Geometry::MultiPointZ(g) => g.points.clone(),
            Geometry::MultiPatch(g) => g.parts.iter().flat_map(|p| p.points.clone()).collect(),
            _ => self
                .parts()
                .map(|parts| parts.concat())
                .unwrap_or_default(),
        }
    }

    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Null => 0,
            Geometry::Point(_) | Geometry::PointM(_) | Geometry::PointZ(_) => 1,
            Geometry::MultiPoint(g) => g.points.len(),
            Geometry::MultiPointM(g) => g.points.len(),
            Geometry::MultiPointZ(g) => g.points.len(),
            Geometry::MultiPatch(g) => g.parts.iter().map(|p| p.points.len()).sum(),
            _ => self
                .parts()
                .map(|parts| parts.iter().map(|p| p.len()).sum())
                .unwrap_or(0),
        }
    }
}

/// Decodes one record payload (the record content without its 8-byte
/// record header). The shape type embedded at the start of the payload must
/// match `expected`; Null payloads are accepted for any expected type.
pub fn decode(expected: ShapeType, payload: &[u8]) -> Result<Geometry> {
    if payload.is_empty() {
        return Err(ShapefileError::invalid_argument("record payload is empty"));
    }
    // Reads past the end of a payload are malformed records, not bad arguments.
    decode_payload(expected, payload).map_err(|e| match e {
        ShapefileError::InvalidArgument { message } => ShapefileError::format(message),
        other => other,
    })
}

fn decode_payload(expected: ShapeType, payload: &[u8]) -> Result<Geometry> {
    if payload.len() < 4 {
        return Err(ShapefileError::field_mismatch(
            "record length",
            "at least 4 bytes",
            payload.len(),
        ));
    }
    let shape_type = ShapeType::from_int(read_i32(payload, 0, Endianness::LittleEndian)?)?;
    if shape_type != expected && shape_type != ShapeType::Null {
        return Err(ShapefileError::field_mismatch(
            "record shape type",
            expected,
            shape_type,
        ));
    }

    let mut bor = ByteOrderReader::new(payload, Endianness::LittleEndian);
    bor.seek(4);

    match shape_type {
        ShapeType::Null => {
            check_length(shape_type, bor.len(), 4)?;
            Ok(Geometry::Null)
        }

        ShapeType::Point => {
            check_length(shape_type, bor.len(), 4 + POINT_LENGTH)?;
            Ok(Geometry::Point(read_point(&mut bor)?))
        }

        ShapeType::PointM => {
            check_length(shape_type, bor.len(), 4 + POINT_LENGTH + 8)?;
            let p = read_point(&mut bor)?;
            Ok(Geometry::PointM(PointM::new(p.x, p.y, bor.read_f64()?)))
        }

        ShapeType::PointZ => {
            let without_m = 4 + POINT_LENGTH + 8;
            let contains_m = check_optional_m_length(shape_type, bor.len(), without_m, 8)?;
            let p = read_point(&mut bor)?;
            let z = bor.read_f64()?;
            let m = if contains_m { Some(bor.read_f64()?) } else { None };
            Ok(Geometry::PointZ(PointZ::new(p.x, p.y, z, m)))
        }

        ShapeType::PolyLine
        | ShapeType::Polygon
        | ShapeType::PolyLineM
        | ShapeType::PolygonM
        | ShapeType::PolyLineZ
        | ShapeType::PolygonZ => decode_part_geometry(shape_type, &mut bor),

        ShapeType::MultiPoint | ShapeType::MultiPointM | ShapeType::MultiPointZ => {
            decode_multipoint(shape_type, &mut bor)
        }

        ShapeType::MultiPatch => decode_multipatch(&mut bor),
    }
}

fn decode_part_geometry(shape_type: ShapeType, bor: &mut ByteOrderReader) -> Result<Geometry> {
    // Byte 4 Box, 36 NumParts, 40 NumPoints, 44 Parts, then Points.
    let bounding_box = read_bounding_box(bor)?;
    let num_parts = read_count(bor, "NumParts")?;
    let num_points = read_count(bor, "NumPoints")?;

    let base_length = (4 + BOX_LENGTH + 8)
        .checked_add(num_parts.saturating_mul(4))
        .and_then(|l| l.checked_add(num_points.saturating_mul(POINT_LENGTH)))
        .ok_or_else(|| ShapefileError::format("record counts overflow"))?;
    let (has_z, has_m) = check_trailer_length(shape_type, bor.len(), base_length, num_points)?;

    let starts = read_part_starts(bor, num_parts, num_points)?;
    let points = read_points(bor, num_points)?;
    let parts = split_parts(&starts, points);

    let z = if has_z { Some(read_value_array(bor, num_points)?) } else { None };
    let m = if has_m { Some(read_value_array(bor, num_points)?) } else { None };

    Ok(match (shape_type, z, m) {
        (ShapeType::PolyLine, _, _) => Geometry::PolyLine(PartGeometry { bounding_box, parts }),
        (ShapeType::Polygon, _, _) => Geometry::Polygon(PartGeometry { bounding_box, parts }),
        (ShapeType::PolyLineM, _, Some(m)) => Geometry::PolyLineM(PartGeometryM {
            bounding_box,
            parts,
            m,
        }),
        (ShapeType::PolygonM, _, Some(m)) => Geometry::PolygonM(PartGeometryM {
            bounding_box,
            parts,
            m,
        }),
        (ShapeType::PolyLineZ, Some(z), m) => Geometry::PolyLineZ(PartGeometryZ {
            bounding_box,
            parts,
            z,
            m,
        }),
        (ShapeType::PolygonZ, Some(z), m) => Geometry::PolygonZ(PartGeometryZ {
            bounding_box,
            parts,
            z,
            m,
        }),
        _ => {
            return Err(ShapefileError::format(format!(
                "{} is not a multi-part shape type",
                shape_type
            )))
        }
    })
}

fn decode_multipoint(shape_type: ShapeType, bor: &mut ByteOrderReader) -> Result<Geometry> {
    // Byte 4 Box, 36 NumPoints, 40 Points.
    let bounding_box = read_bounding_box(bor)?;
    let num_points = read_count(bor, "NumPoints")?;

    let base_length = (4 + BOX_LENGTH + 4)
        .checked_add(num_points.saturating_mul(POINT_LENGTH))
        .ok_or_else(|| ShapefileError::format("record counts overflow"))?;
    let (has_z, has_m) = check_trailer_length(shape_type, bor.len(), base_length, num_points)?;

    let points = read_points(bor, num_points)?;
    let z = if has_z { Some(read_value_array(bor, num_points)?) } else { None };
    let m = if has_m { Some(read_value_array(bor, num_points)?) } else { None };

    Ok(match (shape_type, z, m) {
        (ShapeType::MultiPoint, _, _) => Geometry::MultiPoint(MultiPointGeometry {
            bounding_box,
            points,
        }),
        (ShapeType::MultiPointM, _, Some(m)) => Geometry::MultiPointM(MultiPointGeometryM {
            bounding_box,
            points,
            m,
        }),
        (ShapeType::MultiPointZ, Some(z), m) => Geometry::MultiPointZ(MultiPointGeometryZ {
            bounding_box,
            points,
            z,
            m,
        }),
        _ => {
            return Err(ShapefileError::format(format!(
                "{} is not a multipoint shape type",
                shape_type
            )))
        }
    })
}

fn decode_multipatch(bor: &mut ByteOrderReader) -> Result<Geometry> {
    // Byte 4 Box, 36 NumParts, 40 NumPoints, 44 Parts, then PartTypes, Points, Z, M.
    let bounding_box = read_bounding_box(bor)?;
    let num_parts = read_count(bor, "NumParts")?;
    let num_points = read_count(bor, "NumPoints")?;

    let base_length = (4 + BOX_LENGTH + 8)
        .checked_add(num_parts.saturating_mul(8))
        .and_then(|l| l.checked_add(num_points.saturating_mul(POINT_LENGTH)))
        .ok_or_else(|| ShapefileError::format("record counts overflow"))?;
    let (_, has_m) =
        check_trailer_length(ShapeType::MultiPatch, bor.len(), base_length, num_points)?;

    let starts = read_part_starts(bor, num_parts, num_points)?;
    let mut part_types = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        part_types.push(PatchType::from_int(bor.read_i32()?)?);
    }
    let points = read_points(bor, num_points)?;
    let parts = split_parts(&starts, points)
        .into_iter()
        .zip(part_types)
        .map(|(points, part_type)| Patch { part_type, points })
        .collect();

    let z = read_value_array(bor, num_points)?;
    let m = if has_m { Some(read_value_array(bor, num_points)?) } else { None };

    Ok(Geometry::MultiPatch(MultiPatchGeometry {
        bounding_box,
        parts,
        z,
        m,
    }))
}

fn check_length(shape_type: ShapeType, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(ShapefileError::field_mismatch(
            format!("{} record length", shape_type),
            format!("{} bytes", expected),
            format!("{} bytes", actual),
        ));
    }
    Ok(())
}

/// Returns true when the trailing measure is present.
fn check_optional_m_length(
    shape_type: ShapeType,
    actual: usize,
    without_m: usize,
    m_length: usize,
) -> Result<bool> {
    if actual == without_m {
        return Ok(false);
    }
    if actual == without_m + m_length {
        return Ok(true);
    }
    Err(ShapefileError::field_mismatch(
        format!("{} record length", shape_type),
        format!("{} or {} bytes", without_m, without_m + m_length),
        format!("{} bytes", actual),
    ))
}

/// Validates the payload length against the Z/M blocks the shape type carries
/// and returns which blocks follow the point array.
fn check_trailer_length(
    shape_type: ShapeType,
    actual: usize,
    base_length: usize,
    num_points: usize,
) -> Result<(bool, bool)> {
    // range pair plus one double per point
    let block = num_points
        .checked_mul(8)
        .and_then(|l| l.checked_add(16))
        .ok_or_else(|| ShapefileError::format("record counts overflow"))?;
    match shape_type.dimension() {
        ShapeTypeDimension::XY => {
            check_length(shape_type, actual, base_length)?;
            Ok((false, false))
        }
        ShapeTypeDimension::Measure => {
            check_length(shape_type, actual, base_length.saturating_add(block))?;
            Ok((false, true))
        }
        ShapeTypeDimension::Z => {
            let without_m = base_length.saturating_add(block);
            let contains_m = check_optional_m_length(shape_type, actual, without_m, block)?;
            Ok((true, contains_m))
        }
    }
}

fn read_count(bor: &mut ByteOrderReader, field: &str) -> Result<usize> {
    let value = bor.read_i32()?;
    if value < 0 {
        return Err(ShapefileError::field_mismatch(
            field,
            "a non-negative count",
            value,
        ));
    }
    Ok(value as usize)
}

fn read_bounding_box(bor: &mut ByteOrderReader) -> Result<BoundingBox> {
    let x_min = bor.read_f64()?;
    let y_min = bor.read_f64()?;
    let x_max = bor.read_f64()?;
    let y_max = bor.read_f64()?;
    Ok(BoundingBox::new(x_min, x_max, y_min, y_max))
}

fn read_point(bor: &mut ByteOrderReader) -> Result<Point2D> {
    Ok(Point2D {
        x: bor.read_f64()?,
        y: bor.read_f64()?,
    })
}

fn read_points(bor: &mut ByteOrderReader, num_points: usize) -> Result<Vec<Point2D>> {
    let mut points = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        points.push(read_point(bor)?);
    }
    Ok(points)
}

fn read_value_array(bor: &mut ByteOrderReader, num_points: usize) -> Result<ValueArray> {
    let min = bor.read_f64()?;
    let max = bor.read_f64()?;
    Ok(ValueArray {
        range: ValueRange::new(min, max),
        values: bor.read_f64_array(num_points)?,
    })
}

/// Reads the part-start indices. They must begin at zero and never decrease
/// or pass the end of the point array, so every derived part count is
/// non-negative.
fn read_part_starts(
    bor: &mut ByteOrderReader,
    num_parts: usize,
    num_points: usize,
) -> Result<Vec<usize>> {
    if num_parts == 0 && num_points > 0 {
        return Err(ShapefileError::field_mismatch(
            "NumParts",
            "at least one part for a record with points",
            num_parts,
        ));
    }
    let mut starts = Vec::with_capacity(num_parts);
    let mut previous = 0usize;
    for i in 0..num_parts {
        let start = bor.read_i32()?;
        if start < 0 || (start as usize) < previous || start as usize > num_points {
            return Err(ShapefileError::field_mismatch(
                format!("start index of part {}", i),
                format!("a value between {} and {}", previous, num_points),
                start,
            ));
        }
        if i == 0 && start != 0 {
            return Err(ShapefileError::field_mismatch("start index of part 0", 0, start));
        }
        previous = start as usize;
        starts.push(previous);
    }
    Ok(starts)
}

/// Splits the shared point array at the part starts. Each part runs to the
/// next part's start; the last part runs to the end of the point array.
fn split_parts(starts: &[usize], points: Vec<Point2D>) -> Vec<Vec<Point2D>> {
    let mut parts = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = if i + 1 < starts.len() {
            starts[i + 1]
        } else {
            points.len()
        };
        parts.push(points[start..end].to_vec());
    }
    parts
}
