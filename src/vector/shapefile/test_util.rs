//! Builders for small .shp/.shx/.dbf files used by the tests.
use super::attributes::AttributeField;
use super::geometry::ShapeType;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs;
use std::path::{Path, PathBuf};

fn write_header(buf: &mut Vec<u8>, shape_type: ShapeType, bounds: [f64; 4], file_length: usize) {
    // magic number
    buf.write_i32::<BigEndian>(9994).unwrap();
    // unused header bytes
    for _ in 0..5 {
        buf.write_i32::<BigEndian>(0).unwrap();
    }
    buf.write_i32::<BigEndian>((file_length / 2) as i32).unwrap();
    buf.write_i32::<LittleEndian>(1000).unwrap();
    buf.write_i32::<LittleEndian>(shape_type.to_int()).unwrap();
    for v in bounds {
        buf.write_f64::<LittleEndian>(v).unwrap();
    }
    for _ in 0..4 {
        buf.write_f64::<LittleEndian>(0.0).unwrap();
    }
}

/// The main file: header, then each payload behind its record header.
pub fn main_bytes(shape_type: ShapeType, bounds: [f64; 4], payloads: &[Vec<u8>]) -> Vec<u8> {
    let size = 100 + payloads.iter().map(|p| 8 + p.len()).sum::<usize>();
    let mut buf = Vec::with_capacity(size);
    write_header(&mut buf, shape_type, bounds, size);
    for (i, payload) in payloads.iter().enumerate() {
        buf.write_i32::<BigEndian>(i as i32 + 1).unwrap(); // Record number
        // Content length in 16-bit words
        buf.write_i32::<BigEndian>((payload.len() / 2) as i32).unwrap();
        buf.extend_from_slice(payload);
    }
    buf
}

/// The index file matching `main_bytes` for the same payloads.
pub fn index_bytes(shape_type: ShapeType, bounds: [f64; 4], payloads: &[Vec<u8>]) -> Vec<u8> {
    let size = 100 + 8 * payloads.len();
    let mut buf = Vec::with_capacity(size);
    write_header(&mut buf, shape_type, bounds, size);
    let mut offset = 100usize;
    for payload in payloads {
        buf.write_i32::<BigEndian>((offset / 2) as i32).unwrap();
        buf.write_i32::<BigEndian>((payload.len() / 2) as i32).unwrap();
        offset += 8 + payload.len();
    }
    buf
}

pub fn point_payload(x: f64, y: f64) -> Vec<u8> {
    let mut buf = vec![];
    buf.write_i32::<LittleEndian>(ShapeType::Point.to_int()).unwrap();
    buf.write_f64::<LittleEndian>(x).unwrap();
    buf.write_f64::<LittleEndian>(y).unwrap();
    buf
}

/// A PolyLine or Polygon payload; the record box is computed from the points.
pub fn part_payload(shape_type: ShapeType, parts: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let points: Vec<(f64, f64)> = parts.concat();
    let mut bounds = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for (x, y) in &points {
        bounds[0] = bounds[0].min(*x);
        bounds[1] = bounds[1].min(*y);
        bounds[2] = bounds[2].max(*x);
        bounds[3] = bounds[3].max(*y);
    }
    let mut buf = vec![];
    buf.write_i32::<LittleEndian>(shape_type.to_int()).unwrap();
    for v in bounds {
        buf.write_f64::<LittleEndian>(v).unwrap();
    }
    buf.write_i32::<LittleEndian>(parts.len() as i32).unwrap();
    buf.write_i32::<LittleEndian>(points.len() as i32).unwrap();
    let mut start = 0;
    for part in parts {
        buf.write_i32::<LittleEndian>(start).unwrap();
        start += part.len() as i32;
    }
    for (x, y) in &points {
        buf.write_f64::<LittleEndian>(*x).unwrap();
        buf.write_f64::<LittleEndian>(*y).unwrap();
    }
    buf
}

/// A dBASE III table. Values are left-aligned and space padded.
pub fn dbase_bytes(fields: &[AttributeField], rows: &[Vec<&str>]) -> Vec<u8> {
    let bytes_in_header = 32 + 32 * fields.len() + 1;
    let bytes_in_record = 1 + fields.iter().map(|f| f.field_length as usize).sum::<usize>();
    let mut buf = vec![];
    buf.write_u8(3).unwrap(); // version
    buf.write_u8(119).unwrap(); // 2019
    buf.write_u8(6).unwrap();
    buf.write_u8(1).unwrap();
    buf.write_u32::<LittleEndian>(rows.len() as u32).unwrap();
    buf.write_u16::<LittleEndian>(bytes_in_header as u16).unwrap();
    buf.write_u16::<LittleEndian>(bytes_in_record as u16).unwrap();
    buf.extend_from_slice(&[0u8; 20]);
    for field in fields {
        let mut name = field.name.as_bytes().to_vec();
        name.resize(11, 0);
        buf.extend_from_slice(&name);
        buf.write_u8(field.field_type as u8).unwrap();
        buf.extend_from_slice(&[0u8; 4]);
        buf.write_u8(field.field_length).unwrap();
        buf.write_u8(field.decimal_count).unwrap();
        buf.extend_from_slice(&[0u8; 14]);
    }
    buf.write_u8(0x0d).unwrap();
    for row in rows {
        buf.write_u8(0x20).unwrap();
        for (field, value) in fields.iter().zip(row) {
            let mut bytes = value.as_bytes().to_vec();
            bytes.resize(field.field_length as usize, b' ');
            buf.extend_from_slice(&bytes);
        }
    }
    buf.write_u8(0x1a).unwrap();
    buf
}

/// Writes `<name>.shp`, `<name>.shx` and `<name>.dbf` into `dir` and
/// returns the path of the .shp file.
pub fn write_shapefile(
    dir: &Path,
    name: &str,
    shape_type: ShapeType,
    bounds: [f64; 4],
    payloads: &[Vec<u8>],
    fields: &[AttributeField],
    rows: &[Vec<&str>],
) -> PathBuf {
    let shp = dir.join(format!("{}.shp", name));
    fs::write(&shp, main_bytes(shape_type, bounds, payloads)).unwrap();
    fs::write(shp.with_extension("shx"), index_bytes(shape_type, bounds, payloads)).unwrap();
    fs::write(shp.with_extension("dbf"), dbase_bytes(fields, rows)).unwrap();
    shp
}
