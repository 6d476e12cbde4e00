/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 21/06/2017
Last Modified: 17/10/2026
License: MIT

Notes: The logic behind working with the ESRI Shapefile format. A Shapefile
is read lazily: opening parses the .shp and .shx headers, and shapes are
decoded one record at a time as a ShapeStream is advanced.
*/

pub mod attributes;
pub mod config;
pub mod geometry;
pub mod header;
pub mod record_index;
pub mod shape;
pub mod shape_stream;
#[cfg(test)]
mod test_util;

pub use self::attributes::{
    AttributeField, AttributeHeader, AttributeSource, DbaseTable, FieldData, MemoryAttributes,
};
pub use self::config::ShapefileConfig;
pub use self::geometry::{
    decode, Geometry, MultiPatchGeometry, MultiPointGeometry, MultiPointGeometryM,
    MultiPointGeometryZ, PartGeometry, PartGeometryM, PartGeometryZ, Patch, PatchType, ShapeType,
    ShapeTypeDimension, ValueArray,
};
pub use self::header::ShapefileHeader;
pub use self::record_index::{RecordIndex, RecordLocation};
pub use self::shape::{AttributeRecord, Metadata, Shape};
pub use self::shape_stream::{ShapeStream, StreamState};

use self::header::HEADER_LENGTH;
use crate::error::{Result, ShapefileError};
use crate::structures::BoundingBox;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

const MAIN_EXTENSION: &str = "shp";
const INDEX_EXTENSION: &str = "shx";
const DBASE_EXTENSION: &str = "dbf";

pub type FileReader = BufReader<File>;

struct OpenFiles<A: AttributeSource> {
    main: FileReader,
    index: RecordIndex<FileReader>,
    attributes: A,
    main_header: ShapefileHeader,
    index_header: ShapefileHeader,
}

/// `Shapefile` is an opened ESRI Shapefile: the .shp and .shx files plus an
/// attribute source, by default the companion .dbf table.
///
/// Examples:
///
/// ```no_run
/// use shapefile_reader::vector::{Shapefile, ShapefileConfig};
///
/// let mut input = Shapefile::open("rivers.shp", ShapefileConfig::default())?;
/// println!("{} {} records", input.shape_type()?, input.count()?);
/// for shape in input.shapes()? {
///     let shape = shape?;
///     println!("{}: {:?}", shape.record_number, shape.get_metadata("name"));
/// }
/// input.close();
/// # Ok::<(), shapefile_reader::ShapefileError>(())
/// ```
pub struct Shapefile<A: AttributeSource = DbaseTable<FileReader>> {
    main_path: PathBuf,
    index_path: PathBuf,
    config: ShapefileConfig,
    files: Option<OpenFiles<A>>,
}

impl Shapefile<DbaseTable<FileReader>> {
    /// Opens a Shapefile. `path` may name the .shp, .shx or .dbf file; the
    /// other two are found by swapping the extension.
    pub fn open<P: AsRef<Path>>(path: P, config: ShapefileConfig) -> Result<Self> {
        let path = checked_path(path.as_ref())?;
        let dbase_path = path.with_extension(DBASE_EXTENSION);
        let main_path = require(path.with_extension(MAIN_EXTENSION), "Shapefile main file")?;
        let index_path = require(path.with_extension(INDEX_EXTENSION), "Shapefile index file")?;
        let dbase_path = require(dbase_path, "Shapefile dBase file")?;

        let attributes = DbaseTable::new(BufReader::new(File::open(&dbase_path)?))?;
        Shapefile::open_files(main_path, index_path, attributes, config)
    }
}

impl<A: AttributeSource> Shapefile<A> {
    /// Opens the .shp and .shx files named by `path`, joining records to the
    /// rows of `attributes` instead of a .dbf table.
    pub fn open_with_attributes<P: AsRef<Path>>(
        path: P,
        attributes: A,
        config: ShapefileConfig,
    ) -> Result<Self> {
        let path = checked_path(path.as_ref())?;
        let main_path = require(path.with_extension(MAIN_EXTENSION), "Shapefile main file")?;
        let index_path = require(path.with_extension(INDEX_EXTENSION), "Shapefile index file")?;
        Shapefile::open_files(main_path, index_path, attributes, config)
    }

    fn open_files(
        main_path: PathBuf,
        index_path: PathBuf,
        attributes: A,
        config: ShapefileConfig,
    ) -> Result<Self> {
        // Every handle is a local until the end, so any early return closes
        // the files already opened.
        let mut main = BufReader::new(File::open(&main_path)?);
        let mut index_reader = BufReader::new(File::open(&index_path)?);
        let main_header = read_header(&mut main, "main", config.strict_file_length)?;
        let index_header = read_header(&mut index_reader, "index", config.strict_file_length)?;
        if main_header.shape_type != index_header.shape_type {
            return Err(ShapefileError::field_mismatch(
                "index file shape type",
                main_header.shape_type,
                index_header.shape_type,
            ));
        }
        let index = RecordIndex::new(index_reader, &index_header)?;

        if config.verbose_mode {
            tracing::info!(
                "opened {}: {} with {} records",
                main_path.display(),
                main_header.shape_type,
                index.len()
            );
        }

        Ok(Shapefile {
            main_path,
            index_path,
            config,
            files: Some(OpenFiles {
                main,
                index,
                attributes,
                main_header,
                index_header,
            }),
        })
    }

    fn files(&self) -> Result<&OpenFiles<A>> {
        self.files
            .as_ref()
            .ok_or_else(|| ShapefileError::state("Shapefile is closed"))
    }

    pub fn is_open(&self) -> bool {
        self.files.is_some()
    }

    pub fn shape_type(&self) -> Result<ShapeType> {
        Ok(self.files()?.main_header.shape_type)
    }

    /// The bounding box of the whole collection, from the main file header.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        Ok(self.files()?.main_header.bounding_box)
    }

    /// Number of records, derived from the index file length.
    pub fn count(&self) -> Result<usize> {
        Ok(self.files()?.index.len())
    }

    pub fn main_header(&self) -> Result<&ShapefileHeader> {
        Ok(&self.files()?.main_header)
    }

    pub fn index_header(&self) -> Result<&ShapefileHeader> {
        Ok(&self.files()?.index_header)
    }

    pub fn field_names(&self) -> Result<Vec<String>> {
        Ok(self.files()?.attributes.field_names())
    }

    pub fn config(&self) -> &ShapefileConfig {
        &self.config
    }

    pub fn main_path(&self) -> &Path {
        &self.main_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Returns the filename, in shortened form (e.g. file.shp).
    pub fn get_short_filename(&self) -> String {
        self.main_path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Starts a pass over the shapes from the first record. Only one stream
    /// can be alive at a time.
    pub fn shapes(&mut self) -> Result<ShapeStream<'_, FileReader, FileReader, A>> {
        let raw_metadata_only = self.config.raw_metadata_only;
        let files = self
            .files
            .as_mut()
            .ok_or_else(|| ShapefileError::state("Shapefile is closed"))?;
        ShapeStream::new(
            &mut files.main,
            &mut files.index,
            &mut files.attributes,
            files.main_header.shape_type,
            raw_metadata_only,
        )
    }

    /// Releases the file handles. Closing twice does nothing.
    pub fn close(&mut self) {
        if self.files.take().is_some() {
            tracing::debug!("closed {}", self.main_path.display());
        }
    }
}

fn checked_path(path: &Path) -> Result<&Path> {
    if path.as_os_str().is_empty() {
        return Err(ShapefileError::invalid_argument("path is empty"));
    }
    Ok(path)
}

fn require(path: PathBuf, description: &str) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(ShapefileError::NotFound {
            description: description.to_string(),
            path,
        });
    }
    Ok(path)
}

fn read_header(
    reader: &mut FileReader,
    which: &str,
    strict_file_length: bool,
) -> Result<ShapefileHeader> {
    let file_size = reader.get_ref().metadata()?.len();
    if file_size < HEADER_LENGTH as u64 {
        return Err(ShapefileError::format(format!(
            "Shapefile {} file does not contain a valid header",
            which
        )));
    }
    let mut bytes = vec![0u8; HEADER_LENGTH];
    reader.read_exact(&mut bytes)?;
    let header = ShapefileHeader::parse(&bytes)?;
    if strict_file_length && header.file_length_bytes() > file_size {
        return Err(ShapefileError::field_mismatch(
            format!("{} file length", which),
            format!("at most {} bytes", file_size),
            format!("{} bytes", header.file_length_bytes()),
        ));
    }
    Ok(header)
}

#[cfg(test)]
mod test {
    use super::test_util::{part_payload, point_payload, write_shapefile};
    use super::*;
    use crate::structures::Point2D;
    use tempfile::tempdir;

    fn attribute_fields() -> Vec<AttributeField> {
        vec![
            AttributeField::new("name_0", 'C', 16, 0),
            AttributeField::new("id_0", 'N', 6, 0),
            AttributeField::new("iso", 'C', 3, 0),
            AttributeField::new("f_code", 'C', 5, 0),
            AttributeField::new("length", 'N', 12, 4),
        ]
    }

    fn line(start: (f64, f64), n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| (start.0 + i as f64 * 0.01, start.1 + i as f64 * 0.005))
            .collect()
    }

    fn ring(start: (f64, f64), n: usize) -> Vec<(f64, f64)> {
        let mut points = line(start, n - 1);
        points.push(start);
        points
    }

    const LINE_BOUNDS: [f64; 4] = [
        -83.032531823292,
        7.23685458952989,
        -77.2360076059741,
        9.61545560060634,
    ];

    fn polyline_collection(dir: &Path) -> PathBuf {
        let mut payloads = vec![part_payload(
            ShapeType::PolyLine,
            &[line((-80.5127334422155, 8.22265632942063), 3)],
        )];
        let mut rows = vec![vec!["Panama", "173", "PAN", "BH140", "0.0213"]];
        for i in 1..757 {
            let x = -83.0 + (i % 50) as f64 * 0.1;
            let parts = if i % 7 == 0 {
                vec![line((x, 8.0), 4), line((x, 8.5), 2)]
            } else {
                vec![line((x, 8.0), 2 + i % 5)]
            };
            payloads.push(part_payload(ShapeType::PolyLine, &parts));
            rows.push(vec!["Panama", "173", "PAN", "BH140", "0.0100"]);
        }
        write_shapefile(
            dir,
            "PAN_water_lines_dcw",
            ShapeType::PolyLine,
            LINE_BOUNDS,
            &payloads,
            &attribute_fields(),
            &rows,
        )
    }

    fn polygon_collection(dir: &Path) -> PathBuf {
        let fields = vec![
            AttributeField::new("country", 'C', 16, 0),
            AttributeField::new("f_code", 'C', 5, 0),
            AttributeField::new("hyc", 'N', 4, 0),
            AttributeField::new("nam", 'C', 20, 0),
            AttributeField::new("area", 'N', 12, 4),
        ];
        let mut payloads = vec![];
        let mut rows = vec![];
        for i in 0..30 {
            let start = if i == 0 {
                (-78.0503086845797, 8.42391698232495)
            } else {
                (-82.0 + i as f64 * 0.1, 8.5)
            };
            payloads.push(part_payload(ShapeType::Polygon, &[ring(start, 29)]));
            rows.push(vec!["Panama", "BH000", "8", "LAGO", "1.5000"]);
        }
        write_shapefile(
            dir,
            "PAN_water_areas_dcw",
            ShapeType::Polygon,
            [
                -82.6906126889013,
                8.12419598204565,
                -78.0280536845589,
                9.51797198334384,
            ],
            &payloads,
            &fields,
            &rows,
        )
    }

    #[test]
    fn test_polyline_first_shape() {
        let dir = tempdir().unwrap();
        let path = polyline_collection(dir.path());
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        assert_eq!(shapefile.shape_type().unwrap(), ShapeType::PolyLine);
        assert_eq!(shapefile.count().unwrap(), 757);
        let bb = shapefile.bounding_box().unwrap();
        assert!((bb.left() - -83.032531823292).abs() < 0.001);
        assert!((bb.top() - 7.23685458952989).abs() < 0.001);
        assert!((bb.right() - -77.2360076059741).abs() < 0.001);
        assert!((bb.bottom() - 9.61545560060634).abs() < 0.001);

        let shape = shapefile.shapes().unwrap().next().unwrap().unwrap();
        assert_eq!(shape.shape_type(), ShapeType::PolyLine);
        assert_eq!(shape.record_number, 1);
        assert_eq!(shape.metadata_names().len(), 5);
        assert_eq!(shape.get_metadata("name_0"), Some("Panama"));
        let parts = shape.geometry.parts().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 3);
        assert!((parts[0][0].x - -80.5127334422155).abs() < 0.001);
        assert!((parts[0][0].y - 8.22265632942063).abs() < 0.001);
    }

    #[test]
    fn test_polyline_enumerates_every_record() {
        let dir = tempdir().unwrap();
        let path = polyline_collection(dir.path());
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        let mut expected_number = 1;
        for shape in shapefile.shapes().unwrap() {
            let shape = shape.unwrap();
            assert_eq!(shape.record_number, expected_number);
            if (expected_number - 1) % 7 == 0 && expected_number > 1 {
                assert_eq!(shape.geometry.parts().unwrap().len(), 2);
            }
            expected_number += 1;
        }
        assert_eq!(expected_number, 758);
    }

    #[test]
    fn test_polygon_first_shape() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        assert_eq!(shapefile.shape_type().unwrap(), ShapeType::Polygon);
        assert_eq!(shapefile.count().unwrap(), 30);

        let shape = shapefile.shapes().unwrap().next().unwrap().unwrap();
        assert_eq!(shape.shape_type(), ShapeType::Polygon);
        assert_eq!(shape.metadata_names().len(), 5);
        assert_eq!(shape.get_metadata("country"), Some("Panama"));
        let parts = shape.geometry.parts().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 29);
        assert!((parts[0][0].x - -78.0503086845797).abs() < 0.001);
        assert!((parts[0][0].y - 8.42391698232495).abs() < 0.001);
    }

    #[test]
    fn test_reset_yields_identical_shapes() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        let mut stream = shapefile.shapes().unwrap();
        let first: Vec<Shape> = stream.by_ref().map(|s| s.unwrap()).collect();
        stream.reset().unwrap();
        let second: Vec<Shape> = stream.by_ref().map(|s| s.unwrap()).collect();
        assert_eq!(first.len(), 30);
        assert_eq!(first, second);

        // a new stream starts again from the first row
        let third: Vec<Shape> = shapefile.shapes().unwrap().map(|s| s.unwrap()).collect();
        assert_eq!(first, third);
    }

    #[test]
    fn test_open_through_companion_path() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let shapefile =
            Shapefile::open(path.with_extension("dbf"), ShapefileConfig::default()).unwrap();
        assert_eq!(shapefile.count().unwrap(), 30);
        assert_eq!(shapefile.get_short_filename(), "PAN_water_areas_dcw.shp");
    }

    #[test]
    fn test_raw_metadata_only() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let config = ShapefileConfig {
            raw_metadata_only: true,
            ..Default::default()
        };
        let mut shapefile = Shapefile::open(&path, config).unwrap();
        let shape = shapefile.shapes().unwrap().next().unwrap().unwrap();
        assert_eq!(shape.get_metadata("country"), None);
        let raw = shape.raw_metadata().unwrap();
        assert_eq!(raw[0], FieldData::Text("Panama".to_string()));
        assert_eq!(raw[2], FieldData::Int(8));
    }

    #[test]
    fn test_missing_companions() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        std::fs::remove_file(path.with_extension("dbf")).unwrap();
        match Shapefile::open(&path, ShapefileConfig::default()) {
            Err(ShapefileError::NotFound { description, .. }) => {
                assert_eq!(description, "Shapefile dBase file")
            }
            other => panic!("unexpected result {:?}", other.err()),
        }
        std::fs::remove_file(path.with_extension("shx")).unwrap();
        match Shapefile::open(&path, ShapefileConfig::default()) {
            Err(ShapefileError::NotFound { description, .. }) => {
                assert_eq!(description, "Shapefile index file")
            }
            other => panic!("unexpected result {:?}", other.err()),
        }
    }

    #[test]
    fn test_empty_path() {
        assert!(matches!(
            Shapefile::open("", ShapefileConfig::default()),
            Err(ShapefileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_bad_header_fails_open() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] = 1;
        std::fs::write(&path, &bytes).unwrap();
        assert!(Shapefile::open(&path, ShapefileConfig::default())
            .err()
            .unwrap()
            .is_format_error());

        bytes.truncate(60);
        std::fs::write(&path, &bytes).unwrap();
        assert!(Shapefile::open(&path, ShapefileConfig::default())
            .err()
            .unwrap()
            .is_format_error());
    }

    #[test]
    fn test_declared_length_past_end_of_file() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let mut bytes = std::fs::read(&path).unwrap();
        let len = bytes.len();
        bytes.truncate(len - 16);
        std::fs::write(&path, &bytes).unwrap();
        assert!(Shapefile::open(&path, ShapefileConfig::default())
            .err()
            .unwrap()
            .is_format_error());

        let config = ShapefileConfig {
            strict_file_length: false,
            ..Default::default()
        };
        let mut shapefile = Shapefile::open(&path, config).unwrap();
        let results: Vec<Result<Shape>> = shapefile.shapes().unwrap().collect();
        assert_eq!(results.len(), 30);
        assert!(results[29].as_ref().unwrap_err().is_format_error());
    }

    #[test]
    fn test_mismatched_index_shape_type() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let shx = path.with_extension("shx");
        let mut bytes = std::fs::read(&shx).unwrap();
        bytes[32] = 3;
        std::fs::write(&shx, &bytes).unwrap();
        assert!(Shapefile::open(&path, ShapefileConfig::default())
            .err()
            .unwrap()
            .is_format_error());
    }

    #[test]
    fn test_closed_shapefile() {
        let dir = tempdir().unwrap();
        let path = polygon_collection(dir.path());
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        assert!(shapefile.is_open());
        shapefile.close();
        shapefile.close();
        assert!(!shapefile.is_open());
        assert!(matches!(shapefile.count(), Err(ShapefileError::State { .. })));
        assert!(matches!(shapefile.shape_type(), Err(ShapefileError::State { .. })));
        assert!(matches!(shapefile.bounding_box(), Err(ShapefileError::State { .. })));
        assert!(shapefile.shapes().is_err());
    }

    #[test]
    fn test_open_with_memory_attributes() {
        let dir = tempdir().unwrap();
        let payloads = vec![point_payload(1.0, 2.0), point_payload(3.0, 4.0)];
        let path = write_shapefile(
            dir.path(),
            "points",
            ShapeType::Point,
            [1.0, 2.0, 3.0, 4.0],
            &payloads,
            &[],
            &[],
        );
        std::fs::remove_file(path.with_extension("dbf")).unwrap();
        let attributes = MemoryAttributes::new(
            vec!["label".to_string()],
            vec![
                vec![FieldData::Text("a".to_string())],
                vec![FieldData::Text("b".to_string())],
            ],
        )
        .unwrap();
        let mut shapefile =
            Shapefile::open_with_attributes(&path, attributes, ShapefileConfig::default()).unwrap();
        assert_eq!(shapefile.field_names().unwrap(), vec!["label"]);
        let shapes: Vec<Shape> = shapefile.shapes().unwrap().map(|s| s.unwrap()).collect();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[1].get_metadata("label"), Some("b"));
        assert_eq!(shapes[1].geometry, Geometry::Point(Point2D::new(3.0, 4.0)));
    }

    #[test]
    fn test_short_attribute_table() {
        let dir = tempdir().unwrap();
        let payloads = vec![point_payload(1.0, 2.0), point_payload(3.0, 4.0)];
        let fields = vec![AttributeField::new("label", 'C', 4, 0)];
        let path = write_shapefile(
            dir.path(),
            "points",
            ShapeType::Point,
            [1.0, 2.0, 3.0, 4.0],
            &payloads,
            &fields,
            &[vec!["a"]],
        );
        let mut shapefile = Shapefile::open(&path, ShapefileConfig::default()).unwrap();
        let results: Vec<Result<Shape>> = shapefile.shapes().unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ShapefileError::State { .. })));
    }
}
