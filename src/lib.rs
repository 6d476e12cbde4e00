/*!
A lazy reader for ESRI Shapefiles. Headers are parsed when a `Shapefile` is
opened; each record is then decoded from the .shp file and joined with the
matching row of its attribute table as a `ShapeStream` advances.
*/

extern crate byteorder;

pub mod error;
pub mod io_utils;
pub mod structures;
pub mod vector;

pub use crate::error::{Result, ShapefileError};
pub use crate::vector::{Shape, Shapefile, ShapefileConfig};
