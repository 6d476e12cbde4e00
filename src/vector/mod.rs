/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: June 21, 2017
Last Modified: 17/10/2026
License: MIT
*/

/*
Eventually this will be used to support multiple vector formats but
for now it's just Shapefiles.
*/

pub mod shapefile;

pub use crate::structures::{BoundingBox, Point2D, PointM, PointZ, ValueRange};
pub use crate::vector::shapefile::attributes::*;
pub use crate::vector::shapefile::geometry::*;
pub use crate::vector::shapefile::{
    Metadata, Shape, ShapeStream, Shapefile, ShapefileConfig, ShapefileHeader, StreamState,
};
