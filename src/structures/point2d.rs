/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 30/08/2018
Last Modified: 17/10/2026
License: MIT
*/
use std::fmt;

/// A 2-D point, with x and y fields.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl Point2D {
    /// Creates a new Point2D,
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x: x, y: y }
    }
}

/// A 2-D point carrying a measure.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct PointM {
    pub x: f64,
    pub y: f64,
    pub m: f64,
}

impl PointM {
    pub fn new(x: f64, y: f64, m: f64) -> PointM {
        PointM { x: x, y: y, m: m }
    }

    pub fn to_point2d(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl fmt::Display for PointM {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {}, m: {})", self.x, self.y, self.m)
    }
}

/// A 3-D point. The measure is optional in PointZ records.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct PointZ {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: Option<f64>,
}

impl PointZ {
    pub fn new(x: f64, y: f64, z: f64, m: Option<f64>) -> PointZ {
        PointZ {
            x: x,
            y: y,
            z: z,
            m: m,
        }
    }

    pub fn to_point2d(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl fmt::Display for PointZ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.m {
            Some(m) => write!(f, "(x: {}, y: {}, z: {}, m: {})", self.x, self.y, self.z, m),
            None => write!(f, "(x: {}, y: {}, z: {})", self.x, self.y, self.z),
        }
    }
}
