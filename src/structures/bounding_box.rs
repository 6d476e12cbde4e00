use std::fmt;

/// An axis-aligned rectangle. Boxes read from a file keep the values as
/// stored; `left`/`top`/`right`/`bottom` are x_min, y_min, x_max, y_max.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x: min_x,
            min_y: min_y,
            max_x: max_x,
            max_y: max_y,
        }
    }

    pub fn left(&self) -> f64 {
        self.min_x
    }

    pub fn top(&self) -> f64 {
        self.min_y
    }

    pub fn right(&self) -> f64 {
        self.max_x
    }

    pub fn bottom(&self) -> f64 {
        self.max_y
    }

    pub fn get_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn get_width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "x_min: {}, y_min: {}, x_max: {}, y_max: {}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// The minimum and maximum of a Z or M value block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> ValueRange {
        ValueRange { min: min, max: max }
    }
}

#[cfg(test)]
mod test {
    use super::BoundingBox;

    #[test]
    fn test_edges_follow_stored_order() {
        let bb = BoundingBox::new(-83.0, -77.0, 7.0, 9.5);
        assert_eq!(bb.left(), -83.0);
        assert_eq!(bb.top(), 7.0);
        assert_eq!(bb.right(), -77.0);
        assert_eq!(bb.bottom(), 9.5);
        assert_eq!(bb.get_width(), 6.0);
        assert_eq!(bb.get_height(), 2.5);
    }
}
