/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 14/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use super::attributes::FieldData;
use super::geometry::{Geometry, ShapeType};

/// Attribute values of one shape as ordered (column name, value) pairs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeRecord {
    entries: Vec<(String, String)>,
}

impl AttributeRecord {
    pub fn new(names: &[String], values: &[FieldData]) -> AttributeRecord {
        AttributeRecord {
            entries: names
                .iter()
                .zip(values)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    /// Values converted to strings and keyed by column name.
    Attributes(AttributeRecord),
    /// The typed row as the attribute source returned it, in column order.
    Raw(Vec<FieldData>),
}

/// One record of a Shapefile. Shapes are independent values; they hold no
/// reference back to the stream that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Starts at one.
    pub record_number: usize,
    pub metadata: Metadata,
    pub geometry: Geometry,
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        self.geometry.shape_type()
    }

    /// The string value of an attribute. Always None for raw metadata.
    pub fn get_metadata(&self, name: &str) -> Option<&str> {
        match &self.metadata {
            Metadata::Attributes(record) => record.get(name),
            Metadata::Raw(_) => None,
        }
    }

    pub fn metadata_names(&self) -> Vec<&str> {
        match &self.metadata {
            Metadata::Attributes(record) => record.names(),
            Metadata::Raw(_) => vec![],
        }
    }

    pub fn raw_metadata(&self) -> Option<&[FieldData]> {
        match &self.metadata {
            Metadata::Raw(row) => Some(row),
            Metadata::Attributes(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_attribute_record_keeps_column_order() {
        let names = vec!["country".to_string(), "id".to_string()];
        let record = AttributeRecord::new(
            &names,
            &[FieldData::Text("Panama".to_string()), FieldData::Int(4)],
        );
        assert_eq!(record.names(), vec!["country", "id"]);
        assert_eq!(record.get("id"), Some("4"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.iter().next(), Some(("country", "Panama")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_raw_metadata_has_no_names() {
        let shape = Shape {
            record_number: 1,
            metadata: Metadata::Raw(vec![FieldData::Int(4)]),
            geometry: Geometry::Null,
        };
        assert_eq!(shape.get_metadata("id"), None);
        assert!(shape.metadata_names().is_empty());
        assert_eq!(shape.raw_metadata(), Some(&[FieldData::Int(4)][..]));
        assert_eq!(shape.shape_type(), ShapeType::Null);
    }
}
