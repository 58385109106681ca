//! Built-in column datatypes: the spatial bounding box and the stock
//! embedded entity types that servers return as nested objects.

use crate::soql::expression::Build;

/// A geographic bounding box, rendered as a comma-joined coordinate list in
/// north, east, south, west order for spatial predicate functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    north: f64,
    east: f64,
    south: f64,
    west: f64,
}

impl GeoBox {
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> GeoBox {
        GeoBox {
            north,
            east,
            south,
            west,
        }
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn west(&self) -> f64 {
        self.west
    }
}

impl Build for GeoBox {
    fn build(&self) -> String {
        format!("{}, {}, {}, {}", self.north, self.east, self.south, self.west)
    }
}

crate::entity! {
    /// A location column value: coordinates plus a human-readable address.
    ///
    /// Coordinates arrive as decimal strings and parse through the double
    /// converter via local-type resolution.
    pub struct Location {
        needs_recoding: bool,
        longitude: Option<f64>,
        latitude: Option<f64>,
        human_address: Option<String>,
    }
}

crate::entity! {
    /// A phone column value.
    pub struct Phone {
        "phone_number" => number: Option<String>,
        "phone_type" => kind: Option<String>,
    }
}

crate::entity! {
    /// A url column value with an optional description.
    pub struct Url {
        description: Option<String>,
        url: Option<String>,
    }
}

crate::entity! {
    /// A document column value referencing an uploaded file.
    pub struct Document {
        file_id: Option<String>,
        "filename" => file_name: Option<String>,
    }
}
