//! Modules d'export (étiquettes GeoJSON, emprises)

pub mod geojson;

pub use self::geojson::{bounds_array, compute_labels, export_labels, labels_to_geojson, Label};
