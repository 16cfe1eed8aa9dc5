//! # wilayah
//!
//! Noyau géométrique et agrégation spatiale pour les couches GeoJSON
//! administratives (kecamatan, kelurahan) et commerciales.
//!
//! ## Features
//!
//! - Centroïde Shoelace pondéré avec repli sur l'emprise
//! - Surface approximative en m², emprise, point dans polygone
//! - Comptage des features par région contenante et par catégorie
//! - Lecture tolérante de GeoJSON peu typé
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wilayah::{aggregate, AggregateOptions, FeatureCollection, RegionBoundarySet};
//! use std::path::Path;
//!
//! let regions = FeatureCollection::from_path(Path::new("layer_administrasi.geojson"))?;
//! let subjects = FeatureCollection::from_path(Path::new("rumah_komersil.geojson"))?;
//!
//! let boundaries = RegionBoundarySet::build(&regions.features, "KECAMATAN");
//! let result = aggregate(&subjects.features, &boundaries, &AggregateOptions::new("TAHUN"));
//!
//! for (kecamatan, total) in result.top_regions(5) {
//!     println!("{}: {}", kecamatan, total);
//! }
//! ```

pub mod aggregate;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod types;

pub use aggregate::{
    aggregate, AggregateOptions, Aggregation, FallbackPolicy, RegionBoundary, RegionBoundarySet,
    UNKNOWN_CATEGORY,
};
pub use error::WilayahError;
pub use geometry::{
    bounding_box, bounding_box_union, point_in_polygonal, point_in_ring, polygon_area,
    polygon_area_degrees, polygon_centroid,
};
pub use types::{Feature, FeatureCollection, Polygonal};
