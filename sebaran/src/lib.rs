//! # sebaran
//!
//! Statistiques de répartition spatiale à partir de couches GeoJSON.
//!
//! ## Features
//!
//! - Comptage des bâtiments commerciaux par kecamatan et par année
//! - Rapport console et JSON (classement, moyenne, non classés)
//! - Export des étiquettes de régions (centroïde + surface) en GeoJSON
//! - Emprise d'une sélection de features pour le cadrage caméra
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Répartition par kecamatan
//! sebaran aggregate --subjects rumah_komersil.geojson --regions layer_administrasi.geojson
//!
//! # Étiquettes des kecamatan
//! sebaran labels --input layer_administrasi.geojson --output labels.geojson
//!
//! # Emprise d'un kecamatan
//! sebaran bounds --input layer_administrasi.geojson --property WADMKC --value Plered
//! ```

pub mod config;
pub mod export;
pub mod report;

pub use config::Config;
pub use report::{AggregationReport, ReportContext, ReportStatus};
