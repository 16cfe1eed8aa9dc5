//! Définition et implémentation des commandes CLI
//!
//! - `aggregate`: répartition des sujets par région et par catégorie
//! - `labels`: étiquettes des régions (centroïde + surface) en GeoJSON
//! - `bounds`: emprise d'une sélection de features

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use tracing::{info, warn};

use sebaran::config::{Config, CONFIG_ENV};
use sebaran::export::{bounds_array, compute_labels, export_labels, labels_to_geojson};
use sebaran::{AggregationReport, ReportContext};
use wilayah::{aggregate, bounding_box_union, FallbackPolicy, FeatureCollection, RegionBoundarySet};

#[derive(Subcommand)]
pub enum Commands {
    /// Count subjects per containing region and per category
    Aggregate {
        /// GeoJSON layer of subjects (e.g. commercial buildings)
        #[arg(short, long)]
        subjects: PathBuf,

        /// GeoJSON layer of administrative regions
        #[arg(short, long)]
        regions: PathBuf,

        /// Config preset name (kecamatan/kelurahan/legacy) or path to a JSON config
        #[arg(long)]
        config: Option<String>,

        /// Region name property (overrides config)
        #[arg(long)]
        region_property: Option<String>,

        /// Category property (overrides config)
        #[arg(long)]
        category_property: Option<String>,

        /// What to do with subjects outside every region (overrides config)
        #[arg(long, value_enum)]
        fallback: Option<FallbackArg>,

        /// Number of regions in the ranking (overrides config)
        #[arg(long)]
        top: Option<usize>,

        /// List regions without any subject
        #[arg(long)]
        include_empty: bool,

        /// Save the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export region labels (centroid + area) as GeoJSON points
    Labels {
        /// GeoJSON layer of regions
        #[arg(short, long)]
        input: PathBuf,

        /// Property holding the label text (défaut : label_property de la config)
        #[arg(long)]
        name_property: Option<String>,

        /// Config preset name or path to a JSON config
        #[arg(long)]
        config: Option<String>,

        /// Output GeoJSON file (défaut : stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the bounding box of the matching features
    Bounds {
        /// GeoJSON layer
        #[arg(short, long)]
        input: PathBuf,

        /// Property used to select features
        #[arg(long, requires = "value")]
        property: Option<String>,

        /// Value the property must have
        #[arg(long, requires = "property")]
        value: Option<String>,
    },
}

/// Politique de repli côté CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FallbackArg {
    Unclassified,
    FirstRegion,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Unclassified => FallbackPolicy::Unclassified,
            FallbackArg::FirstRegion => FallbackPolicy::FirstRegion,
        }
    }
}

/// Config explicite, sinon `SEBARAN_CONFIG`, sinon preset `kecamatan`
fn load_config(name: Option<&str>) -> Result<Config> {
    let name = name
        .map(str::to_string)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| "kecamatan".to_string());

    Config::resolve(&name).with_context(|| format!("Failed to load config '{}'", name))
}

fn load_layer(path: &Path) -> Result<FeatureCollection> {
    FeatureCollection::from_path(path)
        .with_context(|| format!("Failed to load GeoJSON: {}", path.display()))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Exécute la commande aggregate
#[allow(clippy::too_many_arguments)]
pub fn cmd_aggregate(
    subjects_path: &Path,
    regions_path: &Path,
    config: Option<&str>,
    region_property: Option<String>,
    category_property: Option<String>,
    fallback: Option<FallbackArg>,
    top: Option<usize>,
    include_empty: bool,
    output: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();

    let mut config = load_config(config)?;
    if let Some(property) = region_property {
        config.region_property = property;
    }
    if let Some(property) = category_property {
        config.category_property = property;
    }
    if let Some(fallback) = fallback {
        config.fallback = fallback.into();
    }
    if let Some(top) = top {
        config.top = top;
    }
    config.include_empty_regions |= include_empty;

    let regions = load_layer(regions_path)?;
    let subjects = load_layer(subjects_path)?;

    let boundaries = RegionBoundarySet::build(&regions.features, &config.region_property);
    if boundaries.is_empty() {
        warn!(
            property = %config.region_property,
            "No region boundary found, every subject will be unclassified"
        );
    }
    info!(
        regions = boundaries.len(),
        subjects = subjects.len(),
        "Aggregating"
    );

    let aggregation = aggregate(&subjects.features, &boundaries, &config.aggregate_options());

    let context = ReportContext {
        subjects_source: file_label(subjects_path),
        regions_source: file_label(regions_path),
        region_property: config.region_property.clone(),
        category_property: config.category_property.clone(),
        fallback: config.fallback,
        subjects_loaded: subjects.len(),
    };
    let mut report = AggregationReport::new(context, &boundaries, &aggregation, config.top);
    report.set_duration(start.elapsed());

    report.display();

    if let Some(path) = output {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    info!("{}", report.summary());
    Ok(())
}

/// Exécute la commande labels
pub fn cmd_labels(
    input: &Path,
    name_property: Option<String>,
    config: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let name_property = match name_property {
        Some(property) => property,
        None => load_config(config)?.label_property().to_string(),
    };

    let layer = load_layer(input)?;
    let labels = compute_labels(&layer.features, &name_property);

    if labels.is_empty() {
        warn!(property = %name_property, "No labelled polygon found");
    }

    match output {
        Some(path) => {
            export_labels(&labels, path)?;
            println!("Export complete: {} labels -> {}", labels.len(), path.display());
        }
        None => {
            println!("{}", serde_json::to_string(&labels_to_geojson(&labels))?);
        }
    }

    Ok(())
}

/// Exécute la commande bounds
pub fn cmd_bounds(input: &Path, property: Option<&str>, value: Option<&str>) -> Result<()> {
    let layer = load_layer(input)?;

    let selected: Vec<_> = layer
        .features
        .iter()
        .filter(|f| match (property, value) {
            (Some(p), Some(v)) => f.property_str(p).as_deref() == Some(v),
            _ => true,
        })
        .filter_map(|f| f.geometry.as_ref())
        .collect();

    info!(selected = selected.len(), "Computing bounds");

    let Some(rect) = bounding_box_union(selected) else {
        anyhow::bail!("No valid coordinate in the selected features");
    };

    println!("{}", serde_json::to_string(&bounds_array(&rect))?);
    Ok(())
}
