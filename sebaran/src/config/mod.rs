//! Configuration de l'analyse

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};
use wilayah::{AggregateOptions, FallbackPolicy};

/// Presets embarqués
pub const PRESETS: [&str; 3] = ["kecamatan", "kelurahan", "legacy"];

/// Variable d'environnement donnant le preset ou le fichier par défaut
pub const CONFIG_ENV: &str = "SEBARAN_CONFIG";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Propriété portant le nom de la région dans la couche administrative
    pub region_property: String,

    /// Propriété portant la catégorie dans la couche des sujets
    #[serde(default = "default_category_property")]
    pub category_property: String,

    /// Propriété utilisée pour les étiquettes (défaut : `region_property`)
    #[serde(default)]
    pub label_property: Option<String>,

    /// Traitement des sujets hors de toute région
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Faire apparaître les régions sans sujet
    #[serde(default)]
    pub include_empty_regions: bool,

    /// Nombre de régions dans le classement
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_category_property() -> String {
    "TAHUN".to_string()
}

fn default_top() -> usize {
    5
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "kecamatan" => Self::load_embedded(include_str!("presets/kecamatan.json")),
            "kelurahan" => Self::load_embedded(include_str!("presets/kelurahan.json")),
            "legacy" => Self::load_embedded(include_str!("presets/legacy.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset si le nom en est un, sinon chemin vers un fichier JSON
    pub fn resolve(name: &str) -> Result<Self> {
        if PRESETS.contains(&name) {
            Self::from_preset(name)
        } else {
            Self::load(Path::new(name))
        }
    }

    /// Propriété des étiquettes
    pub fn label_property(&self) -> &str {
        self.label_property
            .as_deref()
            .unwrap_or(&self.region_property)
    }

    /// Options passées à l'agrégation
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions::new(self.category_property.clone())
            .with_fallback(self.fallback)
            .with_empty_regions(self.include_empty_regions)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region_property: "KECAMATAN".to_string(),
            category_property: default_category_property(),
            label_property: None,
            fallback: FallbackPolicy::default(),
            include_empty_regions: false,
            top: default_top(),
        }
    }
}
