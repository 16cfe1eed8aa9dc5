//! Rapport d'analyse de répartition
//!
//! Ce module met en forme le résultat d'une agrégation : tableau par région,
//! classement, moyenne et sujets non classés, pour l'affichage console et
//! l'export JSON (données du graphique).

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use wilayah::{Aggregation, FallbackPolicy, RegionBoundarySet};

/// Statut global de l'analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportStatus {
    /// Tous les sujets ont été rattachés à une région
    Complete,
    /// Des sujets sont hors de toute région (non classés ou attribués au repli)
    PartialClassification,
    /// Rien à afficher
    Empty,
}

/// Ligne du tableau : une région et ses comptes par catégorie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionRow {
    pub region: String,
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Sources et paramètres de l'analyse
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportContext {
    pub subjects_source: String,
    pub regions_source: String,
    pub region_property: String,
    pub category_property: String,
    pub fallback: FallbackPolicy,
    pub subjects_loaded: usize,
}

/// Rapport complet d'analyse
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    #[serde(flatten)]
    pub context: ReportContext,
    /// Durée de l'analyse
    pub duration_secs: f64,
    /// Statut global
    pub status: ReportStatus,

    /// Nombre de limites de régions retenues
    pub regions_loaded: usize,
    /// Limites écrasées par un nom en double
    pub duplicate_regions: usize,

    /// Sujets rattachés à une région (repli compris)
    pub classified: usize,
    /// Sujets attribués à la région de repli
    pub fallback_assigned: usize,
    /// Sujets hors de toute région, par catégorie
    pub unclassified: BTreeMap<String, usize>,
    /// Sujets sans géométrie surfacique
    pub skipped: usize,

    pub average_per_region: Option<f64>,
    pub categories: Vec<String>,
    /// Régions triées par total décroissant
    pub rows: Vec<RegionRow>,
    /// Nombre de régions du classement
    pub top: usize,
}

impl AggregationReport {
    /// Construit le rapport à partir d'une agrégation
    pub fn new(
        context: ReportContext,
        boundaries: &RegionBoundarySet,
        aggregation: &Aggregation,
        top: usize,
    ) -> Self {
        let rows = aggregation
            .region_totals()
            .into_iter()
            .map(|(region, total)| RegionRow {
                by_category: aggregation.buckets.get(&region).cloned().unwrap_or_default(),
                region,
                total,
            })
            .collect();

        let mut report = Self {
            context,
            duration_secs: 0.0,
            status: ReportStatus::Complete,
            regions_loaded: boundaries.len(),
            duplicate_regions: boundaries.duplicates(),
            classified: aggregation.grand_total(),
            fallback_assigned: aggregation.fallback_assigned,
            unclassified: aggregation.unclassified.clone(),
            skipped: aggregation.skipped,
            average_per_region: aggregation.average_per_region(),
            categories: aggregation.categories(),
            rows,
            top,
        };
        report.finalize();
        report
    }

    /// Définit la durée de l'analyse
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    fn finalize(&mut self) {
        let unclassified = self.unclassified_total();
        self.status = if self.classified == 0 && unclassified == 0 {
            ReportStatus::Empty
        } else if unclassified > 0 || self.fallback_assigned > 0 {
            ReportStatus::PartialClassification
        } else {
            ReportStatus::Complete
        };
    }

    pub fn unclassified_total(&self) -> usize {
        self.unclassified.values().sum()
    }

    /// Les `top` premières régions
    pub fn top_rows(&self) -> &[RegionRow] {
        &self.rows[..self.top.min(self.rows.len())]
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!(
            "SEBARAN REPORT - {} per {}",
            self.context.subjects_source, self.context.region_property
        );
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Regions: {} loaded, {} duplicate names",
            self.regions_loaded, self.duplicate_regions
        );
        println!(
            "Subjects: {} loaded, {} classified, {} unclassified, {} skipped",
            self.context.subjects_loaded,
            self.classified,
            self.unclassified_total(),
            self.skipped
        );
        if self.fallback_assigned > 0 {
            println!(
                "Fallback: {} subjects assigned to the first region",
                self.fallback_assigned
            );
        }
        if let Some(average) = self.average_per_region {
            println!("Average per region: {}", average.round());
        }

        if !self.rows.is_empty() {
            println!("\n--- TOP {} ---", self.top_rows().len());
            for (rank, row) in self.top_rows().iter().enumerate() {
                println!("  {}. {}: {}", rank + 1, row.region, row.total);
            }

            println!("\n--- BY {} ---", self.context.category_property);
            for row in &self.rows {
                let detail: Vec<String> = row
                    .by_category
                    .iter()
                    .map(|(category, count)| format!("{}={}", category, count))
                    .collect();
                println!("  {}: {} [{}]", row.region, row.total, detail.join(", "));
            }
        }

        if !self.unclassified.is_empty() {
            println!("\n--- UNCLASSIFIED ({}) ---", self.unclassified_total());
            for (category, count) in &self.unclassified {
                println!("  {}: {}", category, count);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} regions, {} classified, {} unclassified, {} skipped",
            self.context.subjects_source,
            self.rows.len(),
            self.classified,
            self.unclassified_total(),
            self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use serde_json::{json, Map, Value};
    use wilayah::{aggregate, AggregateOptions, Feature, Polygonal};

    fn square(x: f64, y: f64, size: f64) -> Option<Polygonal> {
        Some(Polygonal::Polygon(Polygon::new(
            LineString::from(vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]),
            vec![],
        )))
    }

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn build(subjects: &[Feature], options: &AggregateOptions) -> AggregationReport {
        let regions = vec![
            Feature::new(square(0.0, 0.0, 10.0), props(json!({ "KECAMATAN": "Plered" }))),
            Feature::new(square(10.0, 0.0, 10.0), props(json!({ "KECAMATAN": "Bojong" }))),
            Feature::new(square(20.0, 0.0, 10.0), props(json!({ "KECAMATAN": "Maniis" }))),
        ];
        let boundaries = RegionBoundarySet::build(&regions, "KECAMATAN");
        let aggregation = aggregate(subjects, &boundaries, options);
        let context = ReportContext {
            subjects_source: "rumah_komersil.geojson".to_string(),
            region_property: "KECAMATAN".to_string(),
            category_property: "TAHUN".to_string(),
            subjects_loaded: subjects.len(),
            ..Default::default()
        };
        AggregationReport::new(context, &boundaries, &aggregation, 2)
    }

    fn subjects() -> Vec<Feature> {
        vec![
            Feature::new(square(1.0, 1.0, 1.0), props(json!({ "TAHUN": "2020" }))),
            Feature::new(square(2.0, 2.0, 1.0), props(json!({ "TAHUN": "2021" }))),
            Feature::new(square(11.0, 1.0, 1.0), props(json!({ "TAHUN": "2020" }))),
            Feature::new(square(21.0, 1.0, 1.0), props(json!({ "TAHUN": "2020" }))),
            Feature::new(square(22.0, 1.0, 1.0), props(json!({ "TAHUN": "2020" }))),
            Feature::new(square(23.0, 1.0, 1.0), props(json!({ "TAHUN": "2019" }))),
        ]
    }

    #[test]
    fn test_report_complete() {
        let report = build(&subjects(), &AggregateOptions::new("TAHUN"));

        assert_eq!(report.status, ReportStatus::Complete);
        assert_eq!(report.classified, 6);
        assert_eq!(report.rows[0].region, "Maniis");
        assert_eq!(report.rows[0].by_category["2020"], 2);
        assert_eq!(report.top_rows().len(), 2);
        assert_eq!(report.average_per_region, Some(2.0));
        assert_eq!(report.categories, vec!["2019", "2020", "2021"]);
    }

    #[test]
    fn test_report_partial() {
        let mut features = subjects();
        features.push(Feature::new(square(100.0, 100.0, 1.0), Map::new()));
        let report = build(&features, &AggregateOptions::new("TAHUN"));

        assert_eq!(report.status, ReportStatus::PartialClassification);
        assert_eq!(report.unclassified_total(), 1);
        assert!(report.summary().contains("1 unclassified"));
    }

    #[test]
    fn test_report_empty() {
        let report = build(&[], &AggregateOptions::new("TAHUN").with_empty_regions(true));

        assert_eq!(report.status, ReportStatus::Empty);
        assert_eq!(report.rows.len(), 3);
        assert!(report.rows.iter().all(|r| r.total == 0));
    }

    #[test]
    fn test_save_to_file() {
        let report = build(&subjects(), &AggregateOptions::new("TAHUN"));
        let path = std::env::temp_dir().join("sebaran_test_report.json");
        report.save_to_file(&path).unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["status"], "Complete");
        assert_eq!(saved["region_property"], "KECAMATAN");
        assert_eq!(saved["rows"][0]["region"], "Maniis");
        assert_eq!(saved["fallback"], "unclassified");

        std::fs::remove_file(path).ok();
    }
}
