//! Agrégation spatiale : comptage des features par région et par catégorie
//!
//! Chaque feature « sujet » (ex : bâtiment commercial) est rattachée à la
//! première région (ex : kecamatan) dont le ring contient son centroïde, puis
//! comptée sous sa catégorie (ex : année).

use std::collections::{BTreeMap, HashMap};

use geo::{Coord, LineString, Rect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{bounding_box, point_in_ring, polygon_centroid};
use crate::types::{Feature, Polygonal};

/// Catégorie utilisée quand la propriété est absente ou vide
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Limite d'une région : ring extérieur et emprise pour le pré-filtrage
#[derive(Debug, Clone)]
pub struct RegionBoundary {
    pub name: String,
    pub ring: LineString<f64>,
    pub bbox: Option<Rect<f64>>,
}

impl RegionBoundary {
    pub fn new(name: impl Into<String>, ring: LineString<f64>) -> Self {
        let bbox = bounding_box(&Polygonal::Polygon(geo::Polygon::new(ring.clone(), vec![])));
        Self {
            name: name.into(),
            ring,
            bbox,
        }
    }

    /// Emprise puis lancer de rayon
    pub fn contains(&self, point: Coord<f64>) -> bool {
        let Some(bbox) = self.bbox else {
            return false;
        };
        if point.x < bbox.min().x
            || point.x > bbox.max().x
            || point.y < bbox.min().y
            || point.y > bbox.max().y
        {
            return false;
        }
        point_in_ring(point, &self.ring)
    }
}

/// Ensemble des limites de régions, dans l'ordre d'insertion
#[derive(Debug, Clone, Default)]
pub struct RegionBoundarySet {
    regions: Vec<RegionBoundary>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl RegionBoundarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit les limites depuis des features de régions.
    ///
    /// Seules les features `Polygon` avec un nom non vide sous
    /// `name_property` sont retenues. Un nom en double remplace la limite
    /// précédente mais garde sa position.
    pub fn build(features: &[Feature], name_property: &str) -> Self {
        let mut set = Self::new();

        for feature in features {
            let Some(name) = feature.property_str(name_property) else {
                continue;
            };

            match &feature.geometry {
                Some(Polygonal::Polygon(polygon)) => {
                    set.insert(RegionBoundary::new(name, polygon.exterior().clone()));
                }
                Some(Polygonal::MultiPolygon(_)) => {
                    debug!(region = %name, "MultiPolygon region skipped");
                }
                None => {}
            }
        }

        debug!(
            regions = set.len(),
            duplicates = set.duplicates,
            property = name_property,
            "Region boundaries built"
        );
        set
    }

    /// Ajoute ou remplace une limite. Retourne `true` si le nom existait déjà.
    pub fn insert(&mut self, boundary: RegionBoundary) -> bool {
        match self.index.get(&boundary.name) {
            Some(&i) => {
                warn!(region = %boundary.name, "Duplicate region name, last boundary wins");
                self.duplicates += 1;
                self.regions[i] = boundary;
                true
            }
            None => {
                self.index.insert(boundary.name.clone(), self.regions.len());
                self.regions.push(boundary);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Nombre de limites écrasées par un nom en double
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn get(&self, name: &str) -> Option<&RegionBoundary> {
        self.index.get(name).map(|&i| &self.regions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionBoundary> {
        self.regions.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }

    /// Première région insérée (région de repli historique)
    pub fn first_name(&self) -> Option<&str> {
        self.regions.first().map(|r| r.name.as_str())
    }

    /// Première région, dans l'ordre d'insertion, qui contient le point
    pub fn classify(&self, point: Coord<f64>) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.contains(point))
            .map(|r| r.name.as_str())
    }
}

/// Traitement des sujets dont le centroïde n'est dans aucune région
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Compté à part dans `Aggregation::unclassified`
    #[default]
    Unclassified,
    /// Attribué à la première région insérée (comportement historique du tableau de bord)
    FirstRegion,
}

/// Options d'agrégation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Propriété donnant la catégorie (ex : `TAHUN`)
    pub category_property: String,
    pub fallback: FallbackPolicy,
    /// Faire apparaître toutes les régions, même sans sujet
    pub include_empty_regions: bool,
}

impl AggregateOptions {
    pub fn new(category_property: impl Into<String>) -> Self {
        Self {
            category_property: category_property.into(),
            fallback: FallbackPolicy::default(),
            include_empty_regions: false,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_empty_regions(mut self, include: bool) -> Self {
        self.include_empty_regions = include;
        self
    }
}

/// Résultat d'une agrégation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    /// région -> catégorie -> nombre
    pub buckets: BTreeMap<String, BTreeMap<String, usize>>,
    /// catégorie -> nombre de sujets hors de toute région
    pub unclassified: BTreeMap<String, usize>,
    /// Sujets attribués à la région de repli (`FallbackPolicy::FirstRegion`)
    pub fallback_assigned: usize,
    /// Sujets sans géométrie surfacique
    pub skipped: usize,
}

impl Aggregation {
    fn increment(&mut self, region: &str, category: &str) {
        *self
            .buckets
            .entry(region.to_string())
            .or_default()
            .entry(category.to_string())
            .or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.grand_total() == 0 && self.unclassified_total() == 0
    }

    pub fn region_total(&self, region: &str) -> usize {
        self.buckets
            .get(region)
            .map(|categories| categories.values().sum())
            .unwrap_or(0)
    }

    /// Totaux par région, décroissants puis par nom
    pub fn region_totals(&self) -> Vec<(String, usize)> {
        let mut totals: Vec<(String, usize)> = self
            .buckets
            .iter()
            .map(|(region, categories)| (region.clone(), categories.values().sum()))
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        totals
    }

    pub fn top_regions(&self, n: usize) -> Vec<(String, usize)> {
        let mut totals = self.region_totals();
        totals.truncate(n);
        totals
    }

    /// Total des sujets rattachés à une région
    pub fn grand_total(&self) -> usize {
        self.buckets.values().flat_map(|c| c.values()).sum()
    }

    pub fn unclassified_total(&self) -> usize {
        self.unclassified.values().sum()
    }

    /// Sujets dont le centroïde est réellement dans une région (repli exclu)
    pub fn classified_count(&self) -> usize {
        self.grand_total() - self.fallback_assigned
    }

    /// Moyenne par région, `None` s'il n'y a aucune région
    pub fn average_per_region(&self) -> Option<f64> {
        if self.buckets.is_empty() {
            return None;
        }
        Some(self.grand_total() as f64 / self.buckets.len() as f64)
    }

    /// Union triée des catégories rencontrées
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .buckets
            .values()
            .flat_map(|c| c.keys())
            .chain(self.unclassified.keys())
            .cloned()
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Compte les sujets par région et par catégorie.
///
/// Les centroïdes sont calculés en parallèle, le comptage se fait ensuite
/// dans l'ordre des sujets : le résultat est identique d'un appel à l'autre.
pub fn aggregate(
    subjects: &[Feature],
    regions: &RegionBoundarySet,
    options: &AggregateOptions,
) -> Aggregation {
    let centroids: Vec<Option<Option<Coord<f64>>>> = subjects
        .par_iter()
        .map(|f| f.geometry.as_ref().map(polygon_centroid))
        .collect();

    let mut result = Aggregation::default();

    if options.include_empty_regions {
        for name in regions.names() {
            result.buckets.entry(name.to_string()).or_default();
        }
    }

    for (subject, centroid) in subjects.iter().zip(centroids) {
        let Some(centroid) = centroid else {
            result.skipped += 1;
            continue;
        };

        let category = subject
            .property_str(&options.category_property)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        if let Some(region) = centroid.and_then(|c| regions.classify(c)) {
            result.increment(region, &category);
            continue;
        }

        debug!(
            id = subject.id.as_deref().unwrap_or("-"),
            centroid = ?centroid,
            "Subject outside every region"
        );

        match (options.fallback, regions.first_name()) {
            (FallbackPolicy::FirstRegion, Some(first)) => {
                result.fallback_assigned += 1;
                result.increment(first, &category);
            }
            _ => {
                *result.unclassified.entry(category).or_insert(0) += 1;
            }
        }
    }

    if result.skipped > 0 {
        debug!(skipped = result.skipped, "Subjects without polygonal geometry");
    }

    result
}
