//! Types de données pour le crate wilayah

use geo::{LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

/// Géométrie surfacique acceptée par le noyau géométrique.
///
/// Variante explicite : le type est connu à la frontière de l'API, le
/// reniflage de profondeur des tableaux de coordonnées n'a lieu que dans
/// l'adaptateur GeoJSON (`crate::geojson`).
#[derive(Debug, Clone, PartialEq)]
pub enum Polygonal {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Polygonal {
    /// Ring extérieur de chaque polygone, dans l'ordre
    pub fn exteriors(&self) -> Vec<&LineString<f64>> {
        match self {
            Polygonal::Polygon(polygon) => vec![polygon.exterior()],
            Polygonal::MultiPolygon(multi) => multi.iter().map(|p| p.exterior()).collect(),
        }
    }

    /// Tous les rings (extérieurs et trous) de tous les polygones
    pub fn rings(&self) -> Vec<&LineString<f64>> {
        let polygons: Vec<&Polygon<f64>> = match self {
            Polygonal::Polygon(polygon) => vec![polygon],
            Polygonal::MultiPolygon(multi) => multi.iter().collect(),
        };

        polygons
            .into_iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
            .collect()
    }

    /// Ring extérieur du polygone (ou du premier polygone d'un multipolygone)
    pub fn first_exterior(&self) -> Option<&LineString<f64>> {
        match self {
            Polygonal::Polygon(polygon) => Some(polygon.exterior()),
            Polygonal::MultiPolygon(multi) => multi.0.first().map(|p| p.exterior()),
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Polygonal::Polygon(_))
    }
}

impl From<Polygon<f64>> for Polygonal {
    fn from(polygon: Polygon<f64>) -> Self {
        Polygonal::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for Polygonal {
    fn from(multi: MultiPolygon<f64>) -> Self {
        Polygonal::MultiPolygon(multi)
    }
}

/// Une feature GeoJSON avec sa géométrie surfacique et ses propriétés
#[derive(Debug, Clone, Default)]
pub struct Feature {
    /// Identifiant de la feature (`id` GeoJSON ou propriété d'identifiant)
    pub id: Option<String>,

    /// Géométrie, `None` si absente ou non surfacique
    pub geometry: Option<Polygonal>,

    /// Propriétés de la feature (clé -> valeur scalaire)
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Crée une feature sans identifiant
    pub fn new(geometry: Option<Polygonal>, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry,
            properties,
        }
    }

    /// Valeur d'une propriété rendue en texte.
    ///
    /// Les chaînes vides, `null`, tableaux et objets donnent `None`.
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Collection ordonnée de features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Nombre de features ayant une géométrie surfacique exploitable
    pub fn polygonal_count(&self) -> usize {
        self.features.iter().filter(|f| f.geometry.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};
    use serde_json::json;

    #[test]
    fn test_property_str() {
        let mut properties = Map::new();
        properties.insert("KECAMATAN".to_string(), json!("Plered"));
        properties.insert("TAHUN".to_string(), json!(2021));
        properties.insert("VIDE".to_string(), json!("  "));
        properties.insert("NUL".to_string(), Value::Null);
        let feature = Feature::new(None, properties);

        assert_eq!(feature.property_str("KECAMATAN"), Some("Plered".to_string()));
        assert_eq!(feature.property_str("TAHUN"), Some("2021".to_string()));
        assert_eq!(feature.property_str("VIDE"), None);
        assert_eq!(feature.property_str("NUL"), None);
        assert_eq!(feature.property_str("ABSENT"), None);
    }

    #[test]
    fn test_rings_include_holes() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 4.0)]],
        );
        let geometry = Polygonal::from(poly);

        assert_eq!(geometry.rings().len(), 2);
        assert_eq!(geometry.exteriors().len(), 1);
        assert_eq!(
            geometry.first_exterior().map(|r| r.0[0]),
            Some(coord! { x: 0.0, y: 0.0 })
        );
    }
}
