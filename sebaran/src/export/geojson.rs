//! Export des étiquettes de régions en GeoJSON
//!
//! Une étiquette par polygone nommé, placée au centroïde, avec la surface
//! approximative en m² comme sur la couche d'étiquettes de la carte.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use rayon::prelude::*;
use serde_json::json;

use wilayah::{polygon_area, polygon_centroid};

/// Étiquette d'une région
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub position: Coord<f64>,
    pub area_m2: Option<f64>,
}

impl Label {
    /// Texte affiché : nom, puis surface arrondie sur une seconde ligne
    pub fn text(&self) -> String {
        match self.area_m2 {
            Some(area) => format!("{}\n{} m²", self.name, area.round()),
            None => self.name.clone(),
        }
    }
}

/// Calcule les étiquettes des features nommées.
///
/// Les features sans nom ou sans centroïde sont ignorées. L'ordre d'entrée
/// est conservé.
pub fn compute_labels(features: &[wilayah::Feature], name_property: &str) -> Vec<Label> {
    features
        .par_iter()
        .filter_map(|feature| {
            let name = feature.property_str(name_property)?;
            let geometry = feature.geometry.as_ref()?;
            let position = polygon_centroid(geometry)?;
            Some(Label {
                name,
                position,
                area_m2: polygon_area(geometry),
            })
        })
        .collect()
}

fn label_feature(label: &Label) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(label.name));
    properties.insert("area_m2".to_string(), json!(label.area_m2.map(f64::round)));
    properties.insert("label".to_string(), json!(label.text()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            label.position.x,
            label.position.y,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Collection de points d'étiquettes
pub fn labels_to_geojson(labels: &[Label]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: labels.iter().map(label_feature).collect(),
        foreign_members: None,
    }
}

/// Écrit les étiquettes dans un fichier GeoJSON
pub fn export_labels(labels: &[Label], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &labels_to_geojson(labels))?;
    writer.flush()?;

    Ok(())
}

/// Emprise au format `[[min_lng, min_lat], [max_lng, max_lat]]` (sud-ouest, nord-est)
pub fn bounds_array(rect: &Rect<f64>) -> [[f64; 2]; 2] {
    [
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, LineString, Polygon};
    use serde_json::Map;
    use wilayah::Polygonal;

    fn region(name: Option<&str>) -> wilayah::Feature {
        let mut properties = Map::new();
        if let Some(name) = name {
            properties.insert("WADMKC".to_string(), json!(name));
        }
        wilayah::Feature::new(
            Some(Polygonal::Polygon(Polygon::new(
                LineString::from(vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.01)]),
                vec![],
            ))),
            properties,
        )
    }

    #[test]
    fn test_compute_labels() {
        let features = vec![region(Some("Wanayasa")), region(None)];
        let labels = compute_labels(&features, "WADMKC");

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "Wanayasa");
        assert!((labels[0].position.x - 0.005).abs() < 1e-12);
        // 0.0001 degré² ≈ 1 232 100 m²
        assert!((labels[0].area_m2.unwrap() - 1_232_100.0).abs() < 1e-3);
        assert_eq!(labels[0].text(), "Wanayasa\n1232100 m²");
    }

    #[test]
    fn test_label_text_without_area() {
        let label = Label {
            name: "Jatiluhur".to_string(),
            position: coord! { x: 0.0, y: 0.0 },
            area_m2: None,
        };
        assert_eq!(label.text(), "Jatiluhur");
    }

    #[test]
    fn test_labels_to_geojson() {
        let labels = compute_labels(&[region(Some("Campaka"))], "WADMKC");
        let json = serde_json::to_string(&labels_to_geojson(&labels)).unwrap();

        assert!(json.contains(r#""type":"FeatureCollection""#));
        assert!(json.contains(r#""type":"Point""#));
        assert!(json.contains(r#""name":"Campaka""#));
    }

    #[test]
    fn test_export_labels() {
        let labels = compute_labels(&[region(Some("Cibatu"))], "WADMKC");
        let output_path = std::env::temp_dir().join("sebaran_test_labels.geojson");

        export_labels(&labels, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let parsed: geojson::GeoJson = content.parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 1),
            other => panic!("expected FeatureCollection, got {:?}", other),
        }

        std::fs::remove_file(output_path).ok();
    }

    #[test]
    fn test_bounds_array() {
        let rect = Rect::new(coord! { x: 107.5, y: -6.4 }, coord! { x: 107.3, y: -6.7 });
        assert_eq!(bounds_array(&rect), [[107.3, -6.7], [107.5, -6.4]]);
    }
}
