//! Adaptateur GeoJSON tolérant
//!
//! Les couches du tableau de bord arrivent sous forme de JSON peu typé :
//! géométries sans `type`, positions à 3 dimensions, valeurs `null` dans les
//! coordonnées. On convertit ici vers [`Polygonal`] en sautant ce qui est
//! inexploitable, sans jamais faire échouer la feature entière.

use std::io::Read;
use std::path::Path;

use geo::{coord, Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{Feature, FeatureCollection, Polygonal};
use crate::WilayahError;

/// Propriétés consultées, dans l'ordre, pour identifier une feature
pub const ID_PROPERTIES: [&str; 6] = ["feature_id", "OBJECTID", "Id", "id", "OID_", "ID"];

/// Convertit un objet géométrie GeoJSON.
///
/// Utilise `type` quand il est présent ; sinon, devine la structure par la
/// profondeur des tableaux. Les types non surfaciques donnent `None`.
pub fn polygonal_from_geometry(geometry: &Value) -> Option<Polygonal> {
    let coordinates = geometry.get("coordinates")?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => polygon_from_rings(coordinates).map(Polygonal::Polygon),
        Some("MultiPolygon") => Some(Polygonal::MultiPolygon(multi_from_polygons(coordinates)?)),
        Some(other) => {
            debug!(geometry_type = other, "Non-polygonal geometry ignored");
            None
        }
        None => polygonal_from_coordinates(coordinates),
    }
}

/// Devine Polygon / MultiPolygon d'après la profondeur d'imbrication.
///
/// - `[[x, y], ...]` : ring seul, traité comme un Polygon sans trou
/// - `[[[x, y], ...], ...]` : Polygon (ring extérieur puis trous)
/// - `[[[[x, y], ...], ...], ...]` : MultiPolygon
pub fn polygonal_from_coordinates(coordinates: &Value) -> Option<Polygonal> {
    match nesting(coordinates)? {
        2 => Some(Polygonal::Polygon(Polygon::new(ring_from_positions(coordinates)?, vec![]))),
        3 => polygon_from_rings(coordinates).map(Polygonal::Polygon),
        n if n > 3 => multi_from_polygons(coordinates).map(Polygonal::MultiPolygon),
        _ => None,
    }
}

/// Nombre de niveaux de tableaux jusqu'au premier nombre.
///
/// Les tableaux vides et les valeurs non numériques sont sautés à chaque
/// niveau : `[[[]], [[[x, y], ...]]]` donne 4. `None` s'il n'y a aucun nombre.
fn nesting(value: &Value) -> Option<usize> {
    match value {
        Value::Number(_) => Some(0),
        Value::Array(items) => items.iter().find_map(nesting).map(|n| n + 1),
        _ => None,
    }
}

/// Position `[x, y, (z)]` ; arité ou type incorrect donne une coordonnée NaN
fn position(value: &Value) -> Option<Coord<f64>> {
    let items = value.as_array()?;
    let component = |i: usize| items.get(i).and_then(Value::as_f64).unwrap_or(f64::NAN);
    Some(coord! { x: component(0), y: component(1) })
}

fn ring_from_positions(value: &Value) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = value.as_array()?.iter().filter_map(position).collect();
    Some(LineString::new(coords))
}

fn polygon_from_rings(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = value.as_array()?.iter().filter_map(ring_from_positions);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn multi_from_polygons(value: &Value) -> Option<MultiPolygon<f64>> {
    let polygons = value
        .as_array()?
        .iter()
        .filter_map(polygon_from_rings)
        .collect();
    Some(MultiPolygon::new(polygons))
}

/// Identifiant d'une feature : `id` GeoJSON, sinon la première propriété connue
fn feature_id(value: &Value) -> Option<String> {
    let render = |v: &Value| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    if let Some(id) = value.get("id").and_then(render) {
        return Some(id);
    }

    let properties = value.get("properties")?;
    ID_PROPERTIES
        .iter()
        .find_map(|key| properties.get(*key).and_then(render))
}

impl Feature {
    /// Construit une feature depuis un objet GeoJSON `Feature`.
    ///
    /// Retourne `None` si la valeur n'est pas un objet.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let geometry = object
            .get("geometry")
            .filter(|g| !g.is_null())
            .and_then(polygonal_from_geometry);

        let properties = object
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Some(Self {
            id: feature_id(value),
            geometry,
            properties,
        })
    }
}

impl FeatureCollection {
    /// Construit une collection depuis un document GeoJSON.
    ///
    /// Accepte une `FeatureCollection`, une `Feature` isolée, un tableau de
    /// features ou tout objet portant un tableau `features`. Les entrées qui
    /// ne sont pas des objets sont ignorées.
    pub fn from_value(value: &Value, source_name: &str) -> Result<Self, WilayahError> {
        let entries: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(object) => {
                let kind = object.get("type").and_then(Value::as_str);
                match (kind, object.get("features").and_then(Value::as_array)) {
                    (Some("Feature"), _) => vec![value],
                    // Un tableau `features` suffit, avec ou sans `type`
                    (_, Some(features)) => features.iter().collect(),
                    (Some("FeatureCollection"), None) => {
                        return Err(WilayahError::invalid_document(
                            source_name,
                            "missing features array",
                        ))
                    }
                    (other, None) => {
                        return Err(WilayahError::invalid_document(
                            source_name,
                            format!("unexpected root type {:?}", other),
                        ))
                    }
                }
            }
            _ => {
                return Err(WilayahError::invalid_document(
                    source_name,
                    "root must be an object or an array",
                ))
            }
        };

        let features: Vec<Feature> = entries.into_iter().filter_map(Feature::from_value).collect();

        let without_geometry = features.iter().filter(|f| f.geometry.is_none()).count();
        if without_geometry > 0 {
            warn!(
                source = source_name,
                count = without_geometry,
                "Features without usable polygonal geometry"
            );
        }
        debug!(source = source_name, features = features.len(), "GeoJSON loaded");

        Ok(Self { features })
    }

    /// Parse un document GeoJSON depuis une chaîne
    pub fn from_json_str(json: &str, source_name: &str) -> Result<Self, WilayahError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, source_name)
    }

    /// Parse un document GeoJSON depuis un lecteur
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self, WilayahError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(&value, source_name)
    }

    /// Charge un fichier GeoJSON
    pub fn from_path(path: &Path) -> Result<Self, WilayahError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), &path.display().to_string())
    }
}
