//! Noyau géométrique : centroïde, surface, emprise, point dans polygone
//!
//! Fonctions pures sur des coordonnées lon/lat. Les coordonnées non finies
//! sont ignorées, jamais remplacées par zéro. Aucune fonction ne panique :
//! les cas dégénérés donnent un repli (emprise) ou `None`.

use geo::{coord, Coord, LineString, Rect};

use crate::types::Polygonal;

/// Surface (en degrés²) en dessous de laquelle un ring est considéré dégénéré
pub const AREA_EPSILON: f64 = 1e-10;

/// Approximation plate : 1 degré ≈ 111 km, quelle que soit la latitude
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Une coordonnée est valide si ses deux composantes sont finies
#[inline]
pub fn is_valid(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

/// Sommes de Shoelace sur un ring (paires consécutives, sans arête de fermeture)
struct ShoelaceSums {
    cross: f64,
    cx: f64,
    cy: f64,
}

fn shoelace(ring: &LineString<f64>) -> ShoelaceSums {
    let mut sums = ShoelaceSums {
        cross: 0.0,
        cx: 0.0,
        cy: 0.0,
    };

    for pair in ring.0.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !is_valid(a) || !is_valid(b) {
            continue;
        }
        let cross = a.x * b.y - b.x * a.y;
        sums.cross += cross;
        sums.cx += (a.x + b.x) * cross;
        sums.cy += (a.y + b.y) * cross;
    }

    sums
}

/// Centroïde pondéré d'un ring extérieur et sa surface signée (degrés²).
///
/// `None` si le ring a moins de 3 sommets ou une surface dégénérée.
fn ring_centroid(ring: &LineString<f64>) -> Option<(Coord<f64>, f64)> {
    if ring.0.len() < 3 {
        return None;
    }

    let sums = shoelace(ring);
    if sums.cross.abs() <= AREA_EPSILON {
        return None;
    }

    let area = sums.cross / 2.0;
    let centroid = coord! {
        x: sums.cx / (6.0 * area),
        y: sums.cy / (6.0 * area),
    };
    Some((centroid, area))
}

/// Centroïde d'un polygone ou multipolygone.
///
/// Formule de Shoelace sur le ring extérieur de chaque polygone, pondérée par
/// `|surface|` pour un multipolygone. Si aucun ring ne contribue (anneaux
/// colinéaires, moins de 3 sommets), repli sur le milieu de l'emprise de
/// toutes les coordonnées valides.
///
/// Retourne `None` si aucune coordonnée n'est valide ou si le résultat n'est
/// pas fini.
pub fn polygon_centroid(geometry: &Polygonal) -> Option<Coord<f64>> {
    let mut total_area = 0.0;
    let mut weighted_x = 0.0;
    let mut weighted_y = 0.0;

    for ring in geometry.exteriors() {
        if let Some((c, area)) = ring_centroid(ring) {
            let weight = area.abs();
            total_area += weight;
            weighted_x += c.x * weight;
            weighted_y += c.y * weight;
        }
    }

    if total_area > 0.0 {
        let centroid = coord! {
            x: weighted_x / total_area,
            y: weighted_y / total_area,
        };
        if is_valid(centroid) {
            return Some(centroid);
        }
    }

    // Repli : milieu de l'emprise
    let bbox = bounding_box(geometry)?;
    let center = bbox.center();
    is_valid(center).then_some(center)
}

/// Surface du ring extérieur en degrés², arête de fermeture incluse.
///
/// Pour un multipolygone, seul le premier polygone est mesuré.
/// `None` si moins de 3 sommets valides (le doublon de fermeture ne compte pas).
pub fn polygon_area_degrees(geometry: &Polygonal) -> Option<f64> {
    let ring = geometry.first_exterior()?;
    let coords = &ring.0;

    let mut vertices = coords.iter().filter(|c| is_valid(**c)).count();
    if ring.is_closed() && coords.len() > 1 && is_valid(coords[0]) {
        vertices -= 1;
    }
    if vertices < 3 {
        return None;
    }

    let mut sum = shoelace(ring).cross;

    // Arête last -> first, nulle si le ring est déjà fermé
    if let (Some(&last), Some(&first)) = (coords.last(), coords.first()) {
        if is_valid(last) && is_valid(first) {
            sum += last.x * first.y - first.x * last.y;
        }
    }

    Some(sum.abs() / 2.0)
}

/// Surface approximative en m².
///
/// Conversion plate `degrés² × 111 000²` : correcte à l'équateur, surestime
/// la surface quand on s'en éloigne. Suffisant pour un affichage, pas pour un
/// calcul de précision.
pub fn polygon_area(geometry: &Polygonal) -> Option<f64> {
    polygon_area_degrees(geometry).map(|deg2| deg2 * METERS_PER_DEGREE * METERS_PER_DEGREE)
}

/// Emprise de toutes les coordonnées valides (extérieurs et trous)
pub fn bounding_box(geometry: &Polygonal) -> Option<Rect<f64>> {
    coords_bounding_box(geometry.rings().into_iter().flat_map(|r| r.coords().copied()))
}

/// Emprise cumulée de plusieurs géométries (cadrage caméra sur une sélection)
pub fn bounding_box_union<'a, I>(geometries: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a Polygonal>,
{
    geometries
        .into_iter()
        .filter_map(bounding_box)
        .reduce(|acc, rect| {
            Rect::new(
                coord! { x: acc.min().x.min(rect.min().x), y: acc.min().y.min(rect.min().y) },
                coord! { x: acc.max().x.max(rect.max().x), y: acc.max().y.max(rect.max().y) },
            )
        })
}

fn coords_bounding_box(coords: impl Iterator<Item = Coord<f64>>) -> Option<Rect<f64>> {
    let mut min = coord! { x: f64::INFINITY, y: f64::INFINITY };
    let mut max = coord! { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
    let mut found = false;

    for c in coords.filter(|c| is_valid(*c)) {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
        found = true;
    }

    found.then(|| Rect::new(min, max))
}

/// Test point dans ring par lancer de rayon (règle pair-impair).
///
/// Seul le ring donné est testé, les trous ne sont pas gérés. Un point
/// exactement sur une arête peut tomber d'un côté ou de l'autre.
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    if !is_valid(point) {
        return false;
    }

    let vertices = &ring.0;
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Vrai si le point est dans au moins un ring extérieur
pub fn point_in_polygonal(point: Coord<f64>, geometry: &Polygonal) -> bool {
    geometry
        .exteriors()
        .into_iter()
        .any(|ring| point_in_ring(point, ring))
}
