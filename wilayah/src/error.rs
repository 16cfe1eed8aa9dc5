//! Types d'erreurs pour le crate wilayah

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement d'un document GeoJSON.
///
/// Le noyau géométrique et l'agrégation ne retournent jamais d'erreur :
/// seules les erreurs au niveau du document remontent ici.
#[derive(Debug, Error)]
pub enum WilayahError {
    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document JSON valide mais qui n'est pas une collection de features
    #[error("Invalid GeoJSON document in {source_name}: {reason}")]
    InvalidDocument {
        source_name: String,
        reason: String,
    },
}

impl WilayahError {
    /// Crée une erreur de document invalide avec contexte
    pub fn invalid_document(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
