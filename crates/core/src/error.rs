//! Fehlertypen fuer Leuchtfeuer
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule definieren eigene Fehler und konvertieren an der
//! Crate-Grenze in diesen Typ.

use thiserror::Error;

/// Globaler Result-Alias fuer Leuchtfeuer
pub type Result<T> = std::result::Result<T, LeuchtfeuerError>;

/// Alle moeglichen Fehler im Leuchtfeuer-System
#[derive(Debug, Error)]
pub enum LeuchtfeuerError {
    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Netzwerk ---
    #[error("Netzwerkfehler: {0}")]
    Netzwerk(String),

    // --- Kryptografie ---
    #[error("Kryptografiefehler: {0}")]
    Krypto(String),

    // --- Serialisierung ---
    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl LeuchtfeuerError {
    /// Erstellt einen Konfigurationsfehler aus einer beliebigen Nachricht
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }

    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = LeuchtfeuerError::Konfiguration("Passwort fehlt".into());
        assert_eq!(e.to_string(), "Konfigurationsfehler: Passwort fehlt");
    }

    #[test]
    fn konstruktor_helfer() {
        assert!(matches!(
            LeuchtfeuerError::konfiguration("x"),
            LeuchtfeuerError::Konfiguration(_)
        ));
        assert!(matches!(
            LeuchtfeuerError::intern("x"),
            LeuchtfeuerError::Intern(_)
        ));
    }
}
