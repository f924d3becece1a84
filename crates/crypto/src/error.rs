//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
///
/// `AuthentifizierungFehlgeschlagen` ist ein eigener Fehler-Typ, damit
/// Aufrufer ueber den Enum-Diskriminanten reagieren koennen und nie auf
/// Fehlertexte der Cipher-Implementierung angewiesen sind.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Authentifizierung fehlgeschlagen: Auth-Tag konnte nicht verifiziert werden")]
    AuthentifizierungFehlgeschlagen,

    #[error("Ungueltiger Umschlag: {laenge} Bytes (Minimum: {minimum} Bytes)")]
    UngueltigerUmschlag { laenge: usize, minimum: usize },

    #[error("Schluessel-Ableitung fehlgeschlagen: {0}")]
    SchluesselAbleitung(String),

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Passwort darf nicht leer sein")]
    FehlendesPasswort,

    #[error("Salt darf nicht leer sein")]
    FehlendesSalz,
}

impl CryptoError {
    /// Prueft ob der Fehler eine fehlgeschlagene Tag-Verifikation ist
    ///
    /// Aufrufer behandeln diesen Fall anders als alle uebrigen Fehler
    /// (stilles Verwerfen statt lautem Loggen).
    pub fn ist_authentifizierungsfehler(&self) -> bool {
        matches!(self, CryptoError::AuthentifizierungFehlgeschlagen)
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
