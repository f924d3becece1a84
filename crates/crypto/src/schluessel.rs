//! Schluessel-Ableitung mit Scrypt
//!
//! Leitet aus einem gemeinsamen Passwort und Salt einen 32-Byte-Schluessel
//! ab. Scrypt ist bewusst speicher- und rechenintensiv, damit eine
//! Woerterbuch-Suche ueber den Passwortraum teuer bleibt.
//!
//! Parameter N=2^14, r=8, p=1 entsprechen den gaengigen Empfehlungen fuer
//! interaktive Passwort-Ableitung. Die Ableitung ist deterministisch:
//! identische Eingaben liefern identische Schluessel.

use scrypt::{scrypt, Params};

use crate::error::{CryptoError, CryptoResult};

/// Laenge des abgeleiteten symmetrischen Schluessels in Bytes
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Scrypt-Kostenparameter: log2(N) = 14, also N = 16384
const SCRYPT_LOG_N: u8 = 14;
/// Scrypt-Blockgroesse
const SCRYPT_R: u32 = 8;
/// Scrypt-Parallelismus
const SCRYPT_P: u32 = 1;

// ---------------------------------------------------------------------------
// SymmetrischerSchluessel
// ---------------------------------------------------------------------------

/// Abgeleiteter symmetrischer Schluessel (exakt 32 Bytes)
///
/// Wird einmalig bei der Konstruktion abgeleitet und danach nie veraendert.
/// Die `Debug`-Ausgabe gibt das Schluesselmaterial nicht preis.
pub struct SymmetrischerSchluessel([u8; SCHLUESSEL_LAENGE]);

impl SymmetrischerSchluessel {
    /// Leitet einen Schluessel aus Passwort und Salt ab
    ///
    /// Beide Eingaben sind Pflicht; leere Eingaben sind ein
    /// Konstruktionsfehler.
    pub fn ableiten(passwort: &[u8], salz: &[u8]) -> CryptoResult<Self> {
        if passwort.is_empty() {
            return Err(CryptoError::FehlendesPasswort);
        }
        if salz.is_empty() {
            return Err(CryptoError::FehlendesSalz);
        }

        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCHLUESSEL_LAENGE)
            .map_err(|e| CryptoError::SchluesselAbleitung(e.to_string()))?;

        let mut schluessel = [0u8; SCHLUESSEL_LAENGE];
        scrypt(passwort, salz, &params, &mut schluessel)
            .map_err(|e| CryptoError::SchluesselAbleitung(e.to_string()))?;

        Ok(Self(schluessel))
    }

    /// Gibt das rohe Schluesselmaterial zurueck
    pub fn as_bytes(&self) -> &[u8; SCHLUESSEL_LAENGE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetrischerSchluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetrischerSchluessel([geschwaerzt])")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ableitung_ist_deterministisch() {
        let a = SymmetrischerSchluessel::ableiten(b"password", b"salt").unwrap();
        let b = SymmetrischerSchluessel::ableiten(b"password", b"salt").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn anderes_passwort_anderer_schluessel() {
        let a = SymmetrischerSchluessel::ableiten(b"password", b"salt").unwrap();
        let b = SymmetrischerSchluessel::ableiten(b"Passwort", b"salt").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn anderes_salz_anderer_schluessel() {
        let a = SymmetrischerSchluessel::ableiten(b"password", b"salt").unwrap();
        let b = SymmetrischerSchluessel::ableiten(b"password", b"pepper").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn leere_eingaben_werden_abgelehnt() {
        assert!(matches!(
            SymmetrischerSchluessel::ableiten(b"", b"salt"),
            Err(CryptoError::FehlendesPasswort)
        ));
        assert!(matches!(
            SymmetrischerSchluessel::ableiten(b"password", b""),
            Err(CryptoError::FehlendesSalz)
        ));
    }

    #[test]
    fn debug_gibt_kein_material_preis() {
        let schluessel = SymmetrischerSchluessel::ableiten(b"password", b"salt").unwrap();
        let debug = format!("{:?}", schluessel);
        assert!(!debug.contains("ff"));
        assert!(debug.contains("geschwaerzt"));
    }
}
