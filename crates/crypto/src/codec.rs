//! AEAD-Codec mit ChaCha20-Poly1305
//!
//! Verschluesselt Nutzdaten unter dem abgeleiteten Schluessel und bindet
//! einen Aufrufer-Kontext als AAD an jeden Umschlag. Der Kontext ist die
//! Netzwerkadresse des Absenders (`"<ip>:<port>"`): beim Senden die lokale
//! Adresse des Ausgangs-Interfaces, beim Empfangen die vom Socket
//! gemeldete Absenderadresse. Stimmen beide nicht Byte fuer Byte ueberein,
//! schlaegt die Entschluesselung geschlossen fehl – das bindet jeden
//! Umschlag an den beobachteten Netzwerk-Standort des Absenders.
//!
//! ## Umschlag-Format (exakte Byte-Offsets)
//! ```text
//! [auth_tag(16)] [nonce(12)] [ciphertext(n >= 0)]
//! ```
//! Gesamtlaenge < 28 Bytes ist ein fehlerhafter Umschlag.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use std::net::{IpAddr, SocketAddr};

use crate::error::{CryptoError, CryptoResult};
use crate::schluessel::SymmetrischerSchluessel;

/// Laenge des Poly1305-Auth-Tags in Bytes
pub const TAG_LAENGE: usize = 16;

/// Laenge der ChaCha20-Nonce in Bytes
pub const NONCE_LAENGE: usize = 12;

/// Minimale Umschlag-Laenge (Tag + Nonce, Ciphertext darf leer sein)
pub const UMSCHLAG_MIN_LAENGE: usize = TAG_LAENGE + NONCE_LAENGE;

// ---------------------------------------------------------------------------
// Kontext-Ableitung
// ---------------------------------------------------------------------------

/// Baut den AAD-Kontext aus einer Netzwerkadresse
///
/// Format ist `"<ip>:<port>"` ohne IPv6-Klammern und ohne Scope-ID, damit
/// Sende- und Empfangsseite unabhaengig von der Socket-Darstellung
/// identische Bytes ableiten.
pub fn adress_kontext(adresse: &SocketAddr) -> Vec<u8> {
    kontext_aus_teilen(&adresse.ip(), adresse.port())
}

/// Baut den AAD-Kontext aus IP-Adresse und Port
pub fn kontext_aus_teilen(ip: &IpAddr, port: u16) -> Vec<u8> {
    format!("{}:{}", ip, port).into_bytes()
}

// ---------------------------------------------------------------------------
// AeadCodec
// ---------------------------------------------------------------------------

/// Authentifizierende Verschluesselung fuer Leuchtfeuer-Datagramme
///
/// Besitzt den symmetrischen Schluessel exklusiv; der Schluessel lebt so
/// lange wie der Codec und wird mit ihm zerstoert.
pub struct AeadCodec {
    cipher: ChaCha20Poly1305,
}

impl AeadCodec {
    /// Erstellt einen Codec aus einem bereits abgeleiteten Schluessel
    pub fn neu(schluessel: SymmetrischerSchluessel) -> Self {
        let key = Key::from_slice(schluessel.as_bytes());
        Self {
            cipher: ChaCha20Poly1305::new(key),
        }
    }

    /// Leitet den Schluessel aus Passwort und Salt ab und erstellt den Codec
    pub fn aus_passwort(passwort: &[u8], salz: &[u8]) -> CryptoResult<Self> {
        let schluessel = SymmetrischerSchluessel::ableiten(passwort, salz)?;
        Ok(Self::neu(schluessel))
    }

    /// Verschluesselt Klartext unter frischer Zufalls-Nonce
    ///
    /// Die Nonce kommt pro Aufruf frisch aus dem CSPRNG und wird unter
    /// demselben Schluessel nie wiederverwendet. Rueckgabe ist der
    /// vollstaendige Umschlag `tag || nonce || ciphertext`.
    pub fn verschluesseln(&self, klartext: &[u8], kontext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LAENGE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // chacha20poly1305 liefert ciphertext || tag – fuer das Wire-Format
        // wird der Tag an den Anfang umsortiert
        let krypt_mit_tag = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: klartext,
                    aad: kontext,
                },
            )
            .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

        let krypt_laenge = krypt_mit_tag.len() - TAG_LAENGE;
        let mut umschlag = Vec::with_capacity(TAG_LAENGE + NONCE_LAENGE + krypt_laenge);
        umschlag.extend_from_slice(&krypt_mit_tag[krypt_laenge..]);
        umschlag.extend_from_slice(&nonce_bytes);
        umschlag.extend_from_slice(&krypt_mit_tag[..krypt_laenge]);
        Ok(umschlag)
    }

    /// Entschluesselt einen Umschlag und verifiziert Tag und AAD
    ///
    /// Alles-oder-nichts: bei jedem Fehler wird kein Klartext
    /// zurueckgegeben. Zu kurze Eingaben melden `UngueltigerUmschlag`,
    /// eine fehlgeschlagene Tag-Verifikation (falscher Schluessel,
    /// falscher Kontext oder manipulierte Bytes) meldet
    /// `AuthentifizierungFehlgeschlagen`.
    pub fn entschluesseln(&self, umschlag: &[u8], kontext: &[u8]) -> CryptoResult<Vec<u8>> {
        if umschlag.len() < UMSCHLAG_MIN_LAENGE {
            return Err(CryptoError::UngueltigerUmschlag {
                laenge: umschlag.len(),
                minimum: UMSCHLAG_MIN_LAENGE,
            });
        }

        let tag = &umschlag[..TAG_LAENGE];
        let nonce = Nonce::from_slice(&umschlag[TAG_LAENGE..UMSCHLAG_MIN_LAENGE]);
        let krypt = &umschlag[UMSCHLAG_MIN_LAENGE..];

        // Cipher-Eingabeformat ciphertext || tag wiederherstellen
        let mut krypt_mit_tag = Vec::with_capacity(krypt.len() + TAG_LAENGE);
        krypt_mit_tag.extend_from_slice(krypt);
        krypt_mit_tag.extend_from_slice(tag);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &krypt_mit_tag,
                    aad: kontext,
                },
            )
            .map_err(|_| CryptoError::AuthentifizierungFehlgeschlagen)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> AeadCodec {
        AeadCodec::aus_passwort(b"password", b"salt").unwrap()
    }

    #[test]
    fn verschluesseln_und_entschluesseln() {
        let codec = test_codec();
        let kontext = b"192.168.1.10:41234";

        let umschlag = codec.verschluesseln(b"TEST", kontext).unwrap();
        assert_eq!(umschlag.len(), UMSCHLAG_MIN_LAENGE + 4);

        let klartext = codec.entschluesseln(&umschlag, kontext).unwrap();
        assert_eq!(klartext, b"TEST");
    }

    #[test]
    fn leerer_klartext_ist_gueltig() {
        let codec = test_codec();
        let umschlag = codec.verschluesseln(b"", b"ctx").unwrap();
        assert_eq!(umschlag.len(), UMSCHLAG_MIN_LAENGE);
        assert_eq!(codec.entschluesseln(&umschlag, b"ctx").unwrap(), b"");
    }

    #[test]
    fn falscher_kontext_wird_abgelehnt() {
        let codec = test_codec();
        let umschlag = codec.verschluesseln(b"TEST", b"open context").unwrap();

        let fehler = codec.entschluesseln(&umschlag, b"not context").unwrap_err();
        assert!(fehler.ist_authentifizierungsfehler());
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let sender = test_codec();
        let empfaenger = AeadCodec::aus_passwort(b"not password", b"salt").unwrap();

        let umschlag = sender.verschluesseln(b"TEST", b"ctx").unwrap();
        let fehler = empfaenger.entschluesseln(&umschlag, b"ctx").unwrap_err();
        assert!(fehler.ist_authentifizierungsfehler());
    }

    #[test]
    fn jedes_gekippte_bit_wird_erkannt() {
        let codec = test_codec();
        let kontext = b"10.0.0.1:41234";
        let umschlag = codec.verschluesseln(b"hello", kontext).unwrap();

        // Einzelne Bit-Kipper in Tag, Nonce und Ciphertext muessen alle
        // als Authentifizierungsfehler enden
        for byte_index in 0..umschlag.len() {
            for bit in 0..8 {
                let mut manipuliert = umschlag.clone();
                manipuliert[byte_index] ^= 1 << bit;

                let fehler = codec.entschluesseln(&manipuliert, kontext).unwrap_err();
                assert!(
                    fehler.ist_authentifizierungsfehler(),
                    "Byte {} Bit {} nicht erkannt",
                    byte_index,
                    bit
                );
            }
        }
    }

    #[test]
    fn zu_kurzer_umschlag_ist_fehlerhaft() {
        let codec = test_codec();

        for laenge in 0..UMSCHLAG_MIN_LAENGE {
            let eingabe = vec![0u8; laenge];
            let fehler = codec.entschluesseln(&eingabe, b"ctx").unwrap_err();
            // Nie als Authentifizierungsfehler melden – Aufrufer
            // unterscheiden die beiden Faelle
            assert!(matches!(
                fehler,
                CryptoError::UngueltigerUmschlag { laenge: l, .. } if l == laenge
            ));
        }
    }

    #[test]
    fn nonce_wird_nicht_wiederverwendet() {
        let codec = test_codec();
        let a = codec.verschluesseln(b"x", b"ctx").unwrap();
        let b = codec.verschluesseln(b"x", b"ctx").unwrap();
        assert_ne!(
            a[TAG_LAENGE..UMSCHLAG_MIN_LAENGE],
            b[TAG_LAENGE..UMSCHLAG_MIN_LAENGE]
        );
    }

    #[test]
    fn kontext_format() {
        let v4: SocketAddr = "192.168.1.10:41234".parse().unwrap();
        assert_eq!(adress_kontext(&v4), b"192.168.1.10:41234");

        let v6: SocketAddr = "[fe80::1]:41234".parse().unwrap();
        assert_eq!(adress_kontext(&v6), b"fe80::1:41234");
    }
}
