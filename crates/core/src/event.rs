//! Transport-Ereignisse
//!
//! Typisiertes Ereignis-Enum das der Transport ueber einen
//! tokio-Broadcast-Kanal an alle Abonnenten verteilt. Mehrere Konsumenten
//! koennen unabhaengig voneinander abonnieren; es gibt keine dynamische
//! Listener-Registrierung.

use std::net::SocketAddr;

/// Alle Ereignisse die ein Multicast-Transport an seine Abonnenten meldet
#[derive(Debug, Clone)]
pub enum TransportEreignis {
    /// Socket gebunden und alle Gruppen-Beitritte versucht
    Bereit,

    /// Authentifizierte Nachricht empfangen (entschluesselter Klartext)
    Nachricht {
        /// Entschluesselte Nutzdaten
        daten: Vec<u8>,
        /// Absender-Endpunkt des Datagramms
        absender: SocketAddr,
    },

    /// Datagramm empfangen dessen Auth-Tag nicht verifiziert werden konnte
    ///
    /// Eigener Ereignis-Typ, damit gefaelschter oder relayter Verkehr von
    /// echten Transportfehlern unterschieden werden kann. Wird nie als
    /// generischer Fehler gemeldet.
    NichtAuthentifiziert {
        /// Absender-Endpunkt des verworfenen Datagramms
        absender: SocketAddr,
    },

    /// Alle uebrigen Laufzeitfehler (Socket, fehlerhafte Umschlaege,
    /// fehlgeschlagene Einzel-Sendungen im Fan-Out)
    Fehler {
        /// Menschenlesbare Beschreibung
        beschreibung: String,
    },
}

impl TransportEreignis {
    /// Prueft ob das Ereignis ein Fehler-Ereignis ist
    pub fn ist_fehler(&self) -> bool {
        matches!(self, TransportEreignis::Fehler { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_erkennung() {
        let e = TransportEreignis::Fehler {
            beschreibung: "test".into(),
        };
        assert!(e.ist_fehler());
        assert!(!TransportEreignis::Bereit.ist_fehler());
    }
}
