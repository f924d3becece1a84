//! Transport-Konfiguration

use leuchtfeuer_core::types::{AdressFamilie, STANDARD_AKTUALISIERUNGS_INTERVALL_MS, STANDARD_PORT};
use std::net::IpAddr;

use crate::error::{TransportError, TransportResult};

/// Konfiguration des Multicast-Transports
///
/// Alle Felder haben sinnvolle Standardwerte. Eine leere Gruppenliste
/// wird bei der Konstruktion durch die wohlbekannte All-Hosts-Gruppe der
/// Familie ersetzt, eine leere Interface-Liste durch die automatisch
/// entdeckten nicht-internen Interfaces.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Adressfamilie des Sockets und der Interface-Filterung
    pub familie: AdressFamilie,
    /// Multicast-Gruppen (leer = Standard-Gruppe der Familie)
    pub gruppen: Vec<IpAddr>,
    /// Interface-Namen (leer = automatische Entdeckung)
    pub interfaces: Vec<String>,
    /// UDP-Port
    pub port: u16,
    /// Intervall der Interface-Schnappschuss-Aktualisierung
    pub aktualisierungs_intervall_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            familie: AdressFamilie::default(),
            gruppen: Vec::new(),
            interfaces: Vec::new(),
            port: STANDARD_PORT,
            aktualisierungs_intervall_ms: STANDARD_AKTUALISIERUNGS_INTERVALL_MS,
        }
    }
}

impl TransportConfig {
    /// Ersetzt eine leere Gruppenliste durch die Standard-Gruppe
    pub(crate) fn normalisieren(mut self) -> Self {
        if self.gruppen.is_empty() {
            self.gruppen.push(self.familie.standard_gruppe());
        }
        self
    }

    /// Prueft die Gruppenliste gegen die konfigurierte Familie
    pub(crate) fn pruefen(&self) -> TransportResult<()> {
        for gruppe in &self.gruppen {
            if !self.familie.passt_zu(gruppe) {
                return Err(TransportError::Konfiguration(format!(
                    "Gruppe {} passt nicht zur Adressfamilie {}",
                    gruppe, self.familie
                )));
            }
            if !gruppe.is_multicast() {
                return Err(TransportError::Konfiguration(format!(
                    "Adresse {} ist keine Multicast-Gruppe",
                    gruppe
                )));
            }
        }
        Ok(())
    }
}
