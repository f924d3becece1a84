//! Daemon-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte – bis auf Passwort und Salt, die ohne
//! Konfigurationsdatei leer bleiben und dann beim Start abgelehnt werden.

use leuchtfeuer_core::types::{
    AdressFamilie, STANDARD_AKTUALISIERUNGS_INTERVALL_MS, STANDARD_PORT,
};
use leuchtfeuer_core::{LeuchtfeuerError, Result};
use leuchtfeuer_discovery::{leuchtfeuer::STANDARD_BROADCAST_INTERVALL_MS, LeuchtfeuerConfig};
use leuchtfeuer_transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Vollstaendige Daemon-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Schluessel-Einstellungen
    pub krypto: KryptoEinstellungen,
    /// Beacon-Einstellungen
    pub beacon: BeaconEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Adressfamilie: "ipv4" oder "ipv6"
    pub familie: String,
    /// Multicast-Gruppen (leer = Standard-Gruppe der Familie)
    pub gruppen: Vec<String>,
    /// Interface-Namen (leer = automatische Entdeckung)
    pub interfaces: Vec<String>,
    /// UDP-Port
    pub port: u16,
    /// Intervall der Interface-Aktualisierung in Millisekunden
    pub aktualisierungs_intervall_ms: u64,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            familie: AdressFamilie::default().to_string(),
            gruppen: Vec::new(),
            interfaces: Vec::new(),
            port: STANDARD_PORT,
            aktualisierungs_intervall_ms: STANDARD_AKTUALISIERUNGS_INTERVALL_MS,
        }
    }
}

/// Schluessel-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KryptoEinstellungen {
    /// Gemeinsames Passwort (Pflicht)
    pub passwort: String,
    /// Gemeinsames Salt (Pflicht)
    pub salz: String,
}

/// Beacon-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconEinstellungen {
    /// Anzeigename dieser Instanz
    pub name: String,
    /// Intervall zwischen zwei Aussendungen in Millisekunden
    pub intervall_ms: u64,
}

impl Default for BeaconEinstellungen {
    fn default() -> Self {
        Self {
            name: "leuchtfeuer".into(),
            intervall_ms: STANDARD_BROADCAST_INTERVALL_MS,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: trace/debug/info/warn/error
    pub level: String,
    /// Format: "text" oder "json"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl DaemonConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei
    ///
    /// Fehlt die Datei, gelten die Standardwerte.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        if !std::path::Path::new(pfad).exists() {
            tracing::debug!(pfad = %pfad, "Keine Konfigurationsdatei – Standardwerte");
            return Ok(Self::default());
        }
        let inhalt = std::fs::read_to_string(pfad)?;
        Ok(toml::from_str(&inhalt)?)
    }

    /// Uebersetzt die Datei-Konfiguration in die typisierte
    /// Leuchtfeuer-Konfiguration
    ///
    /// Skalar-Validierung (Familie, Gruppenadressen) passiert hier und
    /// ist beim Start fatal.
    pub fn in_leuchtfeuer_config(&self) -> Result<LeuchtfeuerConfig> {
        let familie: AdressFamilie = self
            .netzwerk
            .familie
            .parse()
            .map_err(LeuchtfeuerError::Konfiguration)?;

        let mut gruppen: Vec<IpAddr> = Vec::with_capacity(self.netzwerk.gruppen.len());
        for gruppe in &self.netzwerk.gruppen {
            let adresse = gruppe.parse().map_err(|_| {
                LeuchtfeuerError::konfiguration(format!("Ungueltige Gruppenadresse: '{}'", gruppe))
            })?;
            gruppen.push(adresse);
        }

        Ok(LeuchtfeuerConfig {
            transport: TransportConfig {
                familie,
                gruppen,
                interfaces: self.netzwerk.interfaces.clone(),
                port: self.netzwerk.port,
                aktualisierungs_intervall_ms: self.netzwerk.aktualisierungs_intervall_ms,
            },
            passwort: self.krypto.passwort.clone(),
            salz: self.krypto.salz.clone(),
            name: self.beacon.name.clone(),
            broadcast_intervall_ms: self.beacon.intervall_ms,
            beacon_daten: serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
            }),
        })
    }
}
