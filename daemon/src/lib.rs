//! leuchtfeuer-daemon – Bibliotheks-Root
//!
//! Deklariert die Daemon-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;
pub mod logging;

use anyhow::Result;
use config::DaemonConfig;
use leuchtfeuer_discovery::{Leuchtfeuer, LeuchtfeuerEreignis};
use tokio::sync::broadcast;

/// Haelt den laufenden Daemon-Zustand zusammen
pub struct Daemon {
    pub config: DaemonConfig,
}

impl Daemon {
    /// Erstellt einen neuen Daemon aus der gegebenen Konfiguration
    pub fn neu(config: DaemonConfig) -> Self {
        Self { config }
    }

    /// Startet die Discovery und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration in typisierte Leuchtfeuer-Konfiguration uebersetzen
    /// 2. Leuchtfeuer-Instanz erstellen und starten
    /// 3. Ereignisse loggen bis Ctrl-C eintrifft
    pub async fn starten(self) -> Result<()> {
        let lf_config = self.config.in_leuchtfeuer_config()?;

        tracing::info!(
            familie = %lf_config.transport.familie,
            port = lf_config.transport.port,
            name = %lf_config.name,
            "Daemon startet"
        );

        let leuchtfeuer = Leuchtfeuer::neu(lf_config)?;
        let mut ereignisse = leuchtfeuer.ereignisse();
        leuchtfeuer.starten().await?;

        loop {
            tokio::select! {
                ereignis = ereignisse.recv() => match ereignis {
                    Ok(LeuchtfeuerEreignis::Bereit) => {
                        tracing::info!("Discovery bereit");
                    }
                    Ok(LeuchtfeuerEreignis::BeaconEmpfangen { beacon, absender }) => {
                        tracing::info!(
                            instanz = %beacon.instanz_id,
                            name = %beacon.name,
                            absender = %absender,
                            "Instanz entdeckt"
                        );
                    }
                    Ok(LeuchtfeuerEreignis::NachrichtEmpfangen { daten, absender }) => {
                        tracing::info!(absender = %absender, daten = %daten, "Nachricht empfangen");
                    }
                    Ok(LeuchtfeuerEreignis::NichtAuthentifiziert { absender }) => {
                        tracing::warn!(absender = %absender, "Nicht authentifiziertes Datagramm");
                    }
                    Ok(LeuchtfeuerEreignis::Fehler { beschreibung }) => {
                        tracing::error!(fehler = %beschreibung, "Discovery-Fehler");
                    }
                    Err(broadcast::error::RecvError::Lagged(anzahl)) => {
                        tracing::warn!(anzahl, "Ereignisse verpasst");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown-Signal empfangen");
                    break;
                }
            }
        }

        leuchtfeuer.schliessen();
        Ok(())
    }
}
