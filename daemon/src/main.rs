//! Leuchtfeuer Daemon – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet die
//! Discovery.

use anyhow::Result;
use leuchtfeuer_daemon::{config::DaemonConfig, logging::logging_initialisieren, Daemon};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("LEUCHTFEUER_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = DaemonConfig::laden(&config_pfad)?;

    // Logging initialisieren
    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Leuchtfeuer Daemon wird initialisiert"
    );

    // Daemon starten
    let daemon = Daemon::neu(config);
    daemon.starten().await?;

    Ok(())
}
