//! Fehlertypen fuer den Multicast-Transport
//!
//! Nur Konstruktionsfehler werden synchron gemeldet; alle Laufzeitfehler
//! fliessen als Ereignisse ueber den Broadcast-Kanal.

use leuchtfeuer_crypto::CryptoError;
use leuchtfeuer_net::NetError;
use thiserror::Error;

/// Fehler bei Konstruktion und Start des Transports
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Netzwerkfehler: {0}")]
    Netz(#[from] NetError),

    #[error("Kryptografiefehler: {0}")]
    Krypto(#[from] CryptoError),
}

pub type TransportResult<T> = Result<T, TransportError>;
