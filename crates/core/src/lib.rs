//! leuchtfeuer-core – Gemeinsame Typen, Ereignisse und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Leuchtfeuer-Crates gemeinsam genutzt werden.

pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{LeuchtfeuerError, Result};
pub use event::TransportEreignis;
pub use types::{AdressFamilie, InterfaceBeschreibung};
