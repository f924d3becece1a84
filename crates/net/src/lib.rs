//! leuchtfeuer-net – Interface-Aufloesung und Multicast-Gruppenverwaltung
//!
//! Zwei Bausteine:
//! - `InterfaceAufloeser`: periodisch aktualisierter Schnappschuss der
//!   OS-Netzwerk-Interfaces mit Familien-Filterung und Validierung.
//! - `MulticastGruppenManager`: besitzt den UDP-Socket, tritt Gruppen pro
//!   Interface bei und waehlt vor jedem Senden das Ausgangs-Interface.

pub mod error;
pub mod interfaces;
pub mod multicast;

pub use error::{NetError, NetResult};
pub use interfaces::{AktualisierungsHandle, InterfaceAufloeser};
pub use multicast::MulticastGruppenManager;
