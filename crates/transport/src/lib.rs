//! leuchtfeuer-transport – Sicherer Multicast-Transport
//!
//! Komponiert Codec, Interface-Aufloeser und Gruppenmanager zu einem
//! Transport: eingehende Datagramme werden mit der beobachteten
//! Absenderadresse als AAD entschluesselt, ausgehende Nachrichten pro
//! (Interface x Gruppe)-Paar mit der lokalen Interface-Adresse als AAD
//! verschluesselt und verteilt.
//!
//! ## Datenfluss
//!
//! ```text
//! UDP recv_from
//!     |
//!     v
//! AeadCodec::entschluesseln(umschlag, AAD = Absenderadresse)
//!     |
//!     +--> Nachricht-Ereignis (Klartext)
//!     +--> NichtAuthentifiziert-Ereignis (Tag-Verifikation fehlgeschlagen)
//!     +--> Fehler-Ereignis (alles uebrige)
//!
//! nachricht_senden(klartext)
//!     |
//!     v  pro Interface, pro Gruppe:
//! Ausgangs-Interface setzen
//! AeadCodec::verschluesseln(klartext, AAD = lokale Interface-Adresse)
//! UDP send_to(gruppe, port)
//! ```

pub mod config;
pub mod error;
pub mod transport;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use transport::{MulticastTransport, TransportZustand};
