//! leuchtfeuer-discovery – Discovery-Orchestrierung
//!
//! Baut auf dem sicheren Multicast-Transport auf: ein gecachtes
//! Beacon-Payload wird auf einem festen Timer an alle Gruppen gesendet
//! (und einmal sofort, sobald der Transport bereit ist). Eingehender
//! Klartext wird als JSON-Beacon geparst und als typisiertes Ereignis an
//! die Abonnenten weitergereicht.
//!
//! Die Beschaffung und Rotation des gemeinsamen Schluesselmaterials ist
//! Sache der aufrufenden Schicht; eine Rotation ersetzt die komplette
//! Instanz.

pub mod beacon;
pub mod leuchtfeuer;

pub use beacon::Beacon;
pub use leuchtfeuer::{Leuchtfeuer, LeuchtfeuerConfig, LeuchtfeuerEreignis};
