//! Fehlertypen fuer das Netzwerk-Subsystem

use leuchtfeuer_core::AdressFamilie;
use std::io;
use std::net::IpAddr;
use thiserror::Error;

/// Fehler im Netzwerk-Subsystem
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Unbekanntes Interface: {0}")]
    UnbekanntesInterface(String),

    #[error("Interface {interface} hat keine {familie}-Adresse")]
    KeineAdresseFuerFamilie {
        interface: String,
        familie: AdressFamilie,
    },

    #[error("Adresse {adresse} passt nicht zur Socket-Familie {familie}")]
    FamilieUnpassend {
        adresse: IpAddr,
        familie: AdressFamilie,
    },

    #[error("Beitritt zu Gruppe {gruppe} (Interface: {interface}) fehlgeschlagen: {quelle}")]
    GruppenBeitritt {
        gruppe: IpAddr,
        interface: String,
        #[source]
        quelle: io::Error,
    },

    #[error("Socket-Fehler: {0}")]
    Socket(#[from] io::Error),
}

pub type NetResult<T> = Result<T, NetError>;
