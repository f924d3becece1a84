//! Grundlegende Netzwerk-Typen
//!
//! Definiert die Adressfamilie, die Interface-Beschreibung und die
//! wohlbekannten Standardwerte des Leuchtfeuer-Protokolls.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Wohlbekannter UDP-Port fuer Leuchtfeuer-Datagramme
pub const STANDARD_PORT: u16 = 41234;

/// Standard-Multicast-Gruppe fuer IPv4 (All-Hosts im Segment)
pub const STANDARD_GRUPPE_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 1);

/// Standard-Multicast-Gruppe fuer IPv6 (All-Nodes, link-local Scope)
pub const STANDARD_GRUPPE_V6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);

/// Standard-Intervall fuer die Aktualisierung des Interface-Schnappschusses
pub const STANDARD_AKTUALISIERUNGS_INTERVALL_MS: u64 = 60_000;

// ---------------------------------------------------------------------------
// AdressFamilie
// ---------------------------------------------------------------------------

/// Adressfamilie des Sockets und der Interface-Filterung
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdressFamilie {
    /// IPv4 (Standard)
    #[default]
    V4,
    /// IPv6
    V6,
}

impl AdressFamilie {
    /// Prueft ob die gegebene IP-Adresse zu dieser Familie gehoert
    pub fn passt_zu(&self, adresse: &IpAddr) -> bool {
        match self {
            AdressFamilie::V4 => adresse.is_ipv4(),
            AdressFamilie::V6 => adresse.is_ipv6(),
        }
    }

    /// Gibt die wohlbekannte Standard-Multicast-Gruppe der Familie zurueck
    pub fn standard_gruppe(&self) -> IpAddr {
        match self {
            AdressFamilie::V4 => IpAddr::V4(STANDARD_GRUPPE_V4),
            AdressFamilie::V6 => IpAddr::V6(STANDARD_GRUPPE_V6),
        }
    }

    /// Gibt die unspezifizierte Bind-Adresse der Familie zurueck
    pub fn unspezifiziert(&self) -> IpAddr {
        match self {
            AdressFamilie::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AdressFamilie::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

impl std::fmt::Display for AdressFamilie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdressFamilie::V4 => write!(f, "ipv4"),
            AdressFamilie::V6 => write!(f, "ipv6"),
        }
    }
}

impl std::str::FromStr for AdressFamilie {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4" => Ok(Self::V4),
            "ipv6" => Ok(Self::V6),
            other => Err(format!("Unbekannte Adressfamilie: '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// InterfaceBeschreibung
// ---------------------------------------------------------------------------

/// Beschreibung eines Netzwerk-Interfaces aus dem OS-Schnappschuss
///
/// Ein Interface mit mehreren Adressen erscheint im Schnappschuss als
/// mehrere Eintraege mit demselben Namen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceBeschreibung {
    /// Interface-Name (z.B. "eth0")
    pub name: String,
    /// Adressfamilie dieses Eintrags
    pub familie: AdressFamilie,
    /// IP-Adresse dieses Eintrags
    pub adresse: IpAddr,
    /// OS-Interface-Index (fuer IPv6-Gruppenoperationen benoetigt)
    pub index: Option<u32>,
    /// Internes Interface (Loopback)
    pub intern: bool,
}

impl InterfaceBeschreibung {
    /// Erstellt eine neue Interface-Beschreibung
    pub fn neu(name: impl Into<String>, adresse: IpAddr, index: Option<u32>, intern: bool) -> Self {
        let familie = if adresse.is_ipv4() {
            AdressFamilie::V4
        } else {
            AdressFamilie::V6
        };
        Self {
            name: name.into(),
            familie,
            adresse,
            index,
            intern,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn familie_display_und_parse() {
        assert_eq!(AdressFamilie::V4.to_string(), "ipv4");
        assert_eq!(AdressFamilie::V6.to_string(), "ipv6");

        let parsed: AdressFamilie = "ipv6".parse().unwrap();
        assert_eq!(parsed, AdressFamilie::V6);

        let err = "ipv5".parse::<AdressFamilie>();
        assert!(err.is_err());
    }

    #[test]
    fn familie_standard_ist_v4() {
        assert_eq!(AdressFamilie::default(), AdressFamilie::V4);
    }

    #[test]
    fn familie_passt_zu_adresse() {
        let v4: IpAddr = "192.168.1.10".parse().unwrap();
        let v6: IpAddr = "fe80::1".parse().unwrap();

        assert!(AdressFamilie::V4.passt_zu(&v4));
        assert!(!AdressFamilie::V4.passt_zu(&v6));
        assert!(AdressFamilie::V6.passt_zu(&v6));
        assert!(!AdressFamilie::V6.passt_zu(&v4));
    }

    #[test]
    fn standard_gruppen_passen_zur_familie() {
        assert!(AdressFamilie::V4.passt_zu(&AdressFamilie::V4.standard_gruppe()));
        assert!(AdressFamilie::V6.passt_zu(&AdressFamilie::V6.standard_gruppe()));
        assert!(AdressFamilie::V4.standard_gruppe().is_multicast());
        assert!(AdressFamilie::V6.standard_gruppe().is_multicast());
    }

    #[test]
    fn beschreibung_leitet_familie_ab() {
        let b = InterfaceBeschreibung::neu("eth0", "10.0.0.2".parse().unwrap(), Some(2), false);
        assert_eq!(b.familie, AdressFamilie::V4);

        let b6 = InterfaceBeschreibung::neu("eth0", "fe80::2".parse().unwrap(), Some(2), false);
        assert_eq!(b6.familie, AdressFamilie::V6);
    }
}
