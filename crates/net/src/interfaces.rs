//! Interface-Aufloeser – gecachter Schnappschuss der OS-Netzwerk-Interfaces
//!
//! Liest die Interface-Liste ueber `if-addrs` und haelt sie in einem
//! RwLock-geschuetzten Cache, der auf einem festen Timer neu aufgenommen
//! wird. Zwischen zwei Aktualisierungen kann eine veraltete Adresse
//! geliefert werden, wenn sich das Interface zwischenzeitlich geaendert
//! hat – ein akzeptiertes Staleness-Fenster.
//!
//! Der Cache gehoert exklusiv zu einer Aufloeser-Instanz; es gibt keinen
//! modulglobalen Zustand.

use leuchtfeuer_core::{AdressFamilie, InterfaceBeschreibung};
use parking_lot::RwLock;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NetError, NetResult};

// ---------------------------------------------------------------------------
// InterfaceAufloeser
// ---------------------------------------------------------------------------

/// Aufloeser fuer Interface-Namen zu aktuellen Adressen
pub struct InterfaceAufloeser {
    cache: RwLock<Vec<InterfaceBeschreibung>>,
}

impl InterfaceAufloeser {
    /// Erstellt einen Aufloeser und nimmt sofort den ersten Schnappschuss
    pub fn neu() -> NetResult<Self> {
        Ok(Self {
            cache: RwLock::new(schnappschuss_erstellen()?),
        })
    }

    /// Erstellt einen Aufloeser aus einem vorgegebenen Schnappschuss
    ///
    /// Fuer Tests, die ohne echte OS-Interfaces auskommen muessen.
    pub fn aus_schnappschuss(eintraege: Vec<InterfaceBeschreibung>) -> Self {
        Self {
            cache: RwLock::new(eintraege),
        }
    }

    /// Nimmt den Schnappschuss neu auf und ersetzt den Cache
    pub fn aktualisieren(&self) -> NetResult<()> {
        let neu = schnappschuss_erstellen()?;
        tracing::debug!(eintraege = neu.len(), "Interface-Schnappschuss aktualisiert");
        *self.cache.write() = neu;
        Ok(())
    }

    /// Gibt eine Kopie des aktuellen Schnappschusses zurueck
    pub fn schnappschuss(&self) -> Vec<InterfaceBeschreibung> {
        self.cache.read().clone()
    }

    /// Namen aller nicht-internen Interfaces mit mindestens einer Adresse
    /// der gewuenschten Familie
    ///
    /// Reihenfolge des Schnappschusses bleibt erhalten, Duplikate (mehrere
    /// Adressen pro Interface) werden entfernt. Wird verwendet wenn keine
    /// explizite Interface-Liste konfiguriert ist.
    pub fn standard_interfaces(&self, familie: AdressFamilie) -> Vec<String> {
        let cache = self.cache.read();
        let mut namen: Vec<String> = Vec::new();
        for eintrag in cache.iter() {
            if eintrag.intern || eintrag.familie != familie {
                continue;
            }
            if !namen.iter().any(|n| n == &eintrag.name) {
                namen.push(eintrag.name.clone());
            }
        }
        namen
    }

    /// Validiert eine explizit konfigurierte Interface-Liste
    ///
    /// Schlaegt fehl wenn ein Name im Schnappschuss fehlt oder das
    /// Interface keine Adresse der geforderten Familie traegt.
    pub fn validieren(&self, namen: &[String], familie: AdressFamilie) -> NetResult<()> {
        for name in namen {
            self.beschreibung_von(name, familie)?;
        }
        Ok(())
    }

    /// Loest einen Interface-Namen zur aktuellen Adresse der Familie auf
    pub fn adresse_von(&self, name: &str, familie: AdressFamilie) -> NetResult<IpAddr> {
        self.beschreibung_von(name, familie).map(|b| b.adresse)
    }

    /// Loest einen Interface-Namen zur vollstaendigen Beschreibung auf
    ///
    /// Die Beschreibung traegt neben der Adresse auch den OS-Index, den
    /// IPv6-Gruppenoperationen benoetigen.
    pub fn beschreibung_von(
        &self,
        name: &str,
        familie: AdressFamilie,
    ) -> NetResult<InterfaceBeschreibung> {
        let cache = self.cache.read();

        let mut gefunden = false;
        for eintrag in cache.iter() {
            if eintrag.name != name {
                continue;
            }
            gefunden = true;
            if eintrag.familie == familie {
                return Ok(eintrag.clone());
            }
        }

        if gefunden {
            Err(NetError::KeineAdresseFuerFamilie {
                interface: name.to_string(),
                familie,
            })
        } else {
            Err(NetError::UnbekanntesInterface(name.to_string()))
        }
    }
}

/// Nimmt den OS-Schnappschuss ueber if-addrs auf
fn schnappschuss_erstellen() -> NetResult<Vec<InterfaceBeschreibung>> {
    let interfaces = if_addrs::get_if_addrs()?;
    Ok(interfaces
        .into_iter()
        .map(|iface| {
            let intern = iface.is_loopback();
            InterfaceBeschreibung::neu(iface.name.clone(), iface.ip(), iface.index, intern)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// AktualisierungsHandle – Hintergrund-Timer
// ---------------------------------------------------------------------------

/// Handle fuer den Hintergrund-Aktualisierungs-Task
///
/// Wenn dieses Handle gedroppt wird, wird der Task abgebrochen.
pub struct AktualisierungsHandle {
    task: tokio::task::JoinHandle<()>,
}

impl AktualisierungsHandle {
    /// Startet die periodische Aktualisierung des Aufloeser-Caches
    pub fn starten(aufloeser: Arc<InterfaceAufloeser>, intervall: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(intervall);
            // Erster Tick feuert sofort – der initiale Schnappschuss
            // existiert bereits, also einmal verbrauchen
            timer.tick().await;

            loop {
                timer.tick().await;
                if let Err(e) = aufloeser.aktualisieren() {
                    tracing::warn!(fehler = %e, "Interface-Aktualisierung fehlgeschlagen");
                }
            }
        });

        Self { task }
    }
}

impl Drop for AktualisierungsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_schnappschuss() -> Vec<InterfaceBeschreibung> {
        vec![
            InterfaceBeschreibung::neu("lo", "127.0.0.1".parse().unwrap(), Some(1), true),
            InterfaceBeschreibung::neu("eth0", "10.0.0.2".parse().unwrap(), Some(2), false),
            InterfaceBeschreibung::neu("eth0", "fe80::2".parse().unwrap(), Some(2), false),
            InterfaceBeschreibung::neu("wlan0", "192.168.1.7".parse().unwrap(), Some(3), false),
            InterfaceBeschreibung::neu("tun0", "fd00::9".parse().unwrap(), Some(4), false),
        ]
    }

    #[test]
    fn standard_interfaces_filtert_intern_und_familie() {
        let aufloeser = InterfaceAufloeser::aus_schnappschuss(test_schnappschuss());

        let v4 = aufloeser.standard_interfaces(AdressFamilie::V4);
        assert_eq!(v4, vec!["eth0".to_string(), "wlan0".to_string()]);

        let v6 = aufloeser.standard_interfaces(AdressFamilie::V6);
        assert_eq!(v6, vec!["eth0".to_string(), "tun0".to_string()]);
    }

    #[test]
    fn adresse_von_liefert_passende_familie() {
        let aufloeser = InterfaceAufloeser::aus_schnappschuss(test_schnappschuss());

        let v4 = aufloeser.adresse_von("eth0", AdressFamilie::V4).unwrap();
        assert!(AdressFamilie::V4.passt_zu(&v4));

        let v6 = aufloeser.adresse_von("eth0", AdressFamilie::V6).unwrap();
        assert!(AdressFamilie::V6.passt_zu(&v6));
    }

    #[test]
    fn unbekanntes_interface_wird_gemeldet() {
        let aufloeser = InterfaceAufloeser::aus_schnappschuss(test_schnappschuss());

        let fehler = aufloeser
            .adresse_von("eth9", AdressFamilie::V4)
            .unwrap_err();
        assert!(matches!(fehler, NetError::UnbekanntesInterface(n) if n == "eth9"));
    }

    #[test]
    fn fehlende_familie_wird_gemeldet() {
        let aufloeser = InterfaceAufloeser::aus_schnappschuss(test_schnappschuss());

        // wlan0 existiert, hat aber nur eine IPv4-Adresse
        let fehler = aufloeser
            .adresse_von("wlan0", AdressFamilie::V6)
            .unwrap_err();
        assert!(matches!(
            fehler,
            NetError::KeineAdresseFuerFamilie { interface, familie }
                if interface == "wlan0" && familie == AdressFamilie::V6
        ));
    }

    #[test]
    fn validieren_prueft_alle_namen() {
        let aufloeser = InterfaceAufloeser::aus_schnappschuss(test_schnappschuss());

        assert!(aufloeser
            .validieren(&["eth0".into(), "wlan0".into()], AdressFamilie::V4)
            .is_ok());
        assert!(aufloeser
            .validieren(&["eth0".into(), "eth9".into()], AdressFamilie::V4)
            .is_err());
    }

    #[test]
    fn echter_schnappschuss_ist_lesbar() {
        // Schlaegt nur fehl wenn das OS keine Interface-Liste liefert
        let aufloeser = InterfaceAufloeser::neu().unwrap();
        aufloeser.aktualisieren().unwrap();
    }
}
