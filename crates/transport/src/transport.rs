//! MulticastTransport – Empfangs-Loop, Fan-Out-Senden, Lebenszyklus

use leuchtfeuer_core::TransportEreignis;
use leuchtfeuer_crypto::{adress_kontext, kontext_aus_teilen, AeadCodec};
use leuchtfeuer_net::{AktualisierungsHandle, InterfaceAufloeser, MulticastGruppenManager};
use parking_lot::{Mutex, RwLock};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

use crate::config::TransportConfig;
use crate::error::TransportResult;

/// Groesse des Empfangspuffers (deckt jede realistische Datagramm-Groesse
/// der Discovery-Payloads ab)
const EMPFANGS_PUFFER_GROESSE: usize = 8192;

/// Kapazitaet des Ereignis-Broadcast-Kanals
const EREIGNIS_PUFFER: usize = 64;

// ---------------------------------------------------------------------------
// TransportZustand
// ---------------------------------------------------------------------------

/// Lebenszyklus-Zustand eines Transports
///
/// Uebergaenge: `Start -> Bereit -> Geschlossen`. Fehler waehrend des
/// Starts werden als Ereignisse gemeldet; die Instanz kann trotzdem
/// `Bereit` erreichen sobald Binden und Beitritte abgeschlossen sind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportZustand {
    /// Konstruiert, aber Empfangs-Loop noch nicht gestartet
    Start,
    /// Socket gebunden, Gruppen-Beitritte versucht, Loop laeuft
    Bereit,
    /// Geschlossen – keine weiteren Ereignisse
    Geschlossen,
}

// ---------------------------------------------------------------------------
// MulticastTransport
// ---------------------------------------------------------------------------

/// Sicherer Multicast-Transport
///
/// Clone teilt den inneren Zustand; alle Klone sprechen mit demselben
/// Socket und demselben Ereignis-Kanal.
#[derive(Clone)]
pub struct MulticastTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    config: TransportConfig,
    codec: AeadCodec,
    manager: MulticastGruppenManager,
    aufloeser: Arc<InterfaceAufloeser>,
    ereignisse: broadcast::Sender<TransportEreignis>,
    zustand: RwLock<TransportZustand>,
    empfang_stoppen: Mutex<Option<oneshot::Sender<()>>>,
    aktualisierung: Mutex<Option<AktualisierungsHandle>>,
}

impl std::fmt::Debug for MulticastTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MulticastTransport").finish_non_exhaustive()
    }
}

impl MulticastTransport {
    /// Erstellt einen Transport mit extern gebautem Codec
    ///
    /// Validiert die Konfiguration synchron: Gruppen muessen zur Familie
    /// passen, explizit konfigurierte Interfaces muessen im aktuellen
    /// Schnappschuss existieren und eine Adresse der Familie tragen.
    /// Muss innerhalb einer tokio-Runtime aufgerufen werden.
    pub fn neu(config: TransportConfig, codec: AeadCodec) -> TransportResult<Self> {
        let config = config.normalisieren();
        config.pruefen()?;

        let aufloeser = Arc::new(InterfaceAufloeser::neu()?);
        if !config.interfaces.is_empty() {
            aufloeser.validieren(&config.interfaces, config.familie)?;
        }

        let manager = MulticastGruppenManager::neu(config.familie, config.port)?;
        let (ereignisse, _) = broadcast::channel(EREIGNIS_PUFFER);

        Ok(Self {
            inner: Arc::new(TransportInner {
                config,
                codec,
                manager,
                aufloeser,
                ereignisse,
                zustand: RwLock::new(TransportZustand::Start),
                empfang_stoppen: Mutex::new(None),
                aktualisierung: Mutex::new(None),
            }),
        })
    }

    /// Erstellt einen Transport mit Standard-Codec aus Passwort und Salt
    pub fn aus_passwort(
        config: TransportConfig,
        passwort: &[u8],
        salz: &[u8],
    ) -> TransportResult<Self> {
        let codec = AeadCodec::aus_passwort(passwort, salz)?;
        Self::neu(config, codec)
    }

    /// Abonniert die Transport-Ereignisse
    ///
    /// Mehrere Abonnenten sind erlaubt; jeder erhaelt alle Ereignisse ab
    /// dem Zeitpunkt des Abonnements.
    pub fn ereignisse(&self) -> broadcast::Receiver<TransportEreignis> {
        self.inner.ereignisse.subscribe()
    }

    /// Gibt den aktuellen Lebenszyklus-Zustand zurueck
    pub fn zustand(&self) -> TransportZustand {
        *self.inner.zustand.read()
    }

    /// Tritt allen Gruppen bei und startet Empfangs-Loop und
    /// Interface-Aktualisierung
    ///
    /// Beitritte sind Best-Effort: ein fehlgeschlagenes
    /// (Gruppe x Interface)-Paar wird als Fehler-Ereignis gemeldet und
    /// bricht die uebrigen Beitritte nicht ab. Danach wird `Bereit`
    /// gemeldet.
    pub async fn starten(&self) -> TransportResult<()> {
        let inner = &self.inner;

        // Gruppen-Beitritte (Best-Effort)
        let interface_namen = inner.ausgewaehlte_interfaces();
        for gruppe in &inner.config.gruppen {
            if interface_namen.is_empty() {
                // Keine Interfaces konfiguriert oder entdeckt:
                // Beitritt ueber das System-Standard-Interface
                if let Err(e) = inner.manager.gruppe_beitreten(gruppe, None) {
                    inner.beitrittsfehler_melden(gruppe, "standard", &e);
                }
                continue;
            }
            for name in &interface_namen {
                match inner.aufloeser.beschreibung_von(name, inner.config.familie) {
                    Ok(beschreibung) => {
                        if let Err(e) = inner.manager.gruppe_beitreten(gruppe, Some(&beschreibung))
                        {
                            inner.beitrittsfehler_melden(gruppe, name, &e);
                        }
                    }
                    Err(e) => inner.beitrittsfehler_melden(gruppe, name, &e),
                }
            }
        }

        // Empfangs-Loop
        let (stoppen_tx, stoppen_rx) = oneshot::channel();
        *inner.empfang_stoppen.lock() = Some(stoppen_tx);
        let loop_inner = Arc::clone(inner);
        tokio::spawn(async move {
            loop_inner.empfangs_loop(stoppen_rx).await;
        });

        // Periodische Interface-Aktualisierung
        let intervall = Duration::from_millis(inner.config.aktualisierungs_intervall_ms);
        *inner.aktualisierung.lock() = Some(AktualisierungsHandle::starten(
            Arc::clone(&inner.aufloeser),
            intervall,
        ));

        *inner.zustand.write() = TransportZustand::Bereit;
        inner.melden(TransportEreignis::Bereit);
        tracing::info!(
            port = inner.config.port,
            gruppen = inner.config.gruppen.len(),
            "Transport bereit"
        );
        Ok(())
    }

    /// Verschluesselt und sendet eine Nachricht an alle
    /// (Interface x Gruppe)-Paare
    ///
    /// Jedes Paar wird unabhaengig verarbeitet; Fehler einzelner Paare
    /// werden als Fehler-Ereignisse gemeldet und stoppen die uebrigen
    /// nicht. Rueckgabe ist die Anzahl erfolgreich gesendeter Paare –
    /// Teilerfolg ist unter Multi-Interface-Konfigurationen normal.
    pub async fn nachricht_senden(&self, klartext: &[u8]) -> usize {
        let inner = &self.inner;
        if self.zustand() == TransportZustand::Geschlossen {
            tracing::debug!("Sendeversuch nach Schliessen ignoriert");
            return 0;
        }

        let mut erfolgreich = 0usize;
        let interface_namen = inner.ausgewaehlte_interfaces();

        if interface_namen.is_empty() {
            // Kein nutzbares Interface: ein einfacher Sendeversuch pro
            // Gruppe, Kontext aus der lokalen Socket-Adresse
            for gruppe in &inner.config.gruppen {
                if inner.einfach_senden(gruppe, klartext).await {
                    erfolgreich += 1;
                }
            }
            return erfolgreich;
        }

        for name in &interface_namen {
            for gruppe in &inner.config.gruppen {
                if inner.paar_senden(name, gruppe, klartext).await {
                    erfolgreich += 1;
                }
            }
        }
        erfolgreich
    }

    /// Schliesst den Transport
    ///
    /// Stoppt Empfangs-Loop und Aktualisierungs-Timer und unterdrueckt
    /// jede weitere Ereignis-Emission. Bereits ans OS uebergebene
    /// Sendungen werden nicht abgebrochen; ihr Ausgang nach dem
    /// Schliessen wird verschluckt. Ein zweiter Aufruf ist wirkungslos.
    pub fn schliessen(&self) {
        let inner = &self.inner;
        {
            let mut zustand = inner.zustand.write();
            if *zustand == TransportZustand::Geschlossen {
                return;
            }
            *zustand = TransportZustand::Geschlossen;
        }

        if let Some(stoppen) = inner.empfang_stoppen.lock().take() {
            let _ = stoppen.send(());
        }
        inner.aktualisierung.lock().take();

        tracing::info!("Transport geschlossen");
    }

    /// Gibt den gebundenen Port zurueck
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }
}

// ---------------------------------------------------------------------------
// Interne Verarbeitung
// ---------------------------------------------------------------------------

impl TransportInner {
    /// Explizit konfigurierte oder automatisch entdeckte Interface-Namen
    fn ausgewaehlte_interfaces(&self) -> Vec<String> {
        if self.config.interfaces.is_empty() {
            self.aufloeser.standard_interfaces(self.config.familie)
        } else {
            self.config.interfaces.clone()
        }
    }

    /// Sendet ein Ereignis an alle Abonnenten
    ///
    /// Nach dem Schliessen wird nichts mehr gemeldet; ohne Abonnenten ist
    /// das Senden ein No-Op.
    fn melden(&self, ereignis: TransportEreignis) {
        if *self.zustand.read() == TransportZustand::Geschlossen {
            return;
        }
        let _ = self.ereignisse.send(ereignis);
    }

    fn beitrittsfehler_melden(&self, gruppe: &IpAddr, interface: &str, fehler: &dyn std::fmt::Display) {
        tracing::warn!(
            gruppe = %gruppe,
            interface = %interface,
            fehler = %fehler,
            "Gruppen-Beitritt fehlgeschlagen"
        );
        self.melden(TransportEreignis::Fehler {
            beschreibung: format!(
                "Beitritt zu {} auf {} fehlgeschlagen: {}",
                gruppe, interface, fehler
            ),
        });
    }

    /// Sendet ein Paar (Interface x Gruppe); true bei Erfolg
    async fn paar_senden(&self, name: &str, gruppe: &IpAddr, klartext: &[u8]) -> bool {
        let beschreibung = match self.aufloeser.beschreibung_von(name, self.config.familie) {
            Ok(b) => b,
            Err(e) => {
                self.sendefehler_melden(name, gruppe, &e);
                return false;
            }
        };

        if let Err(e) = self.manager.ausgangs_interface_setzen(&beschreibung) {
            self.sendefehler_melden(name, gruppe, &e);
            return false;
        }

        // AAD aus der lokalen Adresse des Ausgangs-Interfaces und dem
        // gebundenen Port – die Empfangsseite leitet denselben Kontext
        // aus der beobachteten Absenderadresse ab
        let kontext = kontext_aus_teilen(&beschreibung.adresse, self.config.port);
        self.verschluesselt_senden(gruppe, klartext, &kontext, name).await
    }

    /// Sendeversuch ohne Interface-Bindung (Fallback)
    async fn einfach_senden(&self, gruppe: &IpAddr, klartext: &[u8]) -> bool {
        let kontext = match self.manager.lokale_adresse() {
            Ok(adresse) => adress_kontext(&adresse),
            Err(e) => {
                self.sendefehler_melden("standard", gruppe, &e);
                return false;
            }
        };
        self.verschluesselt_senden(gruppe, klartext, &kontext, "standard").await
    }

    async fn verschluesselt_senden(
        &self,
        gruppe: &IpAddr,
        klartext: &[u8],
        kontext: &[u8],
        interface: &str,
    ) -> bool {
        let umschlag = match self.codec.verschluesseln(klartext, kontext) {
            Ok(u) => u,
            Err(e) => {
                self.sendefehler_melden(interface, gruppe, &e);
                return false;
            }
        };

        match self.manager.senden_an(gruppe, &umschlag).await {
            Ok(bytes) => {
                tracing::trace!(
                    gruppe = %gruppe,
                    interface = %interface,
                    bytes,
                    "Datagramm gesendet"
                );
                true
            }
            Err(e) => {
                self.sendefehler_melden(interface, gruppe, &e);
                false
            }
        }
    }

    fn sendefehler_melden(&self, interface: &str, gruppe: &IpAddr, fehler: &dyn std::fmt::Display) {
        tracing::warn!(
            interface = %interface,
            gruppe = %gruppe,
            fehler = %fehler,
            "Senden fehlgeschlagen"
        );
        self.melden(TransportEreignis::Fehler {
            beschreibung: format!(
                "Senden an {} ueber {} fehlgeschlagen: {}",
                gruppe, interface, fehler
            ),
        });
    }

    /// Empfangs-Loop – laeuft bis zum Stopp-Signal
    async fn empfangs_loop(self: Arc<Self>, mut stoppen_rx: oneshot::Receiver<()>) {
        let mut puffer = [0u8; EMPFANGS_PUFFER_GROESSE];
        tracing::debug!("Empfangs-Loop gestartet");

        loop {
            tokio::select! {
                ergebnis = self.manager.empfangen(&mut puffer) => {
                    match ergebnis {
                        Ok((laenge, absender)) => {
                            self.datagramm_verarbeiten(&puffer[..laenge], absender);
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "UDP-Empfangsfehler");
                            self.melden(TransportEreignis::Fehler {
                                beschreibung: format!("Empfangsfehler: {}", e),
                            });
                            // Kurze Pause um Busy-Loop bei persistentem
                            // Fehler zu vermeiden
                            tokio::time::sleep(Duration::from_millis(1)).await;
                        }
                    }
                }

                _ = &mut stoppen_rx => {
                    break;
                }
            }
        }

        tracing::debug!("Empfangs-Loop beendet");
    }

    /// Verarbeitet ein eingehendes Datagramm
    ///
    /// Datagramme werden in Ankunftsreihenfolge verarbeitet. Der
    /// AAD-Kontext kommt aus der vom Socket gemeldeten Absenderadresse.
    fn datagramm_verarbeiten(&self, daten: &[u8], absender: std::net::SocketAddr) {
        let kontext = adress_kontext(&absender);

        match self.codec.entschluesseln(daten, &kontext) {
            Ok(klartext) => {
                tracing::trace!(absender = %absender, bytes = klartext.len(), "Nachricht empfangen");
                self.melden(TransportEreignis::Nachricht {
                    daten: klartext,
                    absender,
                });
            }
            Err(e) if e.ist_authentifizierungsfehler() => {
                tracing::warn!(absender = %absender, "Datagramm nicht authentifiziert");
                self.melden(TransportEreignis::NichtAuthentifiziert { absender });
            }
            Err(e) => {
                tracing::debug!(absender = %absender, fehler = %e, "Fehlerhaftes Datagramm");
                self.melden(TransportEreignis::Fehler {
                    beschreibung: format!("Fehlerhaftes Datagramm von {}: {}", absender, e),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;

    fn test_codec() -> AeadCodec {
        AeadCodec::aus_passwort(b"password", b"salt").unwrap()
    }

    #[tokio::test]
    async fn unbekanntes_explizites_interface_ist_fatal() {
        let config = TransportConfig {
            interfaces: vec!["gibt-es-nicht-0".into()],
            port: 0,
            ..TransportConfig::default()
        };
        let fehler = MulticastTransport::neu(config, test_codec()).unwrap_err();
        assert!(matches!(fehler, crate::TransportError::Netz(_)));
    }

    #[tokio::test]
    async fn leeres_passwort_ist_fatal() {
        let config = TransportConfig {
            port: 0,
            ..TransportConfig::default()
        };
        let fehler = MulticastTransport::aus_passwort(config, b"", b"salt").unwrap_err();
        assert!(matches!(fehler, crate::TransportError::Krypto(_)));
    }

    #[tokio::test]
    async fn zustand_uebergaenge() {
        let config = TransportConfig {
            port: 0,
            ..TransportConfig::default()
        };
        let transport = MulticastTransport::neu(config, test_codec()).unwrap();
        assert_eq!(transport.zustand(), TransportZustand::Start);

        transport.starten().await.unwrap();
        assert_eq!(transport.zustand(), TransportZustand::Bereit);

        transport.schliessen();
        assert_eq!(transport.zustand(), TransportZustand::Geschlossen);

        // Zweiter Aufruf ist wirkungslos
        transport.schliessen();
        assert_eq!(transport.zustand(), TransportZustand::Geschlossen);
    }

    #[tokio::test]
    async fn senden_nach_schliessen_ist_noop() {
        let config = TransportConfig {
            port: 0,
            ..TransportConfig::default()
        };
        let transport = MulticastTransport::neu(config, test_codec()).unwrap();
        transport.starten().await.unwrap();
        transport.schliessen();

        assert_eq!(transport.nachricht_senden(b"hallo").await, 0);
    }
}
