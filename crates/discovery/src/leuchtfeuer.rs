//! Leuchtfeuer – Orchestrierung von Transport, Broadcast-Timer und Relay

use leuchtfeuer_core::{LeuchtfeuerError, Result, TransportEreignis};
use leuchtfeuer_crypto::AeadCodec;
use leuchtfeuer_transport::{MulticastTransport, TransportConfig};
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::beacon::Beacon;

/// Standard-Intervall zwischen zwei Beacon-Aussendungen
pub const STANDARD_BROADCAST_INTERVALL_MS: u64 = 60_000;

/// Kapazitaet des Ereignis-Broadcast-Kanals
const EREIGNIS_PUFFER: usize = 64;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration einer Leuchtfeuer-Instanz
#[derive(Debug, Clone)]
pub struct LeuchtfeuerConfig {
    /// Transport-Konfiguration (Familie, Gruppen, Interfaces, Port)
    pub transport: TransportConfig,
    /// Gemeinsames Passwort fuer die Schluessel-Ableitung
    pub passwort: String,
    /// Gemeinsames Salt fuer die Schluessel-Ableitung
    pub salz: String,
    /// Anzeigename dieser Instanz im Beacon
    pub name: String,
    /// Intervall zwischen zwei Beacon-Aussendungen
    pub broadcast_intervall_ms: u64,
    /// Initiale freie Nutzdaten des Beacons
    pub beacon_daten: serde_json::Value,
}

impl Default for LeuchtfeuerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            passwort: String::new(),
            salz: String::new(),
            name: "leuchtfeuer".into(),
            broadcast_intervall_ms: STANDARD_BROADCAST_INTERVALL_MS,
            beacon_daten: serde_json::Value::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Ereignisse
// ---------------------------------------------------------------------------

/// Ereignisse einer Leuchtfeuer-Instanz
#[derive(Debug, Clone)]
pub enum LeuchtfeuerEreignis {
    /// Transport gebunden, Gruppen-Beitritte versucht, erster Beacon
    /// ausgesendet
    Bereit,
    /// Authentifizierter Beacon einer anderen Instanz empfangen
    BeaconEmpfangen {
        /// Geparster Beacon
        beacon: Beacon,
        /// Absender-Endpunkt
        absender: SocketAddr,
    },
    /// Authentifiziertes JSON empfangen das kein Beacon ist
    /// (einmalige eigene Nachrichten, siehe `nachricht_senden`)
    NachrichtEmpfangen {
        /// Geparstes JSON
        daten: serde_json::Value,
        /// Absender-Endpunkt
        absender: SocketAddr,
    },
    /// Datagramm das die Authentifizierung nicht bestanden hat
    NichtAuthentifiziert {
        /// Absender-Endpunkt des verworfenen Datagramms
        absender: SocketAddr,
    },
    /// Alle uebrigen Laufzeitfehler
    Fehler {
        /// Menschenlesbare Beschreibung
        beschreibung: String,
    },
}

// ---------------------------------------------------------------------------
// Leuchtfeuer
// ---------------------------------------------------------------------------

/// Discovery-Instanz: periodischer Beacon-Broadcast plus Ereignis-Relay
///
/// Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct Leuchtfeuer {
    inner: Arc<LeuchtfeuerInner>,
}

struct LeuchtfeuerInner {
    transport: MulticastTransport,
    ereignisse: broadcast::Sender<LeuchtfeuerEreignis>,
    beacon_daten: RwLock<serde_json::Value>,
    instanz_id: Uuid,
    name: String,
    intervall: Duration,
    bereit: AtomicBool,
    geschlossen: AtomicBool,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl std::fmt::Debug for Leuchtfeuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leuchtfeuer")
            .field("instanz_id", &self.inner.instanz_id)
            .field("name", &self.inner.name)
            .field("intervall", &self.inner.intervall)
            .field("bereit", &self.inner.bereit.load(Ordering::SeqCst))
            .finish()
    }
}

impl Leuchtfeuer {
    /// Erstellt eine Instanz mit Standard-Codec aus Passwort und Salt
    ///
    /// Passwort und Salt sind Pflicht; leere Werte sind ein
    /// Konfigurationsfehler. Muss innerhalb einer tokio-Runtime
    /// aufgerufen werden.
    pub fn neu(config: LeuchtfeuerConfig) -> Result<Self> {
        if config.passwort.is_empty() {
            return Err(LeuchtfeuerError::konfiguration(
                "passwort muss angegeben werden",
            ));
        }
        if config.salz.is_empty() {
            return Err(LeuchtfeuerError::konfiguration("salz muss angegeben werden"));
        }

        let codec = AeadCodec::aus_passwort(config.passwort.as_bytes(), config.salz.as_bytes())
            .map_err(|e| LeuchtfeuerError::Krypto(e.to_string()))?;
        Self::mit_codec(config, codec)
    }

    /// Erstellt eine Instanz mit extern bereitgestelltem Codec
    ///
    /// Passwort und Salt der Konfiguration werden dabei ignoriert.
    pub fn mit_codec(config: LeuchtfeuerConfig, codec: AeadCodec) -> Result<Self> {
        let transport = MulticastTransport::neu(config.transport, codec)
            .map_err(|e| LeuchtfeuerError::Netzwerk(e.to_string()))?;
        let (ereignisse, _) = broadcast::channel(EREIGNIS_PUFFER);

        Ok(Self {
            inner: Arc::new(LeuchtfeuerInner {
                transport,
                ereignisse,
                beacon_daten: RwLock::new(config.beacon_daten),
                instanz_id: Uuid::new_v4(),
                name: config.name,
                intervall: Duration::from_millis(config.broadcast_intervall_ms),
                bereit: AtomicBool::new(false),
                geschlossen: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Abonniert die Leuchtfeuer-Ereignisse
    pub fn ereignisse(&self) -> broadcast::Receiver<LeuchtfeuerEreignis> {
        self.inner.ereignisse.subscribe()
    }

    /// Gibt die konstante Instanz-Kennung zurueck
    pub fn instanz_id(&self) -> Uuid {
        self.inner.instanz_id
    }

    /// Prueft ob der Transport bereit ist
    pub fn ist_bereit(&self) -> bool {
        self.inner.bereit.load(Ordering::SeqCst)
    }

    /// Startet Transport, Ereignis-Relay und Broadcast-Timer
    pub async fn starten(&self) -> Result<()> {
        let inner = &self.inner;

        let mut transport_rx = inner.transport.ereignisse();
        inner
            .transport
            .starten()
            .await
            .map_err(|e| LeuchtfeuerError::Netzwerk(e.to_string()))?;

        // Relay: Transport-Ereignisse in Leuchtfeuer-Ereignisse uebersetzen
        let relay_inner = Arc::clone(inner);
        let relay = tokio::spawn(async move {
            loop {
                match transport_rx.recv().await {
                    Ok(ereignis) => relay_inner.transport_ereignis_verarbeiten(ereignis).await,
                    Err(broadcast::error::RecvError::Lagged(anzahl)) => {
                        tracing::warn!(anzahl, "Ereignis-Relay hinkt hinterher");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // Broadcast-Timer
        let timer_inner = Arc::clone(inner);
        let timer = tokio::spawn(async move {
            let mut intervall = tokio::time::interval(timer_inner.intervall);
            // Erster Tick feuert sofort – der Start-Broadcast kommt schon
            // vom Bereit-Ereignis, also einmal verbrauchen
            intervall.tick().await;
            loop {
                intervall.tick().await;
                timer_inner.beacon_aussenden().await;
            }
        });

        let mut tasks = inner.tasks.lock();
        tasks.push(relay);
        tasks.push(timer);
        Ok(())
    }

    /// Ersetzt die freien Beacon-Nutzdaten
    ///
    /// Wirkt ab der naechsten Aussendung.
    pub fn beacon_daten_setzen(&self, daten: serde_json::Value) {
        *self.inner.beacon_daten.write() = daten;
    }

    /// Sendet eine einmalige eigene Nachricht an alle Gruppen
    ///
    /// Rueckgabe ist die Anzahl erfolgreich gesendeter
    /// (Interface x Gruppe)-Paare.
    pub async fn nachricht_senden(&self, daten: &serde_json::Value) -> Result<usize> {
        let bytes = serde_json::to_vec(daten)
            .map_err(|e| LeuchtfeuerError::Serialisierung(e.to_string()))?;
        Ok(self.inner.transport.nachricht_senden(&bytes).await)
    }

    /// Beendet Timer, Relay und Transport
    ///
    /// Destruktiv: danach ist eine neue Instanz noetig. Ein zweiter
    /// Aufruf ist wirkungslos.
    pub fn schliessen(&self) {
        let inner = &self.inner;
        if inner.geschlossen.swap(true, Ordering::SeqCst) {
            return;
        }

        for task in inner.tasks.lock().drain(..) {
            task.abort();
        }
        inner.transport.schliessen();
        tracing::info!(instanz = %inner.instanz_id, "Leuchtfeuer geschlossen");
    }
}

// ---------------------------------------------------------------------------
// Interne Verarbeitung
// ---------------------------------------------------------------------------

impl LeuchtfeuerInner {
    fn melden(&self, ereignis: LeuchtfeuerEreignis) {
        if self.geschlossen.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.ereignisse.send(ereignis);
    }

    /// Sendet den Beacon mit frischem Zeitstempel und gecachten Nutzdaten
    async fn beacon_aussenden(&self) {
        let beacon = Beacon::neu(self.instanz_id, self.name.clone(), self.beacon_daten.read().clone());
        let bytes = match serde_json::to_vec(&beacon) {
            Ok(b) => b,
            Err(e) => {
                self.melden(LeuchtfeuerEreignis::Fehler {
                    beschreibung: format!("Beacon-Serialisierung fehlgeschlagen: {}", e),
                });
                return;
            }
        };

        let paare = self.transport.nachricht_senden(&bytes).await;
        tracing::debug!(paare, "Beacon ausgesendet");
    }

    async fn transport_ereignis_verarbeiten(&self, ereignis: TransportEreignis) {
        match ereignis {
            TransportEreignis::Bereit => {
                self.bereit.store(true, Ordering::SeqCst);
                tracing::info!("Transport bereit – sende Start-Beacon");
                // Sofortige erste Aussendung statt auf den naechsten
                // Timer-Tick zu warten
                self.beacon_aussenden().await;
                self.melden(LeuchtfeuerEreignis::Bereit);
            }
            TransportEreignis::Nachricht { daten, absender } => {
                let wert: serde_json::Value = match serde_json::from_slice(&daten) {
                    Ok(w) => w,
                    Err(e) => {
                        self.melden(LeuchtfeuerEreignis::Fehler {
                            beschreibung: format!("Ungueltiges JSON von {}: {}", absender, e),
                        });
                        return;
                    }
                };

                match serde_json::from_value::<Beacon>(wert.clone()) {
                    Ok(beacon) => {
                        tracing::trace!(absender = %absender, von = %beacon.instanz_id, "Beacon empfangen");
                        self.melden(LeuchtfeuerEreignis::BeaconEmpfangen { beacon, absender });
                    }
                    Err(_) => {
                        self.melden(LeuchtfeuerEreignis::NachrichtEmpfangen {
                            daten: wert,
                            absender,
                        });
                    }
                }
            }
            TransportEreignis::NichtAuthentifiziert { absender } => {
                tracing::warn!(absender = %absender, "Nachricht hat Authentifizierung nicht bestanden");
                self.melden(LeuchtfeuerEreignis::NichtAuthentifiziert { absender });
            }
            TransportEreignis::Fehler { beschreibung } => {
                tracing::error!(fehler = %beschreibung, "Transportfehler");
                self.melden(LeuchtfeuerEreignis::Fehler { beschreibung });
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

    #[tokio::test]
    async fn leeres_passwort_wird_abgelehnt() {
        let config = LeuchtfeuerConfig {
            salz: "salt".into(),
            ..LeuchtfeuerConfig::default()
        };
        let fehler = Leuchtfeuer::neu(config).unwrap_err();
        assert!(matches!(fehler, LeuchtfeuerError::Konfiguration(_)));
    }

    #[tokio::test]
    async fn leeres_salz_wird_abgelehnt() {
        let config = LeuchtfeuerConfig {
            passwort: "password".into(),
            ..LeuchtfeuerConfig::default()
        };
        let fehler = Leuchtfeuer::neu(config).unwrap_err();
        assert!(matches!(fehler, LeuchtfeuerError::Konfiguration(_)));
    }

    #[tokio::test]
    async fn beacon_daten_sind_austauschbar() {
        let config = LeuchtfeuerConfig {
            transport: leuchtfeuer_transport::TransportConfig {
                port: 0,
                ..Default::default()
            },
            passwort: "password".into(),
            salz: "salt".into(),
            ..LeuchtfeuerConfig::default()
        };
        let leuchtfeuer = Leuchtfeuer::neu(config).unwrap();
        assert!(!leuchtfeuer.ist_bereit());

        leuchtfeuer.beacon_daten_setzen(serde_json::json!({ "version": 2 }));
        assert_eq!(
            *leuchtfeuer.inner.beacon_daten.read(),
            serde_json::json!({ "version": 2 })
        );
    }
}
