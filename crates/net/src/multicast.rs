//! Multicast-Gruppenverwaltung – Socket-Besitz, Beitritte, Ausgangs-Interface
//!
//! Der Manager besitzt genau einen UDP-Socket. Der Socket wird ueber
//! socket2 erstellt, damit Reuse-Address/-Port vor dem Binden gesetzt
//! werden koennen (mehrere Instanzen teilen sich den wohlbekannten Port)
//! und damit vor jedem Senden das Ausgangs-Multicast-Interface gewaehlt
//! werden kann – auf Multi-Homed-Hosts ist das Standard-Ausgangs-Interface
//! eines Sockets sonst mehrdeutig.

use leuchtfeuer_core::{AdressFamilie, InterfaceBeschreibung};
use socket2::{Domain, Protocol, SockRef, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;

use crate::error::{NetError, NetResult};

// ---------------------------------------------------------------------------
// MulticastGruppenManager
// ---------------------------------------------------------------------------

/// Verwaltet den UDP-Socket und seine Multicast-Gruppenmitgliedschaften
pub struct MulticastGruppenManager {
    socket: Arc<UdpSocket>,
    familie: AdressFamilie,
    port: u16,
}

impl MulticastGruppenManager {
    /// Erstellt den Socket und bindet ihn an die unspezifizierte Adresse
    ///
    /// Muss innerhalb einer tokio-Runtime aufgerufen werden.
    pub fn neu(familie: AdressFamilie, port: u16) -> NetResult<Self> {
        let domain = match familie {
            AdressFamilie::V4 => Domain::IPV4,
            AdressFamilie::V6 => Domain::IPV6,
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(unix)]
        socket.set_reuse_port(true)?;
        if familie == AdressFamilie::V6 {
            socket.set_only_v6(true)?;
        }
        socket.set_nonblocking(true)?;

        let bind_adresse = SocketAddr::new(familie.unspezifiziert(), port);
        socket.bind(&bind_adresse.into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        tracing::info!(adresse = %bind_adresse, "Multicast-Socket gebunden");

        Ok(Self {
            socket: Arc::new(socket),
            familie,
            port,
        })
    }

    /// Gibt die konfigurierte Adressfamilie zurueck
    pub fn familie(&self) -> AdressFamilie {
        self.familie
    }

    /// Gibt den konfigurierten Port zurueck
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gibt die lokale Bind-Adresse zurueck
    pub fn lokale_adresse(&self) -> NetResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Tritt einer Multicast-Gruppe bei
    ///
    /// Mit Interface: Beitritt ueber dessen Adresse (IPv4) bzw. Index
    /// (IPv6). Ohne Interface: Beitritt ueber das System-Standard-Interface.
    pub fn gruppe_beitreten(
        &self,
        gruppe: &IpAddr,
        interface: Option<&InterfaceBeschreibung>,
    ) -> NetResult<()> {
        let interface_name = interface
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "standard".to_string());

        match (gruppe, self.familie) {
            (IpAddr::V4(g), AdressFamilie::V4) => {
                let lokal = match interface {
                    Some(b) => self.v4_adresse_von(b)?,
                    None => Ipv4Addr::UNSPECIFIED,
                };
                self.socket
                    .join_multicast_v4(*g, lokal)
                    .map_err(|quelle| NetError::GruppenBeitritt {
                        gruppe: *gruppe,
                        interface: interface_name.clone(),
                        quelle,
                    })?;
            }
            (IpAddr::V6(g), AdressFamilie::V6) => {
                let index = interface.and_then(|b| b.index).unwrap_or(0);
                self.socket
                    .join_multicast_v6(g, index)
                    .map_err(|quelle| NetError::GruppenBeitritt {
                        gruppe: *gruppe,
                        interface: interface_name.clone(),
                        quelle,
                    })?;
            }
            _ => {
                return Err(NetError::FamilieUnpassend {
                    adresse: *gruppe,
                    familie: self.familie,
                });
            }
        }

        tracing::debug!(gruppe = %gruppe, interface = %interface_name, "Gruppe beigetreten");
        Ok(())
    }

    /// Setzt das Ausgangs-Multicast-Interface des Sockets
    ///
    /// Muss vor jedem Senden ueber ein bestimmtes Interface aufgerufen
    /// werden; der Socket behaelt die Einstellung bis zum naechsten Aufruf.
    pub fn ausgangs_interface_setzen(&self, interface: &InterfaceBeschreibung) -> NetResult<()> {
        let sock = SockRef::from(self.socket.as_ref());
        match self.familie {
            AdressFamilie::V4 => {
                let lokal = self.v4_adresse_von(interface)?;
                sock.set_multicast_if_v4(&lokal)?;
            }
            AdressFamilie::V6 => {
                sock.set_multicast_if_v6(interface.index.unwrap_or(0))?;
            }
        }
        Ok(())
    }

    /// Sendet ein Datagramm an eine Gruppe auf dem wohlbekannten Port
    pub async fn senden_an(&self, gruppe: &IpAddr, daten: &[u8]) -> NetResult<usize> {
        if !self.familie.passt_zu(gruppe) {
            return Err(NetError::FamilieUnpassend {
                adresse: *gruppe,
                familie: self.familie,
            });
        }
        let ziel = SocketAddr::new(*gruppe, self.port);
        Ok(self.socket.send_to(daten, ziel).await?)
    }

    /// Empfaengt das naechste Datagramm
    pub async fn empfangen(&self, puffer: &mut [u8]) -> NetResult<(usize, SocketAddr)> {
        Ok(self.socket.recv_from(puffer).await?)
    }

    fn v4_adresse_von(&self, interface: &InterfaceBeschreibung) -> NetResult<Ipv4Addr> {
        match interface.adresse {
            IpAddr::V4(a) => Ok(a),
            IpAddr::V6(_) => Err(NetError::FamilieUnpassend {
                adresse: interface.adresse,
                familie: self.familie,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
