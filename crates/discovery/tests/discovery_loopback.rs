//! End-to-End-Test der Discovery-Schicht ueber das Loopback-Interface

use leuchtfeuer_discovery::{Leuchtfeuer, LeuchtfeuerConfig, LeuchtfeuerEreignis};
use leuchtfeuer_transport::TransportConfig;
use std::time::Duration;
use tokio::time::timeout;

const WARTEZEIT: Duration = Duration::from_secs(5);

fn lo_instanz(name: &str, passwort: &str, port: u16, gruppe: &str) -> Leuchtfeuer {
    let config = LeuchtfeuerConfig {
        transport: TransportConfig {
            interfaces: vec!["lo".into()],
            gruppen: vec![gruppe.parse().unwrap()],
            port,
            ..TransportConfig::default()
        },
        passwort: passwort.into(),
        salz: "salt".into(),
        name: name.into(),
        beacon_daten: serde_json::json!({ "dienst": name }),
        ..LeuchtfeuerConfig::default()
    };
    Leuchtfeuer::neu(config).unwrap()
}

#[tokio::test]
async fn instanzen_entdecken_sich_gegenseitig() {
    let alpha = lo_instanz("alpha", "password", 47811, "239.255.81.1");
    let beta = lo_instanz("beta", "password", 47811, "239.255.81.1");

    let mut beta_ereignisse = beta.ereignisse();
    beta.starten().await.unwrap();
    alpha.starten().await.unwrap();

    // Alphas Start-Beacon muss bei Beta als geparster Beacon ankommen
    let warten = async {
        loop {
            match beta_ereignisse.recv().await {
                Ok(LeuchtfeuerEreignis::BeaconEmpfangen { beacon, .. })
                    if beacon.name == "alpha" =>
                {
                    return Some(beacon)
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    };
    let beacon = timeout(WARTEZEIT, warten)
        .await
        .ok()
        .flatten()
        .expect("kein Beacon von alpha empfangen");

    assert_eq!(beacon.instanz_id, alpha.instanz_id());
    assert_eq!(beacon.daten, serde_json::json!({ "dienst": "alpha" }));
    assert!(alpha.ist_bereit());

    alpha.schliessen();
    beta.schliessen();
}

#[tokio::test]
async fn falsches_passwort_liefert_nie_einen_beacon() {
    let alpha = lo_instanz("alpha", "password", 47812, "239.255.82.1");
    let beta = lo_instanz("beta", "geheim", 47812, "239.255.82.1");

    let mut beta_ereignisse = beta.ereignisse();
    beta.starten().await.unwrap();
    alpha.starten().await.unwrap();

    let warten = async {
        loop {
            match beta_ereignisse.recv().await {
                Ok(LeuchtfeuerEreignis::NichtAuthentifiziert { .. }) => return true,
                // Betas eigener Beacon laeuft ueber Multicast-Loop zurueck
                // und ist unter Betas Schluessel gueltig – nur Alphas
                // Beacon darf nie ankommen
                Ok(LeuchtfeuerEreignis::BeaconEmpfangen { beacon, .. })
                    if beacon.name == "alpha" =>
                {
                    panic!("Beacon trotz falschem Passwort zugestellt")
                }
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
    };
    let nicht_authentifiziert = timeout(WARTEZEIT, warten).await.unwrap_or(false);
    assert!(nicht_authentifiziert);

    alpha.schliessen();
    beta.schliessen();
}

#[tokio::test]
async fn einmalige_nachricht_kommt_an() {
    let alpha = lo_instanz("alpha", "password", 47813, "239.255.83.1");
    let beta = lo_instanz("beta", "password", 47813, "239.255.83.1");

    let mut beta_ereignisse = beta.ereignisse();
    beta.starten().await.unwrap();
    alpha.starten().await.unwrap();

    // Freies JSON das kein Beacon ist kommt als NachrichtEmpfangen an
    let paare = alpha
        .nachricht_senden(&serde_json::json!({ "frei": true }))
        .await
        .unwrap();
    assert_eq!(paare, 1);

    let warten = async {
        loop {
            match beta_ereignisse.recv().await {
                Ok(LeuchtfeuerEreignis::NachrichtEmpfangen { daten, .. }) => return Some(daten),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    };
    let daten = timeout(WARTEZEIT, warten)
        .await
        .ok()
        .flatten()
        .expect("keine Nachricht empfangen");
    assert_eq!(daten, serde_json::json!({ "frei": true }));

    alpha.schliessen();
    beta.schliessen();
}
