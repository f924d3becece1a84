//! Beacon-Payload – das JSON-Datagramm der Discovery-Schicht

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ein Discovery-Beacon
///
/// Wird als JSON serialisiert, verschluesselt und an alle Gruppen
/// gesendet. Die Instanz-ID bleibt ueber die Lebensdauer einer
/// Leuchtfeuer-Instanz konstant, der Zeitstempel wird pro Aussendung
/// frisch gesetzt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    /// Eindeutige Kennung der sendenden Instanz
    pub instanz_id: Uuid,
    /// Anzeigename der Instanz
    pub name: String,
    /// Zeitpunkt der Aussendung
    pub gesendet_um: DateTime<Utc>,
    /// Freie Nutzdaten der Anwendungsschicht
    #[serde(default)]
    pub daten: serde_json::Value,
}

impl Beacon {
    /// Erstellt einen Beacon mit aktuellem Zeitstempel
    pub fn neu(instanz_id: Uuid, name: impl Into<String>, daten: serde_json::Value) -> Self {
        Self {
            instanz_id,
            name: name.into(),
            gesendet_um: Utc::now(),
            daten,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beacon_json_roundtrip() {
        let beacon = Beacon::neu(
            Uuid::new_v4(),
            "werkstatt-pi",
            serde_json::json!({ "dienst": "mpd", "port": 6600 }),
        );

        let json = serde_json::to_vec(&beacon).unwrap();
        let decodiert: Beacon = serde_json::from_slice(&json).unwrap();
        assert_eq!(decodiert, beacon);
    }

    #[test]
    fn daten_feld_ist_optional() {
        let json = r#"{
            "instanz_id": "6ec9f6aa-5181-4622-9711-35ab0df0a580",
            "name": "kiosk",
            "gesendet_um": "2025-11-03T09:30:00Z"
        }"#;
        let beacon: Beacon = serde_json::from_str(json).unwrap();
        assert_eq!(beacon.name, "kiosk");
        assert!(beacon.daten.is_null());
    }
}
