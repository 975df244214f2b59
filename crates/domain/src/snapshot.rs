//! Persisted bulb-state snapshots, grouped by target-set key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::light::BulbState;
use crate::target::CanonicalKey;
use crate::time::Timestamp;

/// Everything the snapshot store keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfiguration {
    #[serde(default)]
    pub states: BTreeMap<CanonicalKey, SnapshotGroup>,
}

/// Saved states for one target set: an unnamed default plus named slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Vec<BulbState>>,
    #[serde(default)]
    pub named_states: BTreeMap<String, Vec<BulbState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl SnapshotGroup {
    /// States in the named slot, or the default slot when `name` is `None`.
    #[must_use]
    pub fn slot(&self, name: Option<&str>) -> Option<&[BulbState]> {
        match name {
            Some(name) => self.named_states.get(name).map(Vec::as_slice),
            None => self.default.as_deref(),
        }
    }
}

impl PersistedConfiguration {
    /// Find the states saved for `key` in the given slot.
    #[must_use]
    pub fn lookup(&self, key: &CanonicalKey, name: Option<&str>) -> Option<&[BulbState]> {
        self.states.get(key).and_then(|group| group.slot(name))
    }

    /// Store states for `key`, replacing whatever the slot held.
    pub fn record(
        &mut self,
        key: CanonicalKey,
        name: Option<String>,
        states: Vec<BulbState>,
        at: Timestamp,
    ) {
        let group = self.states.entry(key).or_default();
        match name {
            Some(name) => {
                group.named_states.insert(name, states);
            }
            None => group.default = Some(states),
        }
        group.updated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Power;
    use crate::target::TargetSet;

    fn state(label: &str, brightness: u16) -> BulbState {
        BulbState {
            label: label.to_string(),
            power: Power::On,
            hue: 0,
            saturation: 0,
            brightness,
            kelvin: 2700,
            transition_ms: 0,
        }
    }

    #[test]
    fn should_record_default_and_named_slots_independently() {
        let key = TargetSet::named(["Hall"]).canonical_key();
        let mut config = PersistedConfiguration::default();
        config.record(key.clone(), None, vec![state("Hall", 1)], crate::time::now());
        config.record(
            key.clone(),
            Some("Evening".to_string()),
            vec![state("Hall", 2)],
            crate::time::now(),
        );

        assert_eq!(config.lookup(&key, None).unwrap()[0].brightness, 1);
        assert_eq!(config.lookup(&key, Some("Evening")).unwrap()[0].brightness, 2);
        assert!(config.lookup(&key, Some("Morning")).is_none());
    }

    #[test]
    fn should_miss_unknown_key() {
        let config = PersistedConfiguration::default();
        assert!(config.lookup(&TargetSet::All.canonical_key(), None).is_none());
    }

    #[test]
    fn should_overwrite_existing_slot() {
        let key = TargetSet::All.canonical_key();
        let mut config = PersistedConfiguration::default();
        config.record(key.clone(), None, vec![state("A", 1)], crate::time::now());
        config.record(key.clone(), None, vec![state("B", 2)], crate::time::now());
        let saved = config.lookup(&key, None).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].label, "B");
    }

    #[test]
    fn should_read_legacy_document_without_timestamps() {
        let json = r#"{
            "states": {
                "Kitchen_": {
                    "namedStates": {},
                    "default": [
                        {"bulbLabel": "Kitchen", "power": "on", "hue": 1, "saturation": 2, "brightness": 3, "kelvin": 4}
                    ]
                }
            }
        }"#;
        let config: PersistedConfiguration = serde_json::from_str(json).unwrap();
        let key = TargetSet::named(["Kitchen"]).canonical_key();
        let saved = config.lookup(&key, None).unwrap();
        assert_eq!(saved[0].label, "Kitchen");
        assert!(config.states[&key].updated_at.is_none());
    }

    #[test]
    fn should_read_document_written_with_numeric_power() {
        let json = r#"{"states":{"Kitchen_":{"namedStates":{},"default":[{"hue":0,"saturation":0,"brightness":32768,"kelvin":3500,"dim":0,"power":65535,"bulbLabel":"Kitchen"}]}}}"#;
        let config: PersistedConfiguration = serde_json::from_str(json).unwrap();
        let key = TargetSet::named(["Kitchen"]).canonical_key();
        let saved = config.lookup(&key, None).unwrap();
        assert_eq!(saved[0].power, Power::On);
        assert_eq!(saved[0].brightness, 32768);
        assert_eq!(saved[0].transition_ms, 0);
    }

    #[test]
    fn should_read_empty_document() {
        let config: PersistedConfiguration = serde_json::from_str("{}").unwrap();
        assert!(config.states.is_empty());
    }

    #[test]
    fn should_serialize_camel_case_fields() {
        let key = TargetSet::All.canonical_key();
        let mut config = PersistedConfiguration::default();
        config.record(key, Some("x".to_string()), vec![], crate::time::now());
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["states"]["all"]["namedStates"]["x"].is_array());
        assert!(json["states"]["all"]["updatedAt"].is_string());
        assert!(json["states"]["all"].get("default").is_none());
    }
}
