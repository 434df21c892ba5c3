//! Persisted user preferences.
//!
//! The whole [`Preferences`] value is stored as JSON under [`PREFERENCES_KEY`]
//! so fields added later fall back to their defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::processing::surface::SliceAxis;
use crate::sensor::capture::{DEFAULT_POLL_RATE_MS, DEFAULT_SAMPLE_INTERVAL_MS};
use crate::sensor::client::{DEFAULT_BASE_URL, DEFAULT_SENSOR_IP, DEFAULT_SENSOR_PORT};
use crate::state::app_state::Page;
use crate::state::theme::Theme;

pub const PREFERENCES_KEY: &str = "profilescope.preferences";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub base_url: String,
    pub sensor_ip: String,
    pub sensor_port: u16,
    pub poll_rate_ms: u64,
    pub sample_interval_ms: u64,
    pub theme: Theme,
    pub page: Page,
    pub active_slice: SliceAxis,
    pub slice_x: usize,
    pub slice_y: usize,
    pub show_slice: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sensor_ip: DEFAULT_SENSOR_IP.to_string(),
            sensor_port: DEFAULT_SENSOR_PORT,
            poll_rate_ms: DEFAULT_POLL_RATE_MS,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            theme: Theme::default(),
            page: Page::default(),
            active_slice: SliceAxis::default(),
            slice_x: 0,
            slice_y: 0,
            show_slice: false,
        }
    }
}

impl Preferences {
    /// Read from `store`; a missing or unreadable entry yields the defaults.
    pub fn load<S: PreferenceStore + ?Sized>(store: &S) -> Self {
        let Some(json) = store.get_string(PREFERENCES_KEY) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("ignoring stored preferences: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: PreferenceStore + ?Sized>(&self, store: &mut S) {
        match serde_json::to_string(self) {
            Ok(json) => store.set_string(PREFERENCES_KEY, json),
            Err(e) => tracing::error!("cannot serialize preferences: {e}"),
        }
    }

    /// Forget the slice selection, as after clearing the surface.
    pub fn reset_slice(&mut self) {
        self.active_slice = SliceAxis::default();
        self.slice_x = 0;
        self.slice_y = 0;
        self.show_slice = false;
    }
}

/// Key/value storage behind the preferences.
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: String);
}

impl PreferenceStore for dyn eframe::Storage + '_ {
    fn get_string(&self, key: &str) -> Option<String> {
        eframe::Storage::get_string(self, key)
    }

    fn set_string(&mut self, key: &str, value: String) {
        eframe::Storage::set_string(self, key, value);
    }
}

/// In-memory store, used when running without eframe persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_gives_defaults() {
        let prefs = Preferences::load(&MemoryStore::default());
        assert_eq!(prefs.base_url, "http://localhost:8000");
        assert_eq!(prefs.sensor_port, 24691);
        assert_eq!(prefs.poll_rate_ms, 200);
        assert_eq!(prefs.sample_interval_ms, 10);
        assert!(!prefs.show_slice);
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::default();
        let mut prefs = Preferences::default();
        prefs.sensor_ip = "10.0.0.7".into();
        prefs.active_slice = SliceAxis::Y;
        prefs.slice_y = 12;
        prefs.theme = Theme::Light;
        prefs.save(&mut store);
        assert_eq!(Preferences::load(&store), prefs);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut store = MemoryStore::default();
        store.set_string(PREFERENCES_KEY, r#"{"poll_rate_ms":50}"#.into());
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.poll_rate_ms, 50);
        assert_eq!(prefs.sensor_ip, "192.168.0.1");

        store.set_string(PREFERENCES_KEY, "not json".into());
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn reset_slice_clears_selection() {
        let mut prefs = Preferences {
            active_slice: SliceAxis::Y,
            slice_x: 3,
            slice_y: 4,
            show_slice: true,
            ..Preferences::default()
        };
        prefs.reset_slice();
        assert_eq!(prefs, Preferences { theme: prefs.theme, ..Preferences::default() });
    }
}
