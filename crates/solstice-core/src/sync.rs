//! Inbound data-sync listener.
//!
//! The paired handheld pushes path-scoped change notifications over the
//! device link. The receiver filters a batch down to the weather path,
//! decodes the three scalar fields, and overwrites the preference store.
//! Everything else (foreign paths, deletions, transport hiccups) is
//! logged and dropped.

use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::prefs::{PrefsBackend, PrefsError, PrefsStore};
use crate::weather::WeatherPrefs;

/// Resource path weather notifications arrive on.
pub const WEATHER_PATH: &str = "/weather";

/// Payload key for the forecast high, degrees Celsius.
pub const HIGH_TEMP_KEY: &str = "weather.high";
/// Payload key for the forecast low, degrees Celsius.
pub const LOW_TEMP_KEY: &str = "weather.low";
/// Payload key for the provider condition id.
pub const CONDITION_ID_KEY: &str = "weather.id";

const MAX_KEY_LEN: usize = 32;
const MAX_FIELDS: usize = 8;
const MAX_PATH_LEN: usize = 64;

/// Scalar value carried by one payload field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    F64(f64),
    I32(i32),
}

/// Small ordered key-to-scalar map decoded from a notification payload.
///
/// Getters coerce between scalar kinds and fall back to zero for absent
/// keys, so a short payload flows through as defaults rather than an
/// error.
#[derive(Debug, Default, Clone)]
pub struct DataMap {
    entries: Vec<(String<MAX_KEY_LEN>, FieldValue), MAX_FIELDS>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field. Keys beyond the field capacity are
    /// silently dropped, like any oversized payload on this link.
    pub fn insert(&mut self, key: &str, value: FieldValue) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.as_str() == key)
        {
            slot.1 = value;
            return;
        }

        let mut owned = String::new();
        if owned.push_str(key).is_ok() {
            self.entries.push((owned, value)).ok();
        }
    }

    fn get(&self, key: &str) -> Option<FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| *v)
    }

    /// Field as `f64`, `0.0` when absent.
    pub fn get_f64(&self, key: &str) -> f64 {
        match self.get(key) {
            Some(FieldValue::F64(v)) => v,
            Some(FieldValue::I32(v)) => f64::from(v),
            None => 0.0,
        }
    }

    /// Field as `i32`, `0` when absent. Fractions truncate.
    pub fn get_i32(&self, key: &str) -> i32 {
        match self.get(key) {
            Some(FieldValue::I32(v)) => v,
            Some(FieldValue::F64(v)) => v as i32,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// One path-scoped change notification from the paired device.
#[derive(Debug, Clone)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub path: String<MAX_PATH_LEN>,
    pub map: DataMap,
}

impl DataEvent {
    pub fn changed(path: &str, map: DataMap) -> Self {
        Self {
            kind: DataEventKind::Changed,
            path: truncated(path),
            map,
        }
    }

    pub fn deleted(path: &str) -> Self {
        Self {
            kind: DataEventKind::Deleted,
            path: truncated(path),
            map: DataMap::new(),
        }
    }
}

fn truncated(path: &str) -> String<MAX_PATH_LEN> {
    let mut owned = String::new();
    owned.push_str(path).ok();
    owned
}

/// Transport-level notifications from the device link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Suspended,
    ConnectionFailed,
}

/// Listener that persists pushed weather into the preference store.
pub struct SyncReceiver<B: PrefsBackend> {
    store: PrefsStore<B>,
}

impl<B: PrefsBackend> SyncReceiver<B> {
    pub fn new(store: PrefsStore<B>) -> Self {
        Self { store }
    }

    /// Transport state changes are logged and otherwise ignored: no
    /// retries, no backoff, no user-visible error state.
    pub fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => info!("sync transport connected"),
            TransportEvent::Suspended => warn!("sync transport suspended"),
            TransportEvent::ConnectionFailed => warn!("sync transport connection failed"),
        }
    }

    /// Applies a batch of change notifications and returns how many were
    /// persisted.
    ///
    /// Only `Changed` events on [`WEATHER_PATH`] are decoded; absent
    /// payload fields come through as zero via the [`DataMap`] getters and
    /// are persisted without complaint.
    pub fn on_data_changed(
        &mut self,
        events: &[DataEvent],
    ) -> Result<usize, PrefsError<B::Error>> {
        let mut applied = 0;

        for event in events {
            match event.kind {
                DataEventKind::Changed if event.path.as_str() == WEATHER_PATH => {
                    let high = event.map.get_f64(HIGH_TEMP_KEY);
                    let low = event.map.get_f64(LOW_TEMP_KEY);
                    let condition_id = event.map.get_i32(CONDITION_ID_KEY);

                    info!(
                        "weather received: high {} low {} condition {}",
                        high, low, condition_id
                    );

                    self.store.write(WeatherPrefs {
                        high_temp: Some(high as f32),
                        low_temp: Some(low as f32),
                        condition_id: Some(condition_id.max(0) as u32),
                    })?;
                    applied += 1;
                }
                DataEventKind::Changed => {
                    debug!("ignoring change on path {}", event.path);
                }
                DataEventKind::Deleted => {
                    debug!("ignoring deletion on path {}", event.path);
                }
            }
        }

        Ok(applied)
    }

    pub fn store(&self) -> &PrefsStore<B> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryBackend;

    fn weather_map(high: f64, low: f64, id: i32) -> DataMap {
        let mut map = DataMap::new();
        map.insert(HIGH_TEMP_KEY, FieldValue::F64(high));
        map.insert(LOW_TEMP_KEY, FieldValue::F64(low));
        map.insert(CONDITION_ID_KEY, FieldValue::I32(id));
        map
    }

    fn receiver_with_shared_backend() -> (SyncReceiver<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = PrefsStore::open(backend.clone()).unwrap();
        (SyncReceiver::new(store), backend)
    }

    #[test]
    fn weather_events_are_persisted() {
        let (mut receiver, backend) = receiver_with_shared_backend();

        let applied = receiver
            .on_data_changed(&[DataEvent::changed(
                WEATHER_PATH,
                weather_map(21.5, 11.0, 800),
            )])
            .unwrap();
        assert_eq!(applied, 1);

        let mut reader = PrefsStore::open(backend).unwrap();
        let prefs = reader.reload().unwrap();
        assert_eq!(prefs.high_temp, Some(21.5));
        assert_eq!(prefs.low_temp, Some(11.0));
        assert_eq!(prefs.condition_id, Some(800));
    }

    #[test]
    fn foreign_paths_and_deletions_are_skipped() {
        let (mut receiver, _backend) = receiver_with_shared_backend();

        let applied = receiver
            .on_data_changed(&[
                DataEvent::changed("/notifications", weather_map(30.0, 20.0, 800)),
                DataEvent::deleted(WEATHER_PATH),
            ])
            .unwrap();

        assert_eq!(applied, 0);
        assert_eq!(receiver.store().snapshot(), WeatherPrefs::default());
    }

    #[test]
    fn last_event_in_a_batch_wins() {
        let (mut receiver, _backend) = receiver_with_shared_backend();

        receiver
            .on_data_changed(&[
                DataEvent::changed(WEATHER_PATH, weather_map(25.0, 15.0, 800)),
                DataEvent::changed(WEATHER_PATH, weather_map(4.0, -3.0, 601)),
            ])
            .unwrap();

        let prefs = receiver.store().snapshot();
        assert_eq!(prefs.high_temp, Some(4.0));
        assert_eq!(prefs.condition_id, Some(601));
    }

    #[test]
    fn missing_fields_decode_as_zero() {
        let (mut receiver, _backend) = receiver_with_shared_backend();

        let mut map = DataMap::new();
        map.insert(HIGH_TEMP_KEY, FieldValue::F64(19.0));
        // Low and condition id deliberately absent.

        receiver
            .on_data_changed(&[DataEvent::changed(WEATHER_PATH, map)])
            .unwrap();

        let prefs = receiver.store().snapshot();
        assert_eq!(prefs.high_temp, Some(19.0));
        assert_eq!(prefs.low_temp, Some(0.0));
        assert_eq!(prefs.condition_id, Some(0));
    }

    #[test]
    fn getters_coerce_between_scalar_kinds() {
        let mut map = DataMap::new();
        map.insert("n", FieldValue::I32(7));
        map.insert("f", FieldValue::F64(3.9));

        assert_eq!(map.get_f64("n"), 7.0);
        assert_eq!(map.get_i32("f"), 3);
        assert_eq!(map.get_f64("absent"), 0.0);
        assert_eq!(map.get_i32("absent"), 0);
    }

    #[test]
    fn inserting_an_existing_key_replaces_it() {
        let mut map = DataMap::new();
        map.insert("k", FieldValue::I32(1));
        map.insert("k", FieldValue::I32(2));
        assert_eq!(map.get_i32("k"), 2);
    }
}
