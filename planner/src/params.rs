//! Persisted driver preferences.
//!
//! Gap presets are stored as decimal strings in tenths of a second, one key per
//! preset, and read once when a controller is built.

use std::{collections::HashMap, fs, io, path::PathBuf};

use crate::PlannerError;

/// Keys of the three configurable gap presets, for cruise gap settings 2 to 4.
pub const GAP_KEYS: [&str; 3] = ["CruiseGap2", "CruiseGap3", "CruiseGap4"];

/// Read-only key/value parameter source.
pub trait ParamStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlannerError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    values: HashMap<String, String>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ParamStore for MemoryParams {
    fn get(&self, key: &str) -> Result<Option<String>, PlannerError> {
        Ok(self.values.get(key).cloned())
    }
}

/// One file per key under `root`, the on-device parameter layout.
#[derive(Debug, Clone)]
pub struct FileParams {
    root: PathBuf,
}

impl FileParams {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ParamStore for FileParams {
    fn get(&self, key: &str) -> Result<Option<String>, PlannerError> {
        match fs::read_to_string(self.root.join(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PlannerError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// The three user-configured time headways, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapPresets([f32; 3]);

impl GapPresets {
    pub fn new(values: [f32; 3]) -> Result<Self, PlannerError> {
        for (&value, key) in values.iter().zip(GAP_KEYS) {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::InvalidGap { key, value });
            }
        }
        Ok(Self(values))
    }

    pub fn load(store: &dyn ParamStore) -> Result<Self, PlannerError> {
        let mut values = [0.0; 3];
        for (value, key) in values.iter_mut().zip(GAP_KEYS) {
            *value = read_tenths(store, key)?;
        }
        Self::new(values)
    }

    pub fn values(&self) -> [f32; 3] {
        self.0
    }
}

fn read_tenths(store: &dyn ParamStore, key: &'static str) -> Result<f32, PlannerError> {
    let raw = store.get(key)?.ok_or(PlannerError::MissingParam(key))?;
    let tenths: f32 = raw.trim().parse().map_err(|_| PlannerError::InvalidParam {
        key,
        value: raw.clone(),
    })?;
    Ok(tenths / 10.0)
}
