use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const DEFAULT_LOADING_TEXT: &str = "Loading magical content";
pub const DEFAULT_DURATION_MS: u64 = 1500;
pub const DEFAULT_FADE_IN_DURATION_MS: u64 = 600;

/// Visual style of the placeholder displayed while a panel is loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    /// Animated leaves with a caption and three bouncing dots
    #[default]
    Spinner,
    /// Static silhouette blocks mimicking the content layout
    Skeleton,
}

/// Configuration snapshot of a [`PanelLoader`](crate::PanelLoader).
///
/// The serialized form uses the camelCase keys embedding pages already know
/// (`loaderType`, `loadingText`, `duration`, `fadeInDuration`). Keys the
/// loader does not recognize are kept in [`LoaderOptions::extra`] so they
/// survive a merge untouched.
///
/// # Examples
///
/// ```
/// use panel_loader::{LoaderOptions, LoaderType};
///
/// let options = LoaderOptions::merged(serde_json::json!({
///     "loaderType": "skeleton",
///     "duration": 800,
/// }))
/// .unwrap();
/// assert_eq!(options.loader_type, LoaderType::Skeleton);
/// assert_eq!(options.duration_ms, 800);
/// assert_eq!(options.fade_in_duration_ms, 600);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    pub loader_type: LoaderType,
    /// Caption displayed next to the spinner
    pub loading_text: String,
    /// Minimum time the placeholder stays visible, in milliseconds
    #[serde(rename = "duration", deserialize_with = "deserialize_millis")]
    pub duration_ms: u64,
    /// Length of the hide transition, in milliseconds
    #[serde(rename = "fadeInDuration", deserialize_with = "deserialize_millis")]
    pub fade_in_duration_ms: u64,
    /// Unrecognized keys, passed through as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Accepts any JSON number as milliseconds: fractions are rounded, negative
/// values clamp to zero and values past `u64::MAX` saturate
fn deserialize_millis<'de, D>(deserializer: D) -> core::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    Ok(if millis > 0.0 { millis.round() as u64 } else { 0 })
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            loader_type: LoaderType::default(),
            loading_text: DEFAULT_LOADING_TEXT.to_owned(),
            duration_ms: DEFAULT_DURATION_MS,
            fade_in_duration_ms: DEFAULT_FADE_IN_DURATION_MS,
            extra: BTreeMap::new(),
        }
    }
}

impl LoaderOptions {
    /// Builds options from the defaults overridden by a partial JSON object.
    ///
    /// `null` is accepted and means "no overrides".
    pub fn merged(overrides: Value) -> Result<Self> {
        Self::default().merge(overrides)
    }

    /// Parses a JSON object and merges it on top of the defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::merged(serde_json::from_str(json)?)
    }

    /// Returns a copy of `self` with every key of `overrides` written on top.
    ///
    /// The merge is shallow and last-write-wins: a key present in `overrides`
    /// always replaces the current value, recognized or not.
    pub fn merge(&self, overrides: Value) -> Result<Self> {
        let overrides = match overrides {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Err(Error::OptionsNotAnObject(other.to_string())),
        };
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(overrides);
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    pub fn with_loader_type(mut self, loader_type: LoaderType) -> Self {
        self.loader_type = loader_type;
        self
    }

    pub fn with_loading_text(mut self, loading_text: impl Into<String>) -> Self {
        self.loading_text = loading_text.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = saturating_millis(duration);
        self
    }

    pub fn with_fade_in_duration(mut self, fade_in_duration: Duration) -> Self {
        self.fade_in_duration_ms = saturating_millis(fade_in_duration);
        self
    }

    /// Minimum display time of the placeholder
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Length of the fade performed by `hide()`
    pub fn fade_in_duration(&self) -> Duration {
        Duration::from_millis(self.fade_in_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = LoaderOptions::default();
        assert_eq!(options.loader_type, LoaderType::Spinner);
        assert_eq!(options.loading_text, "Loading magical content");
        assert_eq!(options.duration(), Duration::from_millis(1500));
        assert_eq!(options.fade_in_duration(), Duration::from_millis(600));
        assert!(options.extra.is_empty());
    }

    #[test]
    fn test_null_overrides_keep_defaults() {
        let options = LoaderOptions::merged(Value::Null).unwrap();
        assert_eq!(options, LoaderOptions::default());
    }

    #[test]
    fn test_recognized_keys_override_defaults() {
        let options = LoaderOptions::merged(json!({
            "loaderType": "skeleton",
            "loadingText": "Brewing",
            "duration": 200,
            "fadeInDuration": 100,
        }))
        .unwrap();
        assert_eq!(options.loader_type, LoaderType::Skeleton);
        assert_eq!(options.loading_text, "Brewing");
        assert_eq!(options.duration_ms, 200);
        assert_eq!(options.fade_in_duration_ms, 100);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let options = LoaderOptions::merged(json!({ "theme": "forest", "retries": 2 })).unwrap();
        assert_eq!(options.extra.get("theme"), Some(&json!("forest")));
        assert_eq!(options.extra.get("retries"), Some(&json!(2)));
        assert_eq!(options.loader_type, LoaderType::Spinner);
    }

    #[test]
    fn test_merge_is_last_write_wins() {
        let first = LoaderOptions::merged(json!({ "theme": "forest", "duration": 10 })).unwrap();
        let second = first
            .merge(json!({ "theme": "desert", "loadingText": "" }))
            .unwrap();
        assert_eq!(second.extra.get("theme"), Some(&json!("desert")));
        assert_eq!(second.duration_ms, 10);
        assert_eq!(second.loading_text, "");
    }

    #[test]
    fn test_unknown_loader_type_is_rejected() {
        let result = LoaderOptions::merged(json!({ "loaderType": "bubbles" }));
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let result = LoaderOptions::merged(json!([1, 2, 3]));
        assert!(matches!(result, Err(Error::OptionsNotAnObject(_))));
    }

    #[test]
    fn test_from_json_str() {
        let options = LoaderOptions::from_json_str(r#"{"fadeInDuration": 250}"#).unwrap();
        assert_eq!(options.fade_in_duration(), Duration::from_millis(250));
        assert!(LoaderOptions::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = serde_json::to_value(LoaderOptions::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in ["loaderType", "loadingText", "duration", "fadeInDuration"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object["loaderType"], json!("spinner"));
    }

    #[test]
    fn test_fractional_and_negative_millis() {
        let options = LoaderOptions::merged(json!({
            "duration": 1500.0,
            "fadeInDuration": -5,
        }))
        .unwrap();
        assert_eq!(options.duration_ms, 1500);
        assert_eq!(options.fade_in_duration_ms, 0);

        let options = LoaderOptions::merged(json!({ "duration": 249.6, "fadeInDuration": -0.5 }))
            .unwrap();
        assert_eq!(options.duration_ms, 250);
        assert_eq!(options.fade_in_duration_ms, 0);

        assert!(LoaderOptions::merged(json!({ "duration": "soon" })).is_err());
    }

    #[test]
    fn test_huge_durations_saturate() {
        let options = LoaderOptions::default()
            .with_duration(Duration::MAX)
            .with_fade_in_duration(Duration::from_secs(u64::MAX / 10));
        assert_eq!(options.duration_ms, u64::MAX);
        assert_eq!(options.fade_in_duration_ms, u64::MAX);
        assert_eq!(saturating_millis(Duration::from_millis(42)), 42);
    }

    #[test]
    fn test_builders() {
        let options = LoaderOptions::default()
            .with_loader_type(LoaderType::Skeleton)
            .with_loading_text("Hold on")
            .with_duration(Duration::from_secs(2))
            .with_fade_in_duration(Duration::from_millis(300));
        assert_eq!(options.loader_type, LoaderType::Skeleton);
        assert_eq!(options.loading_text, "Hold on");
        assert_eq!(options.duration_ms, 2000);
        assert_eq!(options.fade_in_duration_ms, 300);
    }
}
