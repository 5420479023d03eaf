//! Process-wide serializer settings
//!
//! Settings are read once. Call [`configure`] at startup before any
//! serializer is validated; afterwards [`get`] returns the same value for the
//! lifetime of the process.
//!
//! ```toml
//! non_field_errors_key = "errors"
//! max_depth = 8
//! ```

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static SETTINGS: OnceCell<Settings> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("Settings were already configured")]
	AlreadyConfigured,
}

/// Serializer behaviour that is shared by every schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Key used for errors that do not belong to a single field
	pub non_field_errors_key: String,
	/// Deepest nesting level validation descends into
	pub max_depth: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			non_field_errors_key: "non_field_errors".to_string(),
			max_depth: 32,
		}
	}
}

impl Settings {
	/// Parse settings from TOML, keeping defaults for missing keys
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::settings::Settings;
	///
	/// let settings = Settings::from_toml_str("max_depth = 4").unwrap();
	/// assert_eq!(settings.max_depth, 4);
	/// assert_eq!(settings.non_field_errors_key, "non_field_errors");
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}
}

/// Install process-wide settings
///
/// Fails if settings were configured, or already read through [`get`].
pub fn configure(settings: Settings) -> Result<(), SettingsError> {
	SETTINGS.set(settings).map_err(|rejected| {
		tracing::warn!(?rejected, "ignoring settings, serializers are already configured");
		SettingsError::AlreadyConfigured
	})
}

/// Current settings, falling back to defaults
pub fn get() -> &'static Settings {
	SETTINGS.get_or_init(Settings::default)
}
