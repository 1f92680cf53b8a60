//! Sample settings, persisted as JSON in the user's config directory.

use std::path::{Path, PathBuf};

use mailsend::{GmailProvider, MailProvider, TransportConfig};
use serde::{Deserialize, Serialize};

/// Which relay the sample sends through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSetting {
    /// Gmail SMTP over SSL.
    #[default]
    Gmail,
    /// Any relay described by raw `mail.smtp.*` properties.
    Custom {
        /// Transport properties.
        properties: TransportConfig,
    },
}

impl ProviderSetting {
    /// Resolves the setting to a provider.
    pub fn provider(&self) -> Box<dyn MailProvider> {
        match self {
            Self::Gmail => Box::new(GmailProvider),
            Self::Custom { properties } => Box::new(properties.clone()),
        }
    }
}

/// Persisted sample settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Account to authenticate as; also the default sender.
    #[serde(default)]
    pub username: Option<String>,
    /// Relay selection.
    #[serde(default)]
    pub provider: ProviderSetting,
}

/// Default settings location.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailsend")
        .join("settings.json")
}

/// Load settings from file, or defaults if the file does not exist.
pub async fn load(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save settings to file, creating the directory if needed.
pub async fn save(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let contents = serde_json::to_string_pretty(settings)?;
    tokio::fs::write(path, contents).await?;
    tracing::info!("Settings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsend::provider::keys;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load(&dir.path().join("settings.json")).await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.provider, ProviderSetting::Gmail);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            username: Some("me@example.com".into()),
            provider: ProviderSetting::Custom {
                properties: TransportConfig::new()
                    .with(keys::HOST, "relay.example.com")
                    .with(keys::STARTTLS_ENABLE, "true"),
            },
        };

        save(&path, &settings).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), settings);
    }

    #[test]
    fn parses_handwritten_json() {
        let json = r#"{
            "username": "me@gmail.com",
            "provider": { "kind": "custom", "properties": { "mail.smtp.host": "smtp.local", "mail.smtp.port": "2525" } }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        let config = settings.provider.provider().properties().unwrap();
        assert_eq!(config.port().unwrap(), 2525);

        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.provider.provider().name(), "Gmail");
    }
}
