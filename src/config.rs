use anyhow::{anyhow, Result};
use serenity::all::{ChannelId, GuildId};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::io::AsyncReadExt;

/// Project configuration, relative to the working directory.  Optional.
const CONFIG_PATH_REL_CWD: &str = "config.toml";
/// Per-user configuration, usually where the secrets live.  Optional, overrides the project file.
const CONFIG_PATH_REL_HOME: &str = ".config/kaito/config.toml";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub youtube: YouTube,
    #[serde(default)]
    pub notify: Notify,
    #[serde(default)]
    pub join_role: JoinRole,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct YouTube {
    /// YouTube Data API key.  Live checks are skipped while unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// The YouTube channel to watch for live streams
    #[serde(default = "default_youtube_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Notify {
    #[serde(default = "default_notify_guild_id")]
    pub guild_id: u64,
    #[serde(default = "default_notify_channel_id")]
    pub channel_id: u64,
    /// `{url}` is replaced with the live stream's watch URL
    #[serde(default = "default_notify_message")]
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct JoinRole {
    #[serde(default = "default_join_role_name")]
    pub role_name: String,
}

fn default_youtube_channel_id() -> String {
    "UCXziJO5wZ-tgSHG7XcxbJJQ".to_owned()
}

fn default_poll_interval_seconds() -> u64 {
    60
}

fn default_request_timeout_seconds() -> u64 {
    20
}

fn default_notify_guild_id() -> u64 {
    1277825987278540965
}

fn default_notify_channel_id() -> u64 {
    1277825987278540968
}

fn default_notify_message() -> String {
    "\u{1F534} @here ** Parzinox started doing shenanigans again! \
     Come check out what he's doing live on YouTube!**\n\
     Watch here: {url}"
        .to_owned()
}

fn default_join_role_name() -> String {
    "tester".to_owned()
}

impl Default for YouTube {
    fn default() -> Self {
        Self {
            api_key: None,
            channel_id: default_youtube_channel_id(),
            poll_interval_seconds: default_poll_interval_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for Notify {
    fn default() -> Self {
        Self {
            guild_id: default_notify_guild_id(),
            channel_id: default_notify_channel_id(),
            message: default_notify_message(),
        }
    }
}

impl Default for JoinRole {
    fn default() -> Self {
        Self {
            role_name: default_join_role_name(),
        }
    }
}

impl Config {
    fn config_paths() -> Result<Vec<PathBuf>> {
        let home = dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))?;

        // Lowest priority first
        Ok(vec![PathBuf::from(CONFIG_PATH_REL_CWD), home])
    }

    /// Read one configuration layer.  A missing file is not an error; the layer is just absent.
    async fn read_layer(path: &Path) -> Result<Option<toml::Table>> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow!(
                    "Could not open configuration at `{}`: {}",
                    path.to_string_lossy(),
                    e
                ))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let table = contents.parse::<toml::Table>().map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(Some(table))
    }

    pub async fn load() -> Result<Self> {
        let paths = Self::config_paths()?;

        let mut layers = Vec::new();
        for path in &paths {
            if let Some(layer) = Self::read_layer(path).await? {
                layers.push(layer);
            }
        }

        if layers.is_empty() {
            let searched = paths
                .iter()
                .map(|p| format!("`{}`", p.to_string_lossy()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(anyhow!("No configuration found, looked in {}", searched));
        }

        Self::from_layers(layers)
    }

    /// Merge configuration layers, later layers winning, and validate the result.
    pub fn from_layers(layers: impl IntoIterator<Item = toml::Table>) -> Result<Self> {
        let mut merged = toml::Table::new();
        for layer in layers {
            merge_table(&mut merged, layer);
        }

        let config: Config = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| anyhow!("Could not parse configuration: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.general.discord_token.trim().is_empty() {
            return Err(anyhow!("`general.discord_token` is empty"));
        }
        if self.youtube.poll_interval_seconds == 0 {
            return Err(anyhow!("`youtube.poll_interval_seconds` must be positive"));
        }
        if self.youtube.request_timeout_seconds == 0 {
            return Err(anyhow!("`youtube.request_timeout_seconds` must be positive"));
        }
        // A search must give up before the next live check is due
        if self.youtube.request_timeout_seconds >= self.youtube.poll_interval_seconds {
            return Err(anyhow!(
                "`youtube.request_timeout_seconds` ({}) must be less than `youtube.poll_interval_seconds` ({})",
                self.youtube.request_timeout_seconds,
                self.youtube.poll_interval_seconds
            ));
        }
        // Discord snowflakes are never zero, and serenity's id types refuse it
        if self.notify.guild_id == 0 || self.notify.channel_id == 0 {
            return Err(anyhow!("`notify.guild_id` and `notify.channel_id` must be set"));
        }
        Ok(())
    }
}

impl YouTube {
    /// The API key, if one is configured and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Notify {
    pub fn guild_id(&self) -> GuildId {
        GuildId::new(self.guild_id)
    }

    pub fn channel_id(&self) -> ChannelId {
        ChannelId::new(self.channel_id)
    }
}

/// Recursively merge `over` into `base`.  Tables merge key by key; anything else is replaced.
fn merge_table(base: &mut toml::Table, over: toml::Table) {
    for (key, value) in over {
        let over_table = match value {
            toml::Value::Table(over_table) => over_table,
            value => {
                base.insert(key, value);
                continue;
            }
        };

        if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
            merge_table(base_table, over_table);
            continue;
        }

        base.insert(key, toml::Value::Table(over_table));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(s: &str) -> toml::Table {
        s.parse().unwrap()
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = Config::from_layers([layer("[general]\ndiscord_token = \"abc\"\n")]).unwrap();

        assert_eq!(cfg.general.discord_token, "abc");
        assert_eq!(cfg.youtube.api_key(), None);
        assert_eq!(cfg.youtube.channel_id, "UCXziJO5wZ-tgSHG7XcxbJJQ");
        assert_eq!(cfg.youtube.poll_interval(), Duration::from_secs(60));
        assert_eq!(cfg.notify.guild_id().get(), 1277825987278540965);
        assert_eq!(cfg.notify.channel_id().get(), 1277825987278540968);
        assert!(cfg.notify.message.contains("{url}"));
        assert_eq!(cfg.join_role.role_name, "tester");
    }

    #[test]
    fn user_layer_overrides_project_layer_key_by_key() {
        let project = layer(
            "[general]\n\
             discord_token = \"project-token\"\n\
             [youtube]\n\
             channel_id = \"UCproject\"\n\
             poll_interval_seconds = 120\n",
        );
        let user = layer(
            "[general]\n\
             discord_token = \"user-token\"\n\
             [youtube]\n\
             api_key = \"secret\"\n",
        );

        let cfg = Config::from_layers([project, user]).unwrap();

        assert_eq!(cfg.general.discord_token, "user-token");
        assert_eq!(cfg.youtube.api_key(), Some("secret"));
        // Not mentioned by the user layer, so the project value survives
        assert_eq!(cfg.youtube.channel_id, "UCproject");
        assert_eq!(cfg.youtube.poll_interval_seconds, 120);
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let cfg = Config::from_layers([layer(
            "[general]\ndiscord_token = \"abc\"\n[youtube]\napi_key = \"  \"\n",
        )])
        .unwrap();

        assert_eq!(cfg.youtube.api_key(), None);
    }

    #[test]
    fn missing_token_is_rejected() {
        assert!(Config::from_layers([layer("[youtube]\napi_key = \"k\"\n")]).is_err());
        assert!(Config::from_layers([layer("[general]\ndiscord_token = \"\"\n")]).is_err());
    }

    #[test]
    fn zero_ids_and_interval_are_rejected() {
        let zero_channel = layer("[general]\ndiscord_token = \"abc\"\n[notify]\nchannel_id = 0\n");
        assert!(Config::from_layers([zero_channel]).is_err());

        let zero_interval =
            layer("[general]\ndiscord_token = \"abc\"\n[youtube]\npoll_interval_seconds = 0\n");
        assert!(Config::from_layers([zero_interval]).is_err());
    }

    #[test]
    fn request_timeout_must_fit_in_poll_interval() {
        let zero_timeout =
            layer("[general]\ndiscord_token = \"abc\"\n[youtube]\nrequest_timeout_seconds = 0\n");
        assert!(Config::from_layers([zero_timeout]).is_err());

        let equal = layer(
            "[general]\n\
             discord_token = \"abc\"\n\
             [youtube]\n\
             poll_interval_seconds = 30\n\
             request_timeout_seconds = 30\n",
        );
        assert!(Config::from_layers([equal]).is_err());

        // Only the interval shrinks, below the 20 second default timeout
        let short_interval =
            layer("[general]\ndiscord_token = \"abc\"\n[youtube]\npoll_interval_seconds = 10\n");
        assert!(Config::from_layers([short_interval]).is_err());

        let fits = layer(
            "[general]\n\
             discord_token = \"abc\"\n\
             [youtube]\n\
             poll_interval_seconds = 30\n\
             request_timeout_seconds = 29\n",
        );
        let cfg = Config::from_layers([fits]).unwrap();
        assert_eq!(cfg.youtube.request_timeout(), Duration::from_secs(29));
    }
}
