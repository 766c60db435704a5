//! Watches a YouTube channel and announces each live stream once in a Discord channel.
//!
//! The monitor only remembers the last stream it announced.  It never notices a stream ending, so
//! if the same video id ever came back live it would stay quiet.

use crate::{config::Config, log_error, log_internal, youtube::watch_url};
use anyhow::{anyhow, Result};
use serenity::all::{ChannelId, CreateMessage, GuildId, Http};
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;

/// Finds broadcasts that are live right now
#[serenity::async_trait]
pub trait LiveSearch: Send + Sync {
    /// Ids of the channel's live videos, most relevant first.  Empty if nobody is live.
    async fn live_video_ids(&self, api_key: &str, channel_id: &str) -> Result<Vec<String>>;
}

/// Where live notifications go
#[serenity::async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, content: &str) -> Result<()>;
}

pub struct LiveSettings {
    pub api_key: Option<String>,
    /// YouTube channel to watch
    pub channel_id: String,
    /// Notification text; `{url}` becomes the watch URL
    pub message: String,
    pub poll_interval: Duration,
}

impl From<&Config> for LiveSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            api_key: cfg.youtube.api_key().map(str::to_owned),
            channel_id: cfg.youtube.channel_id.clone(),
            message: cfg.notify.message.clone(),
            poll_interval: cfg.youtube.poll_interval(),
        }
    }
}

/// What a single live check did
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// No API key; nothing was asked of YouTube
    MissingApiKey,
    NotLive,
    /// Live, but this stream was already announced
    AlreadyNotified(String),
    Announced(String),
}

pub struct LiveMonitor<S, A> {
    settings: LiveSettings,
    search: S,
    announcer: A,
    /// Video id of the most recently announced stream
    last_notified: Option<String>,
}

impl<S: LiveSearch, A: Announcer> LiveMonitor<S, A> {
    pub fn new(settings: LiveSettings, search: S, announcer: A) -> Self {
        Self {
            settings,
            search,
            announcer,
            last_notified: None,
        }
    }

    /// Check once whether the channel is live and announce the stream if it's new.
    ///
    /// `last_notified` only moves once the announcement went out, so a failed send is retried on
    /// the next check.
    pub async fn poll(&mut self) -> Result<PollOutcome> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            log_internal!("YouTube API key is not set, skipping live check");
            return Ok(PollOutcome::MissingApiKey);
        };

        let video_ids = self
            .search
            .live_video_ids(api_key, &self.settings.channel_id)
            .await?;

        let Some(current) = video_ids.into_iter().next() else {
            log_internal!("No live stream found");
            return Ok(PollOutcome::NotLive);
        };

        if self.last_notified.as_deref() == Some(current.as_str()) {
            return Ok(PollOutcome::AlreadyNotified(current));
        }

        let url = watch_url(&current);
        let content = self.settings.message.replace("{url}", &url);
        self.announcer.announce(&content).await?;

        self.last_notified = Some(current.clone());
        Ok(PollOutcome::Announced(current))
    }

    /// Check on a fixed interval, starting immediately, forever.
    ///
    /// Checks never overlap: the next tick is only awaited once the current check is done, and
    /// ticks missed meanwhile are skipped.  A failed check is logged and does not stop the loop.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.poll().await {
                Ok(PollOutcome::Announced(video_id)) => {
                    log_internal!("Announced live stream {}", watch_url(&video_id))
                }
                Ok(PollOutcome::AlreadyNotified(video_id)) => {
                    log_internal!("Live stream {} was already announced", video_id)
                }
                Ok(PollOutcome::MissingApiKey | PollOutcome::NotLive) => {}
                Err(e) => log_error!("Live check failed: {:#}", e),
            }
        }
    }
}

/// Posts to one text channel of one guild
pub struct ChannelAnnouncer {
    http: Arc<Http>,
    guild_id: GuildId,
    channel_id: ChannelId,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>, guild_id: GuildId, channel_id: ChannelId) -> Self {
        Self {
            http,
            guild_id,
            channel_id,
        }
    }
}

#[serenity::async_trait]
impl Announcer for ChannelAnnouncer {
    async fn announce(&self, content: &str) -> Result<()> {
        // The channel must really be in the configured guild
        let channel = self
            .channel_id
            .to_channel(&self.http)
            .await?
            .guild()
            .ok_or(anyhow!("Channel {} is not a guild channel", self.channel_id))?;

        if channel.guild_id != self.guild_id {
            return Err(anyhow!(
                "Channel {} is in guild {}, not {}",
                self.channel_id,
                channel.guild_id,
                self.guild_id
            ));
        }

        self.channel_id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;

        Ok(())
    }
}
