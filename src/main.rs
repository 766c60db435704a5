mod config;
mod context;
mod event;
mod handler;
mod helper;
mod live;
mod logging;
mod plugin;
mod youtube;

use crate::live::{ChannelAnnouncer, LiveMonitor, LiveSettings};
use serenity::{all::GatewayIntents, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = crate::config::Config::load().await?;
    let token = cfg.general.discord_token.clone();
    let live_settings = LiveSettings::from(&cfg);
    let search = crate::youtube::YouTubeSearch::new(cfg.youtube.request_timeout())?;
    let (notify_guild_id, notify_channel_id) = (cfg.notify.guild_id(), cfg.notify.channel_id());
    let handler = handler::Handler::new(cfg);

    // Things we want discord to tell us about.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    // Live checks start right away rather than waiting for the gateway; they only need http.
    let announcer = ChannelAnnouncer::new(client.http.clone(), notify_guild_id, notify_channel_id);
    tokio::spawn(LiveMonitor::new(live_settings, search, announcer).run());

    client.start().await.map_err(Into::into)
}
