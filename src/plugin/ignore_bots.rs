use crate::{event::*, plugin::*};
use anyhow::Result;

/// Swallows messages from bots, this one included, so nothing else answers them
pub struct IgnoreBots;

fn is_from_bot(event: &Event) -> bool {
    matches!(event, Event::Message(msg) if msg.author.bot)
}

#[serenity::async_trait]
impl Plugin for IgnoreBots {
    fn name(&self) -> &'static str {
        "ignore_bots"
    }

    async fn handle(&self, _ctx: &Context, event: &Event) -> Result<EventHandled> {
        if is_from_bot(event) {
            Ok(EventHandled::Yes)
        } else {
            Ok(EventHandled::No)
        }
    }
}
