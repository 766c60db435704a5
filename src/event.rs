//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks to a distinct Event enum.

use crate::{context::Context, log_error};
use serenity::all::{Member, Message, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
    GuildMemberAddition(Member),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => log_error!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    /// The message, if this event is a message whose entire content is exactly `text`.
    ///
    /// No prefix or argument parsing: `!ping extra` is not `!ping`.
    pub fn is_exact_cmd(&self, text: &str) -> Option<&Message> {
        match self {
            Event::Message(msg) if msg.content == text => Some(msg),
            _ => None,
        }
    }
}

pub enum EventHandled {
    Yes,
    No,
}
