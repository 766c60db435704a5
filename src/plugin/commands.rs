use crate::{event::*, plugin::*};
use anyhow::Result;
use serenity::all::Message;

/// Exact message text and the fixed reply it gets.  Add a row to add a command.
const COMMANDS: &[(&str, &str)] = &[
    ("!ping", "Pong!"),
    (
        "!specs",
        "Here's the current specs that Pochama's running https://pcpartpicker.com/list/CbqrTY",
    ),
];

/// Static text commands
pub struct Commands;

/// The command message and its reply, if `event` is one of the commands
fn command_reply(event: &Event) -> Option<(&Message, &'static str)> {
    COMMANDS
        .iter()
        .find_map(|(cmd, reply)| event.is_exact_cmd(cmd).map(|msg| (msg, *reply)))
}

#[serenity::async_trait]
impl Plugin for Commands {
    fn name(&self) -> &'static str {
        "commands"
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((msg, reply)) = command_reply(event) else {
            return Ok(EventHandled::No);
        };

        msg.channel_id.say(ctx.cache_http, reply).await?;
        Ok(EventHandled::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> Event {
        let mut msg = Message::default();
        msg.content = content.to_owned();
        Event::Message(msg)
    }

    fn reply(content: &str) -> Option<&'static str> {
        command_reply(&message(content)).map(|(_, reply)| reply)
    }

    #[test]
    fn ping_gets_pong() {
        assert_eq!(reply("!ping"), Some("Pong!"));
    }

    #[test]
    fn specs_links_the_part_list() {
        let specs = reply("!specs").unwrap();
        assert!(specs.contains("https://pcpartpicker.com/list/CbqrTY"));
    }

    #[test]
    fn only_exact_text_matches() {
        assert_eq!(reply("!ping extra"), None);
        assert_eq!(reply(" !ping"), None);
        assert_eq!(reply("!PING"), None);
        assert_eq!(reply("ping"), None);
        assert_eq!(reply(""), None);
    }
}
