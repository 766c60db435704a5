use crate::event::EventHandled;
use anyhow::Result;

pub use crate::context::Context;

mod commands;
mod debug;
mod ignore_bots;
mod join_role;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used for debug
    fn name(&self) -> &'static str;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    /// handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context, event: &crate::event::Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    use crate::plugin::*;

    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(ignore_bots::IgnoreBots),
        // Chat commands
        Box::new(commands::Commands),
        // Guild membership
        Box::new(join_role::JoinRole),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(name: &str) -> usize {
        plugins()
            .iter()
            .position(|plugin| plugin.name() == name)
            .unwrap_or_else(|| panic!("plugin {} is not registered", name))
    }

    #[test]
    fn bots_are_ignored_before_commands_run() {
        assert!(position("ignore_bots") < position("commands"));
    }

    #[test]
    fn debug_sees_every_event_first() {
        assert_eq!(position("debug"), 0);
    }
}
