//! Miscellaneous convenience methods

use crate::context::Context;
use anyhow::Result;
use serenity::all::{GuildId, RoleId};

#[serenity::async_trait]
pub trait GuildIdHelper {
    /// Every role in the guild as `(id, name)`.  Cache first, http as a fallback.
    async fn role_names(&self, ctx: &Context) -> Result<Vec<(RoleId, String)>>;
}

#[serenity::async_trait]
impl GuildIdHelper for GuildId {
    async fn role_names(&self, ctx: &Context) -> Result<Vec<(RoleId, String)>> {
        // The cache guard is not Send, so it must be gone before any await
        let cached = self.to_guild_cached(ctx.cache).map(|guild| {
            guild
                .roles
                .iter()
                .map(|(id, role)| (*id, role.name.clone()))
                .collect::<Vec<_>>()
        });

        if let Some(roles) = cached {
            return Ok(roles);
        }

        Ok(self
            .roles(ctx.http)
            .await?
            .into_iter()
            .map(|(id, role)| (id, role.name))
            .collect())
    }
}

/// Id of the role named exactly `name`, case included
pub fn find_role_by_name(roles: &[(RoleId, String)], name: &str) -> Option<RoleId> {
    roles
        .iter()
        .find(|(_, role_name)| role_name == name)
        .map(|(id, _)| *id)
}
