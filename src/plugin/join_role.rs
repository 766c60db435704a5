use crate::{
    event::*,
    helper::{find_role_by_name, GuildIdHelper},
    log_error, log_internal,
    logging::PrintColor,
    plugin::*,
};
use anyhow::Result;
use serenity::all::{Http, Member, RoleId};

/// Gives newly joined members the configured role
pub struct JoinRole;

/// Something that can give one member a role
#[serenity::async_trait]
pub trait RoleGrant: Send + Sync {
    async fn grant(&self, role_id: RoleId) -> Result<()>;
}

struct MemberRoleGrant<'a> {
    http: &'a Http,
    member: &'a Member,
}

#[serenity::async_trait]
impl RoleGrant for MemberRoleGrant<'_> {
    async fn grant(&self, role_id: RoleId) -> Result<()> {
        self.http
            .add_member_role(
                self.member.guild_id,
                self.member.user.id,
                role_id,
                Some("Assigned on join"),
            )
            .await
            .map_err(Into::into)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinRoleOutcome {
    /// The guild has no role by that name, so nothing was attempted
    NoSuchRole,
    Assigned,
    /// Discord refused; logged and left alone
    Failed,
}

/// Grant the role named exactly `role_name`, once.  Failures are logged, never returned.
pub async fn grant_role_named<G: RoleGrant + ?Sized>(
    granter: &G,
    roles: &[(RoleId, String)],
    role_name: &str,
) -> JoinRoleOutcome {
    let Some(role_id) = find_role_by_name(roles, role_name) else {
        log_error!("Role {} not found, check the role name", role_name.color());
        return JoinRoleOutcome::NoSuchRole;
    };

    match granter.grant(role_id).await {
        Ok(()) => JoinRoleOutcome::Assigned,
        Err(e) => {
            log_error!("Error assigning role {}: {}", role_name.color(), e);
            JoinRoleOutcome::Failed
        }
    }
}

#[serenity::async_trait]
impl Plugin for JoinRole {
    fn name(&self) -> &'static str {
        "join_role"
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Event::GuildMemberAddition(member) = event else {
            return Ok(EventHandled::No);
        };

        let role_name = ctx.cfg.read().await.join_role.role_name.clone();
        let roles = member.guild_id.role_names(ctx).await?;
        let granter = MemberRoleGrant {
            http: ctx.http,
            member,
        };

        if let JoinRoleOutcome::Assigned = grant_role_named(&granter, &roles, &role_name).await {
            log_internal!(
                "Successfully assigned {} role to {}",
                role_name.color(),
                member.user.color()
            );
        }

        Ok(EventHandled::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGrant {
        granted: Mutex<Vec<RoleId>>,
        fail: bool,
    }

    #[serenity::async_trait]
    impl RoleGrant for FakeGrant {
        async fn grant(&self, role_id: RoleId) -> Result<()> {
            self.granted.lock().unwrap().push(role_id);
            if self.fail {
                return Err(anyhow!("Missing Permissions"));
            }
            Ok(())
        }
    }

    fn roles() -> Vec<(RoleId, String)> {
        vec![
            (RoleId::new(10), "@everyone".to_owned()),
            (RoleId::new(20), "tester".to_owned()),
        ]
    }

    #[tokio::test]
    async fn existing_role_is_granted_once() {
        let granter = FakeGrant::default();

        let outcome = grant_role_named(&granter, &roles(), "tester").await;

        assert_eq!(outcome, JoinRoleOutcome::Assigned);
        assert_eq!(*granter.granted.lock().unwrap(), vec![RoleId::new(20)]);
    }

    #[tokio::test]
    async fn missing_role_is_not_attempted() {
        let granter = FakeGrant::default();
        let roles = vec![(RoleId::new(10), "@everyone".to_owned())];

        let outcome = grant_role_named(&granter, &roles, "tester").await;

        assert_eq!(outcome, JoinRoleOutcome::NoSuchRole);
        assert!(granter.granted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn grant_failure_is_swallowed_and_not_retried() {
        let granter = FakeGrant {
            fail: true,
            ..Default::default()
        };

        let outcome = grant_role_named(&granter, &roles(), "tester").await;

        assert_eq!(outcome, JoinRoleOutcome::Failed);
        assert_eq!(granter.granted.lock().unwrap().len(), 1);
    }
}
