//! The `goals` commands.

use presentos_api::{NewGoal, SchedulingBackend};
use presentos_identity::IdentityProvider;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::view::{TtyView, View};

/// Lists the signed-in user's goals.
pub async fn list(config: &ClientConfig) -> ClientResult<()> {
    let provider = super::identity_from(config)?;
    let backend = super::backend_from(config);

    let token = provider.current_token().await?;
    let goals = backend.list_goals(&token).await?;

    TtyView::new().show_goals(&goals);
    Ok(())
}

/// Creates a goal.
pub async fn create(
    name: String,
    description: Option<String>,
    avatar: Option<String>,
    config: &ClientConfig,
) -> ClientResult<()> {
    let provider = super::identity_from(config)?;
    let backend = super::backend_from(config);

    let mut goal = NewGoal::new(name);
    if let Some(description) = description {
        goal = goal.with_description(description);
    }
    if let Some(avatar) = avatar {
        goal = goal.with_avatar(avatar);
    }

    let token = provider.current_token().await?;
    let created = backend.create_goal(&token, &goal).await?;

    println!("Created goal {} ({})", created.name, created.id);
    Ok(())
}
