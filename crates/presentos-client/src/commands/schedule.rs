//! The `schedule` command.

use presentos_api::{ActionRequest, Personality, SchedulingBackend};
use presentos_identity::IdentityProvider;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Submits a scheduling intent toward a goal.
///
/// An empty or whitespace-only prompt is rejected before any network call.
pub async fn run(
    goal: String,
    prompt: String,
    personality: Personality,
    config: &ClientConfig,
) -> ClientResult<()> {
    if prompt.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "the task prompt must not be empty".to_string(),
        ));
    }

    let provider = super::identity_from(config)?;
    let backend = super::backend_from(config);

    let request = ActionRequest::schedule_task(goal, prompt.trim(), personality);
    let token = provider.current_token().await?;
    let scheduled = backend.schedule_task(&token, &request).await?;

    if !scheduled.message.is_empty() {
        println!("{}", scheduled.message);
    }
    if let Some(ref title) = scheduled.event_title {
        println!("Scheduled: {}", title);
    }
    println!("Event: {}", scheduled.event_link);
    Ok(())
}
