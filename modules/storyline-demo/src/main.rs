mod config;
mod signup;

use anyhow::{bail, Result};
use serde_json::json;
use storyline::{Engine, JsonStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::DemoConfig;
use signup::{signup, signup_store, SignupEffects, EMAIL_SUBMITTED, PASSCODE_SUBMITTED};

/// Answer every effect the storyline has queued, one at a time, until none remain.
async fn drain_effects(
    engine: &Engine<JsonStore>,
    effects: &SignupEffects,
    config: &DemoConfig,
) -> Result<()> {
    while let Some(effect) = engine.pending_effects().into_iter().next() {
        let value = effects.answer(&effect, config)?;
        engine.resolve_effect(&effect, value).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("storyline=info".parse()?))
        .init();

    info!("Storyline demo starting...");

    let config = DemoConfig::from_env();
    config.log();

    let effects = SignupEffects::new();
    let engine = {
        let effects = effects.clone();
        Engine::new(move |api| signup(api, effects), signup_store())
    };

    engine
        .dispatch(json!({"type": EMAIL_SUBMITTED, "email": config.email}))
        .await?;
    drain_effects(&engine, &effects, &config).await?;

    engine
        .dispatch(json!({"type": PASSCODE_SUBMITTED, "passcode": config.passcode}))
        .await?;
    drain_effects(&engine, &effects, &config).await?;

    if let Some(e) = engine.failure() {
        bail!("signup storyline failed: {e:#}");
    }
    if !engine.is_done() {
        bail!("signup storyline stalled in {:?}", engine.phase());
    }

    let history = engine.history();
    info!(actions = history.len(), "Signup storyline completed");
    for entry in &history {
        info!(seq = entry.seq, origin = ?entry.origin, action = %entry.action, "Applied");
    }
    println!("{}", serde_json::to_string_pretty(&engine.get_state())?);

    Ok(())
}
