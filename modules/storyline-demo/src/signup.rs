//! The sign-up storyline and the in-process stand-ins for its effects.

use anyhow::{bail, ensure, Result};
use serde_json::{json, Value};
use storyline::{
    Action, ActionLogger, Effect, Handle, JsonStore, Middleware, Reducer, ReducerStore, Slices,
    StoreOptions, StorylineApi,
};
use tracing::info;

use crate::config::DemoConfig;

pub const EMAIL_SUBMITTED: &str = "EMAIL_SUBMITTED";
pub const PASSCODE_SUBMITTED: &str = "PASSCODE_SUBMITTED";
const EMAIL_SENT: &str = "EMAIL_SENT";
const PASSCODE_VERIFIED: &str = "PASSCODE_VERIFIED";
const ACCOUNT_CREATED: &str = "ACCOUNT_CREATED";

/// The effect symbols the storyline may request.
#[derive(Clone)]
pub struct SignupEffects {
    pub send_passcode: Handle,
    pub verify: Handle,
    pub create_account: Handle,
}

impl Default for SignupEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupEffects {
    pub fn new() -> Self {
        Self {
            send_passcode: Handle::new("sendPasscode"),
            verify: Handle::new("verify"),
            create_account: Handle::new("createAccount"),
        }
    }

    /// Play the outside world for one pending effect.
    pub fn answer(&self, effect: &Effect, config: &DemoConfig) -> Result<Value> {
        let handle = effect.handle();
        let first_arg = effect.arguments().first().cloned().unwrap_or(Value::Null);

        if handle == &self.send_passcode {
            info!(to = %first_arg, "Sending passcode");
            Ok(Value::Null)
        } else if handle == &self.verify {
            ensure!(first_arg == json!(config.passcode), "passcode rejected");
            info!(user_id = config.user_id.as_str(), "Passcode verified");
            Ok(json!(config.user_id))
        } else if handle == &self.create_account {
            info!(user_id = %first_arg, context = %effect.context(), "Creating account");
            Ok(json!(true))
        } else {
            bail!("no handler for {effect}")
        }
    }
}

fn set_on(action_type: &'static str, field: &'static str) -> impl Fn(&mut Value, &Value) {
    move |state: &mut Value, action: &Value| {
        if action.action_type() == action_type {
            *state = action[field].clone();
        }
    }
}

fn account_created(state: &mut Value, action: &Value) {
    if action.action_type() == ACCOUNT_CREATED {
        *state = json!(true);
    }
}

pub fn signup_store() -> JsonStore {
    let reducer: Box<dyn Reducer<Value, Value>> = Box::new(
        Slices::new()
            .slice("emailSent", Value::Null, set_on(EMAIL_SENT, "email"))
            .slice("userId", Value::Null, set_on(PASSCODE_VERIFIED, "userId"))
            .slice("accountCreated", false, account_created),
    );
    let logger: Box<dyn Middleware<Value, Value>> = Box::new(ActionLogger);

    ReducerStore::new(
        StoreOptions::builder()
            .initial_state(json!({}))
            .reducer(reducer)
            .middlewares(vec![logger])
            .build(),
    )
}

/// Email → passcode → account.
pub async fn signup(api: StorylineApi<JsonStore>, effects: SignupEffects) -> Result<()> {
    let submitted = api.wait_for(EMAIL_SUBMITTED).await?;
    let email = submitted["email"].clone();
    api.perform_io(Effect::io(&effects.send_passcode).arg(email.clone()))
        .await?;
    api.dispatch(json!({"type": EMAIL_SENT, "email": email}))
        .await?;

    let submitted = api.wait_for(PASSCODE_SUBMITTED).await?;
    let user_id: String = api
        .perform_io_as(Effect::io(&effects.verify).arg(submitted["passcode"].clone()))
        .await?;
    api.dispatch(json!({"type": PASSCODE_VERIFIED, "userId": user_id}))
        .await?;

    let email = api.get_state()["emailSent"].clone();
    api.perform_io(
        Effect::io(&effects.create_account)
            .with_context(json!({"email": email}))
            .arg(user_id.clone()),
    )
    .await?;
    api.dispatch(json!({"type": ACCOUNT_CREATED, "userId": user_id}))
        .await?;
    Ok(())
}
