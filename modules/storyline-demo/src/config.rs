use std::env;

/// Demo inputs loaded from environment variables (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub email: String,
    pub passcode: String,
    pub user_id: String,
}

impl DemoConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            email: env::var("STORYLINE_EMAIL").unwrap_or_else(|_| "foo@bar.com".to_string()),
            passcode: env::var("STORYLINE_PASSCODE").unwrap_or_else(|_| "123456".to_string()),
            user_id: env::var("STORYLINE_USER_ID").unwrap_or_else(|_| "uuid-1".to_string()),
        }
    }

    pub fn log(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  STORYLINE_EMAIL: {}", self.email);
        let preview: String = self.passcode.chars().take(2).collect();
        tracing::info!("  STORYLINE_PASSCODE: {}...({} chars)", preview, self.passcode.len());
        tracing::info!("  STORYLINE_USER_ID: {}", self.user_id);
    }
}
