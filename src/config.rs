use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Static admin secret; `None` means the admin surface is open.
    pub admin_secret: Option<String>,
    pub bot_token: Option<String>,
    pub admin_chat_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://zen.db?mode=rwc".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3001);
        let admin_secret = env::var("ADMIN_SECRET").ok().filter(|s| !s.is_empty());
        let bot_token = env::var("BOT_TOKEN").ok().filter(|s| !s.is_empty());
        let admin_chat_id = env::var("ADMIN_CHAT_ID").ok().filter(|s| !s.is_empty());
        Self {
            database_url,
            host,
            port,
            admin_secret,
            bot_token,
            admin_chat_id,
        }
    }
}
