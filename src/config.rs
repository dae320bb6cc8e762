use clap::{ArgAction, Parser};
use once_cell::sync::Lazy;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

// Upload limits
pub const MAX_SYLLABUS_FILE_BYTES: usize = 5 * 1024 * 1024; // 5MB
pub const MAX_PROFILE_PICTURE_BYTES: usize = 5 * 1024 * 1024; // 5MB
pub const MAX_REQUEST_BODY_BYTES: usize = 8 * 1024 * 1024;

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    #[clap(long, env, default_value_t = true, action = ArgAction::Set)]
    pub swagger_enabled: bool,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,

    #[clap(long, env)]
    pub database_url: String,

    #[clap(long, env, default_value_t = true, action = ArgAction::Set)]
    pub run_migrations: bool,

    #[clap(long, env, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    #[clap(long, env, default_value = "local")]
    pub app_env: String,

    /// Cookies are only marked `Secure` outside of debug mode.
    #[clap(long, env, default_value_t = false)]
    pub debug: bool,

    #[clap(long, env)]
    pub jwt_secret: String,

    #[clap(long, env, default_value_t = 60)]
    pub access_token_lifetime_secs: i64,

    #[clap(long, env, default_value_t = 86400)]
    pub refresh_token_lifetime_secs: i64,

    #[clap(long, env, default_value_t = true, action = ArgAction::Set)]
    pub rotate_refresh_tokens: bool,

    #[clap(long, env, default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Accept `Authorization: Bearer` when the access cookie is absent.
    #[clap(long, env, default_value_t = false)]
    pub allow_header_auth: bool,

    #[clap(long, env, default_value = "*")]
    pub cors_allowed_origins: String,

    #[clap(long, env, default_value = "./media")]
    pub media_root: String,

    #[clap(long, env, default_value = "/media/")]
    pub media_url: String,

    #[clap(long, env, default_value = "example.com,test.com")]
    pub blocked_email_domains: String,

    #[clap(long, env)]
    pub admin_email: String,

    #[clap(long, env)]
    pub admin_password: String,
}

impl Config {
    pub fn blocked_domains(&self) -> Vec<String> {
        self.blocked_email_domains
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn media_url_for(&self, relative_path: &str) -> String {
        format!("{}{}", self.media_url, relative_path)
    }
}
