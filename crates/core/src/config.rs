use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub push: PushConfig,
    pub trigger: TriggerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `UPKEEP_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("UPKEEP_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            postgres: PostgresConfig::from_env_profiled(p),
            push: PushConfig::from_env_profiled(p),
            trigger: TriggerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{} (cors={})", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  postgres:    host={}, db={}", self.postgres.host, self.postgres.database);
        tracing::info!(
            "  push:        gateway={}, key={}, timeout={}s",
            self.push.gateway_url.as_deref().unwrap_or("(none)"),
            if self.push.server_key.is_some() { "set" } else { "unset" },
            self.push.timeout_secs
        );
        tracing::info!(
            "  trigger:     cron={}, token={}",
            self.trigger.cron.as_deref().unwrap_or("(external)"),
            if self.trigger.token.is_some() { "set" } else { "unset" }
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Full connection URL; overrides the individual fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl PostgresConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "DATABASE_URL"),
            host: profiled_env_or(p, "PG_HOST", "localhost"),
            port: profiled_env_u16(p, "PG_PORT", 5432),
            database: profiled_env_or(p, "PG_DATABASE", "upkeep"),
            username: profiled_env_opt(p, "PG_USERNAME"),
            password: profiled_env_opt(p, "PG_PASSWORD"),
            ssl_mode: profiled_env_or(p, "PG_SSL_MODE", "prefer"),
            max_connections: profiled_env_u32(p, "PG_MAX_CONNECTIONS", 5),
        }
    }

    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let user = self.username.as_deref().unwrap_or("postgres");
        let pass = self.password.as_deref().unwrap_or("");
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, pass, self.host, self.port, self.database, self.ssl_mode
        )
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.username.is_some()
    }
}

// ── Push provider ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Provider endpoint accepting `{subscription, payload}` deliveries.
    pub gateway_url: Option<String>,
    /// Sent as `Authorization: key=<server_key>`.
    pub server_key: Option<String>,
    pub timeout_secs: u64,
    pub icon: String,
    pub badge: String,
    /// Prefix for work order deep links (empty = relative links).
    pub app_base_url: String,
}

impl PushConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            gateway_url: profiled_env_opt(p, "PUSH_GATEWAY_URL"),
            server_key: profiled_env_opt(p, "PUSH_SERVER_KEY"),
            timeout_secs: profiled_env_u64(p, "PUSH_TIMEOUT_SECS", 10),
            icon: profiled_env_or(p, "PUSH_ICON", "/icons/icon-192x192.png"),
            badge: profiled_env_or(p, "PUSH_BADGE", "/icons/badge-72x72.png"),
            app_base_url: profiled_env_or(p, "APP_BASE_URL", "")
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Gateway URL and server key, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.gateway_url.as_deref()?, self.server_key.as_deref()?))
    }
}

// ── Trigger ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// In-process cron schedule; `None` leaves triggering to an external scheduler.
    pub cron: Option<String>,
    /// Bearer token required on the HTTP trigger when set.
    pub token: Option<String>,
}

impl TriggerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            cron: profiled_env_opt(p, "ESCALATION_CRON"),
            token: profiled_env_opt(p, "TRIGGER_TOKEN"),
        }
    }
}
