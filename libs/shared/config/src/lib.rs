use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub supabase_service_role_key: String,
    pub cloudflare_realtime_app_id: String,
    pub cloudflare_realtime_api_token: String,
    pub cloudflare_realtime_base_url: String,
    pub video_join_base_url: String,
    pub upstream_timeout_ms: u64,
    pub escalation_interval_seconds: u64,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: string_var("SUPABASE_URL", None),
            supabase_anon_key: string_var("SUPABASE_ANON_PUBLIC_KEY", None),
            supabase_jwt_secret: string_var("SUPABASE_JWT_SECRET", None),
            // Falls back to the anon key, see `storage_key`.
            supabase_service_role_key: string_var("SUPABASE_SERVICE_ROLE_KEY", None),
            cloudflare_realtime_app_id: string_var("CLOUDFLARE_REALTIME_APP_ID", None),
            cloudflare_realtime_api_token: string_var("CLOUDFLARE_REALTIME_API_TOKEN", None),
            cloudflare_realtime_base_url: string_var(
                "CLOUDFLARE_REALTIME_BASE_URL",
                Some("https://rtc.live.cloudflare.com/v1"),
            ),
            video_join_base_url: string_var(
                "VIDEO_JOIN_BASE_URL",
                Some("https://app.stixconnect.local/video"),
            ),
            upstream_timeout_ms: parse_or_default("UPSTREAM_TIMEOUT_MS", 5_000),
            escalation_interval_seconds: parse_or_default("ESCALATION_INTERVAL_SECONDS", 30),
            server_port: parse_or_default("SERVER_PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Persistence not configured - running with in-memory storage");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_video_conferencing_configured(&self) -> bool {
        !self.cloudflare_realtime_app_id.is_empty()
            && !self.cloudflare_realtime_api_token.is_empty()
            && !self.cloudflare_realtime_base_url.is_empty()
    }

    /// Key used for server-side PostgREST calls. The service role key bypasses
    /// row level security; without it requests run under the anon key.
    pub fn storage_key(&self) -> &str {
        if self.supabase_service_role_key.is_empty() {
            &self.supabase_anon_key
        } else {
            &self.supabase_service_role_key
        }
    }
}

fn string_var(key: &str, default: Option<&str>) -> String {
    env::var(key).unwrap_or_else(|_| match default {
        Some(value) => {
            warn!("{} not set, using default {}", key, value);
            value.to_string()
        }
        None => {
            warn!("{} not set, using empty value", key);
            String::new()
        }
    })
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
