use std::env;

use crate::services::llm::LlmProvider;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    /// Extra CORS origins, e.g. for testing from another device on the LAN.
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    // Text generation
    pub llm_provider: LlmProvider,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub ollama_url: String,
    pub ollama_chat_model: String,
    pub ollama_diary_model: String,
    pub llm_timeout_secs: u64,

    // Documents
    pub ocr_service_url: Option<String>,
    pub max_upload_bytes: usize,

    pub mood_window_days: i64,
}

/// Same bounds the trend endpoint accepts for `window_days`.
const MOOD_WINDOW_DAYS: std::ops::RangeInclusive<i64> = 1..=365;

fn parse_mood_window(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|days| days.clamp(*MOOD_WINDOW_DAYS.start(), *MOOD_WINDOW_DAYS.end()))
        .unwrap_or(7)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("JWT_ACCESS_TTL_SECS must be a number"),
            jwt_refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".into())
                .parse()
                .expect("JWT_REFRESH_TTL_SECS must be a number"),

            llm_provider: env::var("LLM_PROVIDER")
                .unwrap_or_else(|_| "ollama".into())
                .parse()
                .expect("LLM_PROVIDER must be 'anthropic' or 'ollama'"),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".into()),
            ollama_chat_model: env::var("OLLAMA_CHAT_MODEL").unwrap_or_else(|_| "mistral".into()),
            ollama_diary_model: env::var("OLLAMA_DIARY_MODEL")
                .unwrap_or_else(|_| "tinyllama".into()),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),

            ocr_service_url: env::var("OCR_SERVICE_URL").ok().filter(|s| !s.is_empty()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "10485760".into()) // 10 MiB
                .parse()
                .unwrap_or(10 * 1024 * 1024),

            mood_window_days: parse_mood_window(env::var("MOOD_WINDOW_DAYS").ok().as_deref()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for unit tests; never reads the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/healthmate_test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: "test-secret".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 604800,
            llm_provider: LlmProvider::Ollama,
            anthropic_api_key: String::new(),
            anthropic_model: "test-model".into(),
            ollama_url: "http://localhost:11434".into(),
            ollama_chat_model: "mistral".into(),
            ollama_diary_model: "tinyllama".into(),
            llm_timeout_secs: 5,
            ocr_service_url: None,
            max_upload_bytes: 1024 * 1024,
            mood_window_days: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_window_is_clamped() {
        assert_eq!(parse_mood_window(None), 7);
        assert_eq!(parse_mood_window(Some("30")), 30);
        assert_eq!(parse_mood_window(Some("0")), 1);
        assert_eq!(parse_mood_window(Some("-4")), 1);
        assert_eq!(parse_mood_window(Some("200000000")), 365);
        assert_eq!(parse_mood_window(Some("weekly")), 7);
    }
}
