pub mod api;
pub mod mode;

pub use mode::Mode;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::env;
    use std::fmt;

    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
    pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
    pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

    /// Connection and sampling settings for the completion provider.
    #[derive(Clone, Serialize, Deserialize)]
    pub struct UpstreamSettings {
        /// Bearer credential. Left empty when unset; the provider rejects it.
        pub api_key: String,
        pub base_url: String,
        pub model: String,
        pub temperature: f32,
        pub max_tokens: u32,
    }

    impl UpstreamSettings {
        /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `MENTOR_MODEL`.
        pub fn from_env() -> Self {
            let defaults = Self::default();
            Self {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
                model: non_empty_var("MENTOR_MODEL").unwrap_or(defaults.model),
                ..defaults
            }
        }
    }

    impl Default for UpstreamSettings {
        fn default() -> Self {
            Self {
                api_key: String::new(),
                base_url: DEFAULT_BASE_URL.into(),
                model: DEFAULT_MODEL.into(),
                temperature: 0.7,
                max_tokens: 1500,
            }
        }
    }

    impl fmt::Debug for UpstreamSettings {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("UpstreamSettings")
                .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
                .field("base_url", &self.base_url)
                .field("model", &self.model)
                .field("temperature", &self.temperature)
                .field("max_tokens", &self.max_tokens)
                .finish()
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ServerSettings {
        pub bind_addr: String, // e.g., "127.0.0.1:3000"
        pub upstream: UpstreamSettings,
    }

    impl ServerSettings {
        pub fn from_env() -> Self {
            Self {
                bind_addr: non_empty_var("MENTOR_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
                upstream: UpstreamSettings::from_env(),
            }
        }
    }

    impl Default for ServerSettings {
        fn default() -> Self {
            Self {
                bind_addr: DEFAULT_BIND_ADDR.into(),
                upstream: UpstreamSettings::default(),
            }
        }
    }

    /// Desktop client settings
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ClientSettings {
        pub server_url: String,
    }

    impl ClientSettings {
        pub fn from_env() -> Self {
            Self {
                server_url: non_empty_var("MENTOR_SERVER_URL")
                    .unwrap_or_else(|| DEFAULT_SERVER_URL.into()),
            }
        }
    }

    impl Default for ClientSettings {
        fn default() -> Self {
            Self {
                server_url: DEFAULT_SERVER_URL.into(),
            }
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        System,
        User,
        Assistant,
    }

    /// One message in a conversation. Never edited after creation.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Turn {
        pub role: Role,
        pub content: String,
    }

    impl Turn {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: Role::System,
                content: content.into(),
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: Role::User,
                content: content.into(),
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: Role::Assistant,
                content: content.into(),
            }
        }
    }
}
