//! Encyclopedia endpoints and languages.

use serde::{Deserialize, Serialize};

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "ja".to_string()
}

fn default_domain() -> String {
    "wikipedia.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[wiki]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Host suffix; each language lives at `https://<lang>.<domain>`
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Required by the encyclopedia for parse, serialize, and langlink calls
    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl WikiConfig {
    /// `https://<lang>.<domain>`
    pub fn origin(&self, lang: &str) -> String {
        format!("https://{}.{}", lang, self.domain)
    }

    pub fn source_origin(&self) -> String {
        self.origin(&self.source_lang)
    }

    /// REST base of the source wiki.
    pub fn rest_base(&self) -> String {
        format!("{}/api/rest_v1", self.source_origin())
    }

    /// Action API endpoint of `lang`.
    pub fn action_api(&self, lang: &str) -> String {
        format!("{}/w/api.php", self.origin(lang))
    }

    /// Configured user agent, ignoring blank values.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.source_lang.trim().is_empty() || self.target_lang.trim().is_empty() {
            return Err("Language codes cannot be empty".to_string());
        }
        if self.source_lang == self.target_lang {
            return Err(format!(
                "Source and target language are both '{}'",
                self.source_lang
            ));
        }
        if self.domain.trim().is_empty() {
            return Err("Wiki domain cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Request timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            domain: default_domain(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
