use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Redacts credentials from text before it is shown to users or logged.
///
/// Covers `sk-...` style API keys (OpenRouter, OpenAI, Anthropic), bearer
/// tokens, and `api_key`/`token`/`secret`/`password` fields in JSON or
/// `key=value` form.
#[derive(Clone)]
pub struct SecretScrubber {
    api_key_pattern: Regex,
    bearer_pattern: Regex,
    field_pattern: Regex,
}

static SHARED: LazyLock<Option<SecretScrubber>> = LazyLock::new(|| SecretScrubber::new().ok());

impl SecretScrubber {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            api_key_pattern: Regex::new(r"sk-[A-Za-z0-9_-]{16,}")?,
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_.~+/=]+")?,
            field_pattern: Regex::new(
                r#"(?i)(["']?(?:api[_-]?key|token|secret|password)["']?\s*[:=]\s*["']?)[^"'\s,}&]+"#,
            )?,
        })
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .api_key_pattern
            .replace_all(message, "[API_KEY_REDACTED]");
        let scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
        self.field_pattern
            .replace_all(&scrubbed, "${1}[REDACTED]")
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// Scrub `message` with the process-wide scrubber.
pub fn scrub(message: &str) -> String {
    match SHARED.as_ref() {
        Some(scrubber) => scrubber.scrub_message(message),
        None => message.to_string(),
    }
}
