use super::{ModelParameters, ResponseFormat};
use crate::Result;
use keyring::Entry;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;

const KEYRING_SERVICE: &str = "openrouter";
const KEYRING_USER: &str = "api_key";

/// Partial configuration. Every field is optional; absent fields never
/// overwrite anything.
///
/// Used both for construction and for
/// [`OpenRouterClient::reconfigure`](crate::OpenRouterClient::reconfigure).
///
/// ```
/// use openrouter_chat::config::{ModelParameters, ServiceOptions};
///
/// let options = ServiceOptions::from_yaml_str(
///     "model: mistralai/mistral-7b-instruct\nparameters:\n  temperature: 0.3\n",
/// )
/// .unwrap();
/// assert_eq!(options.model.as_deref(), Some("mistralai/mistral-7b-instruct"));
/// assert_eq!(options.parameters, Some(ModelParameters::new().temperature(0.3)));
/// ```
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceOptions {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub parameters: Option<ModelParameters>,
    pub response_format: Option<ResponseFormat>,
    pub system_message: Option<String>,
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Options sourced from the process environment.
    ///
    /// - `OPENROUTER_API_KEY` (the OS keyring entry `openrouter/api_key` is tried first,
    ///   unless `OPENROUTER_DISABLE_KEYRING=1`)
    /// - `OPENROUTER_API_ENDPOINT`
    /// - `OPENROUTER_MODEL`
    /// - `OPENROUTER_SYSTEM_MESSAGE`
    /// - `OPENROUTER_TEMPERATURE`, `OPENROUTER_TOP_P`, `OPENROUTER_MAX_TOKENS`
    pub fn from_env() -> Self {
        let parameters = ModelParameters {
            temperature: env_parse("OPENROUTER_TEMPERATURE"),
            top_p: env_parse("OPENROUTER_TOP_P"),
            max_tokens: env_parse("OPENROUTER_MAX_TOKENS"),
            frequency_penalty: None,
            presence_penalty: None,
        };

        Self {
            api_key: Self::lookup_api_key(),
            endpoint: env_string("OPENROUTER_API_ENDPOINT"),
            model: env_string("OPENROUTER_MODEL"),
            parameters: (parameters != ModelParameters::default()).then_some(parameters),
            response_format: None,
            system_message: env_string("OPENROUTER_SYSTEM_MESSAGE"),
        }
    }

    fn lookup_api_key() -> Option<String> {
        // 1. Try Keyring
        if env::var("OPENROUTER_DISABLE_KEYRING").ok().as_deref() != Some("1") {
            if let Some(key) = Entry::new(KEYRING_SERVICE, KEYRING_USER)
                .ok()
                .and_then(|entry| entry.get_password().ok())
                .filter(|k| !k.is_empty())
            {
                return Some(key);
            }
        }

        // 2. Try Environment Variable
        env_string("OPENROUTER_API_KEY")
    }

    /// Parse options from YAML (JSON is accepted too, being a YAML subset).
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Fill every field missing (or empty) here from `fallback`. Parameters merge key-by-key,
    /// with this side winning.
    pub fn or(self, fallback: ServiceOptions) -> ServiceOptions {
        let parameters = match (fallback.parameters, self.parameters) {
            (Some(base), Some(top)) => Some(base.merged(&top)),
            (base, top) => top.or(base),
        };
        ServiceOptions {
            api_key: non_empty(self.api_key).or(fallback.api_key),
            endpoint: non_empty(self.endpoint).or(fallback.endpoint),
            model: non_empty(self.model).or(fallback.model),
            parameters,
            response_format: self.response_format.or(fallback.response_format),
            system_message: non_empty(self.system_message).or(fallback.system_message),
        }
    }
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("parameters", &self.parameters)
            .field("response_format", &self.response_format)
            .field("system_message", &self.system_message)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_options_win_over_fallback() {
        let explicit = ServiceOptions::new()
            .with_model("explicit/model")
            .with_parameters(ModelParameters::new().temperature(0.1));
        let env = ServiceOptions::new()
            .with_model("env/model")
            .with_endpoint("https://proxy.local/v1/chat/completions")
            .with_parameters(ModelParameters::new().temperature(0.9).max_tokens(64));

        let resolved = explicit.or(env);
        assert_eq!(resolved.model.as_deref(), Some("explicit/model"));
        assert_eq!(
            resolved.endpoint.as_deref(),
            Some("https://proxy.local/v1/chat/completions")
        );
        assert_eq!(
            resolved.parameters,
            Some(ModelParameters::new().temperature(0.1).max_tokens(64))
        );
    }

    #[test]
    fn test_empty_explicit_key_falls_back() {
        let resolved = ServiceOptions::new()
            .with_api_key("")
            .or(ServiceOptions::new().with_api_key("sk-env"));
        assert_eq!(resolved.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_empty_explicit_strings_fall_back() {
        let resolved = ServiceOptions::new()
            .with_endpoint("")
            .with_model("  ")
            .with_system_message("")
            .or(ServiceOptions::new()
                .with_endpoint("https://proxy.local/v1/chat/completions")
                .with_model("env/model")
                .with_system_message("from env"));
        assert_eq!(
            resolved.endpoint.as_deref(),
            Some("https://proxy.local/v1/chat/completions")
        );
        assert_eq!(resolved.model.as_deref(), Some("env/model"));
        assert_eq!(resolved.system_message.as_deref(), Some("from env"));
    }

    #[test]
    fn test_yaml_rejects_unknown_fields() {
        assert!(ServiceOptions::from_yaml_str("retries: 3\n").is_err());
    }

    #[test]
    fn test_yaml_response_format() {
        let options = ServiceOptions::from_yaml_str(
            r#"
response_format:
  type: json_schema
  json_schema:
    name: Recipe
    strict: false
    schema:
      title: string
"#,
        )
        .unwrap();
        let format = options.response_format.unwrap();
        assert_eq!(format.json_schema.name, "Recipe");
        assert!(!format.json_schema.strict);
        assert_eq!(format.json_schema.schema["title"], "string");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", ServiceOptions::new().with_api_key("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
