//! Service configuration: endpoint, model, sampling parameters, response format,
//! system message and credential.
//!
//! Values are layered, highest precedence first:
//!
//! 1. explicit [`ServiceOptions`] passed to the builder,
//! 2. the environment (see [`ServiceOptions::from_env`]),
//! 3. the baked-in defaults of [`ServiceConfiguration::default`].
//!
//! A configuration is never edited in place. [`ServiceConfiguration::merged`]
//! produces a new value, which the client swaps in atomically.

mod options;

pub use options::ServiceOptions;

use crate::structured::schema::SchemaGenerator;
use crate::{Error, ErrorContext, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fmt;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openrouter-llm-v1";
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant. Answer the user's message concisely.";
pub const DEFAULT_SCHEMA_NAME: &str = "ChatResponse";

/// Sampling knobs forwarded verbatim to the provider.
///
/// Unset knobs are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
}

impl ModelParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Key-by-key merge: every knob set in `overlay` wins, the rest are kept.
    pub fn merged(&self, overlay: &ModelParameters) -> Self {
        Self {
            temperature: overlay.temperature.or(self.temperature),
            top_p: overlay.top_p.or(self.top_p),
            max_tokens: overlay.max_tokens.or(self.max_tokens),
            frequency_penalty: overlay.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: overlay.presence_penalty.or(self.presence_penalty),
        }
    }

    /// Parameters as a JSON object, ready to be spread into a request body.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// Response format tag. OpenRouter only accepts schema-constrained output here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseFormatKind {
    #[default]
    #[serde(rename = "json_schema")]
    JsonSchema,
}

/// The `json_schema` member of a response format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

/// `response_format` descriptor sent with every request.
///
/// ```
/// use openrouter_chat::config::ResponseFormat;
///
/// let format = ResponseFormat::default();
/// let wire = serde_json::to_value(&format).unwrap();
/// assert_eq!(wire["type"], "json_schema");
/// assert_eq!(wire["json_schema"]["name"], "ChatResponse");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type", default)]
    pub kind: ResponseFormatKind,
    pub json_schema: JsonSchemaSpec,
}

impl ResponseFormat {
    pub fn new(name: impl Into<String>, strict: bool, schema: serde_json::Value) -> Self {
        Self {
            kind: ResponseFormatKind::JsonSchema,
            json_schema: JsonSchemaSpec {
                name: name.into(),
                strict,
                schema,
            },
        }
    }

    /// Derive the schema from a Rust type.
    pub fn for_type<T: JsonSchema>(name: impl Into<String>, strict: bool) -> Self {
        Self::new(
            name,
            strict,
            crate::structured::schema::json_schema_from_type::<T>(),
        )
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        let schema = SchemaGenerator::new()
            .add_property("message", json!({"type": "string"}))
            .add_property("metadata", json!({"type": "object"}))
            .set_required(&["message".to_string()])
            .build();
        Self::new(DEFAULT_SCHEMA_NAME, true, schema)
    }
}

/// Effective configuration of one client instance.
#[derive(Clone, PartialEq)]
pub struct ServiceConfiguration {
    pub endpoint: String,
    pub model: String,
    pub parameters: ModelParameters,
    pub response_format: ResponseFormat,
    pub system_message: String,
    api_key: String,
}

impl Default for ServiceConfiguration {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            parameters: ModelParameters {
                temperature: Some(0.7),
                top_p: Some(1.0),
                max_tokens: Some(150),
                frequency_penalty: None,
                presence_penalty: None,
            },
            response_format: ResponseFormat::default(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            api_key: String::new(),
        }
    }
}

impl ServiceConfiguration {
    /// Resolve explicit options over the environment over the defaults.
    pub fn from_options(options: ServiceOptions) -> Result<Self> {
        Self::default().merged(options.or(ServiceOptions::from_env()))
    }

    /// A new configuration with every field present in `options` applied.
    ///
    /// Omitted fields, and empty strings, leave the current value untouched.
    /// Parameters merge key-by-key.
    pub fn merged(&self, options: ServiceOptions) -> Result<Self> {
        let mut next = self.clone();

        if let Some(endpoint) = non_empty(options.endpoint) {
            validate_endpoint(&endpoint)?;
            next.endpoint = endpoint;
        }
        if let Some(model) = non_empty(options.model) {
            next.model = model;
        }
        if let Some(parameters) = options.parameters {
            next.parameters = next.parameters.merged(&parameters);
        }
        if let Some(format) = options.response_format {
            next.response_format = format;
        }
        if let Some(system_message) = non_empty(options.system_message) {
            next.system_message = system_message;
        }
        if let Some(api_key) = non_empty(options.api_key) {
            next.api_key = api_key;
        }

        Ok(next)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Short SHA-256 fingerprint of the credential, safe to log.
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            return "<none>".to_string();
        }
        let digest = Sha256::digest(self.api_key.as_bytes());
        let hex: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
        format!("sha256:{}", hex)
    }
}

impl fmt::Debug for ServiceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfiguration")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("parameters", &self.parameters)
            .field("response_format", &self.response_format)
            .field("system_message", &self.system_message)
            .field("api_key", &self.masked_api_key())
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let context = || {
        ErrorContext::new()
            .with_field_path("config.endpoint")
            .with_source("config_loader")
    };
    let parsed = url::Url::parse(endpoint).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid endpoint URL '{}'", endpoint),
            context().with_details(e.to_string()),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::configuration_with_context(
            format!("unsupported endpoint scheme '{}'", other),
            context(),
        )),
    }
}
