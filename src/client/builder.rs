use crate::client::core::OpenRouterClient;
use crate::config::{ModelParameters, ResponseFormat, ServiceConfiguration, ServiceOptions};
use crate::structured::ResultValidator;
use crate::telemetry::{ErrorReport, ErrorReporter, ErrorStage, TracingErrorReporter};
use crate::transport::HttpTransport;
use crate::Result;
use arc_swap::{ArcSwap, ArcSwapOption};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

static MISSING_KEY_WARNING: OnceCell<()> = OnceCell::new();

/// Builder for [`OpenRouterClient`].
///
/// Explicit settings win over the environment, which wins over the baked-in
/// defaults. Keep this surface area small and predictable.
pub struct OpenRouterClientBuilder {
    options: ServiceOptions,
    use_env: bool,
    reporter: Arc<dyn ErrorReporter>,
    timeout: Option<Duration>,
    app_url: Option<String>,
    app_title: Option<String>,
    result_schema: Option<Value>,
}

impl OpenRouterClientBuilder {
    pub fn new() -> Self {
        Self {
            options: ServiceOptions::new(),
            use_env: true,
            reporter: Arc::new(TracingErrorReporter),
            timeout: None,
            app_url: None,
            app_title: None,
            result_schema: None,
        }
    }

    /// Start from a full set of options, e.g. loaded with
    /// [`ServiceOptions::from_yaml_file`].
    pub fn options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.options.api_key = Some(api_key.into());
        self
    }

    /// Override the chat-completions URL (primarily for testing with mock servers).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.endpoint = Some(endpoint.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    pub fn parameters(mut self, parameters: ModelParameters) -> Self {
        self.options.parameters = Some(parameters);
        self
    }

    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.options.system_message = Some(message.into());
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.options.response_format = Some(format);
        self
    }

    /// Ignore the environment and the OS keyring.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Inject an error reporter. Default emits `tracing` error events.
    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// HTTP timeout for the whole exchange.
    ///
    /// Defaults to `OPENROUTER_HTTP_TIMEOUT_SECS`, or 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Application URL and title sent as OpenRouter attribution headers.
    pub fn app_attribution(
        mut self,
        app_url: impl Into<String>,
        app_title: impl Into<String>,
    ) -> Self {
        self.app_url = Some(app_url.into());
        self.app_title = Some(app_title.into());
        self
    }

    /// Validate results against a stricter contract than the default one.
    pub fn result_schema(mut self, schema: Value) -> Self {
        self.result_schema = Some(schema);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OpenRouterClient> {
        let reporter = self.reporter;
        let report = |e: crate::Error| {
            reporter.report(ErrorReport::from_error(ErrorStage::Configure, &e));
            e
        };

        let config = if self.use_env {
            ServiceConfiguration::from_options(self.options)
        } else {
            ServiceConfiguration::default().merged(self.options)
        }
        .map_err(report)?;

        if !config.has_api_key() {
            warn_missing_key_once(&MISSING_KEY_WARNING);
        }

        let transport = match self.timeout {
            Some(timeout) => HttpTransport::with_timeout(timeout),
            None => HttpTransport::new(),
        }
        .map_err(report)?
        .with_attribution(self.app_url, self.app_title);

        let validator = match &self.result_schema {
            Some(schema) => ResultValidator::with_schema(schema),
            None => ResultValidator::new(),
        }
        .map_err(report)?;

        tracing::debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            api_key = %config.masked_api_key(),
            "OpenRouter client configured"
        );

        Ok(OpenRouterClient {
            config: ArcSwap::from_pointee(config),
            reconfigure_lock: Mutex::new(()),
            last_payload: ArcSwapOption::empty(),
            transport,
            validator,
            reporter,
        })
    }
}

fn warn_missing_key_once(warned: &OnceCell<()>) {
    warned.get_or_init(|| {
        tracing::warn!(
            "no OpenRouter API key configured; set OPENROUTER_API_KEY or pass one to the builder"
        );
    });
}

impl Default for OpenRouterClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
