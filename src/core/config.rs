use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use super::error::ConfigError;

/// Fragment id after which the OCR text gets a line break. Rekognition
/// assigns ids in detection order, so this lands roughly after the first
/// block of lines on most receipts.
pub const DEFAULT_LINE_BREAK_ID: i32 = 15;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Fail the record; see `Pipeline::run` for how that reaches the invocation.
    Abort,
    /// Log the failure and carry on with the next record.
    Skip,
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailureMode::Abort),
            "skip" => Ok(FailureMode::Skip),
            other => Err(format!("expected `abort` or `skip`, got `{}`", other)),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Abort => write!(f, "abort"),
            FailureMode::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    pub ocr: FailureMode,
    pub model: FailureMode,
    pub unparseable_reply: FailureMode,
    pub dispatch: FailureMode,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy {
            ocr: FailureMode::Abort,
            model: FailureMode::Abort,
            unparseable_reply: FailureMode::Abort,
            dispatch: FailureMode::Skip,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model_id: String,
    pub transaction_endpoint: Url,
    pub line_break_id: Option<i32>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub failure_policy: FailurePolicy,
}

impl Config {
    pub fn new(model_id: impl Into<String>, transaction_endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            model_id: model_id.into(),
            transaction_endpoint: parse_endpoint(transaction_endpoint)?,
            line_break_id: Some(DEFAULT_LINE_BREAK_ID),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            failure_policy: FailurePolicy::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let mut config = Config::new(
            require("MODEL_ID")?,
            &require("CREATE_TRANSACTION_ENDPOINT")?,
        )?;

        if let Some(raw) = get("OCR_LINE_BREAK_ID") {
            config.line_break_id = parse_line_break_id(&raw)?;
        }
        if let Some(raw) = get("MODEL_MAX_TOKENS") {
            config.max_tokens = raw.parse().map_err(|e| ConfigError::Invalid {
                name: "MODEL_MAX_TOKENS",
                reason: format!("{}", e),
            })?;
        }
        if let Some(raw) = get("MODEL_TEMPERATURE") {
            config.temperature = parse_temperature(&raw)?;
        }

        let mode = |name: &'static str, default: FailureMode| -> Result<FailureMode, ConfigError> {
            match get(name) {
                Some(raw) => raw
                    .parse()
                    .map_err(|reason| ConfigError::Invalid { name, reason }),
                None => Ok(default),
            }
        };
        let defaults = FailurePolicy::default();
        config.failure_policy = FailurePolicy {
            ocr: mode("FAILURE_MODE_OCR", defaults.ocr)?,
            model: mode("FAILURE_MODE_MODEL", defaults.model)?,
            unparseable_reply: mode("FAILURE_MODE_UNPARSEABLE_REPLY", defaults.unparseable_reply)?,
            dispatch: mode("FAILURE_MODE_DISPATCH", defaults.dispatch)?,
        };

        Ok(config)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "CREATE_TRANSACTION_ENDPOINT",
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{}`", other))),
    }
}

fn parse_temperature(raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "MODEL_TEMPERATURE",
        reason,
    };

    let temperature: f32 = raw.parse().map_err(|e| invalid(format!("{}", e)))?;
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(invalid(format!("expected a finite, non-negative number, got `{}`", raw)));
    }
    Ok(temperature)
}

fn parse_line_break_id(raw: &str) -> Result<Option<i32>, ConfigError> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e| ConfigError::Invalid {
        name: "OCR_LINE_BREAK_ID",
        reason: format!("{}", e),
    })
}
