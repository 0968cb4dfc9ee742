use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Talaria.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum TalariaError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Agent run ────────────────────────────────────────────────────────
    #[error("agent: {0}")]
    Agent(#[from] AgentError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Output parsing errors ──────────────────────────────────────────────────

/// Raw model output that could not be converted into a typed decision.
///
/// `text` preserves the offending output verbatim for diagnostics and for
/// routing back to the decision-maker as an observation.
#[derive(Debug, Error)]
#[error("could not parse model output: {message}")]
pub struct OutputParseError {
    pub message: String,
    pub text: String,
}

impl OutputParseError {
    pub fn new(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            text: text.into(),
        }
    }
}

// ─── Tool errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    /// The input shape was rejected before execution.
    #[error("tool {name} rejected input: {message}")]
    InvalidInput { name: String, message: String },

    /// The tool ran and failed.
    #[error("tool {name} execution failed: {message}")]
    Execution { name: String, message: String },
}

impl ToolError {
    pub fn invalid_input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn execution(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            name: name.into(),
            message: message.into(),
        }
    }
}

// ─── Provider errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned a malformed response: {message}")]
    Malformed { provider: String, message: String },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },
}

// ─── Agent run errors ───────────────────────────────────────────────────────

/// Failures surfaced by an executor run.
///
/// Parsing and tool errors are recoverable by policy and normally become
/// observations instead of surfacing here; iteration/time limits are never
/// errors — they terminate the run with a distinguishable stop condition.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("output parsing: {0}")]
    OutputParsing(#[from] OutputParseError),

    #[error("tool: {0}")]
    Tool(#[from] ToolError),

    /// An action named a tool absent from the registry (hard-fail mode only).
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    /// The run's deadline or abort signal triggered.
    #[error("run cancelled")]
    Cancelled,

    #[error("llm: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, TalariaError>;
