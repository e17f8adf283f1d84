use super::*;

pub type Result<T, E = InternalError> = std::result::Result<T, E>;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub))]
pub enum InternalError {
    #[snafu(display("failed to parse '{input}': {message}"))]
    Parse { input: String, message: String },

    #[snafu(display("invalid value: {reason}"))]
    InvalidValue { reason: String },

    #[snafu(display("expected {expected} hex bytes, got {actual}"))]
    BadLength { expected: usize, actual: usize },

    #[snafu(display("subscription id already set"))]
    AlreadySubscribed,

    #[snafu(display("worker name already set"))]
    WorkerNameAlreadySet,

    #[snafu(display("cannot create a job before subscribing"))]
    NotSubscribed,

    #[snafu(display("difficulty must be non-negative, got {difficulty}"))]
    NegativeDifficulty { difficulty: f64 },
}

/// Error object carried by a Stratum JSON-RPC response (`result: null, error: [...]`).
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct JsonRpcError {
    pub error_code: i32,
    pub message: String,
    pub traceback: Option<Value>,
}

impl Serialize for JsonRpcError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.error_code, &self.message, &self.traceback).serialize(serializer)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.traceback {
            Some(traceback) => write!(
                f,
                "stratum error {}: {} (traceback: {})",
                self.error_code,
                self.message,
                serde_json::to_string(traceback).unwrap_or_else(|_| "<invalid traceback>".into())
            ),
            None => write!(f, "stratum error {}: {}", self.error_code, self.message),
        }
    }
}
