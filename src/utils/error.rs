/// Application-wide error type.
///
/// Every failure the poll loop can hit is classified here; the loop itself
/// swallows all of them and backs off, so no variant is fatal to the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request never produced an HTTP response (connect failure,
    /// timeout, DNS).
    #[error("status API request failed: {0}")]
    Transport(String),

    /// The status API answered with a non-success HTTP status.
    #[error("status API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body decoded, but carries an error marker instead of
    /// homework data.
    #[error("status API returned an error: [{code}] {message}")]
    Api { code: String, message: String },

    /// The response body did not decode as the expected JSON shape.
    #[error("malformed status API response: {0}")]
    JsonParseFailed(String),

    /// The submission carries a status outside the known vocabulary.
    #[error("unknown homework status: \"{0}\"")]
    UnknownStatus(String),

    /// Telegram refused or never received the message.
    #[error("telegram send failed: {0}")]
    Notify(String),
}

impl AppError {
    /// Whether the failure is worth a quiet retry.
    ///
    /// Connectivity problems, 429 and 5xx answers come and go on their own;
    /// everything else (auth failures, malformed bodies, unknown statuses)
    /// will repeat identically until something outside the loop changes.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Transport(_) => true,
            AppError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            AppError::Notify(_) => true,
            AppError::Api { .. } | AppError::JsonParseFailed(_) | AppError::UnknownStatus(_) => {
                false
            }
        }
    }
}
