use serde::Deserialize;

/// One homework submission as reported by the review API.
#[derive(Debug, Clone, Deserialize)]
pub struct Homework {
    pub homework_name: String,
    pub status: String,
}

/// Response body of the homework-statuses endpoint.
///
/// A successful answer carries `homeworks` (newest first) and
/// `current_date`; failures come back as a 200 with `error`/`code` markers
/// instead, so those are modeled here too.
#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub homeworks: Vec<Homework>,
    pub current_date: Option<i64>,

    pub error: Option<serde_json::Value>,
    pub code: Option<String>,
    pub message: Option<String>,
}
