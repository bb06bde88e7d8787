/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a job posting. Completions reference jobs but never own them.
pub type JobId = String;

/// Identifier of the client who posted a job.
pub type ClientId = String;

/// Identifier of a completion record (`completion_<uuid>`).
pub type CompletionId = String;
