// Stable error codes returned to API clients and written to logs

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod transcription {
    /// Upstream speech-to-text call failed
    pub const SERVICE_ERROR: &str = "TRANSCRIPTION_5001";
    /// Speech-to-text succeeded but produced no text
    pub const EMPTY_TRANSCRIPT: &str = "TRANSCRIPTION_5002";
}

pub mod structuring {
    /// Note structuring failed; recovered locally, never surfaced
    pub const SOFT_FAILURE: &str = "STRUCTURING_6001";
}

pub mod session {
    pub const NOT_FOUND: &str = "SESSION_7001";
    pub const STORE_UNAVAILABLE: &str = "SESSION_7002";
}

pub mod configuration {
    pub const INVALID_VALUE: &str = "CONFIG_8001";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
}
