// Error codes implementation
// Stable codes attached to every AptekaError, safe to show in logs and metrics

pub mod input {
    pub const INPUT_TOO_LARGE: &str = "INPUT_1001";
}

pub mod voice {
    pub const TRANSCRIPTION_TRANSIENT: &str = "VOICE_2001";
    pub const TRANSCRIPTION_PERMANENT: &str = "VOICE_2002";
}

pub mod validation {
    pub const INVALID_PAYLOAD: &str = "VALIDATION_3001";
}

pub mod database {
    pub const PERSISTENCE_FAILED: &str = "DB_4001";
}

pub mod dispatch {
    pub const DELIVERY_FAILED: &str = "DISPATCH_5001";
}

pub mod config {
    pub const INVALID_CONFIGURATION: &str = "CONFIG_6001";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
}
