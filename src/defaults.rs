//! Default values shared across the client.

/// HTTP-level defaults.
pub mod http {
    /// Base address used by the CLI when none is configured.
    pub const BASE_URL: &str = "http://192.168.0.111";
    /// Content type sent with every request.
    pub const CONTENT_TYPE: &str = "application/json";
    /// User agent sent with every request.
    pub const USER_AGENT: &str = concat!("misty-client/", env!("CARGO_PKG_VERSION"));
}

/// REST paths on the device.
pub mod endpoints {
    pub const AUDIO: &str = "/api/audio";
    pub const AUDIO_LIST: &str = "/api/audio/list";
    pub const IMAGES: &str = "/api/images";
    pub const IMAGES_LIST: &str = "/api/images/list";
    pub const SPEECH_CAPTURE: &str = "/api/audio/speech/capture";
    pub const RECORDING_STOP: &str = "/api/audio/recording/stop";
}

/// Voice capture defaults.
pub mod capture {
    use std::time::Duration;

    pub const FILE_NAME: &str = "capture_Dialogue.wav";
    pub const MAX_SPEECH_LENGTH_MS: u64 = 10_000;
    pub const SILENCE_TIMEOUT_MS: u64 = 5_000;
    /// Added to the max speech length when waiting on a fixed delay.
    pub const COMPLETION_GRACE: Duration = Duration::from_secs(1);
    pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
}

/// Query/body keys understood by the device.
pub mod keys {
    pub const FILE_NAME: &str = "FileName";
    pub const RESULT: &str = "result";
}

/// Local output defaults.
pub mod output {
    pub const DOWNLOAD_DIR: &str = "downloads";
    pub const TRANSCRIPTION_FILE: &str = "transcription.txt";
}
