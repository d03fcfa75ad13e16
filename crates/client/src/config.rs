use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub frame_rate: u32,
    pub duration: Option<Duration>,
    pub seed: Option<u64>,
    pub report_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            frame_rate: 60,
            duration: None,
            seed: None,
            report_interval: Duration::from_secs(5),
        }
    }
}
