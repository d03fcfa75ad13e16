#[derive(Debug, Clone)]
pub struct NetConfig {
    pub flush_interval_ms: u64,
    pub position_interval_ms: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 100,
            position_interval_ms: 100,
        }
    }
}
