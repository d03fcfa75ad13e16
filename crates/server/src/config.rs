pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub max_peers: usize,
    pub max_frame_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_peers: 32,
            max_frame_bytes: 64 * 1024,
        }
    }
}
