use skirmish::GameStats;

/// Frames slower than this multiple of the target frame time count as late.
const LATE_FRAME_FACTOR: f32 = 1.5;

/// What happened between two status lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Window {
    pub frames: u32,
    pub late_frames: u32,
    pub fps: f32,
    pub worst_frame_ms: f32,
    pub inbound_applied: u64,
    pub inbound_dropped: u64,
    pub bullets_fired: u64,
    pub hits_dealt: u64,
    pub frames_out: u64,
}

/// Accumulates frame timing and game counters for periodic status reports.
pub struct SessionStats {
    target_frame: f32,
    frames: u32,
    late_frames: u32,
    elapsed: f32,
    worst_frame: f32,
    last_game: GameStats,
    last_frames_out: u64,
}

impl SessionStats {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            target_frame: 1.0 / frame_rate.max(1) as f32,
            frames: 0,
            late_frames: 0,
            elapsed: 0.0,
            worst_frame: 0.0,
            last_game: GameStats::default(),
            last_frames_out: 0,
        }
    }

    pub fn record_frame(&mut self, delta: f32) {
        self.frames += 1;
        self.elapsed += delta;
        self.worst_frame = self.worst_frame.max(delta);
        if delta > self.target_frame * LATE_FRAME_FACTOR {
            self.late_frames += 1;
        }
    }

    /// Closes the current window. Counters are reported as deltas since the
    /// previous call.
    pub fn take_window(&mut self, game: GameStats, frames_out: u64) -> Window {
        let fps = if self.elapsed > 0.0 {
            self.frames as f32 / self.elapsed
        } else {
            0.0
        };
        let window = Window {
            frames: self.frames,
            late_frames: self.late_frames,
            fps,
            worst_frame_ms: self.worst_frame * 1000.0,
            inbound_applied: game.inbound_applied - self.last_game.inbound_applied,
            inbound_dropped: game.inbound_dropped - self.last_game.inbound_dropped,
            bullets_fired: game.bullets_fired - self.last_game.bullets_fired,
            hits_dealt: game.hits_dealt - self.last_game.hits_dealt,
            frames_out: frames_out - self.last_frames_out,
        };

        self.frames = 0;
        self.late_frames = 0;
        self.elapsed = 0.0;
        self.worst_frame = 0.0;
        self.last_game = game;
        self.last_frames_out = frames_out;
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_reports_timing_and_counter_deltas() {
        let mut stats = SessionStats::new(50);
        for _ in 0..9 {
            stats.record_frame(0.02);
        }
        stats.record_frame(0.05);

        let game = GameStats {
            inbound_applied: 30,
            bullets_fired: 4,
            hits_dealt: 1,
            ..Default::default()
        };
        let first = stats.take_window(game, 12);
        assert_eq!(first.frames, 10);
        assert_eq!(first.late_frames, 1);
        assert!((first.worst_frame_ms - 50.0).abs() < 1e-3);
        assert!((first.fps - 10.0 / 0.23).abs() < 0.01);
        assert_eq!(first.inbound_applied, 30);
        assert_eq!(first.frames_out, 12);

        stats.record_frame(0.02);
        let later = GameStats {
            inbound_applied: 35,
            inbound_dropped: 2,
            bullets_fired: 4,
            hits_dealt: 1,
            ..Default::default()
        };
        let second = stats.take_window(later, 15);
        assert_eq!(second.frames, 1);
        assert_eq!(second.late_frames, 0);
        assert_eq!(second.inbound_applied, 5);
        assert_eq!(second.inbound_dropped, 2);
        assert_eq!(second.bullets_fired, 0);
        assert_eq!(second.frames_out, 3);
    }

    #[test]
    fn empty_window_has_no_rate() {
        let mut stats = SessionStats::new(60);
        let window = stats.take_window(GameStats::default(), 0);
        assert_eq!(window, Window::default());
    }
}
