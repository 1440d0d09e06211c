// render_loop.rs: per-frame loop that can be stopped, plus FPS accounting

use std::time::{Duration, Instant};
use winit::event_loop::ControlFlow;

pub struct RenderLoop {
    running: bool,
    frames: u64,
    window_start: Instant,
    window_frames: u32,
    fps: f32,
}

impl RenderLoop {
    pub fn new(now: Instant) -> Self {
        Self {
            running: false,
            frames: 0,
            window_start: now,
            window_frames: 0,
            fps: 0.0,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if !self.running {
            log::debug!("render loop started");
            self.running = true;
            self.window_start = now;
            self.window_frames = 0;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("render loop stopped after {} frames", self.frames);
            self.running = false;
            self.fps = 0.0;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Poll while running so frames keep coming; otherwise sleep until an event.
    pub fn control_flow(&self) -> ControlFlow {
        if self.running {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        }
    }

    /// Call once per drawn frame. Returns false if the loop is stopped and the
    /// frame should be skipped.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.frames += 1;
        self.window_frames += 1;

        let elapsed = now.duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.window_frames as f32 / elapsed.as_secs_f32();
            self.window_frames = 0;
            self.window_start = now;
        }
        true
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_loop_draws_nothing_and_waits() {
        let t0 = Instant::now();
        let mut l = RenderLoop::new(t0);
        assert!(!l.is_running());
        assert!(!l.tick(t0));
        assert_eq!(l.frames, 0);
        assert_eq!(l.control_flow(), ControlFlow::Wait);
    }

    #[test]
    fn running_loop_polls_and_counts_frames() {
        let t0 = Instant::now();
        let mut l = RenderLoop::new(t0);
        l.start(t0);
        assert_eq!(l.control_flow(), ControlFlow::Poll);
        for i in 1..=3 {
            assert!(l.tick(t0 + Duration::from_millis(i * 10)));
        }
        assert_eq!(l.frames, 3);

        l.stop();
        assert!(!l.tick(t0 + Duration::from_millis(50)));
        assert_eq!(l.frames, 3);
        assert_eq!(l.control_flow(), ControlFlow::Wait);
    }

    #[test]
    fn fps_is_measured_over_one_second_windows() {
        let t0 = Instant::now();
        let mut l = RenderLoop::new(t0);
        l.start(t0);
        for i in 1..=60u64 {
            l.tick(t0 + Duration::from_micros(i * 16_667));
        }
        assert!((l.fps() - 60.0).abs() < 0.5, "fps {}", l.fps());
    }
}
