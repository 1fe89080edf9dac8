use std::time::Instant;

/// Fixed-timestep frame clock.
///
/// Wall-clock time is fed into an accumulator once per rendered frame;
/// `should_step` then hands out fixed `fixed_dt` slices, each of which becomes
/// one ECS frame. Very long frames are capped so the simulation never tries to
/// catch up on seconds of backlog.
pub struct FrameClock {
    pub fixed_dt: f32,
    pub max_frame_dt: f32,
    accumulator: f32,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f32,
    last_instant: Instant,
}

impl FrameClock {
    pub fn new(fixed_dt: f32, max_frame_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_frame_dt,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
        }
    }

    /// Measure wall-clock time since the previous call and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed an explicit amount of real time.
    pub fn advance(&mut self, real_dt: f32) {
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping to {:.1}ms",
                self.real_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.real_dt = self.max_frame_dt;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += f64::from(self.fixed_dt);
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 0.25)
    }
}
