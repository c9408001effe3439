// Battery model
//
// Continuous-time idle drain plus discrete per-transmission drain with a
// retry surcharge. This is a simulation, not a hardware measurement. The
// split between idle and transmit cost is what lets the strategy selector
// trade wake-up frequency against waiting time.

use std::time::Instant;

/// Simulated battery state. Level only ever decreases; once it reaches zero
/// the battery is dead permanently and all further drains are no-ops.
#[derive(Clone, Debug)]
pub struct Battery {
    capacity: f64,
    current: f64,
    idle_drain_per_sec: f64,
    tx_drain_base: f64,
    last_update: Instant,
    is_dead: bool,
}

impl Battery {
    /// Create a full battery, stamping the current time.
    pub fn new(capacity: f64, idle_drain_per_sec: f64, tx_drain_base: f64) -> Self {
        Self::new_at(capacity, idle_drain_per_sec, tx_drain_base, Instant::now())
    }

    /// Create a full battery with an explicit initial timestamp.
    pub fn new_at(
        capacity: f64,
        idle_drain_per_sec: f64,
        tx_drain_base: f64,
        now: Instant,
    ) -> Self {
        Self {
            capacity,
            current: capacity,
            idle_drain_per_sec,
            tx_drain_base,
            last_update: now,
            is_dead: capacity <= 0.0,
        }
    }

    /// Apply background drain for the time elapsed since the last update.
    /// Idempotent when called twice with the same timestamp (elapsed = 0).
    /// Returns the current level.
    pub fn on_idle_tick(&mut self, now: Instant) -> f64 {
        if self.is_dead {
            return 0.0;
        }

        let elapsed = now.saturating_duration_since(self.last_update);
        self.last_update = now;

        self.current -= elapsed.as_secs_f64() * self.idle_drain_per_sec;
        self.check_death();
        self.current
    }

    /// Charge the cost of firing the radio. Each retry adds half the base
    /// wake cost on top: base + retries * (base * 0.5).
    pub fn on_transmit(&mut self, retries_so_far: u32) {
        if self.is_dead {
            return;
        }

        let cost = self.tx_drain_base + f64::from(retries_so_far) * (self.tx_drain_base * 0.5);
        self.current -= cost;
        self.check_death();
    }

    /// Current level in the battery's own units
    pub fn level(&self) -> f64 {
        self.current
    }

    /// Configured capacity
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Current level as a percentage of capacity
    pub fn percent(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        (self.current / self.capacity) * 100.0
    }

    /// Linear 0-100% projection onto a single header byte (0-255)
    pub fn budget_byte(&self) -> u8 {
        let scaled = (self.percent() / 100.0) * 255.0;
        scaled.clamp(0.0, 255.0) as u8
    }

    /// Terminal state: no further drains have any effect
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Force the level to an absolute value (benchmark hook). Cannot revive
    /// a dead battery and cannot exceed capacity.
    pub fn force_level(&mut self, level: f64) {
        if self.is_dead {
            return;
        }
        self.current = level.min(self.capacity);
        self.check_death();
    }

    fn check_death(&mut self) {
        if self.current <= 0.0 {
            self.current = 0.0;
            self.is_dead = true;
        }
    }
}
