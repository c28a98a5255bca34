use log::trace;

use crate::event::{EventChannel, Subscription};

/// Derives a once-per-beat signal from an audio playback position.
///
/// Beat `n` fires once the position reaches `n * seconds_per_beat`; the
/// start of playback is beat 0 and never fires. Seeking backwards rewinds
/// the counter without firing.
#[derive(Debug)]
pub struct BeatClock {
    bpm: f32,
    position: f64,
    beat: u64,
    on_beat: EventChannel<u64>,
}

impl BeatClock {
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm,
            position: 0.0,
            beat: 0,
            on_beat: EventChannel::new("beat"),
        }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / f64::from(self.bpm)
    }

    /// Seconds a span of `beats` lasts at `bpm`, played `speed` times faster.
    pub fn beats_to_seconds(beats: f32, bpm: f32, speed: f32) -> f32 {
        if bpm <= 0.0 || speed <= 0.0 {
            return 0.0;
        }
        beats * 60.0 / bpm / speed
    }

    /// Beats completed so far
    pub fn beat(&self) -> u64 {
        self.beat
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn on_beat<F>(&self, handler: F) -> Subscription<u64>
    where
        F: Fn(&u64) + Send + Sync + 'static,
    {
        self.on_beat.subscribe(handler)
    }

    /// Move the playback position forward by `dt` seconds.
    pub fn advance(&mut self, dt: f64) -> u64 {
        self.sync_to(self.position + dt.max(0.0))
    }

    /// Jump to an absolute playback position, firing `on_beat` once for every
    /// beat boundary crossed. Returns how many beats fired.
    pub fn sync_to(&mut self, position: f64) -> u64 {
        if self.bpm <= 0.0 {
            self.position = position;
            return 0;
        }
        let target = (position / self.seconds_per_beat()).floor().max(0.0) as u64;
        self.position = position;
        if target <= self.beat {
            self.beat = target;
            return 0;
        }

        let crossed = target - self.beat;
        for beat in self.beat + 1..=target {
            self.beat = beat;
            trace!("Beat {}", beat);
            self.on_beat.trigger(&beat);
        }
        crossed
    }
}
