//! Auto-advancing presentation of report views.
//!
//! Time comes from an injected [`Clock`], so the state machine itself never
//! sleeps or spawns anything; the caller decides how often to [`Playlist::tick`].

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::types::ReportType;

pub trait Clock {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic sequencing.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug)]
pub struct Playlist<C: Clock> {
    clock: C,
    slides: Vec<ReportType>,
    interval: Duration,
    current: usize,
    state: PlaybackState,
    // Clock reading at which the current slide's countdown began.
    started_at: Duration,
    paused_remaining: Duration,
}

impl<C: Clock> Playlist<C> {
    pub fn new(clock: C, slides: Vec<ReportType>, interval: Duration) -> Self {
        Self {
            clock,
            slides,
            interval,
            current: 0,
            state: PlaybackState::Idle,
            started_at: Duration::ZERO,
            paused_remaining: interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<ReportType> {
        self.slides.get(self.current).copied()
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn play(&mut self) {
        if self.slides.is_empty() {
            return;
        }
        let now = self.clock.now();
        match self.state {
            PlaybackState::Idle => self.started_at = now,
            PlaybackState::Paused => {
                let spent = self.interval.saturating_sub(self.paused_remaining);
                self.started_at = now.saturating_sub(spent);
            }
            PlaybackState::Playing => return,
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.paused_remaining = self.remaining();
            self.state = PlaybackState::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
        self.current = 0;
        self.paused_remaining = self.interval;
    }

    pub fn next(&mut self) {
        if self.slides.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.slides.len();
        self.restart_countdown();
    }

    pub fn previous(&mut self) {
        if self.slides.is_empty() {
            return;
        }
        self.current = (self.current + self.slides.len() - 1) % self.slides.len();
        self.restart_countdown();
    }

    /// Advance by every whole interval elapsed while playing. Returns whether
    /// the visible slide changed.
    pub fn tick(&mut self) -> bool {
        if self.state != PlaybackState::Playing || self.interval.is_zero() {
            return false;
        }
        let elapsed = self.clock.now().saturating_sub(self.started_at);
        let steps = elapsed.as_nanos() / self.interval.as_nanos();
        if steps == 0 {
            return false;
        }
        let before = self.current;
        self.current = ((self.current as u128 + steps) % self.slides.len() as u128) as usize;
        self.started_at += self.interval * (steps.min(u32::MAX as u128) as u32);
        tracing::debug!(from = before, to = self.current, "playlist advanced");
        before != self.current
    }

    /// Time left before the next automatic advance.
    pub fn remaining(&self) -> Duration {
        match self.state {
            PlaybackState::Playing => {
                let elapsed = self.clock.now().saturating_sub(self.started_at);
                self.interval.saturating_sub(elapsed)
            }
            PlaybackState::Paused => self.paused_remaining,
            PlaybackState::Idle => self.interval,
        }
    }

    fn restart_countdown(&mut self) {
        self.started_at = self.clock.now();
        self.paused_remaining = self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECS: Duration = Duration::from_secs(1);

    fn playlist(clock: &ManualClock) -> Playlist<&ManualClock> {
        Playlist::new(
            clock,
            vec![ReportType::Products, ReportType::Insurers, ReportType::Lob],
            SECS * 10,
        )
    }

    #[test]
    fn idle_until_played() {
        let clock = ManualClock::new();
        let mut p = playlist(&clock);
        clock.advance(SECS * 30);
        assert!(!p.tick());
        assert_eq!(p.state(), PlaybackState::Idle);
        assert_eq!(p.current(), Some(ReportType::Products));
    }

    #[test]
    fn advances_per_whole_interval_and_wraps() {
        let clock = ManualClock::new();
        let mut p = playlist(&clock);
        p.play();
        clock.advance(SECS * 9);
        assert!(!p.tick());
        assert_eq!(p.remaining(), SECS);
        clock.advance(SECS);
        assert!(p.tick());
        assert_eq!(p.current(), Some(ReportType::Insurers));
        clock.advance(SECS * 25);
        assert!(p.tick());
        assert_eq!(p.current(), Some(ReportType::Products));
        assert_eq!(p.remaining(), SECS * 5);
    }

    #[test]
    fn pause_freezes_the_countdown() {
        let clock = ManualClock::new();
        let mut p = playlist(&clock);
        p.play();
        clock.advance(SECS * 4);
        p.pause();
        clock.advance(SECS * 100);
        assert!(!p.tick());
        assert_eq!(p.remaining(), SECS * 6);
        p.toggle();
        assert_eq!(p.state(), PlaybackState::Playing);
        clock.advance(SECS * 6);
        assert!(p.tick());
        assert_eq!(p.current(), Some(ReportType::Insurers));
    }

    #[test]
    fn manual_navigation_wraps_and_stop_resets() {
        let clock = ManualClock::new();
        let mut p = playlist(&clock);
        p.previous();
        assert_eq!(p.current(), Some(ReportType::Lob));
        p.next();
        assert_eq!(p.position(), 0);
        p.next();
        p.play();
        p.stop();
        assert_eq!(p.state(), PlaybackState::Idle);
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn empty_playlist_never_plays() {
        let clock = ManualClock::new();
        let mut p = Playlist::new(&clock, Vec::new(), SECS);
        p.play();
        assert_eq!(p.state(), PlaybackState::Idle);
        assert_eq!(p.current(), None);
        p.next();
        assert!(!p.tick());
    }
}
