/// Front-end state that is not part of the game: which screen is up,
/// which overlay is open, the toast line and the presentation timers.
///
/// All timing queries take `now` so they can be tested without sleeping.

use std::time::{Duration, Instant};

use crate::config::TimingConfig;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Welcome,
    Game,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Overlay {
    None,
    Info,
    Achievements,
}

/// Ticks a toast stays up.
pub const TOAST_TICKS: u32 = 60;

pub struct AppState {
    pub screen: Screen,
    pub overlay: Overlay,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
    /// Game-over box closed with Esc; reopens after undo or a new game.
    pub result_dismissed: bool,
    welcome_started: Instant,
    welcome: Duration,
    spawn_delay: Duration,
    merge_flash: Duration,
    spawn_hidden_until: Option<Instant>,
    merge_flash_until: Option<Instant>,
}

impl AppState {
    pub fn new(timing: &TimingConfig, now: Instant) -> Self {
        let welcome = Duration::from_millis(timing.welcome_ms);
        AppState {
            screen: if welcome.is_zero() { Screen::Game } else { Screen::Welcome },
            overlay: Overlay::None,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            result_dismissed: false,
            welcome_started: now,
            welcome,
            spawn_delay: Duration::from_millis(timing.spawn_delay_ms),
            merge_flash: Duration::from_millis(timing.merge_flash_ms),
            spawn_hidden_until: None,
            merge_flash_until: None,
        }
    }

    /// Show `msg` for `ticks` UI ticks (0 = until replaced).
    pub fn set_message(&mut self, msg: &str, ticks: u32) {
        self.message = msg.to_string();
        self.message_timer = ticks;
    }

    /// Advance one UI tick: animation counter and toast expiry.
    pub fn tick(&mut self) {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    // ── Welcome ──

    /// Loading bar fill, 0.0 ..= 1.0.
    pub fn welcome_progress(&self, now: Instant) -> f64 {
        if self.welcome.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.welcome_started);
        (elapsed.as_secs_f64() / self.welcome.as_secs_f64()).min(1.0)
    }

    /// Leave the splash once the bar is full. Returns true on the switch.
    pub fn update_welcome(&mut self, now: Instant) -> bool {
        if self.screen == Screen::Welcome && self.welcome_progress(now) >= 1.0 {
            self.screen = Screen::Game;
            return true;
        }
        false
    }

    pub fn skip_welcome(&mut self) {
        self.screen = Screen::Game;
    }

    // ── Overlays ──

    /// Open `which`, or close it when it is already open.
    pub fn toggle_overlay(&mut self, which: Overlay) {
        self.overlay = if self.overlay == which { Overlay::None } else { which };
    }

    // ── Move presentation ──

    /// Start the reveal delay and merge flash for a move that just happened.
    pub fn note_move(&mut self, now: Instant, merged: bool) {
        self.spawn_hidden_until = Some(now + self.spawn_delay);
        self.result_dismissed = false;
        self.merge_flash_until = if merged { Some(now + self.merge_flash) } else { None };
    }

    /// Drop pending effects (undo, new game).
    pub fn clear_effects(&mut self) {
        self.result_dismissed = false;
        self.spawn_hidden_until = None;
        self.merge_flash_until = None;
    }

    pub fn spawn_visible(&self, now: Instant) -> bool {
        self.spawn_hidden_until.map_or(true, |t| now >= t)
    }

    pub fn merge_flash_active(&self, now: Instant) -> bool {
        self.merge_flash_until.map_or(false, |t| now < t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(welcome_ms: u64) -> TimingConfig {
        TimingConfig { tick_rate_ms: 50, spawn_delay_ms: 150, merge_flash_ms: 200, welcome_ms }
    }

    #[test]
    fn welcome_bar_fills_then_switches() {
        let t0 = Instant::now();
        let mut app = AppState::new(&timing(1000), t0);
        assert_eq!(app.screen, Screen::Welcome);
        let half = app.welcome_progress(t0 + Duration::from_millis(500));
        assert!((half - 0.5).abs() < 1e-9);
        assert!(!app.update_welcome(t0 + Duration::from_millis(999)));
        assert!(app.update_welcome(t0 + Duration::from_millis(1000)));
        assert_eq!(app.screen, Screen::Game);
        assert!(!app.update_welcome(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn zero_welcome_skips_splash() {
        let app = AppState::new(&timing(0), Instant::now());
        assert_eq!(app.screen, Screen::Game);
    }

    #[test]
    fn spawn_hidden_during_delay() {
        let t0 = Instant::now();
        let mut app = AppState::new(&timing(0), t0);
        assert!(app.spawn_visible(t0));
        app.note_move(t0, true);
        assert!(!app.spawn_visible(t0 + Duration::from_millis(100)));
        assert!(app.spawn_visible(t0 + Duration::from_millis(150)));
        assert!(app.merge_flash_active(t0 + Duration::from_millis(199)));
        assert!(!app.merge_flash_active(t0 + Duration::from_millis(200)));

        app.note_move(t0, false);
        assert!(!app.merge_flash_active(t0));
        app.result_dismissed = true;
        app.clear_effects();
        assert!(app.spawn_visible(t0));
        assert!(!app.result_dismissed);
    }

    #[test]
    fn toast_expires() {
        let mut app = AppState::new(&timing(0), Instant::now());
        app.set_message("hello", 2);
        app.tick();
        assert_eq!(app.message, "hello");
        app.tick();
        assert!(app.message.is_empty());

        app.set_message("sticky", 0);
        app.tick();
        assert_eq!(app.message, "sticky");
    }

    #[test]
    fn overlay_toggles() {
        let mut app = AppState::new(&timing(0), Instant::now());
        app.toggle_overlay(Overlay::Info);
        assert_eq!(app.overlay, Overlay::Info);
        app.toggle_overlay(Overlay::Achievements);
        assert_eq!(app.overlay, Overlay::Achievements);
        app.toggle_overlay(Overlay::Achievements);
        assert_eq!(app.overlay, Overlay::None);
    }
}
