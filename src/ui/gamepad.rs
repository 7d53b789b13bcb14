/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Slide (one move per press)
///   A                     →  Confirm (advance level / try again)
///   B                     →  Undo
///   X                     →  Achievements
///   Y                     →  Info
///   Start                 →  New game
///   Select                →  Close overlay / keep playing

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::board::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    undo: Vec<Btn>,
    new_game: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    info: Vec<Btn>,
    achievements: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            undo:         vec![Btn::B],
            new_game:     vec![Btn::Start],
            confirm:      vec![Btn::A],
            cancel:       vec![Btn::Select],
            info:         vec![Btn::Y],
            achievements: vec![Btn::X],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // Indexed by Direction::code()
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::debug!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unrecognised lists keep
    /// the default for that action.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        apply(&mut map.undo, &cfg.undo);
        apply(&mut map.new_game, &cfg.new_game);
        apply(&mut map.confirm, &cfg.confirm);
        apply(&mut map.cancel, &cfg.cancel);
        apply(&mut map.info, &cfg.info);
        apply(&mut map.achievements, &cfg.achievements);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.derive_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d.code() as usize].set(held);
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    /// Turn the analog stick into four digital directions.
    /// Only the dominant axis counts, so a diagonal gives one slide.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn derive_stick(&mut self) {
        let (x, y) = (self.stick_x, self.stick_y);
        let horizontal = x.abs() >= y.abs();
        let active = |d: Direction| match d {
            Direction::Left => horizontal && x < -STICK_DEADZONE,
            Direction::Right => horizontal && x > STICK_DEADZONE,
            Direction::Up => !horizontal && y > STICK_DEADZONE,
            Direction::Down => !horizontal && y < -STICK_DEADZONE,
        };
        for d in Direction::ALL {
            let held = active(d);
            self.stick[d.code() as usize].set(held);
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn undo_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.undo)
    }
    pub fn new_game_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.new_game)
    }
    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }
    pub fn info_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.info)
    }
    pub fn achievements_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.achievements)
    }

    /// Any button at all this frame (skips the welcome screen).
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.iter().chain(&self.dpad).chain(&self.stick).any(|b| b.just_pressed)
    }

    /// Direction freshly pressed this frame, D-pad first.
    /// Edge-triggered: holding the stick does not repeat the slide.
    pub fn direction_pressed(&self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| {
            let i = d.code() as usize;
            self.dpad[i].just_pressed || self.stick[i].just_pressed
        })
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let mut gp = GamepadState::new();
        gp.release_all();
        gp
    }

    fn press(gp: &mut GamepadState, btn: Btn) {
        gp.buttons[btn_index(btn)].set(true);
    }

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name(" Start "), Some(Btn::Start));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn default_actions() {
        let mut gp = pad();
        press(&mut gp, Btn::B);
        assert!(gp.undo_pressed());
        assert!(!gp.confirm_pressed());
        assert!(gp.any_button_pressed());
        gp.clear_just_pressed();
        assert!(!gp.undo_pressed());
    }

    #[test]
    fn config_overrides_mapping() {
        let mut gp = pad();
        let cfg = GamepadConfig {
            undo: vec!["L1".into(), "bogus".into()],
            new_game: vec![],
            confirm: vec!["nope".into()],
            cancel: vec!["Select".into()],
            info: vec!["Y".into()],
            achievements: vec!["X".into()],
        };
        gp.load_button_config(&cfg);
        press(&mut gp, Btn::L1);
        assert!(gp.undo_pressed());

        gp.clear_just_pressed();
        press(&mut gp, Btn::Start);
        assert!(gp.new_game_pressed());

        gp.clear_just_pressed();
        press(&mut gp, Btn::A);
        assert!(gp.confirm_pressed());
    }

    #[test]
    fn held_button_fires_once() {
        let mut gp = pad();
        press(&mut gp, Btn::A);
        assert!(gp.confirm_pressed());
        gp.clear_just_pressed();
        press(&mut gp, Btn::A);
        assert!(!gp.confirm_pressed());
    }

    #[test]
    fn stick_uses_dominant_axis_and_edges() {
        let mut gp = pad();
        gp.stick_x = 0.9;
        gp.stick_y = 0.6;
        gp.derive_stick();
        assert_eq!(gp.direction_pressed(), Some(Direction::Right));

        // Still held next frame: no repeat.
        gp.clear_just_pressed();
        gp.derive_stick();
        assert_eq!(gp.direction_pressed(), None);

        gp.stick_x = 0.0;
        gp.stick_y = -0.8;
        gp.clear_just_pressed();
        gp.derive_stick();
        assert_eq!(gp.direction_pressed(), Some(Direction::Down));
    }

    #[test]
    fn dpad_direction() {
        let mut gp = pad();
        gp.dpad[Direction::Left.code() as usize].set(true);
        assert_eq!(gp.direction_pressed(), Some(Direction::Left));
    }
}
