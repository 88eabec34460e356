/// Keyboard state tracker.
///
/// Distinguishes two kinds of key queries:
///   - held: continuous actions (running left or right)
///   - fresh press: edge-triggered actions (jump, menu confirm)
///
/// Terminals do not reliably deliver Release events, so a key counts as
/// held until no Press/Repeat for it has arrived within HOLD_TIMEOUT.
/// Auto-repeat keeps the timestamp fresh for genuinely held keys.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{FrameInput, LaneShift, MoveDir};
use crate::sim::world::Mode;

/// A key with no Press/Repeat for this long is considered released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of the last Press/Repeat event per key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw events from the most recent drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the
    /// simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                if key.kind == KeyEventKind::Release {
                    self.last_active.remove(&key.code);
                } else {
                    let was_held = self.is_held(key.code);
                    self.last_active.insert(key.code, Instant::now());
                    if !was_held {
                        self.fresh_presses.push(key.code);
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Edge trigger: did this key go down during the last drain?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Translate the current key state into one tick's worth of intent.
    /// Campaign reads left/right + jump; endless reads up/down lane shifts
    /// (edge-triggered, one lane per press).
    pub fn frame_input(&self, mode: Mode) -> FrameInput {
        match mode {
            Mode::Campaign => {
                let left = self.any_held(&[KeyCode::Left, KeyCode::Char('a')]);
                let right = self.any_held(&[KeyCode::Right, KeyCode::Char('d')]);
                let movement = match (left, right) {
                    (true, false) => Some(MoveDir::Left),
                    (false, true) => Some(MoveDir::Right),
                    _ => None, // both or neither cancel out
                };
                let jump = self.any_pressed(&[
                    KeyCode::Up,
                    KeyCode::Char('w'),
                    KeyCode::Char(' '),
                ]);
                FrameInput { movement, jump, lane_shift: None }
            }
            Mode::Endless => {
                let up = self.any_pressed(&[KeyCode::Up, KeyCode::Char('w')]);
                let down = self.any_pressed(&[KeyCode::Down, KeyCode::Char('s')]);
                let lane_shift = match (up, down) {
                    (true, false) => Some(LaneShift::Up),
                    (false, true) => Some(LaneShift::Down),
                    _ => None,
                };
                FrameInput { movement: None, jump: false, lane_shift }
            }
        }
    }
}
