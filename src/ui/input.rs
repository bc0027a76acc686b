/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered actions (pause, respawn, overlay toggle)
///   - Diagonal movement from two held keys
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use crate::domain::entity::MoveIntent;
use crate::sim::step::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const UP: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const PAUSE: [KeyCode; 2] = [KeyCode::Char(' '), KeyCode::Char('p')];
const RESPAWN: [KeyCode; 1] = [KeyCode::Enter];
const TOGGLE_BOXES: [KeyCode; 2] = [KeyCode::Char('c'), KeyCode::Char('C')];
const QUIT: [KeyCode; 2] = [KeyCode::Esc, KeyCode::Char('q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Ask the terminal for Release events. Call after raw mode is on.
    pub fn enable_release_events(&mut self) {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            log::debug!("terminal has no keyboard enhancement; using hold timeout");
            return;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        self.honor_release = execute!(io::stdout(), PushKeyboardEnhancementFlags(flags)).is_ok();
    }

    /// Undo `enable_release_events`.
    pub fn restore_terminal(&mut self) -> io::Result<()> {
        if self.honor_release {
            self.honor_release = false;
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        Ok(())
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Apply one key event observed at `now`.
    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Not trusted without enhancement; the timeout handles it
            }
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Forget keys that have timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn quit_requested(&self) -> bool {
        self.ctrl_c_pressed() || self.any_pressed(&QUIT)
    }

    /// This frame's input for the simulation step.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            intent: MoveIntent {
                up: self.any_held(&UP),
                down: self.any_held(&DOWN),
                left: self.any_held(&LEFT),
                right: self.any_held(&RIGHT),
                respawn: self.any_pressed(&RESPAWN),
            },
            pause: self.any_pressed(&PAUSE),
            toggle_boxes: self.any_pressed(&TOGGLE_BOXES) && !self.ctrl_c_pressed(),
        }
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| now.saturating_duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}
