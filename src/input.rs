//! Pointer and key handling.
//!
//! The window layer forwards raw events here; this module turns them into
//! session operations on a fixed update tick. Holding the primary button
//! paints, holding the secondary button erases, and a quick
//! press-release-press with the primary button picks an endpoint.

use crate::grid::Coord;
use crate::session::{SessionController, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

impl PointerButton {
    fn slot(self) -> usize {
        match self {
            PointerButton::Primary => 0,
            PointerButton::Secondary => 1,
            PointerButton::Middle => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Start a search (restarts one in flight)
    Space,
    /// Cancel the running search
    Escape,
}

pub struct InputController {
    held: [bool; 3],
    pointer: Option<Coord>,
    /// Update ticks since the primary button was released; 0 when idle
    release_ticks: u32,
    double_click_updates: u32,
}

impl InputController {
    pub fn new(double_click_updates: u32) -> Self {
        InputController {
            held: [false; 3],
            pointer: None,
            release_ticks: 0,
            double_click_updates,
        }
    }

    pub fn pointer(&self) -> Option<Coord> {
        self.pointer
    }

    pub fn is_held(&self, button: PointerButton) -> bool {
        self.held[button.slot()]
    }

    pub fn handle_pointer_move(&mut self, coord: Option<Coord>) {
        self.pointer = coord;
    }

    pub fn handle_pointer_down(&mut self, button: PointerButton, coord: Coord) {
        self.pointer = Some(coord);
        self.held[button.slot()] = true;
    }

    pub fn handle_pointer_up(&mut self, button: PointerButton, coord: Coord) {
        self.pointer = Some(coord);
        self.held[button.slot()] = false;
    }

    pub fn handle_key(&mut self, session: &mut SessionController, key: Key) {
        match key {
            Key::Space => {
                if let Err(err) = session.start_search() {
                    tracing::debug!(%err, "search not started");
                }
            }
            Key::Escape => {
                session.cancel();
            }
        }
    }

    /// Apply held buttons to the cell under the pointer. Call once per update tick.
    pub fn update(&mut self, session: &mut SessionController) {
        let primary = self.is_held(PointerButton::Primary);
        let idle = session.phase() != SessionPhase::Running;

        // Two presses with a short release in between select an endpoint
        let mut select = false;
        if idle {
            let in_window =
                self.release_ticks > 1 && self.release_ticks <= self.double_click_updates;
            if primary && in_window {
                select = true;
                self.release_ticks = 0;
            } else if primary {
                self.release_ticks = 1;
            } else if self.release_ticks != 0 {
                self.release_ticks += 1;
                if self.release_ticks > self.double_click_updates {
                    self.release_ticks = 0;
                }
            }
        }

        let Some(coord) = self.pointer else { return };
        if select {
            // Undo the paint left by the first press of the gesture
            let selected = session
                .paint_cell(coord, false)
                .and_then(|_| session.select_endpoint(coord));
            if let Err(err) = selected {
                tracing::debug!(%err, "endpoint selection ignored");
            }
            return;
        }

        if primary {
            if let Err(err) = session.paint_cell(coord, true) {
                tracing::debug!(%err, "paint ignored");
            }
        } else if idle && self.is_held(PointerButton::Secondary) {
            if let Err(err) = session.paint_cell(coord, false) {
                tracing::debug!(%err, "erase ignored");
            }
        }
    }
}
