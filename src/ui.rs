//! HUD text and overlay selection
//!
//! Pure formatting so the DOM glue in `main.rs` stays thin.

use crate::sim::{GamePhase, GameState};

/// Which overlay the page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Pause menu with a resume button
    StopMenu,
    /// End-of-round result screen
    Result,
}

impl Overlay {
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Playing => Overlay::None,
            GamePhase::Paused => Overlay::StopMenu,
            GamePhase::Over => Overlay::Result,
        }
    }

    /// DOM id of the overlay element
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::StopMenu => Some("stop_menu"),
            Overlay::Result => Some("result"),
        }
    }
}

pub fn score_text(score: u64) -> String {
    format!("SCORE: {}", score)
}

/// Countdown as `m:ss`
pub fn timer_text(remaining_secs: i32) -> String {
    let secs = remaining_secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn combo_text(combo: u32) -> String {
    format!("x{} COMBO!", combo)
}

/// Snapshot of everything the HUD shows, diffed by the frontend
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: String,
    pub timer: String,
    /// Combo banner, while it is visible
    pub combo: Option<String>,
    pub combo_reset_flash: bool,
    pub overlay: Overlay,
}

impl Hud {
    pub fn from_state(state: &GameState, combo_flash_enabled: bool) -> Self {
        Self {
            score: score_text(state.score),
            timer: timer_text(state.remaining_secs),
            combo: (state.combo_text_secs > 0.0 && state.combo > 0).then(|| combo_text(state.combo)),
            combo_reset_flash: combo_flash_enabled && state.combo_reset_secs > 0.0,
            overlay: Overlay::for_phase(state.phase),
        }
    }
}
