//! Timeline selection state machine.
//!
//! Tracks the hovered and selected times and the playback/locked modes that
//! decide which timestamp tabs should render. Tabs only ever read
//! [`Selection::render_time`]; the transitions are driven by host UI events.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Selection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Idle,
    Static,
    Playback,
    Locked,
}

/// Timeline selection state shared with every tab.
#[derive(Debug, Default)]
pub struct Selection {
    mode: SelectionMode,
    hovered_time: Option<f64>,
    selected_time: Option<f64>,
    playback_started: Option<Instant>,
    playback_base: f64,
    /// Latest timestamp from a live source, if one is connected.
    live_time: Option<f64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn hovered_time(&self) -> Option<f64> {
        self.hovered_time
    }

    pub fn set_hovered_time(&mut self, value: Option<f64>) {
        self.hovered_time = value;
    }

    /// The selected time based on the current mode.
    pub fn selected_time(&self) -> Option<f64> {
        match self.mode {
            SelectionMode::Idle => None,
            _ => self.render_time(),
        }
    }

    /// Update the selected time. In locked mode the selection follows the
    /// live source and manual selection is ignored; in playback mode the
    /// playhead is rebased to the new time.
    pub fn set_selected_time(&mut self, time: f64) {
        match self.mode {
            SelectionMode::Locked => {}
            SelectionMode::Playback => {
                self.playback_base = time;
                self.playback_started = Some(Instant::now());
            }
            _ => {
                self.mode = SelectionMode::Static;
                self.selected_time = Some(time);
            }
        }
    }

    /// The time that should be displayed this frame, or `None` when nothing
    /// is selected.
    pub fn render_time(&self) -> Option<f64> {
        match self.mode {
            SelectionMode::Idle => None,
            SelectionMode::Static => self.selected_time,
            SelectionMode::Playback => {
                let elapsed = self
                    .playback_started
                    .map(|s| s.elapsed().as_secs_f64())
                    .unwrap_or(0.0);
                Some(self.playback_base + elapsed)
            }
            SelectionMode::Locked => self.live_time,
        }
    }

    /// Record the latest timestamp from a live source.
    pub fn set_live_time(&mut self, time: f64) {
        self.live_time = Some(time);
    }

    /// Switch to idle if possible.
    pub fn go_idle(&mut self) {
        self.mode = SelectionMode::Idle;
        self.selected_time = None;
        self.playback_started = None;
    }

    /// Switch to playback mode starting from the current selection.
    pub fn play(&mut self) {
        if self.mode == SelectionMode::Locked {
            return;
        }
        self.playback_base = self.render_time().unwrap_or(0.0);
        self.playback_started = Some(Instant::now());
        self.mode = SelectionMode::Playback;
    }

    /// Exit playback and locked modes, freezing at the current render time.
    pub fn pause(&mut self) {
        if matches!(self.mode, SelectionMode::Playback | SelectionMode::Locked) {
            self.selected_time = self.render_time();
            self.playback_started = None;
            self.mode = SelectionMode::Static;
        }
    }

    pub fn toggle_playback(&mut self) {
        if self.mode == SelectionMode::Playback {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Switch to locked mode if a live source is connected.
    pub fn lock(&mut self) {
        if self.live_time.is_some() {
            self.mode = SelectionMode::Locked;
        }
    }

    /// Exit locked mode.
    pub fn unlock(&mut self) {
        if self.mode == SelectionMode::Locked {
            self.selected_time = self.live_time;
            self.mode = SelectionMode::Static;
        }
    }

    pub fn toggle_lock(&mut self) {
        if self.mode == SelectionMode::Locked {
            self.unlock();
        } else {
            self.lock();
        }
    }
}
