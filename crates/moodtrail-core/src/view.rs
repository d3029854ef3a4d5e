//! View state for the device/date currently on screen.
//!
//! Every [`TimelineView::select`] starts a new request and invalidates the
//! tokens handed out before it. Fetches resolve in any order; only the result
//! for the latest token is kept and the rest are dropped as stale. The view
//! holds one timeline at a time and replaces it on every resolution.

use serde_json::Value;

use crate::normalizer::{Normalizer, Outcome};
use crate::types::{Correction, EmotionTimeline};

/// Identifies one fetch started by [`TimelineView::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub device: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    /// Normalized data ready to render.
    Ready(EmotionTimeline),
    /// The fallback timeline; renders like `Ready`.
    Degraded(EmotionTimeline),
    /// "No measurement data for this date."
    NoData,
    /// The fetch itself failed before any payload arrived.
    Failed(String),
}

impl ViewState {
    pub fn timeline(&self) -> Option<&EmotionTimeline> {
        match self {
            ViewState::Ready(t) | ViewState::Degraded(t) => Some(t),
            _ => None,
        }
    }
}

/// Whether a resolution was applied to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct TimelineView {
    normalizer: Normalizer,
    next_token: u64,
    current: Option<RequestToken>,
    selection: Option<Selection>,
    state: ViewState,
    corrections: Vec<Correction>,
}

impl TimelineView {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            next_token: 0,
            current: None,
            selection: None,
            state: ViewState::Idle,
            corrections: Vec::new(),
        }
    }

    /// Switch to a new device/date and return the token its fetch must
    /// resolve with.
    pub fn select(&mut self, device: impl Into<String>, date: impl Into<String>) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.current = Some(token);
        self.selection = Some(Selection {
            device: device.into(),
            date: date.into(),
        });
        self.state = ViewState::Loading;
        self.corrections.clear();
        token
    }

    /// Normalize a fetched payload and show it if `token` is still current.
    pub fn resolve(&mut self, token: RequestToken, raw: &Value) -> Resolution {
        if self.current != Some(token) {
            tracing::debug!(?token, "dropping stale timeline fetch");
            return Resolution::Stale;
        }
        let outcome = self.normalizer.normalize(raw);
        self.corrections = outcome.corrections().to_vec();
        self.state = match outcome {
            Outcome::Normalized(n) => ViewState::Ready(n.timeline),
            Outcome::Fallback { timeline, .. } => ViewState::Degraded(timeline),
            Outcome::Rejected(_) => ViewState::NoData,
        };
        self.current = None;
        Resolution::Applied
    }

    /// Record a transport failure for `token` if it is still current.
    pub fn fail(&mut self, token: RequestToken, reason: impl Into<String>) -> Resolution {
        if self.current != Some(token) {
            return Resolution::Stale;
        }
        self.state = ViewState::Failed(reason.into());
        self.current = None;
        Resolution::Applied
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Corrections made while normalizing the payload currently shown.
    pub fn corrections(&self) -> &[Correction] {
        &self.corrections
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(Normalizer::default())
    }
}
