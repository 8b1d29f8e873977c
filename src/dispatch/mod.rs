//! Strip selection handling
//!
//! Backends send a [`SelectionEvent`] over a channel whenever strip points are
//! picked. A [`SelectionDispatcher`] owns the binding from pick indices to
//! features and drives detail rendering for each event:
//!
//! ```text
//! Idle -> Resolving -> Dispatching -> Idle
//!                   \-> Rejected   -> Idle   (more than `limit` features)
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::data::{Feature, RowOrder};
use crate::error::{ChipseqError, Result};

/// Default maximum number of detail views spawned by one selection
pub const DEFAULT_SELECTION_LIMIT: usize = 5;

/// Indices of picked strip points, in the order the backend reported them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub indices: Vec<usize>,
}

impl SelectionEvent {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

pub type SelectionSender = Sender<SelectionEvent>;
pub type SelectionReceiver = Receiver<SelectionEvent>;

/// Channel carrying selection events from a backend to a dispatcher
pub fn selection_channel() -> (SelectionSender, SelectionReceiver) {
    mpsc::channel()
}

/// Renders the detail view for one feature
pub trait DetailRenderer {
    fn render_detail(&mut self, feature: &Feature) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Resolving,
    Dispatching,
    Rejected,
}

/// A pick resolved to its matrix row and feature
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPick {
    pub pick: usize,
    pub row: usize,
    pub feature: Feature,
}

/// Result of handling one selection event
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// Detail views were attempted for every resolved feature
    Dispatched {
        rendered: Vec<Feature>,
        failed: Vec<(Feature, String)>,
    },
    /// Too many features; nothing was rendered
    Rejected { selected: usize, limit: usize },
}

/// Feature sequence and display order a strip was drawn with
#[derive(Debug, Clone)]
pub struct StripBinding {
    features: Arc<[Feature]>,
    order: RowOrder,
}

impl StripBinding {
    pub fn new(features: Arc<[Feature]>, order: RowOrder) -> Result<Self> {
        if features.len() != order.len() {
            return Err(ChipseqError::LengthMismatch {
                expected: format!("row order over {} features", features.len()),
                got: format!("{} rows", order.len()),
            });
        }
        Ok(Self { features, order })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn order(&self) -> &RowOrder {
        &self.order
    }

    /// Feature under strip point `pick`, if it exists
    pub fn resolve(&self, pick: usize) -> Option<ResolvedPick> {
        let row = self.order.row_for_pick(pick)?;
        Some(ResolvedPick {
            pick,
            row,
            feature: self.features[row].clone(),
        })
    }
}

/// Turns selection events into detail renders
///
/// Features of one event are rendered one after another on the calling
/// thread. A failed render is logged and recorded; the rest of the batch is
/// still attempted.
#[derive(Debug)]
pub struct SelectionDispatcher {
    binding: StripBinding,
    limit: usize,
    state: DispatcherState,
    notices: Vec<String>,
}

impl SelectionDispatcher {
    pub fn new(binding: StripBinding, limit: usize) -> Self {
        Self {
            binding,
            limit,
            state: DispatcherState::Idle,
            notices: Vec::new(),
        }
    }

    /// Bind to the features and order of a new analysis
    pub fn rebind(&mut self, binding: StripBinding) {
        log::debug!("Rebinding selection dispatcher to {} features", binding.features().len());
        self.binding = binding;
    }

    pub fn binding(&self) -> &StripBinding {
        &self.binding
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// User-visible notices recorded so far (overselection rejections)
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn transition(&mut self, to: DispatcherState) {
        log::debug!("Selection dispatcher: {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Resolve picks in reported order; unknown indices are dropped
    pub fn resolve(&self, event: &SelectionEvent) -> Vec<ResolvedPick> {
        event
            .indices
            .iter()
            .filter_map(|&pick| {
                let resolved = self.binding.resolve(pick);
                if resolved.is_none() {
                    log::warn!(
                        "Ignoring pick {} outside {} strip points",
                        pick,
                        self.binding.features().len()
                    );
                }
                resolved
            })
            .collect()
    }

    /// Handle one selection event
    pub fn handle<R: DetailRenderer + ?Sized>(
        &mut self,
        event: &SelectionEvent,
        renderer: &mut R,
    ) -> SelectionOutcome {
        self.transition(DispatcherState::Resolving);
        let picks = self.resolve(event);
        for p in &picks {
            log::info!("Selected {} (row {})", p.feature, p.row);
        }

        if picks.len() > self.limit {
            self.transition(DispatcherState::Rejected);
            let notice = format!(
                "more than {} features selected; not spawning detail views",
                self.limit
            );
            log::warn!("{} ({} selected)", notice, picks.len());
            self.notices.push(notice);
            self.transition(DispatcherState::Idle);
            return SelectionOutcome::Rejected {
                selected: picks.len(),
                limit: self.limit,
            };
        }

        self.transition(DispatcherState::Dispatching);
        let mut rendered = Vec::with_capacity(picks.len());
        let mut failed = Vec::new();
        for p in picks {
            match renderer.render_detail(&p.feature) {
                Ok(()) => rendered.push(p.feature),
                Err(e) => {
                    log::warn!("Detail view for {} failed: {}", p.feature, e);
                    failed.push((p.feature, e.to_string()));
                }
            }
        }
        self.transition(DispatcherState::Idle);
        SelectionOutcome::Dispatched { rendered, failed }
    }

    /// Handle events until every sender is dropped
    pub fn run<R: DetailRenderer + ?Sized>(
        &mut self,
        events: &SelectionReceiver,
        renderer: &mut R,
    ) -> Vec<SelectionOutcome> {
        events
            .iter()
            .map(|event| self.handle(&event, renderer))
            .collect()
    }
}
