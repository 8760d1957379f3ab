//! Per-page query state machine.
//!
//! A [`QueryController`] owns one [`RequestState`] and moves it through
//! `Idle → Loading → Succeeded | Failed`, re-entering `Loading` on every
//! accepted submit. The controller is a cheap handle (`Clone` shares the
//! same state) so a host can fire overlapping submits from separate tasks.
//!
//! Overlapping submits are never cancelled. Which resolution ends up in the
//! state is decided by the [`ResolutionPolicy`]; after [`QueryController::unmount`]
//! every late resolution is dropped.

pub mod modes;

use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::gateway::{ErrorKind, Gateway, GatewayError};

pub use modes::{
    Category, Health, Info, InputMode, Locate, NlpQuery, QueryMode, Recommendations, Route,
    Search, Similar,
};

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter at least {min} characters to search")]
    TooShort { min: usize },
    #[error("Enter a {field}")]
    Blank { field: &'static str },
    #[error("Enter a start and an end location")]
    RouteEndpoints,
}

/// User-facing description of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Short notice for the page ("Error fetching products").
    pub notice: String,
    /// Diagnostic detail from the gateway.
    pub detail: String,
}

impl ErrorInfo {
    pub fn new(notice: &str, err: &GatewayError) -> Self {
        Self {
            kind: err.kind(),
            notice: notice.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Request lifecycle of one controller. `Loading` and `Failed` keep the last
/// successful result so the page keeps showing it until a new one arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<R> {
    Idle,
    Loading { previous: Option<R> },
    Succeeded(R),
    Failed { error: ErrorInfo, previous: Option<R> },
}

impl<R> Default for RequestState<R> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<R> RequestState<R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    /// The result currently on screen, if any.
    pub fn visible_result(&self) -> Option<&R> {
        match self {
            RequestState::Idle => None,
            RequestState::Loading { previous } => previous.as_ref(),
            RequestState::Succeeded(result) => Some(result),
            RequestState::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// How resolutions of overlapping submits are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Every resolution is applied; the call that completes last wins,
    /// even if it was issued first.
    #[default]
    LastResolved,
    /// Only the most recently issued call may write state; resolutions of
    /// superseded calls are dropped.
    LatestIssued,
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_resolved" | "last-resolved" => Ok(ResolutionPolicy::LastResolved),
            "latest_issued" | "latest-issued" => Ok(ResolutionPolicy::LatestIssued),
            other => Err(format!("unknown resolution policy: {other}")),
        }
    }
}

struct Slot<R> {
    input: String,
    state: RequestState<R>,
    /// Generation of the most recently issued call.
    issued: u64,
    mounted: bool,
}

pub struct QueryController<M: QueryMode> {
    mode: Arc<M>,
    gateway: Arc<dyn Gateway>,
    policy: ResolutionPolicy,
    slot: Arc<Mutex<Slot<M::Output>>>,
}

pub type SearchController = QueryController<Search>;
pub type RecommendationsController = QueryController<Recommendations>;
pub type NlpController = QueryController<NlpQuery>;

impl<M: QueryMode> Clone for QueryController<M> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode.clone(),
            gateway: self.gateway.clone(),
            policy: self.policy,
            slot: self.slot.clone(),
        }
    }
}

impl<M: QueryMode> QueryController<M> {
    /// Mount a controller in the `Idle` state with an empty input.
    pub fn new(mode: M, gateway: Arc<dyn Gateway>, policy: ResolutionPolicy) -> Self {
        Self {
            mode: Arc::new(mode),
            gateway,
            policy,
            slot: Arc::new(Mutex::new(Slot {
                input: String::new(),
                state: RequestState::Idle,
                issued: 0,
                mounted: true,
            })),
        }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Snapshot of the request state. Never mutates.
    pub fn current_state(&self) -> RequestState<M::Output> {
        self.slot.lock().state.clone()
    }

    pub fn input(&self) -> String {
        self.slot.lock().input.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.slot.lock().mounted
    }

    /// Tear the page down. In-flight calls keep running but their
    /// resolutions are discarded.
    pub fn unmount(&self) {
        let mut slot = self.slot.lock();
        slot.mounted = false;
        tracing::debug!("[{}] unmounted", M::NAME);
    }

    /// Validate the current input and, if accepted, run one gateway call.
    ///
    /// A validation failure returns `Err` without touching the state. Gateway
    /// failures never surface here; they land in the state as `Failed`.
    pub async fn submit(&self) -> Result<(), ValidationError> {
        let (input, generation) = {
            let mut slot = self.slot.lock();
            if !slot.mounted {
                tracing::debug!("[{}] submit ignored: controller unmounted", M::NAME);
                return Ok(());
            }
            self.mode.validate(&slot.input)?;

            slot.issued += 1;
            let previous = slot.state.visible_result().cloned();
            slot.state = RequestState::Loading { previous };
            tracing::debug!("[{}] #{} loading", M::NAME, slot.issued);
            (slot.input.clone(), slot.issued)
        };

        let outcome = self.mode.dispatch(self.gateway.as_ref(), &input).await;

        let mut slot = self.slot.lock();
        if !slot.mounted {
            tracing::debug!("[{}] #{generation} resolved after unmount, dropped", M::NAME);
            return Ok(());
        }
        if self.policy == ResolutionPolicy::LatestIssued && generation < slot.issued {
            tracing::debug!(
                "[{}] #{generation} superseded by #{}, dropped",
                M::NAME,
                slot.issued
            );
            return Ok(());
        }

        let next = match outcome {
            Ok(result) => {
                tracing::debug!("[{}] #{generation} succeeded", M::NAME);
                RequestState::Succeeded(result)
            }
            Err(e) => {
                tracing::debug!("[{}] #{generation} failed: {e}", M::NAME);
                RequestState::Failed {
                    error: ErrorInfo::new(M::FAILURE_NOTICE, &e),
                    previous: slot.state.visible_result().cloned(),
                }
            }
        };
        slot.state = next;
        Ok(())
    }
}

impl<M: InputMode> QueryController<M> {
    /// Store new input text. Allowed in any state; has no other effect.
    pub fn on_input_change(&self, text: impl Into<String>) {
        self.slot.lock().input = text.into();
    }
}
