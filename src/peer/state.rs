use crate::error::{SignalError, SignalResult};
use crate::peer::ice::{classify_candidate, CandidateDecision};
use crate::peer::types::{Invitation, LocalCandidate};
use tokio::sync::watch;
use tracing::{debug, error};

/// Single-assignment cell with a notifying read.
///
/// The first `set` wins; later ones are dropped. Readers either peek with
/// `get` or park on `wait` until a value lands.
#[derive(Debug)]
pub struct OnceSlot<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> OnceSlot<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Stores `value` if the slot is empty. Returns whether it was stored.
    pub fn set(&self, value: T) -> bool {
        let mut value = Some(value);
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = value.take();
            true
        })
    }

    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub async fn wait(&self) -> T {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(value) = current {
                return value;
            }
            // the sender lives in `self`, so this only errors if we are being torn down
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl<T: Clone> Default for OnceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// This process's own invitation, filled in as the engine produces it.
#[derive(Debug, Default)]
pub struct InvitationState {
    description: OnceSlot<String>,
    candidate: OnceSlot<LocalCandidate>,
    relayed: OnceSlot<LocalCandidate>,
}

impl InvitationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_description(&self, sdp: String) {
        if !self.description.set(sdp) {
            debug!("Local description already recorded, ignoring repeat");
        }
    }

    /// Files a gathered local candidate according to its type.
    pub fn record_candidate(&self, candidate: LocalCandidate) {
        match classify_candidate(&candidate) {
            CandidateDecision::Accept => {
                if !self.candidate.set(candidate) {
                    debug!("Local candidate already recorded, ignoring extra srflx candidate");
                }
            }
            CandidateDecision::Ignore => {
                debug!(kind = ?candidate.kind, "Skipping local candidate");
            }
            CandidateDecision::Fatal => {
                error!("Symmetric NAT not supported");
                self.relayed.set(candidate);
            }
        }
    }

    /// Resolves once a relayed candidate has been seen.
    pub async fn wait_fatal(&self) -> SignalError {
        self.relayed.wait().await;
        SignalError::UnsupportedNetworkEnvironment
    }

    pub fn is_fatal(&self) -> bool {
        self.relayed.is_set()
    }

    /// Blocks until both the description and the candidate are known.
    pub async fn await_complete(&self) -> SignalResult<Invitation> {
        if self.is_fatal() {
            return Err(SignalError::UnsupportedNetworkEnvironment);
        }
        tokio::select! {
            biased;
            err = self.wait_fatal() => Err(err),
            invitation = self.both() => Ok(invitation),
        }
    }

    async fn both(&self) -> Invitation {
        let description = self.description.wait().await;
        let candidate = self.candidate.wait().await;
        Invitation {
            candidate: candidate.candidate,
            description,
        }
    }
}
