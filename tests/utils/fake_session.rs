use async_trait::async_trait;
use pastelink::peer::{
    CandidateKind, ChannelEvent, ChannelPayload, ChannelState, ConnectionSession, DataChannel,
    LocalCandidate, Role, SessionEvent,
};
use pastelink::{SignalError, SignalResult};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

fn side_of(role: Role) -> usize {
    match role {
        Role::Offerer => 0,
        Role::Answerer => 1,
    }
}

#[derive(Default)]
struct End {
    sink: Option<mpsc::UnboundedSender<ChannelEvent>>,
    state: Option<ChannelState>,
    remote_ready: bool,
}

/// In-memory stand-in for the path between two peers.
///
/// The channel opens once both sides have accepted the other's candidate.
pub struct FakeNetwork {
    label: String,
    ends: [Mutex<End>; 2],
}

impl FakeNetwork {
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            ends: [Mutex::new(End::default()), Mutex::new(End::default())],
        })
    }

    fn channel(self: &Arc<Self>, side: usize) -> Arc<FakeChannel> {
        Arc::new(FakeChannel {
            net: self.clone(),
            side,
        })
    }

    fn mark_remote_ready(&self, side: usize) {
        self.ends[side].lock().unwrap().remote_ready = true;
        let both = self.ends.iter().all(|end| end.lock().unwrap().remote_ready);
        if both {
            tracing::debug!("[FakeNetwork] both sides paired, opening channel");
            self.set_state(ChannelState::Open, ChannelEvent::Open);
        }
    }

    /// Closes both ends of the channel.
    pub fn close(&self) {
        self.set_state(ChannelState::Closed, ChannelEvent::Closed);
    }

    fn set_state(&self, state: ChannelState, event: ChannelEvent) {
        for end in &self.ends {
            let mut end = end.lock().unwrap();
            end.state = Some(state);
            if let Some(sink) = &end.sink {
                let _ = sink.send(event.clone());
            }
        }
    }

    fn state(&self, side: usize) -> ChannelState {
        self.ends[side]
            .lock()
            .unwrap()
            .state
            .unwrap_or(ChannelState::Connecting)
    }

    fn deliver(&self, to: usize, payload: ChannelPayload) {
        if let Some(sink) = &self.ends[to].lock().unwrap().sink {
            let _ = sink.send(ChannelEvent::Message(payload));
        }
    }
}

pub struct FakeChannel {
    net: Arc<FakeNetwork>,
    side: usize,
}

impl FakeChannel {
    /// Pushes a binary frame to the other side.
    pub fn send_binary(&self, data: &'static [u8]) {
        self.net
            .deliver(1 - self.side, ChannelPayload::Binary(bytes::Bytes::from_static(data)));
    }
}

#[async_trait]
impl DataChannel for FakeChannel {
    fn label(&self) -> String {
        self.net.label.clone()
    }

    fn ready_state(&self) -> ChannelState {
        self.net.state(self.side)
    }

    fn attach(&self, sink: mpsc::UnboundedSender<ChannelEvent>) {
        self.net.ends[self.side].lock().unwrap().sink = Some(sink);
    }

    async fn send_text(&self, text: &str) -> SignalResult<()> {
        if self.ready_state() != ChannelState::Open {
            return Err(SignalError::SendFailure("channel is not open".into()));
        }
        self.net
            .deliver(1 - self.side, ChannelPayload::Text(text.to_string()));
        Ok(())
    }
}

/// Everything the fake has been asked to apply.
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    pub description_attempts: usize,
    pub accepted_description: Option<String>,
    pub candidate_attempts: usize,
    pub accepted_candidates: Vec<String>,
}

/// Scripted connection session.
///
/// Accepts any description starting with `v=0` and any candidate line with a
/// known `typ`. Emits its own description and candidate the way the engine
/// would: on channel creation for the offerer, on remote offer for the answerer.
pub struct FakeSession {
    role: Role,
    events: mpsc::UnboundedSender<SessionEvent>,
    local_description: String,
    local_candidate: String,
    channel: Arc<FakeChannel>,
    record: Mutex<SessionRecord>,
}

impl FakeSession {
    pub fn new(
        role: Role,
        net: &Arc<FakeNetwork>,
        local_description: &str,
        local_candidate: &str,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            role,
            events,
            local_description: local_description.to_string(),
            local_candidate: local_candidate.to_string(),
            channel: net.channel(side_of(role)),
            record: Mutex::new(SessionRecord::default()),
        });
        (session, rx)
    }

    pub fn record(&self) -> SessionRecord {
        self.record.lock().unwrap().clone()
    }

    pub fn channel(&self) -> Arc<FakeChannel> {
        self.channel.clone()
    }

    /// Fires an engine event by hand.
    pub fn inject(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn announce_local(&self) {
        self.inject(SessionEvent::LocalDescription(self.local_description.clone()));
        self.inject(SessionEvent::LocalCandidate(LocalCandidate::new(
            self.local_candidate.clone(),
        )));
    }

    /// Returns whether this call newly accepted the description.
    fn accept_description(&self, description: &str) -> SignalResult<bool> {
        let mut record = self.record.lock().unwrap();
        record.description_attempts += 1;

        if let Some(accepted) = &record.accepted_description {
            if accepted == description {
                return Ok(false);
            }
            return Err(SignalError::MalformedSignalingPayload(
                "a different remote description was already applied".into(),
            ));
        }
        if !description.starts_with("v=0") {
            return Err(SignalError::MalformedSignalingPayload(
                "description must start with v=0".into(),
            ));
        }
        record.accepted_description = Some(description.to_string());
        Ok(true)
    }

    fn accept_candidate(&self, candidate: &str) -> SignalResult<()> {
        let mut record = self.record.lock().unwrap();
        record.candidate_attempts += 1;

        if record.accepted_description.is_none() {
            return Err(SignalError::MalformedSignalingPayload(
                "no remote description".into(),
            ));
        }
        let kind = LocalCandidate::new(candidate).kind;
        if !candidate.starts_with("candidate:") || kind == CandidateKind::Unspecified {
            return Err(SignalError::MalformedSignalingPayload(format!(
                "unparseable candidate {candidate:?}"
            )));
        }
        record.accepted_candidates.push(candidate.to_string());
        Ok(())
    }
}

#[async_trait]
impl ConnectionSession for FakeSession {
    async fn set_remote_description(&self, description: &str) -> SignalResult<()> {
        tracing::debug!("[FakeSession {:?}] set_remote_description", self.role);
        let fresh = self.accept_description(description)?;
        if fresh && self.role == Role::Answerer {
            self.announce_local();
            let channel: Arc<dyn DataChannel> = self.channel.clone();
            self.inject(SessionEvent::ChannelAvailable(channel));
        }
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: &str) -> SignalResult<()> {
        tracing::debug!("[FakeSession {:?}] add_remote_candidate", self.role);
        self.accept_candidate(candidate)?;
        self.channel.net.mark_remote_ready(side_of(self.role));
        Ok(())
    }

    async fn create_channel(&self, _label: &str) -> SignalResult<Arc<dyn DataChannel>> {
        if self.role != Role::Offerer {
            return Err(SignalError::Engine("answerer cannot create channels".into()));
        }
        self.announce_local();
        Ok(self.channel.clone())
    }

    async fn close(&self) -> SignalResult<()> {
        Ok(())
    }
}
