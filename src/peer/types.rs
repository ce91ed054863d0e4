use crate::peer::traits::DataChannel;
use bytes::Bytes;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which side of the negotiation this process plays. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Offerer,
    Answerer,
}

impl Role {
    pub fn banner(self) -> &'static str {
        match self {
            Role::Offerer => "-- OFFERER --",
            Role::Answerer => "-- ANSWERER --",
        }
    }
}

/// How invitations are written to and read from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InvitationFormat {
    /// Candidate line, description lines, blank line.
    #[default]
    Plain,
    /// One line of base64(gzip(json)).
    Packed,
}

/// ICE candidate type as far as pairing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Host,
    ServerReflexive,
    PeerReflexive,
    Relayed,
    Unspecified,
}

impl CandidateKind {
    /// Reads the `typ` token out of a candidate attribute line.
    pub fn from_candidate_line(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            if token == "typ" {
                return match tokens.next() {
                    Some("host") => CandidateKind::Host,
                    Some("srflx") => CandidateKind::ServerReflexive,
                    Some("prflx") => CandidateKind::PeerReflexive,
                    Some("relay") => CandidateKind::Relayed,
                    _ => CandidateKind::Unspecified,
                };
            }
        }
        CandidateKind::Unspecified
    }
}

/// A gathered local candidate, already rendered as its SDP attribute text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCandidate {
    pub kind: CandidateKind,
    pub candidate: String,
}

impl LocalCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        let candidate = candidate.into();
        Self {
            kind: CandidateKind::from_candidate_line(&candidate),
            candidate,
        }
    }
}

/// Data channel lifecycle as observed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelPayload {
    Text(String),
    Binary(Bytes),
}

/// Things a data channel reports after `attach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Open,
    Message(ChannelPayload),
    Closed,
}

/// Things a connection session reports while negotiating.
pub enum SessionEvent {
    LocalDescription(String),
    LocalCandidate(LocalCandidate),
    ChannelAvailable(Arc<dyn DataChannel>),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::LocalDescription(sdp) => {
                write!(f, "LocalDescription({} bytes)", sdp.len())
            }
            SessionEvent::LocalCandidate(c) => write!(f, "LocalCandidate({:?})", c),
            SessionEvent::ChannelAvailable(dc) => write!(f, "ChannelAvailable({})", dc.label()),
        }
    }
}

/// Both halves of an invitation, ready to be shown to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub candidate: String,
    pub description: String,
}

/// Packed invitation with metadata
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvitationBundle {
    pub candidate: String,
    pub description: String,
    pub id: String,
    pub ts: i64,
}
