use crate::error::{SignalError, SignalResult};
use crate::peer::types::{CandidateKind, LocalCandidate};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_candidate_type::RTCIceCandidateType;

/// What to do with a freshly gathered local candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDecision {
    /// Goes into the invitation.
    Accept,
    /// Not useful for a direct path through NAT.
    Ignore,
    /// The network needs a relay; direct pairing cannot work.
    Fatal,
}

pub fn classify_candidate(candidate: &LocalCandidate) -> CandidateDecision {
    match candidate.kind {
        CandidateKind::ServerReflexive => CandidateDecision::Accept,
        CandidateKind::Relayed => CandidateDecision::Fatal,
        CandidateKind::Host | CandidateKind::PeerReflexive | CandidateKind::Unspecified => {
            CandidateDecision::Ignore
        }
    }
}

impl From<RTCIceCandidateType> for CandidateKind {
    fn from(typ: RTCIceCandidateType) -> Self {
        match typ {
            RTCIceCandidateType::Host => CandidateKind::Host,
            RTCIceCandidateType::Srflx => CandidateKind::ServerReflexive,
            RTCIceCandidateType::Prflx => CandidateKind::PeerReflexive,
            RTCIceCandidateType::Relay => CandidateKind::Relayed,
            RTCIceCandidateType::Unspecified => CandidateKind::Unspecified,
        }
    }
}

/// Renders an engine candidate into the text the peer will paste.
pub fn local_candidate(cand: &RTCIceCandidate) -> SignalResult<LocalCandidate> {
    let init = cand.to_json()?;
    Ok(LocalCandidate {
        kind: CandidateKind::from(cand.typ),
        candidate: init.candidate,
    })
}

/// Turns pasted candidate text into something the engine accepts.
///
/// Both `candidate:...` and `a=candidate:...` are accepted.
pub fn remote_candidate_init(text: &str) -> SignalResult<RTCIceCandidateInit> {
    let trimmed = text.trim();
    let candidate = trimmed.strip_prefix("a=").unwrap_or(trimmed);
    if !candidate.starts_with("candidate:") {
        return Err(SignalError::MalformedSignalingPayload(format!(
            "expected a candidate line, got {:?}",
            truncate(candidate, 48)
        )));
    }
    // an empty candidate would be read as end-of-candidates
    if candidate.len() == "candidate:".len() {
        return Err(SignalError::MalformedSignalingPayload(
            "candidate line is empty".into(),
        ));
    }

    Ok(RTCIceCandidateInit {
        candidate: candidate.to_string(),
        sdp_mid: Some("0".into()),
        sdp_mline_index: Some(0),
        username_fragment: None,
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
