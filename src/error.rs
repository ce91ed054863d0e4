use thiserror::Error;

/// Everything that can go wrong while pairing two peers by hand.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Remote description or candidate text was rejected. The operator is asked again.
    #[error("malformed signaling payload: {0}")]
    MalformedSignalingPayload(String),

    /// An outbound message could not be delivered. Not fatal.
    #[error("failed to send message: {0}")]
    SendFailure(String),

    /// A relayed local candidate showed up, which means symmetric NAT.
    #[error("symmetric NAT not supported (relayed local candidate)")]
    UnsupportedNetworkEnvironment,

    #[error("data channel closed before it opened")]
    ChannelClosed,

    #[error("input closed while waiting for remote invitation")]
    InputClosed,

    #[error("webrtc engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalError {
    /// Only malformed remote text is recovered locally by re-prompting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SignalError::MalformedSignalingPayload(_))
    }
}

impl From<webrtc::Error> for SignalError {
    fn from(err: webrtc::Error) -> Self {
        SignalError::Engine(err.to_string())
    }
}

pub type SignalResult<T> = Result<T, SignalError>;
