pub mod codec;
pub mod connection;
pub mod data_channel;
pub mod ice;
pub mod state;
pub mod traits;
pub mod types;

pub use connection::WebRtcSession;
pub use data_channel::WebRtcChannel;
pub use state::{InvitationState, OnceSlot};
pub use traits::{ConnectionSession, DataChannel};
pub use types::{
    CandidateKind, ChannelEvent, ChannelPayload, ChannelState, Invitation, InvitationBundle,
    InvitationFormat, LocalCandidate, Role, SessionEvent,
};
