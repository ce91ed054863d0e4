use crate::error::SignalResult;
use crate::peer::types::{ChannelEvent, ChannelState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The negotiation engine as seen by the coordinator.
///
/// Local descriptions, local candidates and incoming data channels are not
/// returned from these calls. They arrive as [`SessionEvent`]s on the queue
/// the session was built with.
///
/// [`SessionEvent`]: crate::peer::types::SessionEvent
#[async_trait]
pub trait ConnectionSession: Send + Sync {
    /// Applies the peer's session description.
    ///
    /// Fails with `MalformedSignalingPayload` when the text is rejected.
    async fn set_remote_description(&self, description: &str) -> SignalResult<()>;

    /// Applies the peer's candidate. Must follow a successful
    /// `set_remote_description`.
    async fn add_remote_candidate(&self, candidate: &str) -> SignalResult<()>;

    /// Offerer only. Creates the data channel and starts negotiation.
    async fn create_channel(&self, label: &str) -> SignalResult<Arc<dyn DataChannel>>;

    async fn close(&self) -> SignalResult<()>;
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> String;

    fn ready_state(&self) -> ChannelState;

    /// Starts forwarding open, message and close notifications into `sink`.
    fn attach(&self, sink: mpsc::UnboundedSender<ChannelEvent>);

    async fn send_text(&self, text: &str) -> SignalResult<()>;
}
