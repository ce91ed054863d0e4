use crate::console::ConsoleOut;
use crate::error::{SignalError, SignalResult};
use crate::messaging::receive_loop;
use crate::peer::state::OnceSlot;
use crate::peer::traits::DataChannel;
use crate::peer::types::ChannelState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Holds the data channel handle until the coordinator is ready for it.
#[derive(Default)]
pub struct ChannelBridge {
    handle: OnceSlot<Arc<dyn DataChannel>>,
}

/// A channel that reached `Open`, with its receive task running.
pub struct OpenChannel {
    pub channel: Arc<dyn DataChannel>,
    pub receiver: JoinHandle<()>,
}

impl ChannelBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// First handle wins; later ones are ignored.
    pub fn offer_handle(&self, channel: Arc<dyn DataChannel>) -> bool {
        let label = channel.label();
        let stored = self.handle.set(channel);
        if stored {
            debug!("Data channel handle available: {label}");
        } else {
            debug!("Data channel handle already set, ignoring {label}");
        }
        stored
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_set()
    }

    /// Waits for the handle, starts the receive task, then waits for `Open`.
    ///
    /// The receive handler is attached before the open check so no early
    /// message can slip past.
    pub async fn await_open(&self, out: ConsoleOut) -> SignalResult<OpenChannel> {
        let channel = self.handle.wait().await;

        let (tx, rx) = mpsc::unbounded_channel();
        channel.attach(tx);

        let (state_tx, mut state_rx) = watch::channel(channel.ready_state());
        let receiver = tokio::spawn(receive_loop(rx, out, state_tx));

        let state = *state_rx
            .wait_for(|s| *s != ChannelState::Connecting)
            .await
            .map_err(|_| SignalError::ChannelClosed)?;

        match state {
            ChannelState::Open => {
                info!("Data channel {} is open", channel.label());
                Ok(OpenChannel { channel, receiver })
            }
            _ => {
                receiver.abort();
                Err(SignalError::ChannelClosed)
            }
        }
    }
}
