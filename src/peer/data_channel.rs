use crate::error::{SignalError, SignalResult};
use crate::peer::traits::DataChannel;
use crate::peer::types::{ChannelEvent, ChannelPayload, ChannelState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::data_channel::RTCDataChannel;

/// `webrtc` data channel behind the [`DataChannel`] seam.
pub struct WebRtcChannel {
    dc: Arc<RTCDataChannel>,
}

impl WebRtcChannel {
    pub fn new(dc: Arc<RTCDataChannel>) -> Arc<Self> {
        Arc::new(Self { dc })
    }
}

impl From<RTCDataChannelState> for ChannelState {
    fn from(state: RTCDataChannelState) -> Self {
        match state {
            RTCDataChannelState::Open => ChannelState::Open,
            RTCDataChannelState::Closing | RTCDataChannelState::Closed => ChannelState::Closed,
            RTCDataChannelState::Connecting | RTCDataChannelState::Unspecified => {
                ChannelState::Connecting
            }
        }
    }
}

fn payload(msg: DataChannelMessage) -> ChannelPayload {
    if msg.is_string {
        ChannelPayload::Text(String::from_utf8_lossy(&msg.data).into_owned())
    } else {
        ChannelPayload::Binary(msg.data)
    }
}

#[async_trait]
impl DataChannel for WebRtcChannel {
    fn label(&self) -> String {
        self.dc.label().to_string()
    }

    fn ready_state(&self) -> ChannelState {
        self.dc.ready_state().into()
    }

    fn attach(&self, sink: mpsc::UnboundedSender<ChannelEvent>) {
        let label = self.label();
        debug!("attaching handlers to data channel {label}");

        self.dc.on_open(Box::new({
            let sink = sink.clone();
            let label = label.clone();
            move || {
                info!("Data channel {label} opened");
                let _ = sink.send(ChannelEvent::Open);
                Box::pin(async {})
            }
        }));

        self.dc.on_message(Box::new({
            let sink = sink.clone();
            move |msg: DataChannelMessage| {
                debug!("Received message, length: {}", msg.data.len());
                if sink.send(ChannelEvent::Message(payload(msg))).is_err() {
                    debug!("message dropped: receiver gone");
                }
                Box::pin(async {})
            }
        }));

        self.dc.on_close(Box::new(move || {
            info!("Data channel {label} closed");
            let _ = sink.send(ChannelEvent::Closed);
            Box::pin(async {})
        }));
    }

    async fn send_text(&self, text: &str) -> SignalResult<()> {
        self.dc
            .send_text(text.to_string())
            .await
            .map(|_| ())
            .map_err(|e| SignalError::SendFailure(e.to_string()))
    }
}
