use crate::console::{ConsoleIn, ConsoleOut};
use crate::error::SignalResult;
use crate::peer::traits::DataChannel;
use crate::peer::types::{ChannelEvent, ChannelPayload, ChannelState};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

pub const SEND_PROMPT: &str = "[Send MESSAGES:] ";

pub fn format_received(text: &str) -> String {
    format!("[Received MESSAGE: {text}]")
}

/// Drains channel events: tracks open/closed and prints inbound text.
///
/// Binary payloads are dropped. Ends when the channel closes or the sink goes away.
pub async fn receive_loop(
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    out: ConsoleOut,
    state: watch::Sender<ChannelState>,
) {
    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Open => {
                state.send_replace(ChannelState::Open);
            }
            ChannelEvent::Message(ChannelPayload::Text(text)) => {
                if let Err(e) = out.write_line(&format_received(&text)).await {
                    warn!("Failed to print received message: {e}");
                }
            }
            ChannelEvent::Message(ChannelPayload::Binary(data)) => {
                debug!("Ignoring binary message ({} bytes)", data.len());
            }
            ChannelEvent::Closed => {
                state.send_replace(ChannelState::Closed);
                info!("Data channel closed, no more messages will arrive");
                break;
            }
        }
    }
}

/// Foreground half: one line in, one message out, until input ends.
///
/// Send failures are logged and the loop keeps going.
pub async fn send_loop(
    input: &mut ConsoleIn,
    out: &ConsoleOut,
    channel: &dyn DataChannel,
) -> SignalResult<()> {
    out.write_line(SEND_PROMPT).await?;

    while let Some(line) = input.read_line().await? {
        if line.is_empty() {
            continue;
        }
        if let Err(e) = channel.send_text(&line).await {
            error!("{e}");
        }
    }

    info!("Input closed, leaving message loop");
    Ok(())
}
