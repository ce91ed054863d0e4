use crate::bridge::ChannelBridge;
use crate::config::Config;
use crate::console::{Console, ConsoleIn, ConsoleOut};
use crate::error::SignalResult;
use crate::messaging::send_loop;
use crate::peer::state::InvitationState;
use crate::peer::traits::ConnectionSession;
use crate::peer::types::{InvitationFormat, Role, SessionEvent};
use crate::signaling::{accept_remote_invitation, print_local_invitation};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One pairing attempt: owns the negotiation results for a single session.
///
/// Engine events are drained by a background pump into the invitation
/// state and the channel bridge; `run` drives the foreground side.
pub struct Coordinator {
    role: Role,
    format: InvitationFormat,
    channel_label: String,
    session: Arc<dyn ConnectionSession>,
    invitation: Arc<InvitationState>,
    bridge: Arc<ChannelBridge>,
    pump: JoinHandle<()>,
}

impl Coordinator {
    pub fn new(
        config: &Config,
        session: Arc<dyn ConnectionSession>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let invitation = Arc::new(InvitationState::new());
        let bridge = Arc::new(ChannelBridge::new());
        let pump = tokio::spawn(pump_events(
            config.role,
            events,
            invitation.clone(),
            bridge.clone(),
        ));

        Self {
            role: config.role,
            format: config.format,
            channel_label: config.channel_label.clone(),
            session,
            invitation,
            bridge,
            pump,
        }
    }

    /// Runs the whole exchange, then the message loop until input ends.
    ///
    /// A relayed local candidate ends the run at any point, even while
    /// waiting on the operator.
    pub async fn run(&self, console: Console) -> SignalResult<()> {
        let Console { mut input, out } = console;
        out.write(&format!("{}\n\n", self.role.banner())).await?;

        tokio::select! {
            biased;
            err = self.invitation.wait_fatal() => Err(err),
            result = self.drive(&mut input, &out) => result,
        }
    }

    async fn drive(&self, input: &mut ConsoleIn, out: &ConsoleOut) -> SignalResult<()> {
        match self.role {
            Role::Offerer => {
                let channel = self.session.create_channel(&self.channel_label).await?;
                self.bridge.offer_handle(channel);

                self.present_local_invitation(out).await?;
                accept_remote_invitation(input, out, self.session.as_ref(), self.format).await?;
            }
            Role::Answerer => {
                accept_remote_invitation(input, out, self.session.as_ref(), self.format).await?;
                self.present_local_invitation(out).await?;
            }
        }

        if !self.bridge.has_handle() {
            info!("Waiting for the offerer's data channel...");
        }
        let open = self.bridge.await_open(out.clone()).await?;

        let result = send_loop(input, out, open.channel.as_ref()).await;
        open.receiver.abort();
        result
    }

    async fn present_local_invitation(&self, out: &ConsoleOut) -> SignalResult<()> {
        debug!("Waiting for local description and candidate...");
        let invitation = self.invitation.await_complete().await?;
        print_local_invitation(out, &invitation, self.format).await
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump_events(
    role: Role,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    invitation: Arc<InvitationState>,
    bridge: Arc<ChannelBridge>,
) {
    while let Some(event) = events.recv().await {
        debug!(?event, "session event");
        match event {
            SessionEvent::LocalDescription(sdp) => invitation.record_description(sdp),
            SessionEvent::LocalCandidate(candidate) => invitation.record_candidate(candidate),
            SessionEvent::ChannelAvailable(channel) => {
                if role == Role::Offerer {
                    warn!("Offerer was handed a remote data channel, ignoring");
                    continue;
                }
                bridge.offer_handle(channel);
            }
        }
    }
    debug!("session event queue closed");
}
