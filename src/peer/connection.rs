use crate::config::Config;
use crate::error::{SignalError, SignalResult};
use crate::logger::{log_candidate, log_selected_pair};
use crate::peer::data_channel::WebRtcChannel;
use crate::peer::ice::{local_candidate, remote_candidate_init};
use crate::peer::state::OnceSlot;
use crate::peer::traits::{ConnectionSession, DataChannel};
use crate::peer::types::{Role, SessionEvent};
use async_trait::async_trait;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::rtcp_mux_policy::RTCRtcpMuxPolicy;
use webrtc::{
    api::APIBuilder,
    data_channel::{data_channel_init::RTCDataChannelInit, RTCDataChannel},
    ice_transport::ice_server::RTCIceServer,
    peer_connection::{
        configuration::RTCConfiguration, peer_connection_state::RTCPeerConnectionState,
        sdp::session_description::RTCSessionDescription, RTCPeerConnection,
    },
};

/// A single `RTCPeerConnection` driven through the [`ConnectionSession`] seam.
pub struct WebRtcSession {
    pc: Arc<RTCPeerConnection>,
    role: Role,
    events: mpsc::UnboundedSender<SessionEvent>,
    remote_description: OnceSlot<String>,
}

fn rtc_config(urls: Vec<String>) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: vec![RTCIceServer {
            urls,
            ..Default::default()
        }],
        bundle_policy: RTCBundlePolicy::MaxBundle,
        rtcp_mux_policy: RTCRtcpMuxPolicy::Require,
        ..Default::default()
    }
}

fn rejected(err: webrtc::Error) -> SignalError {
    SignalError::MalformedSignalingPayload(err.to_string())
}

impl WebRtcSession {
    /// Builds the peer connection and wires engine callbacks into `events`.
    pub async fn new(
        config: &Config,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> SignalResult<Arc<Self>> {
        let urls = config.ice_server_urls().map_err(SignalError::Engine)?;
        info!("Creating peer connection with {} ICE servers", urls.len());

        let api = APIBuilder::new().build();
        let pc = Arc::new(api.new_peer_connection(rtc_config(urls)).await?);

        pc.on_ice_candidate(Box::new({
            let events = events.clone();
            move |cand: Option<RTCIceCandidate>| {
                match cand {
                    Some(c) => {
                        log_candidate("LOCAL", &c);
                        match local_candidate(&c) {
                            Ok(candidate) => {
                                let _ = events.send(SessionEvent::LocalCandidate(candidate));
                            }
                            Err(e) => warn!("Failed to serialize local candidate: {e}"),
                        }
                    }
                    None => debug!("ICE candidate gathering completed (null candidate received)"),
                }
                Box::pin(async {})
            }
        }));

        pc.on_ice_gathering_state_change(Box::new(move |state| {
            debug!("ICE gathering state changed to: {:?}", state);
            Box::pin(async {})
        }));

        let pc_stats: Weak<RTCPeerConnection> = Arc::downgrade(&pc);
        pc.on_peer_connection_state_change(Box::new(move |st: RTCPeerConnectionState| {
            info!("Peer connection state changed to: {:?}", st);
            if st == RTCPeerConnectionState::Connected {
                if let Some(pc) = pc_stats.upgrade() {
                    tokio::spawn(async move {
                        log_selected_pair(&pc, "CONNECTED").await;
                    });
                }
            }
            Box::pin(async {})
        }));

        if config.role == Role::Answerer {
            let events = events.clone();
            pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                info!("Remote data channel announced: {}", dc.label());
                let channel: Arc<dyn DataChannel> = WebRtcChannel::new(dc);
                let _ = events.send(SessionEvent::ChannelAvailable(channel));
                Box::pin(async {})
            }));
        }

        Ok(Arc::new(Self {
            pc,
            role: config.role,
            events,
            remote_description: OnceSlot::new(),
        }))
    }

    fn emit_local_description(&self, sdp: String) {
        debug!("Local description ready ({} bytes)", sdp.len());
        let _ = self.events.send(SessionEvent::LocalDescription(sdp));
    }
}

#[async_trait]
impl ConnectionSession for WebRtcSession {
    async fn set_remote_description(&self, description: &str) -> SignalResult<()> {
        if let Some(applied) = self.remote_description.get() {
            if applied == description {
                debug!("Remote description already applied, skipping");
                return Ok(());
            }
            return Err(SignalError::MalformedSignalingPayload(
                "a different remote description was already applied".into(),
            ));
        }

        // the offerer only ever receives answers, the answerer only offers
        let desc = match self.role {
            Role::Offerer => RTCSessionDescription::answer(description.to_string()),
            Role::Answerer => RTCSessionDescription::offer(description.to_string()),
        }
        .map_err(rejected)?;

        info!("Setting remote description...");
        self.pc.set_remote_description(desc).await.map_err(rejected)?;

        if self.role == Role::Answerer {
            info!("Creating answer...");
            let answer = self.pc.create_answer(None).await?;
            let sdp = answer.sdp.clone();
            self.pc.set_local_description(answer).await?;
            self.emit_local_description(sdp);
        }

        self.remote_description.set(description.to_string());
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: &str) -> SignalResult<()> {
        if !self.remote_description.is_set() {
            return Err(SignalError::MalformedSignalingPayload(
                "remote description must be applied before its candidate".into(),
            ));
        }

        let init = remote_candidate_init(candidate)?;
        debug!("Applying remote candidate: {}", init.candidate);
        self.pc.add_ice_candidate(init).await.map_err(rejected)
    }

    async fn create_channel(&self, label: &str) -> SignalResult<Arc<dyn DataChannel>> {
        if self.role != Role::Offerer {
            return Err(SignalError::Engine(
                "only the offerer creates the data channel".into(),
            ));
        }

        let dc = self
            .pc
            .create_data_channel(label, Some(RTCDataChannelInit::default()))
            .await?;

        info!("Creating offer...");
        let offer = self.pc.create_offer(None).await?;
        let sdp = offer.sdp.clone();
        self.pc.set_local_description(offer).await?;
        self.emit_local_description(sdp);

        Ok(WebRtcChannel::new(dc))
    }

    async fn close(&self) -> SignalResult<()> {
        self.pc.close().await?;
        Ok(())
    }
}
