use crate::peer::types::{InvitationFormat, Role};
use crate::utils::add_ice_url_scheme;
use clap::Parser;

/// Default tracing filter. Debug builds are chattier about our own crate.
#[cfg(debug_assertions)]
pub const DEFAULT_LOG_FILTER: &str = "pastelink=debug,info,webrtc=warn";

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_FILTER: &str = "info,webrtc=warn";

pub const DEFAULT_CHANNEL_LABEL: &str = "DataChannel0";

pub const DEFAULT_ICE_SERVERS: [&str; 5] = [
    "stun.l.google.com:19302",
    "stun1.l.google.com:19302",
    "stun2.l.google.com:19302",
    "stun3.l.google.com:19302",
    "stun4.l.google.com:19302",
];

#[derive(Parser, Debug, Clone)]
#[command(name = "pastelink")]
#[command(about = "Open a WebRTC data channel by pasting invitations between two terminals")]
pub struct Config {
    /// Which side of the handshake to play
    #[arg(long, value_enum, env = "PASTELINK_ROLE", default_value = "offerer")]
    pub role: Role,

    /// STUN server, repeatable; order is kept
    #[arg(
        long = "ice-server",
        value_name = "URL",
        env = "PASTELINK_ICE_SERVERS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ICE_SERVERS.map(String::from)
    )]
    pub ice_servers: Vec<String>,

    /// Label of the data channel the offerer creates
    #[arg(long, default_value = DEFAULT_CHANNEL_LABEL)]
    pub channel_label: String,

    /// Invitation text layout
    #[arg(long, value_enum, default_value = "plain")]
    pub format: InvitationFormat,

    /// Tracing filter, overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ice_servers: DEFAULT_ICE_SERVERS.iter().map(|s| s.to_string()).collect(),
            channel_label: DEFAULT_CHANNEL_LABEL.to_string(),
            format: InvitationFormat::Plain,
            log_level: None,
        }
    }

    /// Checks the server list and returns it with schemes filled in.
    pub fn ice_server_urls(&self) -> Result<Vec<String>, String> {
        if self.ice_servers.is_empty() {
            return Err("at least one ICE server is required".into());
        }

        self.ice_servers
            .iter()
            .map(|server| {
                if server.trim().is_empty() {
                    return Err("ICE server URL cannot be empty".to_string());
                }
                let url = add_ice_url_scheme(server);
                if url.starts_with("turn:") || url.starts_with("turns:") {
                    return Err(format!(
                        "{url}: TURN servers are not supported, relayed paths cannot be paired"
                    ));
                }
                Ok(url)
            })
            .collect()
    }
}
