pub mod bridge;
pub mod config;
pub mod console;
pub mod error;
pub mod logger;
pub mod messaging;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod utils;

pub use config::Config;
pub use error::{SignalError, SignalResult};
pub use session::Coordinator;

use crate::console::Console;
use crate::peer::traits::ConnectionSession;
use crate::peer::WebRtcSession;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Pairs with a peer over stdin/stdout and relays messages until input ends.
pub async fn run(config: Config) -> SignalResult<()> {
    info!("Starting as {:?}", config.role);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = WebRtcSession::new(&config, events_tx).await?;
    let coordinator = Coordinator::new(&config, session.clone(), events_rx);

    let result = coordinator.run(Console::stdio()).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close peer connection: {e}");
    }
    result
}
