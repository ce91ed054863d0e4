use crate::error::{SignalError, SignalResult};
use crate::peer::types::{Invitation, InvitationBundle};
use crate::utils::random_id;
use base64::{engine::general_purpose, Engine as _};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{Read, Write};

/// Upper bound on inflated bundle size (zip-bomb guard).
const MAX_DECOMPRESSED_SIZE: u64 = 256 * 1024;

/// JSON -> gzip -> base64, one line.
pub fn pack(invitation: &Invitation) -> SignalResult<String> {
    let bundle = InvitationBundle {
        candidate: invitation.candidate.clone(),
        description: invitation.description.clone(),
        id: random_id(),
        ts: chrono::Utc::now().timestamp(),
    };

    let json = serde_json::to_vec(&bundle)
        .map_err(|e| SignalError::Engine(format!("encode invitation: {e}")))?;

    let mut gz = GzEncoder::new(Vec::new(), Compression::fast());
    gz.write_all(&json)?;
    let compressed = gz.finish()?;

    Ok(general_purpose::STANDARD.encode(compressed))
}

pub fn unpack(encoded: &str) -> SignalResult<InvitationBundle> {
    let compressed = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| malformed("base64", e))?;

    let gz = GzDecoder::new(&compressed[..]);
    let mut json = Vec::new();
    gz.take(MAX_DECOMPRESSED_SIZE)
        .read_to_end(&mut json)
        .map_err(|e| malformed("gzip", e))?;

    serde_json::from_slice(&json).map_err(|e| malformed("json", e))
}

fn malformed(stage: &str, err: impl std::fmt::Display) -> SignalError {
    SignalError::MalformedSignalingPayload(format!("packed invitation ({stage}): {err}"))
}
