use crate::console::{ConsoleIn, ConsoleOut};
use crate::error::{SignalError, SignalResult};
use crate::peer::codec::{pack, unpack};
use crate::peer::traits::ConnectionSession;
use crate::peer::types::{Invitation, InvitationFormat};
use tracing::{debug, error, info};

pub const LOCAL_INVITATION_HEADER: &str = "[Copy LOCAL INVITATION:]";
pub const REMOTE_INVITATION_PROMPT: &str = "[Paste REMOTE INVITATION:]";

/// Text block the operator copies to the peer.
///
/// Plain layout is the header, the candidate line, the description lines and
/// a blank line that terminates the paste on the other side.
pub fn render_invitation(invitation: &Invitation, format: InvitationFormat) -> SignalResult<String> {
    let mut block = String::new();
    block.push_str(LOCAL_INVITATION_HEADER);
    block.push('\n');

    match format {
        InvitationFormat::Plain => {
            block.push_str(invitation.candidate.trim());
            block.push('\n');
            for line in invitation.description.lines().filter(|l| !l.is_empty()) {
                block.push_str(line);
                block.push('\n');
            }
        }
        InvitationFormat::Packed => {
            block.push_str(&pack(invitation)?);
            block.push('\n');
        }
    }

    block.push('\n');
    Ok(block)
}

pub async fn print_local_invitation(
    out: &ConsoleOut,
    invitation: &Invitation,
    format: InvitationFormat,
) -> SignalResult<()> {
    out.write(&render_invitation(invitation, format)?).await
}

/// Reads one pasted invitation.
///
/// Plain: first non-blank line is the candidate, following lines up to the
/// first blank one are the description. Packed: first non-blank line.
pub async fn read_remote_invitation(
    input: &mut ConsoleIn,
    format: InvitationFormat,
) -> SignalResult<Invitation> {
    let first = loop {
        match input.read_line().await? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => break line,
            None => return Err(SignalError::InputClosed),
        }
    };

    match format {
        InvitationFormat::Plain => {
            let mut description = String::new();
            while let Some(line) = input.read_line().await? {
                if line.is_empty() {
                    break;
                }
                description.push_str(&line);
                description.push_str("\r\n");
            }
            Ok(Invitation {
                candidate: first.trim().to_string(),
                description,
            })
        }
        InvitationFormat::Packed => {
            let bundle = unpack(&first)?;
            debug!("Decoded packed invitation id={} ts={}", bundle.id, bundle.ts);
            Ok(Invitation {
                candidate: bundle.candidate,
                description: bundle.description,
            })
        }
    }
}

/// Description first, then candidate. Stops at the first rejection.
pub async fn apply_remote_invitation(
    session: &dyn ConnectionSession,
    invitation: &Invitation,
) -> SignalResult<()> {
    session
        .set_remote_description(&invitation.description)
        .await?;
    session.add_remote_candidate(&invitation.candidate).await
}

/// Prompts until a pasted invitation is accepted by the session.
///
/// No retry limit. Only the operator can fix the text.
/// Anything other than a malformed payload ends the loop with that error.
pub async fn accept_remote_invitation(
    input: &mut ConsoleIn,
    out: &ConsoleOut,
    session: &dyn ConnectionSession,
    format: InvitationFormat,
) -> SignalResult<()> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        out.write_line(REMOTE_INVITATION_PROMPT).await?;

        let result = match read_remote_invitation(input, format).await {
            Ok(invitation) => apply_remote_invitation(session, &invitation).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("Remote invitation accepted (attempt {attempt})");
                return Ok(());
            }
            Err(e) if e.is_recoverable() => {
                error!("{e}");
            }
            Err(e) => return Err(e),
        }
    }
}
