use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{Prize, WinnerRecord};
use std::sync::Arc;
use std::time::Duration;

/// Hold a committed draw back from the public display for the configured
/// suspense window, then reveal it.
///
/// The draw itself is already committed when this is called; the delay is
/// pure stagecraft and a zero-second config skips it entirely.
pub fn schedule_reveal(state: Arc<AppState>, prize: Prize, winners: Vec<WinnerRecord>) {
    let delay = Duration::from_secs(state.config.reveal_seconds);

    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        state.broadcast_to_beamers(ServerMessage::DrawRevealed { prize, winners });

        // Follow up with a snapshot so displays that missed earlier updates
        // converge on the committed state.
        state.broadcast_snapshot().await;
    });
}
