use super::AppState;
use crate::types::*;

/// Read-side of the winner ledger.
///
/// The only writer is the draw commit in `draw.rs`, which appends a whole
/// batch while it still holds the prize and ledger write locks; there is no
/// standalone append, and no operation deletes or mutates a record.
impl AppState {
    /// Whether a participant already appears anywhere in the ledger.
    pub async fn has_won(&self, participant_id: &str) -> bool {
        self.winners
            .read()
            .await
            .iter()
            .any(|w| w.participant.id == participant_id)
    }

    /// The full winner history, in commit order.
    pub async fn winner_history(&self) -> Vec<WinnerRecord> {
        self.winners.read().await.clone()
    }
}
