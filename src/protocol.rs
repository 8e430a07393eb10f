use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Upload a participant list: one raw CSV line per entry.
    AddList {
        name: String,
        raw_lines: Vec<String>,
    },
    RemoveList {
        list_id: ListId,
    },
    AddPrize {
        name: String,
        quantity: u32,
        scope: PrizeScope,
    },
    RemovePrize {
        prize_id: PrizeId,
    },
    /// Run the batch draw for a prize.
    Draw {
        prize_id: PrizeId,
    },
    /// Ask for a fresh full-state snapshot (reconnect recovery).
    GetSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        snapshot: RaffleSnapshot,
        server_now: String,
    },
    Snapshot {
        snapshot: RaffleSnapshot,
    },
    ListAdded {
        list: ParticipantList,
    },
    ListRemoved {
        list_id: ListId,
    },
    PrizeAdded {
        prize: Prize,
    },
    PrizeRemoved {
        prize_id: PrizeId,
    },
    /// Broadcast to display clients the moment a draw commits; the suspense
    /// window between this and `DrawRevealed` is pure presentation.
    DrawStarted {
        prize: Prize,
    },
    /// Sent to the operator immediately with the committed batch.
    DrawResult {
        prize: Prize,
        winners: Vec<WinnerRecord>,
    },
    /// Broadcast to display clients once the suspense window elapses.
    DrawRevealed {
        prize: Prize,
        winners: Vec<WinnerRecord>,
    },
    Error {
        code: String,
        msg: String,
    },
}
