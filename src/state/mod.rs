mod catalog;
mod draw;
mod eligibility;
mod ledger;
mod registry;

pub mod export;

pub use draw::{DrawError, DrawOutcome};
pub use eligibility::eligible_pool;

use crate::protocol::ServerMessage;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

/// Runtime configuration for the raffle service.
#[derive(Debug, Clone)]
pub struct RaffleConfig {
    /// TCP port the server binds to.
    pub port: u16,
    /// Seconds the public display holds the suspense before a committed draw
    /// is revealed.
    pub reveal_seconds: u64,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            port: 8379,
            reveal_seconds: 3,
        }
    }
}

impl RaffleConfig {
    /// Load config from SORTEO_PORT and SORTEO_REVEAL_SECONDS, falling back
    /// to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("SORTEO_PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);
        let reveal_seconds = std::env::var("SORTEO_REVEAL_SECONDS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.reveal_seconds);
        Self {
            port,
            reveal_seconds,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lists: Arc<RwLock<Vec<ParticipantList>>>,
    pub prizes: Arc<RwLock<Vec<Prize>>>,
    /// The winner ledger: append-only for the lifetime of the session.
    pub winners: Arc<RwLock<Vec<WinnerRecord>>>,
    /// Held with `try_lock` for the duration of one draw commit, so a second
    /// draw arriving mid-commit fails fast instead of racing the pool.
    draw_gate: Arc<Mutex<()>>,
    /// Broadcast channel for sending messages to display clients
    pub beamer_broadcast: broadcast::Sender<ServerMessage>,
    pub config: RaffleConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::new_with_config(RaffleConfig::default())
    }

    pub fn new_with_config(config: RaffleConfig) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            lists: Arc::new(RwLock::new(Vec::new())),
            prizes: Arc::new(RwLock::new(Vec::new())),
            winners: Arc::new(RwLock::new(Vec::new())),
            draw_gate: Arc::new(Mutex::new(())),
            beamer_broadcast: tx,
            config,
        }
    }

    /// Full-state snapshot for welcomes, reconnects and exports.
    pub async fn snapshot(&self) -> RaffleSnapshot {
        let lists = self.lists.read().await;
        let winners = self.winners.read().await;
        let available = eligible_pool(&PrizeScope::AllLists, &lists, &winners).len();

        RaffleSnapshot {
            lists: lists.clone(),
            prizes: self.prizes.read().await.clone(),
            winners: winners.clone(),
            available,
        }
    }

    /// Send a message to all connected display clients. Send errors are
    /// ignored (no receivers connected is fine).
    pub fn broadcast_to_beamers(&self, msg: ServerMessage) {
        let _ = self.beamer_broadcast.send(msg);
    }

    /// Push a fresh snapshot to display clients after a setup mutation.
    pub async fn broadcast_snapshot(&self) {
        let snapshot = self.snapshot().await;
        self.broadcast_to_beamers(ServerMessage::Snapshot { snapshot });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn lines(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_snapshot_tracks_availability() {
        let state = AppState::new();
        state
            .add_list("Ventas".to_string(), lines(&["Ana", "Luis", "Carmen"]))
            .await
            .unwrap();
        state
            .add_list("Sistemas".to_string(), lines(&["Diego", "Elena"]))
            .await
            .unwrap();

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.lists.len(), 2);
        assert_eq!(snapshot.available, 5);

        let prize = state
            .add_prize("Cesta".to_string(), 2, PrizeScope::AllLists)
            .await
            .unwrap();
        state.draw(&prize.id).await.unwrap();

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.winners.len(), 2);
        assert_eq!(snapshot.available, 3);
    }

    // Scenario: L1 = [A,B,C], L2 = [D,E]. P1 (quantity 2, scope L1) consumes
    // two of L1; P2 (quantity 1, scope all) must pick among the 3 survivors.
    #[tokio::test]
    async fn test_draws_across_overlapping_scopes_never_double_win() {
        let state = AppState::new();
        let l1 = state
            .add_list("L1".to_string(), lines(&["A", "B", "C"]))
            .await
            .unwrap();
        state
            .add_list("L2".to_string(), lines(&["D", "E"]))
            .await
            .unwrap();

        let p1 = state
            .add_prize("P1".to_string(), 2, PrizeScope::List(l1.id.clone()))
            .await
            .unwrap();
        let p2 = state
            .add_prize("P2".to_string(), 1, PrizeScope::AllLists)
            .await
            .unwrap();

        let first = state.draw(&p1.id).await.unwrap();
        assert_eq!(first.winners.len(), 2);
        assert!(first.prize.awarded);
        for w in &first.winners {
            assert!(l1.participants.iter().any(|p| p.id == w.participant.id));
        }

        let second = state.draw(&p2.id).await.unwrap();
        assert_eq!(second.winners.len(), 1);
        let repeat = first
            .winners
            .iter()
            .any(|w| w.participant.id == second.winners[0].participant.id);
        assert!(!repeat, "a participant won twice");

        let history = state.winner_history().await;
        let mut ids: Vec<_> = history.iter().map(|w| w.participant.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), history.len(), "duplicate participant in ledger");
    }

    // Scenario: two prizes target the same list and together ask for more
    // winners than it holds; the second draw must fail once the first
    // exhausts the pool.
    #[tokio::test]
    async fn test_second_prize_fails_when_pool_is_exhausted() {
        let state = AppState::new();
        let list = state
            .add_list("Corta".to_string(), lines(&["Ana", "Luis", "Carmen"]))
            .await
            .unwrap();

        let p1 = state
            .add_prize("Primero".to_string(), 2, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();
        let p2 = state
            .add_prize("Segundo".to_string(), 2, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();

        state.draw(&p1.id).await.unwrap();

        let err = state.draw(&p2.id).await.unwrap_err();
        assert_eq!(
            err,
            DrawError::InsufficientParticipants {
                needed: 2,
                available: 1
            }
        );

        // The failed draw left everything untouched.
        assert_eq!(state.winner_history().await.len(), 2);
        let p2_after = state.get_prize(&p2.id).await.unwrap();
        assert!(!p2_after.awarded);
    }

    // awarded == true exactly when `quantity` records for the prize exist.
    #[tokio::test]
    async fn test_awarded_flag_matches_ledger_contents() {
        let state = AppState::new();
        state
            .add_list(
                "Todos".to_string(),
                lines(&["Ana", "Luis", "Carmen", "Diego", "Elena"]),
            )
            .await
            .unwrap();

        let p1 = state
            .add_prize("Tres".to_string(), 3, PrizeScope::AllLists)
            .await
            .unwrap();
        let p2 = state
            .add_prize("Uno".to_string(), 1, PrizeScope::AllLists)
            .await
            .unwrap();

        state.draw(&p1.id).await.unwrap();

        let history = state.winner_history().await;
        for prize in state.get_prizes().await {
            let count = history.iter().filter(|w| w.prize_id == prize.id).count();
            if prize.awarded {
                assert_eq!(count, prize.quantity as usize);
            } else {
                assert_eq!(count, 0);
            }
        }

        state.draw(&p2.id).await.unwrap();
        let history = state.winner_history().await;
        let p2_count = history.iter().filter(|w| w.prize_id == p2.id).count();
        assert_eq!(p2_count, 1);
    }

    #[test]
    #[serial]
    fn test_config_defaults_when_env_unset() {
        std::env::remove_var("SORTEO_PORT");
        std::env::remove_var("SORTEO_REVEAL_SECONDS");

        let config = RaffleConfig::from_env();
        assert_eq!(config.port, 8379);
        assert_eq!(config.reveal_seconds, 3);
    }

    #[test]
    #[serial]
    fn test_config_reads_env_overrides() {
        std::env::set_var("SORTEO_PORT", "9000");
        std::env::set_var("SORTEO_REVEAL_SECONDS", "0");

        let config = RaffleConfig::from_env();
        assert_eq!(config.port, 9000);
        assert_eq!(config.reveal_seconds, 0);

        std::env::remove_var("SORTEO_PORT");
        std::env::remove_var("SORTEO_REVEAL_SECONDS");
    }
}
