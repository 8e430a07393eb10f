use super::eligibility::eligible_pool;
use super::AppState;
use crate::messages;
use crate::types::*;
use rand::seq::SliceRandom;

/// Ways a draw request can be rejected. Every variant leaves all state
/// untouched and the operator can retry after addressing the cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("prize was already drawn")]
    AlreadyAwarded,

    #[error("not enough eligible participants: need {needed}, only {available} available")]
    InsufficientParticipants { needed: u32, available: usize },

    #[error("another draw has not finished committing yet")]
    DrawInProgress,

    #[error("prize not found")]
    PrizeNotFound,
}

/// A committed batch draw: the prize (now awarded) and its freshly minted
/// winner records, in selection order.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub prize: Prize,
    pub winners: Vec<WinnerRecord>,
}

impl AppState {
    /// Run the batch draw for one prize.
    ///
    /// Preconditions are checked in order: the prize must exist, must not be
    /// awarded yet, and its freshly resolved pool must cover the required
    /// quantity. Selection takes the first `quantity` slots of an unbiased
    /// partial Fisher-Yates shuffle. The ledger appends and the awarded flip
    /// happen while both write locks are held, so no observer ever sees one
    /// without the other. Callers display the returned batch directly instead
    /// of re-deriving it from the ledger.
    pub async fn draw(&self, prize_id: &str) -> Result<DrawOutcome, DrawError> {
        // One draw at a time: a request arriving while another commit is in
        // flight fails fast instead of reading a stale pool.
        let _gate = self
            .draw_gate
            .try_lock()
            .map_err(|_| DrawError::DrawInProgress)?;

        // Lock order: lists, prizes, winners.
        let lists = self.lists.read().await;
        let mut prizes = self.prizes.write().await;
        let mut winners = self.winners.write().await;

        let prize = prizes
            .iter_mut()
            .find(|p| p.id == prize_id)
            .ok_or(DrawError::PrizeNotFound)?;

        if prize.awarded {
            return Err(DrawError::AlreadyAwarded);
        }

        let mut pool = eligible_pool(&prize.scope, &lists, &winners);
        if pool.len() < prize.quantity as usize {
            return Err(DrawError::InsufficientParticipants {
                needed: prize.quantity,
                available: pool.len(),
            });
        }

        let mut rng = rand::rng();
        let (selected, _) = pool.partial_shuffle(&mut rng, prize.quantity as usize);

        let drawn_at = chrono::Utc::now().to_rfc3339();
        let batch: Vec<WinnerRecord> = selected
            .iter()
            .map(|p| WinnerRecord {
                participant: p.clone(),
                prize_id: prize.id.clone(),
                drawn_at: drawn_at.clone(),
                message: messages::compose(&p.name, &prize.name),
            })
            .collect();

        winners.extend(batch.iter().cloned());
        prize.awarded = true;

        tracing::info!(
            "Drew {} winner(s) for prize '{}'",
            batch.len(),
            prize.name
        );

        Ok(DrawOutcome {
            prize: prize.clone(),
            winners: batch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_draw_commits_full_batch() {
        let state = AppState::new();
        let list = state
            .add_list("Ventas".to_string(), lines(&["Ana", "Luis", "Carmen", "Diego"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Cesta".to_string(), 3, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();

        let outcome = state.draw(&prize.id).await.unwrap();

        assert!(outcome.prize.awarded);
        assert_eq!(outcome.winners.len(), 3);

        // One shared commit timestamp and a composed message per record.
        let stamp = &outcome.winners[0].drawn_at;
        for w in &outcome.winners {
            assert_eq!(&w.drawn_at, stamp);
            assert_eq!(w.prize_id, prize.id);
            assert!(w.message.contains(&w.participant.name));
        }

        // No duplicates within the batch.
        let mut ids: Vec<_> = outcome
            .winners
            .iter()
            .map(|w| w.participant.id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);

        assert_eq!(state.winner_history().await.len(), 3);
    }

    #[tokio::test]
    async fn test_redraw_fails_without_mutation() {
        let state = AppState::new();
        state
            .add_list("Ventas".to_string(), lines(&["Ana", "Luis"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Cesta".to_string(), 1, PrizeScope::AllLists)
            .await
            .unwrap();

        state.draw(&prize.id).await.unwrap();
        let history_before = state.winner_history().await;

        let err = state.draw(&prize.id).await.unwrap_err();
        assert_eq!(err, DrawError::AlreadyAwarded);
        assert_eq!(state.winner_history().await, history_before);
    }

    #[tokio::test]
    async fn test_insufficient_pool_reports_both_counts() {
        let state = AppState::new();
        let list = state
            .add_list("Sistemas".to_string(), lines(&["Diego", "Elena"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Gordo".to_string(), 5, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();

        let err = state.draw(&prize.id).await.unwrap_err();
        assert_eq!(
            err,
            DrawError::InsufficientParticipants {
                needed: 5,
                available: 2
            }
        );

        assert!(state.winner_history().await.is_empty());
        assert!(!state.get_prize(&prize.id).await.unwrap().awarded);
    }

    #[tokio::test]
    async fn test_vanished_scope_list_reports_zero_available() {
        let state = AppState::new();
        let list = state
            .add_list("Temporal".to_string(), lines(&["Ana", "Luis"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Cesta".to_string(), 1, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();

        state.remove_list(&list.id).await.unwrap();

        let err = state.draw(&prize.id).await.unwrap_err();
        assert_eq!(
            err,
            DrawError::InsufficientParticipants {
                needed: 1,
                available: 0
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_prize() {
        let state = AppState::new();
        let err = state.draw("no-such-prize").await.unwrap_err();
        assert_eq!(err, DrawError::PrizeNotFound);
    }

    #[tokio::test]
    async fn test_draw_fails_fast_while_another_commit_holds_the_gate() {
        let state = AppState::new();
        state
            .add_list("Ventas".to_string(), lines(&["Ana", "Luis"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Cesta".to_string(), 1, PrizeScope::AllLists)
            .await
            .unwrap();

        let gate = state.draw_gate.lock().await;
        let err = state.draw(&prize.id).await.unwrap_err();
        assert_eq!(err, DrawError::DrawInProgress);
        assert!(state.winner_history().await.is_empty());
        drop(gate);

        // Once the gate is free the same request goes through.
        assert!(state.draw(&prize.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_quantity_equal_to_pool_drains_the_list() {
        let state = AppState::new();
        let list = state
            .add_list("Corta".to_string(), lines(&["Ana", "Luis"]))
            .await
            .unwrap();
        let prize = state
            .add_prize("Doble".to_string(), 2, PrizeScope::List(list.id.clone()))
            .await
            .unwrap();

        let outcome = state.draw(&prize.id).await.unwrap();
        assert_eq!(outcome.winners.len(), 2);
        assert_eq!(state.eligible_count(&PrizeScope::List(list.id)).await, 0);
    }
}
