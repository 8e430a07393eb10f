use super::AppState;
use crate::types::*;
use std::collections::HashSet;

/// Participants a prize may currently draw from: everyone in scope minus
/// anyone already present in the ledger, no matter which prize they won.
///
/// Scope "all" concatenates the lists in registration order, each in upload
/// order. A scope pointing at a list that no longer exists resolves to an
/// empty pool rather than an error, so a prize whose target list was deleted
/// becomes undrawable instead of crashing the session.
///
/// Pure function of the arguments. Callers must re-resolve before every draw;
/// the result goes stale the moment the ledger grows.
pub fn eligible_pool(
    scope: &PrizeScope,
    lists: &[ParticipantList],
    winners: &[WinnerRecord],
) -> Vec<Participant> {
    let won: HashSet<&str> = winners.iter().map(|w| w.participant.id.as_str()).collect();

    let in_scope: Vec<&Participant> = match scope {
        PrizeScope::AllLists => lists.iter().flat_map(|l| l.participants.iter()).collect(),
        PrizeScope::List(id) => lists
            .iter()
            .find(|l| l.id == *id)
            .map(|l| l.participants.iter().collect())
            .unwrap_or_default(),
    };

    in_scope
        .into_iter()
        .filter(|p| !won.contains(p.id.as_str()))
        .cloned()
        .collect()
}

impl AppState {
    /// Current number of drawable participants for a scope.
    pub async fn eligible_count(&self, scope: &PrizeScope) -> usize {
        let lists = self.lists.read().await;
        let winners = self.winners.read().await;
        eligible_pool(scope, &lists, &winners).len()
    }
}
