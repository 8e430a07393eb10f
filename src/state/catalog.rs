use super::AppState;
use crate::types::*;

impl AppState {
    /// Register a prize. It starts undrawn; only a committed draw flips it.
    pub async fn add_prize(
        &self,
        name: String,
        quantity: u32,
        scope: PrizeScope,
    ) -> Result<Prize, String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("Prize name cannot be empty".to_string());
        }
        if quantity == 0 {
            return Err("Prize quantity must be at least 1".to_string());
        }

        let prize = Prize {
            id: ulid::Ulid::new().to_string(),
            name,
            quantity,
            scope,
            awarded: false,
        };

        self.prizes.write().await.push(prize.clone());
        Ok(prize)
    }

    /// Remove a prize from the catalog. Winner records that already reference
    /// it stay in the ledger untouched.
    pub async fn remove_prize(&self, prize_id: &str) -> Result<(), String> {
        let mut prizes = self.prizes.write().await;
        let before = prizes.len();
        prizes.retain(|p| p.id != prize_id);
        if prizes.len() == before {
            Err("Prize not found".to_string())
        } else {
            Ok(())
        }
    }

    pub async fn get_prizes(&self) -> Vec<Prize> {
        self.prizes.read().await.clone()
    }

    pub async fn get_prize(&self, prize_id: &str) -> Option<Prize> {
        self.prizes
            .read()
            .await
            .iter()
            .find(|p| p.id == prize_id)
            .cloned()
    }
}
