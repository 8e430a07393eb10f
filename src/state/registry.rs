use super::AppState;
use crate::types::*;

impl AppState {
    /// Ingest one uploaded list. Each non-empty raw line becomes a
    /// participant: the line is trimmed and commas are flattened to spaces.
    /// Participant ids are ULIDs, unique across the whole registry, which is
    /// what lets the ledger key exclusion by id regardless of list.
    pub async fn add_list(
        &self,
        name: String,
        raw_lines: Vec<String>,
    ) -> Result<ParticipantList, String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("List name cannot be empty".to_string());
        }

        let participants: Vec<Participant> = raw_lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Participant {
                id: ulid::Ulid::new().to_string(),
                name: line.replace(',', " ").trim().to_string(),
            })
            .collect();

        let list = ParticipantList {
            id: ulid::Ulid::new().to_string(),
            name,
            participants,
        };

        self.lists.write().await.push(list.clone());
        tracing::info!(
            "Loaded list '{}' with {} participants",
            list.name,
            list.participants.len()
        );
        Ok(list)
    }

    /// Remove a list. Prizes still scoped to it simply stop resolving any
    /// eligible participants; they are not touched here.
    pub async fn remove_list(&self, list_id: &str) -> Result<(), String> {
        let mut lists = self.lists.write().await;
        let before = lists.len();
        lists.retain(|l| l.id != list_id);
        if lists.len() == before {
            Err("List not found".to_string())
        } else {
            Ok(())
        }
    }

    pub async fn get_lists(&self) -> Vec<ParticipantList> {
        self.lists.read().await.clone()
    }

    pub async fn get_list(&self, list_id: &str) -> Option<ParticipantList> {
        self.lists
            .read()
            .await
            .iter()
            .find(|l| l.id == list_id)
            .cloned()
    }

    /// Owning list of a participant, resolved by scanning all lists. Derived
    /// data: recomputed on every call, never cached.
    pub async fn list_name_for(&self, participant_id: &str) -> Option<String> {
        self.lists
            .read()
            .await
            .iter()
            .find(|l| l.participants.iter().any(|p| p.id == participant_id))
            .map(|l| l.name.clone())
    }
}
