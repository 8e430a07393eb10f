use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque ID types for type safety
pub type ListId = String;
pub type ParticipantId = String;
pub type PrizeId = String;

/// One person on an uploaded list. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

/// A named list of participants, in upload order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantList {
    pub id: ListId,
    pub name: String,
    pub participants: Vec<Participant>,
}

/// Which participants a prize draws from: one specific list, or the union of
/// every loaded list.
///
/// On the wire this is a plain string: the literal `"all"` or a list id,
/// matching what setup clients send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrizeScope {
    AllLists,
    List(ListId),
}

impl Serialize for PrizeScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PrizeScope::AllLists => serializer.serialize_str("all"),
            PrizeScope::List(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for PrizeScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "all" {
            PrizeScope::AllLists
        } else {
            PrizeScope::List(raw)
        })
    }
}

/// A prize to be raffled. `awarded` flips to true exactly once, when a batch
/// draw for it commits; nothing flips it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prize {
    pub id: PrizeId,
    pub name: String,
    /// How many winners one draw of this prize produces.
    pub quantity: u32,
    pub scope: PrizeScope,
    pub awarded: bool,
}

/// One committed winner: appended to the ledger during a draw commit and
/// never mutated or removed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub participant: Participant,
    pub prize_id: PrizeId,
    /// Commit timestamp (ISO8601), shared by every record of one batch.
    pub drawn_at: String,
    /// Congratulation line composed at commit time.
    pub message: String,
}

/// Full session snapshot sent to newly connected clients and to the export
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaffleSnapshot {
    pub lists: Vec<ParticipantList>,
    pub prizes: Vec<Prize>,
    pub winners: Vec<WinnerRecord>,
    /// Drawable participants remaining across all lists.
    pub available: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Beamer,
    Audience,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prize_scope_wire_format() {
        let all = serde_json::to_string(&PrizeScope::AllLists).unwrap();
        assert_eq!(all, "\"all\"");

        let list = serde_json::to_string(&PrizeScope::List("01ABC".to_string())).unwrap();
        assert_eq!(list, "\"01ABC\"");

        let parsed: PrizeScope = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, PrizeScope::AllLists);

        let parsed: PrizeScope = serde_json::from_str("\"01ABC\"").unwrap();
        assert_eq!(parsed, PrizeScope::List("01ABC".to_string()));
    }
}
