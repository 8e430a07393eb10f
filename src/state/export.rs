//! Winner-history rows for the export boundary.
//!
//! The presentation layer turns these rows into downloadable files; the CSV
//! rendering lives here because its column set is part of the contract
//! (`Nombre,Premio,Lista,Fecha`), while PDF layout stays client-side.

use super::AppState;
use serde::Serialize;

/// One exportable row of the winner history, with prize and owning-list
/// names already resolved.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub participant: String,
    pub prize: String,
    pub list: String,
    pub drawn_at: String,
}

pub const CSV_HEADER: &str = "Nombre,Premio,Lista,Fecha";

impl AppState {
    /// Resolve the full winner history for export. Prize and owning-list
    /// names are looked up at call time; a record whose prize or list has
    /// since been removed falls back to a placeholder instead of failing.
    pub async fn history_rows(&self) -> Vec<HistoryRow> {
        let lists = self.lists.read().await;
        let prizes = self.prizes.read().await;
        let winners = self.winners.read().await;

        winners
            .iter()
            .map(|w| {
                let prize = prizes
                    .iter()
                    .find(|p| p.id == w.prize_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Premio Misterioso".to_string());
                let list = lists
                    .iter()
                    .find(|l| l.participants.iter().any(|p| p.id == w.participant.id))
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "—".to_string());

                HistoryRow {
                    participant: w.participant.name.clone(),
                    prize,
                    list,
                    drawn_at: w.drawn_at.clone(),
                }
            })
            .collect()
    }
}

/// Render rows as the CSV the operator downloads. Fields are double-quoted;
/// embedded quotes are doubled.
pub fn render_csv(rows: &[HistoryRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            csv_field(&row.participant),
            csv_field(&row.prize),
            csv_field(&row.list),
            csv_field(&row.drawn_at),
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    value.replace('"', "\"\"")
}
