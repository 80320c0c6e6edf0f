use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::evaluator::Cell;

/// One competitor's totalled, ranked line before display assembly.
#[derive(Debug, Clone)]
pub(crate) struct RankedRow {
    pub competitor_id: Uuid,
    pub total: Decimal,
    pub rank: u32,
    pub cells: Vec<Cell>,
}

/// Totals non-discarded points (lower is better) and assigns dense
/// 1-based ranks. Ties break by countback (the full sorted sequence of
/// a competitor's race points, discards included, compared
/// lexicographically) and finally by competitor creation order, which
/// keeps the output deterministic without awarding a better rank.
pub(crate) fn rank_competitors(
    by_competitor: HashMap<Uuid, Vec<Cell>>,
    creation_order: &HashMap<Uuid, (NaiveDateTime, Uuid)>,
) -> Vec<RankedRow> {
    let mut rows: Vec<(Decimal, Vec<Decimal>, Uuid, Vec<Cell>)> = by_competitor
        .into_iter()
        .map(|(competitor_id, cells)| {
            let total: Decimal = cells
                .iter()
                .filter(|c| !c.discarded)
                .map(|c| c.points)
                .sum();
            let mut countback: Vec<Decimal> = cells.iter().map(|c| c.points).collect();
            countback.sort();
            (total, countback, competitor_id, cells)
        })
        .collect();

    let fallback = (NaiveDateTime::MAX, Uuid::max());
    rows.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| {
                let ca = creation_order.get(&a.2).unwrap_or(&fallback);
                let cb = creation_order.get(&b.2).unwrap_or(&fallback);
                ca.cmp(cb)
            })
    });

    let mut ranked = Vec::with_capacity(rows.len());
    let mut rank = 0u32;
    let mut prev_key: Option<(Decimal, Vec<Decimal>)> = None;
    for (total, countback, competitor_id, cells) in rows {
        let key = (total, countback);
        if prev_key.as_ref() != Some(&key) {
            rank += 1;
        }
        prev_key = Some(key);
        ranked.push(RankedRow {
            competitor_id,
            total,
            rank,
            cells,
        });
    }
    ranked
}
