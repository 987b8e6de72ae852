//! Leaderboard ranking and identity masking.

use std::collections::HashSet;

use serde::Serialize;

use crate::affiliates::Affiliate;
use crate::amount::parse_amount;

/// One affiliate placed on the leaderboard. Ranks are dense and 1-based by
/// sorted position: equal amounts get consecutive distinct ranks, ties
/// keeping their original input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub affiliate: Affiliate,
    pub wagered: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LeaderboardTotals {
    pub participants: usize,
    pub total_wagered: f64,
}

/// Ranks affiliate records for one period: duplicates by identity are
/// dropped (first occurrence wins), amounts are parsed leniently, and the
/// result is sorted by wagered amount descending with a stable tie order.
pub fn rank_affiliates(rows: &[Affiliate]) -> Vec<RankedEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut entries: Vec<RankedEntry> = Vec::with_capacity(rows.len());

    for affiliate in rows {
        if let Some(identity) = affiliate.identity() {
            if !seen.insert(identity.to_string()) {
                continue;
            }
        }
        entries.push(RankedEntry {
            wagered: parse_amount(affiliate.wagered_amount.as_deref()),
            affiliate: affiliate.clone(),
            rank: 0,
        });
    }

    entries.sort_by(|a, b| b.wagered.total_cmp(&a.wagered));
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }

    entries
}

/// Aggregates over the full ranked list.
pub fn totals(entries: &[RankedEntry]) -> LeaderboardTotals {
    LeaderboardTotals {
        participants: entries.len(),
        total_wagered: entries.iter().map(|entry| entry.wagered).sum(),
    }
}

/// First `n` entries of the ranked list; all of them when fewer exist.
pub fn top_n(entries: &[RankedEntry], n: usize) -> &[RankedEntry] {
    &entries[..entries.len().min(n)]
}

/// Partially obfuscates an identity for public display. Short names (up to
/// four characters) pass through; longer ones keep the first two characters
/// and the last one. Empty input displays as a placeholder dash.
pub fn mask_identity(identity: &str) -> String {
    if identity.is_empty() {
        return "—".to_string();
    }
    let chars: Vec<char> = identity.chars().collect();
    if chars.len() <= 4 {
        return identity.to_string();
    }

    let mut masked = String::with_capacity(chars.len() + 2);
    masked.extend(&chars[..2]);
    masked.extend(std::iter::repeat('*').take(chars.len() - 3));
    masked.push(chars[chars.len() - 1]);
    masked
}

/// Masked display name for an affiliate, preferring username over id.
pub fn display_identity(affiliate: &Affiliate) -> String {
    match affiliate.identity() {
        Some(identity) => mask_identity(identity),
        None => "—".to_string(),
    }
}
