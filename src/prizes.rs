//! Prize schedule parsing.
//!
//! The prize table arrives as one opaque configuration string in one of
//! three encodings, tried in this order:
//! - JSON array of numbers: `[400,200,125]` (rank = 1-based position)
//! - JSON array of objects: `[{"rank":1,"amount":400}, ...]`
//! - CSV fallback: `400,200,125`
//!
//! A string that parses as a JSON array but matches neither array shape
//! yields an empty table and never falls through to CSV. Only a JSON parse
//! failure (or a non-array JSON value, such as a bare number) reaches the
//! CSV path.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::amount::js_number;

/// Rank (1-based) to prize amount. Absent rank means no prize.
pub type PrizeTable = BTreeMap<u32, f64>;

/// Parses a prize schedule from raw configuration text. Never fails;
/// malformed entries are silently dropped.
pub fn parse_prize_table(raw: Option<&str>) -> PrizeTable {
    let trimmed = match raw {
        Some(raw) => raw.trim(),
        None => return PrizeTable::new(),
    };
    if trimmed.is_empty() {
        return PrizeTable::new();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Value::Array(items) = value {
            return table_from_json_array(&items);
        }
        // Bare JSON scalars such as `100` still read naturally as CSV.
    }

    table_from_csv(trimmed)
}

/// Sum of all prizes in the table.
pub fn total_prize_pool(table: &PrizeTable) -> f64 {
    table.values().sum()
}

fn table_from_json_array(items: &[Value]) -> PrizeTable {
    let mut table = PrizeTable::new();
    let Some(first) = items.first() else {
        return table;
    };

    match first {
        Value::Number(_) => {
            // Positional ranks come from the original element index, so a
            // dropped element never shifts the ranks after it.
            for (idx, item) in items.iter().enumerate() {
                if let Some(amount) = json_finite_number(item) {
                    table.insert(idx as u32 + 1, amount);
                }
            }
        }
        Value::Object(_) => {
            for item in items {
                let Some(rank) = item.get("rank").and_then(json_finite_number) else {
                    continue;
                };
                let Some(amount) = item.get("amount").and_then(json_finite_number) else {
                    continue;
                };
                if rank < 1.0 || rank.fract() != 0.0 || rank > u32::MAX as f64 {
                    continue;
                }
                // Duplicate ranks: last write wins.
                table.insert(rank as u32, amount);
            }
        }
        _ => {}
    }

    table
}

fn table_from_csv(text: &str) -> PrizeTable {
    text.split(',')
        .filter_map(js_number)
        .enumerate()
        .map(|(idx, amount)| (idx as u32 + 1, amount))
        .collect()
}

fn json_finite_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => js_number(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(u32, f64)]) -> PrizeTable {
        pairs.iter().copied().collect()
    }

    #[test]
    fn csv_assigns_positional_ranks() {
        assert_eq!(
            parse_prize_table(Some("100,60,40")),
            table(&[(1, 100.0), (2, 60.0), (3, 40.0)])
        );
        assert_eq!(
            parse_prize_table(Some(" 400 , 200 , 125 ")),
            table(&[(1, 400.0), (2, 200.0), (3, 125.0)])
        );
    }

    #[test]
    fn csv_drops_bad_tokens_and_compacts_ranks() {
        // The CSV path filters before ranking, so later prizes move up.
        assert_eq!(
            parse_prize_table(Some("100,abc,40")),
            table(&[(1, 100.0), (2, 40.0)])
        );
    }

    #[test]
    fn csv_empty_token_counts_as_zero() {
        assert_eq!(
            parse_prize_table(Some("100,,40")),
            table(&[(1, 100.0), (2, 0.0), (3, 40.0)])
        );
    }

    #[test]
    fn json_number_array_keeps_original_indices() {
        assert_eq!(
            parse_prize_table(Some("[10,20]")),
            table(&[(1, 10.0), (2, 20.0)])
        );
        // A bad element is dropped without shifting the ranks after it.
        assert_eq!(
            parse_prize_table(Some("[10,\"x\",30]")),
            table(&[(1, 10.0), (3, 30.0)])
        );
    }

    #[test]
    fn json_object_array_filters_sorts_and_overwrites() {
        assert_eq!(
            parse_prize_table(Some(r#"[{"rank":2,"amount":50}]"#)),
            table(&[(2, 50.0)])
        );
        assert_eq!(
            parse_prize_table(Some(
                r#"[{"rank":3,"amount":25},{"rank":1,"amount":100},{"rank":1,"amount":90}]"#
            )),
            table(&[(1, 90.0), (3, 25.0)])
        );
        assert_eq!(
            parse_prize_table(Some(
                r#"[{"rank":0,"amount":5},{"rank":-1,"amount":5},{"amount":5},{"rank":2}]"#
            )),
            PrizeTable::new()
        );
    }

    #[test]
    fn json_object_array_accepts_numeric_strings() {
        assert_eq!(
            parse_prize_table(Some(r#"[{"rank":"2","amount":"50"}]"#)),
            table(&[(2, 50.0)])
        );
    }

    #[test]
    fn empty_inputs_yield_empty_tables() {
        assert_eq!(parse_prize_table(None), PrizeTable::new());
        assert_eq!(parse_prize_table(Some("")), PrizeTable::new());
        assert_eq!(parse_prize_table(Some("   ")), PrizeTable::new());
    }

    #[test]
    fn unexpected_json_arrays_do_not_fall_back_to_csv() {
        assert_eq!(parse_prize_table(Some("[]")), PrizeTable::new());
        assert_eq!(
            parse_prize_table(Some(r#"["100","60"]"#)),
            PrizeTable::new()
        );
        assert_eq!(parse_prize_table(Some("[[100]]")), PrizeTable::new());
    }

    #[test]
    fn malformed_json_that_looks_like_an_array_falls_back_to_csv() {
        // Unbalanced bracket fails JSON parsing; the CSV path then drops the
        // non-numeric first token.
        assert_eq!(parse_prize_table(Some("[100,60")), table(&[(1, 60.0)]));
    }

    #[test]
    fn bare_json_number_reads_as_csv() {
        assert_eq!(parse_prize_table(Some("100")), table(&[(1, 100.0)]));
    }

    #[test]
    fn prize_pool_sums_all_ranks() {
        let parsed = parse_prize_table(Some("100,60,40"));
        assert_eq!(total_prize_pool(&parsed), 200.0);
        assert_eq!(total_prize_pool(&PrizeTable::new()), 0.0);
    }
}
