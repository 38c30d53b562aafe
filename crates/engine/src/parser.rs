use common::models::{Side, Signal};

use crate::error::EngineError;

const QUOTE_SUFFIX: &str = "USDT";

/// Tokens shaped like list ordinals ("1.", "2)") that may prefix the entry
/// prices; at most this many are discarded, and only when they are bare
/// integers of at most two digits.
const MAX_LABEL_TOKENS: usize = 2;
const MAX_LABEL_DIGITS: usize = 2;

/// Turns raw channel text into a structured trade intent.
///
/// Fails when the direction keyword is absent, when fewer than four numeric
/// values survive filtering, or when an entry price cannot be read even
/// after the single-character recovery.
pub fn parse_signal(raw: &str) -> Result<Signal, EngineError> {
    let mut text = raw.to_uppercase();

    // A decimal point appearing fewer than three times across the whole
    // message is a thousands separator, not a decimal point.
    if text.matches('.').count() < 3 {
        text = text.replace('.', "");
    }

    let side = match (text.find("LONG"), text.find("SHORT")) {
        (Some(long), Some(short)) => {
            if long < short {
                Side::Buy
            } else {
                Side::Sell
            }
        }
        (Some(_), None) => Side::Buy,
        (None, Some(_)) => Side::Sell,
        (None, None) => {
            return Err(EngineError::UnparsableSignal(
                "no LONG/SHORT direction keyword".into(),
            ));
        }
    };

    let keyword = match side {
        Side::Buy => "LONG",
        Side::Sell => "SHORT",
    };
    let text = text.replacen(keyword, "", 1);

    let symbol = extract_symbol(&text);

    let normalized: String = text
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '\n' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '\n')
        .collect();

    let mut tokens: Vec<&str> = normalized.lines().filter(|l| !l.is_empty()).collect();

    let mut discarded = 0;
    while discarded < MAX_LABEL_TOKENS
        && tokens.first().is_some_and(|t| {
            t.len() <= MAX_LABEL_DIGITS && t.chars().all(|c| c.is_ascii_digit())
        })
    {
        tokens.remove(0);
        discarded += 1;
    }

    if tokens.len() < 4 {
        return Err(EngineError::UnparsableSignal(format!(
            "expected at least 4 numeric values, found {}",
            tokens.len()
        )));
    }

    let first = parse_entry_token(tokens[0])?;
    let second: f64 = tokens[1].parse().map_err(|_| invalid_number(tokens[1]))?;

    // The band ordering is meaningful downstream: ascending for a long,
    // descending for a short.
    let entry_range = match side {
        Side::Buy => (first.min(second), first.max(second)),
        Side::Sell => (first.max(second), first.min(second)),
    };

    let numbers = tokens[2..]
        .iter()
        .map(|t| t.parse::<f64>().map_err(|_| invalid_number(t)))
        .collect::<Result<Vec<f64>, EngineError>>()?;

    let count = numbers.len();
    Ok(Signal {
        symbol,
        side,
        entry_range,
        targets: numbers[..count - 2].to_vec(),
        activation_price: numbers[0],
        take_profit: numbers[count - 2],
        stop_loss: numbers[count - 1],
    })
}

/// The coin name is whatever letters lead the message (after the direction
/// keyword is removed) up to the first `/`, space, or `U`; the quote suffix
/// is fixed.
fn extract_symbol(text: &str) -> String {
    let mut letters = String::new();
    for c in text.trim_start().chars() {
        if c == '/' || c == ' ' || c == 'U' {
            break;
        }
        if c.is_ascii_alphabetic() {
            letters.push(c);
        }
    }
    letters.push_str(QUOTE_SUFFIX);
    letters
}

/// One stray leading glyph on the first entry price is tolerated: strip it
/// and retry exactly once. Anything still unreadable is a parse failure.
fn parse_entry_token(token: &str) -> Result<f64, EngineError> {
    match token.parse::<f64>() {
        Ok(value) => Ok(value),
        Err(_) => {
            let mut chars = token.chars();
            chars.next();
            chars
                .as_str()
                .parse()
                .map_err(|_| invalid_number(token))
        }
    }
}

fn invalid_number(token: &str) -> EngineError {
    EngineError::UnparsableSignal(format!("invalid numeric value {token:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_signal_end_to_end() {
        let signal = parse_signal("LONG BTC/USDT 100 105 110 121 133 90").unwrap();
        assert_eq!(signal.symbol, "BTCUSDT");
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.opposite_side(), Side::Sell);
        assert_eq!(signal.entry_range, (100.0, 105.0));
        assert_eq!(signal.targets, vec![110.0, 121.0]);
        assert_eq!(signal.take_profit, 133.0);
        assert_eq!(signal.stop_loss, 90.0);
        assert_eq!(signal.activation_price, 110.0);
    }

    #[test]
    fn numbers_partition_without_overlap_or_loss() {
        let signal = parse_signal("LONG BTC/USDT 100 105 110 121 90").unwrap();
        assert_eq!(signal.entry_range, (100.0, 105.0));
        assert_eq!(signal.targets, vec![110.0]);
        assert_eq!(signal.take_profit, 121.0);
        assert_eq!(signal.stop_loss, 90.0);
        assert_eq!(signal.activation_price, 110.0);
    }

    #[test]
    fn short_signal_sorts_band_descending() {
        let signal = parse_signal("ETH/USDT SHORT 1950 2000 1900 1850 2100").unwrap();
        assert_eq!(signal.symbol, "ETHUSDT");
        assert_eq!(signal.side, Side::Sell);
        assert_eq!(signal.entry_range, (2000.0, 1950.0));
        assert_eq!(signal.targets, vec![1900.0]);
        assert_eq!(signal.take_profit, 1850.0);
        assert_eq!(signal.stop_loss, 2100.0);
    }

    #[test]
    fn multiline_signal_with_prose() {
        let raw = "GALA/USDT\nlong\nEntry: 0.025 - 0.027\nTargets: 0.030, 0.035, 0.040\nSL: 0.020";
        let signal = parse_signal(raw).unwrap();
        assert_eq!(signal.symbol, "GALAUSDT");
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.entry_range, (0.025, 0.027));
        assert_eq!(signal.targets, vec![0.030, 0.035]);
        assert_eq!(signal.take_profit, 0.040);
        assert_eq!(signal.stop_loss, 0.020);
        assert_eq!(signal.activation_price, 0.030);
    }

    #[test]
    fn ordinal_labels_are_discarded_but_prices_are_not() {
        let signal = parse_signal("BTC/USDT LONG 1 2 42000 41500 43000 44000 41000").unwrap();
        assert_eq!(signal.entry_range, (41500.0, 42000.0));
        assert_eq!(signal.targets, vec![43000.0]);
        assert_eq!(signal.take_profit, 44000.0);
        assert_eq!(signal.stop_loss, 41000.0);
    }

    #[test]
    fn sparse_dots_are_stripped_as_thousand_separators() {
        let signal = parse_signal("BTC/USDT LONG 42.500 43.000 44000 45000 41000").unwrap();
        assert_eq!(signal.entry_range, (42500.0, 43000.0));
    }

    #[test]
    fn stray_leading_glyph_on_first_entry_recovers_once() {
        let signal = parse_signal("BTC/USDT LONG ..5 2.5 3.5 4.5 1.5").unwrap();
        assert_eq!(signal.entry_range, (0.5, 2.5));
        assert_eq!(signal.targets, vec![3.5]);
    }

    #[test]
    fn missing_direction_is_a_parse_failure() {
        let err = parse_signal("BTC/USDT 100 105 110 121 90").unwrap_err();
        assert!(matches!(err, EngineError::UnparsableSignal(_)));
    }

    #[test]
    fn too_few_numbers_is_a_parse_failure() {
        let err = parse_signal("BTC/USDT LONG 100 105 90").unwrap_err();
        assert!(matches!(err, EngineError::UnparsableSignal(_)));
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = "SOL/USDT SHORT 150 145 140 135 160";
        assert_eq!(parse_signal(raw).unwrap(), parse_signal(raw).unwrap());
    }
}
