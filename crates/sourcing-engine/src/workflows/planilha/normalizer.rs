use std::str::FromStr;

use rust_decimal::Decimal;

use crate::workflows::sourcing::domain::fold_label;

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    fold_label(&collapsed)
}

/// Parses `145000`, `145000.00`, `145.000,00` and `R$ 145.000,00`. Negative amounts are rejected.
pub(crate) fn parse_money(value: &str) -> Option<Decimal> {
    let stripped: String = value
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let canonical = if stripped.contains(',') {
        stripped.replace('.', "").replace(',', ".")
    } else if is_grouped_thousands(&stripped) {
        stripped.replace('.', "")
    } else {
        stripped
    };

    Decimal::from_str(&canonical)
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

// `1.500` or `1.250.000`: every dot is followed by exactly three digits
fn is_grouped_thousands(value: &str) -> bool {
    let mut groups = value.split('.');
    let head = groups.next().unwrap_or_default();
    let tail: Vec<&str> = groups.collect();
    !tail.is_empty()
        && !head.is_empty()
        && head.len() <= 3
        && head.chars().all(|c| c.is_ascii_digit())
        && tail
            .iter()
            .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()))
}

/// Parses `8.5` and `8,5`; blank cells are `None` and unparseable ones `Some(Err)`.
pub(crate) fn parse_score(value: &str) -> Option<Result<f64, ()>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
            .ok_or(()),
    )
}
