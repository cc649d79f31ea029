// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Display formatting for money and percentages.
//!
//! Output uses a fixed en-US / USD style. Undefined ratios render as [`NOT_AVAILABLE`].

use rust_decimal::{Decimal, RoundingStrategy};

pub const NOT_AVAILABLE: &str = "N/A";

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(int_digits: &str) -> String {
    let len = int_digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$1,234.50`, `-$1,234.50`. Values that round to zero carry no sign.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round2(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = abs.split_once('.').unwrap_or((abs.as_str(), "00"));
    format!(
        "{}${}.{}",
        if negative { "-" } else { "" },
        group_thousands(int_part),
        frac_part
    )
}

/// Formats a value already scaled to percent points (`12.5` -> `12.50%`).
pub fn format_percent_value(pct: Option<Decimal>) -> String {
    match pct {
        Some(p) => {
            let rounded = round2(p);
            let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
            format!("{:.2}%", rounded)
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Formats a ratio as a percentage (`0.1234` -> `12.34%`).
pub fn format_percentage(ratio: Option<Decimal>) -> String {
    format_percent_value(ratio.and_then(|r| r.checked_mul(HUNDRED)))
}

/// Signed variant used for gain/loss columns: `+$12.00` / `-$3.10`.
pub fn format_signed_currency(amount: Decimal) -> String {
    let s = format_currency(amount);
    if round2(amount) > Decimal::ZERO {
        format!("+{}", s)
    } else {
        s
    }
}
