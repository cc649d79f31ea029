// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Generates a closed string enum with `ALL`, `as_str`, `index`, `Display` and `FromStr`.
///
/// The enums double as fixed grouping keys, so `index` must stay exhaustive.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const COUNT: usize = $name::ALL.len();

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Position in `ALL`; variants are fieldless so the discriminant is the slot.
            pub fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!(
                            "Invalid {} '{}', expected one of: {}",
                            stringify!($name),
                            s,
                            allowed.join(", ")
                        )
                    })
            }
        }
    };
}

wire_enum!(BudgetCategory {
    Housing => "housing",
    Transportation => "transportation",
    Food => "food",
    Utilities => "utilities",
    Healthcare => "healthcare",
    Entertainment => "entertainment",
    Shopping => "shopping",
    Savings => "savings",
    Debt => "debt",
    Other => "other",
});

wire_enum!(BudgetPeriod {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

wire_enum!(AlertType {
    Threshold => "threshold",
    Overspent => "overspent",
    ApproachingLimit => "approaching_limit",
    RecurringDue => "recurring_due",
});

wire_enum!(AlertStatus {
    Active => "active",
    Dismissed => "dismissed",
    Resolved => "resolved",
});

wire_enum!(AssetType {
    Stock => "stock",
    Bond => "bond",
    Etf => "etf",
    MutualFund => "mutual_fund",
    Crypto => "crypto",
    RealEstate => "real_estate",
    Commodity => "commodity",
    Cash => "cash",
});

wire_enum!(TransactionType {
    Buy => "buy",
    Sell => "sell",
    Dividend => "dividend",
    Interest => "interest",
    Deposit => "deposit",
    Withdrawal => "withdrawal",
});

wire_enum!(PortfolioAlertType {
    PriceTarget => "price_target",
    PriceChange => "price_change",
    PortfolioChange => "portfolio_change",
});

/// Performance lookback accepted by `/performance?timeframe=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
}

impl Timeframe {
    pub const ALL: &'static [Timeframe] = &[
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::OneYear => "1Y",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let up = s.trim().to_uppercase();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == up)
            .ok_or_else(|| format!("Invalid timeframe '{}', expected 1M, 3M, 6M or 1Y", s))
    }
}

/// Reads a missing or `null` amount as zero.
fn null_as_zero<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    Ok(Option::<Decimal>::deserialize(d)?.unwrap_or_default())
}

/// Accepts `2024-03-05`, `2024-03-05T10:00:00[.fff]` and RFC 3339 timestamps.
pub mod flexible_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn serialize<S: Serializer>(v: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date-time '{}'", raw)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
            match v {
                Some(dt) => super::serialize(dt, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw = Option::<String>::deserialize(d)?;
            match raw {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => super::parse(&s).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid date-time '{}'", s))
                }),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    pub category: BudgetCategory,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    #[serde(with = "flexible_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(default, with = "flexible_datetime::option")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub spent: Option<Decimal>,
    #[serde(default)]
    pub remaining: Option<Decimal>,
    #[serde(with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(with = "flexible_datetime")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: i64,
    pub budget_id: i64,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub message: String,
    #[serde(default)]
    pub threshold_percentage: Option<Decimal>,
    #[serde(with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(with = "flexible_datetime")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExpense {
    pub id: i64,
    pub budget_id: i64,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "flexible_datetime::option")]
    pub date: Option<NaiveDateTime>,
    #[serde(with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget_id: i64,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub percentage_used: Decimal,
    pub period: BudgetPeriod,
    pub category: BudgetCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub total_spent: Decimal,
    pub budget_amount: Decimal,
}

pub type CategorySpendingReport = BTreeMap<BudgetCategory, CategorySpending>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub symbol: String,
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub average_price: Decimal,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    pub market_value: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_percentage: Decimal,
}

impl Holding {
    /// Price used for valuation: the last quote, falling back to cost.
    pub fn effective_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.average_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub symbol: String,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total_amount: Decimal,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub fees: Decimal,
    #[serde(with = "flexible_datetime")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub total_gain_loss: Decimal,
    pub gain_loss_percentage: Decimal,
    #[serde(default)]
    pub allocation: BTreeMap<AssetType, Decimal>,
    #[serde(default, with = "flexible_datetime::option")]
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    #[serde(with = "flexible_datetime")]
    pub date: NaiveDateTime,
    pub total_value: Decimal,
    #[serde(default)]
    pub daily_return: Option<Decimal>,
    #[serde(default)]
    pub total_return: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAlert {
    pub id: i64,
    pub portfolio_id: i64,
    #[serde(default)]
    pub holding_id: Option<i64>,
    pub alert_type: PortfolioAlertType,
    pub threshold: Decimal,
    pub message: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "flexible_datetime::option")]
    pub triggered_at: Option<NaiveDateTime>,
    #[serde(with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(with = "flexible_datetime")]
    pub updated_at: NaiveDateTime,
}

/// Acknowledgement body returned by delete/dismiss/update-prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// Request payloads

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetCreate {
    pub name: String,
    pub category: BudgetCategory,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    #[serde(with = "flexible_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(
        with = "flexible_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BudgetCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BudgetPeriod>,
    #[serde(
        with = "flexible_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDateTime>,
}

impl BudgetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.period.is_none()
            && self.end_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseCreate {
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        with = "flexible_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type PortfolioUpdate = PortfolioCreate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionCreate {
    pub transaction_type: TransactionType,
    pub symbol: String,
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fees: Decimal,
    #[serde(
        with = "flexible_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAlertCreate {
    pub holding_id: Option<i64>,
    pub alert_type: PortfolioAlertType,
    pub threshold: Decimal,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn budget_decodes_backend_payload_without_spent() {
        let b: Budget = serde_json::from_value(json!({
            "id": 3,
            "user_id": 1,
            "name": "Groceries",
            "category": "food",
            "amount": 400.5,
            "period": "monthly",
            "start_date": "2024-03-01T00:00:00",
            "end_date": null,
            "created_at": "2024-03-01T09:15:00.123456",
            "updated_at": "2024-03-02T09:15:00Z"
        }))
        .unwrap();
        assert_eq!(b.category, BudgetCategory::Food);
        assert_eq!(b.amount, Decimal::new(4005, 1));
        assert_eq!(b.spent, None);
        assert_eq!(b.end_date, None);
    }

    #[test]
    fn transaction_accepts_date_only_strings() {
        let t: Transaction = serde_json::from_value(json!({
            "id": 1,
            "symbol": "VTI",
            "transaction_type": "dividend",
            "quantity": 1,
            "price": 2.5,
            "total_amount": 2.5,
            "date": "2024-03-05"
        }))
        .unwrap();
        assert_eq!(
            t.date,
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(t.fees, Decimal::ZERO);
    }

    #[test]
    fn transaction_null_fees_read_as_zero() {
        let t: Transaction = serde_json::from_value(json!({
            "id": 2,
            "symbol": "AAPL",
            "transaction_type": "buy",
            "quantity": 3,
            "price": 150,
            "total_amount": 450,
            "fees": null,
            "date": "2024-03-05T10:00:00"
        }))
        .unwrap();
        assert_eq!(t.fees, Decimal::ZERO);
        assert_eq!(t.total_amount, Decimal::from(450));
    }

    #[test]
    fn alert_type_field_is_named_type_on_the_wire() {
        let a: BudgetAlert = serde_json::from_value(json!({
            "id": 7,
            "budget_id": 2,
            "type": "approaching_limit",
            "status": "active",
            "message": "82% used",
            "threshold_percentage": 82.0,
            "created_at": "2024-03-01T00:00:00",
            "updated_at": "2024-03-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(a.alert_type, AlertType::ApproachingLimit);
    }

    #[test]
    fn enum_parsing_is_case_insensitive_and_lists_choices() {
        assert_eq!("Mutual_Fund".parse::<AssetType>(), Ok(AssetType::MutualFund));
        let err = "gold".parse::<AssetType>().unwrap_err();
        assert!(err.contains("real_estate"));
        assert_eq!("6m".parse::<Timeframe>(), Ok(Timeframe::SixMonths));
        assert_eq!(Timeframe::default(), Timeframe::OneYear);
    }

    #[test]
    fn enum_indexes_follow_declaration_order() {
        for (i, c) in BudgetCategory::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert_eq!(AssetType::COUNT, 8);
    }

    #[test]
    fn budget_update_skips_unset_fields() {
        let u = BudgetUpdate {
            amount: Some(Decimal::new(250, 0)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&u).unwrap(), json!({ "amount": 250.0 }));
        assert!(BudgetUpdate::default().is_empty());
    }
}
