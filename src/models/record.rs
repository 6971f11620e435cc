//! Transaction record model
//!
//! One row of the unified ledger table. Every field is populated; values a
//! source export does not carry hold the configured placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::{self, Money};

/// Whether a transaction moved money out, in, or not at all
///
/// Stored in the unified table as its label text. Labels outside the three
/// known ones are kept verbatim so the row still shows up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    /// Money spent
    Expense,
    /// Money received
    Income,
    /// Not a real monetary movement (internal transfers, refunds to balance...)
    Uncounted,
    /// Any other label, including a blank cell
    Other(String),
}

impl Direction {
    /// Label used by the exports and the unified table
    pub fn label(&self) -> &str {
        match self {
            Self::Expense => "支出",
            Self::Income => "收入",
            Self::Uncounted => "不计收支",
            Self::Other(raw) => raw,
        }
    }

    /// Parse an export label
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "支出" => Self::Expense,
            "收入" => Self::Income,
            "不计收支" => Self::Uncounted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether rows with this direction belong in the ledger
    pub fn is_counted(&self) -> bool {
        !matches!(self, Self::Uncounted)
    }
}

impl From<String> for Direction {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which export a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "支付宝")]
    Alipay,
    #[serde(rename = "微信")]
    Wechat,
}

impl Provenance {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Alipay => "支付宝",
            Self::Wechat => "微信",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single row of the unified ledger
///
/// Field order matches the unified table's column order: the eleven schema
/// fields followed by the provenance tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque order identifier
    #[serde(rename = "交易订单号")]
    pub order_id: String,

    /// Provider-chosen category label
    #[serde(rename = "交易分类")]
    pub category: String,

    #[serde(rename = "交易对方")]
    pub counterparty: String,

    #[serde(rename = "对方账号")]
    pub counterparty_account: String,

    #[serde(rename = "商品说明")]
    pub description: String,

    #[serde(rename = "收/支")]
    pub direction: Direction,

    /// Non-negative magnitude; `direction` carries the sign
    #[serde(rename = "金额", with = "money::decimal")]
    pub amount: Money,

    #[serde(rename = "收/付款方式")]
    pub payment_method: String,

    #[serde(rename = "交易状态")]
    pub status: String,

    #[serde(rename = "备注")]
    pub remark: String,

    /// Source-native timestamp text, compared lexically
    #[serde(rename = "交易时间")]
    pub timestamp: String,

    #[serde(rename = "分类")]
    pub provenance: Provenance,
}

impl TransactionRecord {
    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Expense
    }

    pub fn is_income(&self) -> bool {
        self.direction == Direction::Income
    }
}
