//! The common record schema shared by both bill exports
//!
//! Column names of the unified table are the Alipay export's native names;
//! the WeChat export is mapped onto them (see `import::mapping`).

use std::fmt;

/// A field of the common schema, in unified-table column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OrderId,
    Category,
    Counterparty,
    CounterpartyAccount,
    Description,
    Direction,
    Amount,
    PaymentMethod,
    Status,
    Remark,
    Timestamp,
}

/// Column name of the provenance tag appended after the schema fields
pub const PROVENANCE_COLUMN: &str = "分类";

impl Field {
    /// All fields in column order
    pub const ALL: [Field; 11] = [
        Field::OrderId,
        Field::Category,
        Field::Counterparty,
        Field::CounterpartyAccount,
        Field::Description,
        Field::Direction,
        Field::Amount,
        Field::PaymentMethod,
        Field::Status,
        Field::Remark,
        Field::Timestamp,
    ];

    /// Column name in the unified table
    pub const fn column_name(&self) -> &'static str {
        match self {
            Field::OrderId => "交易订单号",
            Field::Category => "交易分类",
            Field::Counterparty => "交易对方",
            Field::CounterpartyAccount => "对方账号",
            Field::Description => "商品说明",
            Field::Direction => "收/支",
            Field::Amount => "金额",
            Field::PaymentMethod => "收/付款方式",
            Field::Status => "交易状态",
            Field::Remark => "备注",
            Field::Timestamp => "交易时间",
        }
    }

    /// Look up a field by its unified column name
    pub fn from_column_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_unique() {
        let mut names: Vec<_> = Field::ALL.iter().map(|f| f.column_name()).collect();
        names.push(PROVENANCE_COLUMN);
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_from_column_name() {
        assert_eq!(Field::from_column_name("金额"), Some(Field::Amount));
        assert_eq!(Field::from_column_name("收/支"), Some(Field::Direction));
        assert_eq!(Field::from_column_name("金额(元)"), None);
    }
}
