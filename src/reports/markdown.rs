//! Markdown bill report
//!
//! Layout:
//! 1. one-line summary of expense, income and balance
//! 2. expense analysis: category totals, then every expense per category
//! 3. income analysis, same shape
//! 4. full ledger ordered by transaction time

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::summary::{DirectionBreakdown, LedgerSummary};
use crate::models::TransactionRecord;

/// Row of a per-category detail table
#[derive(Tabled)]
struct DetailRow {
    #[tabled(rename = "交易对方")]
    counterparty: String,
    #[tabled(rename = "金额")]
    amount: String,
    #[tabled(rename = "分类")]
    provenance: String,
    #[tabled(rename = "交易时间")]
    timestamp: String,
}

/// Row of the full ledger table
#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "交易分类")]
    category: String,
    #[tabled(rename = "分类")]
    provenance: String,
    #[tabled(rename = "收/支")]
    direction: String,
    #[tabled(rename = "金额")]
    amount: String,
    #[tabled(rename = "交易对方")]
    counterparty: String,
    #[tabled(rename = "商品说明")]
    description: String,
    #[tabled(rename = "对方账号")]
    counterparty_account: String,
    #[tabled(rename = "收/付款方式")]
    payment_method: String,
    #[tabled(rename = "交易状态")]
    status: String,
    #[tabled(rename = "备注")]
    remark: String,
    #[tabled(rename = "交易时间")]
    timestamp: String,
    #[tabled(rename = "交易订单号")]
    order_id: String,
}

/// Wording that differs between the expense and income sections
struct SectionText {
    heading: &'static str,
    intro: &'static str,
    amount_header: &'static str,
    detail_suffix: &'static str,
}

const EXPENSE_SECTION: SectionText = SectionText {
    heading: "## 消费类型分析 💸",
    intro: "以下是各消费交易分类与消费金额：",
    amount_header: "消费金额",
    detail_suffix: "消费记录 💳",
};

const INCOME_SECTION: SectionText = SectionText {
    heading: "## 收入类型分析 💵",
    intro: "以下是各收入交易分类与收入金额：",
    amount_header: "收入金额",
    detail_suffix: "收入记录 💼",
};

/// Render the report for `records` and their summary
pub fn render(records: &[TransactionRecord], summary: &LedgerSummary, symbol: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "**本月消费总额**：{}  |  **本月收入总额**：{}  |  **本月结余**：{}\n\n",
        summary.total_expense.format_with_symbol(symbol),
        summary.total_income.format_with_symbol(symbol),
        summary.balance.format_with_symbol(symbol),
    ));

    render_section(&mut out, records, &summary.expense, &EXPENSE_SECTION, symbol);
    out.push('\n');
    render_section(&mut out, records, &summary.income, &INCOME_SECTION, symbol);

    out.push_str("\n## 收支明细\n");
    let rows = summary.ledger.iter().map(|&i| {
        let r = &records[i];
        LedgerRow {
            category: cell(&r.category),
            provenance: r.provenance.to_string(),
            direction: cell(r.direction.label()),
            amount: r.amount.format_with_symbol(symbol),
            counterparty: cell(&r.counterparty),
            description: cell(&r.description),
            counterparty_account: cell(&r.counterparty_account),
            payment_method: cell(&r.payment_method),
            status: cell(&r.status),
            remark: cell(&r.remark),
            timestamp: cell(&r.timestamp),
            order_id: cell(&r.order_id),
        }
    });
    push_table(&mut out, Table::new(rows));

    out
}

fn render_section(
    out: &mut String,
    records: &[TransactionRecord],
    breakdown: &DirectionBreakdown,
    text: &SectionText,
    symbol: &str,
) {
    out.push_str(text.heading);
    out.push_str("\n\n");
    out.push_str(text.intro);
    out.push_str("\n\n");

    let mut builder = Builder::default();
    builder.push_record(["交易分类", text.amount_header]);
    for category in &breakdown.categories {
        builder.push_record([cell(&category.category), category.total.format_with_symbol(symbol)]);
    }
    push_table(out, builder.build());

    out.push_str("\n### 每个交易分类的详细记录：\n");
    for category in &breakdown.categories {
        out.push_str(&format!(
            "\n#### {}{}\n",
            cell(&category.category),
            text.detail_suffix
        ));
        let rows = category.rows.iter().map(|&i| {
            let r = &records[i];
            DetailRow {
                counterparty: cell(&r.counterparty),
                amount: r.amount.format_with_symbol(symbol),
                provenance: r.provenance.to_string(),
                timestamp: cell(&r.timestamp),
            }
        });
        push_table(out, Table::new(rows));
    }
}

fn push_table(out: &mut String, mut table: Table) {
    table.with(Style::markdown());
    out.push_str(&table.to_string());
    out.push('\n');
}

/// Keep a value on one table line
fn cell(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
