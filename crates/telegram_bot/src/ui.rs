use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use csv::Writer;
use engine::{Amount, Expense, Summary};
use serde::Serialize;

const DATE_FORMAT: &str = "%d %b %Y %I:%M %p";

pub(crate) fn render_list(records: &[Expense], title: &str, tz: Tz) -> String {
    if records.is_empty() {
        return format!("📭 {title}: Tiada rekod.");
    }

    let mut text = format!("📌 {title}\n\n");
    for record in records {
        text.push_str(&format!(
            "• RM{} - {} ({})\n",
            record.amount,
            record.category,
            local_time(record.created_at, tz).format(DATE_FORMAT)
        ));
    }

    let total: Amount = records.iter().map(|r| r.amount).sum();
    text.push_str(&format!("\n💰 Total: RM{total}"));
    text
}

pub(crate) fn render_summary(summary: &Summary) -> String {
    if summary.is_empty() {
        return "📭 Tiada rekod untuk summary.".to_string();
    }

    let mut text = String::from("📊 Summary ikut kategori:\n\n");
    for line in &summary.by_category {
        text.push_str(&format!("• {}: RM{}\n", line.category, line.total));
    }
    text.push_str(&format!("\n💰 Total semua: RM{}", summary.grand_total));
    text
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    amount: String,
    category: &'a str,
    created_at: String,
}

/// Serializes `records` as CSV, keeping the given order.
///
/// Header is `id,amount,category,created_at`; `created_at` is RFC 3339 in `tz`.
pub(crate) fn render_csv(records: &[Expense], tz: Tz) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(vec![]);
    if records.is_empty() {
        writer.write_record(["id", "amount", "category", "created_at"])?;
    }
    for record in records {
        writer.serialize(CsvRow {
            id: record.id,
            amount: record.amount.to_string(),
            category: &record.category,
            created_at: local_time(record.created_at, tz).to_rfc3339(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub(crate) fn saved_text(amount: Amount, category: &str) -> String {
    format!("✅ Saved: RM{amount} ({category})")
}

pub(crate) fn deleted_text(record: &Expense) -> String {
    format!("🗑️ Deleted last: RM{} - {}", record.amount, record.category)
}

pub(crate) fn nothing_to_delete_text() -> &'static str {
    "❌ Takde rekod nak delete."
}

pub(crate) fn nothing_to_export_text() -> &'static str {
    "📭 Tiada data untuk export."
}

pub(crate) fn storage_error_text() -> &'static str {
    "⚠️ Maaf, ada masalah dengan storan. Cuba lagi nanti."
}

pub(crate) fn welcome_text() -> &'static str {
    "👋 Hai! Aku Expense Tracker Bot.\n\n\
     Cara guna:\n\
     • rm12 makan\n\
     • rm5 air\n\
     • rm80 minyak\n\n\
     Commands:\n\
     /today - hari ini\n\
     /week - 7 hari\n\
     /month - 30 hari\n\
     /summary - ikut kategori\n\
     /undo - delete last\n\
     /export - download CSV"
}

fn local_time(at: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    at.with_timezone(&tz)
}
