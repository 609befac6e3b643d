// pricefeed/src/output.rs
//
// Terminal tables for query and audit commands.

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use pricefeed_core::domain::product::ProductRow;
use pricefeed_core::domain::snapshot::SnapshotEntry;

pub fn products_table(rows: &[ProductRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Title", "Group", "USD", "GBP", "Premium"]);

    for row in rows {
        table.add_row(vec![
            row.product_id.to_string(),
            row.title.clone().unwrap_or_default(),
            row.category_group.clone().unwrap_or_default(),
            format!("{:.2}", row.price_usd),
            format!("{:.2}", row.price_gbp),
            if row.is_premium { "⭐" } else { "" }.to_string(),
        ]);
    }
    table
}

pub fn snapshots_table(entries: &[SnapshotEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Snapshot", "Created", "Records", "Lineage", "Rate"]);

    for entry in entries {
        let rate = entry
            .exchange_rate
            .map(|r| format!("{} ({})", r.value, r.source))
            .unwrap_or_default();
        table.add_row(vec![
            entry.id.clone(),
            entry.created_at.to_rfc3339(),
            entry.record_count.to_string(),
            entry.lineage.clone().unwrap_or_default(),
            rate,
        ]);
    }
    table
}
