use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use datalist_core::ParamValue;

use crate::types::{ColumnInfoRow, ListOutcome};

pub fn print_page(outcome: &ListOutcome) {
    let mut table = Table::new();
    table.set_header(outcome.columns.iter().map(|c| header_cell(c)));
    apply_page_table_style(&mut table);

    for row in &outcome.rows {
        table.add_row(
            outcome
                .columns
                .iter()
                .map(|column| value_cell(row.get(column))),
        );
    }
    if outcome.rows.is_empty() {
        println!("No rows on this page.");
    } else {
        println!("{table}");
    }

    let paginator = &outcome.paginator;
    println!(
        "Page {} of {} ({} rows, {} per page)",
        paginator.page(),
        paginator.last_page(),
        paginator.item_count(),
        paginator.items_per_page()
    );
    if let Some(order) = &outcome.order {
        println!("Order: {order}");
    }
    if !outcome.filters.is_empty() {
        let filters: Vec<String> = outcome
            .filters
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("Filters: {}", filters.join(", "));
    }
    match serde_json::to_string(&outcome.outbound) {
        Ok(json) => println!("Parameters: {json}"),
        Err(error) => eprintln!("error: failed to serialize parameters: {error}"),
    }
}

pub fn print_columns(rows: &[ColumnInfoRow]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Order name")]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for row in rows {
        table.add_row(vec![Cell::new(&row.column), Cell::new(&row.order_name)]);
    }
    println!("{table}");
}

fn apply_page_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: Option<&ParamValue>) -> Cell {
    match value {
        None => Cell::new("-").add_attribute(Attribute::Dim),
        Some(value @ (ParamValue::Int(_) | ParamValue::Float(_))) => {
            Cell::new(value).set_alignment(CellAlignment::Right)
        }
        Some(value) => Cell::new(value),
    }
}
