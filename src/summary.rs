use crate::purchase::PurchaseEntry;
use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement,
    Table,
};

/// Totals over the whole purchase list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_units: f64,
    pub total_amount: f64,
    pub avg_price: f64,
}

impl Summary {
    pub fn of(entries: &[PurchaseEntry]) -> Summary {
        let mut total_units = 0.0_f64;
        let mut total_amount = 0.0_f64;

        for entry in entries {
            total_units += entry.units.finite_or_zero();
            total_amount += entry.amount();
        }

        // weighted by invested amount, so it is the price actually paid per unit
        let avg_price = if total_units > 0.0 {
            total_amount / total_units
        } else {
            0.0
        };

        Summary {
            total_units,
            total_amount,
            avg_price,
        }
    }
}

// adding 0.0 turns -0.0 into 0.0
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value + 0.0
    } else {
        0.0
    }
}

/// `$` with two decimals, used for amounts.
pub fn format_money(value: f64) -> String {
    format!("${:.2}", finite(value))
}

/// `$` with four decimals, used for the average price.
pub fn format_price(value: f64) -> String {
    format!("${:.4}", finite(value))
}

/// Units are shown as the plain number.
pub fn format_units(value: f64) -> String {
    format!("{}", finite(value))
}

// Print the purchases and their totals as a table
pub fn print(entries: &[PurchaseEntry], summary: &Summary) {
    println!("{}", build_table(entries, summary));
}

fn build_table(entries: &[PurchaseEntry], summary: &Summary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Units").add_attribute(Attribute::Bold),
        Cell::new("Price").add_attribute(Attribute::Bold),
        Cell::new("Invested").add_attribute(Attribute::Bold),
    ]);

    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(entry.units.text()).set_alignment(CellAlignment::Right),
            Cell::new(entry.price.text()).set_alignment(CellAlignment::Right),
            Cell::new(format_money(entry.amount())).set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(format_units(summary.total_units))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(format_price(summary.avg_price))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold)
            .fg(TColor::Cyan),
        Cell::new(format_money(summary.total_amount))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold)
            .fg(TColor::Green),
    ]);

    table
}
