use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use nbn_cli::types::{RuleTableSummary, RunReport};
use nbn_model::{RuleLayout, RuleStats, SchemaTable};

pub fn print_summary(report: &RunReport) {
    println!("Input: {}", report.input_root.display());
    println!("Output: {}", report.output_dir.display());
    if !report.skipped_folders.is_empty() {
        println!("Skipped folders: {}", report.skipped_folders.join(", "));
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule type"),
        header_cell("File"),
        header_cell("Records"),
        header_cell("Organisations"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for summary in &report.tables {
        table.add_row(vec![
            Cell::new(&summary.rule_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            file_cell(summary),
            count_cell(Some(summary.records), Color::Green),
            count_cell(Some(summary.organisations), Color::Reset),
            status_cell(summary.path.is_some()),
        ]);
    }
    table.add_row(vec![
        Cell::new("species")
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        report
            .species
            .as_ref()
            .and_then(|file| file.path.file_name())
            .map_or_else(|| dim_cell("-"), |name| Cell::new(name.to_string_lossy())),
        count_cell(Some(report.species_count), Color::Green),
        dim_cell("-"),
        status_cell(report.species.is_some()),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} organisations", report.organisations.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.total_records()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(Some(report.failures.len()), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if let Some(stats) = &report.stats {
        print_stats_table(stats, report.stats_file.is_some());
    }
    print_skip_table(report);
    if report.has_failures() {
        eprintln!("Files not written:");
        for failure in &report.failures {
            eprintln!("- {failure}");
        }
    }
    println!(
        "Exported {} records and {} species; {} skipped in {:.2?}",
        report.total_records(),
        report.species_count,
        report.skips.len(),
        report.elapsed
    );
}

fn print_stats_table(stats: &RuleStats, written: bool) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Statistic"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Taxa in species list", stats.taxa.len(), Color::Reset),
        ("Rules", stats.total_rules(), Color::Green),
        ("Taxa with rules", stats.taxa_with_rules, Color::Reset),
        ("Preferred taxa with rules", stats.preferred_with_rules, Color::Reset),
        ("Synonyms with rules", stats.synonyms_with_rules, Color::Reset),
        ("Orphaned rules", stats.orphan_rules, Color::Yellow),
        ("Unknown preferred keys", stats.unknown_preferred.len(), Color::Yellow),
    ];
    for (label, count, color) in rows {
        table.add_row(vec![Cell::new(label), count_cell(Some(count), color)]);
    }
    for (rule_type, count) in stats.totals_by_type() {
        table.add_row(vec![
            Cell::new(format!("[{rule_type}] rules")).fg(Color::Blue),
            count_cell(Some(count), Color::Green),
        ]);
    }
    println!();
    println!("Rule statistics{}:", if written { " (stats.csv)" } else { "" });
    println!("{table}");
}

fn print_skip_table(report: &RunReport) {
    if report.skips.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Section"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for skip in &report.skips {
        let file = skip
            .path
            .strip_prefix(&report.input_root)
            .unwrap_or(&skip.path);
        table.add_row(vec![
            Cell::new(file.display()),
            Cell::new(&skip.section).fg(Color::Yellow),
            Cell::new(&skip.reason),
        ]);
    }
    println!();
    println!("Skipped:");
    println!("{table}");
}

/// Prints every rule type with its layout and columns.
pub fn print_rule_types(schemas: &SchemaTable) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule type"),
        header_cell("Description"),
        header_cell("Source"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    for schema in schemas {
        let source = match &schema.layout {
            RuleLayout::Section => Cell::new(format!("[{}] sections", schema.name)),
            RuleLayout::Folder(rule) => Cell::new(format!("{} folder", rule.test_type)),
        };
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|column| {
                if column.required {
                    format!("{}*", column.name)
                } else {
                    column.name.clone()
                }
            })
            .collect();
        table.add_row(vec![
            Cell::new(&schema.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&schema.description),
            source,
            Cell::new(columns.join(", ")),
        ]);
    }
    println!("{table}");
    println!("* required");
}

fn file_cell(summary: &RuleTableSummary) -> Cell {
    match summary.path.as_ref().and_then(|path| path.file_name()) {
        Some(name) => Cell::new(name.to_string_lossy()),
        None => dim_cell("-"),
    }
}

fn status_cell(written: bool) -> Cell {
    if written {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() == 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::LowerBoundary(Width::Fixed(20)),
        ]);
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
