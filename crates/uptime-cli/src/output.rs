use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Lay out `rows` under `headers`, two spaces between columns.
///
/// Cells that parse as numbers are right-aligned so report figures line up
/// on the decimal point. Cells beyond the header count are dropped.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, h)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(String::len)
                .fold(h.len(), usize::max)
        })
        .collect();

    let mut out = String::new();
    let mut push_line = |cells: Vec<String>| {
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    };

    push_line(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| format!("{h:<w$}"))
            .collect(),
    );
    push_line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        push_line(
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| {
                    if cell.parse::<f64>().is_ok() {
                        format!("{cell:>w$}")
                    } else {
                        format!("{cell:<w$}")
                    }
                })
                .collect(),
        );
    }
    out
}

/// Two-column key/value listing used by single-record commands.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("{key:width$}  {value}");
    }
}
