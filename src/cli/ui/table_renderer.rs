//! Plain-text table rendering for list-style command output.

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Specifies the configuration for a single column in the rendered table.
#[derive(Clone, Debug)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            header: header.into(),
            alignment,
        }
    }
}

/// A table with column metadata and rows of data to render.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Computes the content width of each column from its header and cells.
    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = column.header.chars().count();
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        width = width.max(cell.chars().count());
                    }
                }
                width
            })
            .collect()
    }

    fn render_cells(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                match column.alignment {
                    Alignment::Left => format!("{:<width$}", cell, width = width),
                    Alignment::Right => format!("{:>width$}", cell, width = width),
                }
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    }

    /// Renders header, separator, and rows as lines of text.
    pub fn render(&self) -> Vec<String> {
        let widths = self.compute_widths();
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![self.render_cells(&header, &widths)];
        let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        lines.push(self.render_cells(&separator, &widths));
        for row in &self.rows {
            lines.push(self.render_cells(row, &widths));
        }
        lines
    }
}
