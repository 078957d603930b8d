use std::fmt::{self, Write};

use crate::color::{MaybePaint, HEADER};

/// Placeholder printed for empty cells so every row keeps all of its columns
const EMPTY_CELL: &str = "-";

pub(crate) struct Row {
    cells: Vec<String>,
}

impl Row {
    fn is_awk_safe(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| !cell.contains(char::is_whitespace))
    }

    fn columns(&self) -> usize {
        self.cells.len()
    }
}

pub(crate) trait IntoRow: Into<Row> + Sized {
    fn into_row(self) -> Row {
        self.into()
    }
}

impl<T> IntoRow for T where T: Into<Row> + Sized {}

impl From<Vec<String>> for Row {
    fn from(value: Vec<String>) -> Self {
        let cells = value
            .into_iter()
            .map(|cell| {
                if cell.is_empty() {
                    EMPTY_CELL.to_string()
                } else {
                    cell
                }
            })
            .collect();

        Row { cells }
    }
}

impl From<Vec<&str>> for Row {
    fn from(value: Vec<&str>) -> Self {
        let value: Vec<String> = value.into_iter().map(|s| s.to_owned()).collect();

        value.into()
    }
}

/// A whitespace-aligned table. Headers must be awk safe so headerless output
/// can be split on whitespace up to the last column.
pub(crate) struct Table {
    body: Vec<Row>,
    header: Option<Row>,
    num_columns: usize,
    print_header: bool,
}

impl Table {
    pub(crate) fn new<S: IntoRow>(header: S) -> Table {
        let header = header.into_row();

        debug_assert!(header.is_awk_safe(), "table header contains whitespace");

        Table {
            body: Vec::new(),
            num_columns: header.columns(),
            header: Some(header),
            print_header: true,
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    /// Rows shorter than the header are padded with empty cells and longer
    /// rows are truncated.
    pub(crate) fn add_row<S: IntoRow>(&mut self, row: S) {
        let mut row = row.into_row();

        row.cells.resize_with(self.num_columns, || EMPTY_CELL.to_string());

        self.body.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0usize; self.num_columns];

        for row in self.header.iter().chain(self.body.iter()) {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        widths
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &Row, widths: &[usize], header: bool) -> fmt::Result {
    let last = row.cells.len().saturating_sub(1);

    for (i, cell) in row.cells.iter().enumerate() {
        // The last column is not padded to avoid trailing whitespace
        let padded = if i == last {
            cell.clone()
        } else {
            format!("{:<width$}  ", cell, width = widths[i])
        };

        if header {
            write!(f, "{}", HEADER.maybe_paint(cell.as_str()))?;
            f.write_str(&padded[cell.len()..])?;
        } else {
            f.write_str(&padded)?;
        }
    }

    f.write_char('\n')
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        if self.print_header {
            if let Some(header) = &self.header {
                write_row(f, header, &widths, true)?;
            }
        }

        for row in &self.body {
            write_row(f, row, &widths, false)?;
        }

        Ok(())
    }
}

pub(crate) trait IntoTable: Into<Table> + Sized {
    fn into_table(self) -> Table {
        self.into()
    }
}

impl<T> IntoTable for T where T: Into<Table> + Sized {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;
    use crate::color::configure_color;

    #[test]
    fn test_alignment() {
        configure_color(ColorMode::Off);

        let mut tab = Table::new(vec!["PROVIDER", "MODEL", "NAME"]);
        tab.add_row(vec!["openai", "gpt-4.1", "GPT-4.1"]);
        tab.add_row(vec!["anthropic".to_string(), "claude-sonnet-4-0".to_string(), String::new()]);
        tab.add_row(vec!["ollama", "llama3.1:8b"]);

        assert_eq!(
            tab.to_string(),
            "PROVIDER   MODEL              NAME\n\
             openai     gpt-4.1            GPT-4.1\n\
             anthropic  claude-sonnet-4-0  -\n\
             ollama     llama3.1:8b        -\n"
        );

        tab.print_header(false);

        assert!(tab.to_string().starts_with("openai "));
    }

    #[test]
    fn test_widths_count_characters() {
        configure_color(ColorMode::Off);

        let mut tab = Table::new(vec!["MODEL", "NAME"]);
        tab.add_row(vec!["qwen-über", "x"]);

        assert_eq!(tab.to_string(), "MODEL      NAME\nqwen-über  x\n");
    }
}
