#![forbid(unsafe_code)]

use std::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        Self {
            align: vec![Align::Left; headers.len()],
            headers,
            rows: Vec::new(),
        }
    }

    /// Right-aligns the given columns; used for numeric cells.
    #[must_use]
    pub fn right(mut self, cols: &[usize]) -> Self {
        for &c in cols {
            if let Some(a) = self.align.get_mut(c) {
                *a = Align::Right;
            }
        }
        self
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    pub fn write_csv_to(&self, out: impl io::Write) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let widths = self.widths();
        writeln!(&mut out, "{}", self.format_row(&self.headers, &widths))?;
        for row in &self.rows {
            writeln!(&mut out, "{}", self.format_row(row, &widths))?;
        }
        Ok(())
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| visible_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(visible_width(cell));
            }
        }
        widths
    }

    fn format_row(&self, row: &[String], widths: &[usize]) -> String {
        let mut out = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let w = widths
                .get(i)
                .copied()
                .unwrap_or_else(|| visible_width(cell));
            let pad = " ".repeat(w.saturating_sub(visible_width(cell)));
            if self.align.get(i).copied().unwrap_or_default() == Align::Right {
                out.push_str(&pad);
                out.push_str(cell);
            } else {
                out.push_str(cell);
                out.push_str(&pad);
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

fn visible_width(s: &str) -> usize {
    // Best-effort: assume each char is width 1.
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(t: &Table) -> String {
        let mut buf = Vec::new();
        t.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn pads_columns_and_right_aligns_numbers() {
        let mut t = Table::new(["NAME", "HOURS", "NOTE"]).right(&[1]);
        t.row(["Alex", "8", "ok"]);
        t.row(["Morgan", "20", "-"]);
        assert_eq!(
            render(&t),
            "NAME    HOURS  NOTE\nAlex        8  ok\nMorgan     20  -\n"
        );
    }

    #[test]
    fn csv_quotes_commas() {
        let mut t = Table::new(["id", "tags"]);
        t.row(["t1", "design,architecture"]);
        let mut buf = Vec::new();
        t.write_csv_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "id,tags\nt1,\"design,architecture\"\n"
        );
    }
}
