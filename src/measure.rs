use unicode_width::UnicodeWidthStr;

/// Estimated text and box metrics for table boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub char_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub min_table_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            header_height: 40.0,
            row_height: 30.0,
            padding_x: 12.0,
            padding_y: 0.0,
            min_table_width: 200.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Box size of a table showing `columns` under a `label` header.
    pub fn table_size<S: AsRef<str>>(&self, label: &str, columns: &[S]) -> (f64, f64) {
        // header also carries the collapse and menu buttons
        let header_width = self.text_width(label) + self.char_width * 6.0;

        let max_col_width = columns
            .iter()
            .map(|c| self.text_width(c.as_ref()))
            .fold(0.0, f64::max);

        let content_width = header_width.max(max_col_width) + self.padding_x * 2.0;
        let width = content_width.max(self.min_table_width);

        let height = self.header_height
            + columns.len() as f64 * self.row_height
            + if columns.is_empty() { 0.0 } else { self.padding_y * 2.0 };

        (width, height)
    }

    /// Vertical offset of the center of the `row`-th displayed column,
    /// relative to the table's top edge.
    pub fn row_center(&self, row: usize) -> f64 {
        self.header_height + self.padding_y + (row as f64 + 0.5) * self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("User"), 4.0 * 8.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("ユーザー"), 8.0 * 8.0);
    }

    #[test]
    fn test_table_size_no_columns() {
        let m = TextMetrics::default();
        let (w, h) = m.table_size::<&str>("User", &[]);
        assert_eq!(w, m.min_table_width);
        assert_eq!(h, m.header_height);
    }

    #[test]
    fn test_table_size_with_columns() {
        let m = TextMetrics::default();
        let (_, h) = m.table_size("User", &["id", "name"]);
        assert_eq!(h, 40.0 + 2.0 * 30.0);
    }

    #[test]
    fn test_long_column_widens_table() {
        let m = TextMetrics::default();
        let long = "a_really_long_column_name_that_overflows";
        let (w, _) = m.table_size("T", &[long]);
        assert!(w > m.min_table_width);
        assert_eq!(w, m.text_width(long) + m.padding_x * 2.0);
    }

    #[test]
    fn test_row_center() {
        let m = TextMetrics::default();
        assert_eq!(m.row_center(0), 55.0);
        assert_eq!(m.row_center(2), 115.0);
    }
}
