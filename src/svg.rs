use crate::layout::{EdgePlan, RenderPlan, SchemaPlan, TablePlan};
use crate::measure::TextMetrics;
use std::fmt::Write;

/// Paints a [`RenderPlan`] as a standalone SVG document.
pub struct SvgRenderer {
    metrics: TextMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
        }
    }
}

impl SvgRenderer {
    pub fn new(metrics: TextMetrics) -> Self {
        Self { metrics }
    }

    pub fn render(&self, plan: &RenderPlan) -> String {
        let mut svg = String::new();

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            plan.width, plan.height, plan.width, plan.height
        )
        .unwrap();

        // Style
        writeln!(
            &mut svg,
            r#"<style>
  .schema-area {{ fill: #f4f8fb; stroke: #9db4c8; stroke-width: 1; stroke-dasharray: 6 4; }}
  .schema-title {{ font-family: sans-serif; font-size: 16px; font-weight: bold; fill: #34495e; }}
  .table-bg {{ fill: #fff; stroke: #333; stroke-width: 1.5; }}
  .table-bg.selected {{ stroke: #e67e22; stroke-width: 3; }}
  .table-header {{ fill: #3498db; }}
  .table-name {{ font-family: monospace; font-size: 14px; font-weight: bold; fill: #fff; }}
  .column-text {{ font-family: monospace; font-size: 12px; }}
  .column-row.selected {{ fill: #fdebd0; }}
  .relation {{ stroke: #3498db; stroke-width: 2; }}
  .endpoint {{ fill: #3498db; }}
  .relation-delete line {{ stroke: #e74c3c; stroke-width: 2; }}
</style>"#
        )
        .unwrap();

        // Schema areas behind everything
        for schema in &plan.schemas {
            self.render_schema(&mut svg, schema);
        }

        // Relations behind tables
        for edge in &plan.edges {
            self.render_edge(&mut svg, edge);
        }

        // Tables in paint order
        for table in &plan.tables {
            self.render_table(&mut svg, table);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_schema(&self, svg: &mut String, schema: &SchemaPlan) {
        let r = &schema.rect;
        writeln!(
            svg,
            r#"<rect class="schema-area" x="{}" y="{}" width="{}" height="{}" rx="8" />"#,
            r.x, r.y, r.width, r.height
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text class="schema-title" x="{}" y="{}">{}</text>"#,
            r.x + 25.0,
            r.y + 30.0,
            escape_xml(&schema.name)
        )
        .unwrap();
    }

    fn render_table(&self, svg: &mut String, table: &TablePlan) {
        let r = &table.rect;
        let header_h = self.metrics.header_height;
        let class = if table.selected {
            "table-bg selected"
        } else {
            "table-bg"
        };

        // 1. Background and border
        writeln!(
            svg,
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            class, r.x, r.y, r.width, r.height
        )
        .unwrap();

        // 2. Header
        writeln!(
            svg,
            r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            r.x, r.y, r.width, header_h
        )
        .unwrap();

        // 3. Table name, with the collapse marker on the left
        let marker = if table.collapsed { "+" } else { "-" };
        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}">{} {}</text>"#,
            r.x + self.metrics.padding_x,
            r.y + header_h / 2.0 + 5.0,
            marker,
            escape_xml(&table.key.table)
        )
        .unwrap();

        // 4. Column rows
        for (row, column) in table.columns.iter().enumerate() {
            let center = r.y + self.metrics.row_center(row);
            if column.selected {
                writeln!(
                    svg,
                    r#"<rect class="column-row selected" x="{}" y="{}" width="{}" height="{}" />"#,
                    r.x,
                    center - self.metrics.row_height / 2.0,
                    r.width,
                    self.metrics.row_height
                )
                .unwrap();
            }
            writeln!(
                svg,
                r#"<text class="column-text" x="{}" y="{}">{}</text>"#,
                r.x + self.metrics.padding_x,
                center + 4.0,
                escape_xml(&column.name)
            )
            .unwrap();
        }
    }

    fn render_edge(&self, svg: &mut String, edge: &EdgePlan) {
        let (from, to, mid) = (edge.from, edge.to, edge.midpoint);

        writeln!(
            svg,
            r#"<line class="relation" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
            from.x, from.y, to.x, to.y
        )
        .unwrap();

        for p in [from, to] {
            writeln!(
                svg,
                r#"<circle class="endpoint" cx="{}" cy="{}" r="3" />"#,
                p.x, p.y
            )
            .unwrap();
        }

        // Delete affordance
        writeln!(
            svg,
            r##"<g class="relation-delete" transform="translate({}, {})" data-from="{}" data-to="{}"><circle r="8" fill="#fff" /><line x1="-5" y1="-5" x2="5" y2="5" /><line x1="5" y1="-5" x2="-5" y2="5" /></g>"##,
            mid.x,
            mid.y,
            escape_xml(&edge.relation.from.to_string()),
            escape_xml(&edge.relation.to.to_string())
        )
        .unwrap();
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;
    use crate::record::HEADER;

    fn render(body: &str) -> String {
        let mut editor = Editor::default();
        editor.load(&format!("{HEADER}\n{body}"));
        SvgRenderer::default().render(&editor.render_plan())
    }

    #[test]
    fn test_render_basic() {
        let svg = render("S;User;id\nS;User;name\n");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("User"));
        assert!(svg.contains("schema-area"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_render_unicode() {
        let svg = render("スキーマ;ユーザー;名前\n");

        assert!(svg.contains("ユーザー"));
        assert!(svg.contains("名前"));
    }

    #[test]
    fn test_render_with_edges() {
        let svg = render("S;User;id\nS;Order;user_id;;User;id\n");

        assert!(svg.contains(r#"class="relation""#));
        assert!(svg.contains("relation-delete"));
        assert!(svg.contains(r#"data-from="S.Order.user_id""#));
    }

    #[test]
    fn test_escape() {
        let svg = render("S;a<b>;c&d\n");
        assert!(svg.contains("a&lt;b&gt;"));
        assert!(svg.contains("c&amp;d"));
    }
}
