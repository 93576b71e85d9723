use std::{borrow::Cow, fmt::Write};

const FONT_SIZE: u32 = 14;
const CELL_PADDING: u32 = 12;
const ROW_HEIGHT: u32 = FONT_SIZE + CELL_PADDING * 2;
const FONT_FAMILY: &str = "Noto Sans, Noto Sans CJK JP, sans-serif";
const CHAR_WIDTH: f32 = 8.2;
const STACK_SPACING: u32 = 16;

const FRAME: &str = "#d2d6dc";
const HEADER_BG: &str = "#2f855a";
const HEADER_TEXT: &str = "#ffffff";
const ROW_BG: [&str; 2] = ["#ffffff", "#f4f7f5"];
const HIGHLIGHT_BG: &str = "#e6f4ea";
const FOOTER_BG: &str = "#e2e8f0";
const TEXT: &str = "#1a202c";
const MUTED_TEXT: &str = "#718096";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowStyle {
    #[default]
    Plain,
    /// Tinted background, bold text.
    Highlight,
    /// Greyed-out text.
    Muted,
    /// Totals; bold on a darker band.
    Footer,
}

struct Column<'a> {
    header: Cow<'a, str>,
    alignment: Alignment,
}

struct Row<'a> {
    cells: Vec<Cow<'a, str>>,
    style: RowStyle,
}

/// A rendered table: its size plus the drawing commands without the
/// enclosing `<svg>` element, so tables can be stacked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTable {
    pub width: u32,
    pub height: u32,
    body: String,
}

impl RenderedTable {
    pub fn to_svg(&self) -> String {
        wrap_svg(self.width, self.height, &self.body)
    }
}

#[derive(Default)]
pub struct SvgTable<'a> {
    columns: Vec<Column<'a>>,
    rows: Vec<Row<'a>>,
}

impl<'a> SvgTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, header: impl Into<Cow<'a, str>>, alignment: Alignment) -> Self {
        self.columns.push(Column {
            header: header.into(),
            alignment,
        });
        self
    }

    pub fn row<I, C>(self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cow<'a, str>>,
    {
        self.styled_row(cells, RowStyle::Plain)
    }

    pub fn styled_row<I, C>(mut self, cells: I, style: RowStyle) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cow<'a, str>>,
    {
        self.rows.push(Row {
            cells: cells.into_iter().map(Into::into).collect(),
            style,
        });
        self
    }

    /// Lays the table out. `None` when no columns were declared.
    pub fn render(&self) -> Option<RenderedTable> {
        if self.columns.is_empty() {
            return None;
        }

        let mut widths: Vec<u32> = self
            .columns
            .iter()
            .map(|column| text_width(&column.header))
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(text_width(cell));
            }
        }

        let width = widths.iter().sum::<u32>() + CELL_PADDING * (widths.len() as u32 + 1);
        let height = ROW_HEIGHT * (self.rows.len() as u32 + 1) + 2;
        let baseline = ROW_HEIGHT / 2 + FONT_SIZE / 2 - 2;

        let mut body = String::with_capacity(256 + self.rows.len() * 256);
        let _ = writeln!(
            body,
            r#"<rect width="{width}" height="{height}" fill="{FRAME}" rx="6" />"#
        );
        let _ = writeln!(
            body,
            r#"<rect x="1" y="1" width="{}" height="{ROW_HEIGHT}" fill="{HEADER_BG}" rx="5" />"#,
            width - 2
        );
        let headers = self.columns.iter().map(|column| column.header.as_ref());
        self.write_cells(&mut body, &widths, headers, baseline, HEADER_TEXT, true);

        for (idx, row) in self.rows.iter().enumerate() {
            let y = ROW_HEIGHT * (idx as u32 + 1) + 1;
            let (background, color, bold) = match row.style {
                RowStyle::Plain => (ROW_BG[idx % 2], TEXT, false),
                RowStyle::Highlight => (HIGHLIGHT_BG, TEXT, true),
                RowStyle::Muted => (ROW_BG[idx % 2], MUTED_TEXT, false),
                RowStyle::Footer => (FOOTER_BG, TEXT, true),
            };
            let _ = writeln!(
                body,
                r#"<rect x="1" y="{y}" width="{}" height="{ROW_HEIGHT}" fill="{background}" />"#,
                width - 2
            );
            let cells = row.cells.iter().map(|cell| cell.as_ref());
            self.write_cells(&mut body, &widths, cells, y + baseline, color, bold);
        }

        Some(RenderedTable {
            width,
            height,
            body,
        })
    }

    fn write_cells<'c>(
        &self,
        body: &mut String,
        widths: &[u32],
        cells: impl Iterator<Item = &'c str>,
        y: u32,
        color: &str,
        bold: bool,
    ) {
        let weight = if bold { r#" font-weight="bold""# } else { "" };
        let mut x = CELL_PADDING;
        for ((cell, width), column) in cells.zip(widths).zip(&self.columns) {
            let (text_x, anchor) = match column.alignment {
                Alignment::Left => (x, "start"),
                Alignment::Right => (x + width, "end"),
            };
            let _ = writeln!(
                body,
                r#"<text x="{text_x}" y="{y}" fill="{color}" text-anchor="{anchor}"{weight}>{}</text>"#,
                escape_xml(cell)
            );
            x += width + CELL_PADDING;
        }
    }
}

/// Stacks tables top to bottom, each centred horizontally. A single table
/// comes back as is.
pub fn stack(tables: &[RenderedTable]) -> Option<RenderedTable> {
    if let [single] = tables {
        return Some(single.clone());
    }
    let width = tables.iter().map(|table| table.width).max()?;
    let height = tables.iter().map(|table| table.height).sum::<u32>()
        + STACK_SPACING * (tables.len() as u32 - 1);

    let mut body = String::with_capacity(tables.iter().map(|table| table.body.len() + 64).sum());
    let mut y = 0;
    for table in tables {
        let x = (width - table.width) / 2;
        let _ = writeln!(body, r#"<g transform="translate({x}, {y})">"#);
        body.push_str(&table.body);
        body.push_str("</g>\n");
        y += table.height + STACK_SPACING;
    }

    Some(RenderedTable {
        width,
        height,
        body,
    })
}

fn wrap_svg(width: u32, height: u32, body: &str) -> String {
    let mut svg = String::with_capacity(body.len() + 256);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
    );
    svg.push_str(body);
    svg.push_str("</svg>");
    svg
}

/// Rough advance width; wide (non-ASCII) glyphs count double.
fn text_width(text: &str) -> u32 {
    let width: f32 = text
        .chars()
        .map(|c| if c.is_ascii() { CHAR_WIDTH } else { CHAR_WIDTH * 2.0 })
        .sum();
    (width.ceil() as u32).max(24)
}

fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
