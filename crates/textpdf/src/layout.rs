//! Page geometry, line wrapping and pagination.
//!
//! Everything here is pure: the same text and [`PageLayout`] always produce
//! the same lines and the same page breaks. The built-in Courier font is
//! monospaced (every glyph advances 600/1000 em), so a line's width is just
//! its character count times the glyph advance and no font metrics table is
//! needed.

use crate::TextPdfError;

/// Horizontal advance of every Courier glyph, in em.
pub const COURIER_ADVANCE_EM: f32 = 0.6;

/// Spaces a tab character expands to.
pub const TAB_WIDTH: usize = 4;

/// Fixed page geometry, all values in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    /// Applied on all four sides.
    pub margin: f32,
    pub font_size: f32,
    /// Baseline-to-baseline distance.
    pub line_height: f32,
}

impl Default for PageLayout {
    /// A4 portrait, 20 mm margins, 11 pt Courier on 14 pt leading.
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 56.69,
            font_size: 11.0,
            line_height: 14.0,
        }
    }
}

impl PageLayout {
    /// Characters that fit on one line.
    pub fn columns(&self) -> usize {
        let usable = self.page_width - 2.0 * self.margin;
        let advance = self.font_size * COURIER_ADVANCE_EM;
        if usable <= 0.0 || advance <= 0.0 {
            return 0;
        }
        (usable / advance).floor() as usize
    }

    /// Lines that fit on one page.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height - 2.0 * self.margin;
        if usable < self.font_size || self.line_height <= 0.0 {
            return 0;
        }
        // The first baseline sits one font size below the top margin; each
        // further line costs one leading.
        1 + ((usable - self.font_size) / self.line_height).floor() as usize
    }

    /// Reject geometry that cannot hold at least one character on one line.
    pub fn validate(&self) -> Result<(), TextPdfError> {
        let finite = [
            self.page_width,
            self.page_height,
            self.margin,
            self.font_size,
            self.line_height,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(TextPdfError::InvalidLayout(
                "all dimensions must be finite numbers".into(),
            ));
        }
        if self.font_size <= 0.0 || self.line_height <= 0.0 || self.margin < 0.0 {
            return Err(TextPdfError::InvalidLayout(format!(
                "font size {} and line height {} must be positive, margin {} non-negative",
                self.font_size, self.line_height, self.margin
            )));
        }
        if self.columns() == 0 || self.lines_per_page() == 0 {
            return Err(TextPdfError::InvalidLayout(format!(
                "{}x{} pt page with {} pt margins leaves no room for {} pt text",
                self.page_width, self.page_height, self.margin, self.font_size
            )));
        }
        Ok(())
    }
}

/// Wrap `text` into lines of at most `columns` characters.
///
/// `\r\n` and lone `\r` count as line breaks, tabs expand to spaces. Lines
/// break at spaces where possible; a word longer than a whole line is split
/// across as many lines as it needs. Spaces at a break point may be
/// dropped; every other character survives in order.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines = Vec::new();
    for raw in normalised.split('\n') {
        let expanded = raw.replace('\t', &" ".repeat(TAB_WIDTH));
        wrap_line(&expanded, columns, &mut lines);
    }
    lines
}

fn wrap_line(line: &str, columns: usize, out: &mut Vec<String>) {
    if line.chars().count() <= columns {
        out.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_len = 0usize;
    let mut started = false;

    for word in line.split(' ') {
        let word_len = word.chars().count();
        let needed = if started {
            current_len + 1 + word_len
        } else {
            word_len
        };

        if needed <= columns {
            if started {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
            started = true;
            continue;
        }

        if started {
            out.push(std::mem::take(&mut current));
            current_len = 0;
            started = false;
        }

        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > columns {
            out.push(chars.drain(..columns).collect());
        }
        if !chars.is_empty() {
            current_len = chars.len();
            current = chars.into_iter().collect();
            started = true;
        }
    }

    if started {
        out.push(current);
    }
}

/// Split wrapped lines into pages. Always yields at least one page.
pub fn paginate(lines: Vec<String>, lines_per_page: usize) -> Vec<Vec<String>> {
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(lines_per_page.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Wrap and paginate `text` for `layout`.
pub fn layout_text(text: &str, layout: &PageLayout) -> Result<Vec<Vec<String>>, TextPdfError> {
    layout.validate()?;
    let lines = wrap_text(text, layout.columns());
    Ok(paginate(lines, layout.lines_per_page()))
}
