//! Boxed text panels with a titled top border.

use console::{Color, Style, measure_text_width, truncate_str};

const MIN_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleAlign {
    Left,
    Center,
}

pub struct Panel {
    title: String,
    lines: Vec<(String, Style)>,
    color: Color,
    align: TitleAlign,
    padding: (usize, usize),
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            color: Color::White,
            align: TitleAlign::Left,
            padding: (0, 1),
        }
    }

    /// Appends body text; embedded newlines start new rows.
    pub fn text(self, text: impl AsRef<str>) -> Self {
        self.styled(text, Style::new())
    }

    pub fn styled(mut self, text: impl AsRef<str>, style: Style) -> Self {
        for line in text.as_ref().split('\n') {
            self.lines.push((line.to_string(), style.clone()));
        }
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TitleAlign::Center;
        self
    }

    /// Blank rows above and below, and spaces either side of the body.
    pub fn padding(mut self, vertical: usize, horizontal: usize) -> Self {
        self.padding = (vertical, horizontal);
        self
    }

    pub fn render(&self, width: usize, styled: bool) -> String {
        let width = width.max(MIN_WIDTH);
        let inner = width - 2;
        let (pad_v, pad_h) = self.padding;
        let pad_h = pad_h.min((inner - 1) / 2);
        let content_width = inner - pad_h * 2;
        let border = Style::new().fg(self.color).force_styling(styled);

        let mut out = Vec::new();
        out.push(self.top_border(inner, &border));

        let blank = format!(
            "{}{}{}",
            border.apply_to("│"),
            " ".repeat(inner),
            border.apply_to("│")
        );
        out.extend(std::iter::repeat_n(blank.clone(), pad_v));

        for (line, style) in &self.lines {
            let style = style.clone().force_styling(styled);
            for row in wrap(line, content_width) {
                let fill = content_width - measure_text_width(&row);
                out.push(format!(
                    "{}{}{}{}{}",
                    border.apply_to("│"),
                    " ".repeat(pad_h),
                    style.apply_to(&row),
                    " ".repeat(fill + pad_h),
                    border.apply_to("│")
                ));
            }
        }

        out.extend(std::iter::repeat_n(blank, pad_v));
        out.push(format!(
            "{}",
            border.apply_to(format!("╰{}╯", "─".repeat(inner)))
        ));
        out.join("\n")
    }

    fn top_border(&self, inner: usize, border: &Style) -> String {
        if self.title.is_empty() {
            return format!("{}", border.apply_to(format!("╭{}╮", "─".repeat(inner))));
        }

        let title = truncate_str(&self.title, inner.saturating_sub(4), "…");
        let title_width = measure_text_width(&title) + 2;
        let (left, right) = match self.align {
            TitleAlign::Left => (1, inner - 1 - title_width),
            TitleAlign::Center => {
                let left = (inner - title_width) / 2;
                (left, inner - title_width - left)
            }
        };

        format!(
            "{} {} {}",
            border.apply_to(format!("╭{}", "─".repeat(left))),
            title,
            border.apply_to(format!("{}╮", "─".repeat(right)))
        )
    }
}

fn char_width(ch: char) -> usize {
    let mut buf = [0u8; 4];
    measure_text_width(ch.encode_utf8(&mut buf))
}

/// Greedy word wrap by display width. Words wider than a row are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_inclusive(' ') {
        let word_width = measure_text_width(word);
        let fit_width = measure_text_width(word.trim_end_matches(' '));
        if current_width + fit_width > width && !current.is_empty() {
            rows.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }

        if fit_width <= width {
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        for ch in word.chars() {
            let w = char_width(ch);
            if current_width + w > width && !current.is_empty() {
                rows.push(std::mem::take(&mut current).trim_end().to_string());
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
    }

    rows.push(current.trim_end().to_string());
    rows
}
