use crate::themes::Theme;
use leave_core::formatting::{format_count, percentage};
use ratatui::text::{Line, Span};

/// Character used for filled bar cells.
pub const FILLED_CHAR: char = '\u{2588}'; // █  FULL BLOCK
/// Character used for the unfilled remainder.
pub const EMPTY_CHAR: char = '\u{2591}'; // ░  LIGHT SHADE

fn cells(value: f64, scale: f64, width: u16) -> usize {
    if scale <= 0.0 {
        return 0;
    }
    ((value / scale) * width as f64).round().clamp(0.0, width as f64) as usize
}

fn repeat(c: char, n: usize) -> String {
    std::iter::repeat_n(c, n).collect()
}

// ── ValueBar ─────────────────────────────────────────────────────────────────

/// Horizontal bar for one value relative to the largest value in its chart.
///
/// Renders as a coloured fill, an empty remainder and the value itself.
pub struct ValueBar<'a> {
    pub value: u64,
    pub max: u64,
    pub width: u16,
    /// Index into the theme's series palette.
    pub series: usize,
    pub theme: &'a Theme,
}

impl<'a> ValueBar<'a> {
    pub fn new(value: u64, max: u64, series: usize, theme: &'a Theme) -> Self {
        Self {
            value,
            max,
            width: 40,
            series,
            theme,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = cells(self.value as f64, self.max as f64, self.width);
        let empty = (self.width as usize).saturating_sub(filled);

        Line::from(vec![
            Span::styled(repeat(FILLED_CHAR, filled), self.theme.series_style(self.series)),
            Span::styled(repeat(EMPTY_CHAR, empty), self.theme.bar_empty),
            Span::styled(format!(" {}", format_count(self.value)), self.theme.value),
        ])
    }
}

// ── StackedBar ───────────────────────────────────────────────────────────────

/// One row of a stacked bar chart.
///
/// Each `(series, value)` segment is drawn in its series colour; the whole
/// bar is scaled against `scale` (the largest stack in the chart) so bars of
/// different rows are comparable.
pub struct StackedBar<'a> {
    pub segments: Vec<(usize, u64)>,
    pub scale: u64,
    pub width: u16,
    pub theme: &'a Theme,
}

impl<'a> StackedBar<'a> {
    pub fn new(segments: Vec<(usize, u64)>, scale: u64, theme: &'a Theme) -> Self {
        Self {
            segments,
            scale,
            width: 40,
            theme,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn total(&self) -> u64 {
        self.segments.iter().map(|(_, v)| v).sum()
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans: Vec<Span<'a>> = Vec::new();
        let mut used = 0usize;

        // Cumulative rounding keeps the total width faithful to the total.
        let mut running = 0u64;
        for (series, value) in &self.segments {
            running += value;
            let end = cells(running as f64, self.scale as f64, self.width);
            let n = end.saturating_sub(used);
            if n > 0 {
                spans.push(Span::styled(
                    repeat(FILLED_CHAR, n),
                    self.theme.series_style(*series),
                ));
                used = end;
            }
        }

        spans.push(Span::styled(
            repeat(EMPTY_CHAR, (self.width as usize).saturating_sub(used)),
            self.theme.bar_empty,
        ));
        spans.push(Span::styled(
            format!(" {}", format_count(self.total())),
            self.theme.value,
        ));

        Line::from(spans)
    }
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// A proportional multi-coloured bar showing each label's share of a whole,
/// followed by `label: NN%` captions.
pub struct ShareBar<'a> {
    /// `(label, count)` pairs in display order.
    pub parts: Vec<(String, u64)>,
    pub width: u16,
    pub theme: &'a Theme,
}

impl<'a> ShareBar<'a> {
    pub fn new(parts: Vec<(String, u64)>, theme: &'a Theme) -> Self {
        Self {
            parts,
            width: 50,
            theme,
        }
    }

    /// Percentage share of each part, one decimal.
    pub fn shares(&self) -> Vec<(String, f64)> {
        let whole: u64 = self.parts.iter().map(|(_, c)| c).sum();
        self.parts
            .iter()
            .map(|(label, count)| (label.clone(), percentage(*count as f64, whole as f64, 1)))
            .collect()
    }

    pub fn to_line(&self) -> Line<'a> {
        let shares = self.shares();
        let mut spans: Vec<Span<'a>> = Vec::new();

        for (i, (_, pct)) in shares.iter().enumerate() {
            let n = cells(*pct, 100.0, self.width);
            if n > 0 {
                spans.push(Span::styled(repeat(FILLED_CHAR, n), self.theme.series_style(i)));
            }
        }

        spans.push(Span::raw(" "));

        for (i, (label, pct)) in shares.iter().enumerate() {
            if *pct > 0.0 {
                spans.push(Span::styled(
                    format!("{}: {:.0}% ", label, pct),
                    self.theme.series_style(i),
                ));
            }
        }

        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
