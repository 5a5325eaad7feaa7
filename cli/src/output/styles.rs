//! Glyphs and colors for terminal lines.

use owo_colors::Style;

/// Kind of a progress line. Selects its glyph and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Step,
    Ok,
    Warn,
    Fail,
    Note,
}

impl Mark {
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Step => "→",
            Self::Ok => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
            Self::Note => "ℹ",
        }
    }
}

/// Styles in use. All plain until [`Styles::colorize`] is called.
#[derive(Default, Clone)]
pub struct Styles {
    pub step: Style,
    pub ok: Style,
    pub warn: Style,
    pub fail: Style,
    /// Section headings (`Target ...`, `Configuration ...`).
    pub heading: Style,
    pub emphasis: Style,
}

impl Styles {
    /// Switch every style to its colored form.
    pub fn colorize(&mut self) {
        self.step = Style::new().cyan();
        self.ok = Style::new().green();
        self.warn = Style::new().yellow();
        self.fail = Style::new().red().bold();
        self.heading = Style::new().bold().cyan();
        self.emphasis = Style::new().bold();
    }

    #[must_use]
    pub fn for_mark(&self, mark: Mark) -> Style {
        match mark {
            Mark::Step | Mark::Note => self.step,
            Mark::Ok => self.ok,
            Mark::Warn => self.warn,
            Mark::Fail => self.fail,
        }
    }
}
