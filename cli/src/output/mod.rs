//! Terminal output: marked progress lines, headings, and the renderers in
//! [`human`].
//!
//! Everything goes to stdout except failures, which go to stderr and are
//! printed even with `--quiet`.

pub mod human;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::{Mark, Styles};

/// Styling and verbosity shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// Print failures only.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used on a terminal unless `--no-color` or `NO_COLOR` is set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let mut styles = Styles::default();
        if !no_color && std::env::var_os("NO_COLOR").is_none() && Term::stdout().is_term() {
            styles.colorize();
        }
        Self { styles, quiet }
    }

    /// Print `msg` behind the glyph for `mark`.
    pub fn line(&self, mark: Mark, msg: &str) {
        let glyph = mark.glyph();
        let glyph = glyph.style(self.styles.for_mark(mark));
        if mark == Mark::Fail {
            eprintln!("  {glyph} {msg}");
        } else if !self.quiet {
            println!("  {glyph} {msg}");
        }
    }

    pub fn step(&self, msg: &str) {
        self.line(Mark::Step, msg);
    }

    pub fn success(&self, msg: &str) {
        self.line(Mark::Ok, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line(Mark::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.line(Mark::Fail, msg);
    }

    pub fn info(&self, msg: &str) {
        self.line(Mark::Note, msg);
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.heading));
        }
    }
}
