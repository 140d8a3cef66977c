use std::io::{self, Write};

use console::Style;

use crate::chat::{Bubble, Role};

pub const PROMPT: &str = "You: ";
const RULE_WIDTH: usize = 48;
const LABEL_WIDTH: usize = 5;

/// Line-oriented stand-in for the chat page: a header, an input prompt and
/// a transcript that is redrawn in full after every exchange.
pub struct TranscriptView<W: Write> {
    out: W,
    colors: bool,
}

impl<W: Write> TranscriptView<W> {
    pub fn new(out: W, colors: bool) -> Self {
        Self { out, colors }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.colors)
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        let title_style = self.style(Style::new().cyan().bold());
        let hint_style = self.style(Style::new().dim());
        writeln!(self.out, "{}", title_style.apply_to(title))?;
        writeln!(
            self.out,
            "{}",
            hint_style.apply_to("Ask about a paper. Ctrl-D to quit.")
        )?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        let prompt_style = self.style(Style::new().green().bold());
        write!(self.out, "{}", prompt_style.apply_to(PROMPT))?;
        self.out.flush()
    }

    pub fn render(&mut self, bubbles: &[Bubble<'_>]) -> io::Result<()> {
        let rule_style = self.style(Style::new().dim());
        writeln!(self.out, "{}", rule_style.apply_to("─".repeat(RULE_WIDTH)))?;

        for bubble in bubbles {
            self.bubble(bubble)?;
            // Blank line closes each exchange.
            if bubble.is_user() {
                writeln!(self.out)?;
            }
        }

        self.out.flush()
    }

    fn bubble(&mut self, bubble: &Bubble<'_>) -> io::Result<()> {
        let (label, label_style) = match bubble.role {
            Role::User => ("You", self.style(Style::new().green().bold())),
            Role::Assistant | Role::System => ("Tutor", self.style(Style::new().cyan().bold())),
        };
        let gutter_style = self.style(Style::new().dim());

        let mut lines = bubble.content.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(
            self.out,
            "{} {} {}",
            label_style.apply_to(format!("{label:>width$}", width = LABEL_WIDTH)),
            gutter_style.apply_to("│"),
            first
        )?;
        for line in lines {
            writeln!(
                self.out,
                "{} {} {}",
                " ".repeat(LABEL_WIDTH),
                gutter_style.apply_to("│"),
                line
            )?;
        }

        Ok(())
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        let error_style = self.style(Style::new().red().bold());
        writeln!(self.out, "{} {message}", error_style.apply_to("error:"))?;
        self.out.flush()
    }
}
