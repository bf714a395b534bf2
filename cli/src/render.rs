//! Terminal output for the chat session.
//!
//! [`Renderer`] is the console: it owns the output sink, the terminal width
//! and the busy spinner, and is handed to the session explicitly.

use crate::panel::Panel;
use abacus_core::ResponseEvent;
use console::{Color, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;

const DEFAULT_WIDTH: usize = 80;

const WELCOME: &str = "🔢 Welcome to the simple calculator agent!

This agent can add and subtract.
Examples: \"Add 5 and 3\", \"Subtract 4 from 10\"";

const EXIT_HINT: &str = "To exit: 'quit', 'exit', 'q'";

struct Spinner {
    bar: Option<ProgressBar>,
    visible: bool,
}

impl Spinner {
    fn start(&mut self) {
        if self.bar.is_some() {
            return;
        }
        let bar = if self.visible {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_message("🤖 Calculating...");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };
        self.bar = Some(bar);
    }

    fn stop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

pub struct Renderer {
    out: Box<dyn Write + Send>,
    width: usize,
    styled: bool,
    spinner: Spinner,
}

impl Renderer {
    /// Renders to stdout, sized to the terminal.
    pub fn stdout() -> Self {
        let term = Term::stdout();
        let width = term
            .size_checked()
            .map(|(_, cols)| cols as usize)
            .unwrap_or(DEFAULT_WIDTH);
        Self {
            out: Box::new(io::stdout()),
            width,
            styled: console::colors_enabled(),
            spinner: Spinner {
                bar: None,
                visible: term.is_term(),
            },
        }
    }

    /// Plain output into an arbitrary sink, with a hidden spinner.
    pub fn new(out: impl Write + Send + 'static, width: usize) -> Self {
        Self {
            out: Box::new(out),
            width,
            styled: false,
            spinner: Spinner {
                bar: None,
                visible: false,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }

    fn print_panel(&mut self, panel: Panel) -> io::Result<()> {
        writeln!(self.out, "{}", panel.render(self.width, self.styled))?;
        self.out.flush()
    }

    fn dim(&self) -> Style {
        Style::new().dim().force_styling(self.styled)
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn welcome(&mut self) -> io::Result<()> {
        let hint = self.dim();
        self.print_panel(
            Panel::new("🚀 Calculator Agent")
                .text(WELCOME)
                .text("")
                .styled(EXIT_HINT, hint)
                .color(Color::Cyan)
                .centered()
                .padding(1, 2),
        )
    }

    pub fn goodbye(&mut self, interrupted: bool) -> io::Result<()> {
        let (title, color) = if interrupted {
            ("Interrupted", Color::Yellow)
        } else {
            ("Goodbye", Color::Green)
        };
        self.print_panel(
            Panel::new(title)
                .text("👋 Thank you!")
                .color(color)
                .centered()
                .padding(0, 2),
        )
    }

    pub fn turn_interrupted(&mut self) -> io::Result<()> {
        self.print_panel(
            Panel::new("Interrupted")
                .text("⏹ Response interrupted. Ask again when you're ready.")
                .color(Color::Yellow),
        )
    }

    pub fn error(&mut self, err: &anyhow::Error) -> io::Result<()> {
        self.print_panel(
            Panel::new("Error")
                .text(format!("❌ An error occurred: {err:#}"))
                .color(Color::Red),
        )
    }

    /// Assistant text and tool calls get panels, the result summary prints
    /// its cost when known, system notices are not shown.
    pub fn event(&mut self, event: &ResponseEvent) -> io::Result<()> {
        match event {
            ResponseEvent::AssistantText { text } => self.print_panel(
                Panel::new("🤖 Calculator")
                    .styled(text, Style::new().white())
                    .color(Color::Blue),
            ),
            ResponseEvent::ToolUse { name, input, .. } => {
                let label = Style::new().cyan().bold();
                let mut panel = Panel::new("🔧 Tool call").styled(format!("Tool: {name}"), label);
                if !input.is_empty() {
                    panel = panel.styled(format!("Input: {}", flatten_input(input)), self.dim());
                }
                self.print_panel(panel.color(Color::Green))
            }
            ResponseEvent::System { subtype, data } => {
                debug!("System event {}: {}", subtype, data);
                Ok(())
            }
            ResponseEvent::Result {
                total_cost_usd: Some(cost),
                ..
            } => {
                let line = self.dim().apply_to(format!("💰 Cost: ${cost:.6}"));
                writeln!(self.out, "{line}")?;
                self.out.flush()
            }
            ResponseEvent::Result { .. } => Ok(()),
        }
    }

    pub fn spinner_start(&mut self) {
        self.spinner.start();
    }

    pub fn spinner_stop(&mut self) {
        self.spinner.stop();
    }

    pub fn spinner_active(&self) -> bool {
        self.spinner.bar.is_some()
    }
}

/// `a=5, b=3`, with strings shown unquoted.
pub fn flatten_input(input: &serde_json::Map<String, Value>) -> String {
    input
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The panel shown on stderr when the program cannot continue.
pub fn fatal_panel(err: &anyhow::Error) -> String {
    let term = Term::stderr();
    let width = term
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(DEFAULT_WIDTH);
    Panel::new("Fatal error")
        .text(format!("❌ Unexpected error: {err:#}"))
        .color(Color::Red)
        .render(width, console::colors_enabled_stderr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn renderer() -> (Renderer, Buffer) {
        let buffer = Buffer::default();
        (Renderer::new(buffer.clone(), 60), buffer)
    }

    #[test]
    fn assistant_text_is_boxed() {
        let (mut renderer, buffer) = renderer();
        renderer
            .event(&ResponseEvent::AssistantText {
                text: "5 + 3 = 8".into(),
            })
            .unwrap();
        let out = buffer.contents();
        assert!(out.contains("🤖 Calculator"));
        assert!(out.contains("│ 5 + 3 = 8"));
    }

    #[test]
    fn tool_use_lists_name_and_arguments() {
        let (mut renderer, buffer) = renderer();
        let input = json!({"a": 5, "b": 3}).as_object().unwrap().clone();
        renderer
            .event(&ResponseEvent::ToolUse {
                id: "call_1".into(),
                name: "mcp__calculator__add".into(),
                input,
            })
            .unwrap();
        let out = buffer.contents();
        assert!(out.contains("🔧 Tool call"));
        assert!(out.contains("Tool: mcp__calculator__add"));
        assert!(out.contains("Input: a=5, b=3"));
    }

    #[test]
    fn system_events_are_silent() {
        let (mut renderer, buffer) = renderer();
        renderer
            .event(&ResponseEvent::System {
                subtype: "init".into(),
                data: json!({}),
            })
            .unwrap();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn cost_is_printed_only_when_known() {
        let (mut renderer, buffer) = renderer();
        let result = |cost| ResponseEvent::Result {
            session_id: "s".into(),
            num_turns: 1,
            duration_ms: 5,
            usage: Default::default(),
            total_cost_usd: cost,
            is_error: false,
        };
        renderer.event(&result(None)).unwrap();
        assert!(buffer.contents().is_empty());
        renderer.event(&result(Some(0.000123))).unwrap();
        assert_eq!(buffer.contents(), "💰 Cost: $0.000123\n");
    }

    #[test]
    fn flatten_keeps_strings_bare() {
        let input = json!({"a": 1.5, "b": "x", "c": null})
            .as_object()
            .unwrap()
            .clone();
        assert_eq!(flatten_input(&input), "a=1.5, b=x, c=null");
    }

    #[test]
    fn spinner_tracks_state_when_hidden() {
        let (mut renderer, _) = renderer();
        assert!(!renderer.spinner_active());
        renderer.spinner_start();
        renderer.spinner_start();
        assert!(renderer.spinner_active());
        renderer.spinner_stop();
        assert!(!renderer.spinner_active());
    }
}
