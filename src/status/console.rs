use std::io::{self, Write};

use ansi_term::{Colour, Style};
use tracing::warn;

use super::{
    format::{format_seconds, ERROR_LABEL, PLACEHOLDER_LABEL},
    StatusPresenter,
};

/// Prints one status line per refresh to stdout.
pub struct ConsolePresenter {
    colored: bool,
}

impl ConsolePresenter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn show_placeholder(&self) {
        self.print(PLACEHOLDER_LABEL.to_string());
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn print(&self, line: String) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
            warn!("Couldn't write status {e}");
        }
    }
}

impl StatusPresenter for ConsolePresenter {
    fn on_activity_time(&self, seconds: f64, increased: bool) {
        let style = if increased {
            Colour::Green.bold()
        } else {
            Style::new()
        };
        self.print(self.paint(style, &format_seconds(seconds)));
    }

    fn on_connection_error(&self, message: &str) {
        self.print(format!(
            "{} {}",
            self.paint(Colour::Red.bold(), ERROR_LABEL),
            self.paint(Colour::Red.normal(), message)
        ));
    }
}
