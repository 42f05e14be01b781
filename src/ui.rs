use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};

const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Heading,
    Success,
    Info,
    Warn,
    Error,
}

fn style_for(kind: StatusKind) -> Style {
    let style = Style::new().bold();
    match kind {
        StatusKind::Heading => style.fg_color(Some(AnsiColor::Cyan.into())),
        StatusKind::Success => style.fg_color(Some(AnsiColor::Green.into())),
        StatusKind::Info => style.fg_color(Some(AnsiColor::Blue.into())),
        StatusKind::Warn => style.fg_color(Some(AnsiColor::Yellow.into())),
        StatusKind::Error => style.fg_color(Some(AnsiColor::Red.into())),
    }
}

/// Colors text when the destination stream can show it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none())
    }

    pub fn paint(&self, kind: StatusKind, text: impl Display) -> String {
        if self.enabled {
            let style = style_for(kind);
            format!("{}{text}{}", style.render(), style.render_reset())
        } else {
            text.to_string()
        }
    }
}

// Status lines always go to stderr: stdout carries statements for the shell.
fn write_status(kind: StatusKind, label: &str, message: &str) {
    let palette = Palette::stderr();
    let mut handle = io::stderr().lock();

    let padded_label = format!("{:>width$}", label, width = STATUS_WIDTH);
    let padded_label = palette.paint(kind, padded_label);

    for (idx, line) in message.split('\n').enumerate() {
        if idx == 0 {
            let _ = writeln!(handle, "{padded_label} {line}");
        } else {
            let _ = writeln!(handle, "{:>width$} {line}", "", width = STATUS_WIDTH);
        }
    }
    let _ = handle.flush();
}

pub fn info(message: impl Display) {
    write_status(StatusKind::Info, "Info", &message.to_string());
}

pub fn warn(message: impl Display) {
    write_status(StatusKind::Warn, "Warning", &message.to_string());
}

pub fn error(message: impl Display) {
    write_status(StatusKind::Error, "Error", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    write_status(StatusKind::Success, label, &message.to_string());
}
