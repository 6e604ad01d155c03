//! Console input/output for commands.
//!
//! Command output uses a small inline markup (`<b>`, `<info>`, `<question>`, `<ok>`,
//! `<comment>`, `<error>`). The terminal renders it as colors; anything headed for the
//! log goes through [`strip_markup`] first.

use crate::error::Result;
use colored::Colorize;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::sync::OnceLock;
use tracing::info;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[a-z/]+>").expect("tag pattern is valid"))
}

/// Removes every markup tag (`<[a-z/]+>`) from `text`.
pub fn strip_markup(text: &str) -> String {
    tag_regex().replace_all(text, "").into_owned()
}

fn apply_style(segment: &str, tags: &[&str]) -> String {
    let mut styled = segment.normal();
    for tag in tags {
        styled = match *tag {
            "b" => styled.bold(),
            "info" => styled.green(),
            "question" => styled.cyan(),
            "ok" => styled.green().bold(),
            "comment" => styled.yellow(),
            "error" => styled.red(),
            _ => styled,
        };
    }
    styled.to_string()
}

/// Turns markup into ANSI-styled text. Nested tags combine; unknown tags are dropped.
///
/// With `colors` off this is the same as [`strip_markup`].
pub fn render_markup(text: &str, colors: bool) -> String {
    if !colors {
        return strip_markup(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&str> = Vec::new();
    let mut last = 0;

    for tag in tag_regex().find_iter(text) {
        let segment = &text[last..tag.start()];
        if !segment.is_empty() {
            out.push_str(&apply_style(segment, &open));
        }
        last = tag.end();

        let name = &text[tag.start() + 1..tag.end() - 1];
        match name.strip_prefix('/') {
            Some(closing) => {
                if let Some(pos) = open.iter().rposition(|t| *t == closing) {
                    open.remove(pos);
                }
            },
            None => open.push(name),
        }
    }

    let rest = &text[last..];
    if !rest.is_empty() {
        out.push_str(&apply_style(rest, &open));
    }
    out
}

/// Line-oriented console used by commands.
pub trait ConsoleIo {
    /// Writes `text` (with markup), followed by a newline when `newline` is set.
    fn write(&mut self, text: &str, newline: bool) -> Result<()>;

    /// Reads one line of input, without the trailing line break. End of input yields `""`.
    fn read_line(&mut self) -> Result<String>;
}

/// Where `log_out` messages end up.
pub trait LogSink {
    fn info(&self, message: &str);
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn info(&self, message: &str) {
        info!(target: "tracker", "{}", message);
    }
}

/// The process's stdin/stdout.
#[derive(Debug)]
pub struct Terminal {
    colors: bool,
}

impl Terminal {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }
}

impl ConsoleIo for Terminal {
    fn write(&mut self, text: &str, newline: bool) -> Result<()> {
        let rendered = render_markup(text, self.colors);
        let mut stdout = io::stdout().lock();
        if newline {
            writeln!(stdout, "{}", rendered)?;
        } else {
            write!(stdout, "{}", rendered)?;
            stdout.flush()?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        read_answer(&mut io::stdin().lock())
    }
}

/// Reads one line from `reader` without its line ending.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so garbage input reaches
/// the caller as text that does not parse as a number.
pub fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf)?;
    Ok(String::from_utf8_lossy(&buf)
        .trim_end_matches(['\r', '\n'])
        .to_string())
}

/// In-memory console and log doubles for tests.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records written lines (raw markup) and serves scripted input.
    #[derive(Debug, Default)]
    pub struct BufferedConsole {
        pub output: String,
        pub inputs: VecDeque<String>,
        pub reads: usize,
    }

    impl BufferedConsole {
        pub fn with_input(lines: &[&str]) -> Self {
            Self {
                inputs: lines.iter().map(|l| l.to_string()).collect(),
                ..Self::default()
            }
        }

        /// Output with markup removed.
        pub fn plain_output(&self) -> String {
            strip_markup(&self.output)
        }
    }

    impl ConsoleIo for BufferedConsole {
        fn write(&mut self, text: &str, newline: bool) -> Result<()> {
            self.output.push_str(text);
            if newline {
                self.output.push('\n');
            }
            Ok(())
        }

        fn read_line(&mut self) -> Result<String> {
            self.reads += 1;
            Ok(self.inputs.pop_front().unwrap_or_default())
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingLog {
        pub messages: RefCell<Vec<String>>,
    }

    impl RecordingLog {
        pub fn messages(&self) -> Vec<String> {
            self.messages.borrow().clone()
        }
    }

    impl LogSink for RecordingLog {
        fn info(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }
}
