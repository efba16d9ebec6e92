//! Line-oriented prompts

use std::io::{self, BufRead, Write};

pub const MODE_PROMPT: &str =
    "Mode [1] Single video  [2] Playlist  [3] Batch file  [4] Exit: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Playlist,
    Batch,
    Exit,
}

impl Mode {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Mode::Single),
            "2" => Some(Mode::Playlist),
            "3" => Some(Mode::Batch),
            "4" => Some(Mode::Exit),
            _ => None,
        }
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line. `None` at end of input.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("1"), Some(Mode::Single));
        assert_eq!(Mode::parse(" 2 "), Some(Mode::Playlist));
        assert_eq!(Mode::parse("3"), Some(Mode::Batch));
        assert_eq!(Mode::parse("4"), Some(Mode::Exit));
        assert_eq!(Mode::parse(""), None);
        assert_eq!(Mode::parse("5"), None);
        assert_eq!(Mode::parse("single"), None);
    }

    #[test]
    fn test_ask_reads_lines_until_eof() {
        let mut out = Vec::new();
        {
            let mut prompter = Prompter::new(Cursor::new("  45 \n\n"), &mut out);
            assert_eq!(prompter.ask("Clip? ").unwrap().as_deref(), Some("45"));
            assert_eq!(prompter.ask("Mode? ").unwrap().as_deref(), Some(""));
            assert_eq!(prompter.ask("Again? ").unwrap(), None);
        }
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.starts_with("Clip? Mode? Again? "));
    }
}
