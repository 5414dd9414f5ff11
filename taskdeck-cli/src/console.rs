use anyhow::Result;
use std::fmt::Display;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::i18n::{Language, Msg};

/// Line-oriented terminal I/O. Generic so the shell can be driven from a
/// script in tests.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

pub type StdConsole = Console<BufReader<Stdin>, std::io::Stdout>;

pub fn stdio() -> StdConsole {
    Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// `None` on end of input.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    /// Print `prefix` without a newline and read the answer.
    pub async fn ask(&mut self, prefix: &str) -> Result<Option<String>> {
        write!(self.out, "{prefix}")?;
        self.out.flush()?;
        self.read_line().await
    }

    pub async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.ask(&format!("{label}: ")).await
    }

    /// Yes/no question defaulting to no.
    pub async fn confirm(&mut self, lang: Language, question: &str) -> Result<bool> {
        let answer = self
            .ask(&format!("{question} {} ", lang.t(Msg::ConfirmHint)))
            .await?;
        Ok(answer.is_some_and(|a| lang.is_yes(&a)))
    }

    pub fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn prompt_writes_label_and_reads_answer() {
        let mut c = console("Buy milk\n");
        assert_eq!(c.prompt("Title").await.unwrap().as_deref(), Some("Buy milk"));
        assert_eq!(c.read_line().await.unwrap(), None);
        assert_eq!(String::from_utf8_lossy(c.output()), "Title: ");
    }

    #[tokio::test]
    async fn confirm_defaults_to_no() {
        let mut c = console("\ns\n");
        assert!(!c.confirm(Language::Es, "¿Seguro?").await.unwrap());
        assert!(c.confirm(Language::Es, "¿Seguro?").await.unwrap());
        assert!(!c.confirm(Language::Es, "¿Seguro?").await.unwrap());
    }
}
