//! Line-oriented terminal I/O.
//!
//! `Prompter` reads answers from any `BufRead` and writes to any `Write`, so
//! the menu runs the same against a real terminal or an in-memory script.
//! Terminal-only niceties (clearing, colors, masked passwords) are switched
//! on with [`Prompter::terminal`].

use std::{
    fmt::Display,
    io::{BufRead, Write},
    str::FromStr,
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::{Color, Print, Stylize},
    terminal::{self, ClearType},
};

use crate::error::{AppError, Result};

pub struct Prompter<R, W> {
    input: R,
    output: W,
    terminal: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            terminal: false,
        }
    }

    pub fn terminal(mut self, on: bool) -> Self {
        self.terminal = on;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Print `line` in `color` when attached to a terminal, plain otherwise.
    pub fn say_colored(&mut self, line: impl Display, color: Color) -> Result<()> {
        if self.terminal {
            let styled = line.to_string().with(color);
            writeln!(self.output, "{styled}")?;
        } else {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.terminal {
            execute!(
                self.output,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }
        Ok(())
    }

    /// Ask for one line; the answer is trimmed.
    pub fn line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.output)?;
            return Err(AppError::Interrupted);
        }
        Ok(buf.trim().to_string())
    }

    /// Ask until the answer parses as `T`.
    ///
    /// An empty answer yields `default` when one is given.
    pub fn parse<T>(&mut self, prompt: &str, default: Option<T>) -> Result<T>
    where
        T: FromStr + Display + Copy,
        T::Err: Display,
    {
        let prompt = match default {
            Some(value) => format!("{prompt} [{value}]"),
            None => prompt.to_string(),
        };
        loop {
            let answer = self.line(&prompt)?;
            if answer.is_empty()
                && let Some(value) = default
            {
                return Ok(value);
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(err) => self.say(format!("{err}, try again."))?,
            }
        }
    }

    /// Ask for a password.
    ///
    /// On a terminal the typed characters are echoed as `*`; otherwise the
    /// next input line is used.
    pub fn password(&mut self, prompt: &str) -> Result<String> {
        if self.terminal {
            self.output.flush()?;
            read_masked(&format!("{prompt}: "))
        } else {
            let mut buf = String::new();
            write!(self.output, "{prompt}: ")?;
            self.output.flush()?;
            if self.input.read_line(&mut buf)? == 0 {
                writeln!(self.output)?;
                return Err(AppError::Interrupted);
            }
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_masked(prompt: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stdout();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c' | 'd') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Interrupted);
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use engine::Money;

    use super::*;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn printed(p: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.output().clone()).unwrap()
    }

    #[test]
    fn line_trims_answer_and_echoes_prompt() {
        let mut p = prompter("  alice \n");
        assert_eq!(p.line("Enter a username").unwrap(), "alice");
        assert_eq!(printed(&p), "Enter a username: ");
    }

    #[test]
    fn end_of_input_is_interrupted() {
        let mut p = prompter("");
        assert!(matches!(p.line("Anything"), Err(AppError::Interrupted)));
        assert!(matches!(p.password("Password"), Err(AppError::Interrupted)));
    }

    #[test]
    fn parse_reprompts_until_valid() {
        let mut p = prompter("ten\n12.345\n10.50\n");
        let amount: Money = p.parse("Amount to deposit", None).unwrap();
        assert_eq!(amount, Money::new(1050));
        let out = printed(&p);
        assert_eq!(out.matches("Amount to deposit: ").count(), 3);
        assert!(out.contains("try again"));
    }

    #[test]
    fn parse_uses_default_on_empty_answer() {
        let mut p = prompter("\n");
        let amount = p.parse("Opening balance", Some(Money::ZERO)).unwrap();
        assert_eq!(amount, Money::ZERO);
        assert!(printed(&p).starts_with("Opening balance [£0.00]: "));
    }

    #[test]
    fn password_keeps_inner_spaces_when_not_a_terminal() {
        let mut p = prompter(" pass word \n");
        assert_eq!(p.password("Password").unwrap(), " pass word ");
    }

    #[test]
    fn colors_only_on_terminal() {
        let mut p = prompter("");
        p.say_colored("plain", Color::Red).unwrap();
        assert_eq!(printed(&p), "plain\n");
    }
}
