//! Masked secret input.
//!
//! The terminal is switched to raw mode for exactly one line. Bytes are read
//! one at a time and every accepted character is echoed as `*`. Raw mode is
//! held by a guard, so it is restored on success, interrupt, EOF and error.

use std::io::{self, BufRead, IsTerminal, Read, Write};

use tracing::debug;

use crate::error::{RegisterError, RegisterResult};

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;
const ESC: u8 = 0x1b;

/// Where we are inside a terminal escape sequence (arrow keys, F-keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Start,
    /// `ESC [` ... up to a final byte in `@`..=`~`.
    Csi,
    /// `ESC O` plus one byte.
    Ss3,
}

/// Something that can hand us one secret value per call.
pub trait SecretSource {
    /// Show `label` and return the captured value, trimmed.
    fn read_secret(&mut self, label: &str) -> RegisterResult<String>;
}

/// Drive the masking state machine over `input`, echoing masks to `echo`.
///
/// `\r`/`\n` and Ctrl-D/EOF commit, Ctrl-C aborts, backspace/delete erase one
/// character, printable ASCII is buffered. Escape sequences and other bytes
/// are ignored.
pub fn read_masked<R: Read, W: Write>(input: &mut R, echo: &mut W) -> RegisterResult<String> {
    let mut buf = String::new();
    let mut byte = [0u8; 1];
    let mut escape = Escape::None;
    loop {
        let n = match input.read(&mut byte) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(RegisterError::secret_input(format!(
                    "failed to read input: {e}"
                )));
            }
        };
        if n == 0 {
            break;
        }
        let b = byte[0];
        // Control bytes always act, even mid-sequence.
        if b >= 0x20 {
            match escape {
                Escape::None => {}
                Escape::Start => {
                    escape = match b {
                        b'[' => Escape::Csi,
                        b'O' => Escape::Ss3,
                        _ => Escape::None,
                    };
                    continue;
                }
                Escape::Csi => {
                    if (0x40..=0x7e).contains(&b) {
                        escape = Escape::None;
                    }
                    continue;
                }
                Escape::Ss3 => {
                    escape = Escape::None;
                    continue;
                }
            }
        } else {
            escape = Escape::None;
        }
        match b {
            ESC => escape = Escape::Start,
            b'\r' | b'\n' | CTRL_D => break,
            CTRL_C => {
                write_echo(echo, b"\r\n");
                return Err(RegisterError::secret_input("interrupted"));
            }
            BACKSPACE | DELETE => {
                if buf.pop().is_some() {
                    write_echo(echo, b"\x08 \x08");
                }
            }
            b @ 0x20..=0x7e => {
                buf.push(char::from(b));
                write_echo(echo, b"*");
            }
            _ => {}
        }
    }
    write_echo(echo, b"\r\n");
    Ok(buf.trim().to_string())
}

fn write_echo<W: Write>(echo: &mut W, bytes: &[u8]) {
    // Echo is cosmetic; a closed stderr must not lose the typed secret.
    let _ = echo.write_all(bytes).and_then(|_| echo.flush());
}

/// Raw terminal mode for as long as the guard lives.
#[derive(Debug)]
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(RawModeGuard(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            debug!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Prompts on the controlling terminal (label and masks on stderr).
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl SecretSource for TerminalPrompter {
    fn read_secret(&mut self, label: &str) -> RegisterResult<String> {
        let mut err = io::stderr();
        write_echo(&mut err, format!("{label}: ").as_bytes());

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            debug!("stdin is not a terminal; reading one plain line");
            let mut line = String::new();
            stdin
                .lock()
                .read_line(&mut line)
                .map_err(|e| RegisterError::secret_input(format!("failed to read input: {e}")))?;
            write_echo(&mut err, b"\n");
            return Ok(line.trim().to_string());
        }

        match RawModeGuard::acquire() {
            Ok(guard) => {
                let result = read_masked(&mut stdin.lock(), &mut err);
                drop(guard);
                result
            }
            Err(e) => {
                debug!(error = %e, "raw mode unavailable; using secure line read");
                console::Term::stderr()
                    .read_secure_line()
                    .map(|s| s.trim().to_string())
                    .map_err(|e| RegisterError::secret_input(format!("failed to read input: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8]) -> (RegisterResult<String>, String) {
        let mut reader = input;
        let mut echo = Vec::new();
        let result = read_masked(&mut reader, &mut echo);
        (result, String::from_utf8(echo).unwrap())
    }

    #[test]
    fn enter_commits_with_masked_echo() {
        let (res, echo) = run(b"abc\rignored");
        assert_eq!(res.unwrap(), "abc");
        assert_eq!(echo, "***\r\n");
    }

    #[test]
    fn newline_also_commits() {
        let (res, _) = run(b"tok\n");
        assert_eq!(res.unwrap(), "tok");
    }

    #[test]
    fn ctrl_c_interrupts() {
        let (res, _) = run(b"ab\x03cd\r");
        assert_eq!(res.unwrap_err(), RegisterError::secret_input("interrupted"));
    }

    #[test]
    fn eof_and_ctrl_d_commit_partial_input() {
        assert_eq!(run(b"partial").0.unwrap(), "partial");
        assert_eq!(run(b"xy\x04z").0.unwrap(), "xy");
    }

    #[test]
    fn backspace_and_delete_erase() {
        let (res, echo) = run(b"abx\x7fc\x08d\r");
        assert_eq!(res.unwrap(), "abd");
        assert_eq!(echo, "***\x08 \x08*\x08 \x08*\r\n");
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let (res, echo) = run(b"\x08\x7fa\r");
        assert_eq!(res.unwrap(), "a");
        assert_eq!(echo, "*\r\n");
    }

    #[test]
    fn non_printable_and_non_ascii_ignored_and_trimmed() {
        let (res, _) = run(b"  k\x1b\xc3\xa9y  \r");
        assert_eq!(res.unwrap(), "ky");
    }

    #[test]
    fn arrow_and_function_keys_are_skipped() {
        let (res, echo) = run(b"ab\x1b[Ac\x1b[1;5Dd\x1bOPe\r");
        assert_eq!(res.unwrap(), "abcde");
        assert_eq!(echo, "*****\r\n");
    }

    #[test]
    fn enter_after_lone_escape_still_commits() {
        assert_eq!(run(b"x\x1b\ry").0.unwrap(), "x");
    }

    #[test]
    fn empty_line_returns_empty_string() {
        assert_eq!(run(b"\r").0.unwrap(), "");
    }
}
