//! Diagnostic output.
//!
//! Diagnostics are single lines prefixed with `info string debug ` or
//! `info string error `, so they can be told apart from normal output.
//! Debug lines are only written when the caller's debug flag is set.

use std::io::{self, Write};

const DEBUG_PREFIX: &str = "info string debug ";
const ERROR_PREFIX: &str = "info string error ";

/// Write a debug line to stdout if `can_debug` is true.
pub fn debug(can_debug: bool, s: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    debug_to(&mut handle, can_debug, s)
}

/// Write an error line to stdout.
pub fn error(s: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    error_to(&mut handle, s)
}

/// Write a debug line to `writer` if `can_debug` is true.
pub fn debug_to<W: Write>(writer: &mut W, can_debug: bool, s: &str) -> io::Result<()> {
    if can_debug {
        write_line(writer, DEBUG_PREFIX, s)
    } else {
        Ok(())
    }
}

/// Write an error line to `writer`.
pub fn error_to<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    write_line(writer, ERROR_PREFIX, s)
}

fn write_line<W: Write>(writer: &mut W, prefix: &str, s: &str) -> io::Result<()> {
    let mut line = String::with_capacity(prefix.len() + s.len() + 1);
    line.push_str(prefix);
    line.push_str(s);
    line.push('\n');

    writer.write_all(line.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_respects_flag() {
        let mut out = Vec::new();
        debug_to(&mut out, false, "hidden").unwrap();
        assert!(out.is_empty());

        debug_to(&mut out, true, "computer thinking").unwrap();
        assert_eq!(out, b"info string debug computer thinking\n");
    }

    #[test]
    fn error_always_writes() {
        let mut out = Vec::new();
        error_to(&mut out, "Computer move failed").unwrap();
        assert_eq!(out, b"info string error Computer move failed\n");
    }
}
