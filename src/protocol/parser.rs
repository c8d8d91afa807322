//! Line Framing and Command Tokenization
//!
//! The wire protocol is newline-terminated text. TCP delivers it in
//! arbitrary chunks, so framing and parsing are kept separate:
//!
//! 1. [`next_line`] extracts the first complete line from a connection's
//!    inbound accumulator, leaving any unterminated tail buffered. It is a
//!    pure function of the buffer — no hidden state.
//! 2. [`parse`] splits one line on whitespace into a [`Command`]: the
//!    first token is the name (normalized to upper case), the rest are
//!    positional arguments. There is no quoting; embedded spaces split
//!    arguments.
//!
//! ```text
//! "set name ariel\nget na"  ──next_line──▶  "set name ariel"   + "get na" buffered
//!        "set name ariel"   ──parse──────▶  Command { name: "SET", args: ["name", "ariel"] }
//! ```

use bytes::BytesMut;

/// A parsed request: a command name plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command name, upper-cased.
    pub name: String,
    /// The remaining whitespace-separated tokens, in order.
    pub args: Vec<String>,
}

/// Extracts the first complete newline-terminated line from `buf`.
///
/// The line and its terminator are consumed from the buffer; leftover bytes
/// stay put for the next receive. A trailing `\r` (telnet-style `\r\n`) is
/// stripped. Returns `None` while no full line is buffered.
pub fn next_line(buf: &mut BytesMut) -> Option<String> {
    let pos = buf.iter().position(|&b| b == b'\n')?;
    let line = buf.split_to(pos + 1);

    let mut line = &line[..pos];
    if line.last() == Some(&b'\r') {
        line = &line[..line.len() - 1];
    }

    Some(String::from_utf8_lossy(line).into_owned())
}

/// Tokenizes one line into a [`Command`].
///
/// Returns `None` for a blank or whitespace-only line.
pub fn parse(line: &str) -> Option<Command> {
    let mut tokens = line.split_whitespace();

    let name = tokens.next()?.to_uppercase();
    let args = tokens.map(str::to_string).collect();

    Some(Command { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let cmd = parse("SET name ariel").unwrap();
        assert_eq!(cmd.name, "SET");
        assert_eq!(cmd.args, vec!["name", "ariel"]);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let cmd = parse("set name ariel").unwrap();
        assert_eq!(cmd.name, "SET");

        let cmd = parse("hGeT h f").unwrap();
        assert_eq!(cmd.name, "HGET");
        // Arguments keep their case.
        assert_eq!(cmd.args, vec!["h", "f"]);
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let cmd = parse("  get \t key  ").unwrap();
        assert_eq!(cmd.name, "GET");
        assert_eq!(cmd.args, vec!["key"]);
    }

    #[test]
    fn test_parse_no_quoting() {
        // Embedded spaces split arguments; there is no quoting.
        let cmd = parse("set greeting \"hello world\"").unwrap();
        assert_eq!(cmd.args, vec!["greeting", "\"hello", "world\""]);
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \t "), None);
    }

    #[test]
    fn test_next_line_extracts_first_line() {
        let mut buf = BytesMut::from(&b"GET a\nGET b\n"[..]);

        assert_eq!(next_line(&mut buf), Some("GET a".to_string()));
        assert_eq!(next_line(&mut buf), Some("GET b".to_string()));
        assert_eq!(next_line(&mut buf), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_next_line_keeps_partial_tail() {
        let mut buf = BytesMut::from(&b"GET a\nGET parti"[..]);

        assert_eq!(next_line(&mut buf), Some("GET a".to_string()));
        assert_eq!(next_line(&mut buf), None);
        assert_eq!(&buf[..], b"GET parti");

        // The rest of the command arrives in a later chunk.
        buf.extend_from_slice(b"al\n");
        assert_eq!(next_line(&mut buf), Some("GET partial".to_string()));
    }

    #[test]
    fn test_next_line_incomplete() {
        let mut buf = BytesMut::from(&b"no newline yet"[..]);
        assert_eq!(next_line(&mut buf), None);
        assert_eq!(&buf[..], b"no newline yet");
    }

    #[test]
    fn test_next_line_strips_carriage_return() {
        let mut buf = BytesMut::from(&b"SET a 1\r\n"[..]);
        assert_eq!(next_line(&mut buf), Some("SET a 1".to_string()));
    }

    #[test]
    fn test_next_line_empty_line() {
        let mut buf = BytesMut::from(&b"\n"[..]);
        assert_eq!(next_line(&mut buf), Some(String::new()));
    }
}
