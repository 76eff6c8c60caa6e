//! Interactive read-eval-print loop.

use std::io::{self, BufRead, Write};

use crate::chat::Chatbot;

/// Input that ends the session (case-insensitive)
pub const QUIT_COMMAND: &str = "quit";

/// Read queries from `input` until `quit` or end of input, answering each with `chatbot`.
///
/// Query failures are reported on `out` and the loop carries on; only I/O
/// errors on `input`/`out` end the session early.
pub async fn run_shell<R: BufRead, W: Write>(
    chatbot: &mut Chatbot,
    mut input: R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Type your queries or '{}' to exit.", QUIT_COMMAND)?;

    loop {
        write!(out, "\nQuery: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            tracing::debug!("End of input, leaving shell");
            writeln!(out)?;
            return Ok(());
        }

        let query = line.trim();
        if query.eq_ignore_ascii_case(QUIT_COMMAND) {
            return Ok(());
        }

        match chatbot.process_query(query, out).await {
            Ok(()) => writeln!(out, "\n")?,
            Err(e) => {
                tracing::error!("Query failed: {}", e);
                writeln!(out, "\nError: {}", e)?;
            }
        }
    }
}
