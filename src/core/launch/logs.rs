// ─── Game Log Relay ───
// Structured view over the game's stdout for the live log window.

use std::io::{BufRead, BufReader, Read};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// One line of game output, split into its standard fields when the line
/// follows the usual `[HH:MM:SS] [Thread/LEVEL]: message` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub time: String,
    pub thread: String,
    pub level: String,
    pub message: String,
}

pub fn parse_log_line(line: &str) -> LogRecord {
    try_parse(line).unwrap_or_else(|| LogRecord {
        time: String::new(),
        thread: String::new(),
        level: "raw".into(),
        message: line.to_string(),
    })
}

fn try_parse(line: &str) -> Option<LogRecord> {
    let rest = line.strip_prefix('[')?;
    let (time, rest) = rest.split_once("] [")?;
    let (origin, message) = rest.split_once("]: ")?;
    let (thread, level) = origin.rsplit_once('/')?;
    Some(LogRecord {
        time: time.to_string(),
        thread: thread.to_string(),
        level: level.to_string(),
        message: message.to_string(),
    })
}

/// Forward every line of `reader` as a parsed record until the stream ends
/// or the receiving side hangs up. Blocking; run on a worker thread.
pub fn relay_lines<R: Read>(reader: R, tx: &UnboundedSender<LogRecord>) {
    for line in BufReader::new(reader).lines().map_while(Result::ok) {
        if tx.send(parse_log_line(&line)).is_err() {
            break;
        }
    }
}
