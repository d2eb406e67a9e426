use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use scanner_core::Msg;
use scanner_logging::scanner_warn;

/// One line typed (or piped) into the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Quit,
    Unknown(String),
}

/// Maps a line to an intent; any other non-empty line is a decoded code, as
/// sent by keyboard-wedge barcode readers. Such readers send one line per
/// scan, so they need `scan.threshold: 1` to be accepted on the first read.
pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let input = match line {
        ":start" | ":s" => Input::Msg(Msg::StartClicked),
        ":stop" | ":x" => Input::Msg(Msg::StopClicked),
        ":clear" => Input::Msg(Msg::ClearCatalogClicked),
        ":quit" | ":q" => Input::Quit,
        other if other.starts_with(':') => Input::Unknown(other.to_string()),
        code => Input::Msg(Msg::CodeDetected(code.to_string())),
    };
    Some(input)
}

/// Reads stdin on a background thread. End of input is reported as `Quit`.
pub fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    scanner_warn!("Reading stdin failed: {}", err);
                    break;
                }
            };
            if let Some(input) = parse_line(&line) {
                if tx.send(input).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(Input::Quit);
    });
}
