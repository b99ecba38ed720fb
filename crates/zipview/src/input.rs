//! Input routing: one command per line on stdin

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use zipcache::Command;

/// Map one input line to a navigation command
///
/// `click X WIDTH` steps right when the click lands in the right half.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    let mut words = line.split_whitespace();

    let command = match words.next() {
        None => Some(Command::Right),
        Some("h" | "left" | "p" | "prev" | "k") => Some(Command::Left),
        Some("l" | "right" | "n" | "next" | "j") => Some(Command::Right),
        Some("r" | "resize") => Some(Command::Resize),
        Some("q" | "quit" | "exit") => Some(Command::Quit),
        Some("click") => parse_click(words.next(), words.next()),
        Some(_) => None,
    };

    if command.is_none() {
        warn!(input = %line, "unrecognised command");
    }
    command
}

fn parse_click(x: Option<&str>, width: Option<&str>) -> Option<Command> {
    let x: u64 = x?.parse().ok()?;
    let width: u64 = width?.parse().ok()?;
    if x.saturating_mul(2) > width {
        Some(Command::Right)
    } else {
        Some(Command::Left)
    }
}

/// Forward parsed lines until `Quit`, end of input, or a closed receiver
///
/// Blocking; run it on its own thread.
pub fn forward_lines<R: BufRead>(reader: R, commands: mpsc::Sender<Command>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "couldn't read input");
                break;
            }
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };
        if commands.blocking_send(command).is_err() || command == Command::Quit {
            break;
        }
    }
    debug!("input closed");
}

/// Read stdin on a detached thread so a pending read never holds up exit
pub fn spawn_stdin(commands: mpsc::Sender<Command>) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), commands))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_aliases() {
        for line in ["h", "left", "p", "prev", "k", "  LEFT  "] {
            assert_eq!(parse_command(line), Some(Command::Left), "{}", line);
        }
        for line in ["l", "right", "n", "next", "j", "", "   "] {
            assert_eq!(parse_command(line), Some(Command::Right), "{:?}", line);
        }
        assert_eq!(parse_command("r"), Some(Command::Resize));
        assert_eq!(parse_command("resize"), Some(Command::Resize));
        for line in ["q", "quit", "exit"] {
            assert_eq!(parse_command(line), Some(Command::Quit));
        }
    }

    #[test]
    fn test_click_halves() {
        assert_eq!(parse_command("click 700 1000"), Some(Command::Right));
        assert_eq!(parse_command("click 100 1000"), Some(Command::Left));
        // Exactly on the midline counts as the left half
        assert_eq!(parse_command("click 500 1000"), Some(Command::Left));
        assert_eq!(parse_command("click 501 1000"), Some(Command::Right));
    }

    #[test]
    fn test_unknown_input_ignored() {
        assert_eq!(parse_command("zoom"), None);
        assert_eq!(parse_command("click"), None);
        assert_eq!(parse_command("click x 10"), None);
        assert_eq!(parse_command("click 5"), None);
    }

    #[test]
    fn test_forward_lines_stops_at_quit() {
        let (tx, mut rx) = mpsc::channel(16);
        forward_lines(&b"n\nbogus\nh\n\nq\nn\n"[..], tx);

        let mut received = Vec::new();
        while let Ok(command) = rx.try_recv() {
            received.push(command);
        }
        assert_eq!(
            received,
            vec![Command::Right, Command::Left, Command::Right, Command::Quit]
        );
    }

    #[test]
    fn test_forward_lines_stops_when_viewer_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        forward_lines(&b"n\nn\nn\n"[..], tx);
    }
}
