//! Headless mode for the tracker.
//!
//! A line-oriented protocol for scripts and automated testing. Every input
//! line is a command (a leading `#` or `:` is optional) and every reply is
//! tagged:
//! - `[OK]` state changed, followed by a `[STATUS]` line
//! - `[INFO]`, `[SAVED]`, `[LOADED]`, `[SHEET]`, `[HELP]`
//! - `[ERROR]` the command was rejected and nothing changed

use encumbrance_core::headless::{HeadlessTracker, ResponseKind, TrackerResponse};
use encumbrance_core::{Session, SessionError};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

/// How often the auto-save timer is checked while waiting for input.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Run the tracker in headless mode until `#quit` or end of input.
pub async fn run_headless(session: Session) -> Result<(), SessionError> {
    let mut tracker = HeadlessTracker::new(session);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();

    serve(&mut tracker, stdin, &mut stdout, TICK_PERIOD).await?;

    // Final snapshot so nothing since the last auto-save is lost
    if !tracker.session().config().autosave_interval.is_zero() {
        tracker.session_mut().save_session()?;
    }

    tracing::info!(commands = tracker.commands_run(), "Headless session finished");
    Ok(())
}

/// Answer command lines from `input` until it ends or a quit command arrives.
///
/// The auto-save timer is checked every `tick_period`, input or not.
async fn serve<R, W>(
    tracker: &mut HeadlessTracker,
    input: R,
    out: &mut W,
    tick_period: Duration,
) -> Result<(), SessionError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "=== Encumbrance Headless Mode ===")?;
    writeln!(out, "{}", tracker.session().status_line())?;
    writeln!(out, "Type #help for commands.")?;
    writeln!(out)?;
    out.flush()?;

    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("Error reading input: {e}");
                        break;
                    }
                };

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match tracker.send(line).await {
                    Ok(response) => {
                        print_response(out, &response)?;
                        if response.kind == ResponseKind::Quit {
                            out.flush()?;
                            break;
                        }
                    }
                    Err(e) => writeln!(out, "[ERROR] {e}")?,
                }
                out.flush()?;
            }
            _ = ticker.tick() => {
                if let Err(e) = tracker.tick(Instant::now()) {
                    writeln!(out, "[ERROR] Auto-save failed: {e}")?;
                    out.flush()?;
                }
            }
        }
    }

    Ok(())
}

fn print_response(out: &mut impl Write, response: &TrackerResponse) -> io::Result<()> {
    match &response.kind {
        ResponseKind::Updated => {
            writeln!(out, "[OK] {}", response.text)?;
            writeln!(out, "[STATUS] {}", status_summary(response))
        }
        ResponseKind::Info => writeln!(out, "[INFO] {}", response.text),
        ResponseKind::Saved(path) => writeln!(out, "[SAVED] {}", path.display()),
        ResponseKind::Loaded(path) => {
            writeln!(out, "[LOADED] {}", path.display())?;
            writeln!(out, "[STATUS] {}", status_summary(response))
        }
        ResponseKind::Sheet => {
            writeln!(out, "[SHEET]")?;
            writeln!(out, "{}", response.text)
        }
        ResponseKind::Help => {
            writeln!(out, "[HELP]")?;
            writeln!(out, "{}", response.text)
        }
        ResponseKind::Quit => writeln!(out, "Goodbye!"),
    }
}

fn status_summary(response: &TrackerResponse) -> String {
    let mut summary = match response.slots_used {
        Some(slots) => format!("{} gp, {slots} slots", response.total_weight),
        None => format!("{} gp", response.total_weight),
    };
    if response.over_encumbered {
        summary.push_str(", over-encumbered");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use encumbrance_core::{Config, MemoryStore};
    use std::path::PathBuf;

    fn tracker(autosave: Duration) -> HeadlessTracker {
        let config = Config::new()
            .with_autosave_interval(autosave)
            .with_restore_on_start(false);
        HeadlessTracker::new(Session::new(config, Box::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let mut tracker = tracker(Duration::ZERO);
        let input = BufReader::new(&b"add Rope\nweight 1 10\nrm 7\nq\nadd Never\n"[..]);
        let mut out = Vec::new();

        serve(&mut tracker, input, &mut out, Duration::from_millis(10))
            .await
            .expect("serve");

        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.contains("[OK] Added row 1"));
        assert!(text.contains("[STATUS] 10 gp, 1 slots"));
        assert!(text.contains("[ERROR] Row 7 is out of range"));
        assert!(text.ends_with("Goodbye!\n"));
        assert_eq!(tracker.session().state().ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_idle_session_still_autosaves() {
        let mut tracker = tracker(Duration::from_millis(20));
        let (client, server) = tokio::io::duplex(64);
        let closer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            drop(client);
        });
        let mut out = Vec::new();

        serve(&mut tracker, BufReader::new(server), &mut out, Duration::from_millis(10))
            .await
            .expect("serve");
        closer.await.expect("closer task");

        assert!(tracker.session_mut().restore_session().is_ok());
    }

    fn response(kind: ResponseKind, slots_used: Option<i64>, over: bool) -> TrackerResponse {
        TrackerResponse {
            kind,
            text: String::new(),
            total_weight: 250.0,
            slots_used,
            over_encumbered: over,
        }
    }

    #[test]
    fn test_status_summary() {
        assert_eq!(
            status_summary(&response(ResponseKind::Updated, Some(3), true)),
            "250 gp, 3 slots, over-encumbered"
        );
        assert_eq!(
            status_summary(&response(ResponseKind::Loaded(PathBuf::from("x")), None, false)),
            "250 gp"
        );
    }
}
