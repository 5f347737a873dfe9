//! Interactive terminal review of pending names.
//!
//! Each iteration renders the first pending name from session state, reads
//! one line, maps it to a session command and applies it. Nothing is kept
//! outside the session except the set of names skipped in this run.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use rosterlink_map::{Classification, Command, Outcome, ReconcileSession, Resolution};
use tracing::debug;

use crate::logging::redact_value;
use crate::types::to_percent;

/// A parsed review input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Accept the current suggestion.
    Accept,
    /// Pick option N (1-based) from the displayed list.
    Pick(usize),
    /// Confirm to a target typed by name.
    Target(String),
    Reject,
    /// Leave the name pending and move on.
    Skip,
    Undo,
    Reset,
    /// List every available target.
    List,
    Help,
    Quit,
}

impl ReviewAction {
    /// Action name for logs; never carries a typed player name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Pick(_) => "pick",
            Self::Target(_) => "target",
            Self::Reject => "reject",
            Self::Skip => "skip",
            Self::Undo => "undo",
            Self::Reset => "reset",
            Self::List => "list",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

/// Why the review loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewExit {
    /// Every name was decided or skipped.
    Finished,
    /// The user quit, or input ended.
    Quit,
}

const HELP: &str = "\
  a / enter   accept the suggestion
  1-9         pick a numbered option
  =NAME       match to a target by exact name
  r           reject (no counterpart)
  s           skip for now
  u           undo the last decision
  reset       clear every decision for this dataset
  l           list available targets
  q           finish reviewing and export
  ?           show this help";

/// Parses one input line; `None` for unrecognized input.
pub fn parse_action(line: &str) -> Option<ReviewAction> {
    let trimmed = line.trim();
    if let Some(target) = trimmed.strip_prefix('=') {
        let target = target.trim();
        return (!target.is_empty()).then(|| ReviewAction::Target(target.to_string()));
    }
    if let Ok(number) = trimmed.parse::<usize>() {
        return (number > 0).then_some(ReviewAction::Pick(number));
    }
    let action = match trimmed.to_lowercase().as_str() {
        "" | "a" | "accept" | "y" => ReviewAction::Accept,
        "r" | "reject" | "n" => ReviewAction::Reject,
        "s" | "skip" => ReviewAction::Skip,
        "u" | "undo" => ReviewAction::Undo,
        "reset" => ReviewAction::Reset,
        "l" | "list" => ReviewAction::List,
        "?" | "h" | "help" => ReviewAction::Help,
        "q" | "quit" | "done" => ReviewAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Runs the review loop for one session.
pub fn review_session<R: BufRead, W: Write>(
    session: &mut ReconcileSession,
    input: &mut R,
    out: &mut W,
) -> io::Result<ReviewExit> {
    let mut skipped: HashSet<String> = HashSet::new();
    let mut line = String::new();
    loop {
        let Some(source) = session
            .pending()
            .into_iter()
            .find(|name| !skipped.contains(*name))
            .map(str::to_string)
        else {
            writeln!(out, "[{}] review complete", session.source_label())?;
            return Ok(ReviewExit::Finished);
        };
        let resolution = session.suggest(&source).map_err(io::Error::other)?;
        render(out, session, &resolution)?;

        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(ReviewExit::Quit);
        }

        let Some(action) = parse_action(&line) else {
            writeln!(out, "unrecognized input, ? for help")?;
            continue;
        };
        debug!(action = action.name(), source = redact_value(&source), "review input");
        let command = match action {
            ReviewAction::Accept => Command::AcceptSuggestion { source },
            ReviewAction::Pick(number) => match resolution.options().get(number - 1) {
                Some((target, _)) => Command::Confirm {
                    source,
                    target: (*target).to_string(),
                },
                None => {
                    writeln!(out, "no option {number}")?;
                    continue;
                }
            },
            ReviewAction::Target(target) => Command::Confirm { source, target },
            ReviewAction::Reject => Command::Reject { source },
            ReviewAction::Undo => Command::Undo,
            ReviewAction::Reset => Command::Reset,
            ReviewAction::Skip => {
                skipped.insert(source);
                continue;
            }
            ReviewAction::List => {
                for target in session.available_targets() {
                    writeln!(out, "  {target}")?;
                }
                continue;
            }
            ReviewAction::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            ReviewAction::Quit => return Ok(ReviewExit::Quit),
        };

        match session.apply(command) {
            Ok(Outcome::Confirmed { source, target }) => {
                writeln!(out, "matched {source} -> {target}")?;
            }
            Ok(Outcome::Rejected { source }) => writeln!(out, "rejected {source}")?,
            Ok(Outcome::Undone(action)) => {
                skipped.remove(&action.source);
                writeln!(out, "undid decision for {}", action.source)?;
            }
            Ok(Outcome::Reset) => {
                skipped.clear();
                writeln!(out, "cleared all decisions")?;
            }
            Err(error) => writeln!(out, "error: {error}")?,
        }
    }
}

fn render<W: Write>(
    out: &mut W,
    session: &ReconcileSession,
    resolution: &Resolution,
) -> io::Result<()> {
    let summary = session.summary();
    writeln!(out)?;
    writeln!(
        out,
        "[{} -> {}] {} pending, {} matched, {} rejected",
        session.source_label(),
        session.target_label(),
        session.pending().len(),
        summary.confirmed,
        summary.rejected
    )?;
    writeln!(out, "{}", resolution.source)?;
    let options = resolution.options();
    if options.is_empty() {
        writeln!(
            out,
            "  no suggestion (best score {}%)",
            to_percent(resolution.best_score)
        )?;
    }
    for (idx, (target, score)) in options.iter().enumerate() {
        let marker = if idx == 0 {
            match resolution.classification {
                Classification::Auto => " auto",
                Classification::Suggested => " suggested",
                Classification::Unmatched => "",
            }
        } else {
            ""
        };
        writeln!(out, "  {}) {target} ({}%){marker}", idx + 1, to_percent(*score))?;
    }
    write!(out, "[a]ccept [1-9] pick [=name] [r]eject [s]kip ")?;
    if session.state().can_undo() {
        write!(out, "[u]ndo ")?;
    }
    writeln!(out, "[l]ist [q]uit [?]help")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions() {
        assert_eq!(parse_action("\n"), Some(ReviewAction::Accept));
        assert_eq!(parse_action(" 2 "), Some(ReviewAction::Pick(2)));
        assert_eq!(parse_action("0"), None);
        assert_eq!(
            parse_action("= Mohamed Salah"),
            Some(ReviewAction::Target("Mohamed Salah".to_string()))
        );
        assert_eq!(parse_action("="), None);
        assert_eq!(parse_action("R"), Some(ReviewAction::Reject));
        assert_eq!(parse_action("reset"), Some(ReviewAction::Reset));
        assert_eq!(parse_action("what"), None);
    }

    #[test]
    fn action_name_omits_typed_target() {
        let action = parse_action("=Mohamed Salah").unwrap();
        assert_eq!(action.name(), "target");
        assert_eq!(ReviewAction::Pick(3).name(), "pick");
    }
}
