//! The rendering seam.
//!
//! Everything the controller shows goes through [`View`], so tests can
//! record the exact sequence of user-visible effects. Goal-area failures
//! and calendar-indicator changes are separate channels and never conflated.

use std::io::{BufRead, Write};

use presentos_api::Goal;
use presentos_core::{CalendarStatus, Identity};

/// What the controller can show to the user.
pub trait View {
    /// Switches to the signed-in presentation for `identity`.
    fn show_signed_in(&mut self, identity: &Identity);

    /// Switches to the signed-out presentation.
    fn show_signed_out(&mut self);

    /// Updates the calendar connection indicator.
    fn set_calendar_status(&mut self, status: CalendarStatus);

    /// Renders the goal list.
    fn show_goals(&mut self, goals: &[Goal]);

    /// Empties the goal area.
    fn clear_goals(&mut self);

    /// Writes a transient status line.
    fn status_line(&mut self, message: &str);

    /// Reports an error in the goal/status area.
    fn error_line(&mut self, message: &str);

    /// Asks the user to confirm an action. Returns true on acceptance.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Closes any open confirmation prompt.
    fn dismiss_confirm(&mut self);
}

/// Terminal [`View`] writing to stdout/stderr.
#[derive(Debug, Default)]
pub struct TtyView;

impl TtyView {
    /// Creates a terminal view.
    pub fn new() -> Self {
        Self
    }
}

impl View for TtyView {
    fn show_signed_in(&mut self, identity: &Identity) {
        println!("Signed in as {}", identity.display_name);
    }

    fn show_signed_out(&mut self) {
        println!("Signed out.");
    }

    fn set_calendar_status(&mut self, status: CalendarStatus) {
        println!("Calendar: {}", status);
    }

    fn show_goals(&mut self, goals: &[Goal]) {
        if goals.is_empty() {
            println!("No goals yet.");
            return;
        }
        println!("Goals:");
        for goal in goals {
            match goal.description {
                Some(ref description) => println!("  {}  {} - {}", goal.id, goal.name, description),
                None => println!("  {}  {}", goal.id, goal.name),
            }
        }
    }

    fn clear_goals(&mut self) {}

    fn status_line(&mut self, message: &str) {
        println!("{}", message);
    }

    fn error_line(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn dismiss_confirm(&mut self) {}
}
