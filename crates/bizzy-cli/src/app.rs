//! Calendar state driven by the interactive commands.

use bizzy_core::reservations::{
    date_window, day_schedule, off_grid, today_index, DragTracker, Reservation, ReservationDraft,
    ReservationStore,
};
use bizzy_core::utils::truncate_string;
use bizzy_core::{Error, Result};
use chrono::NaiveDate;
use tracing::debug;

use crate::commands::{Command, HELP};

/// Characters of the id shown in listings
const SHORT_ID_LEN: usize = 8;

/// Width of the client name column in the day view
const NAME_WIDTH: usize = 24;

/// What the main loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Logout,
    Quit,
}

pub struct App {
    pub reservations: ReservationStore,
    pub today: NaiveDate,
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(SHORT_ID_LEN)]
}

fn describe(r: &Reservation) -> String {
    format!(
        "[{}] {} - {} ({} {})",
        short_id(&r.id),
        truncate_string(&r.name, NAME_WIDTH),
        r.service,
        r.date,
        r.time_label()
    )
}

impl App {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            reservations: ReservationStore::new(),
            today,
        }
    }

    /// Expand an id prefix to the full id of exactly one reservation
    fn resolve_id(&self, prefix: &str) -> Result<String> {
        let mut matches = self.reservations.iter().filter(|r| r.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(r), None) => Ok(r.id.clone()),
            (None, _) => Err(Error::NotFound {
                id: prefix.to_string(),
            }),
            (Some(_), Some(_)) => Err(Error::validation(format!(
                "Id '{}' is ambiguous, type more characters",
                prefix
            ))),
        }
    }

    fn day_view(&self, date: NaiveDate) -> Vec<String> {
        let mut out = vec![date.format("%A, %-d %B %Y").to_string()];
        for slot in day_schedule(&self.reservations, date) {
            let label = slot.time.format("%H:%M");
            if slot.reservations.is_empty() {
                out.push(format!("{}  No reservations", label));
            }
            for r in slot.reservations {
                out.push(format!("{}  {}", label, describe(r)));
            }
        }
        let hidden = off_grid(&self.reservations, date);
        if !hidden.is_empty() {
            out.push(format!("Not on the hourly grid ({}):", hidden.len()));
            out.extend(hidden.into_iter().map(|r| format!("       {}", describe(r))));
        }
        out
    }

    fn date_strip(&self) -> Vec<String> {
        let window = date_window(self.today);
        let line = window
            .iter()
            .enumerate()
            .map(|(i, date)| {
                if i == today_index() {
                    format!("[{}]", date.format("%a %-d"))
                } else {
                    date.format("%a %-d").to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        vec![line]
    }

    /// Run one command, returning the lines to show and what to do next.
    pub fn execute(&mut self, command: Command) -> Result<(Vec<String>, Flow)> {
        let lines = match command {
            Command::Add {
                date,
                time,
                name,
                service,
            } => {
                let r = self
                    .reservations
                    .add(ReservationDraft::new(name, service, date, time));
                vec![format!("Created {}", describe(&r))]
            }
            Command::Day(date) => self.day_view(date.unwrap_or(self.today)),
            Command::Dates => self.date_strip(),
            Command::Move { id, date, time } => {
                let id = self.resolve_id(&id)?;
                let r = self.reservations.reschedule(&id, date, time)?;
                vec![format!("Moved {}", describe(&r))]
            }
            Command::Drag { id, deltas } => {
                let id = self.resolve_id(&id)?;
                let mut tracker = DragTracker::new();
                let mut out = Vec::new();
                for delta in deltas {
                    if let Some(direction) = tracker.push(delta) {
                        let r = self.reservations.shift(&id, direction)?;
                        debug!(id = %id, ?direction, "Drag snapped");
                        out.push(format!("Snapped {:?}: {}", direction, describe(&r)));
                    }
                }
                if out.is_empty() {
                    out.push(format!(
                        "No change (drag offset {:.0} is below the threshold)",
                        tracker.offset()
                    ));
                }
                out
            }
            Command::Edit { id, edit } => {
                let id = self.resolve_id(&id)?;
                let r = self.reservations.edit(&id, edit)?;
                vec![format!("Updated {}", describe(&r))]
            }
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Logout => return Ok((Vec::new(), Flow::Logout)),
            Command::Quit => return Ok((Vec::new(), Flow::Quit)),
        };
        Ok((lines, Flow::Continue))
    }
}
