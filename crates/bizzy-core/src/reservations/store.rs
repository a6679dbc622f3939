use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::drag::ShiftDirection;
use super::model::{Reservation, ReservationDraft, ReservationEdit};
use crate::error::{Error, Result};
use crate::utils::parse_time_of_day;

/// Store handle for consumers on several tasks. Mutations take the write
/// lock, so there is only ever one writer.
pub type SharedReservations = Arc<RwLock<ReservationStore>>;

/// In-memory reservation collection.
///
/// Insertion order is display order within a slot. Several reservations may
/// share a date and time; nothing here checks for conflicts.
#[derive(Debug, Default)]
pub struct ReservationStore {
    reservations: Vec<Reservation>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedReservations {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// All reservations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Reservation> + '_ {
        self.reservations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    pub fn add(&mut self, draft: ReservationDraft) -> Reservation {
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            service: draft.service,
            time: draft.time,
            date: draft.date,
        };
        debug!(
            id = %reservation.id,
            date = %reservation.date,
            time = %reservation.time_label(),
            "Added reservation"
        );
        self.reservations.push(reservation.clone());
        reservation
    }

    /// Reservations starting exactly at `time` on `date`.
    ///
    /// Matching is exact equality of the time-of-day, not containment in an
    /// hour: 08:30 is not in the 08:00 slot.
    pub fn find_by_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> impl Iterator<Item = &Reservation> + '_ {
        self.reservations
            .iter()
            .filter(move |r| r.date == date && r.time == time)
    }

    /// All reservations on a day, in insertion order
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Reservation> + '_ {
        self.reservations.iter().filter(move |r| r.date == date)
    }

    pub fn reschedule(
        &mut self,
        id: &str,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> Result<Reservation> {
        let idx = self.position(id)?;
        let reservation = &mut self.reservations[idx];
        reservation.date = new_date;
        reservation.time = new_time;
        debug!(id, date = %new_date, time = %reservation.time_label(), "Rescheduled reservation");
        Ok(reservation.clone())
    }

    /// Apply one drag snap to a stored reservation.
    pub fn shift(&mut self, id: &str, direction: ShiftDirection) -> Result<Reservation> {
        let current = self
            .get(id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;
        let (date, time) = direction.apply(current.date, current.time);
        self.reschedule(id, date, time)
    }

    /// Partial update. Either every supplied field is applied or none is.
    pub fn edit(&mut self, id: &str, edit: ReservationEdit) -> Result<Reservation> {
        let idx = self.position(id)?;

        let time = match edit.time.as_deref() {
            Some(raw) => Some(parse_time_of_day(raw).ok_or_else(|| {
                Error::validation(format!("Invalid time '{}', expected HH:mm", raw))
            })?),
            None => None,
        };

        let reservation = &mut self.reservations[idx];
        if let Some(name) = edit.name {
            reservation.name = name;
        }
        if let Some(service) = edit.service {
            reservation.service = service;
        }
        if let Some(time) = time {
            reservation.time = time;
        }
        debug!(id, "Edited reservation");
        Ok(reservation.clone())
    }
}
