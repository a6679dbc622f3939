//! Reservation scheduling core.
//!
//! This module provides:
//! - `ReservationStore`: the in-memory collection with slot lookup,
//!   rescheduling and all-or-nothing edits
//! - `drag_shift` / `DragTracker`: the drag-to-snap rule, independent of any
//!   gesture framework
//! - the hourly slot grid and the date strip of the calendar view

pub mod drag;
pub mod model;
pub mod slots;
pub mod store;

pub use drag::{drag_shift, DragTracker, ShiftDirection, DRAG_THRESHOLD, SHIFT_MINUTES};
pub use model::{Reservation, ReservationDraft, ReservationEdit};
pub use slots::{date_window, day_schedule, daily_slots, off_grid, today_index, SlotEntry};
pub use store::{ReservationStore, SharedReservations};
