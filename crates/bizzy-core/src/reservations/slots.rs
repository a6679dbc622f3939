//! Daily time grid and date strip of the calendar view.

use chrono::{Duration, NaiveDate, NaiveTime};

use super::model::Reservation;
use super::store::ReservationStore;

/// Hour of the first slot of the day
pub const FIRST_SLOT_HOUR: u32 = 8;

/// Number of hourly slots per day (08:00 through 18:00)
pub const SLOTS_PER_DAY: u32 = 11;

/// Days shown on either side of today in the date strip
pub const DATE_WINDOW_DAYS: i64 = 30;

/// Hourly slot start times, 08:00 to 18:00 inclusive
pub fn daily_slots() -> Vec<NaiveTime> {
    (0..SLOTS_PER_DAY)
        .filter_map(|i| NaiveTime::from_hms_opt(FIRST_SLOT_HOUR + i, 0, 0))
        .collect()
}

/// Dates from `today - 30` to `today + 30`. Today sits at
/// [`today_index`].
pub fn date_window(today: NaiveDate) -> Vec<NaiveDate> {
    (-DATE_WINDOW_DAYS..=DATE_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .collect()
}

/// Position of today in [`date_window`]
pub fn today_index() -> usize {
    DATE_WINDOW_DAYS as usize
}

/// One row of the day view
#[derive(Debug)]
pub struct SlotEntry<'a> {
    pub time: NaiveTime,
    pub reservations: Vec<&'a Reservation>,
}

/// Group a day's reservations under the hourly grid.
///
/// Uses exact slot lookup, so a reservation at an off-grid time (08:30)
/// appears in no row.
pub fn day_schedule(store: &ReservationStore, date: NaiveDate) -> Vec<SlotEntry<'_>> {
    daily_slots()
        .into_iter()
        .map(|time| SlotEntry {
            time,
            reservations: store.find_by_slot(date, time).collect(),
        })
        .collect()
}

/// Reservations on `date` that [`day_schedule`] cannot place in any row
pub fn off_grid<'a>(store: &'a ReservationStore, date: NaiveDate) -> Vec<&'a Reservation> {
    let slots = daily_slots();
    store
        .on_date(date)
        .filter(|r| !slots.contains(&r.time))
        .collect()
}
