use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::utils::format_time;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    /// Client display name
    pub name: String,
    pub service: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub date: NaiveDate,
}

impl Reservation {
    /// Time as shown on the calendar card, e.g. "09:00" or "09:00:30"
    pub fn time_label(&self) -> String {
        format_time(self.time)
    }
}

/// A reservation as entered on the creation form, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    pub name: String,
    pub service: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

impl ReservationDraft {
    pub fn new(
        name: impl Into<String>,
        service: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            time,
            date,
        }
    }
}

/// Partial update from the edit dialog. `time` is the raw text the user
/// typed and is validated when the edit is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationEdit {
    pub name: Option<String>,
    pub service: Option<String>,
    pub time: Option<String>,
}

impl ReservationEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.service.is_none() && self.time.is_none()
    }
}

/// Serde adapter writing a `NaiveTime` as `HH:MM`, keeping seconds when set.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::utils::{format_time, parse_time_of_day};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_time_of_day(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid time of day '{}'", s)))
    }
}
