//! Parsing of the interactive command line.

use bizzy_core::reservations::ReservationEdit;
use bizzy_core::utils::parse_time_of_day;
use chrono::{NaiveDate, NaiveTime};

pub const HELP: &str = "\
Commands:
  add <YYYY-MM-DD> <HH:MM> <name> | <service>   create a reservation
  day [YYYY-MM-DD]                             show the hourly grid (default today)
  dates                                        show the +/-30 day date strip
  move <id> <YYYY-MM-DD> <HH:MM>               reschedule
  drag <id> <offset>...                        feed vertical drag deltas
  edit <id> [name=..] [service=..] [time=HH:MM]
  logout                                       forget the cached token
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        date: NaiveDate,
        time: NaiveTime,
        name: String,
        service: String,
    },
    Day(Option<NaiveDate>),
    Dates,
    Move {
        id: String,
        date: NaiveDate,
        time: NaiveTime,
    },
    Drag {
        id: String,
        deltas: Vec<f32>,
    },
    Edit {
        id: String,
        edit: ReservationEdit,
    },
    Logout,
    Help,
    Quit,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    parse_time_of_day(s).ok_or_else(|| format!("Invalid time '{}'. Expected HH:MM", s))
}

fn required<'a>(arg: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    arg.ok_or_else(|| format!("Missing {}", what))
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(None),
        "add" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let date = parse_date(required(parts.next(), "date")?)?;
            let time = parse_time(required(parts.next(), "time")?)?;
            let text = required(parts.next(), "name")?;
            let (name, service) = match text.split_once('|') {
                Some((name, service)) => (name.trim(), service.trim()),
                None => (text.trim(), ""),
            };
            if name.is_empty() {
                return Err("Missing name".to_string());
            }
            Command::Add {
                date,
                time,
                name: name.to_string(),
                service: service.to_string(),
            }
        }
        "day" => match rest {
            "" => Command::Day(None),
            date => Command::Day(Some(parse_date(date)?)),
        },
        "dates" => Command::Dates,
        "move" => {
            let mut parts = rest.split_whitespace();
            let id = required(parts.next(), "id")?.to_string();
            let date = parse_date(required(parts.next(), "date")?)?;
            let time = parse_time(required(parts.next(), "time")?)?;
            Command::Move { id, date, time }
        }
        "drag" => {
            let mut parts = rest.split_whitespace();
            let id = required(parts.next(), "id")?.to_string();
            let deltas = parts
                .map(|p| p.parse::<f32>().map_err(|_| format!("Invalid offset '{}'", p)))
                .collect::<Result<Vec<_>, _>>()?;
            if deltas.is_empty() {
                return Err("Missing offset".to_string());
            }
            Command::Drag { id, deltas }
        }
        "edit" => {
            let (id, fields) = match rest.split_once(char::is_whitespace) {
                Some((id, fields)) => (id, fields),
                None => (rest, ""),
            };
            if id.is_empty() {
                return Err("Missing id".to_string());
            }
            Command::Edit {
                id: id.to_string(),
                edit: parse_edit_fields(fields)?,
            }
        }
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
    };
    Ok(Some(command))
}

/// `name=Anna Smith service=Cut time=09:00`. A value runs until the next
/// `key=`, so names may contain spaces. The time is left unparsed; the
/// store validates it.
fn parse_edit_fields(fields: &str) -> Result<ReservationEdit, String> {
    let mut edit = ReservationEdit::default();
    let mut current: Option<(&str, Vec<&str>)> = None;
    let mut pairs = Vec::new();

    for token in fields.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if matches!(key, "name" | "service" | "time") => {
                if let Some(done) = current.take() {
                    pairs.push(done);
                }
                current = Some((key, vec![value]));
            }
            _ => match current.as_mut() {
                Some((_, words)) => words.push(token),
                None => return Err(format!("Expected key=value, got '{}'", token)),
            },
        }
    }
    pairs.extend(current);

    for (key, words) in pairs {
        let value = words.join(" ");
        match key {
            "name" => edit.name = Some(value),
            "service" => edit.service = Some(value),
            _ => edit.time = Some(value),
        }
    }

    if edit.is_empty() {
        return Err("Nothing to edit. Use name=, service= or time=".to_string());
    }
    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse("add 2025-03-14 09:00 Anna Smith | Hair / Haircut"),
            Ok(Some(Command::Add {
                date: d(2025, 3, 14),
                time: t(9, 0),
                name: "Anna Smith".to_string(),
                service: "Hair / Haircut".to_string(),
            }))
        );
    }

    #[test]
    fn test_parse_add_errors() {
        assert!(parse("add 2025-13-01 09:00 A").is_err());
        assert!(parse("add 2025-03-14 9:00 A").is_err());
        assert!(parse("add 2025-03-14 09:00").is_err());
        assert!(parse("add 2025-03-14 09:00 | Cut").is_err());
    }

    #[test]
    fn test_parse_day_and_move() {
        assert_eq!(parse("day"), Ok(Some(Command::Day(None))));
        assert_eq!(
            parse("DAY 2025-03-14"),
            Ok(Some(Command::Day(Some(d(2025, 3, 14)))))
        );
        assert_eq!(
            parse("move ab12 2025-03-15 11:00"),
            Ok(Some(Command::Move {
                id: "ab12".to_string(),
                date: d(2025, 3, 15),
                time: t(11, 0),
            }))
        );
    }

    #[test]
    fn test_parse_drag() {
        assert_eq!(
            parse("drag ab12 60 41.5 -20"),
            Ok(Some(Command::Drag {
                id: "ab12".to_string(),
                deltas: vec![60.0, 41.5, -20.0],
            }))
        );
        assert!(parse("drag ab12").is_err());
        assert!(parse("drag ab12 far").is_err());
    }

    #[test]
    fn test_parse_edit_fields_with_spaces() {
        assert_eq!(
            parse("edit ab12 name=Anna Smith time=10:00"),
            Ok(Some(Command::Edit {
                id: "ab12".to_string(),
                edit: ReservationEdit {
                    name: Some("Anna Smith".to_string()),
                    service: None,
                    time: Some("10:00".to_string()),
                },
            }))
        );
    }

    #[test]
    fn test_parse_edit_keeps_raw_time() {
        let Ok(Some(Command::Edit { edit, .. })) = parse("edit ab12 time=noon") else {
            panic!("expected edit");
        };
        assert_eq!(edit.time.as_deref(), Some("noon"));
    }

    #[test]
    fn test_parse_edit_errors() {
        assert!(parse("edit").is_err());
        assert!(parse("edit ab12").is_err());
        assert!(parse("edit ab12 Anna").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse("delete ab12").is_err());
    }
}
