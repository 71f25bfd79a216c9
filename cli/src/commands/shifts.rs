use std::collections::HashMap;

use clap::Parser;
use hotschedules_api::{shifts::DATE_FMT, shifts::TIME_FMT, Client, Employee, EmployeeId, Shift};
use log::warn;
use time::Duration;
use time::{macros::format_description, Date};

use super::{Error, Result};

const DEFAULT_SPAN_DAYS: i64 = 6;
const WEEKDAY_FMT: &[time::format_description::FormatItem] =
    format_description!("[weekday repr:short] [year]-[month]-[day]");

/// List posted shifts for a range of days
#[derive(Debug, Parser)]
pub struct Command {
    /// First day, defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub start: Option<Date>,
    /// Last day, defaults to six days after the first
    #[arg(short, long, value_parser = parse_date)]
    pub end: Option<Date>,
}

/// Entrypoint for this module
pub async fn execute(cmd: &Command) -> Result<()> {
    let (start, end) = date_range(cmd.start.unwrap_or_else(super::today), cmd.end)?;
    let client = super::open_client()?;
    let (shifts, names) = super::wrap_in_spinner(fetch(&client, start, end)).await?;
    super::save_session(&client)?;

    for shift in &shifts {
        println!("{}", render(shift, &names)?);
    }
    Ok(())
}

async fn fetch(client: &Client, start: Date, end: Date) -> Result<(Vec<Shift>, HashMap<EmployeeId, String>)> {
    let shifts = client.get_shifts(start, end).await?;
    let names = match client.get_employees().await {
        Ok(employees) => roster(employees),
        Err(e) => {
            warn!("Showing owner ids, the roster is unavailable: {e}");
            HashMap::new()
        }
    };
    Ok((shifts, names))
}

fn date_range(start: Date, end: Option<Date>) -> Result<(Date, Date)> {
    let end = match end {
        Some(end) => end,
        None => start.saturating_add(Duration::days(DEFAULT_SPAN_DAYS)),
    };
    if end < start {
        return Err(Error::InvalidRange(start, end));
    }
    Ok((start, end))
}

fn roster(employees: Vec<Employee>) -> HashMap<EmployeeId, String> {
    employees
        .into_iter()
        .map(|employee| (employee.id().clone(), employee.to_string()))
        .collect()
}

fn render(shift: &Shift, names: &HashMap<EmployeeId, String>) -> Result<String> {
    let owner = names
        .get(shift.owner_id())
        .map_or_else(|| shift.owner_id().to_string(), Clone::clone);
    let start = shift.start();
    let end = shift.end();
    let mut line = format!(
        "{} {}-{}",
        start.date().format(WEEKDAY_FMT)?,
        start.time().format(TIME_FMT)?,
        end.time().format(TIME_FMT)?
    );
    if end.date() != start.date() {
        line.push_str(&format!(" (ends {})", end.date().format(DATE_FMT)?));
    }
    line.push_str(&format!(" {owner}"));
    Ok(line)
}

fn parse_date(input: &str) -> std::result::Result<Date, String> {
    Date::parse(input, DATE_FMT).map_err(|e| format!("Expected a date like 2024-03-10 ({e})"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;

    fn shift(owner: &str, start_date: &str, start_time: &str, duration: i64) -> Shift {
        Shift::from_payload(json!({
            "ownerId": owner,
            "startDate": start_date,
            "startTime": start_time,
            "duration": duration,
        }))
        .unwrap()
    }

    fn names() -> HashMap<EmployeeId, String> {
        let employee = Employee::from_payload(json!({
            "id": "1001",
            "firstname": "Jane",
            "lastname": "Doe",
            "displayFullName": "Jane Doe",
            "nickname": "JD",
        }))
        .unwrap();
        roster(vec![employee])
    }

    #[test]
    fn it_parses_dates() {
        assert_eq!(parse_date("2024-03-10"), Ok(date!(2024 - 03 - 10)));
        assert!(parse_date("10.03.2024").is_err());
    }

    #[test]
    fn it_defaults_to_a_week() {
        assert_eq!(
            date_range(date!(2024 - 03 - 10), None).unwrap(),
            (date!(2024 - 03 - 10), date!(2024 - 03 - 16))
        );
    }

    #[test]
    fn it_rejects_inverted_ranges() {
        let result = date_range(date!(2024 - 03 - 10), Some(date!(2024 - 03 - 09)));
        assert!(matches!(result, Err(Error::InvalidRange(_, _))));
    }

    #[test]
    fn it_renders_shifts_with_owner_names() {
        let line = render(&shift("1001", "2024-03-10", "14:30", 90), &names()).unwrap();
        assert_eq!(line, "Sun 2024-03-10 14:30-16:00 Jane Doe (JD)");
    }

    #[test]
    fn it_falls_back_to_owner_ids() {
        let line = render(&shift("2002", "2024-03-10", "22:00", 240), &names()).unwrap();
        assert_eq!(line, "Sun 2024-03-10 22:00-02:00 (ends 2024-03-11) 2002");
    }
}
