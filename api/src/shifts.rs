use serde::Deserialize;
use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, PrimitiveDateTime, Time};

use super::client::map_list;
use super::{EmployeeId, Error, Result};

const SHIFTS_PATH: &str = "spring/shifts/posted/";

pub const DATE_FMT: &[FormatItem] = format_description!("[year]-[month]-[day]");
pub const TIME_FMT: &[FormatItem] = format_description!("[hour]:[minute]");

// The service may leave out zero padding
const START_DATE_FMT: &[FormatItem] = format_description!("[year]-[month padding:none]-[day padding:none]");
const START_TIME_FMT: &[FormatItem] = format_description!("[hour padding:none]:[minute]");

impl crate::Client {
    /// Posted shifts between `start` and `end`, in the order the service lists them
    pub async fn get_shifts(&self, start: Date, end: Date) -> Result<Vec<Shift>> {
        let request = self
            .session()
            .get(SHIFTS_PATH)?
            .param("start", start.format(DATE_FMT)?)
            .param("end", end.format(DATE_FMT)?);
        let payload = self.session().send(&request).await?;
        map_list(payload, Shift::from_payload)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shift {
    owner_id: EmployeeId,
    start: PrimitiveDateTime,
    duration: Duration,
    end: PrimitiveDateTime,
}

#[derive(Debug, Deserialize)]
struct ShiftJson {
    #[serde(rename = "ownerId")]
    owner_id: EmployeeId,
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "startTime")]
    start_time: String,
    duration: i64,
}

impl Shift {
    /// Builds a shift from its payload; date and time of day arrive as separate strings
    pub fn from_payload(data: Value) -> Result<Self> {
        let raw: ShiftJson = serde_json::from_value(data).map_err(|e| Error::Mapping(format!("shift: {e}")))?;
        let date = Date::parse(&raw.start_date, START_DATE_FMT)
            .map_err(|e| Error::Mapping(format!("shift startDate {:?}: {e}", raw.start_date)))?;
        let time = Time::parse(&raw.start_time, START_TIME_FMT)
            .map_err(|e| Error::Mapping(format!("shift startTime {:?}: {e}", raw.start_time)))?;
        let start = PrimitiveDateTime::new(date, time);
        let duration = raw
            .duration
            .checked_mul(60)
            .map(Duration::seconds)
            .ok_or_else(|| Error::Mapping(format!("shift duration {} is out of range", raw.duration)))?;
        let end = start
            .checked_add(duration)
            .ok_or_else(|| Error::Mapping(format!("shift of {} minutes ends out of range", raw.duration)))?;
        Ok(Self { owner_id: raw.owner_id, start, duration, end })
    }

    pub fn owner_id(&self) -> &EmployeeId {
        &self.owner_id
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::{date, datetime};
    use utilities::mocking;

    use super::*;
    use crate::client::test_client;

    #[test]
    fn it_combines_date_and_time_of_day() {
        let shift = Shift::from_payload(json!({
            "ownerId": "1001",
            "startDate": "2024-03-10",
            "startTime": "14:30",
            "duration": 90,
        }))
        .unwrap();
        assert_eq!(shift.owner_id().as_str(), "1001");
        assert_eq!(shift.start(), datetime!(2024-03-10 14:30));
        assert_eq!(shift.duration(), Duration::minutes(90));
        assert_eq!(shift.end(), datetime!(2024-03-10 16:00));
    }

    #[test]
    fn it_ends_shifts_past_midnight_on_the_next_day() {
        let shift = Shift::from_payload(json!({
            "ownerId": 7,
            "startDate": "2024-03-10",
            "startTime": "22:00",
            "duration": 240,
        }))
        .unwrap();
        assert_eq!(shift.owner_id().as_str(), "7");
        assert_eq!(shift.end(), datetime!(2024-03-11 02:00));
    }

    #[test]
    fn it_rejects_unparseable_dates_and_times() {
        let bad_date = json!({"ownerId": "1", "startDate": "10/03/2024", "startTime": "14:30", "duration": 60});
        assert!(matches!(Shift::from_payload(bad_date), Err(Error::Mapping(_))));

        let bad_time = json!({"ownerId": "1", "startDate": "2024-03-10", "startTime": "2:30 PM", "duration": 60});
        assert!(matches!(Shift::from_payload(bad_time), Err(Error::Mapping(_))));
    }

    #[test]
    fn it_accepts_unpadded_dates_and_times() {
        let shift = Shift::from_payload(json!({
            "ownerId": "1001",
            "startDate": "2024-3-9",
            "startTime": "9:05",
            "duration": 30,
        }))
        .unwrap();
        assert_eq!(shift.start(), datetime!(2024-03-09 09:05));
        assert_eq!(shift.end(), datetime!(2024-03-09 09:35));
    }

    #[test]
    fn it_rejects_durations_out_of_range() {
        for duration in [i64::MAX, 1_000_000_000_000] {
            let data = json!({"ownerId": "1", "startDate": "2024-03-10", "startTime": "14:30", "duration": duration});
            assert!(matches!(Shift::from_payload(data), Err(Error::Mapping(_))), "duration {duration}");
        }
    }

    #[test]
    fn it_rejects_shifts_without_duration() {
        let data = json!({"ownerId": "1", "startDate": "2024-03-10", "startTime": "14:30"});
        assert!(matches!(Shift::from_payload(data), Err(Error::Mapping(_))));
    }

    #[tokio::test]
    async fn it_can_fetch_posted_shifts() {
        let mut server = mocking::FakeHotSchedules::new().await;
        let _login = server.mock_login(1).await;
        let m = server.mock_shifts("2024-03-10", "2024-03-16", "shifts").await;

        let shifts = test_client(&server)
            .get_shifts(date!(2024 - 03 - 10), date!(2024 - 03 - 16))
            .await
            .unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].owner_id().as_str(), "1001");
        assert_eq!(shifts[0].start(), datetime!(2024-03-10 14:30));
        assert_eq!(shifts[0].end(), datetime!(2024-03-10 16:00));
        assert_eq!(shifts[1].owner_id().as_str(), "1002");
        assert_eq!(shifts[1].start(), datetime!(2024-03-11 08:00));
        m.assert_async().await;
    }
}
