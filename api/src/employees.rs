use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::client::map_list;
use super::{Error, Result};

const EMPLOYEES_PATH: &str = "spring/client/employee/";

impl crate::Client {
    /// Active employees, in the order the service lists them
    pub async fn get_employees(&self) -> Result<Vec<Employee>> {
        let request = self.session().get(EMPLOYEES_PATH)?.param("active", "true");
        let payload = self.session().send(&request).await?;
        map_list(payload, Employee::from_payload)
    }
}

/// Opaque identifier, sent by the service either as a string or as a number
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    id: EmployeeId,
    first_name: String,
    last_name: String,
    full_name: String,
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmployeeJson {
    id: EmployeeId,
    firstname: String,
    lastname: String,
    #[serde(rename = "displayFullName")]
    display_full_name: String,
    #[serde(default)]
    nickname: Option<String>,
}

impl Employee {
    pub fn from_payload(data: Value) -> Result<Self> {
        let raw: EmployeeJson = serde_json::from_value(data).map_err(|e| Error::Mapping(format!("employee: {e}")))?;
        Ok(Self {
            id: raw.id,
            first_name: raw.firstname,
            last_name: raw.lastname,
            full_name: raw.display_full_name,
            // The service spells a missing nickname as the string "null"
            nickname: raw.nickname.filter(|nickname| nickname != "null"),
        })
    }

    pub fn id(&self) -> &EmployeeId {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.nickname {
            Some(nickname) => write!(f, "{} ({nickname})", self.full_name),
            None => write!(f, "{}", self.full_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use utilities::mocking;

    use super::*;
    use crate::client::test_client;

    fn payload(nickname: Value) -> Value {
        json!({
            "id": "1001",
            "firstname": "Jane",
            "lastname": "Doe",
            "displayFullName": "Jane Doe",
            "nickname": nickname,
        })
    }

    #[test]
    fn it_maps_an_employee() {
        let employee = Employee::from_payload(payload(json!("JD"))).unwrap();
        assert_eq!(employee.id().as_str(), "1001");
        assert_eq!(employee.first_name(), "Jane");
        assert_eq!(employee.last_name(), "Doe");
        assert_eq!(employee.full_name(), "Jane Doe");
        assert_eq!(employee.nickname(), Some("JD"));
        assert_eq!(employee.to_string(), "Jane Doe (JD)");
    }

    #[test]
    fn it_treats_the_null_string_as_no_nickname() {
        let employee = Employee::from_payload(payload(json!("null"))).unwrap();
        assert_eq!(employee.nickname(), None);
        assert_eq!(employee.to_string(), "Jane Doe");
    }

    #[test]
    fn it_treats_json_null_as_no_nickname() {
        let employee = Employee::from_payload(payload(Value::Null)).unwrap();
        assert_eq!(employee.nickname(), None);
    }

    #[test]
    fn it_keeps_other_nicknames_verbatim() {
        for nickname in ["Null", "nulls", " null", "JJ"] {
            let employee = Employee::from_payload(payload(json!(nickname))).unwrap();
            assert_eq!(employee.nickname(), Some(nickname));
            assert_eq!(employee.to_string(), format!("Jane Doe ({nickname})"));
        }
    }

    #[test]
    fn it_accepts_numeric_ids() {
        let mut data = payload(Value::Null);
        data["id"] = json!(42);
        let employee = Employee::from_payload(data).unwrap();
        assert_eq!(employee.id().as_str(), "42");
    }

    #[test]
    fn it_rejects_employees_without_id() {
        let mut data = payload(Value::Null);
        data.as_object_mut().unwrap().remove("id");
        assert!(matches!(Employee::from_payload(data), Err(Error::Mapping(_))));
    }

    #[tokio::test]
    async fn it_can_fetch_employees() {
        let mut server = mocking::FakeHotSchedules::new().await;
        let _login = server.mock_login(1).await;
        let m = server.mock_employees("employees", 1).await;

        let employees = test_client(&server).get_employees().await.unwrap();
        let names: Vec<String> = employees.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Jane Doe (JD)", "John Smith"]);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn it_fails_the_whole_list_on_a_malformed_employee() {
        let mut server = mocking::FakeHotSchedules::new().await;
        let _login = server.mock_login(1).await;
        let _m = server.mock_employees("employees_malformed", 1).await;

        let result = test_client(&server).get_employees().await;
        assert!(matches!(result, Err(Error::Mapping(_))));
    }
}
