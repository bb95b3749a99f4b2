use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => models::appointment::STATUS_BOOKED,
            AppointmentStatus::Confirmed => models::appointment::STATUS_CONFIRMED,
            AppointmentStatus::Canceled => models::appointment::STATUS_CANCELED,
        }
    }

    /// Legal edges: booked → confirmed, booked → canceled, confirmed → canceled.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!((self, next), (Booked, Confirmed) | (Booked, Canceled) | (Confirmed, Canceled))
    }

    pub fn is_terminal(self) -> bool { self == AppointmentStatus::Canceled }

    /// Parse a list filter value. `scheduled` is accepted as an alias of `booked`.
    pub fn parse_filter(raw: &str) -> Result<Self, ServiceError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Booked),
            other => other.parse().map_err(|_| ServiceError::invalid_field("status", "Invalid status filter")),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(AppointmentStatus::Booked),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "canceled" => Ok(AppointmentStatus::Canceled),
            other => Err(ServiceError::Db(format!("unknown appointment status {other:?}"))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: String,
    pub service_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Half-open `[start_at, end_at)` overlap with another window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        overlaps(self.start_at, self.end_at, start, end)
    }

    /// Counts toward conflicts.
    pub fn is_live(&self) -> bool { self.status != AppointmentStatus::Canceled }
}

impl TryFrom<models::appointment::Model> for Appointment {
    type Error = ServiceError;

    fn try_from(m: models::appointment::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            service_id: m.service_id,
            start_at: m.start_at.with_timezone(&Utc),
            end_at: m.end_at.with_timezone(&Utc),
            status: m.status.parse()?,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        })
    }
}

/// `[a_start, a_end)` and `[b_start, b_end)` overlap iff `a_start < b_end && b_start < a_end`.
pub fn overlaps(a_start: DateTime<Utc>, a_end: DateTime<Utc>, b_start: DateTime<Utc>, b_end: DateTime<Utc>) -> bool {
    a_start < b_end && b_start < a_end
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC.
/// Years outside `1..=9999` are rejected either way.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .ok()?
            .and_utc(),
    };
    (1..=9999).contains(&parsed.year()).then_some(parsed)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentInput {
    #[serde(default)]
    pub service_id: Option<String>,
    /// Preferred over `start_at` when both are present.
    #[serde(default)]
    pub scheduled_for: Option<String>,
    #[serde(default)]
    pub start_at: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<String>,
    /// Honored for operators and admins only.
    pub user_id: Option<String>,
    /// Honored for operators and admins only.
    pub service_id: Option<String>,
}

/// Resolved list filter handed to the repository.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppointmentFilter {
    pub user_id: Option<String>,
    pub service_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn matches(&self, a: &Appointment) -> bool {
        self.user_id.as_deref().map_or(true, |u| a.user_id == u)
            && self.service_id.map_or(true, |s| a.service_id == s)
            && self.status.map_or(true, |s| a.status == s)
    }
}

/// A validated booking ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAppointment {
    pub user_id: String,
    pub service_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(h: u32, m: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2030, 5, 1, h, m, 0).unwrap() }

    #[test]
    fn half_open_overlap() {
        assert!(overlaps(t(10, 0), t(10, 30), t(10, 15), t(10, 45)));
        assert!(overlaps(t(10, 0), t(11, 0), t(10, 15), t(10, 30)));
        assert!(!overlaps(t(10, 0), t(10, 30), t(10, 30), t(11, 0)));
        assert!(!overlaps(t(10, 30), t(11, 0), t(10, 0), t(10, 30)));
    }

    #[test]
    fn transitions() {
        use AppointmentStatus::*;
        assert!(Booked.can_transition_to(Confirmed));
        assert!(Booked.can_transition_to(Canceled));
        assert!(Confirmed.can_transition_to(Canceled));
        assert!(!Confirmed.can_transition_to(Booked));
        assert!(!Canceled.can_transition_to(Booked));
        assert!(!Canceled.can_transition_to(Confirmed));
        assert!(Canceled.is_terminal());
    }

    #[test]
    fn status_filter_aliases() {
        assert_eq!(AppointmentStatus::parse_filter("scheduled").unwrap(), AppointmentStatus::Booked);
        assert_eq!(AppointmentStatus::parse_filter("BOOKED").unwrap(), AppointmentStatus::Booked);
        assert_eq!(AppointmentStatus::parse_filter("canceled").unwrap(), AppointmentStatus::Canceled);
        assert!(matches!(
            AppointmentStatus::parse_filter("archived"),
            Err(ServiceError::Validation { ref message, .. }) if message == "Invalid status filter"
        ));
    }

    #[test]
    fn instants() {
        assert_eq!(parse_instant("2030-05-01T10:00:00Z"), Some(t(10, 0)));
        assert_eq!(parse_instant("2030-05-01T12:00:00+02:00"), Some(t(10, 0)));
        assert_eq!(parse_instant("2030-05-01T10:00:00"), Some(t(10, 0)));
        assert_eq!(parse_instant("2030-05-01T10:00:00.250"), Some(t(10, 0) + Duration::milliseconds(250)));
        assert_eq!(parse_instant("2030-05-01T10:00"), Some(t(10, 0)));
        assert_eq!(parse_instant("tomorrow"), None);
        assert_eq!(parse_instant("2030-13-01T10:00:00Z"), None);
    }

    #[test]
    fn instants_beyond_four_digit_years_are_rejected() {
        assert_eq!(parse_instant("+262142-12-31T23:59:59"), None);
        assert_eq!(parse_instant("+10000-01-01T00:00:00"), None);
        assert_eq!(parse_instant("-0001-01-01T00:00:00"), None);
        assert!(parse_instant("9999-12-31T23:59:59").is_some());
    }

    #[test]
    fn filter_matching() {
        let a = Appointment {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            service_id: Uuid::new_v4(),
            start_at: t(9, 0),
            end_at: t(9, 30),
            status: AppointmentStatus::Booked,
            created_at: t(8, 0),
            updated_at: t(8, 0),
        };
        assert!(AppointmentFilter::default().matches(&a));
        assert!(AppointmentFilter { user_id: Some("u1".into()), ..Default::default() }.matches(&a));
        assert!(!AppointmentFilter { user_id: Some("u2".into()), ..Default::default() }.matches(&a));
        assert!(!AppointmentFilter { status: Some(AppointmentStatus::Confirmed), ..Default::default() }.matches(&a));
    }
}
