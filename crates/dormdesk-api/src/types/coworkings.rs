use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::pagination::OffsetPage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coworking {
    pub id: String,
    pub name: String,
    pub building: u32,
    pub entrance: u32,
    pub number: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentShort {
    pub user_id: String,
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub building: u32,
    pub entrance: u32,
    pub room: String,
}

impl StudentShort {
    pub fn full_name(&self) -> String {
        match &self.patronymic {
            Some(p) if !p.is_empty() => format!("{} {} {p}", self.last_name, self.first_name),
            _ => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

/// Booking status. Transitions are validated by the server; the client
/// only requests them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Created,
    Active,
    Completed,
    Cancelled,
}

/// Status transition requests: `PATCH /api/v1/bookings/{id}/{transition}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BookingTransition {
    Confirm,
    Close,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub student_id: String,
    pub coworking_id: String,
    pub taken_from: String,
    pub returned_back: String,
    pub status: BookingStatus,
}

/// A booking with denormalized student and coworking snapshots. Either
/// may be `null` when the server can no longer resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    #[serde(default)]
    pub student: Option<StudentShort>,
    #[serde(default)]
    pub coworking: Option<Coworking>,
}

impl BookingDetail {
    pub fn id(&self) -> &str {
        &self.booking.id
    }

    /// Overwrite the booking fields, keeping the student/coworking snapshots.
    pub fn merge(&mut self, updated: &Booking) {
        self.booking = updated.clone();
    }
}

pub type BookingPage = OffsetPage<BookingDetail>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCreateRequest {
    pub coworking_id: String,
    pub taken_from: String,
    pub returned_back: String,
}

/// Query filters for `GET /api/v1/coworkings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoworkingListFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// Query filters for `GET /api/v1/bookings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingListFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coworking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coworking_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query filters for `GET /api/v1/bookings/my`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MyBookingsFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query filters for `GET /api/v1/bookings/history`. No status filter:
/// history is the server's notion of finished bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingHistoryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coworking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coworking_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}
