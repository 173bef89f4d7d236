use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle status of a leave application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// The reviewer's one-time decision on a pending application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Document kinds the server accepts. Other tags are passed through as-is.
pub mod document_type {
    pub const SIGNED_APPLICATION: &str = "signed_application";
    pub const PARENT_LETTER: &str = "parent_letter";
    pub const VOICE_MESSAGE: &str = "voice_message";

    pub const ALL: [&str; 3] = [SIGNED_APPLICATION, PARENT_LETTER, VOICE_MESSAGE];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub user_id: String,
    pub is_minor: bool,
    pub leave_time: String,
    pub return_time: String,
    pub reason: String,
    pub contact_phone: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub decided_by: Option<String>,
    #[serde(default)]
    pub decided_at: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    // Denormalized requester info; not every response carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    pub id: String,
    pub application_id: String,
    pub document_type: String,
    pub file_url: String,
    pub uploaded_by: String,
    pub created_at: String,
}

/// An application together with its uploaded documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    #[serde(default)]
    pub documents: Vec<ApplicationDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_decide: Option<bool>,
}

impl ApplicationDetail {
    pub fn id(&self) -> &str {
        &self.application.id
    }

    /// Merge a mutation response into this detail.
    ///
    /// Every field the response carries wins. The document list,
    /// `can_decide`, and denormalized requester fields the response left
    /// out are kept.
    pub fn merge(&mut self, updated: &Application) {
        let previous = std::mem::replace(&mut self.application, updated.clone());
        let app = &mut self.application;
        if app.user_name.is_none() {
            app.user_name = previous.user_name;
        }
        if app.room.is_none() {
            app.room = previous.room;
        }
        if app.entrance.is_none() {
            app.entrance = previous.entrance;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCreateRequest {
    pub leave_time: String,
    pub return_time: String,
    pub reason: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDecideRequest {
    pub status: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl ApplicationDecideRequest {
    pub fn approve() -> Self {
        Self {
            status: Decision::Approved,
            reject_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: Decision::Rejected,
            reject_reason: Some(reason.into()),
        }
    }
}

/// Query filters for `GET /api/v1/applications`.
///
/// Only fields that are `Some` end up in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationListFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// A file to attach to an application.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn application(status: &str) -> serde_json::Value {
        json!({
            "id": "a1",
            "user_id": "u1",
            "is_minor": false,
            "leave_time": "2025-03-01T10:00:00",
            "return_time": "2025-03-03T18:00:00",
            "reason": "Family visit",
            "contact_phone": "+79990000000",
            "status": status,
            "decided_by": null,
            "decided_at": null,
            "reject_reason": null,
            "created_at": "2025-02-20T09:00:00",
            "updated_at": "2025-02-20T09:00:00"
        })
    }

    #[test]
    fn detail_flattens_application_fields() {
        let mut raw = application("pending");
        raw["documents"] = json!([{
            "id": "d1",
            "application_id": "a1",
            "document_type": "parent_letter",
            "file_url": "https://files/d1.pdf",
            "uploaded_by": "u1",
            "created_at": "2025-02-20T09:05:00"
        }]);
        raw["user_name"] = json!("Ivanov Ivan");

        let detail: ApplicationDetail = serde_json::from_value(raw).unwrap();
        assert_eq!(detail.id(), "a1");
        assert_eq!(detail.application.status, ApplicationStatus::Pending);
        assert_eq!(detail.documents.len(), 1);
        assert_eq!(detail.application.user_name.as_deref(), Some("Ivanov Ivan"));
    }

    #[test]
    fn merge_keeps_documents_and_denormalized_fields() {
        let mut raw = application("pending");
        raw["documents"] = json!([]);
        raw["room"] = json!("412");
        let mut detail: ApplicationDetail = serde_json::from_value(raw).unwrap();
        detail.documents.push(ApplicationDocument {
            id: "d1".into(),
            application_id: "a1".into(),
            document_type: document_type::SIGNED_APPLICATION.into(),
            file_url: "u".into(),
            uploaded_by: "u1".into(),
            created_at: "t".into(),
        });

        let mut updated: Application = serde_json::from_value(application("rejected")).unwrap();
        updated.reject_reason = Some("Exams".into());
        detail.merge(&updated);

        assert_eq!(detail.application.status, ApplicationStatus::Rejected);
        assert_eq!(detail.application.reject_reason.as_deref(), Some("Exams"));
        assert_eq!(detail.application.room.as_deref(), Some("412"));
        assert_eq!(detail.documents.len(), 1);
    }

    #[test]
    fn decide_request_omits_missing_reason() {
        let body = serde_json::to_value(ApplicationDecideRequest::approve()).unwrap();
        assert_eq!(body, json!({ "status": "approved" }));

        let body = serde_json::to_value(ApplicationDecideRequest::reject("late")).unwrap();
        assert_eq!(body, json!({ "status": "rejected", "reject_reason": "late" }));
    }

    #[test]
    fn status_string_forms() {
        assert_eq!(ApplicationStatus::Approved.to_string(), "approved");
        assert_eq!("rejected".parse::<Decision>().unwrap(), Decision::Rejected);
    }
}
