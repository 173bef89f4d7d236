// Leave application endpoints
//
// `/api/v1/applications`: list (page-based envelope), fetch, create,
// decide, and multipart document upload.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    Application, ApplicationCreateRequest, ApplicationDecideRequest, ApplicationDetail,
    ApplicationDocument, ApplicationListFilters, DocumentUpload, Paginated,
};

const APPLICATIONS: &str = "api/v1/applications";

impl ApiClient {
    /// `GET /api/v1/applications` with the present filter fields as query params.
    pub async fn list_applications(
        &self,
        filters: &ApplicationListFilters,
    ) -> Result<Paginated<Application>, Error> {
        self.get_with_query(APPLICATIONS, filters).await
    }

    /// `GET /api/v1/applications/{id}`
    pub async fn get_application(&self, id: &str) -> Result<ApplicationDetail, Error> {
        self.get(&format!("{APPLICATIONS}/{id}")).await
    }

    /// `POST /api/v1/applications`
    pub async fn create_application(
        &self,
        request: &ApplicationCreateRequest,
    ) -> Result<Application, Error> {
        debug!("creating application");
        self.post(APPLICATIONS, request).await
    }

    /// `PATCH /api/v1/applications/{id}`: approve or reject.
    pub async fn decide_application(
        &self,
        id: &str,
        request: &ApplicationDecideRequest,
    ) -> Result<Application, Error> {
        debug!(id, decision = %request.status, "deciding application");
        self.patch(&format!("{APPLICATIONS}/{id}"), request).await
    }

    /// `POST /api/v1/applications/{id}/documents` as `multipart/form-data`
    /// with fields `document_type` and `file`.
    pub async fn upload_document(
        &self,
        application_id: &str,
        document_type: &str,
        upload: DocumentUpload,
    ) -> Result<ApplicationDocument, Error> {
        debug!(
            application_id,
            document_type,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "uploading document"
        );

        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(mime) = upload.mime_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        let form = Form::new()
            .text("document_type", document_type.to_owned())
            .part("file", part);

        self.post_multipart(&format!("{APPLICATIONS}/{application_id}/documents"), form)
            .await
    }
}
