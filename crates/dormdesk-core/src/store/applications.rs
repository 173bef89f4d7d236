// ── Leave applications store ──

use std::sync::Arc;

use tracing::{debug, info};

use dormdesk_api::{
    ApiClient, Application, ApplicationCreateRequest, ApplicationDecideRequest,
    ApplicationDetail, ApplicationDocument, ApplicationListFilters, ApplicationStatus,
    DocumentUpload, Paginated,
};

use super::{StateCell, StoreState};
use crate::error::StoreError;
use crate::stream::StateStream;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Snapshot of the applications store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationsState {
    pub items: Vec<Application>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub current_detail: Option<ApplicationDetail>,
}

impl Default for ApplicationsState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            pages: 0,
            loading: false,
            error: None,
            current_detail: None,
        }
    }
}

impl ApplicationsState {
    /// Number of loaded applications still awaiting a decision.
    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending)
            .count()
    }
}

impl StoreState for ApplicationsState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    List,
    Detail,
}

/// Reactive container for leave applications.
pub struct ApplicationsStore {
    api: Arc<ApiClient>,
    cell: StateCell<ApplicationsState, Slot>,
}

impl ApplicationsStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            cell: StateCell::new(),
        }
    }

    pub fn state(&self) -> ApplicationsState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<ApplicationsState> {
        self.cell.subscribe()
    }

    /// Load a page of applications. `page` and `size` default to the
    /// store's current cursor; the response's cursor replaces it.
    pub async fn fetch_list(
        &self,
        filters: ApplicationListFilters,
    ) -> Result<Paginated<Application>, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::List);

        let current = self.cell.snapshot();
        let filters = ApplicationListFilters {
            page: filters.page.or(Some(current.page)),
            size: filters.size.or(Some(current.size)),
            ..filters
        };

        let result = self
            .api
            .list_applications(&filters)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        let applied = self.cell.apply(&ticket, |s| {
            s.items.clone_from(&result.items);
            s.total = result.total;
            s.page = result.page;
            s.size = result.size;
            s.pages = result.pages;
        });
        debug!(count = result.items.len(), applied, "applications list fetched");
        Ok(result)
    }

    /// Load one application with its documents into `current_detail`.
    pub async fn fetch_one(&self, id: &str) -> Result<ApplicationDetail, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::Detail);

        let detail = self
            .api
            .get_application(id)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        let applied = self
            .cell
            .apply(&ticket, |s| s.current_detail = Some(detail.clone()));
        debug!(id, applied, "application detail fetched");
        Ok(detail)
    }

    /// Submit a new application and prepend it to the loaded list.
    pub async fn create(
        &self,
        request: &ApplicationCreateRequest,
    ) -> Result<Application, StoreError> {
        let _guard = self.cell.begin();

        let created = self
            .api
            .create_application(request)
            .await
            .map_err(|e| self.cell.fail(e))?;

        self.cell.update(|s| s.items.insert(0, created.clone()));
        info!(id = %created.id, "application created");
        Ok(created)
    }

    /// Approve or reject. The list entry is replaced; the open detail is
    /// merged so its documents survive.
    pub async fn decide(
        &self,
        id: &str,
        request: &ApplicationDecideRequest,
    ) -> Result<Application, StoreError> {
        let _guard = self.cell.begin();

        let updated = self
            .api
            .decide_application(id, request)
            .await
            .map_err(|e| self.cell.fail(e))?;

        self.cell.update(|s| {
            if let Some(entry) = s.items.iter_mut().find(|a| a.id == id) {
                *entry = updated.clone();
            }
            if let Some(detail) = s.current_detail.as_mut().filter(|d| d.id() == id) {
                detail.merge(&updated);
            }
        });
        info!(id, status = %updated.status, "application decided");
        Ok(updated)
    }

    /// Attach a document; appended to `current_detail` when it is the
    /// same application.
    pub async fn upload_document(
        &self,
        application_id: &str,
        document_type: &str,
        upload: DocumentUpload,
    ) -> Result<ApplicationDocument, StoreError> {
        let _guard = self.cell.begin();

        let document = self
            .api
            .upload_document(application_id, document_type, upload)
            .await
            .map_err(|e| self.cell.fail(e))?;

        self.cell.update(|s| {
            if let Some(detail) = s
                .current_detail
                .as_mut()
                .filter(|d| d.id() == application_id)
            {
                detail.documents.push(document.clone());
            }
        });
        info!(application_id, document_type, id = %document.id, "document uploaded");
        Ok(document)
    }

    /// Restore every field to its default. Requests already in flight
    /// keep running but their fetch results are discarded.
    pub fn reset(&self) {
        self.cell.reset();
    }
}
