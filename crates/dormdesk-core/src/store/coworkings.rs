// ── Coworkings & bookings store ──
//
// `bookings` is shared by the staff list, "my bookings" and history
// views; whichever of those fetches was issued last owns the slot.

use std::sync::Arc;

use tracing::{debug, info};

use dormdesk_api::{
    ApiClient, Booking, BookingCreateRequest, BookingDetail, BookingHistoryFilters,
    BookingListFilters, BookingPage, BookingTransition, Coworking, CoworkingListFilters,
    MyBookingsFilters,
};

use super::{StateCell, StoreState};
use crate::error::StoreError;
use crate::stream::StateStream;

pub const DEFAULT_LIMIT: u32 = 20;

/// Snapshot of the coworkings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoworkingsState {
    pub coworkings: Vec<Coworking>,
    pub bookings: Vec<BookingDetail>,
    pub active_bookings: Vec<BookingDetail>,
    pub current_booking: Option<BookingDetail>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for CoworkingsState {
    fn default() -> Self {
        Self {
            coworkings: Vec::new(),
            bookings: Vec::new(),
            active_bookings: Vec::new(),
            current_booking: None,
            total: 0,
            limit: DEFAULT_LIMIT,
            offset: 0,
            loading: false,
            error: None,
        }
    }
}

impl CoworkingsState {
    fn apply_page(&mut self, page: &BookingPage) {
        self.bookings.clone_from(&page.items);
        self.total = page.total;
        self.limit = page.limit;
        self.offset = page.offset;
    }

    /// Merge a transition result into every loaded copy of the booking.
    fn patch_booking(&mut self, updated: &Booking) {
        let matching = self
            .bookings
            .iter_mut()
            .chain(self.active_bookings.iter_mut())
            .chain(self.current_booking.as_mut())
            .filter(|b| b.id() == updated.id);
        for booking in matching {
            booking.merge(updated);
        }
    }
}

impl StoreState for CoworkingsState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Coworkings,
    Bookings,
    ActiveBookings,
    CurrentBooking,
}

/// Reactive container for coworkings and bookings.
pub struct CoworkingsStore {
    api: Arc<ApiClient>,
    cell: StateCell<CoworkingsState, Slot>,
}

impl CoworkingsStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            cell: StateCell::new(),
        }
    }

    pub fn state(&self) -> CoworkingsState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<CoworkingsState> {
        self.cell.subscribe()
    }

    // ── Coworkings ───────────────────────────────────────────────────

    pub async fn fetch_coworkings(
        &self,
        filters: &CoworkingListFilters,
    ) -> Result<Vec<Coworking>, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::Coworkings);

        let coworkings = self
            .api
            .list_coworkings(filters)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        let applied = self
            .cell
            .apply(&ticket, |s| s.coworkings.clone_from(&coworkings));
        debug!(count = coworkings.len(), applied, "coworkings fetched");
        Ok(coworkings)
    }

    // ── Bookings ─────────────────────────────────────────────────────

    /// Create a booking. Lists are left alone; views refetch the one they show.
    pub async fn create_booking(&self, request: &BookingCreateRequest) -> Result<Booking, StoreError> {
        let _guard = self.cell.begin();

        let booking = self
            .api
            .create_booking(request)
            .await
            .map_err(|e| self.cell.fail(e))?;

        info!(id = %booking.id, coworking_id = %booking.coworking_id, "booking created");
        Ok(booking)
    }

    pub async fn fetch_my_bookings(
        &self,
        filters: &MyBookingsFilters,
    ) -> Result<BookingPage, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::Bookings);

        let page = self
            .api
            .list_my_bookings(filters)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        self.apply_page(&ticket, &page, "my bookings");
        Ok(page)
    }

    pub async fn fetch_bookings(
        &self,
        filters: &BookingListFilters,
    ) -> Result<BookingPage, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::Bookings);

        let page = self
            .api
            .list_bookings(filters)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        self.apply_page(&ticket, &page, "bookings");
        Ok(page)
    }

    pub async fn fetch_booking_history(
        &self,
        filters: &BookingHistoryFilters,
    ) -> Result<BookingPage, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::Bookings);

        let page = self
            .api
            .booking_history(filters)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        self.apply_page(&ticket, &page, "booking history");
        Ok(page)
    }

    pub async fn fetch_active_bookings(&self) -> Result<Vec<BookingDetail>, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::ActiveBookings);

        let active = self
            .api
            .list_active_bookings()
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        let applied = self
            .cell
            .apply(&ticket, |s| s.active_bookings.clone_from(&active));
        debug!(count = active.len(), applied, "active bookings fetched");
        Ok(active)
    }

    pub async fn fetch_booking(&self, id: &str) -> Result<BookingDetail, StoreError> {
        let _guard = self.cell.begin();
        let ticket = self.cell.ticket(Slot::CurrentBooking);

        let booking = self
            .api
            .get_booking(id)
            .await
            .map_err(|e| self.cell.fail_if_current(&ticket, e))?;

        let applied = self
            .cell
            .apply(&ticket, |s| s.current_booking = Some(booking.clone()));
        debug!(id, applied, "booking fetched");
        Ok(booking)
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub async fn confirm_booking(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingTransition::Confirm).await
    }

    pub async fn close_booking(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingTransition::Close).await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingTransition::Cancel).await
    }

    async fn transition(
        &self,
        id: &str,
        transition: BookingTransition,
    ) -> Result<Booking, StoreError> {
        let _guard = self.cell.begin();

        let updated = self
            .api
            .transition_booking(id, transition)
            .await
            .map_err(|e| self.cell.fail(e))?;

        self.cell.update(|s| s.patch_booking(&updated));
        info!(id, %transition, status = %updated.status, "booking transitioned");
        Ok(updated)
    }

    /// Restore every field to its default. Requests already in flight
    /// keep running but their fetch results are discarded.
    pub fn reset(&self) {
        self.cell.reset();
    }

    fn apply_page(&self, ticket: &super::Ticket<Slot>, page: &BookingPage, what: &str) {
        let applied = self.cell.apply(ticket, |s| s.apply_page(page));
        debug!(count = page.items.len(), total = page.total, applied, "{what} fetched");
    }
}
