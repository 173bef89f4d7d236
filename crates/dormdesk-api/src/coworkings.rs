// Coworking and booking endpoints
//
// Coworkings are read-only. Bookings have four list variants with
// disjoint filter sets, all using the offset-based envelope except
// `/active`, which returns a bare array.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    Booking, BookingCreateRequest, BookingDetail, BookingHistoryFilters, BookingListFilters,
    BookingPage, BookingTransition, Coworking, CoworkingListFilters, MyBookingsFilters,
};

const COWORKINGS: &str = "api/v1/coworkings";
const BOOKINGS: &str = "api/v1/bookings";

impl ApiClient {
    // ── Coworkings ───────────────────────────────────────────────────

    /// `GET /api/v1/coworkings`
    pub async fn list_coworkings(
        &self,
        filters: &CoworkingListFilters,
    ) -> Result<Vec<Coworking>, Error> {
        self.get_with_query(COWORKINGS, filters).await
    }

    /// `GET /api/v1/coworkings/{id}`
    pub async fn get_coworking(&self, id: &str) -> Result<Coworking, Error> {
        self.get(&format!("{COWORKINGS}/{id}")).await
    }

    // ── Bookings ─────────────────────────────────────────────────────

    /// `POST /api/v1/bookings`
    pub async fn create_booking(&self, request: &BookingCreateRequest) -> Result<Booking, Error> {
        debug!(coworking_id = %request.coworking_id, "creating booking");
        self.post(BOOKINGS, request).await
    }

    /// `GET /api/v1/bookings` (staff view, all students)
    pub async fn list_bookings(&self, filters: &BookingListFilters) -> Result<BookingPage, Error> {
        self.get_with_query(BOOKINGS, filters).await
    }

    /// `GET /api/v1/bookings/my`
    pub async fn list_my_bookings(
        &self,
        filters: &MyBookingsFilters,
    ) -> Result<BookingPage, Error> {
        self.get_with_query(&format!("{BOOKINGS}/my"), filters).await
    }

    /// `GET /api/v1/bookings/active`
    pub async fn list_active_bookings(&self) -> Result<Vec<BookingDetail>, Error> {
        self.get(&format!("{BOOKINGS}/active")).await
    }

    /// `GET /api/v1/bookings/history`
    pub async fn booking_history(
        &self,
        filters: &BookingHistoryFilters,
    ) -> Result<BookingPage, Error> {
        self.get_with_query(&format!("{BOOKINGS}/history"), filters)
            .await
    }

    /// `GET /api/v1/bookings/{id}`
    pub async fn get_booking(&self, id: &str) -> Result<BookingDetail, Error> {
        self.get(&format!("{BOOKINGS}/{id}")).await
    }

    /// `PATCH /api/v1/bookings/{id}/{confirm|close|cancel}`, no body.
    pub async fn transition_booking(
        &self,
        id: &str,
        transition: BookingTransition,
    ) -> Result<Booking, Error> {
        debug!(id, %transition, "booking status transition");
        self.patch_empty(&format!("{BOOKINGS}/{id}/{}", transition.as_ref()))
            .await
    }

    pub async fn confirm_booking(&self, id: &str) -> Result<Booking, Error> {
        self.transition_booking(id, BookingTransition::Confirm).await
    }

    pub async fn close_booking(&self, id: &str) -> Result<Booking, Error> {
        self.transition_booking(id, BookingTransition::Close).await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, Error> {
        self.transition_booking(id, BookingTransition::Cancel).await
    }
}
