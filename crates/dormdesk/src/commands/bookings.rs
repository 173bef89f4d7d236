//! Booking command handlers.

use tabled::Tabled;

use dormdesk_api::{
    Booking, BookingCreateRequest, BookingDetail, BookingHistoryFilters, BookingListFilters,
    BookingPage, MyBookingsFilters,
};
use dormdesk_core::date::parse_iso;
use dormdesk_core::format_time;

use crate::cli::{BookingsArgs, BookingsCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, paint_status, when};

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Coworking")]
    coworking: String,
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl BookingRow {
    fn new(d: &BookingDetail, color: bool) -> Self {
        let b = &d.booking;
        Self {
            id: b.id.clone(),
            coworking: d
                .coworking
                .as_ref()
                .map_or_else(|| b.coworking_id.clone(), |c| c.name.clone()),
            student: d.student.as_ref().map_or_else(
                || b.student_id.clone(),
                |s| format!("{} ({})", s.full_name(), s.room),
            ),
            from: when(&b.taken_from),
            to: end_time(b),
            status: paint_status(b.status.as_ref(), color),
        }
    }
}

/// Same-day bookings only need the end time.
fn end_time(b: &Booking) -> String {
    let same_day = match (parse_iso(&b.taken_from), parse_iso(&b.returned_back)) {
        (Ok(from), Ok(to)) => from.date() == to.date(),
        _ => false,
    };
    match format_time(&b.returned_back) {
        Ok(time) if same_day => time,
        _ => when(&b.returned_back),
    }
}

fn booking_lines(b: &Booking, color: bool) -> Vec<(&'static str, String)> {
    vec![
        ("ID", b.id.clone()),
        ("Status", paint_status(b.status.as_ref(), color)),
        ("Coworking", b.coworking_id.clone()),
        ("Student", b.student_id.clone()),
        ("From", when(&b.taken_from)),
        ("To", when(&b.returned_back)),
    ]
}

fn detail(d: &BookingDetail, color: bool) -> String {
    let mut lines = booking_lines(&d.booking, color);
    if let Some(c) = &d.coworking {
        lines.push((
            "Space",
            format!(
                "{} (building {}, entrance {}, no. {})",
                c.name, c.building, c.entrance, c.number
            ),
        ));
    }
    if let Some(s) = &d.student {
        lines.push((
            "Name",
            format!(
                "{}, room {} (building {}, entrance {})",
                s.full_name(),
                s.room,
                s.building,
                s.entrance
            ),
        ));
    }
    detail_lines(&lines)
}

fn render_page(ctx: &Context<'_>, page: &BookingPage) {
    ctx.print(&output::render_list(
        ctx.format,
        &page.items,
        |d| BookingRow::new(d, ctx.color),
        |d| d.id().to_owned(),
    ));
    let shown = u64::try_from(page.items.len()).unwrap_or(u64::MAX);
    ctx.note(&format!(
        "{}-{} of {}",
        u64::from(page.offset) + u64::from(shown > 0),
        u64::from(page.offset) + shown,
        page.total
    ));
}

fn render_booking(ctx: &Context<'_>, booking: &Booking) {
    ctx.print(&output::render_single(
        ctx.format,
        booking,
        |b| detail_lines(&booking_lines(b, ctx.color)),
        |b| b.id.clone(),
    ));
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: BookingsArgs) -> Result<(), CliError> {
    let store = ctx.client.coworkings();

    match args.command {
        BookingsCommand::Create {
            coworking,
            from,
            to,
        } => {
            ctx.open(&format!("/bookings/new/{coworking}"))?;
            let request = BookingCreateRequest {
                coworking_id: coworking,
                taken_from: from,
                returned_back: to,
            };
            let booking = store.create_booking(&request).await?;
            render_booking(ctx, &booking);
            ctx.note("Booking created");
            Ok(())
        }

        BookingsCommand::List {
            status,
            coworking,
            coworking_name,
            student,
            page,
        } => {
            ctx.open("/bookings/history")?;
            let filters = BookingListFilters {
                status,
                coworking_id: coworking,
                student_id: student,
                coworking_name,
                limit: page.limit,
                offset: page.offset,
            };
            let result = store.fetch_bookings(&filters).await?;
            render_page(ctx, &result);
            Ok(())
        }

        BookingsCommand::My { status, page } => {
            ctx.open("/bookings/my")?;
            let filters = MyBookingsFilters {
                status,
                limit: page.limit,
                offset: page.offset,
            };
            let result = store.fetch_my_bookings(&filters).await?;
            render_page(ctx, &result);
            Ok(())
        }

        BookingsCommand::Active => {
            ctx.open("/bookings/active")?;
            let active = store.fetch_active_bookings().await?;
            ctx.print(&output::render_list(
                ctx.format,
                &active,
                |d| BookingRow::new(d, ctx.color),
                |d| d.id().to_owned(),
            ));
            Ok(())
        }

        BookingsCommand::History {
            coworking,
            coworking_name,
            student,
            date_from,
            date_to,
            page,
        } => {
            ctx.open("/bookings/history")?;
            let filters = BookingHistoryFilters {
                coworking_id: coworking,
                coworking_name,
                student_id: student,
                date_from,
                date_to,
                limit: page.limit,
                offset: page.offset,
            };
            let result = store.fetch_booking_history(&filters).await?;
            render_page(ctx, &result);
            Ok(())
        }

        BookingsCommand::Show { id } => {
            ctx.open(&format!("/bookings/{id}"))?;
            let booking = store.fetch_booking(&id).await?;
            ctx.print(&output::render_single(
                ctx.format,
                &booking,
                |d| detail(d, ctx.color),
                |d| d.id().to_owned(),
            ));
            Ok(())
        }

        BookingsCommand::Confirm { id } => {
            ctx.open(&format!("/bookings/{id}"))?;
            let booking = store.confirm_booking(&id).await?;
            render_booking(ctx, &booking);
            Ok(())
        }

        BookingsCommand::Close { id } => {
            ctx.open(&format!("/bookings/{id}"))?;
            let booking = store.close_booking(&id).await?;
            render_booking(ctx, &booking);
            Ok(())
        }

        BookingsCommand::Cancel { id } => {
            ctx.open(&format!("/bookings/{id}"))?;
            let booking = store.cancel_booking(&id).await?;
            render_booking(ctx, &booking);
            Ok(())
        }
    }
}
