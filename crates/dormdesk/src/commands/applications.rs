//! Leave application command handlers.

use std::path::Path;

use tabled::Tabled;

use dormdesk_api::{
    Application, ApplicationCreateRequest, ApplicationDecideRequest, ApplicationDetail,
    ApplicationListFilters, DocumentUpload,
};

use crate::cli::{ApplicationsArgs, ApplicationsCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, paint_status, when};

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ApplicationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Leave")]
    leave: String,
    #[tabled(rename = "Return")]
    ret: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Minor")]
    minor: String,
}

impl ApplicationRow {
    fn new(a: &Application, color: bool) -> Self {
        Self {
            id: a.id.clone(),
            student: a.user_name.clone().unwrap_or_else(|| a.user_id.clone()),
            room: a.room.clone().unwrap_or_default(),
            leave: when(&a.leave_time),
            ret: when(&a.return_time),
            status: paint_status(a.status.as_ref(), color),
            minor: if a.is_minor { "yes".into() } else { String::new() },
        }
    }
}

fn summary(a: &Application, color: bool) -> String {
    detail_lines(&[
        ("ID", a.id.clone()),
        ("Status", paint_status(a.status.as_ref(), color)),
        ("Student", a.user_name.clone().unwrap_or_else(|| a.user_id.clone())),
        ("Room", a.room.clone().unwrap_or_default()),
        (
            "Entrance",
            a.entrance.map(|e| e.to_string()).unwrap_or_default(),
        ),
        ("Minor", if a.is_minor { "yes".into() } else { "no".into() }),
        ("Leave", when(&a.leave_time)),
        ("Return", when(&a.return_time)),
        ("Reason", a.reason.clone()),
        ("Phone", a.contact_phone.clone()),
        ("Decided by", a.decided_by.clone().unwrap_or_default()),
        (
            "Decided at",
            a.decided_at.as_deref().map(when).unwrap_or_default(),
        ),
        ("Reject reason", a.reject_reason.clone().unwrap_or_default()),
        ("Created", when(&a.created_at)),
    ])
}

fn detail(d: &ApplicationDetail, color: bool) -> String {
    let mut out = summary(&d.application, color);
    if d.documents.is_empty() {
        out.push_str("\n\nNo documents");
    } else {
        out.push_str("\n\nDocuments:");
        for doc in &d.documents {
            out.push_str(&format!(
                "\n  {}  {}  {}  ({})",
                doc.id,
                doc.document_type,
                doc.file_url,
                when(&doc.created_at)
            ));
        }
    }
    out
}

/// MIME type for common upload extensions.
fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "heic" => "image/heic",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        _ => return None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: ApplicationsArgs) -> Result<(), CliError> {
    let store = ctx.client.applications();

    match args.command {
        ApplicationsCommand::List(list) => {
            ctx.open("/applications")?;
            let filters = ApplicationListFilters {
                page: list.page,
                size: list.size,
                status: list.status,
                date_from: list.date_from,
                date_to: list.date_to,
                entrance: list.entrance,
                room: list.room,
            };
            let page = store.fetch_list(filters).await?;
            ctx.print(&output::render_list(
                ctx.format,
                &page.items,
                |a| ApplicationRow::new(a, ctx.color),
                |a| a.id.clone(),
            ));
            ctx.note(&format!(
                "page {} of {} ({} total, {} pending here)",
                page.page,
                page.pages,
                page.total,
                store.state().pending_count()
            ));
            Ok(())
        }

        ApplicationsCommand::Show { id } => {
            ctx.open(&format!("/applications/{id}"))?;
            let found = store.fetch_one(&id).await?;
            ctx.print(&output::render_single(
                ctx.format,
                &found,
                |d| detail(d, ctx.color),
                |d| d.id().to_owned(),
            ));
            Ok(())
        }

        ApplicationsCommand::Create(create) => {
            ctx.open("/applications/new")?;
            let request = ApplicationCreateRequest {
                leave_time: create.leave_time,
                return_time: create.return_time,
                reason: create.reason,
                contact_phone: create.contact_phone,
            };
            let created = store.create(&request).await?;
            ctx.print(&output::render_single(
                ctx.format,
                &created,
                |a| summary(a, ctx.color),
                |a| a.id.clone(),
            ));
            ctx.note("Application submitted");
            Ok(())
        }

        ApplicationsCommand::Decide { id, decision } => {
            ctx.open(&format!("/applications/{id}"))?;
            let request = match decision.reject {
                Some(reason) if !reason.trim().is_empty() => {
                    ApplicationDecideRequest::reject(reason)
                }
                Some(_) => {
                    return Err(CliError::Validation {
                        field: "reject".into(),
                        reason: "a rejection needs a reason".into(),
                    });
                }
                None => ApplicationDecideRequest::approve(),
            };
            let updated = store.decide(&id, &request).await?;
            ctx.print(&output::render_single(
                ctx.format,
                &updated,
                |a| summary(a, ctx.color),
                |a| a.id.clone(),
            ));
            ctx.note(&format!("Application {}", updated.status));
            Ok(())
        }

        ApplicationsCommand::Upload {
            id,
            file,
            document_type,
            mime,
        } => {
            ctx.open(&format!("/applications/{id}"))?;
            if !dormdesk_api::document_type::ALL.contains(&document_type.as_str()) {
                tracing::warn!(%document_type, "unrecognized document type, sending as-is");
            }
            let bytes = std::fs::read(&file)?;
            let file_name = file
                .file_name()
                .map_or_else(|| "upload".into(), |n| n.to_string_lossy().into_owned());
            let mut upload = DocumentUpload::new(file_name, bytes);
            if let Some(mime) = mime.as_deref().or_else(|| guess_mime(&file)) {
                upload = upload.with_mime_type(mime);
            }

            let document = store.upload_document(&id, &document_type, upload).await?;
            ctx.print(&output::render_single(
                ctx.format,
                &document,
                |d| {
                    detail_lines(&[
                        ("ID", d.id.clone()),
                        ("Type", d.document_type.clone()),
                        ("URL", d.file_url.clone()),
                        ("Uploaded", when(&d.created_at)),
                    ])
                },
                |d| d.id.clone(),
            ));
            Ok(())
        }
    }
}
