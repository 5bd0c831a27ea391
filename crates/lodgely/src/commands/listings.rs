//! Listing command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tokio::sync::broadcast;

use lodgely_core::{
    AutoConfirm, CategoryFilter, Listing, ListingDraft, ListingId, ListingView, MutationController,
    MutationOutcome, Notification, NotificationLevel, categories,
};

use crate::cli::{EditArgs, GlobalOpts, ListingsArgs, ListingsCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, CliConfirm};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ListingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rooms")]
    rooms: u32,
    #[tabled(rename = "Guests")]
    guests: u32,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&Arc<Listing>> for ListingRow {
    fn from(l: &Arc<Listing>) -> Self {
        Self {
            id: l.id.to_string(),
            title: l.title.clone(),
            category: or_dash(&l.category),
            price: format_price(l.price),
            rooms: l.room_count,
            guests: l.guest_count,
            location: or_dash(&l.location_value),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    name: String,
}

fn or_dash(s: &str) -> String {
    if s.is_empty() { "-".into() } else { s.to_owned() }
}

/// Whole prices print without decimals.
pub(super) fn format_price(price: f64) -> String {
    if price.fract().abs() < f64::EPSILON {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

pub(super) fn detail(l: &Listing) -> String {
    let mut lines = vec![
        format!("ID:          {}", l.id),
        format!("Title:       {}", l.title),
        format!("Category:    {}", or_dash(&l.category)),
        format!("Price:       {}", format_price(l.price)),
        format!("Rooms:       {}", l.room_count),
        format!("Bathrooms:   {}", l.bathroom_count),
        format!("Guests:      {}", l.guest_count),
        format!("Location:    {}", or_dash(&l.location_value)),
        format!("Image:       {}", or_dash(&l.image_src)),
    ];
    if let Some(size) = l.size {
        lines.push(format!("Size:        {size}"));
    }
    if let Some(created) = l.created_at {
        lines.push(format!("Created:     {}", created.format("%Y-%m-%d %H:%M UTC")));
    }
    if !l.description.is_empty() {
        lines.push(String::new());
        lines.push(l.description.clone());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ListingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ListingsCommand::List { category } => {
            let session = util::connect(global)?;
            let snap = util::require_refresh(&session, session.engine.refresh_now().await)?;

            let mut view = ListingView::new();
            if let Some(ref raw) = category {
                view.set_filter(CategoryFilter::parse(raw));
            }
            let visible = view.visible(&snap);
            let out = output::render_list(
                &global.output,
                &visible,
                |l| ListingRow::from(l),
                |l| l.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ListingsCommand::Categories => {
            let session = util::connect(global)?;
            let snap = util::require_refresh(&session, session.engine.refresh_now().await)?;

            let names = categories(&snap);
            let out = output::render_list(
                &global.output,
                &names,
                |name| CategoryRow { name: name.clone() },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ListingsCommand::Show { id } => {
            let session = util::connect(global)?;
            util::require_refresh(&session, session.engine.refresh_now().await)?;

            let listing = session
                .engine
                .get(&ListingId::new(id.clone()))
                .ok_or(CliError::NotFound { identifier: id })?;
            let out = output::render_single(
                &global.output,
                listing.as_ref(),
                detail,
                |l| l.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ListingsCommand::Edit(edit) => {
            if !edit.has_changes() {
                return Err(CliError::Validation {
                    field: "edit".into(),
                    reason: "at least one field flag is required".into(),
                });
            }

            let session = util::connect(global)?;
            let snap = util::require_refresh(&session, session.engine.refresh_now().await)?;

            let mut view = ListingView::new();
            view.open_editor(ListingId::new(edit.id.clone()));
            view.reconcile(&snap);
            let Some(id) = view.editing().cloned() else {
                return Err(CliError::NotFound {
                    identifier: edit.id.clone(),
                });
            };

            // Saving an edit has no confirmation step.
            let controller = MutationController::new(session.engine.clone(), AutoConfirm(true));
            let mut notes = controller.notifications();

            let mut form = controller.begin_edit(&id)?;
            form.edit(|draft| apply_edit_args(draft, &edit))?;

            let outcome = controller
                .save(&mut form)
                .await
                .map_err(|e| util::mutation_error(e, &session.profile_name))?;
            report(&mut notes, global);

            match outcome {
                MutationOutcome::Committed {
                    listing: Some(listing),
                    ..
                } => {
                    let out = output::render_single(
                        &global.output,
                        listing.as_ref(),
                        detail,
                        |l| l.id.to_string(),
                    )?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                MutationOutcome::Committed { listing: None, .. } | MutationOutcome::Cancelled => {
                    Ok(())
                }
                MutationOutcome::Failed { error } => {
                    Err(util::mutation_error(error, &session.profile_name))
                }
            }
        }

        ListingsCommand::Delete { id } => {
            let confirm = CliConfirm::for_action(global, "listings delete")?;

            let session = util::connect(global)?;
            util::require_refresh(&session, session.engine.refresh_now().await)?;

            let controller = MutationController::new(session.engine.clone(), confirm);
            let mut notes = controller.notifications();

            let outcome = controller
                .delete(&ListingId::new(id))
                .await
                .map_err(|e| util::mutation_error(e, &session.profile_name))?;
            report(&mut notes, global);

            match outcome {
                MutationOutcome::Committed { .. } => Ok(()),
                MutationOutcome::Cancelled => {
                    if !global.quiet {
                        eprintln!("Delete cancelled");
                    }
                    Ok(())
                }
                MutationOutcome::Failed { error } => {
                    Err(util::mutation_error(error, &session.profile_name))
                }
            }
        }
    }
}

/// Copy the flags that were passed onto the draft.
fn apply_edit_args(draft: &mut ListingDraft, edit: &EditArgs) {
    if let Some(ref v) = edit.title {
        draft.title.clone_from(v);
    }
    if let Some(ref v) = edit.description {
        draft.description.clone_from(v);
    }
    if let Some(ref v) = edit.price {
        draft.price.clone_from(v);
    }
    if let Some(ref v) = edit.category {
        draft.category.clone_from(v);
    }
    if let Some(ref v) = edit.image {
        draft.image_src.clone_from(v);
    }
    if let Some(v) = edit.rooms {
        draft.room_count = v;
    }
    if let Some(v) = edit.baths {
        draft.bathroom_count = v;
    }
    if let Some(v) = edit.guests {
        draft.guest_count = v;
    }
    if let Some(ref v) = edit.location {
        draft.location_value.clone_from(v);
    }
}

/// Print success notifications. Failures surface as the command's error.
fn report(notes: &mut broadcast::Receiver<Notification>, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    while let Ok(note) = notes.try_recv() {
        if note.level == NotificationLevel::Success && !global.quiet {
            eprintln!("{}", output::format_notification(&note, color));
        }
    }
}
