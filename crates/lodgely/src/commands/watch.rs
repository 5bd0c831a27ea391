//! Live listing view: start the sync engine and re-render on every change.

use chrono::Local;
use lodgely_core::{CategoryFilter, ListingId, ListingSnapshot, ListingView};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::listings::{self, ListingRow};
use super::util::{self, Session};

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.interval.is_some_and(|i| i.is_zero()) {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let session = util::connect_with(global, |engine| {
        if let Some(interval) = args.interval {
            engine.refresh_interval = interval;
        }
        engine.auto_refresh = true;
    })?;

    let mut view = ListingView::new();
    if let Some(ref raw) = args.category {
        view.set_filter(CategoryFilter::parse(raw));
    }
    if let Some(id) = args.select {
        view.select(ListingId::new(id));
    }

    let outcome = session.engine.start().await?;
    util::require_refresh(&session, outcome)?;

    // First frame comes from the subscription itself.
    let mut stream = session.engine.subscribe();
    let first = stream.current().clone();
    render(&session, &mut view, &first, global)?;
    let result = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break Ok(()),
            next = stream.changed() => match next {
                Some(snap) => {
                    if let Err(e) = render(&session, &mut view, &snap, global) {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            },
        }
    };

    session.engine.shutdown().await;
    tracing::info!("watch stopped");
    result
}

fn render(
    session: &Session,
    view: &mut ListingView,
    snap: &ListingSnapshot,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let followed = view.selected().cloned();
    view.reconcile(snap);
    let visible = view.visible(snap);
    let out = output::render_list(
        &global.output,
        &visible,
        |l| ListingRow::from(l),
        |l| l.id.to_string(),
    )?;

    if !global.quiet {
        let color = output::should_color(&global.color);
        let stamp = session.engine.last_refresh().map_or_else(
            || "never".to_owned(),
            |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        );
        let header = format!(
            "{} of {} listings, refreshed {stamp}, every {}",
            visible.len(),
            snap.len(),
            humantime::format_duration(session.engine.config().refresh_interval),
        );
        eprintln!("{}", output::dim(&header, color));
    }
    output::print_output(&out, global.quiet);

    // Details only make sense next to the table.
    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        match view.selected() {
            Some(id) => {
                if let Some(listing) = visible.iter().find(|l| &l.id == id) {
                    println!("\n{}", listings::detail(listing));
                }
            }
            None => {
                if let Some(id) = followed {
                    eprintln!("Listing {id} is no longer listed");
                }
            }
        }
    }
    Ok(())
}
