//! Booking summary for one day.
//!
//! Usage: `cinema-admin [YYYY-MM-DD | YYYY/MM/DD]` (defaults to today in
//! `SHEETS_UTC_OFFSET_HOURS`). Settings are read from the environment and an
//! optional `.env` file.

use anyhow::Context;
use chrono::NaiveDate;
use cinema_admin::features::{BookingListAction, BookingListEnvironment, BookingListReducer, BookingListState};
use cinema_admin::{SeatCode, SheetsBookingService, SheetsClient, SheetsConfig};
use cinema_admin_core::environment::SystemClock;
use cinema_admin_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; variables may come from the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SheetsConfig::from_env().context("loading sheet configuration")?;
    info!(
        endpoint = %config.endpoint,
        sheet = %config.sheet_name,
        "Configuration loaded"
    );

    let date = std::env::args()
        .nth(1)
        .map(|arg| parse_date_arg(&arg))
        .transpose()?;

    let timeout = config.timeout;
    let utc_offset = config.utc_offset;
    let service = SheetsBookingService::shared(SheetsClient::new(config)?);
    let env = BookingListEnvironment::new(service, Arc::new(SystemClock), utc_offset);
    let store = Store::new(BookingListState::new(), BookingListReducer::new(), env);

    let action = date.map_or(BookingListAction::FetchToday, |date| BookingListAction::Fetch { date });
    store
        .send_and_wait_for(
            action,
            |a| matches!(a, BookingListAction::Fetched { .. }),
            timeout + Duration::from_secs(5),
        )
        .await?;

    let state = store.state(Clone::clone).await;
    store.close().await?;

    if let Some(error) = &state.last_error {
        anyhow::bail!("could not fetch bookings: {error}");
    }

    let day = state
        .selected_date
        .map_or_else(|| "today".to_string(), |d| d.to_string());
    println!("Bookings made on {day}: {}", state.bookings.len());
    for booking in &state.bookings {
        println!(
            "  {} {} {:<20} {:>2} × {} {:<12} {}",
            booking.show_date,
            booking.show_time.format("%H:%M"),
            booking.movie_name,
            booking.ticket_count,
            booking.ticket_type,
            SeatCode::join(&booking.seats),
            booking.total_amount,
        );
    }
    println!("Tickets: {}", state.total_tickets());
    println!("Revenue: {}", state.total_revenue());

    Ok(())
}

fn parse_date_arg(arg: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(arg, "%Y/%m/%d"))
        .with_context(|| format!("{arg:?} is not a date (expected YYYY-MM-DD)"))
}
