//! Terminal surface for the mask-stock map core.
//!
//! `query` runs a one-shot geo query and prints the actionable stations;
//! `watch` drives a full map session at a fixed viewport, printing each
//! pin-set replacement as the refresh controller applies it.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maskmap_api::client::MAX_QUERY_RADIUS_M;
use maskmap_api::StoreClient;
use maskmap_core::timestamp::parse_wire_timestamp;
use maskmap_core::{GeoPoint, ViewportRegion};
use maskmap_refresh::{project, MapEvent, MapSession, PinRecord, RefreshConfig};

#[derive(Debug, Parser)]
#[command(name = "maskmap")]
#[command(about = "Nearby mask-stock reporting stations, from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// One-shot geo query: fetch, project and print actionable stations.
    Query {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        /// Query radius in meters (capped at the API's 5000 m limit).
        #[arg(long, default_value_t = 1000)]
        radius: u32,
    },
    /// Run a refresh session at a fixed viewport and print pin updates.
    Watch {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        /// Visible viewport radius in meters.
        #[arg(long, default_value_t = 1000.0)]
        radius: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = maskmap_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Query { lat, lng, radius } => query(&config, lat, lng, radius).await,
        Commands::Watch { lat, lng, radius } => watch(&config, lat, lng, radius).await,
    }
}

async fn query(
    config: &maskmap_core::AppConfig,
    lat: f64,
    lng: f64,
    radius: u32,
) -> anyhow::Result<()> {
    let radius = if radius > MAX_QUERY_RADIUS_M {
        tracing::warn!(radius, cap = MAX_QUERY_RADIUS_M, "radius capped to API limit");
        MAX_QUERY_RADIUS_M
    } else {
        radius
    };

    let client = StoreClient::with_base_url(config.request_timeout_secs, &config.api_base_url)?;
    let response = client
        .fetch_stores(GeoPoint::new(lat, lng), radius)
        .await
        .context("geo query failed")?;

    let pins = project(response.stores);
    println!(
        "{} stations reported, {} actionable",
        response.count,
        pins.len()
    );
    let now = Local::now().naive_local();
    for pin in &pins {
        println!("{}", describe_pin(pin, now));
    }
    Ok(())
}

async fn watch(
    config: &maskmap_core::AppConfig,
    lat: f64,
    lng: f64,
    radius: f64,
) -> anyhow::Result<()> {
    let client = Arc::new(StoreClient::with_base_url(
        config.request_timeout_secs,
        &config.api_base_url,
    )?);
    let (session, mut handle) = MapSession::new(client, RefreshConfig::from_app_config(config));
    let session_task = tokio::spawn(session.run());

    let viewport = ViewportRegion {
        center: GeoPoint::new(lat, lng),
        visible_radius_m: radius,
    };
    handle
        .events
        .send(MapEvent::ViewportChanged(viewport))
        .await
        .map_err(|_| anyhow::anyhow!("session ended before the first viewport report"))?;

    loop {
        tokio::select! {
            changed = handle.pins.changed() => {
                if changed.is_err() {
                    break;
                }
                let pins = handle.pins.borrow_and_update().clone();
                let now = Local::now().naive_local();
                println!("-- {} pins --", pins.len());
                for pin in &pins {
                    println!("{}", describe_pin(pin, now));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch session");
                break;
            }
        }
    }

    drop(handle);
    session_task.await.context("session task panicked")?;
    Ok(())
}

/// One line per pin: name, supply label, pin tint, and how old the stock
/// report is relative to `now`.
fn describe_pin(pin: &PinRecord, now: NaiveDateTime) -> String {
    let age = pin
        .stock_at
        .as_deref()
        .and_then(parse_wire_timestamp)
        .map_or_else(
            || "no stock report".to_owned(),
            |ts| format_age(now.signed_duration_since(ts)),
        );
    format!(
        "{} ({:.5}, {:.5}) [{} / {}] {}",
        pin.name,
        pin.position.lat,
        pin.position.lng,
        pin.status.label(),
        pin.status.color().name(),
        age
    )
}

fn format_age(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        "just now".to_owned()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else {
        format!("{}h {}m ago", minutes / 60, minutes % 60)
    }
}
