//! Fetch the latest activity from Strava and frame its route.
//!
//! Run with: STRAVA_ACCESS_TOKEN=... cargo run --example fetch_activity --features http
//!
//! Optionally set STRAVA_REFRESH_TOKEN, STRAVA_EXPIRES_AT, STRAVA_CLIENT_ID and
//! STRAVA_CLIENT_SECRET to refresh an expired token first.

use std::time::{SystemTime, UNIX_EPOCH};

use route_scene::{
    prepare_from_streams, CameraPose, Credentials, OAuthApp, SceneState, StravaClient, StreamType,
    VisualizationConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut credentials = Credentials {
        access_token: std::env::var("STRAVA_ACCESS_TOKEN").ok(),
        refresh_token: std::env::var("STRAVA_REFRESH_TOKEN").ok(),
        expires_at: std::env::var("STRAVA_EXPIRES_AT").ok().and_then(|v| v.parse().ok()),
    };
    let app = OAuthApp::new(
        std::env::var("STRAVA_CLIENT_ID").unwrap_or_default(),
        std::env::var("STRAVA_CLIENT_SECRET").unwrap_or_default(),
    );
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

    let bootstrap = reqwest::Client::new();
    let token = credentials.ensure_valid_token(&app, &bootstrap, now).await?;
    let client = StravaClient::new(&token)?;

    let activities = client.list_activities(1, 5).await?;
    println!("Recent activities:");
    for a in &activities {
        println!("  {} {} ({}, {:.1}km)", a.id, a.name, a.sport_type, a.distance / 1000.0);
    }

    let Some(latest) = activities.first() else {
        println!("No activities");
        return Ok(());
    };

    let streams = client
        .get_activity_streams(latest.id, &[StreamType::Latlng, StreamType::Altitude, StreamType::Distance])
        .await?;

    let config = VisualizationConfig::default();
    match prepare_from_streams(&streams, &config, CameraPose::default())? {
        SceneState::NoData => println!("{}", config.ui.no_data_text),
        SceneState::Ready(frame) => {
            println!("\n{}: {} points, camera at {:.2?} looking at {:.2?}",
                latest.name, frame.points.len(), frame.pose.position, frame.pose.target);
        }
    }

    Ok(())
}
