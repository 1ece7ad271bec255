//! Binary to log in, connect to the Noren live feed and subscribe to the
//! touchline of a couple of NSE instruments plus order updates, for
//! inspecting live data.
//!
//! # Usage
//!
//! ```sh
//! export NOREN_HOST="https://broker.example/NorenWClientTP"
//! export NOREN_WS_ENDPOINT="wss://broker.example/NorenWSTP/"
//! export NOREN_USER_ID="your-user-id"
//! export NOREN_PASSWORD="your-password"
//! export NOREN_TWO_FA="your-totp"
//! export NOREN_VENDOR_CODE="your-vendor-code"
//! export NOREN_API_SECRET="your-api-secret"
//! export NOREN_IMEI="abc1234"
//! cargo run --bin feed_check --features cli
//! ```

use std::env;
use std::time::Duration;

use noren_rs::NorenClient;
use noren_rs::config::ServiceConfig;
use noren_rs::error::NorenError;
use noren_rs::types::auth::LoginRequest;
use noren_rs::ws::feed::ConnectionState;
use noren_rs::ws::handler::{FeedHandlers, LifecycleHandler};
use noren_rs::ws::message::{FeedKind, MarketData, OrderUpdate};
use tokio::time;

struct PrintLifecycle;

impl LifecycleHandler for PrintLifecycle {
    fn on_open(&self) {
        println!("Feed session acknowledged");
    }

    fn on_close(&self) {
        println!("Feed connection closed");
    }

    fn on_error(&self, error: &NorenError) {
        eprintln!("Feed error: {error}");
    }

    fn on_state_change(&self, state: ConnectionState) {
        println!("Feed state: {state}");
    }
}

fn var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("set {name} env var before running"))
}

#[tokio::main]
async fn main() -> noren_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut client = NorenClient::with_config(ServiceConfig::from_env());

    println!("Logging in…");
    let login = client
        .login(&LoginRequest {
            user_id: var("NOREN_USER_ID"),
            password: var("NOREN_PASSWORD"),
            two_fa: var("NOREN_TWO_FA"),
            vendor_code: var("NOREN_VENDOR_CODE"),
            api_secret: var("NOREN_API_SECRET"),
            imei: var("NOREN_IMEI"),
        })
        .await?;
    println!("Logged in as {}", login.uname.as_deref().unwrap_or("?"));

    let feed = client.feed()?;
    feed.start(
        FeedHandlers::new()
            .on_market_data(|data: &MarketData| println!("{data:#?}"))
            .on_order_update(|update: &OrderUpdate| println!("{update:#?}"))
            .lifecycle(PrintLifecycle),
    );

    // NIFTY 50 index and Reliance on NSE
    let instruments = ["NSE|26000", "NSE|2885"];
    println!("Subscribing to {instruments:?} (touchline)…");
    feed.subscribe(&instruments, FeedKind::Touchline).await?;
    feed.subscribe_orders().await?;

    println!("Listening for events for 10 seconds…");
    println!("(Note: quotes only arrive during market hours)\n");

    let deadline = time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);
    let mut states = feed.state_changes();

    loop {
        tokio::select! {
            _ = &mut deadline => {
                println!("\n10 seconds elapsed, disconnecting…");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    feed.stop().await;
    println!("Reconnects: {}", feed.reconnect_count());
    println!("Done.");

    Ok(())
}
