//! Watch a table session from the terminal
//!
//! Usage: cargo run --example watch_table -- <base-url> <session-id> [display-name]

use std::time::Duration;

use table_client::{ClientConfig, SessionStore, StoreStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let base_url = args
        .next()
        .unwrap_or_else(|| "http://localhost:8080".to_string());
    let session_id = args.next().ok_or_else(|| {
        anyhow::anyhow!("usage: watch_table <base-url> <session-id> [display-name]")
    })?;
    let display_name = args.next();

    let config = ClientConfig::new(base_url);
    let store = SessionStore::new(&config);
    store.initialize(&session_id).await?;

    if let Some(name) = display_name {
        let guest = store.join(&name, None).await?;
        println!("joined as {} {}", guest.avatar_emoji, guest.display_name);
    }

    loop {
        match store.status().await {
            StoreStatus::Active => {
                println!(
                    "table {} | {} guests | {} orders | total {:.2} | my unpaid {:.2}",
                    store.table_code().await.unwrap_or_default(),
                    store.guests().await.len(),
                    store.orders().await.len(),
                    store.total_table_amount().await,
                    store.my_unpaid_total().await,
                );
            }
            StoreStatus::Expired => {
                println!("session expired");
                break;
            }
            other => println!("status: {other:?}"),
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    store.disconnect().await;
    Ok(())
}
