//! Polls the ticker and posts a chat message when new tracks appear.

use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use paragliding_api::api::TickerPage;

#[derive(Parser)]
#[command(name = "clocktrigger")]
#[command(about = "Announce newly registered paragliding tracks to a chat webhook", long_about = None)]
struct Cli {
    /// Base URL of the API, e.g. http://localhost:8080/paragliding/api
    #[arg(short, long, env = "PARAGLIDING_API", default_value = "http://localhost:8080/paragliding/api")]
    api: String,

    /// Incoming-webhook URL of the chat channel.
    #[arg(short, long, env = "CTRIGGER_URL")]
    webhook_url: String,

    /// Seconds between polls.
    #[arg(short, long, default_value_t = 60)]
    interval_secs: u64,

    #[arg(long, default_value = "paragliding_bot")]
    username: String,

    #[arg(long, default_value = "https://hakkon.me/images/pepe.png")]
    icon_url: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    username: &'a str,
    icon_url: &'a str,
    text: String,
}

/// Latest timestamp, or `None` while no tracks exist.
async fn latest(client: &reqwest::Client, api: &str) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let response = client.get(format!("{}/ticker/latest", api)).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    Ok(Some(response.text().await?.trim().parse()?))
}

/// Ids of every track after `after`, following the ticker's pages.
async fn new_tracks(
    client: &reqwest::Client,
    api: &str,
    mut after: i64,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut ids = Vec::new();
    loop {
        let response = client.get(format!("{}/ticker/{}", api, after)).send().await?;
        if !response.status().is_success() {
            break;
        }
        let page: TickerPage = response.json().await?;
        ids.extend(page.tracks);
        if page.t_stop >= page.t_latest {
            break;
        }
        after = page.t_stop;
    }
    Ok(ids)
}

async fn announce(client: &reqwest::Client, cli: &Cli, ids: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let message = ChatMessage {
        username: &cli.username,
        icon_url: &cli.icon_url,
        text: format!("New tracks: {}", ids.join(", ")),
    };
    let response = client.post(&cli.webhook_url).json(&message).send().await?;
    println!("Announced {} track(s): {}", ids.len(), response.status());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let api = cli.api.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let mut seen = latest(&client, &api).await?.unwrap_or(0);
    println!("Watching {} (latest {})", api, seen);

    let mut interval = tokio::time::interval(Duration::from_secs(cli.interval_secs.max(1)));
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let current = match latest(&client, &api).await {
            Ok(Some(ts)) => ts,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Failed to poll ticker: {}", e);
                continue;
            }
        };
        if current <= seen {
            continue;
        }

        match new_tracks(&client, &api, seen).await {
            Ok(ids) if !ids.is_empty() => {
                if let Err(e) = announce(&client, &cli, &ids).await {
                    eprintln!("Failed to post message: {}", e);
                    continue;
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read ticker: {}", e);
                continue;
            }
        }
        seen = current;
    }

    Ok(())
}
