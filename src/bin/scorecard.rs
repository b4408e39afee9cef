use std::env;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use cricket_scorer::config::Config;
use cricket_scorer::db::{self, matches::export_json, MatchStore, PlayerNameStore};
use cricket_scorer::models::Match;
use cricket_scorer::scorecard::{
    decode_shared, encode_match, format_date, render_scorecard, render_status, share_link,
};

const USAGE: &str = "usage: scorecard [list | current | show ID | export ID | delete ID | clear | players | decode PAYLOAD]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorecard=info,cricket_scorer=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("list");

    // Decoding needs no database
    if command == "decode" {
        let payload = args.get(1).context(USAGE)?;
        let payload = payload.rsplit('#').next().unwrap_or(payload);
        let card = decode_shared(payload).context("Invalid share payload")?;
        println!("{}", serde_json::to_string_pretty(&card)?);
        return Ok(());
    }

    let config = Config::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let store = MatchStore::new(pool.clone(), config.history_limit).await?;

    match command {
        "list" => {
            let history = store.load_history().await?;
            info!("{} matches in history", history.len());
            for m in &history {
                println!("{}  {}  {}", m.id, format_date(&m.created_at), render_status(m));
            }
        }
        "current" => match store.load_current().await? {
            Some(m) => print!("{}", render_scorecard(&m)),
            None => println!("No match in progress"),
        },
        "show" => {
            let m = find(&store, args.get(1)).await?;
            print!("{}", render_scorecard(&m));
            let payload = encode_match(&m)?;
            println!("Share: {}", share_link(&config.share_base_url, &payload));
        }
        "export" => {
            let m = find(&store, args.get(1)).await?;
            println!("{}", export_json(&m)?);
        }
        "delete" => {
            let id = parse_id(args.get(1))?;
            if store.delete_from_history(id).await? {
                println!("Deleted {id}");
            } else {
                println!("No match {id} in history");
            }
        }
        "clear" => {
            let removed = store.clear_history().await?;
            println!("Removed {removed} matches");
        }
        "players" => {
            let players = PlayerNameStore::new(pool).await?;
            for name in players.load_player_names().await? {
                println!("{name}");
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn parse_id(arg: Option<&String>) -> Result<Uuid> {
    let raw = arg.context(USAGE)?;
    Uuid::parse_str(raw).with_context(|| format!("Invalid match id {raw}"))
}

async fn find(store: &MatchStore, arg: Option<&String>) -> Result<Match> {
    let id = parse_id(arg)?;
    store
        .get_from_history(id)
        .await?
        .with_context(|| format!("No match {id} in history"))
}
