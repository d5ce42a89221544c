//! Run the explorer's API calls from the command line and print what the pages would get.
//! Usage:
//!   cargo run --bin explorer_props -- search <query>
//!   cargo run --bin explorer_props -- details <movie|tv> <tmdb_id>
//! Reads TMDB_API_KEY, LLM_ENDPOINT and WATCH_REGION from the environment (.env supported).

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use movie_explorer::api::{ApiClient, MovieApi};
use movie_explorer::config::Config;
use movie_explorer::models::MediaKind;
use serde_json::json;
use std::env;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env()?;
    let api = ApiClient::new(&config)?;
    let cancel = CancellationToken::new();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("search") => {
            let query = args[1..].join(" ");
            if query.trim().is_empty() {
                bail!("usage: explorer_props search <query>");
            }
            let results = api.search(&query, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Some("details") => {
            let kind: MediaKind = args
                .get(1)
                .context("usage: explorer_props details <movie|tv> <tmdb_id>")?
                .parse()?;
            let id: u64 = args
                .get(2)
                .context("missing tmdb_id")?
                .parse()
                .context("tmdb_id must be a number")?;

            let details = api.details(kind, id, &cancel).await?;
            let title = details.display_title().to_string();
            let providers = api.watch_providers(kind, id, &cancel).await?;
            let insight = api.ai_insight(&title, &cancel).await?;

            let out = json!({
                "title": title,
                "year": details.year(),
                "rating": details.rating_label(),
                "genres": details.genre_names(),
                "trailer": details.trailer_url(),
                "region": config.watch_region,
                "providers": providers.subscription(&config.watch_region),
                "insight": insight,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => bail!("usage: explorer_props <search <query> | details <movie|tv> <tmdb_id>>"),
    }
    Ok(())
}
