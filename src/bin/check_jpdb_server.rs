use jpdb_epub_deck::config::{from_flag_or_env, API_KEY_VAR};
use jpdb_epub_deck::deck::list_decks;
use jpdb_epub_deck::jpdb::models::JpdbConfiguration;
use jpdb_epub_deck::jpdb::JpdbClient;

use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let api_key = from_flag_or_env(None, API_KEY_VAR)?;

    let client = JpdbClient::new(JpdbConfiguration::new(api_key));
    let decks = list_decks(&client).await?;

    println!("{} decks", decks.len());
    for deck in decks {
        println!(
            "{:>8}  {:<40} {:>6} words  {:>6.2}% known",
            deck.id, deck.name, deck.vocabulary_count, deck.known_coverage
        );
    }

    Ok(())
}
