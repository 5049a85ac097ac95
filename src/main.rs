use jpdb_epub_deck::config::{from_flag_or_env, Config, API_KEY_VAR, DICTIONARY_VAR};
use jpdb_epub_deck::frequency::morphology::VibratoCounter;
use jpdb_epub_deck::jpdb::mock::run_mock_server;
use jpdb_epub_deck::jpdb::models::JpdbConfiguration;
use jpdb_epub_deck::jpdb::JpdbClient;
use jpdb_epub_deck::{format_deck, process_directory, process_file};

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MOCK_API_KEY: &str = "mock_api_key";

#[derive(Parser, Debug)]
#[command(version, about = "Create a vocabulary deck on jpdb.io from an epub file", long_about = None)]
struct Args {
    /// Path to the EPUB file, or to a folder of EPUB files with --dir
    epub_path: PathBuf,

    /// Process every EPUB file in the folder, skipping books that already have a deck
    #[arg(short, long)]
    dir: bool,

    /// Name of the new deck (defaults to the file name)
    #[arg(long)]
    deck_name: Option<String>,

    /// Position in the user's deck list, 0 is the front (defaults to the end)
    #[arg(long)]
    deck_position: Option<u32>,

    /// jpdb API key (optional, defaults to JPDB_API_KEY environment variable)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Vibrato system dictionary, zstd compressed (defaults to VIBRATO_DICTIONARY)
    #[arg(long)]
    dictionary: Option<String>,

    /// Words per parse request
    #[arg(long, default_value_t = jpdb_epub_deck::deck::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    // Verbose
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,

    /// Use test configuration, call to mock server
    #[arg(long)]
    test: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> jpdb_epub_deck::error::Result<Config> {
    let api = if args.test {
        JpdbConfiguration::new(MOCK_API_KEY.to_string())
    } else {
        JpdbConfiguration::new(from_flag_or_env(args.api_key.clone(), API_KEY_VAR)?)
    };
    let dictionary = from_flag_or_env(args.dictionary.clone(), DICTIONARY_VAR)?;

    Config::new(api, PathBuf::from(dictionary)).with_batch_size(args.batch_size)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            error!("Find your API key at jpdb.io -> settings -> Account Information.");
            return ExitCode::FAILURE;
        }
    };

    // If test then start mock server
    let shutdown_mock_server_signal = if args.test {
        match run_mock_server(([127, 0, 0, 1], 0).into(), MOCK_API_KEY).await {
            Ok((address, signal)) => {
                config.api.api_url = format!("http://{}", address);
                Some(signal)
            }
            Err(e) => {
                error!("Error starting mock server: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let counter = match VibratoCounter::from_zstd(&config.dictionary) {
        Ok(counter) => counter,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = JpdbClient::new(config.api.clone());

    let status = if args.dir {
        if !args.epub_path.is_dir() {
            error!("Provided path is NOT a folder. To process a single file, remove the --dir flag.");
            return ExitCode::FAILURE;
        }
        if args.deck_name.is_some() || args.deck_position.is_some() {
            warn!("--deck-name and --deck-position are ignored in directory mode");
        }

        info!(dir = %args.epub_path.display(), "processing folder");
        match process_directory(&client, &counter, &config, &args.epub_path).await {
            Ok(report) => {
                println!("{}", report);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        }
    } else {
        if args.epub_path.is_dir() {
            error!("Provided path is a folder. Use the --dir flag to process a whole folder.");
            return ExitCode::FAILURE;
        }

        match process_file(
            &client,
            &counter,
            &config,
            &args.epub_path,
            args.deck_name.clone(),
            args.deck_position,
        )
        .await
        {
            Ok(deck) => {
                println!("{}", format_deck(&deck));
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        }
    };

    // Shutdown mock server if test mode
    if let Some(signal) = shutdown_mock_server_signal {
        if signal.send(()).is_err() {
            warn!("mock server already stopped");
        }
    }

    status
}
