use log::info;
use tokio::io::BufReader;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use carnet::book::AddressBookStore;
use carnet::config::Config;
use carnet::console::Console;
use carnet::geocode::Geocoder;
use carnet::storage::JsonFileStorage;
use carnet::workflow::CompositionWorkflow;

#[tokio::main]
async fn main() {
    if let Err(e) = install_tracing() {
        eprintln!("cannot set up logging: {:?}", e);
    }

    if let Err(e) = run().await {
        log::error!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn install_tracing() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}

async fn run() -> color_eyre::Result<()> {
    let config = Config::from_env()?;
    info!("using data directory [{}]", config.data_dir.display());

    let mut book = AddressBookStore::with_key(JsonFileStorage::new(&config.data_dir), &config.book_key);
    book.load().await;

    let geocoder = Geocoder::new(&config.geocoder_url, config.retry.clone())?;
    let mut workflow = CompositionWorkflow::new(geocoder, config.dedup)
        .with_search_limit(config.search_limit);

    Console::new(&mut workflow, &mut book)
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!("bye, [{}] record(s) in the address book", book.len());
    Ok(())
}
