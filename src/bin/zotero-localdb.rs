use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use zotero_localdb::{
    config::Config,
    db::{CreateAttachmentsDbRequest, StoreSearchesDbRequest},
    filesystem::{FileStore, LocalFileStore},
    zotero::{Attachment, SearchResponse},
    Database,
};

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_level = match config.loglevel() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match &config.logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            let subscriber = builder.with_ansi(false).with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            tracing::subscriber::set_global_default(builder.finish())?;
        }
    }

    Ok(())
}

async fn store_searches(db: &Database, matches: &ArgMatches) -> anyhow::Result<()> {
    let file = matches.get_one::<String>("file").context("missing payload file")?;
    let content = std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file))?;
    let response: Vec<SearchResponse> =
        serde_json::from_str(&content).with_context(|| format!("invalid search payload in {}", file))?;

    info!("Storing {} searches from {}", response.len(), file);
    db.perform_write(&StoreSearchesDbRequest::new(response)).await?;
    Ok(())
}

async fn create_attachments(
    db: &Database,
    config: &Config,
    file_store: Arc<dyn FileStore>,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    let file = matches.get_one::<String>("file").context("missing payload file")?;
    let content = std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file))?;
    let attachments: Vec<Attachment> =
        serde_json::from_str(&content).with_context(|| format!("invalid attachment payload in {}", file))?;

    let localized_type = matches
        .get_one::<String>("type")
        .map(|s| s.as_str())
        .unwrap_or_else(|| config.localized_attachment_type())
        .to_string();
    let collections: HashSet<String> = matches
        .get_many::<String>("collection")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let request = CreateAttachmentsDbRequest {
        attachments,
        parent_key: matches.get_one::<String>("parent").cloned(),
        localized_type,
        collections,
        file_store,
    };

    let failed = db.perform(&request).await?;
    for (key, title) in &failed {
        println!("{}\t{}", key, title);
    }
    if !failed.is_empty() {
        error!("{} of {} attachments failed", failed.len(), request.attachments.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("zotero-localdb")
        .version("1.0")
        .about("Local Zotero library store")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("store-searches")
                .about("Store saved searches from a JSON array of API search objects")
                .arg(Arg::new("file").value_name("FILE").required(true))
        )
        .subcommand(
            Command::new("create-attachments")
                .about("Create attachment items from a JSON array of attachments")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("parent")
                        .long("parent")
                        .value_name("KEY")
                        .help("Key of the parent item")
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("LABEL")
                        .help("Localized item type label")
                )
                .arg(
                    Arg::new("collection")
                        .long("collection")
                        .value_name("KEY")
                        .action(clap::ArgAction::Append)
                        .help("Collection to add the attachments to")
                )
        )
        .get_matches();

    // Load configuration
    let config_file = matches.get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("zotero-localdb.toml");

    let config = Config::load(config_file)
        .with_context(|| format!("cannot load configuration {}", config_file))?;

    init_logging(&config)?;

    let db = Database::open(&config.db.path, config.conn_max())
        .await
        .with_context(|| format!("cannot open database {}", config.db.path.display()))?;
    info!("Database {} ready", config.db.path.display());

    let file_store = Arc::new(LocalFileStore::new(&config.storage.root)) as Arc<dyn FileStore>;

    let result = match matches.subcommand() {
        Some(("store-searches", sub)) => store_searches(&db, sub).await,
        Some(("create-attachments", sub)) => create_attachments(&db, &config, file_store, sub).await,
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
