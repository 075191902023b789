//! bookhunt entry point.

use bookhunt::{
    catalog::{BrowseState, FavoriteStore, Filter},
    client,
    config::{Backend, Cli, Command, Config, FilterArgs},
    server, storage,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force).await,
        Some(Command::Import) => cmd_import(&config).await,
        Some(Command::Browse {
            api,
            filter,
            favorites_only,
        }) => cmd_browse(&config, api, filter, favorites_only).await,
        Some(Command::Fav { id }) => cmd_fav(&config, &id).await,
        Some(Command::Serve { bind, backend }) => cmd_serve(config, bind, backend).await,
        None => {
            // Default: start server
            cmd_serve(config, None, None).await
        }
    }
}

/// Initialize logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookhunt=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize config and database.
async fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config
    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    // Initialize database (seeded from the dataset file)
    let config = Config::default();
    let db = storage::open_database(&config)?;
    println!(
        "Initialized database: {} ({} books)",
        config.database.path.display(),
        db.book_count()?
    );

    println!("\nEdit config.toml to configure your server.");
    println!("Then run: bookhunt serve");

    Ok(())
}

/// Copy file-backend records into the database.
async fn cmd_import(config: &Config) -> anyhow::Result<()> {
    let db = storage::open_database(config)?;
    let files = storage::file_store(config);

    let report = storage::import_files(&db, &files)?;
    println!(
        "Imported {} books from {} and {} comments from {}",
        report.books,
        files.seed_path().display(),
        report.comments,
        files.comments_path().display()
    );

    Ok(())
}

/// List books in the terminal.
async fn cmd_browse(
    config: &Config,
    api: Option<String>,
    filter: FilterArgs,
    favorites_only: bool,
) -> anyhow::Result<()> {
    init_tracing();

    let api_url = api.unwrap_or_else(|| config.client.api_url.clone());
    let books = client::load_books(&api_url).await;

    let state = BrowseState {
        filter: Filter {
            atmosphere: filter.atmosphere.unwrap_or_default(),
            pace: filter.pace.unwrap_or_default(),
            hero: filter.hero.unwrap_or_default(),
            style: filter.style.unwrap_or_default(),
            query: filter.query.unwrap_or_default(),
        },
        favorites: FavoriteStore::new(&config.client.favorites).load(),
        favorites_only,
    };

    print!("{}", client::render(&state, &books));
    Ok(())
}

/// Toggle a local favorite.
async fn cmd_fav(config: &Config, id: &str) -> anyhow::Result<()> {
    let store = FavoriteStore::new(&config.client.favorites);
    let mut favorites = store.load();

    let added = favorites.toggle(id);
    store.save(&favorites)?;

    if added {
        println!("Added to favorites: {} ({} total)", id, favorites.len());
    } else {
        println!("Removed from favorites: {} ({} total)", id, favorites.len());
    }

    Ok(())
}

/// Start the server.
async fn cmd_serve(
    mut config: Config,
    bind: Option<SocketAddr>,
    backend: Option<Backend>,
) -> anyhow::Result<()> {
    // Override from CLI if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }
    if let Some(backend) = backend {
        config.storage.backend = backend;
    }

    init_tracing();

    let storage = storage::open(&config)?;

    tracing::info!(
        bind = %config.server.bind,
        backend = storage.backend().as_str(),
        "Starting bookhunt server"
    );

    // Create application state
    let state = server::AppState::new(config.clone(), storage);

    // Create router
    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "BookHunt backend listening");

    axum::serve(listener, app).await?;

    Ok(())
}
