//! leio entry point.

use clap::Parser;
use leio::{
    config::{BookCommand, Cli, Command, Config},
    cover,
    library::{self, BookForm, BookStore, CoverInput, month},
    server,
    storage::{SharedStore, SqliteStore},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Book { action }) => cmd_book(action, &config).await,
        Some(Command::Cover {
            title,
            author,
            output,
            seed,
        }) => cmd_cover(&title, &author, output, seed, &config),
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        None => cmd_serve(config, None).await,
    }
}

/// Write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    let config = Config::default();
    let _store = SqliteStore::open(&config.storage.path)?;
    println!("Initialized database: {}", config.storage.path.display());

    println!("\nEdit config.toml to configure your reading log.");
    println!("Then run: leio book add --title <title> --author <author> --month 2024-03 ...");

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<BookStore<SqliteStore>> {
    let backend = SqliteStore::open(&config.storage.path)?;
    Ok(BookStore::with_key(backend, config.storage.key.clone()))
}

/// Book log commands.
async fn cmd_book(action: BookCommand, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match action {
        BookCommand::Add {
            title,
            author,
            month,
            rating,
            synopsis,
            year,
            cover,
        } => {
            let form = BookForm {
                title,
                author,
                month_year: month,
                rating,
                synopsis,
                publication_year: year.unwrap_or_default(),
                author_photo: None,
            };

            let today = chrono::Local::now().date_naive();
            let draft = match form.validate(today) {
                Ok(draft) => draft,
                Err(errors) => {
                    for (field, msg) in errors.iter() {
                        eprintln!("  {}: {}", field.as_str(), msg);
                    }
                    anyhow::bail!("Book not added: {} invalid field(s)", errors.len());
                }
            };

            let cover = cover.map(CoverInput::File).unwrap_or_default();
            let mut rng = StdRng::from_os_rng();
            let options = config.covers.placeholder_options();
            let book = library::add_book(&store, draft, cover, &options, &mut rng).await?;

            println!(
                "Added book: {} by {} ({}, id: {})",
                book.title,
                book.author,
                month::format_month_label(&book.month_year),
                book.id
            );
        }

        BookCommand::List { month: selected } => {
            let books = match selected {
                Some(m) => {
                    let key = month::normalize_month(&m)
                        .ok_or_else(|| anyhow::anyhow!("Invalid month: {}", m))?;
                    store.get_by_month(&key)
                }
                None => store.load_all(),
            };

            if books.is_empty() {
                println!("No books found.");
            } else {
                println!("{:<36} {:<30} {:<24} {:<12} RATING", "ID", "TITLE", "AUTHOR", "MONTH");
                println!("{}", "-".repeat(112));
                for book in books {
                    println!(
                        "{:<36} {:<30} {:<24} {:<12} {}",
                        book.id,
                        truncate(&book.title, 30),
                        truncate(&book.author, 24),
                        book.month_year,
                        book.rating.stars()
                    );
                }
            }
        }

        BookCommand::Months => {
            let months = store.get_all_months();
            if months.is_empty() {
                println!("No months recorded.");
            } else {
                println!("{:<12} {:<16} BOOKS", "MONTH", "LABEL");
                println!("{}", "-".repeat(40));
                for m in months {
                    let count = store.get_by_month(&m).len();
                    println!("{:<12} {:<16} {}", m, month::format_month_label(&m), count);
                }
            }
        }

        BookCommand::Show { id } => {
            let book = store
                .find(&id)
                .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

            println!("Title:     {}", book.title);
            println!("Author:    {}", book.author);
            println!("Month:     {}", month::format_month_label(&book.month_year));
            println!("Rating:    {} ({})", book.rating.stars(), book.rating.label());
            if let Some(year) = book.publication_year {
                println!("Published: {}", year);
            }
            println!("Added:     {}", book.date_added);
            println!("\n{}", book.synopsis);
        }
    }

    Ok(())
}

/// Render a placeholder cover to a PNG file.
fn cmd_cover(
    title: &str,
    author: &str,
    output: PathBuf,
    seed: Option<u64>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let options = config.covers.placeholder_options();
    let img = cover::render_placeholder(title, author, &options, &mut rng);
    let png = cover::placeholder::encode_png(&img)?;
    std::fs::write(&output, png)?;

    println!(
        "Wrote {}x{} placeholder: {}",
        options.width,
        options.height(),
        output.display()
    );

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    // Override bind address if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }

    let backend: SharedStore = Arc::new(SqliteStore::open(&config.storage.path)?);

    tracing::info!(
        bind = %config.server.bind,
        database = %config.storage.path.display(),
        key = %config.storage.key,
        "Starting leio server"
    );

    let bind = config.server.bind;
    let state = server::AppState::new(config, backend);

    let books = state.all_books().len();
    let months = state.months().len();
    tracing::info!(books, months, "Loaded reading log");

    let app = server::create_router(state);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(address = %bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
