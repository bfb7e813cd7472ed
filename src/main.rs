use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use weir::api::{feeds as feeds_api, ApiClient};
use weir::config::Config;
use weir::notify::{Notice, Notifier};
use weir::session::CredentialVault;
use weir::store::{EntryStore, MetadataStore, SessionStore};
use weir::types::{EntryFilter, EntryState, EntryStatus, User};

/// Get the config directory path (~/.config/weir/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("weir");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "weir", about = "Command-line client for a self-hosted feed reader")]
struct Args {
    /// Override the configured API base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a username/password pair against the API
    Login { username: String, password: String },

    /// Print the logged-in user's profile
    Me,

    /// List feeds with their unread counts
    Feeds,

    /// List categories
    Categories,

    /// List entries matching the given filter
    Entries {
        /// Restrict to one feed
        #[arg(long, value_name = "ID")]
        feed: Option<i64>,

        /// Restrict to one category
        #[arg(long, value_name = "ID")]
        category: Option<i64>,

        /// Restrict by status (read, unread, removed)
        #[arg(long)]
        status: Option<EntryStatus>,

        /// Only starred entries
        #[arg(long)]
        starred: bool,

        /// Full-text search query
        #[arg(long)]
        search: Option<String>,

        /// Page size (server default: 50)
        #[arg(long)]
        limit: Option<u32>,

        /// Skip this many entries
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one entry in full
    Show { id: i64 },

    /// Mark an entry read
    Read { id: i64 },

    /// Mark an entry unread
    Unread { id: i64 },

    /// Star an entry
    Star { id: i64 },

    /// Remove the star from an entry
    Unstar { id: i64 },

    /// Mark every entry matching the scope read
    ReadAll {
        /// Restrict the bulk update to one feed
        #[arg(long, value_name = "ID")]
        feed: Option<i64>,

        /// Restrict the bulk update to one category
        #[arg(long, value_name = "ID")]
        category: Option<i64>,
    },

    /// Ask the backend to re-fetch one feed now
    Refresh { id: i64 },

    /// Ask the backend to re-fetch every feed
    RefreshAll,

    /// Unsubscribe from a feed
    DeleteFeed { id: i64 },

    /// Open an entry's link in the browser
    Open { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config =
        Config::load(&config_dir.join("config.toml")).context("Failed to load config file")?;

    let base_url = match &args.base_url {
        Some(raw) => url::Url::parse(raw).context("Invalid --base-url")?,
        None => config
            .parsed_base_url()
            .context("Invalid base_url in config file")?,
    };

    let vault = Arc::new(CredentialVault::new());
    // WEIR_SESSION wins over the config file, so one-off invocations can
    // carry their own credential.
    match std::env::var("WEIR_SESSION") {
        Ok(session) if !session.is_empty() => vault.store(SecretString::from(session)),
        _ => {
            if let Some(session) = &config.session {
                vault.store(SecretString::from(session.clone()));
            }
        }
    }

    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();

    let client = Arc::new(
        ApiClient::new(&base_url, config.timeout(), vault.clone(), notifier.clone())
            .context("Failed to build HTTP client")?,
    );

    let session = SessionStore::new(client.clone(), vault.clone());
    let metadata = MetadataStore::new(client.clone());
    let entries = EntryStore::new(client.clone());

    // Validates any seeded credential before the command runs; a stale
    // credential surfaces here instead of mid-command. A fresh login
    // replaces the credential anyway, so it skips the round trip.
    if !matches!(args.command, Command::Login { .. }) {
        session.initialize().await;
    }

    let outcome = run_command(args.command, &session, &metadata, &entries, &client).await;

    // The subscriber was created before the client, so everything the
    // transport reported while the command ran is still buffered here.
    while let Ok(notice) = notices.try_recv() {
        match notice {
            Notice::Error { message } => eprintln!("error: {message}"),
            Notice::AuthRequired => {
                eprintln!("Session is no longer valid. Run `weir login <username> <password>`.")
            }
        }
    }

    outcome
}

async fn run_command(
    command: Command,
    session: &SessionStore,
    metadata: &MetadataStore,
    entries: &EntryStore,
    client: &ApiClient,
) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            if session.login(&username, &password).await {
                match session.current_user() {
                    Some(user) => println!("Logged in as {}.", user.username),
                    None => println!("Logged in."),
                }
                println!("To skip logging in next time, set WEIR_SESSION (or `session` in");
                println!("config.toml) to the base64 encoding of \"username:password\".");
            } else {
                eprintln!("Login failed. Check the username, password, and base URL.");
                std::process::exit(1);
            }
        }

        Command::Me => match session.current_user() {
            Some(user) => print_user(&user),
            None => {
                eprintln!("Not logged in.");
                eprintln!();
                eprintln!("Run `weir login <username> <password>`, or seed a credential via");
                eprintln!("WEIR_SESSION or the `session` key in config.toml.");
                std::process::exit(1);
            }
        },

        Command::Feeds => {
            metadata.fetch_feeds().await;
            let feeds = metadata.feeds();
            if feeds.is_empty() {
                println!("No feeds.");
            }
            for feed in feeds {
                let category = feed
                    .category
                    .as_ref()
                    .map(|c| c.title.as_str())
                    .unwrap_or("-");
                println!(
                    "{:>5}  {:>4} unread  [{}] {}",
                    feed.id(),
                    feed.unread_count,
                    category,
                    feed.feed.title
                );
            }
        }

        Command::Categories => {
            metadata.fetch_categories().await;
            let categories = metadata.categories();
            if categories.is_empty() {
                println!("No categories.");
            }
            for category in categories {
                println!("{:>5}  {}", category.id, category.title);
            }
        }

        Command::Entries {
            feed,
            category,
            status,
            starred,
            search,
            limit,
            offset,
        } => {
            let filter = EntryFilter {
                feed_id: feed,
                category_id: category,
                status,
                state: starred.then_some(EntryState::Starred),
                search,
                limit,
                offset,
                ..EntryFilter::default()
            };
            entries.fetch_entries(filter).await;
            let window = entries.window();
            println!("{} of {} entries:", window.entries.len(), window.total);
            for entry in &window.entries {
                let star = if entry.starred { "*" } else { " " };
                println!(
                    "{:>6} {star} [{:>6}] {}",
                    entry.id,
                    entry.status.as_str(),
                    entry.title
                );
            }
        }

        Command::Show { id } => {
            let entry = entries
                .fetch_entry(id)
                .await
                .with_context(|| format!("Failed to fetch entry {id}"))?;
            println!("{}", entry.title);
            println!("{} | {} | {}", entry.feed.title, entry.author, entry.url);
            if let Some(published) = entry.published_at {
                println!("Published {}", published.format("%Y-%m-%d %H:%M"));
            }
            println!();
            println!("{}", entry.content);
        }

        Command::Read { id } => entries.mark_as_read(id).await,
        Command::Unread { id } => entries.mark_as_unread(id).await,
        Command::Star { id } => entries.toggle_star(id, true).await,
        Command::Unstar { id } => entries.toggle_star(id, false).await,

        Command::ReadAll { feed, category } => {
            let filter = EntryFilter {
                feed_id: feed,
                category_id: category,
                ..EntryFilter::default()
            };
            entries.mark_all_as_read(filter).await;
        }

        Command::Refresh { id } => metadata.refresh_feed(id).await,

        Command::RefreshAll => {
            feeds_api::refresh_all(client)
                .await
                .context("Failed to queue the refresh")?;
            println!("Refresh queued for all feeds.");
        }

        Command::DeleteFeed { id } => {
            metadata
                .delete_feed(id)
                .await
                .with_context(|| format!("Failed to delete feed {id}"))?;
            println!("Deleted feed {id}.");
        }

        Command::Open { id } => {
            let entry = entries
                .fetch_entry(id)
                .await
                .with_context(|| format!("Failed to fetch entry {id}"))?;
            // SEC: Validate URL before open::that() to prevent command injection
            let url = url::Url::parse(&entry.url)
                .with_context(|| format!("Entry {id} has an unparseable URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("Refusing to open non-HTTP URL: {}", entry.url);
            }
            open::that(url.as_str())
                .with_context(|| format!("Failed to open browser for {}", entry.url))?;
            println!("Opened {}", entry.url);
        }
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("{} (id {})", user.username, user.id);
    if user.is_admin {
        println!("  role:     admin");
    }
    if !user.timezone.is_empty() {
        println!("  timezone: {}", user.timezone);
    }
    if !user.language.is_empty() {
        println!("  language: {}", user.language);
    }
    if let Some(last_login) = user.last_login_at {
        println!("  last login: {}", last_login.format("%Y-%m-%d %H:%M"));
    }
}
