//! `vindex` command-line client.
//!
//! Keeps its session in a JSON file so tokens survive between invocations,
//! and refreshes them transparently like any other front end.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vindex_client::navigation::LOGIN_PATH;
use vindex_client::{
    ApiClient, ClientConfig, DiscoveryRequest, FilePart, FileStorage, Language, MemoryNavigator,
    Navigator, RegisterOutcome, RegisterRequest, SessionStore, Wine, WineInput, WineLocation,
    WineType, paginate, shelf_view,
};

#[derive(Parser, Debug)]
#[command(name = "vindex", about = "Vindex wine cellar client", version)]
struct Cli {
    /// Backend base URL; overrides VINDEX_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// File holding the logged-in session between runs.
    #[arg(long, env = "VINDEX_SESSION_FILE", default_value = ".vindex-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VINDEX_PASSWORD")]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VINDEX_PASSWORD")]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Set the preferred interface language (en or he).
    Language {
        #[arg(value_parser = parse_language)]
        language: Language,
    },
    /// Manage the collection.
    #[command(subcommand)]
    Wines(WinesCommand),
    /// Look up wines in the shared discovery database.
    #[command(subcommand)]
    Discovery(DiscoveryCommand),
    /// Manage label images.
    #[command(subcommand)]
    Images(ImagesCommand),
}

#[derive(Subcommand, Debug)]
enum WinesCommand {
    /// List the collection, one page at a time.
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show the collection by location and shelf row.
    Shelves,
    /// Add a wine.
    Add(WineFields),
    /// Change a wine's details; fields not given keep their stored value.
    Edit {
        id: i64,
        #[command(flatten)]
        edits: WineEdits,
    },
    /// Remove a wine.
    Delete { id: i64 },
    /// Autocomplete wine names.
    Suggest { query: String },
}

#[derive(Args, Debug)]
struct WineFields {
    #[arg(long)]
    name: String,
    #[arg(long = "type", value_parser = parse_wine_type)]
    wine_type: WineType,
    #[arg(long)]
    vintage: String,
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    #[arg(long, value_parser = parse_location)]
    location: Option<WineLocation>,
    #[arg(long)]
    row: Option<u32>,
    #[arg(long)]
    winery: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

impl WineFields {
    fn into_input(self) -> WineInput {
        let mut input = WineInput::new(self.name, self.wine_type, self.vintage);
        input.quantity = self.quantity;
        input.location = self.location.unwrap_or_default();
        input.row_id = self.row;
        input.winery = self.winery;
        input.region = self.region;
        input.country = self.country;
        input.image_url = self.image_url;
        input
    }
}

#[derive(Args, Debug)]
struct WineEdits {
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type", value_parser = parse_wine_type)]
    wine_type: Option<WineType>,
    #[arg(long)]
    vintage: Option<String>,
    #[arg(long)]
    quantity: Option<u32>,
    #[arg(long, value_parser = parse_location)]
    location: Option<WineLocation>,
    #[arg(long)]
    row: Option<u32>,
    #[arg(long)]
    winery: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

impl WineEdits {
    fn apply(self, mut input: WineInput) -> WineInput {
        if let Some(name) = self.name {
            input.name = name;
        }
        if let Some(wine_type) = self.wine_type {
            input.wine_type = Some(wine_type);
        }
        if let Some(vintage) = self.vintage {
            input.vintage = Some(vintage);
        }
        if let Some(quantity) = self.quantity {
            input.quantity = quantity;
        }
        if let Some(location) = self.location {
            input.location = location;
        }
        input.row_id = self.row.or(input.row_id);
        input.winery = self.winery.or(input.winery);
        input.region = self.region.or(input.region);
        input.country = self.country.or(input.country);
        input.image_url = self.image_url.or(input.image_url);
        input
    }
}

#[derive(Subcommand, Debug)]
enum DiscoveryCommand {
    /// Research a wine and store the result.
    Discover {
        #[arg(long)]
        winery: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        vintage: Option<String>,
    },
    /// Show one discovered wine.
    Get { id: i64 },
    /// Find discovered wines by producer.
    SearchWinery { name: String },
    /// Find discovered wines by name.
    SearchName { query: String },
    /// List validated entries.
    Validated,
}

#[derive(Subcommand, Debug)]
enum ImagesCommand {
    /// Upload a label image for a wine.
    Upload { wine_id: i64, file: PathBuf },
    /// Remove a wine's label image.
    Delete { wine_id: i64 },
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_uppercase()))
        .map_err(|_| format!("unknown value `{value}`"))
}

fn parse_wine_type(value: &str) -> Result<WineType, String> {
    parse_enum(value)
}

fn parse_location(value: &str) -> Result<WineLocation, String> {
    parse_enum(value)
}

fn parse_language(value: &str) -> Result<Language, String> {
    parse_enum(value)
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn describe(wine: &Wine) -> String {
    format!(
        "#{:<5} {} {} x{}",
        wine.id,
        wine.name,
        wine.vintage.as_deref().unwrap_or("NV"),
        wine.quantity
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,vindex_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.base_url = ClientConfig::new(url.as_str()).base_url;
    }

    let storage = Arc::new(FileStorage::new(&cli.session_file));
    let session = Arc::new(SessionStore::hydrate(storage));
    let navigator = MemoryNavigator::at("/");
    let client = ApiClient::builder(config, Arc::clone(&session))
        .navigator(Arc::new(navigator.clone()))
        .build()?;

    tracing::debug!(
        session_file = %cli.session_file.display(),
        authenticated = session.is_authenticated(),
        "Starting"
    );

    let result = run(&client, cli.command).await;

    if navigator.current_path() == LOGIN_PATH {
        eprintln!("Session expired; run `vindex login` again.");
    }
    result
}

async fn run(client: &ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = client
                .auth()
                .login(&email, &password)
                .await
                .context("login failed")?;
            println!("Logged in as {}", user.username);
        }
        Command::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = RegisterRequest {
                username,
                email,
                password,
                first_name,
                last_name,
            };
            match client.auth().register(&registration).await? {
                RegisterOutcome::LoggedIn(user) => println!("Registered and logged in as {}", user.username),
                RegisterOutcome::LoginRequired => println!("Registered; run `vindex login` to continue."),
            }
        }
        Command::Logout => {
            client.auth().logout();
            println!("Logged out");
        }
        Command::Whoami => match client.session().user() {
            Some(user) if client.session().is_authenticated() => print_json(&user)?,
            _ => println!("Not logged in"),
        },
        Command::Language { language } => {
            let Some(user) = client.auth().set_preferred_language(language) else {
                bail!("not logged in");
            };
            print_json(&user)?;
        }
        Command::Wines(command) => run_wines(client, command).await?,
        Command::Discovery(command) => run_discovery(client, command).await?,
        Command::Images(command) => run_images(client, command).await?,
    }
    Ok(())
}

async fn run_wines(client: &ApiClient, command: WinesCommand) -> anyhow::Result<()> {
    match command {
        WinesCommand::List { page } => {
            let wines = client.wines().list().await?;
            let page = paginate(&wines, page, vindex_client::collection::DEFAULT_PAGE_SIZE);
            for wine in page.items {
                println!("{}", describe(wine));
            }
            println!("-- page {}/{} ({} wines)", page.page, page.total_pages, wines.len());
        }
        WinesCommand::Shelves => {
            let wines = client.wines().list().await?;
            for view in shelf_view(&wines) {
                println!("{:?}", view.location);
                for shelf in &view.shelves {
                    println!("  {} ({} bottles)", shelf.label(), shelf.bottle_count());
                    for wine in &shelf.wines {
                        println!("    {}", describe(wine));
                    }
                }
            }
        }
        WinesCommand::Add(fields) => {
            let wine = client.wines().create(&fields.into_input()).await?;
            print_json(&wine)?;
        }
        WinesCommand::Edit { id, edits } => {
            let Some(stored) = client.wines().find(id).await? else {
                bail!("no wine with id {id} in the collection");
            };
            let input = edits.apply(WineInput::from_wine(&stored));
            let wine = client.wines().update(id, &input).await?;
            print_json(&wine)?;
        }
        WinesCommand::Delete { id } => {
            client.wines().delete(id).await?;
            println!("Deleted wine {id}");
        }
        WinesCommand::Suggest { query } => {
            for suggestion in client.wines().suggestions(&query).await? {
                println!("{}", suggestion.name);
            }
        }
    }
    Ok(())
}

async fn run_discovery(client: &ApiClient, command: DiscoveryCommand) -> anyhow::Result<()> {
    let discovery = client.discovery();
    match command {
        DiscoveryCommand::Discover {
            winery,
            name,
            vintage,
        } => {
            let request = DiscoveryRequest {
                winery,
                wine_name: name,
                vintage,
            };
            print_json(&discovery.discover(&request).await?)?;
        }
        DiscoveryCommand::Get { id } => print_json(&discovery.get(id).await?)?,
        DiscoveryCommand::SearchWinery { name } => {
            print_json(&discovery.search_by_winery(&name).await?)?;
        }
        DiscoveryCommand::SearchName { query } => {
            print_json(&discovery.search_by_name(&query).await?)?;
        }
        DiscoveryCommand::Validated => print_json(&discovery.validated().await?)?,
    }
    Ok(())
}

async fn run_images(client: &ApiClient, command: ImagesCommand) -> anyhow::Result<()> {
    match command {
        ImagesCommand::Upload { wine_id, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("label")
                .to_string();
            let part = FilePart::image(file_name, content_type_for(&file), bytes);

            let upload = client.images().upload(wine_id, part).await?;
            println!("{}", client.images().url_for(Some(&upload.image_url)));
        }
        ImagesCommand::Delete { wine_id } => {
            client.images().delete(wine_id).await?;
            println!("Removed image of wine {wine_id}");
        }
    }
    Ok(())
}
