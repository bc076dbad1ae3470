//! `portal-cli`: the campus portal from a terminal.
//!
//! Runs the same session core as the browser, with a `reqwest` transport and
//! the session kept in a JSON file, so scripts can sign in once and then
//! manage colleges, staff and students or file enquiries.

mod file_storage;
mod inspect;
mod navigator;
mod transport;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use session::token::{DEFAULT_REFRESH_WINDOW_SECS, TokenError};
use session::{ApiClient, ApiError, ResourceApi, ResourceKind, RouteTable, SessionStore};

use crate::file_storage::FileStorage;
use crate::navigator::HintNavigator;
use crate::transport::HttpTransport;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("cannot inspect token: {0}")]
    Token(#[from] TokenError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--data must be a JSON object")]
    NotAnObject,
    #[error("not signed in; run `portal-cli login`")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "Campus portal command-line client")]
struct Cli {
    #[arg(long, env = "PORTAL_BACKEND_URL", default_value = "http://localhost:8000")]
    base_url: String,

    #[arg(long, env = "PORTAL_SESSION_FILE", default_value = ".portal-session.json")]
    session_file: PathBuf,

    #[arg(long, env = "PORTAL_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Log requests and session bookkeeping to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Sign in through the OAuth2 password grant.
    TokenLogin(TokenLoginArgs),
    /// Print the signed-in profile.
    Whoami,
    /// End the session and delete the stored tokens.
    Logout,
    Token(TokenCommand),
    /// Exchange the refresh token for a new access token now.
    Refresh,
    Resource(ResourceCommand),
    Lead(LeadCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Defaults to the remembered email.
    #[arg(long)]
    email: Option<String>,

    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Remember the email for the next login.
    #[arg(long, default_value_t = false)]
    remember: bool,
}

#[derive(Args, Debug)]
struct TokenLoginArgs {
    #[arg(long)]
    username: String,

    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand, Debug)]
enum TokenSubcommand {
    /// Decode a token's claims; defaults to the stored access token.
    Inspect { token: Option<String> },
}

#[derive(Args, Debug)]
struct ResourceCommand {
    /// admins, colleges, students, teachers, adminaccess or leads.
    #[arg(value_parser = parse_kind)]
    kind: ResourceKind,

    #[command(subcommand)]
    command: ResourceSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResourceSubcommand {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct LeadCommand {
    #[command(subcommand)]
    command: LeadSubcommand,
}

#[derive(Subcommand, Debug)]
enum LeadSubcommand {
    /// File a service enquiry. No session needed.
    Submit(LeadArgs),
}

#[derive(Args, Debug)]
struct LeadArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    service: Option<String>,

    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    let store = connect(&cli)?;
    match cli.command {
        Command::Login(args) => run_login(&store, args).await,
        Command::TokenLogin(args) => run_token_login(&store, args).await,
        Command::Whoami => run_whoami(&store).await,
        Command::Logout => {
            store.logout().await;
            Ok(())
        }
        Command::Token(token) => match token.command {
            TokenSubcommand::Inspect { token } => run_token_inspect(&store, token),
        },
        Command::Refresh => run_refresh(&store).await,
        Command::Resource(resource) => run_resource(&store, resource).await,
        Command::Lead(lead) => match lead.command {
            LeadSubcommand::Submit(args) => run_lead_submit(&store, args).await,
        },
    }
}

fn connect(cli: &Cli) -> Result<SessionStore, CliError> {
    let transport = HttpTransport::new(&cli.base_url, Duration::from_secs(cli.timeout_secs))?;
    let storage = FileStorage::open(&cli.session_file)?;
    tracing::debug!(base_url = %cli.base_url, session_file = %storage.path().display(), "session opened");
    let navigator = HintNavigator::new(RouteTable::default().login);
    let api = ApiClient::new(Rc::new(transport), Rc::new(storage), Rc::new(navigator));
    let store = SessionStore::new(Rc::new(api));
    store.hydrate();
    Ok(store)
}

async fn run_login(store: &SessionStore, args: LoginArgs) -> Result<(), CliError> {
    let email = match args.email.or_else(|| store.remembered_email()) {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password")?,
    };
    if args.remember {
        store.remember_email(Some(&email));
    }
    let profile = store.login(&email, &password).await?;
    print_json(&serde_json::to_value(&profile)?)
}

async fn run_token_login(store: &SessionStore, args: TokenLoginArgs) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password")?,
    };
    let profile = store.login_with_password_grant(&args.username, &password).await?;
    print_json(&serde_json::to_value(&profile)?)
}

async fn run_whoami(store: &SessionStore) -> Result<(), CliError> {
    let profile = store.ensure_profile().await?.ok_or(CliError::NotSignedIn)?;
    print_json(&serde_json::to_value(&profile)?)
}

fn run_token_inspect(store: &SessionStore, token: Option<String>) -> Result<(), CliError> {
    let token = token.or_else(|| store.api().access_token()).ok_or(CliError::NotSignedIn)?;
    print_json(&inspect::describe(&token, now_secs())?)
}

async fn run_refresh(store: &SessionStore) -> Result<(), CliError> {
    if !store.api().has_session() {
        return Err(CliError::NotSignedIn);
    }
    let token = store.api().refresh_now().await?;
    match inspect::describe(&token, now_secs()) {
        Ok(claims) => print_json(&claims),
        Err(_) => {
            println!("token refreshed");
            Ok(())
        }
    }
}

async fn run_resource(store: &SessionStore, resource: ResourceCommand) -> Result<(), CliError> {
    let api = store.api();
    if api.has_session() {
        api.refresh_if_expiring(now_secs(), DEFAULT_REFRESH_WINDOW_SECS).await?;
    }
    let collection = ResourceApi::new(api, resource.kind);
    match resource.command {
        ResourceSubcommand::List => print_json(&Value::Array(collection.list().await?)),
        ResourceSubcommand::Get { id } => print_json(&collection.get(&id).await?),
        ResourceSubcommand::Create { data } => print_json(&collection.create(parse_object(&data)?).await?),
        ResourceSubcommand::Update { id, data } => print_json(&collection.update(&id, parse_object(&data)?).await?),
        ResourceSubcommand::Delete { id } => {
            collection.delete(&id).await?;
            println!("deleted {} {id}", resource.kind);
            Ok(())
        }
    }
}

async fn run_lead_submit(store: &SessionStore, args: LeadArgs) -> Result<(), CliError> {
    let created = ResourceApi::new(store.api(), ResourceKind::Lead).create(lead_draft(args)).await?;
    print_json(&created)
}

fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    raw.parse()
}

fn parse_object(data: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::NotAnObject),
    }
}

fn lead_draft(args: LeadArgs) -> Map<String, Value> {
    let LeadArgs { name, email, phone, service, message } = args;
    [("name", Some(name)), ("email", Some(email)), ("phone", phone), ("service", service), ("message", Some(message))]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim().to_owned();
            (!value.is_empty()).then(|| (key.to_owned(), Value::String(value)))
        })
        .collect()
}

fn prompt(label: &str) -> Result<String, CliError> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
