mod backend;
mod bookmarks;
mod catalog;
mod config;
mod errors;
mod feedback;
mod models;
mod profile;
mod state;
mod storage;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::auth::{AuthClient, Identity};
use crate::backend::DocStoreClient;
use crate::catalog::filter::ALL_TAG;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::resource::Region;
use crate::profile::schools::SchoolDirectory;
use crate::state::AppState;
use crate::storage::{build_s3_client, PhotoStore};

#[derive(Parser)]
#[command(name = "lifeline", about = "Student support resource client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the catalog and print the visible subset.
    Resources {
        /// Constrain the fetch to one category.
        #[arg(long)]
        category: Option<String>,
        /// Free-text title search.
        #[arg(long, default_value = "")]
        query: String,
        /// Selected category tag ("All" matches everything).
        #[arg(long, default_value = ALL_TAG)]
        tag: String,
    },
    /// List the signed-in user's saved resources.
    Bookmarks,
    /// Toggle a bookmark on a resource by id.
    Toggle { resource_id: String },
    /// Show the signed-in user's profile.
    Profile,
    /// Declare a home region (clears a school the region doesn't offer).
    SetRegion { region: String },
    /// Pick a school from the region's directory.
    SetSchool { school: String },
    /// Upload a profile photo from a local file.
    UploadPhoto {
        path: String,
        #[arg(long, default_value = "image/jpeg")]
        content_type: String,
    },
    /// Submit feedback.
    Feedback {
        #[arg(long)]
        email: String,
        message: String,
    },
    /// Create an account.
    Signup {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with email and password.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Start a guest session.
    Guest,
    /// End the current session.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lifeline v{}", env!("CARGO_PKG_VERSION"));

    let docstore = DocStoreClient::new(config.docstore_url.clone(), config.docstore_api_key.clone());
    let auth = AuthClient::new(config.auth_url.clone());
    let s3 = build_s3_client(&config).await;
    let photos = PhotoStore::new(s3, config.s3_bucket.clone(), config.s3_endpoint.clone());
    let schools = SchoolDirectory::load(config.schools_file.as_deref())?;

    let state = AppState::new(config, docstore, auth, photos, schools);

    if let Err(e) = run(&state, cli.command).await {
        // One user-facing line; the technical detail is already in the logs.
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(state: &AppState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Resources { category, query, tag } => {
            let region = current_region(state).await?;
            state.loader.load(category.as_deref()).await?;
            let visible = state.catalog.visible(&query, &tag, &region).await;
            if visible.is_empty() {
                println!("No resources found");
                return Ok(());
            }
            for resource in visible {
                let category = resource.category.as_deref().unwrap_or("-");
                let phone = resource.phone.as_deref().unwrap_or("-");
                println!("{:<30} {:<20} {}", resource.title, category, phone);
            }
            Ok(())
        }
        Command::Bookmarks => {
            let identity = identity_from_env()?;
            let saved = state.bookmarks.list(&identity).await?;
            if saved.is_empty() {
                println!("No saved resources");
            }
            for bookmark in saved {
                println!(
                    "{:<30} {}",
                    bookmark.title,
                    bookmark.phone.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Command::Toggle { resource_id } => {
            let identity = identity_from_env()?;
            state.loader.load(None).await?;
            let resource = state
                .catalog
                .snapshot()
                .await
                .into_iter()
                .find(|r| r.id == resource_id)
                .ok_or_else(|| {
                    AppError::Validation(format!("no resource with id '{resource_id}'"))
                })?;
            match state.bookmarks.toggle(&identity, &resource).await? {
                bookmarks::Toggled::Saved => println!("Saved \"{}\"", resource.title),
                bookmarks::Toggled::Removed => println!("Removed \"{}\"", resource.title),
            }
            Ok(())
        }
        Command::Profile => {
            let identity = identity_from_env()?;
            let profile = state.profile.load(&identity.user_id).await?;
            println!("name:   {}", profile.display_name.as_deref().unwrap_or("-"));
            println!("email:  {}", profile.email.as_deref().unwrap_or("-"));
            println!("region: {}", profile.region);
            println!("school: {}", profile.school.as_deref().unwrap_or("-"));
            println!("photo:  {}", profile.photo_url.as_deref().unwrap_or("-"));
            Ok(())
        }
        Command::SetRegion { region } => {
            let identity = identity_from_env()?;
            state.profile.load(&identity.user_id).await?;
            let profile = state
                .profile
                .set_region(&identity.user_id, Region::parse(&region))
                .await?;
            println!("region set to {}", profile.region);
            let options = state.schools.schools_for(&profile.region);
            if !options.is_empty() {
                println!("schools available: {}", options.join(", "));
            }
            Ok(())
        }
        Command::SetSchool { school } => {
            let identity = identity_from_env()?;
            state.profile.load(&identity.user_id).await?;
            let profile = state.profile.set_school(&identity.user_id, school).await?;
            println!(
                "school set to {}",
                profile.school.as_deref().unwrap_or("-")
            );
            Ok(())
        }
        Command::UploadPhoto { path, content_type } => {
            let identity = identity_from_env()?;
            state.profile.load(&identity.user_id).await?;
            let bytes = std::fs::read(&path)
                .map_err(|e| AppError::Validation(format!("cannot read {path}: {e}")))?;
            let profile = state
                .profile
                .upload_photo(&state.photos, &identity.user_id, bytes.into(), &content_type)
                .await?;
            println!("photo uploaded: {}", profile.photo_url.as_deref().unwrap_or("-"));
            Ok(())
        }
        Command::Feedback { email, message } => {
            let identity = identity_from_env()?;
            state.feedback.submit(&identity, &email, &message).await?;
            println!("Thanks for the feedback!");
            Ok(())
        }
        Command::Signup { email, password } => {
            let identity = state.auth.sign_up(&email, &password).await?;
            print_session(&identity);
            Ok(())
        }
        Command::Login { email, password } => {
            let identity = state.auth.sign_in(&email, &password).await?;
            print_session(&identity);
            Ok(())
        }
        Command::Guest => {
            let identity = state.auth.sign_in_anonymous().await?;
            print_session(&identity);
            Ok(())
        }
        Command::Logout => {
            let identity = identity_from_env()?;
            state.auth.sign_out(&identity.token).await?;
            state.profile.reset();
            println!("Signed out");
            Ok(())
        }
    }
}

/// The session for commands that act on a user: exported by `login`/`guest`
/// and carried in the environment between invocations.
fn identity_from_env() -> Result<Identity, AppError> {
    let user_id = std::env::var("LIFELINE_USER_ID").map_err(|_| {
        AppError::Validation("LIFELINE_USER_ID is not set; run `lifeline login` first".to_string())
    })?;
    let token = std::env::var("LIFELINE_TOKEN").map_err(|_| {
        AppError::Validation("LIFELINE_TOKEN is not set; run `lifeline login` first".to_string())
    })?;
    let is_anonymous = std::env::var("LIFELINE_GUEST").is_ok();
    Ok(Identity {
        user_id,
        token,
        is_anonymous,
    })
}

/// The viewer's region: the loaded profile when signed in, ALL otherwise.
async fn current_region(state: &AppState) -> Result<Region, AppError> {
    match identity_from_env() {
        Ok(identity) if !identity.is_anonymous => {
            Ok(state.profile.load(&identity.user_id).await?.region)
        }
        _ => Ok(Region::All),
    }
}

fn print_session(identity: &Identity) {
    println!("export LIFELINE_USER_ID={}", identity.user_id);
    println!("export LIFELINE_TOKEN={}", identity.token);
    if identity.is_anonymous {
        println!("export LIFELINE_GUEST=1");
    }
}
