use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    draft::RegistrationDraft, load_settings, load_settings_from, photos::PhotoSource,
    verification::FixedCodeIssuer, ClientSettings, FlowError, FlowEvent, HttpProfileApi,
    ListingController, ListingFilter, LoadOutcome, RegistrationFlow, ReviewFlow,
};
use shared::{
    domain::{CooperationFormat, OpennessLevel, ProfileId, ProfileKind},
    protocol::{CreatedProfile, ReviewRecord},
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Talent directory client")]
struct Cli {
    /// Settings file; defaults to client.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL hosting all directory functions. Overrides the settings file.
    #[arg(long)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one or more pages of profiles.
    List(ListArgs),
    /// Run the registration flow end to end.
    Register(RegisterArgs),
    /// Leave a rating on a model's profile.
    Review(ReviewArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value = "model")]
    kind: ProfileKind,
    /// How many pages to walk through.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    #[arg(long)]
    id: Option<i64>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    min_height: Option<u32>,
    #[arg(long)]
    max_height: Option<u32>,
    #[arg(long)]
    min_age: Option<u32>,
    #[arg(long)]
    max_age: Option<u32>,
    #[arg(long)]
    openness: Option<OpennessLevel>,
    #[arg(long)]
    cooperation: Option<CooperationFormat>,
    #[arg(long)]
    specialization: Option<String>,
}

impl ListArgs {
    fn filter(&self) -> ListingFilter {
        ListingFilter {
            id: self.id.map(ProfileId),
            name: self.name.clone(),
            city: self.city.clone(),
            gender: self.gender.clone(),
            min_height: self.min_height,
            max_height: self.max_height,
            min_age: self.min_age,
            max_age: self.max_age,
            openness_level: self.openness,
            cooperation_format: self.cooperation,
            specialization: self.specialization.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    kind: ProfileKind,
    #[arg(long)]
    login: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    code: String,
    /// JSON document with the profile fields.
    #[arg(long)]
    draft: Option<PathBuf>,
    /// Photos to stage; the first one becomes the cover.
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct ReviewArgs {
    #[arg(long)]
    profile: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    text: String,
    #[arg(long, default_value_t = 5)]
    rating: u8,
    #[arg(long)]
    code: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();
    let cli = Cli::parse();
    let settings = settings_for(&cli);
    let codes = Arc::new(FixedCodeIssuer::new(settings.verification_code.clone()));
    let api = Arc::new(HttpProfileApi::new(settings)?);

    match cli.command {
        Command::List(args) => {
            let mut listing = ListingController::new(args.kind, api);
            let mut outcome = listing.apply_filters(args.filter()).await;
            for _ in 1..args.pages {
                match listing.load_more().await {
                    Some(next) => outcome = next,
                    None => break,
                }
            }
            if outcome == LoadOutcome::Failed {
                bail!("failed to load {} profiles", listing.kind());
            }
            for profile in listing.profiles() {
                println!(
                    "#{} {} ({}) {}",
                    profile.id, profile.display_name, profile.city, profile.tag_summary
                );
            }
            if let Some(total) = listing.total() {
                println!("{} of {total} shown", listing.profiles().len());
            }
        }
        Command::Register(args) => {
            let mut flow = RegistrationFlow::new_with_dependencies(args.kind, api, codes);
            let mut events = flow.subscribe_events();
            if let Some(path) = &args.draft {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                *flow.draft_mut() = serde_json::from_str::<RegistrationDraft>(&raw)
                    .with_context(|| format!("invalid draft {}", path.display()))?;
            }
            {
                let draft = flow.draft_mut();
                draft.login = args.login;
                draft.password = args.password;
                draft.phone = args.phone;
            }
            let mut staged = Vec::with_capacity(args.photos.len());
            for path in &args.photos {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                staged.push(PhotoSource::new(file_name, bytes));
            }
            let added = flow.photos_mut().add_photos(staged);
            if added.discarded > 0 {
                info!(discarded = added.discarded, "photo limit reached");
            }

            let result = register(&mut flow, args.code).await;
            print_events(&mut events);
            let created = result?;
            println!("registered {} profile #{}", args.kind, created.id);
        }
        Command::Review(args) => {
            let mut flow =
                ReviewFlow::new_with_dependencies(ProfileId(args.profile), api, codes);
            let mut events = flow.subscribe_events();
            {
                let draft = flow.draft_mut();
                draft.author_name = args.name;
                draft.author_phone = args.phone;
                draft.text = args.text;
                draft.rating = args.rating;
            }
            let result = review(&mut flow, args.code).await;
            print_events(&mut events);
            let record = result?;
            println!("review #{} published", record.id);
        }
    }

    Ok(())
}

/// `RUST_LOG` when set and valid, otherwise `info`.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn settings_for(cli: &Cli) -> ClientSettings {
    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(base) = &cli.api_base {
        let base = base.trim_end_matches('/');
        settings.listing_url = format!("{base}/search-profiles");
        settings.register_model_url = format!("{base}/register-model");
        settings.register_photographer_url = format!("{base}/register-photographer");
        settings.review_url = format!("{base}/submit-model-review");
    }
    settings
}

async fn register(
    flow: &mut RegistrationFlow,
    code: String,
) -> Result<CreatedProfile, FlowError> {
    flow.submit_initial()?;
    flow.enter_code(code)?;
    flow.submit_code()?;
    flow.submit_profile().await
}

async fn review(flow: &mut ReviewFlow, code: String) -> Result<ReviewRecord, FlowError> {
    flow.submit_form()?;
    flow.enter_code(code)?;
    flow.submit_code().await
}

/// Failures are reported through the returned error instead.
fn print_events(events: &mut broadcast::Receiver<FlowEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            FlowEvent::CodeSent { phone } => println!("code sent to {phone}"),
            FlowEvent::PhoneVerified => println!("phone verified"),
            FlowEvent::ProfileSubmitted { .. }
            | FlowEvent::Failed { .. }
            | FlowEvent::ReviewPublished { .. }
            | FlowEvent::Closed => {}
        }
    }
}
