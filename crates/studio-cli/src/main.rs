use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use studio_contracts::assets::decode_data_url;
use studio_contracts::events::EventLog;
use studio_contracts::requests::{OutfitSwap, ProductPoster, RequestBuilder, VideoPrompt};
use studio_contracts::{AspectRatio, Credential, ImageAsset, ObjectStore, Pose, StudioError};
use studio_engine::{GenerationResult, Studio, StudioConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const EXIT_CREDENTIAL_REJECTED: i32 = 3;

#[derive(Debug, Parser)]
#[command(name = "studio-rs", version, about = "Creative studio generation CLI")]
struct Cli {
    /// Gemini API key. Only read here; the engine never looks it up itself.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Append session events to this JSONL file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dress a character in an outfit, optionally holding an item.
    Outfit(OutfitArgs),
    /// Place a product into a themed poster scene.
    Poster(PosterArgs),
    /// Generate a short video from a prompt and optional reference frame.
    Video(VideoArgs),
    /// Confirm the API key with one round trip.
    KeyCheck,
    /// List pose and aspect ratio options.
    Options,
}

#[derive(Debug, Args)]
struct OutfitArgs {
    #[arg(long)]
    character: PathBuf,
    #[arg(long)]
    outfit: PathBuf,
    #[arg(long)]
    handheld: Option<PathBuf>,
    #[arg(long, default_value = "original")]
    pose: Pose,
    #[arg(long, default_value = "1:1")]
    ratio: AspectRatio,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct PosterArgs {
    #[arg(long)]
    product: PathBuf,
    #[arg(long)]
    theme: String,
    #[arg(long)]
    logo: Option<PathBuf>,
    #[arg(long, default_value = "1:1")]
    ratio: AspectRatio,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct VideoArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long)]
    reference: Option<PathBuf>,
    #[arg(long, default_value = "16:9")]
    ratio: AspectRatio,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    out: PathBuf,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("studio-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing();

    if let Command::Options = cli.command {
        print_options();
        return Ok(0);
    }

    let credential = credential_from(cli.api_key.as_deref())?;
    let config = StudioConfig::from_env();
    let objects = ObjectStore::new();
    let mut studio = Studio::gemini(&config, objects.clone());
    if let Some(path) = cli.events.as_ref() {
        studio = studio.with_events(EventLog::new(path, session_id()));
    }

    match cli.command {
        Command::Outfit(args) => run_outfit(&studio, &objects, credential, args),
        Command::Poster(args) => run_poster(&studio, &objects, credential, args),
        Command::Video(args) => run_video(&studio, &objects, credential, args),
        Command::KeyCheck => run_key_check(&studio, &credential),
        Command::Options => Ok(0),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn credential_from(raw: Option<&str>) -> Result<Credential> {
    Credential::new(raw.unwrap_or_default()).context("pass --api-key or set GEMINI_API_KEY")
}

fn session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}

fn load_asset(objects: &ObjectStore, path: &Path) -> Result<ImageAsset> {
    ImageAsset::from_path(objects, path)
        .with_context(|| format!("failed to load image {}", path.display()))
}

fn load_optional(objects: &ObjectStore, path: Option<&PathBuf>) -> Result<Option<ImageAsset>> {
    path.map(|path| load_asset(objects, path)).transpose()
}

fn run_outfit(
    studio: &Studio,
    objects: &ObjectStore,
    credential: Credential,
    args: OutfitArgs,
) -> Result<i32> {
    let character = load_asset(objects, &args.character)?;
    let outfit = load_asset(objects, &args.outfit)?;
    let handheld = load_optional(objects, args.handheld.as_ref())?;
    let input = OutfitSwap {
        character: Some(&character),
        outfit: Some(&outfit),
        handheld: handheld.as_ref(),
        pose: args.pose,
        ratio: args.ratio,
        model: args.model.as_deref(),
    };
    generate(studio, &input, credential, &args.out)
}

fn run_poster(
    studio: &Studio,
    objects: &ObjectStore,
    credential: Credential,
    args: PosterArgs,
) -> Result<i32> {
    let product = load_asset(objects, &args.product)?;
    let logo = load_optional(objects, args.logo.as_ref())?;
    let input = ProductPoster {
        product: Some(&product),
        theme: &args.theme,
        logo: logo.as_ref(),
        ratio: args.ratio,
        model: args.model.as_deref(),
    };
    generate(studio, &input, credential, &args.out)
}

fn run_video(
    studio: &Studio,
    objects: &ObjectStore,
    credential: Credential,
    args: VideoArgs,
) -> Result<i32> {
    let reference = load_optional(objects, args.reference.as_ref())?;
    let input = VideoPrompt {
        prompt: &args.prompt,
        reference: reference.as_ref(),
        ratio: args.ratio,
        model: args.model.as_deref(),
    };
    generate(studio, &input, credential, &args.out)
}

fn run_key_check(studio: &Studio, credential: &Credential) -> Result<i32> {
    match studio.check_credential(credential) {
        Ok(()) => {
            println!("API key {} accepted", credential.masked());
            Ok(0)
        }
        Err(err) => report_failure(err, credential),
    }
}

fn generate(
    studio: &Studio,
    builder: &dyn RequestBuilder,
    credential: Credential,
    out: &Path,
) -> Result<i32> {
    let reported = credential.clone();
    let result = match studio.run(builder, credential) {
        Ok(result) => result,
        Err(err) => return report_failure(err, &reported),
    };
    let bytes = write_result(result, out)?;
    info!(path = %out.display(), bytes, "result written");
    println!("{}", out.display());
    Ok(0)
}

fn report_failure(err: StudioError, credential: &Credential) -> Result<i32> {
    if err.is_credential_rejected() {
        eprintln!(
            "studio-rs: API key {} was rejected: {err}",
            credential.masked()
        );
        eprintln!("studio-rs: select a different key and run `studio-rs key-check`");
        return Ok(EXIT_CREDENTIAL_REJECTED);
    }
    Err(err.into())
}

/// Writes the result to `out` and releases any object handle.
fn write_result(result: GenerationResult, out: &Path) -> Result<usize> {
    if let Some(parent) = out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let bytes = match &result {
        GenerationResult::Image(data_uri) => decode_data_url(data_uri)?.1,
        GenerationResult::Video(handle) => handle
            .bytes()
            .map(|bytes| bytes.to_vec())
            .context("video handle was already released")?,
    };
    result.release();
    fs::write(out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(bytes.len())
}

fn print_options() {
    println!("poses:");
    for pose in Pose::ALL {
        println!("  {}", pose.key());
    }
    println!("ratios:");
    for ratio in AspectRatio::ALL {
        println!(
            "  {:<5} {} (video {})",
            ratio.image_code(),
            ratio.label(),
            ratio.video_code()
        );
    }
}
