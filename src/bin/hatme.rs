use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "hatme", version)]
struct Cli {
    /// JSON config file; environment variables override it, flags override both.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Put one or more hats on a face.
    Apply(ApplyArgs),
    /// List the approved hats in a catalog manifest.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Face photo (PNG or JPEG).
    #[arg(long, conflicts_with = "default_face", required_unless_present = "default_face")]
    face: Option<PathBuf>,

    /// Use the configured stand-in face instead of an upload.
    #[arg(long)]
    default_face: bool,

    /// Hat image (PNG with alpha).
    #[arg(long, conflicts_with = "catalog", required_unless_present = "catalog")]
    hat: Option<PathBuf>,

    /// Hat catalog manifest to pick the hat from.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Hat style to look up in the catalog.
    #[arg(long, requires = "catalog")]
    style: Option<String>,

    /// Number of hats to stack.
    #[arg(long)]
    count: Option<String>,

    /// Face detection backend for in-process compositing.
    #[arg(long, value_enum)]
    detector: Option<DetectorChoice>,

    /// Face detection endpoint.
    #[arg(long)]
    detector_endpoint: Option<String>,

    /// Remote compositor (`host:port` or full URL); hops run in-process when unset.
    #[arg(long)]
    endpoint: Option<String>,

    /// Output path: the final PNG, or the raw response body with `--json`.
    #[arg(long)]
    out: PathBuf,

    /// Write the terminal hop's raw JSON body instead of decoding the PNG.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Hat catalog manifest.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DetectorChoice {
    CloudVision,
    RectApi,
    Local,
}

impl From<DetectorChoice> for hatme::LocatorKind {
    fn from(choice: DetectorChoice) -> Self {
        match choice {
            DetectorChoice::CloudVision => Self::CloudVision,
            DetectorChoice::RectApi => Self::RectApi,
            DetectorChoice::Local => Self::LocalInference,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Apply(args) => cmd_apply(cfg, args).await,
        Command::List(args) => cmd_list(cfg, args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<hatme::HatmeConfig> {
    let mut cfg = match path {
        Some(path) => hatme::HatmeConfig::from_json_file(path)?,
        None => hatme::HatmeConfig::default(),
    };
    cfg.apply_env().context("apply environment overrides")?;
    Ok(cfg)
}

fn open_catalog(
    cfg: &hatme::HatmeConfig,
    flag: Option<&Path>,
    client: &reqwest::Client,
) -> anyhow::Result<hatme::ManifestCatalog> {
    let path = flag
        .or(cfg.catalog.as_deref())
        .context("no hat catalog: pass --catalog or set \"catalog\" in the config")?;
    Ok(hatme::ManifestCatalog::from_json_file(path, client.clone())?)
}

async fn cmd_apply(mut cfg: hatme::HatmeConfig, args: ApplyArgs) -> anyhow::Result<()> {
    if let Some(choice) = args.detector {
        cfg.detector.kind = choice.into();
    }
    if let Some(endpoint) = args.detector_endpoint {
        cfg.detector.endpoint = endpoint;
    }
    if let Some(endpoint) = args.endpoint {
        cfg.manipulate_endpoint = Some(endpoint);
    }
    cfg.validate()?;

    let client = reqwest::Client::new();
    let catalog = match &args.hat {
        Some(hat) => hatme::ManifestCatalog::new(
            vec![hatme::HatEntry {
                description: "custom".to_string(),
                url: hat.display().to_string(),
                approve: true,
            }],
            ".",
            client.clone(),
        ),
        None => open_catalog(&cfg, args.catalog.as_deref(), &client)?,
    };

    let face = match &args.face {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read face '{}'", path.display()))?;
            hatme::FaceInput::Upload(hatme::ImageBuffer::new(bytes))
        }
        None => hatme::FaceInput::Default,
    };

    let compositor = cfg.build_compositor(client.clone())?;
    let service = hatme::HatService::new(
        Arc::new(catalog),
        compositor,
        client,
        cfg.default_face_url.clone(),
    )
    .with_hop_timeout(cfg.hop_timeout());

    let result = service
        .handle(hatme::HatRequest {
            face,
            style: args.style,
            count: args.count,
        })
        .await
        .map_err(report)?;

    if args.json {
        let body = serde_json::to_vec_pretty(result.body.as_json())?;
        std::fs::write(&args.out, body)
            .with_context(|| format!("write '{}'", args.out.display()))?;
    } else {
        let png = result.body.final_image()?;
        std::fs::write(&args.out, png.as_bytes())
            .with_context(|| format!("write '{}'", args.out.display()))?;
    }

    tracing::info!(hops = result.hops, out = %args.out.display(), "done");
    Ok(())
}

async fn cmd_list(cfg: hatme::HatmeConfig, args: ListArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let catalog = open_catalog(&cfg, args.catalog.as_deref(), &client)?;
    let hats = hatme::HatCatalog::list(&catalog).await?;
    println!("{}", serde_json::to_string_pretty(&hats)?);
    Ok(())
}

/// Log the structured payload before handing the error to anyhow.
fn report(err: hatme::HatError) -> anyhow::Error {
    let payload = hatme::ErrorPayload::from(&err);
    tracing::error!(
        status = err.status_code(),
        kind = ?payload.kind,
        retryable = payload.retryable,
        "request failed"
    );
    err.into()
}
