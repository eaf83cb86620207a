use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::str::FromStr;
use vault_catalog::{
    Artifact, ArtifactCatalog, ArtifactId, CategoryId, CompletionTracker, GrowthStage, UploadedArtifacts,
};
use vault_core::VaultConfig;
use vault_validation::{FileValidator, SubmittedFile};

fn cli() -> Command {
    Command::new("vault")
        .version(vault_core::VERSION)
        .about("Document vault artifact catalog and upload validation")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a vault TOML config"),
        )
        .subcommand(
            Command::new("catalog")
                .about("Print the catalog, filtered to a growth stage")
                .arg(stage_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("remaining")
                .about("Print missing artifacts of a category in priority order")
                .arg(category_arg())
                .arg(stage_arg())
                .arg(
                    Arg::new("uploaded")
                        .long("uploaded")
                        .value_delimiter(',')
                        .help("Comma-separated artifact ids already uploaded"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a file on disk against a category or artifact")
                .arg(category_arg())
                .arg(
                    Arg::new("artifact")
                        .long("artifact")
                        .help("Artifact id; omit for bulk (folder) validation"),
                )
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File to validate"),
                ),
        )
}

fn stage_arg() -> Arg {
    Arg::new("stage")
        .long("stage")
        .help("Growth stage (Pre-Seed, Seed, Series A, Series B); unknown shows everything")
}

fn category_arg() -> Arg {
    Arg::new("category")
        .long("category")
        .required(true)
        .help("Category key, e.g. 0_Overview")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn stage(args: &ArgMatches, config: &VaultConfig) -> Option<GrowthStage> {
    match args.get_one::<String>("stage") {
        Some(raw) => GrowthStage::lookup(raw),
        None => config.stage(),
    }
}

fn category(args: &ArgMatches) -> anyhow::Result<CategoryId> {
    let raw = args
        .get_one::<String>("category")
        .ok_or_else(|| anyhow!("--category is required"))?;
    Ok(CategoryId::from_str(raw)?)
}

fn describe(artifact: &Artifact) -> String {
    format!(
        "{} ({}) [{}] max {}MB, {}{}",
        artifact.id(),
        artifact.name(),
        artifact.allowed_formats().join(", "),
        artifact.max_size_mb(),
        artifact.priority().as_str(),
        if artifact.is_mandatory() { ", mandatory" } else { "" },
    )
}

fn print_catalog(catalog: &ArtifactCatalog, args: &ArgMatches, config: &VaultConfig) -> anyhow::Result<()> {
    let view = catalog.artifacts_for_stage(stage(args, config));
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "Catalog {} ({})",
        catalog.version(),
        view.stage().map_or("all stages", |s| s.label())
    );
    for (category, artifacts) in view.iter() {
        let name = catalog.category(category).map(|c| c.name()).unwrap_or_default();
        println!("{category} {name}");
        for artifact in artifacts {
            println!("  - {}", describe(artifact));
        }
    }
    Ok(())
}

fn print_remaining(catalog: &ArtifactCatalog, args: &ArgMatches, config: &VaultConfig) -> anyhow::Result<()> {
    let category = category(args)?;
    let stage = stage(args, config);
    let uploaded = UploadedArtifacts::loaded(
        args.get_many::<String>("uploaded")
            .into_iter()
            .flatten()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
    );
    let tracker = CompletionTracker::new(catalog, stage, &uploaded);
    let remaining = tracker.remaining_artifacts(category)?;
    let complete = tracker.is_category_complete(category)?;

    if args.get_flag("json") {
        let value = serde_json::json!({
            "category": category,
            "stage": stage,
            "complete": complete,
            "not_applicable": tracker.has_no_artifacts_required(category)?,
            "remaining": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for artifact in &remaining {
        println!("{}", describe(artifact));
    }
    println!("complete: {complete}");
    Ok(())
}

fn validate_file(catalog: &ArtifactCatalog, args: &ArgMatches) -> anyhow::Result<bool> {
    let category = category(args)?;
    let path = args
        .get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow!("a file is required"))?;
    let metadata = std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
    let file = SubmittedFile::metadata(name, metadata.len());
    let artifact = args.get_one::<String>("artifact").map(|a| ArtifactId::from(a.as_str()));

    let outcome = FileValidator::new(catalog).validate(&file, category, artifact.as_ref());
    if outcome.is_valid() {
        let matched = outcome
            .matched_artifact()
            .map(|a| a.id().to_string())
            .unwrap_or_default();
        println!("valid: {file} matches {matched}");
    } else {
        for message in outcome.messages() {
            println!("invalid: {message}");
        }
    }
    Ok(outcome.is_valid())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => VaultConfig::load(path)?,
        None => VaultConfig::default(),
    };
    init_tracing(&config.log_filter)?;
    let catalog = config.catalog()?;

    match matches.subcommand() {
        Some(("catalog", args)) => print_catalog(&catalog, args, &config),
        Some(("remaining", args)) => print_remaining(&catalog, args, &config),
        Some(("validate", args)) => {
            if !validate_file(&catalog, args)? {
                std::process::exit(1);
            }
            Ok(())
        }
        _ => Err(anyhow!("unknown command")),
    }
}
