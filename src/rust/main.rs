use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use showdown::{
    default_sentiment_classes, BatchScoreClassifier, BuiltinModel, ClassifierError, ComparisonTable,
    ConsoleReporter, Corpus, Credentials, Label, LexiconClassifier, ModelManager,
    PrototypeClassifier, Registry, RemoteSentimentClassifier, Runner, ShowdownConfig,
};

const RULE_WIDTH: usize = 20;
const ADAPTER_NAMES: [&str; 4] = ["lexicon", "prototype", "remote", "batch"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML file mapping each label to its example texts
    #[arg(short, long, default_value = showdown::corpus::DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    /// Lexicon classifier decision threshold
    #[arg(short, long, default_value_t = showdown::classifier::DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Tab-separated `term<TAB>score` file replacing the built-in lexicon
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Milliseconds to wait between classifier calls
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Comma-separated classifiers to run (lexicon, prototype, remote, batch)
    #[arg(short, long, value_delimiter = ',')]
    adapters: Vec<String>,

    /// Skip the embedding prototype classifier
    #[arg(long)]
    skip_model: bool,

    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,
}

impl From<Args> for ShowdownConfig {
    fn from(args: Args) -> Self {
        Self {
            dataset_path: args.dataset,
            lexicon_threshold: args.threshold,
            lexicon_path: args.lexicon,
            item_delay: Duration::from_millis(args.delay_ms),
            adapters: args.adapters.into_iter().map(|a| a.trim().to_string()).collect(),
            use_model: !args.skip_model,
            fresh_download: args.fresh,
        }
    }
}

fn main() -> Result<()> {
    showdown::init_logger();
    let config = ShowdownConfig::from(Args::parse());

    let corpus = Corpus::load(&config.dataset_path)
        .with_context(|| format!("Failed to load examples from {:?}", config.dataset_path))?;
    println!("Loaded examples from {}", config.dataset_path.display());

    let registry = build_registry(&config, &Credentials::from_env())?;
    if registry.is_empty() {
        bail!("No classifiers available to evaluate");
    }
    println!("{}", "-".repeat(RULE_WIDTH));

    let start = Instant::now();
    let mut runner = Runner::new(ConsoleReporter::stdout()).with_call_delay(config.item_delay);
    let table = runner.run(&registry, &corpus)?;
    info!("Evaluated {} classifiers in {:.2?}", table.len(), start.elapsed());

    let report = ComparisonTable::from_results(&table, &Label::ALL)?;
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("Results");
    print!("{}", report);
    Ok(())
}

/// Builds every classifier the configuration asks for. A classifier that
/// cannot be built is skipped with a warning, unless it was named explicitly.
fn build_registry(config: &ShowdownConfig, credentials: &Credentials) -> Result<Registry> {
    if let Some(name) = config
        .adapters
        .iter()
        .find(|name| !ADAPTER_NAMES.iter().any(|known| known.eq_ignore_ascii_case(name)))
    {
        bail!("Unknown classifier '{}' (expected one of {})", name, ADAPTER_NAMES.join(", "));
    }

    let mut registry = Registry::new();

    if config.wants("lexicon") {
        let lexicon = match &config.lexicon_path {
            Some(path) => LexiconClassifier::from_tsv_file(path),
            None => Ok(LexiconClassifier::new()),
        }
        .and_then(|lexicon| lexicon.with_threshold(config.lexicon_threshold));
        if let Some(lexicon) = admit(config, "lexicon", lexicon)? {
            registry.register(lexicon)?;
        }
    }

    if config.use_model && config.wants("prototype") {
        let prototype = build_prototype(config.fresh_download);
        if let Some(prototype) = admit(config, "prototype", prototype)? {
            registry.register(prototype)?;
        }
    }

    if config.wants("remote") {
        let remote = credentials
            .single_endpoint()
            .and_then(|endpoint| RemoteSentimentClassifier::new("remote", endpoint));
        if let Some(remote) = admit(config, "remote", remote)? {
            registry.register(remote)?;
        }
    }

    if config.wants("batch") {
        let batch = credentials
            .batch_endpoint()
            .and_then(|endpoint| BatchScoreClassifier::new("batch", endpoint));
        if let Some(batch) = admit(config, "batch", batch)? {
            registry.register(batch)?;
        }
    }

    Ok(registry)
}

fn admit<C>(
    config: &ShowdownConfig,
    name: &str,
    built: Result<C, ClassifierError>,
) -> Result<Option<C>> {
    match built {
        Ok(classifier) => Ok(Some(classifier)),
        Err(e) if config.requires(name) => {
            Err(e).with_context(|| format!("Failed to set up classifier '{}'", name))
        }
        Err(e) => {
            warn!("Skipping classifier '{}': {}", name, e);
            Ok(None)
        }
    }
}

fn build_prototype(fresh: bool) -> Result<PrototypeClassifier, ClassifierError> {
    let manager = ModelManager::new_default().map_err(|e| {
        ClassifierError::BuildError(format!("Failed to create model manager: {}", e))
    })?;
    let model = BuiltinModel::MiniLM;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ClassifierError::BuildError(format!("Failed to start async runtime: {}", e)))?;
    runtime
        .block_on(async {
            if fresh {
                info!("Fresh download requested - removing any existing model files");
                manager.remove_download(model)?;
            }
            manager.ensure_model_downloaded(model).await
        })
        .map_err(|e| ClassifierError::BuildError(format!("Model download failed: {}", e)))?;

    let mut builder = PrototypeClassifier::builder().with_model_from(&manager, model)?;
    for class in default_sentiment_classes() {
        builder = builder.add_class(class)?;
    }
    builder.build()
}
