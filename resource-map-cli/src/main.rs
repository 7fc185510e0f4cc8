use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config_template::{Template, DEFAULT_CONFIG_FILE};
use resource_map::{
    render_panel_text, App, AppConfig, Capabilities, CategoryFilter, Command, CommandOutcome,
    CsvIngestor, DataOrigin, DeviceLocator, DirectionsOutcome, FixedLocator, GeoJsonSurface,
    GoogleMapsClient, LatLng, ListView, LoadReport, Notifier, OriginChoice, OriginPrompt,
    ProcessingState, ResourceDirectory,
};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

mod config_template;

/// Community Resource Map
/// Loads community resources from CSV, geocodes and filters them, and plans
/// driving directions to a selected resource
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output for detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSONC config file; built-in defaults are used when omitted
    #[arg(short, long, global = true, value_name = "PATH TO CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load resources and print the filtered list
    List {
        /// Keep resources whose name, address, phone or category label contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Category to show (all/foundation/chief/church/locksmith)
        #[arg(long, default_value = "all")]
        category: CategoryFilter,

        /// Also write the listed items to this CSV file
        #[arg(long, value_name = "CSV OUTPUT PATH")]
        csv: Option<PathBuf>,
    },
    /// Geocode every resource and write the visible markers as GeoJSON
    Plot {
        /// Output path for the GeoJSON FeatureCollection
        #[arg(
            short,
            long,
            default_value = "resources.geojson",
            value_name = "OUTPUT PATH"
        )]
        output: PathBuf,

        /// Keep resources whose name, address, phone or category label contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Category to show (all/foundation/chief/church/locksmith)
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Plan a driving route to a resource
    Directions {
        /// Record id of the destination resource
        #[arg(short, long, value_name = "RECORD ID")]
        to: usize,

        /// Depart from this device position
        #[arg(long, value_name = "LAT,LNG", conflicts_with = "from")]
        current_location: Option<LatLng>,

        /// Depart from this address; read from stdin when omitted
        #[arg(short, long, value_name = "ADDRESS")]
        from: Option<String>,
    },
    /// Generate a config template
    GenerateConfig {
        /// Type of config template to generate (basic/full)
        #[arg(short = 't', long = "type", default_value = "basic")]
        template_type: String,

        /// Output path for the generated config
        #[arg(
            short,
            long,
            default_value = DEFAULT_CONFIG_FILE,
            value_name = "OUTPUT PATH"
        )]
        output: PathBuf,
    },
    /// Validate a config file
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .init();

    info!("Community Resource Map starting up...");

    match cli.command {
        Commands::GenerateConfig {
            template_type,
            output,
        } => generate_config_command(&template_type, &output),
        Commands::ValidateConfig => validate_config_command(cli.config.as_deref()),
        Commands::List {
            search,
            category,
            csv,
        } => {
            let config = load_config(cli.config.as_deref())?;
            list_command(&config, search, category, csv).await
        }
        Commands::Plot {
            output,
            search,
            category,
        } => {
            let config = load_config(cli.config.as_deref())?;
            plot_command(config, &output, search, category).await
        }
        Commands::Directions {
            to,
            current_location,
            from,
        } => {
            let config = load_config(cli.config.as_deref())?;
            directions_command(config, to, current_location, from).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            AppConfig::from_file(path)
                .context("Failed to load config. See errors for additional details:")?
        }
        None => {
            info!("No config given, using defaults");
            AppConfig::default()
        }
    };
    config.validate().context("Failed to validate config")?;
    Ok(config)
}

async fn list_command(
    config: &AppConfig,
    search: Option<String>,
    category: CategoryFilter,
    csv_output: Option<PathBuf>,
) -> Result<()> {
    let ingestor = CsvIngestor::from_config(config).context("Failed to set up CSV source")?;
    let loaded = ingestor.load_records().await;
    log_origin(&loaded.origin);
    log_skipped(&loaded.state);

    let directory = ResourceDirectory::new(loaded.records);
    let filtered = directory.filter(search.as_deref().unwrap_or(""), category);
    info!(
        "Showing {} of {} resources (category: {})",
        filtered.len(),
        directory.len(),
        category
    );

    let mut list = ListView::new();
    list.render(&filtered);

    let mut out = io::stdout().lock();
    for item in list.items() {
        writeln!(out, "[{}] {}", item.record_id, item.title)?;
        writeln!(out, "    {}", item.subtitle)?;
    }

    if let Some(path) = csv_output {
        let file = fs::File::create(&path)
            .context(format!("Failed to create CSV output: {}", path.display()))?;
        list.write_csv(file)
            .context(format!("Failed to write CSV output: {}", path.display()))?;
        info!("Wrote resource list to {}", path.display());
    }
    Ok(())
}

async fn plot_command(
    config: AppConfig,
    output: &Path,
    search: Option<String>,
    category: CategoryFilter,
) -> Result<()> {
    let ingestor = CsvIngestor::from_config(&config).context("Failed to set up CSV source")?;
    let mut app = build_app(config, None, Box::new(StdinPrompt))?;

    let report = app.load(&ingestor).await;
    log_report(&report);

    if let Some(search) = search {
        app.handle(Command::Search(search)).await;
    }
    app.handle(Command::SelectCategory(category)).await;

    let surface = app.into_surface();
    surface
        .write_geojson(output)
        .context(format!("Failed to write GeoJSON to: {}", output.display()))?;
    info!(
        "Wrote {} visible markers to {}",
        surface.visible_record_ids().len(),
        output.display()
    );
    Ok(())
}

async fn directions_command(
    config: AppConfig,
    record_id: usize,
    current_location: Option<LatLng>,
    from: Option<String>,
) -> Result<()> {
    let ingestor = CsvIngestor::from_config(&config).context("Failed to set up CSV source")?;

    let locator = current_location
        .map(|position| Arc::new(FixedLocator(position)) as Arc<dyn DeviceLocator>);
    let choice = if locator.is_some() {
        OriginChoice::CurrentLocation
    } else {
        OriginChoice::CustomLocation
    };
    let prompt: Box<dyn OriginPrompt> = match from {
        Some(origin) => Box::new(FixedAnswer(origin)),
        None => Box::new(StdinPrompt),
    };

    let mut app = build_app(config, locator, prompt)?;
    let report = app.load(&ingestor).await;
    log_report(&report);

    let outcome = app
        .handle(Command::RequestDirections {
            record_id,
            from: choice,
        })
        .await;

    match outcome {
        CommandOutcome::Directions(DirectionsOutcome::Routed {
            origin,
            attempt,
            route,
        }) => {
            info!("Route from {} found ({:?})", origin, attempt);
            println!("{}", render_panel_text(&route));
            Ok(())
        }
        CommandOutcome::Directions(DirectionsOutcome::Abandoned(reason)) => {
            anyhow::bail!("Directions request abandoned: {:?}", reason)
        }
        CommandOutcome::Directions(DirectionsOutcome::Failed(status)) => {
            anyhow::bail!("No route could be planned: {}", status)
        }
        _ => anyhow::bail!("No resource with id {}", record_id),
    }
}

fn build_app(
    config: AppConfig,
    locator: Option<Arc<dyn DeviceLocator>>,
    prompt: Box<dyn OriginPrompt>,
) -> Result<App<GeoJsonSurface>> {
    let google = Arc::new(
        GoogleMapsClient::new(&config.google).context("Failed to set up Google Maps client")?,
    );
    Ok(App::new(
        config,
        GeoJsonSurface::default(),
        Capabilities {
            geocoder: google.clone(),
            directions: google,
            locator,
            prompt,
            notifier: Arc::new(StderrNotifier),
        },
    ))
}

fn generate_config_command(template_type: &str, output: &Path) -> Result<()> {
    let template = match template_type.to_lowercase().as_str() {
        "basic" => Template::Basic,
        "full" => Template::Full,
        _ => anyhow::bail!("Invalid template type. Must be either 'basic' or 'full'"),
    };

    info!("Generating {} config template...", template_type);

    // if output is a directory, append the default file name
    let full_file_output_path = if output.is_dir() {
        output.join(DEFAULT_CONFIG_FILE)
    } else {
        output.to_path_buf()
    };

    fs::write(&full_file_output_path, template.content())
        .context(format!("Failed to write config to: {}", output.display()))?;

    info!(
        "Successfully generated config template at: {}",
        full_file_output_path.display()
    );
    Ok(())
}

fn validate_config_command(config_path: Option<&Path>) -> Result<()> {
    info!("Validating config...");

    let config_path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found: {}. Try using --config <PATH TO CONFIG>",
            config_path.display()
        );
    }

    let config = AppConfig::from_file(config_path)
        .context("Failed to parse config. See errors for additional details:")?;
    config.validate().context("Failed to validate config")?;

    info!("Config validation successful");
    info!("Candidate files: {}", config.candidate_files.join(", "));
    match &config.base_url {
        Some(base_url) => info!("Source: {}", base_url),
        None => info!("Source: {}", config.data_dir.display()),
    }
    if config.google.resolve_api_key().is_none() {
        warn!("No Google Maps API key configured; plot and directions will not run");
    }
    Ok(())
}

fn log_origin(origin: &DataOrigin) {
    match origin {
        DataOrigin::Csv(name) => info!("Data source: {}", name),
        DataOrigin::Sample => warn!("No CSV could be loaded, showing sample data"),
    }
}

fn log_skipped(state: &ProcessingState) {
    for warning in state.get_warnings() {
        warn!("{}", warning);
    }
}

fn log_report(report: &LoadReport) {
    log_origin(&report.origin);
    for warning in report.outcome.warnings() {
        warn!("{}", warning);
    }
    info!(
        "{} resources loaded, {} placed on the map",
        report.accepted, report.geocoded
    );
}

/// Reads the origin from one line of stdin. EOF counts as cancelled.
struct StdinPrompt;

impl OriginPrompt for StdinPrompt {
    fn prompt(&self, message: &str) -> Option<String> {
        eprint!("{}", message);
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

/// Answers the origin prompt with the `--from` value.
struct FixedAnswer(String);

impl OriginPrompt for FixedAnswer {
    fn prompt(&self, _message: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
