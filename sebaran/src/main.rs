//! Point d'entrée CLI pour sebaran

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Statistiques de répartition spatiale à partir de couches GeoJSON
#[derive(Parser)]
#[command(name = "sebaran")]
#[command(author, version)]
#[command(about = "Répartition des bâtiments commerciaux par kecamatan (GeoJSON)")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Aggregate {
            subjects,
            regions,
            config,
            region_property,
            category_property,
            fallback,
            top,
            include_empty,
            output,
        } => {
            info!(
                subjects = %subjects.display(),
                regions = %regions.display(),
                "Analyse de répartition"
            );
            cli::cmd_aggregate(
                &subjects,
                &regions,
                config.as_deref(),
                region_property,
                category_property,
                fallback,
                top,
                include_empty,
                output.as_deref(),
            )?;
        }
        Commands::Labels {
            input,
            name_property,
            config,
            output,
        } => {
            info!(input = %input.display(), "Export des étiquettes");
            cli::cmd_labels(&input, name_property, config.as_deref(), output.as_deref())?;
        }
        Commands::Bounds {
            input,
            property,
            value,
        } => {
            cli::cmd_bounds(&input, property.as_deref(), value.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
