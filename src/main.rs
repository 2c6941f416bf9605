use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use hostel_allotment::allotment::{make_rng, AllotmentOptions, PriorityPass, RoomAllotter, RoomDistribution};
use hostel_allotment::config::Config;
use hostel_allotment::display::{print_allotment, summarize};
use hostel_allotment::export::{export_filename, write_allotment_to_file};
use hostel_allotment::roster::{load_roster, FieldMapping};
use hostel_allotment::web;

#[derive(Parser, Debug)]
#[command(name = "hostel-allotment")]
#[command(about = "Hostel room allotment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the allotment API
    Web {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Allot one gender cohort from a roster CSV and write the manifest
    Allot {
        csv: PathBuf,
        /// Room size -> count, e.g. '{"4": 94, "3": 110}'
        #[arg(long)]
        distribution: String,
        /// Role -> column (or column -> role) JSON
        #[arg(long)]
        mapping: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        soe_priority: Option<String>,
        #[arg(long = "extra-field")]
        extra_fields: Vec<String>,
        #[arg(long, default_value = "literal")]
        priority_pass: PriorityPass,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load();

    match cli.command {
        Commands::Web { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            web::start_server(config).await?;
        }
        Commands::Allot {
            csv,
            distribution,
            mapping,
            gender,
            soe_priority,
            extra_fields,
            priority_pass,
            seed,
            output,
            quiet,
        } => {
            let distribution = RoomDistribution::from_json(&distribution)?;
            distribution.ensure_max_rooms(config.max_rooms)?;
            let mapping = FieldMapping::from_json(&mapping)?;
            for role in mapping.missing_required() {
                warn!("Field mapping has no column for {role}");
            }

            let options = AllotmentOptions::new(gender.trim())
                .with_soe_priority(soe_priority.unwrap_or(config.soe_priority))
                .with_extra_fields(extra_fields)
                .with_priority_pass(priority_pass);

            let roster = load_roster(&csv, &mapping)
                .with_context(|| format!("failed to load roster from {}", csv.display()))?;
            info!("Loaded {} student row(s) from {}", roster.students.len(), csv.display());

            let mut rng = make_rng(seed.or(config.seed));
            let allotment = RoomAllotter::new(&distribution, &mapping, &options)
                .allot_with_rng(&roster.students, &mut rng);

            if !quiet {
                print_allotment(&format!("Allotment ({})", options.target_gender), &allotment);
            }

            let output = output
                .unwrap_or_else(|| PathBuf::from(export_filename(&options.target_gender, Local::now())));
            write_allotment_to_file(&output, &allotment, &mapping, &options)?;
            info!("{}", summarize(&allotment));
            info!("Manifest saved to {}", output.display());
        }
    }

    Ok(())
}
