use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};

use ehr_board::models::{ActivityEvent, StayRecord};
use ehr_board::predict::{self, ModelArtifact, PatientFeatures};
use ehr_board::{filter, ingest, kpi, report, synthetic, utils, DashboardConfig};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "ehr-board",
    about = "Hospital-operations analytics: admission statistics, EHR activity KPIs and length-of-stay prediction.",
    version
)]
struct Cli {
    /// Directory charts and exports are written to
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Admissions dashboard from the document database or the JSON fallback
    Admissions {
        /// Local JSON fallback with nested patient documents
        #[arg(long, default_value = "patients.json")]
        patients_json: PathBuf,
    },
    /// EHR activity dashboard from a synthetic, CSV or PDF source
    Activity {
        /// One of: synthetic, csv, pdf
        #[arg(long, default_value = "synthetic")]
        source: String,
        /// Input file for the csv and pdf sources
        #[arg(long)]
        input: Option<PathBuf>,
        /// Number of synthetic visits
        #[arg(long, default_value_t = 400)]
        visits: usize,
        /// Number of synthetic clinicians
        #[arg(long, default_value_t = 12)]
        clinicians: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Restrict to one department area
        #[arg(long)]
        area: Option<String>,
        /// Restrict to a single department
        #[arg(long)]
        department: Option<String>,
        /// Restrict to specific clinicians (repeatable)
        #[arg(long = "clinician")]
        clinician_filter: Vec<String>,
    },
    /// Train the length-of-stay model and persist the best family
    Train {
        /// Flat admission-record JSON; synthetic admissions when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Synthetic patient-pool size
        #[arg(long, default_value_t = 400)]
        patients: usize,
        /// Number of synthetic admissions
        #[arg(long, default_value_t = 1200)]
        admissions: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "discharge_model.json")]
        model_path: PathBuf,
    },
    /// Predict the length of stay for a single admission
    Predict {
        #[arg(long, default_value = "discharge_model.json")]
        model_path: PathBuf,
        #[arg(long)]
        age: i64,
        #[arg(long)]
        sex: String,
        #[arg(long)]
        diagnosis: String,
        #[arg(long)]
        department: String,
        #[arg(long, default_value_t = 0)]
        prior_admissions: i64,
        #[arg(long)]
        from_emergency: bool,
        #[arg(long, default_value = "low")]
        severity: String,
        #[arg(long, default_value = "None")]
        comorbidities: String,
        #[arg(long, default_value_t = 120)]
        systolic_bp: i64,
        #[arg(long, default_value_t = 80)]
        diastolic_bp: i64,
        #[arg(long, default_value_t = 75)]
        heart_rate: i64,
        #[arg(long, default_value_t = 97)]
        oxygen_saturation: i64,
        #[arg(long, default_value_t = 0.9)]
        creatinine: f64,
        #[arg(long, default_value_t = 7000)]
        white_cell_count: i64,
        #[arg(long, default_value_t = 4.0)]
        crp: f64,
        #[arg(long)]
        surgery: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env();
    config.out_dir = cli.out_dir;

    match cli.command {
        Command::Admissions { patients_json } => {
            config.patients_json = patients_json;
            run_admissions(&config).await
        }
        Command::Activity {
            source,
            input,
            visits,
            clinicians,
            seed,
            area,
            department,
            clinician_filter,
        } => run_activity(
            &config,
            &source,
            input.as_deref(),
            visits,
            clinicians,
            seed,
            area.as_deref(),
            department.as_deref(),
            &clinician_filter,
        ),
        Command::Train {
            input,
            patients,
            admissions,
            seed,
            model_path,
        } => run_train(&config, input.as_deref(), patients, admissions, seed, &model_path),
        Command::Predict {
            model_path,
            age,
            sex,
            diagnosis,
            department,
            prior_admissions,
            from_emergency,
            severity,
            comorbidities,
            systolic_bp,
            diastolic_bp,
            heart_rate,
            oxygen_saturation,
            creatinine,
            white_cell_count,
            crp,
            surgery,
        } => {
            let features = PatientFeatures {
                age,
                sex,
                diagnosis,
                department,
                prior_admissions,
                from_emergency,
                severity,
                comorbidities,
                systolic_bp,
                diastolic_bp,
                heart_rate,
                oxygen_saturation,
                creatinine,
                white_cell_count,
                crp,
                surgery,
            };
            run_predict(&model_path, &features)
        }
    }
}

async fn run_admissions(config: &DashboardConfig) -> anyhow::Result<()> {
    let documents = ingest::load_patient_documents(config)
        .await
        .context("loading patient documents")?;
    if documents.is_empty() {
        warn!("No patient documents to display; check the database or the JSON fallback");
        return Ok(());
    }

    let stays = StayRecord::flatten(&documents);
    info!("Flattened {} patients into {} stays", documents.len(), stays.len());

    let overview = kpi::stay_overview(&stays);
    println!("== Hospital admissions ==");
    report::print_stay_overview(&overview);

    let distribution = report::length_distribution(&stays);
    if !distribution.is_empty() {
        report::charts::bar_chart_svg(
            &config.out_dir.join("stay_distribution.svg"),
            "Length-of-stay distribution",
            "stays",
            &distribution,
        )?;
    }
    report::write_stays_csv(&stays, &config.out_dir.join("admissions.csv"))?;

    if !config.model_path.exists() {
        info!(
            "No model artifact at {}; run `ehr-board train` to enable predictions",
            config.model_path.display()
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_activity(
    config: &DashboardConfig,
    source: &str,
    input: Option<&std::path::Path>,
    visits: usize,
    clinicians: usize,
    seed: u64,
    area: Option<&str>,
    department: Option<&str>,
    clinician_filter: &[String],
) -> anyhow::Result<()> {
    let batch = match source {
        "synthetic" => {
            let events = synthetic::synthesize_events(visits, clinicians, seed);
            info!("Generated {} synthetic activity rows", events.len());
            ActivityEvent::to_record_batch(&events)?
        }
        _ => {
            let input = input.context("--input is required for csv and pdf sources")?;
            let loader = ingest::source_from_name(source)?;
            let batches = loader.load(input)?;
            utils::concat_batches(&batches)?
        }
    };

    let mut working = batch;
    if let Some(department) = department {
        working = filter::filter_by_department(&working, department)?;
    } else if let Some(area) = area {
        working = filter::filter_by_area(&working, area)?;
    }
    if !clinician_filter.is_empty() {
        working = filter::filter_by_clinicians(&working, clinician_filter)?;
    }
    info!("Working table has {} rows", working.num_rows());

    println!("== Clinical bureaucracy KPIs ==");
    let overview = kpi::kpi_overview(&working);
    report::print_kpi_cards(&overview);

    let shares = kpi::share_time_by_activity(&working);
    println!("-- time by activity --");
    report::print_activity_table(&shares);

    let workload = kpi::clinicians_workload(&working);
    println!("-- workload by clinician --");
    report::print_workload_table(&workload);

    let outliers = kpi::outlier_visits(&working);
    println!("-- outlier visits (above the upper Tukey fence) --");
    report::print_outlier_table(&outliers);

    if !shares.is_empty() {
        let share_bars: Vec<(String, f64)> = shares
            .iter()
            .map(|s| (s.activity.clone(), s.minutes))
            .collect();
        report::charts::bar_chart_svg(
            &config.out_dir.join("activity_minutes.svg"),
            "Total minutes per activity",
            "minutes",
            &share_bars,
        )?;
    }
    if !workload.is_empty() {
        report::charts::bar_chart_svg(
            &config.out_dir.join("clinician_workload.svg"),
            "Total minutes per clinician",
            "minutes",
            &workload,
        )?;
    }

    report::write_events_csv(&working, &config.out_dir.join("clinical_logs.csv"))?;
    report::write_parquet(&working, &config.out_dir.join("clinical_logs.parquet"))?;
    report::write_activity_shares_csv(&shares, &config.out_dir.join("activity_aggregates.csv"))?;
    Ok(())
}

fn run_train(
    config: &DashboardConfig,
    input: Option<&std::path::Path>,
    patients: usize,
    admissions: usize,
    seed: u64,
    model_path: &std::path::Path,
) -> anyhow::Result<()> {
    let records = match input {
        Some(path) => ingest::json::load_admissions_json(path).context("loading training data")?,
        None => {
            info!("Generating {admissions} synthetic admissions for training");
            synthetic::synthesize_admissions(patients, admissions, seed)
        }
    };

    let snapshot = ehr_board::models::Admission::to_record_batch(&records)?;
    report::write_parquet(&snapshot, &config.out_dir.join("training_admissions.parquet"))?;

    let (artifact, scores) =
        predict::train_and_select(&records, seed, config.training_parallelism)?;

    println!("== Model comparison ==");
    println!("  {:<18} {:>8} {:>8} {:>8}", "model", "R2", "MAE", "RMSE");
    for score in &scores {
        println!(
            "  {:<18} {:>8.4} {:>8.3} {:>8.3}",
            score.name, score.r2, score.mae, score.rmse
        );
    }
    println!();

    artifact.save(model_path)?;
    println!(
        "Best model '{}' saved to {}",
        artifact.score.name,
        model_path.display()
    );
    Ok(())
}

fn run_predict(model_path: &std::path::Path, features: &PatientFeatures) -> anyhow::Result<()> {
    let artifact = ModelArtifact::load(model_path)?;
    let days = artifact.predict(features)?;
    println!("Predicted length of stay: {days:.1} days");
    println!(
        "(model '{}', held-out R2 {:.3})",
        artifact.score.name, artifact.score.r2
    );
    Ok(())
}
