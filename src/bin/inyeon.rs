#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use inyeon_match::profile::Gender;
use inyeon_match::{
    normalize, normalize_many, AnswerSheet, ArchetypeProfile, Assessment, EngineConfig,
    MatchQuery, Matchmaker, SqliteAssessmentStore, UserProfile,
};

#[derive(Parser)]
#[command(name = "inyeon", version, about = "Inyeon matching core CLI")]
struct Cli {
    /// Engine config JSON (defaults plus INYEON_* env overrides when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with questions.json / compatibility.json / insights.json
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the active question bank
    Questions {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Classify an answer sheet, optionally recording it for a user
    Classify {
        /// JSON: `[0, 2, ...]` or `{"answers": [0, 2, null, ...]}`
        #[arg(long)]
        answers: PathBuf,
        #[arg(long, requires = "store")]
        user: Option<String>,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Compatibility report for two profiles
    Compat {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Full insight bundle for two profiles
    Insights {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rank a candidate pool for one user in it
    Matches {
        #[arg(long)]
        pool: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum)]
        gender: Option<CliGender>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the assessment store to JSONL
    StoreExport {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Delete assessments older than the given age
    StorePrune {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        max_age_days: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliGender {
    Male,
    Female,
}

impl From<CliGender> for Gender {
    fn from(value: CliGender) -> Self {
        match value {
            CliGender::Male => Gender::Male,
            CliGender::Female => Gender::Female,
        }
    }
}

/// Assessment plus the display copy of its archetype.
#[derive(Serialize)]
struct ClassifyOutput<'a> {
    #[serde(flatten)]
    assessment: &'a Assessment,
    profile: &'a ArchetypeProfile,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SheetInput {
    Bare(Vec<Option<usize>>),
    Wrapped(AnswerSheet),
}

impl From<SheetInput> for AnswerSheet {
    fn from(value: SheetInput) -> Self {
        match value {
            SheetInput::Bare(answers) => AnswerSheet::new(answers),
            SheetInput::Wrapped(sheet) => sheet,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inyeon_match=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    };
    if let Some(dir) = cli.content_dir {
        config.content_dir = Some(dir);
    }

    match cli.command {
        Commands::Questions { out } => {
            let engine = Matchmaker::from_config(&config)?;
            emit(out.as_deref(), engine.content().questions.as_ref())?;
        }
        Commands::Classify {
            answers,
            user,
            store,
            out,
        } => {
            let engine = Matchmaker::from_config(&config)?;
            let sheet: AnswerSheet = read_json::<SheetInput>(&answers)?.into();
            let assessment = match (user, store) {
                (Some(user), Some(db)) => {
                    let store = SqliteAssessmentStore::new(db)?;
                    engine.record_assessment(&store, &user, &sheet).await?
                }
                _ => engine.classify(&sheet)?,
            };
            let output = ClassifyOutput {
                assessment: &assessment,
                profile: engine.archetype_profile(assessment.archetype),
            };
            emit(out.as_deref(), &output)?;
        }
        Commands::Compat { a, b, out } => {
            let engine = Matchmaker::from_config(&config)?;
            let (a, b) = (read_profile(&a)?, read_profile(&b)?);
            emit(out.as_deref(), &engine.compatibility(&a, &b))?;
        }
        Commands::Insights { a, b, out } => {
            let engine = Matchmaker::from_config(&config)?;
            let (a, b) = (read_profile(&a)?, read_profile(&b)?);
            let bundle = engine.insights(&a, &b);
            emit(out.as_deref(), bundle.as_ref())?;
        }
        Commands::Matches {
            pool,
            user,
            limit,
            gender,
            city,
            out,
        } => {
            let engine = Matchmaker::from_config(&config)?;
            let pool = normalize_many(read_json(&pool)?)?;
            let query = MatchQuery {
                limit,
                gender: gender.map(Gender::from),
                city,
            };
            let candidates = engine.matches_for_user_id(&user, &pool, &query)?;
            emit(out.as_deref(), &candidates)?;
        }
        Commands::StoreExport { db, out } => {
            let store = SqliteAssessmentStore::new(db.unwrap_or(config.store_path))?;
            store.export_jsonl(out).await?;
        }
        Commands::StorePrune { db, max_age_days } => {
            let store = SqliteAssessmentStore::new(db.unwrap_or(config.store_path))?;
            let _lock = store.lock_exclusive()?;
            let stats = store.prune(max_age_days).await?;
            println!("pruned {} rows; {} rows remain", stats.deleted, stats.remaining);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn read_profile(path: &Path) -> Result<UserProfile, Box<dyn std::error::Error>> {
    Ok(normalize(read_json(path)?)?)
}

/// Pretty JSON to `out`, or stdout when no path is given.
fn emit<T: serde::Serialize + ?Sized>(
    out: Option<&Path>,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
