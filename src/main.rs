use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dungeon_jazz::export::DEFAULT_EXPORT_FILE;
use dungeon_jazz::project::DEFAULT_PROJECT_FILE;
use dungeon_jazz::{
    duration_for_measures, write_wav, CompositionEngine, PitchClass, Player, Project, SynthError, CHORD_TYPES,
};

#[derive(Parser)]
#[command(name = "dungeon-jazz")]
#[command(about = "Procedural chord-sequence music generator", long_about = None)]
struct Cli {
    /// Seed for drum fills and noise (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a project and write it to a WAV file
    Render {
        /// Project file (JSON)
        #[arg(default_value = DEFAULT_PROJECT_FILE)]
        project: PathBuf,

        /// Output WAV file path
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
    /// Compose a project and play it on the default output device
    Play {
        #[arg(default_value = DEFAULT_PROJECT_FILE)]
        project: PathBuf,
    },
    /// Play a single entry (its chord plus its drums, no effects)
    Preview {
        #[arg(default_value = DEFAULT_PROJECT_FILE)]
        project: PathBuf,

        /// Index of the entry to audition
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
    /// Write a starter project
    Init {
        #[arg(default_value = DEFAULT_PROJECT_FILE)]
        path: PathBuf,
    },
    /// List pitch classes and chord types
    Tables,
    /// Seconds needed for a whole number of measures
    Measures {
        #[arg(short, long, default_value = "120")]
        bpm: u32,

        #[arg(short, long, default_value = "4/4")]
        time_signature: String,

        #[arg(short, long)]
        measures: u32,
    },
}

fn engine(seed: Option<u64>) -> CompositionEngine {
    match seed {
        Some(seed) => CompositionEngine::new().with_seed(seed),
        None => CompositionEngine::new(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dungeon_jazz=info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { project, output } => {
            let project = Project::load(&project)?;
            let music = engine(cli.seed).compose(&project.entries, &project.settings)?;
            write_wav(&music, &output)?;
            println!("Music generated and saved as '{}'", output.display());
        }
        Commands::Play { project } => {
            let project = Project::load(&project)?;
            let music = engine(cli.seed).compose(&project.entries, &project.settings)?;
            let mut player = Player::new()?;
            player.play(&music)?;
            player.wait();
        }
        Commands::Preview { project, index } => {
            let project = Project::load(&project)?;
            let entry = project.entries.get(index).ok_or_else(|| {
                SynthError::ValidationError(format!("no entry {} (project has {})", index, project.entries.len()))
            })?;
            info!("previewing {}", entry.label());
            let section = engine(cli.seed).preview_entry(entry).map_err(|e| match e {
                SynthError::InvalidEntry { reason, .. } => SynthError::InvalidEntry { index, reason },
                other => other,
            })?;
            let mut player = Player::new()?;
            player.play(&section)?;
            player.wait();
        }
        Commands::Init { path } => {
            Project::example().save(&path)?;
            println!("Wrote starter project to '{}'", path.display());
        }
        Commands::Tables => {
            println!("Pitch classes (octave 4):");
            for pitch in PitchClass::ALL {
                println!("  {:<3} {:>7.2} Hz", pitch.name(), pitch.base_frequency());
            }
            println!("Chord types:");
            for chord_type in CHORD_TYPES {
                println!("  {:<20} {:?}", chord_type.name, chord_type.intervals);
            }
        }
        Commands::Measures { bpm, time_signature, measures } => {
            let seconds = duration_for_measures(bpm, &time_signature, measures)?;
            println!("{}", seconds);
        }
    }

    Ok(())
}
