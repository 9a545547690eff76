use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fauna_core::{
    render_gallery, synthesize, LandmarkIndexMap, MatchReport, Readiness, Registry, TraitSet,
};
use fauna_mesh::{load_image, FaceMeshDetector};
use std::path::{Path, PathBuf};

mod config;
mod engine;
mod landmarks_file;

use config::Config;

#[derive(Parser)]
#[command(name = "fauna", about = "Match a face to its closest animal archetype")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect a face in a photo and match it
    Analyze {
        /// Photo to analyze
        image: PathBuf,
        /// Write the matched illustration to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Fail instead of waiting if the model is still loading
        #[arg(long)]
        no_wait: bool,
    },
    /// Match landmarks produced by an external detector (JSON)
    Match {
        /// Landmark JSON file: one face or a list of faces
        landmarks: PathBuf,
        /// Write the matched illustration to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog archetypes
    List {
        #[arg(long)]
        json: bool,
    },
    /// Render one archetype illustration
    Render {
        /// Archetype key (e.g., "cat", "owl")
        key: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render every archetype into a directory
    Gallery {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let custom;
    let registry: &Registry = match &config.catalog_path {
        Some(path) => {
            tracing::warn!(path = %path.display(), "using non-default archetype catalog");
            custom = Registry::load(path)?;
            &custom
        }
        None => Registry::builtin(),
    };
    let map = LandmarkIndexMap::FACE_MESH_468;

    match cli.command {
        Commands::Analyze {
            image,
            svg,
            json,
            no_wait,
        } => {
            let photo = load_image(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;

            let model_path = config.mesh_model_path();
            let (threads, threshold) = (config.intra_threads, config.face_threshold);
            let handle = engine::spawn_engine(move || {
                FaceMeshDetector::load(&model_path, threads, threshold)
            })?;

            if !no_wait {
                if let Readiness::Failed(reason) = handle.wait_ready().await {
                    tracing::error!(%reason, "detector unavailable");
                }
            }

            let report = handle.analyze(photo, &map, registry).await?;
            present(&report, svg.as_deref(), json)?;
        }
        Commands::Match {
            landmarks,
            svg,
            json,
        } => {
            let faces = landmarks_file::read(&landmarks)
                .with_context(|| format!("failed to read {}", landmarks.display()))?;
            let report = fauna_core::analyze_faces(&faces, &map, registry)?;
            present(&report, svg.as_deref(), json)?;
        }
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.profiles())?);
            } else {
                for p in registry.profiles() {
                    let t = &p.traits;
                    println!("{:<10} {:<10} {}  {}", p.key, p.name, p.accent, describe_traits(t));
                }
            }
        }
        Commands::Render { key, out } => {
            let profile = registry
                .get(&key)
                .with_context(|| format!("unknown archetype: {key}"))?;
            let svg = synthesize(&profile.traits, &profile.accent);
            match out {
                Some(path) => write_file(&path, svg.as_str())?,
                None => print!("{svg}"),
            }
        }
        Commands::Gallery { out } => {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            for (profile, svg) in render_gallery(registry) {
                write_file(&out.join(format!("animal-{}.svg", profile.key)), svg.as_str())?;
            }
            tracing::info!(dir = %out.display(), count = registry.len(), "gallery written");
        }
    }

    Ok(())
}

fn present(report: &MatchReport, svg: Option<&Path>, json: bool) -> Result<()> {
    if let Some(path) = svg {
        write_file(path, report.illustration.as_str())?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{} — {}%", report.name, report.percent);
    println!("{}", report.description);
    for entry in report.ranking.iter().skip(1).take(2) {
        println!("  also: {} ({}%)", entry.name, entry.percent);
    }
    Ok(())
}

/// One-line `name=value` rendering of every trait.
fn describe_traits(t: &TraitSet) -> String {
    format!(
        "ear={} marking={} snout={} eye={} nose={} mouth={} cheek={} brow={} whiskers={}",
        t.ear, t.marking, t.snout, t.eye, t.nose, t.mouth, t.cheek, t.brow, t.whiskers
    )
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "illustration written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_traits_lists_every_trait() {
        let owl = Registry::builtin().get("owl").unwrap();
        let line = describe_traits(&owl.traits);
        assert_eq!(
            line,
            "ear=owl marking=mask snout=short eye=round nose=triangle mouth=straight cheek=none brow=soft whiskers=false"
        );
    }
}
