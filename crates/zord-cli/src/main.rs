use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use zord_core::{decoder, tracker, FacePipeline, IdentityGallery, SignatureExtractor};

#[derive(Parser)]
#[command(name = "zord", about = "Zord vision diagnostics")]
struct Cli {
    /// Directory holding det_10g.onnx and w600k_r50.onnx
    #[arg(long, env = "ZORD_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the names loaded from the known-faces directory
    Gallery {
        #[arg(long, env = "ZORD_KNOWN_FACES_DIR", default_value = "known_faces")]
        dir: PathBuf,
    },
    /// Print the normalized face position in a still image
    Track {
        image: PathBuf,
    },
    /// Match the primary face in a still image against the gallery
    Identify {
        image: PathBuf,
        #[arg(long, env = "ZORD_KNOWN_FACES_DIR", default_value = "known_faces")]
        dir: PathBuf,
        /// Maximum Euclidean distance for a match
        #[arg(long, default_value_t = zord_core::gallery::DEFAULT_MATCH_THRESHOLD)]
        threshold: f32,
    },
}

fn load_pipeline(model_dir: Option<PathBuf>) -> Result<FacePipeline> {
    let dir = model_dir.unwrap_or_else(zord_core::default_model_dir);
    let scrfd = dir.join(zord_core::SCRFD_MODEL_FILE);
    let arcface = dir.join(zord_core::ARCFACE_MODEL_FILE);
    FacePipeline::load(&scrfd.to_string_lossy(), &arcface.to_string_lossy())
        .with_context(|| format!("loading models from {}", dir.display()))
}

fn read_image(path: &Path) -> Result<image::RgbImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decoder::decode_raster(&bytes).with_context(|| format!("decoding {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut pipeline = load_pipeline(cli.model_dir)?;

    match cli.command {
        Commands::Gallery { dir } => {
            let gallery = IdentityGallery::load(&dir, &mut pipeline)?;
            if gallery.is_empty() {
                println!("No known faces in {}", dir.display());
            }
            for signature in gallery.signatures() {
                println!("{}", signature.name);
            }
        }
        Commands::Track { image } => {
            let raster = read_image(&image)?;
            let output = match tracker::track(&mut pipeline, &raster) {
                Some(point) => json!({ "x": point.x, "y": point.y, "detected": true }),
                None => json!({ "detected": false }),
            };
            println!("{output}");
        }
        Commands::Identify { image, dir, threshold } => {
            let gallery = IdentityGallery::load(&dir, &mut pipeline)?.with_threshold(threshold);
            let raster = read_image(&image)?;
            let Some(embedding) = pipeline.extract_signature(&raster)? else {
                println!("{}", json!({ "face": false }));
                return Ok(());
            };
            let result = gallery.compare(&embedding);
            let distance = result.distance.is_finite().then_some(result.distance);
            println!(
                "{}",
                json!({
                    "face": true,
                    "matched": result.matched,
                    "name": result.name,
                    "distance": distance,
                })
            );
        }
    }

    Ok(())
}
