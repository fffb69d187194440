use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use fractal_gen_lib::config;
use fractal_gen_lib::error::Result;
use fractal_gen_lib::generator::{sierpinski, TreeGenerator, SPHERE_Z_OFFSET};
use fractal_gen_lib::session::Session;
use shared::{ExportFormat, GenerationParams, SceneVariant};

/// Recursive fractal geometry generator and glTF exporter
#[derive(Parser, Debug)]
#[command(name = "fractal-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene config JSON (default: per-user config file, else built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the scene and export it as scene.gltf
    Export {
        #[arg(long, value_enum)]
        variant: Option<Variant>,
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Print the data URI instead of writing a file
        #[arg(long)]
        data_uri: bool,
    },
    /// Print raw generator output as JSON
    Generate {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(long, default_value_t = 20.0)]
        size: f64,
        #[arg(long, default_value_t = 3)]
        iterations: u32,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z: f64,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Variant {
    ResultTree,
    PythagorasTree,
    Sierpinski,
}

impl From<Variant> for SceneVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::ResultTree => SceneVariant::ResultTree,
            Variant::PythagorasTree => SceneVariant::PythagorasTree,
            Variant::Sierpinski => SceneVariant::Sierpinski,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Glb,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Glb => ExportFormat::Binary,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Branches,
    Paths,
    Spheres,
    Sierpinski,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fractal_gen=info,fractal_gen_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            variant,
            format,
            out,
            data_uri,
        } => {
            let mut scene_config = config::load(cli.config.as_deref())?;
            if let Some(v) = variant {
                scene_config.variant = v.into();
            }
            if let Some(f) = format {
                scene_config.export_format = f.into();
            }

            let mut session = Session::new(scene_config);
            let download = session.export()?;
            if data_uri {
                println!("{}", download.data_uri);
            } else {
                let path = download.write_to(&out)?;
                println!("{}", path.display());
            }
        }
        Commands::Generate {
            kind,
            size,
            iterations,
            x,
            y,
            z,
        } => {
            let params = GenerationParams::new(size, iterations).at([x, y, z]);
            let json = match kind {
                Kind::Branches => to_json(&TreeGenerator::new(&params)?.branches())?,
                Kind::Paths => {
                    let segments: Vec<[[f64; 2]; 2]> = TreeGenerator::new(&params)?
                        .path_segments()
                        .iter()
                        .map(|l| [[l.p0.x, l.p0.y], [l.p1.x, l.p1.y]])
                        .collect();
                    to_json(&segments)?
                }
                Kind::Spheres => {
                    to_json(&TreeGenerator::new(&params)?.sphere_positions(SPHERE_Z_OFFSET))?
                }
                Kind::Sierpinski => {
                    params.validate()?;
                    to_json(&sierpinski(size, iterations, params.position))?
                }
            };
            println!("{json}");
        }
        Commands::Config => {
            let scene_config = config::load(cli.config.as_deref())?;
            println!("{}", to_json(&scene_config)?);
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| fractal_gen_lib::error::ExportError::Serialize(e).into())
}
