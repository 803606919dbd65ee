//! Schematic Architect CLI
//!
//! Build export jobs into schematic files, or serve jobs as a socket worker.

use clap::{Parser, Subcommand, ValueEnum};
use schematic_architect::transport::{ExportWorker, DEFAULT_IDENTITY};
use schematic_architect::{
    load_resource_pack, BlockBounds, BlockPosition, BlockRegistry, ContainmentMode, ExportConfig,
    ExportContext, Exporter, OpenRegistry, SchematicKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "schematic-architect")]
#[command(author, version, about = "Rasterize procedural geometry into Minecraft schematics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a JSON export job into a schematic file
    Export {
        /// Input JSON file: {"seed", "result", "materials"}
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (extension added when missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Resource pack to check block ids against (ZIP or directory)
        #[arg(short, long)]
        resource_pack: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "schem")]
        format: OutputFormat,

        /// Store used while building
        #[arg(long, value_enum, default_value = "palette")]
        store: StoreKind,

        /// Region of the dense store: x,y,z,width,height,length
        #[arg(long, value_parser = parse_region, allow_hyphen_values = true)]
        region: Option<BlockBounds>,

        /// Use ray-crossing parity instead of any-hit for solids
        #[arg(long)]
        parity: bool,

        /// Override the job's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Samples per Bezier curve
        #[arg(long)]
        bezier_precision: Option<usize>,

        /// Abort the build after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Connect to a job server and answer export jobs
    Worker {
        /// Port of the job server
        #[arg(short, long)]
        port: u16,

        /// Host of the job server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Identity sent in the handshake
        #[arg(long, default_value_t = DEFAULT_IDENTITY)]
        identity: u8,

        /// Resource pack to check block ids against (ZIP or directory)
        #[arg(short, long)]
        resource_pack: Option<PathBuf>,

        /// Seed every job with this value
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show information about a resource pack
    Info {
        /// Path to resource pack (ZIP or directory)
        #[arg(short, long)]
        resource_pack: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Sponge schematic v2
    Schem,
    /// Structure NBT
    Nbt,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Nested,
    Palette,
    /// Needs --region
    Dense,
}

fn parse_region(s: &str) -> Result<BlockBounds, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<i32>().map_err(|e| format!("'{}': {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    let [x, y, z, width, height, length] = values[..] else {
        return Err(format!("expected x,y,z,width,height,length, got {} values", values.len()));
    };
    if width < 0 || height < 0 || length < 0 {
        return Err("region size must not be negative".to_string());
    }
    Ok(BlockBounds::new(BlockPosition::new(x, y, z), [width, height, length]))
}

fn schematic_kind(store: StoreKind, region: Option<BlockBounds>) -> Result<SchematicKind, String> {
    match (store, region) {
        (StoreKind::Nested, _) => Ok(SchematicKind::Nested),
        (StoreKind::Palette, _) => Ok(SchematicKind::Palette),
        (StoreKind::Dense, Some(region)) => Ok(SchematicKind::Dense(region)),
        (StoreKind::Dense, None) => Err("--store dense needs --region".to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            resource_pack,
            format,
            store,
            region,
            parity,
            seed,
            bezier_precision,
            timeout_ms,
        } => {
            let mut config =
                ExportConfig::from_env().with_schematic_kind(schematic_kind(store, region)?);
            if parity {
                config = config.with_containment(ContainmentMode::Parity);
            }
            if let Some(precision) = bezier_precision {
                config = config.with_bezier_precision(precision);
            }
            if let Some(ms) = timeout_ms {
                config = config.with_timeout(Duration::from_millis(ms));
            }
            let ctx = ExportContext::new(registry(resource_pack.as_deref())?).with_config(config);
            export_job(&input, &output, format, seed, &ctx)?;
        }
        Commands::Worker {
            port,
            host,
            identity,
            resource_pack,
            seed,
        } => {
            let ctx = ExportContext::new(registry(resource_pack.as_deref())?)
                .with_config(ExportConfig::from_env());
            let mut worker = ExportWorker::new(ctx);
            if let Some(seed) = seed {
                worker = worker.with_seed(seed);
            }
            run_worker(worker, &host, port, identity)?;
        }
        Commands::Info { resource_pack } => {
            show_pack_info(&resource_pack)?;
        }
    }

    Ok(())
}

fn registry(path: Option<&Path>) -> Result<Arc<dyn BlockRegistry>, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => {
            println!("Loading resource pack from {:?}...", path);
            let pack = load_resource_pack(path)?;
            println!("  Found {} blockstates", pack.blockstate_count());
            Arc::new(pack)
        }
        None => Arc::new(OpenRegistry),
    })
}

fn export_job(
    input_path: &Path,
    output_path: &Path,
    format: OutputFormat,
    seed: Option<u64>,
    ctx: &ExportContext,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading export job from {:?}...", input_path);
    let mut exporter = Exporter::from_json(&fs::read_to_string(input_path)?)?;
    if let Some(seed) = seed {
        exporter = exporter.with_seed(seed);
    }
    println!("  Loaded {} nodes, {} materials", exporter.result.node_count(), exporter.materials.len());

    let (data, extension) = match format {
        OutputFormat::Schem => (exporter.to_schem(ctx)?, "schem"),
        OutputFormat::Nbt => (exporter.to_nbt(ctx)?, "nbt"),
    };
    let path = if output_path.extension().is_some() {
        output_path.to_path_buf()
    } else {
        output_path.with_extension(extension)
    };
    fs::write(&path, &data)?;
    println!("Exported {} ({} bytes) to {:?}", extension, data.len(), path);

    Ok(())
}

fn run_worker(
    worker: ExportWorker,
    host: &str,
    port: u16,
    identity: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let client = worker.connect((host, port), identity).await?;
        println!("Worker connected to {}, press Ctrl+C to stop", client.peer_addr());
        tokio::signal::ctrl_c().await?;
        client.close();
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn show_pack_info(resource_pack_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading resource pack from {:?}...", resource_pack_path);
    let pack = load_resource_pack(resource_pack_path)?;

    println!("\nResource Pack Info:");
    println!("  Namespaces: {}", pack.namespaces().join(", "));
    println!("  Blockstates: {}", pack.blockstate_count());
    let states: usize = pack.all_blocks().iter().map(|b| b.states.len()).sum();
    println!("  Block states: {}", states);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let region = parse_region("-4, 0,2,8,16,8").unwrap();
        assert_eq!(region.origin, BlockPosition::new(-4, 0, 2));
        assert_eq!(region.size, [8, 16, 8]);
        assert!(parse_region("0,0,0,1,1").is_err());
        assert!(parse_region("0,0,0,1,1,x").is_err());
        assert!(parse_region("0,0,0,1,-1,1").is_err());
    }

    #[test]
    fn test_dense_store_needs_region() {
        let region = parse_region("0,0,0,4,4,4").unwrap();
        assert_eq!(
            schematic_kind(StoreKind::Dense, Some(region)),
            Ok(SchematicKind::Dense(region))
        );
        assert!(schematic_kind(StoreKind::Dense, None).is_err());
        assert_eq!(schematic_kind(StoreKind::Nested, Some(region)), Ok(SchematicKind::Nested));
    }

    #[test]
    fn test_cli_accepts_dense_export() {
        let cli = Cli::try_parse_from([
            "schematic-architect",
            "export",
            "-i",
            "job.json",
            "-o",
            "out",
            "--store",
            "dense",
            "--region",
            "-8,0,-8,16,32,16",
        ])
        .unwrap();
        let Commands::Export { store, region, .. } = cli.command else {
            panic!("expected export");
        };
        assert!(matches!(store, StoreKind::Dense));
        assert_eq!(region.unwrap().origin, BlockPosition::new(-8, 0, -8));
    }
}
