use anyhow::Result;
use clap::{Parser, Subcommand};
use microsmith_gen::GenConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "microsmith")]
#[command(version = "0.2.0")]
#[command(about = "Random program generator for compiler fuzzing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate programs and write them to disk
    Generate {
        /// First seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// How many programs (seeds seed..seed+count)
        #[arg(short, long, default_value = "1")]
        count: u64,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "microsmith-out")]
        out: PathBuf,

        /// Also emit an auxiliary package
        #[arg(long)]
        multi_pkg: bool,

        /// Enable generics
        #[arg(long)]
        type_params: bool,

        /// Also dump each program tree as JSON
        #[arg(long)]
        emit_ast: bool,
    },

    /// Print a single seed's program to stdout
    Print {
        /// Seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Also emit an auxiliary package
        #[arg(long)]
        multi_pkg: bool,

        /// Enable generics
        #[arg(long)]
        type_params: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            seed,
            count,
            out,
            multi_pkg,
            type_params,
            emit_ast,
        } => {
            std::fs::create_dir_all(&out)?;
            for s in seed..seed.saturating_add(count) {
                let conf = GenConfig {
                    seed: s,
                    multi_pkg,
                    type_params,
                };
                let program = microsmith_gen::generate(&conf);
                let dir = out.join(format!("prog_{}", s));
                microsmith_emit::write_program(&program, &dir)?;
                if emit_ast {
                    let json = serde_json::to_string_pretty(&program)?;
                    std::fs::write(dir.join("program.json"), json)?;
                }
                log::info!("seed {} -> {}", s, dir.display());
            }
            Ok(())
        }
        Commands::Print {
            seed,
            multi_pkg,
            type_params,
        } => {
            let conf = GenConfig {
                seed,
                multi_pkg,
                type_params,
            };
            let program = microsmith_gen::generate(&conf);
            for (path, contents) in microsmith_emit::render_program(&program) {
                println!("// {}", path);
                println!("{}", contents);
            }
            Ok(())
        }
    }
}
