use clap::{Parser, Subcommand};
use std::path::PathBuf;

use carchive::Archive;

#[derive(Parser)]
#[command(name = "carchive", about = "Inspect CAR container archives")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive contents
    List {
        input: PathBuf,
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show archive metadata
    Info {
        input: PathBuf,
    },
    /// Check stored checksums against decompressed contents
    Verify {
        input: PathBuf,
        /// Only verify the named file
        #[arg(short, long)]
        file: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    match Cli::parse().command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            let ar = Archive::open(&input)?;
            let infos = ar.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                println!("{:<10} {:>10} {:<17}  Name", "Mode", "Size", "Modified");
                for info in infos {
                    println!(
                        "{:<10} {:>10} {:<17}  {}",
                        info.mode, info.size, info.modified, info.name
                    );
                }
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let ar = Archive::open(&input)?;
            let regular = ar.entries().filter(|e| e.is_regular()).count();
            let total: u64 = ar.entries().map(|e| u64::from(e.size())).sum();
            println!("── CAR archive ──────────────────────────────────────────");
            println!("  Path     {}", input.display());
            println!("  Version  {}", ar.version());
            println!("  Records  {}", ar.records().len());
            println!("  Files    {}", regular);
            println!("  Bytes    {}", total);
        }

        // ── Verify ───────────────────────────────────────────────────────────
        Commands::Verify { input, file } => {
            let ar = Archive::open(&input)?;
            let names: Vec<String> = match file {
                Some(name) => vec![name],
                None => ar.files_by_name().keys().map(|n| n.to_string()).collect(),
            };
            let mut failed = 0usize;
            for name in &names {
                match ar.verify(name) {
                    Ok(true) => println!("  ok      {name}"),
                    Ok(false) => {
                        failed += 1;
                        println!("  BAD     {name}");
                    }
                    Err(e) => {
                        failed += 1;
                        println!("  error   {name}: {e}");
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} file(s) failed verification").into());
            }
        }
    }

    Ok(())
}
