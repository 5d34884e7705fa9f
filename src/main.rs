use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "themepack", version, about = "Convert theme XML packages to and from theme directories")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Materialize a theme XML package into a directory tree
    Decode {
        /// Theme package XML file
        input: PathBuf,
        /// Directory to materialize into
        out_dir: PathBuf,
    },
    /// Assemble a theme directory tree back into a theme XML package
    Encode {
        /// Theme directory, or a directory of theme directories
        dir: PathBuf,
        /// Write the package here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Decode { input, out_dir } => {
            themepack::decode_file(&input, &out_dir)?;
        }
        Command::Encode { dir, output } => {
            let xml = themepack::encode_dir(&dir)?;
            if let Some(path) = output {
                let mut file = File::create(path)?;
                file.write_all(xml.as_bytes())?;
            } else {
                println!("{xml}");
            }
        }
    }

    Ok(())
}
