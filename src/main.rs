use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use blockfs::{FileSystem, FsConfig, Shell, BLOCK_SIZE, MAX_NAME_LEN, NUM_BLOCKS};
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "blockfs",
    version = "0.1.0",
    about = "An in-memory virtual file system shell"
)]
struct Cli {
    /// Number of blocks on the simulated disk
    #[clap(long, default_value_t = NUM_BLOCKS)]
    blocks: usize,
    /// Size of each block in bytes
    #[clap(long, default_value_t = BLOCK_SIZE)]
    block_size: usize,
    /// Longest allowed file or directory name
    #[clap(long, default_value_t = MAX_NAME_LEN)]
    max_name_len: usize,
    /// Read commands from this file instead of stdin
    #[clap(long, short)]
    script: Option<PathBuf>,
    /// Skip the startup and shutdown messages
    #[clap(long, short)]
    quiet: bool,
}

fn run_shell<R: BufRead>(fs: FileSystem, input: R, quiet: bool) -> blockfs::Result<()> {
    let stdout = io::stdout();
    let mut shell = Shell::new(fs, input, stdout.lock());
    if !quiet {
        shell.greet()?;
    }
    shell.run()?;
    if quiet {
        shell.into_parts().0.shutdown();
        Ok(())
    } else {
        shell.farewell()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = FsConfig {
        total_blocks: cli.blocks,
        block_size: cli.block_size,
        max_name_len: cli.max_name_len,
    };
    let fs = match FileSystem::new(config) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("Error initializing filesystem: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &cli.script {
        Some(path) => match File::open(path) {
            Ok(file) => run_shell(fs, BufReader::new(file), cli.quiet),
            Err(e) => {
                eprintln!("Failed to open script '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => run_shell(fs, io::stdin().lock(), cli.quiet),
    };
    if let Err(e) = result {
        eprintln!("Shell error: {}", e);
        std::process::exit(1);
    }
}
