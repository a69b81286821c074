use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

mod artwork;
mod config;
mod shell;
mod state;

use config::StoreConfig;
use shell::{Control, GalleryShell, Message};
use state::store::ArtworkStore;

fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with the gallery on stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Open the store, run the command loop, and release the store on the way out.
///
/// The store is owned by the shell; every early return drops it, which
/// closes the connection.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::load()?;
    let store = ArtworkStore::open(&config)?;
    store.initialize()?;

    let mut shell = GalleryShell::new(store);
    info!(
        "🎨 Art gallery ready with {} artworks ({})",
        shell.gallery().len(),
        shell.store().path().display()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", shell.view())?;
    prompt(&mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            prompt(&mut stdout)?;
            continue;
        }

        match Message::parse(&line) {
            Ok(message) => {
                if shell.update(message) == Control::Quit {
                    break;
                }
                writeln!(stdout, "{}", shell.view())?;
            }
            Err(e) => writeln!(stdout, "{}", e)?,
        }
        prompt(&mut stdout)?;
    }

    shell.shutdown()?;
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    write!(stdout, "gallery> ")?;
    stdout.flush()
}
