//! MIDlet CLI - command-line front end for the MIDlet application library.
//!
//! Scans the emulator storage root, lists and uninstalls applications and
//! manages their desktop shortcuts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use midlet_library::platform::default_storage_root;
use midlet_library::{load_manifest, DesktopShortcutPlatform, MidletLibrary};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "midlet-cli")]
#[command(about = "Manage installed MIDlet applications")]
struct Args {
    /// Emulator storage root (defaults to the platform data directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Program that desktop shortcuts launch
    #[arg(long, default_value = "midlet-loader")]
    launcher: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile stored records with the apps directory
    Scan,
    /// List installed applications
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Uninstall an application
    Delete { id: String },
    /// Pin a desktop shortcut for an application
    Pin { id: String },
    /// Add an application to the recent shortcuts
    Recent { id: String },
    /// Print a parsed manifest file
    Manifest { file: PathBuf },
}

fn init_logging(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact();

    if std::env::var_os("RUST_LOG").is_some() {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // Manifest inspection needs no library
    if let Command::Manifest { file } = &args.command {
        for (key, value) in load_manifest(file).iter() {
            println!("{}: {}", key, value);
        }
        return Ok(());
    }

    let root = match args.root {
        Some(root) => root,
        None => default_storage_root()?,
    };
    debug!("Storage root: {}", root.display());

    let platform = Arc::new(DesktopShortcutPlatform::for_current_user(args.launcher)?);
    let library = MidletLibrary::open(&root, platform)
        .with_context(|| format!("Failed to open library at {}", root.display()))?;

    match args.command {
        Command::Scan => {
            let report = library.refresh()?;
            for name in &report.inserted {
                println!("added    {}", name);
            }
            for name in &report.deleted {
                println!("removed  {}", name);
            }
            for name in &report.purged {
                println!("purged   {}", name);
            }
            if report.is_noop() {
                println!("up to date");
            }
        }
        Command::List { json } => {
            let apps = library.apps()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else {
                for app in &apps {
                    println!(
                        "{}\t{}\t{}\t{}",
                        app.path(),
                        app.title(),
                        app.author(),
                        app.version()
                    );
                }
            }
        }
        Command::Delete { id } => {
            library.delete_app(&id)?;
            println!("deleted {}", id);
        }
        Command::Pin { id } => {
            library.add_shortcut(&id)?;
            println!("pinned {}", id);
        }
        Command::Recent { id } => library.push_to_recent(&id)?,
        Command::Manifest { .. } => {}
    }

    Ok(())
}
