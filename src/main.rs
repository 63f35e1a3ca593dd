use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use guardin_mind::msg::InstallEvent;
use guardin_mind::plugin::manifest::MinderManifest;
use guardin_mind::plugin::resolver::{LocalResolver, SearchRoot};
use guardin_mind::plugin::version_gate::HostVersions;
use guardin_mind::plugin::{
    InstallOutcome, Mind, PluginInstaller, PluginUninstaller, UninstallOutcome,
};
use guardin_mind::{MindConfig, MinderIdent};

#[derive(Debug, Parser)]
#[command(name = "mind", version, about = "Guardin Mind minder manager")]
struct Cli {
    /// Log at debug level.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Install minders in the `author_MinderName` format.
    Install {
        #[arg(required = true)]
        minders: Vec<String>,
        /// Folder for installing minders.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Remove installed minders.
    Uninstall {
        #[arg(required = true)]
        minders: Vec<String>,
        #[arg(long)]
        path: Option<PathBuf>,
        /// Don't ask for confirmation.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// List installed minders.
    List {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "guardin_mind")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("guardin_mind"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "mind.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let default_filter = if cli.debug {
        "guardin_mind=debug"
    } else {
        "guardin_mind=info"
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("mind {} starting", Mind::version());

    let config = MindConfig::load()?;

    let failures = match cli.command {
        Command::Install { minders, path } => install(&config, &minders, path.as_deref())?,
        Command::Uninstall { minders, path, yes } => {
            uninstall(&config, &minders, path.as_deref(), yes)?
        }
        Command::List { path } => list(&config, path.as_deref())?,
    };

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn install(config: &MindConfig, minders: &[String], path: Option<&Path>) -> Result<usize> {
    let installer = PluginInstaller::from_config(config, path)?;
    let mut failures = 0;

    for minder in minders {
        match installer.install(minder, &mut print_event) {
            Ok(InstallOutcome::Installed | InstallOutcome::AlreadySatisfied) => {}
            Err(err) => {
                failures += 1;
                tracing::error!("install {minder} failed: {err}");
                println!("{}", format!("    ERROR: {err}").red());
            }
        }
    }

    Ok(failures)
}

fn print_event(event: InstallEvent) {
    match event {
        InstallEvent::Collecting(ident) => println!("Collecting {ident}"),
        InstallEvent::Downloading { ident, url } => {
            println!("    Downloading {ident} from {url}");
        }
        InstallEvent::AlreadySatisfied { ident, root } => {
            let line = format!("Requirement already satisfied: {ident} in {}", root.display());
            println!("{}", line.green());
        }
        InstallEvent::LibrarySatisfied(library) => {
            println!("{}", format!("Requirement already satisfied: {library}").green());
        }
        InstallEvent::InstallingLibrary(library) => {
            println!("{}", format!("    Installing library {library}").cyan());
        }
        InstallEvent::Installed(ident) => {
            println!("{}", format!("Successfully installed {ident}").green());
        }
    }
}

fn uninstall(
    config: &MindConfig,
    minders: &[String],
    path: Option<&Path>,
    yes: bool,
) -> Result<usize> {
    let uninstaller = PluginUninstaller::new(config.install_root(path)?);
    let mut failures = 0;

    for minder in minders {
        match uninstaller.uninstall(minder, yes, &mut confirm) {
            Ok(UninstallOutcome::Removed) => {
                println!("{}", format!("Successfully uninstalled {minder}").green());
            }
            Ok(UninstallOutcome::NotInstalled) => {
                println!("{}", format!("WARNING: Skipping {minder} as it is not installed.").yellow());
            }
            Ok(UninstallOutcome::Declined) => {}
            Err(err) => {
                failures += 1;
                tracing::error!("uninstall {minder} failed: {err}");
                println!("{}", format!("    ERROR: {err}").red());
            }
        }
    }

    Ok(failures)
}

fn confirm(ident: &MinderIdent, dir: &Path) -> bool {
    println!("Found existing installation: {ident}");
    println!("Would remove:");
    println!("    {}", dir.display());
    print!("Proceed (Y/n)? ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

fn list(config: &MindConfig, path: Option<&Path>) -> Result<usize> {
    let root = config.install_root(path)?;
    let resolver = LocalResolver::new(
        SearchRoot::InstallRoot(root.clone()),
        HostVersions::default(),
        config.runtime.wasi,
    );

    let names = resolver.installed()?;
    if names.is_empty() {
        println!("no minders installed in {}", root.display());
        return Ok(0);
    }

    for name in names {
        match MinderManifest::read(&root.join(&name)) {
            Ok(manifest) => println!("{} {}", format!("{name:<24}").bold(), manifest.version),
            Err(err) => println!("{} {}", format!("{name:<24}").bold(), format!("({err})").red()),
        }
    }

    Ok(0)
}
