mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_INPUT_ERROR};
use pkglock_core::{LockValidator, OutdatedOptions, Settings};
use pkglock_schema::LOCK_FILE_NAME;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pkglock",
    version,
    about = "Deterministic package lock files and lock staleness checks"
)]
struct Cli {
    /// Settings file (default: ./pkglock.toml, then ~/.config/pkglock/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check whether a lock file still matches the declared dependencies.
    Verify {
        /// Dependency graph JSON describing the projects.
        dgspec: PathBuf,
        /// Project to validate (unique name); defaults to the first restore entry.
        #[arg(long)]
        project: Option<String>,
        /// Lock file to check; defaults to the project's lock file location.
        #[arg(long)]
        lock: Option<PathBuf>,
    },
    /// Print the targets and packages of a lock file.
    Show {
        #[arg(default_value = LOCK_FILE_NAME)]
        lock: PathBuf,
    },
    /// Rewrite a lock file in canonical form.
    Fmt {
        #[arg(default_value = LOCK_FILE_NAME)]
        lock: PathBuf,
        /// Exit non-zero instead of writing when the file is not canonical.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// List locked packages with newer versions in a version index.
    Outdated {
        #[arg(default_value = LOCK_FILE_NAME)]
        lock: PathBuf,
        /// Version index JSON: { "<id>": [{ "version": "1.2.3", "listed": true }] }.
        #[arg(long)]
        index: PathBuf,
        /// Consider prerelease versions.
        #[arg(long, default_value_t = false)]
        prerelease: bool,
        /// Only consider versions with the same major and minor version.
        #[arg(long, default_value_t = false)]
        patch: bool,
        /// Include transitive packages.
        #[arg(long, default_value_t = false)]
        transitive: bool,
        /// Exit non-zero when outdated packages are found.
        #[arg(long, default_value_t = false)]
        fail_on_outdated: bool,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PKGLOCK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::discover_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
    };
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Verify {
            dgspec,
            project,
            lock,
        } => commands::verify::run(
            &LockValidator::new(settings.comparer()),
            &dgspec,
            project.as_deref(),
            lock.as_deref(),
            json_output,
        ),
        Commands::Show { lock } => commands::show::run(&lock, json_output),
        Commands::Fmt { lock, check } => commands::fmt::run(&lock, check, json_output),
        Commands::Outdated {
            lock,
            index,
            prerelease,
            patch,
            transitive,
            fail_on_outdated,
        } => {
            let configured = OutdatedOptions::from(settings.outdated);
            let options = OutdatedOptions {
                prerelease: prerelease || configured.prerelease,
                patch: patch || configured.patch,
                transitive: transitive || configured.transitive,
            };
            commands::outdated::run(&lock, &index, options, fail_on_outdated, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("dependency graph error:")
                || msg.starts_with("configuration error:")
            {
                EXIT_INPUT_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
