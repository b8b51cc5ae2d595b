#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hookup")]
#[command(author, version, about = "Inspect module specifier rewriting and loading", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a specifier through the installed hooks
    Resolve {
        /// The specifier to resolve (e.g. "./pages", "#db", "./a?x=1")
        specifier: String,

        #[command(flatten)]
        hooks: HookArgs,

        /// Resolve as a require() call
        #[arg(long)]
        require: bool,
    },

    /// Resolve a specifier, then load it with an import attribute type
    Load {
        /// The specifier to load
        specifier: String,

        /// Import attribute type (e.g. "text", "buffer")
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        #[command(flatten)]
        hooks: HookArgs,
    },
}

/// Hook configuration shared by `resolve` and `load`.
#[derive(clap::Args, Debug, Clone, Default)]
struct HookArgs {
    /// Importing module (defaults to the working directory)
    #[arg(long, value_name = "PATH")]
    parent: Option<PathBuf>,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Infer `/index` for directories
    #[arg(long)]
    directories: bool,

    /// Infer the standard extensions (.js, .mjs, .cjs)
    #[arg(long)]
    extensions: bool,

    /// Infer these extensions, in order (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    ext: Vec<String>,

    /// Strip and re-append `?query` suffixes
    #[arg(long)]
    handle_search: bool,

    /// Rewrite through the nearest package.json `imports` field
    #[arg(long)]
    manifest_imports: bool,

    /// Explicit import map entry (repeatable)
    #[arg(long = "import", value_name = "PATTERN=TARGET")]
    imports: Vec<String>,
}

impl HookArgs {
    fn into_options(self) -> commands::HookOptions {
        commands::HookOptions {
            parent: self.parent,
            config: self.config,
            directories: self.directories,
            extensions: self.extensions,
            ext: self.ext,
            handle_search: self.handle_search,
            manifest_imports: self.manifest_imports,
            imports: self.imports,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Resolve {
            specifier,
            hooks,
            require,
        }) => {
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %cwd.display());
            let _guard = span.enter();
            commands::resolve::run(&cwd, &specifier, hooks.into_options(), require, cli.json)
        }
        Some(Commands::Load {
            specifier,
            kind,
            hooks,
        }) => {
            let span = tracing::info_span!("load", cmd = "load", cwd = %cwd.display());
            let _guard = span.enter();
            commands::load::run(
                &cwd,
                &specifier,
                kind.as_deref(),
                hooks.into_options(),
                cli.json,
            )
        }
    }
}
