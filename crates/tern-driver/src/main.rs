use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use tern_driver::{Config, Failure, ModMode, OutputFormat};

static TRACING_INIT: Once = Once::new();

#[derive(Parser)]
#[command(
    name = "tern-compiles",
    version,
    about = "Check that Tern packages and their tests compile",
    long_about = "Type checks each target package, its test variants and its full\ndependency graph, and prints every problem found as path:line:col: message.\nPrints nothing and exits 0 when everything compiles."
)]
struct Cli {
    /// Package directories (./dir) or import paths
    #[arg(required = true)]
    targets: Vec<String>,

    /// Run as if started in DIR
    #[arg(short = 'C', value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Whether to use vendored dependencies
    #[arg(long = "mod", value_enum, default_value = "auto", env = "TERN_MOD")]
    mod_mode: ModArg,

    /// Do not check test variants of the targets
    #[arg(long)]
    no_tests: bool,

    /// Module cache directory
    #[arg(long, value_name = "DIR", env = "TERN_MODCACHE")]
    modcache: Option<PathBuf>,

    /// Legacy search paths, each holding a src/ tree
    #[arg(long = "path", value_name = "DIRS", env = "TERNPATH", value_delimiter = ':')]
    search_paths: Vec<PathBuf>,

    /// Checking threads (0 = one per core, 1 = sequential)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    /// Diagnostic format
    #[arg(long, value_enum, default_value = "plain")]
    format: FormatArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModArg {
    /// Vendor mode iff the module root has a vendor directory
    Auto,
    Vendor,
    Mod,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Plain,
    /// Include source excerpts
    Pretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let working_dir = match working_dir(cli.dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error determining working directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = Config::new(working_dir)
        .with_mod_mode(match cli.mod_mode {
            ModArg::Auto => ModMode::Auto,
            ModArg::Vendor => ModMode::Vendor,
            ModArg::Mod => ModMode::Mod,
        })
        .with_tests(!cli.no_tests)
        .with_search_paths(cli.search_paths.into_iter().filter(|p| !p.as_os_str().is_empty()).collect())
        .with_jobs(cli.jobs)
        .with_format(match cli.format {
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Pretty => OutputFormat::Pretty,
        });
    let config = match cli.modcache {
        Some(cache) => config.with_module_cache(cache),
        None => config,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match tern_driver::run(&cli.targets, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Output(e)) => {
            eprintln!("Error writing diagnostics: {}", e);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// `-C` made absolute against the process working directory.
fn working_dir(dir: Option<PathBuf>) -> io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match dir {
        Some(dir) => tern_driver::resolver::absolutize(&cwd, &dir),
        None => tern_driver::resolver::clean_path(&cwd),
    })
}

/// Logs go to stderr, and only when `TERN_LOG` or `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match std::env::var("TERN_LOG") {
            Ok(directives) => EnvFilter::new(directives),
            Err(_) if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
            Err(_) => return,
        };
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true).with_level(true))
            .with(filter)
            .init();
    });
}
