//! Command-line interface for nxvalidate

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::io;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use nxvalidate::validators::{dump_base_class, inspect_base_class};
#[cfg(feature = "cli")]
use nxvalidate::{
    validate_application, Definitions, FileValidator, JsonTreeReader, Output, SchemaStore,
    Settings, Severity, TreeReader,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "nxvalidate")]
#[command(author, version, about = "Validate NeXus files against NXDL definitions", long_about = None)]
struct Cli {
    /// Instance file to validate (JSON tree dump)
    #[arg(short, long, value_name = "FILE")]
    filename: Option<PathBuf>,

    /// Path of the group to validate
    #[arg(short, long)]
    path: Option<String>,

    /// Validate against an application definition; without a name the
    /// entry's "definition" field is used
    #[arg(short, long, value_name = "NAME", num_args = 0..=1)]
    application: Option<Option<String>>,

    /// Base class to list instead of validating a file
    #[arg(short, long, value_name = "CLASS")]
    baseclass: Option<String>,

    /// Definitions directory (defaults to $NXVALIDATE_DEFINITIONS, then ./definitions)
    #[arg(short, long, value_name = "DIR")]
    definitions: Option<PathBuf>,

    /// Show info messages in addition to warnings and errors
    #[arg(short, long, conflicts_with_all = ["warning", "error"])]
    info: bool,

    /// Show warnings and errors (default)
    #[arg(short, long, conflicts_with = "error")]
    warning: bool,

    /// Show errors only
    #[arg(short, long)]
    error: bool,

    /// Print the base class model as JSON
    #[arg(long, requires = "baseclass")]
    json: bool,
}

#[cfg(feature = "cli")]
impl Cli {
    fn threshold(&self) -> Severity {
        if self.info || self.baseclass.is_some() {
            Severity::Info
        } else if self.error {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = Settings::default().with_threshold(cli.threshold());
    let definitions = Definitions::resolve(cli.definitions.as_deref())?;
    let store = SchemaStore::new(definitions).with_limits(settings.limits.clone());

    let stdout = io::stdout();
    let mut output = Output::new(stdout.lock()).with_width(settings.width);

    if let Some(class) = &cli.baseclass {
        if cli.json {
            println!("{}", dump_base_class(&store, class)?);
        } else {
            let listing = inspect_base_class(&store, class)?;
            output.write_unit(&listing, Severity::Info)?;
        }
        return Ok(0);
    }

    let filename = cli
        .filename
        .ok_or("No file given; use -f FILE or -b CLASS")?;
    if !filename.is_file() {
        return Err(format!("File {} does not exist", filename.display()).into());
    }

    let tree = JsonTreeReader::new()
        .with_limits(settings.limits.clone())
        .read(&filename)?;

    let report = match &cli.application {
        Some(name) => validate_application(
            &store,
            &settings,
            &tree,
            cli.path.as_deref(),
            name.as_deref(),
        )?,
        None => FileValidator::new(&store, &settings).validate(&tree, cli.path.as_deref())?,
    };

    output.write_report(&report)?;
    Ok(if report.has_errors() { 1 } else { 0 })
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
