use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use s11_export::config::{Config, validate_library_path};
use s11_export::pipeline::decimate::MAX_PREVIEW_ROWS;
use s11_export::pipeline::display::DisplayMode;
use s11_export::pipeline::export::ExportFormat;
use s11_export::pipeline::range::{FrequencyRange, parse_bound};
use s11_export::pipeline::table::ColumnSelection;
use s11_export::state::Session;

#[derive(Parser, Debug)]
#[command(
    name = "s11-export",
    version,
    about = "Browse, filter and export S11 simulation sweeps to CSV / Excel"
)]
struct Cli {
    /// Settings file (default: $S11_EXPORT_CONFIG, else config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Frequency range, run count and minimum S11 of a result file
    Summary { file: PathBuf },

    /// Columns available for a display mode
    Columns {
        file: PathBuf,
        #[arg(long, default_value_t = DisplayMode::Complex)]
        mode: DisplayMode,
    },

    /// Print a decimated table
    Preview {
        file: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        /// Frequency points shown per run
        #[arg(long, default_value_t = MAX_PREVIEW_ROWS)]
        max_rows: usize,
    },

    /// Write the full filtered table to CSV or XLSX
    Export {
        file: PathBuf,
        /// Output file; the format's extension is appended when missing
        #[arg(short, long)]
        output: PathBuf,
        /// csv or xlsx (default: from the output extension, else csv)
        #[arg(long)]
        format: Option<ExportFormat>,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the settings file location and contents
    Show,
    /// Point at the simulator's scripting library directory
    SetLibraryPath { dir: PathBuf },
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Start frequency in GHz ("1,5" is accepted)
    #[arg(long)]
    start: Option<String>,

    /// End frequency in GHz
    #[arg(long)]
    end: Option<String>,

    /// complex, magnitude, db or magnitude-phase
    #[arg(long, default_value_t = DisplayMode::Complex)]
    mode: DisplayMode,

    /// Output column, repeatable (default: all)
    #[arg(short = 'c', long = "column")]
    columns: Vec<String>,
}

impl ViewArgs {
    fn apply(&self, session: &mut Session) {
        session.range = FrequencyRange {
            start: self.start.as_deref().and_then(parse_bound),
            end: self.end.as_deref().and_then(parse_bound),
        };
        session.mode = self.mode;
        session.columns = if self.columns.is_empty() {
            ColumnSelection::All
        } else {
            ColumnSelection::Only(self.columns.clone())
        };
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path);
    let mut session = Session::default();

    match cli.command {
        Command::Summary { file } => {
            session.load(&file, &config)?;
            print!("{}", session.summary()?);
        }
        Command::Columns { file, mode } => {
            session.load(&file, &config)?;
            session.mode = mode;
            for column in session.available_columns()? {
                println!("{column}");
            }
        }
        Command::Preview {
            file,
            view,
            max_rows,
        } => {
            session.load(&file, &config)?;
            view.apply(&mut session);
            session.max_preview_rows = max_rows;
            let shown = session.preview()?;
            let total = session.filtered()?;
            println!("{}", shown.render()?);
            println!(
                "Showing {} of {} rows",
                shown.len(),
                total.len() * total.n_points()
            );
        }
        Command::Export {
            file,
            output,
            format,
            view,
        } => {
            session.load(&file, &config)?;
            view.apply(&mut session);
            let format = format
                .or_else(|| ExportFormat::from_path(&output))
                .unwrap_or_default();
            let output = format.with_extension(&output);
            let table = session
                .export(&output, format)
                .with_context(|| format!("Failed to export data to {}", output.display()))?;
            println!("Exported {} rows to {}", table.len(), output.display());
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("Settings file: {}", config_path.display());
                match &config.library_path {
                    Some(path) => {
                        let status = match validate_library_path(path) {
                            Ok(()) => "ok".to_string(),
                            Err(e) => e.to_string(),
                        };
                        println!("Library path: {} ({status})", path.display());
                    }
                    None => println!("Library path: <not set>"),
                }
            }
            ConfigAction::SetLibraryPath { dir } => {
                config.set_library_path(dir)?;
                config.save(&config_path)?;
                println!("Library path updated in {}", config_path.display());
            }
        },
    }

    Ok(())
}
