use clap::Parser;
use comfy_table::{Cell, Table as ComfyTable, presets::UTF8_FULL};
use kvsql::{Database, FileStore, MemoryStore, QueryResult, Settings, TableStore, split_statements};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// kvsql command-line runner
#[derive(Parser, Debug)]
#[command(name = "kvsql")]
#[command(about = "Run SQL statements against a kvsql database", long_about = None)]
struct Args {
    /// Directory holding schema.json and the table row files
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// Keep all tables in memory; nothing is written to disk
    #[arg(short = 'm', long)]
    memory: bool,

    /// Log filter used when RUST_LOG is unset (e.g. `debug`, `kvsql=trace`)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Statement to execute; may be repeated
    #[arg(short = 'e', long = "execute", value_name = "SQL")]
    execute: Vec<String>,

    /// Script file; statements are read from stdin when neither -e nor FILE is given
    file: Option<PathBuf>,
}

impl Args {
    /// CLI args override everything loaded from file and environment
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
        settings.memory |= self.memory;
        settings
    }

    fn statements(&self) -> std::io::Result<Vec<String>> {
        if !self.execute.is_empty() {
            return Ok(self.execute.iter().flat_map(|sql| split_statements(sql)).collect());
        }
        let script = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        Ok(split_statements(&script))
    }
}

fn format_result(result: &QueryResult) -> String {
    match result {
        QueryResult::Success { message, .. } => message.clone(),
        QueryResult::Rows(rows) => {
            if rows.is_empty() {
                return "(0 rows)".to_string();
            }

            // Header: field names in first-seen order across all rows
            let mut columns: Vec<&str> = Vec::new();
            for key in rows.iter().flat_map(|row| row.keys()) {
                if !columns.contains(&key) {
                    columns.push(key);
                }
            }

            let mut table = ComfyTable::new();
            table.load_preset(UTF8_FULL);
            table.set_header(columns.iter().map(Cell::new));
            for row in rows {
                table.add_row(columns.iter().map(|c| Cell::new(row.value(c))));
            }

            let suffix = if rows.len() == 1 { "row" } else { "rows" };
            format!("{table}\n({} {suffix})", rows.len())
        }
    }
}

fn run<S: TableStore>(mut db: Database<S>, statements: &[String]) -> ExitCode {
    let mut failed = false;
    for sql in statements {
        match db.execute(sql) {
            Ok(result) => println!("{}", format_result(&result)),
            Err(e) => {
                eprintln!("ERROR: {e}");
                failed = true;
            }
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = args.apply(Settings::load()?);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let statements = args.statements()?;
    tracing::debug!(count = statements.len(), memory = settings.memory, "running script");

    let code = if settings.memory {
        run(Database::new(MemoryStore::new()), &statements)
    } else {
        let store = FileStore::open(&settings.data_dir)?;
        run(Database::new(store), &statements)
    };
    Ok(code)
}
