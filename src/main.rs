use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use static_toml::static_toml;
use std::path::{Path, PathBuf};

mod context;
mod data;
mod page;
mod photo;
mod query;
mod serve;
mod store;

static_toml! {
    pub static CONFIG = include_toml!("config.toml");
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty directory database
    Init {
        output: PathBuf,
    },

    /// Insert a few demo departments and employees
    Seed {
        db: PathBuf,
    },

    Serve {
        db: PathBuf,

        #[arg(short = 'p', long)]
        port: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Init { output } => {
            init(output.as_path()).with_context(|| "could not run `init`")
        }

        Commands::Seed { db } => seed(db.as_path()).with_context(|| "could not run `seed`"),

        Commands::Serve { db, port } => {
            serve::run(db, port.as_deref()).with_context(|| "failed to run `serve`")
        }
    }
}

fn init(output: &Path) -> Result<()> {
    let conn = rusqlite::Connection::open(output)
        .with_context(|| format!("could not open database {:?}", output))?;
    let store = store::EmployeeStore::new(&conn);
    store.create_tables()?;

    Ok(())
}

fn seed(db: &Path) -> Result<()> {
    let conn = rusqlite::Connection::open(db)
        .with_context(|| format!("could not open database {:?}", db))?;
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    let store = store::EmployeeStore::new(&conn);
    store.create_tables()?;

    let engineering = store.insert_department("Engineering")?;
    let accounting = store.insert_department("Accounting")?;
    let reception = store.insert_department("Reception")?;

    let demo = [
        ("Ivanova", "Anna", "Petrovna", engineering, Some("+7 901 123-45-67")),
        ("Petrov", "Sergei", "Ivanovich", engineering, None),
        ("Smirnov", "Dmitri", "", accounting, Some("+7 902 765-43-21")),
        ("Kuznetsova", "Olga", "Sergeevna", reception, Some("+7 903 555-01-02")),
    ];

    for (last_name, first_name, patronymic, department_id, phone_number) in demo {
        let form = data::EmployeeForm {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            patronymic: patronymic.to_string(),
            department_id,
            phone_number: phone_number.map(str::to_string),
        };
        store.insert_employee(&form, None)?;
    }

    Ok(())
}
