//! rxlens-ingest <raw.csv> <out_dir> [sqlite_path]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rxlens_core::db::Database;
use rxlens_ingest::{read_raw_products, refine};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: rxlens-ingest <raw.csv> <out_dir> [sqlite_path]");
    }
    let raw_path = PathBuf::from(&args[0]);
    let out_dir = PathBuf::from(&args[1]);

    let products = read_raw_products(&raw_path)
        .with_context(|| format!("reading raw export {}", raw_path.display()))?;
    let refined = refine(&products);

    refined
        .write_csv(&out_dir)
        .with_context(|| format!("writing refined tables to {}", out_dir.display()))?;
    info!(dir = %out_dir.display(), "Wrote refined tables");

    if let Some(db_path) = args.get(2) {
        let mut db = Database::open(db_path)
            .with_context(|| format!("opening database {}", db_path))?;
        let counts = refined
            .write_to_database(&mut db)
            .context("writing catalog to database")?;
        info!(
            path = %db_path,
            medicines = counts.medicines,
            ingredients = counts.ingredients,
            composition_rows = counts.composition_rows,
            "Wrote database"
        );
    }

    Ok(())
}
