use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use packsim_core::{
    export_selection, filter_packs, import_selection, with_result_end_marker, SelectedPack,
    Session,
};
use packsim_data::{AppConfig, JsonCatalog};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Open simulated trading card packs", long_about = None)]
struct Cli {
    #[arg(long, global = true, help = "Catalog directory (sets/ and cards/)")]
    data: Option<PathBuf>,
    #[arg(long, global = true, help = "Catalog language, e.g. en or en_US")]
    lang: Option<String>,
    #[arg(long, global = true, help = "Slot table JSON file")]
    slots: Option<PathBuf>,
    #[arg(long, global = true, help = "Config JSON file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "List packs, optionally filtered", alias = "ls")]
    Packs { query: Option<String> },
    #[command(about = "Open packs and print the pulled cards")]
    Open {
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, help = "Exported selection JSON to open")]
        selection: Option<PathBuf>,
        #[arg(value_name = "PACK=QTY")]
        picks: Vec<String>,
    },
    #[command(about = "Print a selection document for later import")]
    Export {
        #[arg(value_name = "PACK=QTY", required = true)]
        picks: Vec<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let catalog = config.open_catalog()?;
    match cli.command {
        Command::Packs { query } => {
            let query = query.unwrap_or_default();
            let packs = filter_packs(catalog.all_packs(), &query);
            if packs.is_empty() {
                println!("No packs match \"{}\".", query.trim());
            }
            for pack in packs {
                println!(
                    "{} | {} | {} | {} | {} cards",
                    pack.name, pack.series, pack.code, pack.release_date, pack.card_count
                );
            }
        }
        Command::Open {
            seed,
            selection,
            picks,
        } => {
            let mut selected = match selection {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("read {}", path.display()))?;
                    let imported = import_selection(&raw, catalog.all_packs())
                        .with_context(|| format!("import {}", path.display()))?;
                    log::info!("imported {} packs from {}", imported.len(), path.display());
                    imported
                }
                None => Vec::new(),
            };
            for pick in resolve_picks(&catalog, &picks)? {
                merge_pick(&mut selected, pick);
            }
            let session = Session::new(catalog, config.slot_table()?)
                .with_max_quantity(config.max_quantity);
            let report = session.open(&selected, seed.as_deref())?;
            print!("{}", with_result_end_marker(&report.text));
            println!("{}", report.status_line());
            log::info!("seed {}", report.seed);
        }
        Command::Export { picks } => {
            let selected = resolve_picks(&catalog, &picks)?;
            println!("{}", export_selection(&selected));
        }
    }
    Ok(())
}

/// Config file and environment first, then command-line flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data) = &cli.data {
        config.data_dir = data.clone();
    }
    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
    }
    if let Some(slots) = &cli.slots {
        config.slots = Some(slots.clone());
    }
    Ok(config)
}

fn resolve_picks(catalog: &JsonCatalog, picks: &[String]) -> anyhow::Result<Vec<SelectedPack>> {
    picks
        .iter()
        .map(|raw| {
            let (query, quantity) = parse_pick(raw)?;
            let pack = catalog
                .find_pack(query)
                .with_context(|| format!("no pack matches {query:?}"))?;
            Ok(SelectedPack::new(pack, quantity))
        })
        .collect()
}

/// A later pick for the same pack replaces the earlier quantity.
fn merge_pick(selected: &mut Vec<SelectedPack>, pick: SelectedPack) {
    match selected.iter_mut().find(|entry| entry.key() == pick.key()) {
        Some(entry) => entry.quantity = pick.quantity,
        None => selected.push(pick),
    }
}

/// `PACK=QTY`, or a bare `PACK` for a single pack.
fn parse_pick(raw: &str) -> anyhow::Result<(&str, u32)> {
    let (query, quantity) = match raw.rsplit_once('=') {
        Some((query, quantity)) => {
            let quantity = quantity
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid quantity in {raw:?}"))?;
            (query.trim(), quantity)
        }
        None => (raw.trim(), 1),
    };
    if query.is_empty() {
        bail!("missing pack in {raw:?}");
    }
    Ok((query, quantity))
}
