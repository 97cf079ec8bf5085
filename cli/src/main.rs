//! gearsort command line host.
//!
//! Keeps the host's gearset and hotbar tables in a raw image file and runs
//! the library against it the way an in-process host would:
//! - `init-image`, `add`, `delete`, `equip` and `hotbar` edit the image
//! - `sort` sorts it and writes it back when the library asks for a flush
//! - `list` shows the gearset slots

mod image;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gearsort::{
    ClassJob, Gearset, GearsetEntry, GearsetId, GearsetSorter, HotbarSlot, SortConfig, SortKey,
    HOTBAR_BARS, HOTBAR_SLOTS, SAVED_HOTBAR_CLASS_JOBS,
};
use tracing::info;

use crate::image::{FlushRecorder, HostImage};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "gearsort-cli")]
#[command(about = "Sort gearsets in a host image without breaking hotbars")]
struct Args {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sort the gearsets in an image
    Sort {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Sort configuration; defaults are used if it doesn't exist
        #[arg(short, long, value_name = "PATH", default_value = "gearsort.json")]
        config: PathBuf,
        /// Override the primary key (name, job, ilvl)
        #[arg(long, value_name = "KEY")]
        primary: Option<SortKey>,
        /// Override the secondary key (name, job, ilvl)
        #[arg(long, value_name = "KEY")]
        secondary: Option<SortKey>,
        /// Sort names from Z to A
        #[arg(long)]
        reverse_name: bool,
        /// Sort item levels from greatest to least
        #[arg(long)]
        reverse_item_level: bool,
        /// Sort without writing the image back
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the gearset slots of an image
    List {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Include unused slots
        #[arg(short, long)]
        all: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the default sort configuration
    InitConfig {
        /// Where to write it
        #[arg(short, long, value_name = "PATH", default_value = "gearsort.json")]
        config: PathBuf,
    },
    /// Write an image with no gearsets and empty hotbars
    InitImage {
        /// Where to write it
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Save a new gearset in the first free slot
    Add {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Gearset name
        name: String,
        /// Class/job abbreviation, e.g. WHM
        #[arg(short, long)]
        job: ClassJob,
        /// Average item level
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        ilvl: i16,
    },
    /// Delete the gearset in a slot
    Delete {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Slot to delete
        slot: u8,
    },
    /// Mark a gearset as the equipped one
    Equip {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Slot to equip
        slot: u8,
    },
    /// Put a gearset on a hotbar slot
    Hotbar {
        /// Host image
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,
        /// Gearset slot to reference
        gearset: u8,
        /// Bar index
        #[arg(long)]
        bar: usize,
        /// Slot index within the bar
        #[arg(long)]
        position: usize,
        /// Saved class/job set to edit instead of the live bars
        #[arg(long, value_name = "INDEX")]
        saved: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_tracing(args.verbose);

    match args.command {
        Command::Sort {
            image,
            config,
            primary,
            secondary,
            reverse_name,
            reverse_item_level,
            dry_run,
        } => {
            let mut config = SortConfig::load(&config)
                .with_context(|| format!("loading sort configuration {}", config.display()))?;
            if let Some(key) = primary {
                config.set_primary(key);
            }
            if let Some(key) = secondary {
                config.set_secondary(key)?;
            }
            config.sort_name_reverse |= reverse_name;
            config.sort_item_level_reverse |= reverse_item_level;
            sort(&image, config, dry_run)
        }
        Command::List { image, all, json } => list(&image, all, json),
        Command::InitConfig { config } => {
            SortConfig::default().save(&config)?;
            info!(path = %config.display(), "wrote default sort configuration");
            Ok(())
        }
        Command::InitImage { image, force } => {
            if image.exists() && !force {
                bail!("{} already exists, pass --force to overwrite", image.display());
            }
            HostImage::empty().save(&image)?;
            info!(path = %image.display(), "wrote empty host image");
            Ok(())
        }
        Command::Add {
            image,
            name,
            job,
            ilvl,
        } => edit(&image, |host| {
            let Some(slot) = host.free_slot() else {
                bail!("every gearset slot is in use");
            };
            host.gearsets[slot] = GearsetEntry::new(slot as u8, &name, job.value(), ilvl);
            info!(slot, %name, %job, ilvl, "saved gearset");
            Ok(())
        }),
        Command::Delete { image, slot } => edit(&image, |host| {
            let entry = gearset_slot(host, slot)?;
            entry.delete();
            info!(slot, "deleted gearset");
            Ok(())
        }),
        Command::Equip { image, slot } => edit(&image, |host| {
            if !gearset_slot(host, slot)?.exists() {
                bail!("slot {slot} has no gearset");
            }
            host.current = slot;
            info!(slot, "equipped gearset");
            Ok(())
        }),
        Command::Hotbar {
            image,
            gearset,
            bar,
            position,
            saved,
        } => edit(&image, |host| {
            gearset_slot(host, gearset)?;
            if bar >= HOTBAR_BARS || position >= HOTBAR_SLOTS {
                bail!("hotbar slot {bar}/{position} is outside {HOTBAR_BARS}x{HOTBAR_SLOTS} bars");
            }
            let bars = match saved {
                Some(set) if set < SAVED_HOTBAR_CLASS_JOBS => &mut host.saved[set],
                Some(set) => bail!("saved hotbar set {set} doesn't exist"),
                None => &mut host.live,
            };
            bars[bar][position] = HotbarSlot::gearset(GearsetId(gearset));
            info!(gearset, bar, position, ?saved, "placed gearset on hotbar");
            Ok(())
        }),
    }
}

/// Sort the image at `path`, writing it back unless `dry_run` is set.
fn sort(path: &Path, config: SortConfig, dry_run: bool) -> anyhow::Result<()> {
    let sorter = GearsetSorter::new(config)?;
    let mut host = HostImage::load(path)?;
    let mut flushes = FlushRecorder::default();
    let report = {
        let mut session = host.session(&mut flushes)?;
        let report = sorter.sort(&mut session)?;
        info!(
            gearsets = session.gearsets().existing_count(),
            equipped = %session.references().current(),
            "sorted host image"
        );
        report
    };

    if dry_run {
        info!("dry run, leaving the image untouched");
    } else if flushes.any() {
        host.save(path)?;
        info!(path = %path.display(), gearsets = flushes.gearsets, hotbars = flushes.hotbars, "flushed host image");
    }

    println!(
        "{} swaps, {} hotbar slots retargeted, equipped gearset {}",
        report.swaps,
        report.retargeted.hotbar_slots(),
        if report.retargeted.current > 0 { "moved" } else { "unchanged" }
    );
    Ok(())
}

/// Print the gearset slots of the image at `path`.
fn list(path: &Path, all: bool, json: bool) -> anyhow::Result<()> {
    let host = HostImage::load(path)?;
    let gearsets = host
        .gearsets
        .iter()
        .map(Gearset::from)
        .filter(|gearset| all || gearset.exists());

    if json {
        let rows: Vec<_> = gearsets
            .map(|gearset| {
                serde_json::json!({
                    "id": gearset.id().value(),
                    "name": gearset.display_name(),
                    "classJob": class_job_label(gearset.class_job()),
                    "itemLevel": gearset.item_level(),
                    "exists": gearset.exists(),
                    "equipped": gearset.id().value() == host.current,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for gearset in gearsets {
        let marker = if gearset.id().value() == host.current { '*' } else { ' ' };
        if gearset.exists() {
            println!(
                "{marker}{:>4}  {:<24} {:<5} {:>4}",
                gearset.id().to_string(),
                gearset.display_name(),
                class_job_label(gearset.class_job()),
                gearset.item_level()
            );
        } else {
            println!("{marker}{:>4}  -", gearset.id().to_string());
        }
    }
    Ok(())
}

/// Load an image, apply `change` and save it.
fn edit(
    path: &Path,
    change: impl FnOnce(&mut HostImage) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut host = HostImage::load(path)?;
    change(&mut host)?;
    host.save(path)
}

/// The record in `slot`, checked against the table size.
fn gearset_slot(host: &mut HostImage, slot: u8) -> anyhow::Result<&mut GearsetEntry> {
    let count = host.gearsets.len();
    host.gearsets
        .get_mut(usize::from(slot))
        .with_context(|| format!("slot {slot} is outside the {count} gearset slots"))
}

/// Abbreviation of a class/job byte, or the raw value if it's unknown.
fn class_job_label(class_job: u8) -> String {
    ClassJob::try_from(class_job)
        .map(|class_job| class_job.to_string())
        .unwrap_or_else(|_| format!("0x{class_job:02X}"))
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("GEARSORT_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gearsort=debug,gearsort_cli=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
