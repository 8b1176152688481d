use std::{ffi::OsString, path::PathBuf};

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use cardsched::{
    CardId, CardMemoryState, CardStore, JsonFileStore, ParameterSet, ReviewService, Scheduler,
    logging,
};

mod ui;

/// Spaced-repetition scheduling for flashcards, backed by a JSON data file.
#[derive(Parser)]
#[command(name = "cardsched")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Scheduler parameters as JSON. Missing fields use the defaults.
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Data file. Defaults to $XDG_DATA_HOME/cardsched/cards.json.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Turn off interval fuzz regardless of the parameter file.
    #[arg(long, global = true)]
    no_fuzz: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a card id and register it as new
    New,

    /// Review a card
    Review {
        id: CardId,
        /// 1 (forgot) to 4 (easy). Asked for interactively when omitted.
        #[arg(long)]
        grade: Option<u8>,
        /// Review time in RFC 3339. Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print a card's memory state
    Show { id: CardId },

    /// Print what each grade would do to a card
    Preview { id: CardId },

    /// List cards that are due
    Due,

    /// Print a card's review log
    Log { id: CardId },
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing("warn");
    let cli = Cli::parse();

    let mut params = match &cli.params {
        Some(path) => ParameterSet::from_json_file(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => ParameterSet::default(),
    };
    if cli.no_fuzz {
        params = params.with_fuzz(false);
    }
    let scheduler = Scheduler::new(params);

    let data_path = match cli.data {
        Some(path) => path,
        None => data_dir(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME"))?
            .join("cards.json"),
    };
    let store = JsonFileStore::open(&data_path)
        .with_context(|| format!("opening {}", data_path.display()))?;

    match cli.command {
        Commands::New => {
            let mut store = store;
            let id = CardId::random();
            store.insert_new(id, Utc::now())?;
            println!("__{id}");
        }
        Commands::Review { id, grade, at } => {
            let grade = match grade {
                Some(grade) => grade,
                None => {
                    let current = store.load_memory_state(id)?;
                    match ui::prompt_grade(id, current.as_ref())? {
                        Some(grade) => grade.into(),
                        None => return Ok(()),
                    }
                }
            };
            let mut service = ReviewService::new(scheduler, store);
            let outcome = service.review(id, grade, at)?;
            print_state(id, &outcome.card, service.scheduler(), Utc::now());
        }
        Commands::Show { id } => {
            let card = store
                .load_memory_state(id)?
                .with_context(|| format!("no card __{id}"))?;
            print_state(id, &card, &scheduler, Utc::now());
        }
        Commands::Preview { id } => {
            let service = ReviewService::new(scheduler, store);
            for outcome in service.preview(id)? {
                println!(
                    "{:>7}: {:<10} due {} ({} days)",
                    outcome.log.grade(),
                    outcome.card.state,
                    outcome.card.due.format("%Y-%m-%d %H:%M"),
                    outcome.card.scheduled_days
                );
            }
        }
        Commands::Due => {
            let now = Utc::now();
            for (id, card) in store.due(now) {
                println!(
                    "__{id}  {:<10} due {}  R={:.3}",
                    card.state,
                    card.due.format("%Y-%m-%d %H:%M"),
                    scheduler.card_retrievability(card, now)
                );
            }
        }
        Commands::Log { id } => {
            for log in store.logs(id) {
                println!(
                    "{}  {:>6}  {} -> {}  S={:.2} D={:.2}  {} days",
                    log.reviewed_at().format("%Y-%m-%d %H:%M"),
                    log.grade(),
                    log.previous_state(),
                    log.state(),
                    log.stability(),
                    log.difficulty(),
                    log.scheduled_days()
                );
            }
        }
    }
    Ok(())
}

/// `$XDG_DATA_HOME/cardsched`, falling back to `~/.local/share/cardsched`.
fn data_dir(xdg_data_home: Option<OsString>, home: Option<OsString>) -> anyhow::Result<PathBuf> {
    match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join("cardsched")),
        (_, Some(home)) if !home.is_empty() => Ok(PathBuf::from(home).join(".local/share/cardsched")),
        _ => bail!("neither XDG_DATA_HOME nor HOME is set; pass --data"),
    }
}

fn print_state(id: CardId, card: &CardMemoryState, scheduler: &Scheduler, now: DateTime<Utc>) {
    println!("card        __{id}");
    println!("state       {}", card.state);
    println!("due         {}", card.due.format("%Y-%m-%d %H:%M"));
    if let (Some(s), Some(d)) = (card.stability, card.difficulty) {
        println!("stability   {s:.2}");
        println!("difficulty  {d:.2}");
        println!("recall      {:.3}", scheduler.card_retrievability(card, now));
    }
    println!("reps        {}", card.reps);
    println!("lapses      {}", card.lapses);
}
