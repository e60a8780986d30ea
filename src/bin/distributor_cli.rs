//! # Distributor CLI
//!
//! Interactive shell over a geo-authz session. Loads the place catalog once,
//! then reads numbered commands from stdin until `exit`.
//!
//! ## Configuration
//!
//! - `--catalog` / `GEO_AUTHZ_CATALOG` - catalog CSV (default: cities.csv)
//! - `--one-hop-cycle-check` - only reject direct two-node cycles on link
//! - `--dump-catalog` - write the loaded catalog as JSON and exit
//! - `RUST_LOG` - log level (default: warn)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use geo_authz::location::normalize;
use geo_authz::{
    Catalog, Command, CycleCheck, EngineConfig, GrantOutcome, Outcome, RuleKind, Session,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MENU: &str = "Distributor CLI
Commands:
1) Add distributor
2) Add permission
3) Link distributors
4) Remove distributor
5) List distributors
6) Remove include/exclude permissions
7) Get parents
8) Get permissions
9) Can distribute
10) Unlink parent from child
- exit";

/// Interactive distributor permission shell
#[derive(Parser, Debug)]
#[command(name = "distributor-cli", version, about)]
struct Args {
    /// Catalog of valid places (CSV with city, province, country in columns 3-5)
    #[arg(long, env = "GEO_AUTHZ_CATALOG", default_value = "cities.csv")]
    catalog: PathBuf,

    /// Only reject links where the new parent's parent is the child
    #[arg(long)]
    one_hop_cycle_check: bool,

    /// Write the loaded catalog as JSON to this path and exit
    #[arg(long)]
    dump_catalog: Option<PathBuf>,
}

type Input = Lines<BufReader<Stdin>>;

/// Prints a prompt and reads one normalized line; `None` at end of input
async fn ask(input: &mut Input, prompt: &str) -> anyhow::Result<Option<String>> {
    println!("{}", prompt);
    Ok(input.next_line().await?.map(|line| normalize(&line)))
}

async fn ask_kind(input: &mut Input, prompt: &str) -> anyhow::Result<Option<RuleKind>> {
    let Some(choice) = ask(input, prompt).await? else {
        return Ok(None);
    };
    Ok(match choice.as_str() {
        "1" => Some(RuleKind::Include),
        "2" => Some(RuleKind::Exclude),
        _ => {
            println!("Invalid choice. Please select 1 or 2.");
            None
        }
    })
}

/// Prompts for the fields of a menu entry and builds its command.
///
/// `Ok(None)` means the entry was abandoned (bad choice or end of input).
async fn read_command(choice: &str, input: &mut Input) -> anyhow::Result<Option<Command>> {
    macro_rules! field {
        ($prompt:expr) => {
            match ask(input, $prompt).await? {
                Some(value) => value,
                None => return Ok(None),
            }
        };
    }

    let command = match choice {
        "1" => Command::AddDistributor {
            name: field!("Enter name of distributor >"),
        },
        "2" => {
            let name = field!("Enter name of distributor >");
            let Some(kind) = ask_kind(input, "Select permission type\n1) Include\n2) Exclude").await?
            else {
                return Ok(None);
            };
            let location = field!("Write location details in the format <City>,<Province>,<Country>");
            Command::Grant {
                name,
                kind,
                location,
                confirm_move: false,
            }
        }
        "3" => {
            let parent = field!("Write parent distributor name >");
            let child = field!("Write child distributor name >");
            Command::Link { child, parent }
        }
        "4" => Command::Remove {
            name: field!("Write distributor name to delete >"),
        },
        "5" => Command::List,
        "6" => {
            let Some(kind) =
                ask_kind(input, "Which permission do you want to delete\n1) Include\n2) Exclude").await?
            else {
                return Ok(None);
            };
            let name = field!("Write name of distributor to delete its permissions >");
            Command::Wipe { name, kind }
        }
        "7" => Command::ParentChain {
            name: field!("Write distributor name >"),
        },
        "8" => Command::Permissions {
            name: field!("Write distributor name >"),
        },
        "9" => {
            let name = field!("Enter name of distributor >");
            let location = field!("Write location detail in the format <City>,<Province>,<Country>");
            Command::CanDistribute { name, location }
        }
        "10" => Command::Unlink {
            name: field!("Enter name of child distributor >"),
        },
        _ => {
            println!("Unknown command.");
            println!("{}", MENU);
            return Ok(None);
        }
    };

    Ok(Some(command))
}

/// Submits a command, asking for confirmation when a grant would move an
/// entry between the include and exclude sides.
async fn run_command(session: &mut Session, command: Command, input: &mut Input) -> anyhow::Result<()> {
    let outcome = match session.submit(command.clone()) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("{}", err);
            return Ok(());
        }
    };

    let needs_confirmation = matches!(
        outcome,
        Outcome::Granted {
            result: GrantOutcome::ConfirmationRequired { .. },
            ..
        }
    );
    println!("{}", outcome);

    if let (true, Command::Grant { name, kind, location, .. }) = (needs_confirmation, command) {
        if ask(input, "Type yes or no >").await?.as_deref() != Some("YES") {
            return Ok(());
        }
        let retry = Command::Grant {
            name,
            kind,
            location,
            confirm_move: true,
        };
        match session.submit(retry) {
            Ok(outcome) => println!("{}", outcome),
            Err(err) => println!("{}", err),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = EngineConfig {
        cycle_check: if args.one_hop_cycle_check {
            CycleCheck::OneHop
        } else {
            CycleCheck::FullChain
        },
        ..EngineConfig::default()
    };

    let catalog = Catalog::load(&args.catalog, &config.catalog)
        .with_context(|| format!("loading catalog from {}", args.catalog.display()))?;

    if let Some(path) = &args.dump_catalog {
        let json = catalog.to_json().context("serializing catalog")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing catalog dump to {}", path.display()))?;
        info!(path = %path.display(), "Wrote catalog dump");
        return Ok(());
    }

    let mut session = Session::new(Arc::new(catalog), config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", MENU);
    loop {
        let Some(choice) = ask(&mut input, ">").await? else {
            break;
        };
        if choice == "EXIT" {
            println!("Exiting...");
            break;
        }
        if choice.is_empty() {
            continue;
        }

        match read_command(&choice, &mut input).await {
            Ok(Some(command)) => run_command(&mut session, command, &mut input).await?,
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "Failed to read command input");
                return Err(err);
            }
        }
    }

    Ok(())
}
