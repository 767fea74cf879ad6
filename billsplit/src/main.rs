#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use billsplit_application::{LedgerSource, SettlementReport, SettlementService};
use billsplit_domain::model::{EventId, MemberId};
use billsplit_i18n as i18n;
use billsplit_infrastructure::JsonLedgerSource;
use billsplit_presentation::{NotificationPresenter, SettlementPresenter};
use bootstrap::AppConfig;
use std::{borrow::Cow, env, fs::File, io::BufReader, process};

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "\
Usage:
  billsplit settle <snapshot.json> [--json] [--members <id,id,...>]
  billsplit notify <message>";

struct SettleArgs {
    path: String,
    json: bool,
    members: Vec<MemberId>,
}

fn main() {
    bootstrap::init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("settle") => settle(parse_settle_args(args)?),
        Some("notify") => {
            let message = args.collect::<Vec<_>>().join(" ");
            if message.is_empty() {
                return Err(USAGE.into());
            }
            println!("{}", NotificationPresenter::render(&message));
            Ok(())
        }
        _ => Err(USAGE.into()),
    }
}

fn parse_settle_args(mut args: impl Iterator<Item = String>) -> CliResult<SettleArgs> {
    let mut path = None;
    let mut json = false;
    let mut members = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--members" => {
                let list = args.next().ok_or("--members needs a comma-separated id list")?;
                members = parse_member_list(&list)?;
            }
            other if path.is_none() && !other.starts_with("--") => {
                path = Some(other.to_string());
            }
            other => return Err(format!("Unexpected argument '{other}'\n{USAGE}").into()),
        }
    }

    let path = path.ok_or(USAGE)?;
    Ok(SettleArgs {
        path,
        json,
        members,
    })
}

fn parse_member_list(list: &str) -> CliResult<Vec<MemberId>> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse()
                .map(MemberId)
                .map_err(|_| format!("Invalid member id '{id}'").into())
        })
        .collect()
}

fn settle(args: SettleArgs) -> CliResult<()> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;

    let file =
        File::open(&args.path).map_err(|err| format!("Failed to read '{}': {err}", args.path))?;
    let source = JsonLedgerSource::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to load '{}': {err}", args.path))?;
    let service = SettlementService::new(&source, config.engine());
    let presenter = SettlementPresenter::new(config.context.scale);

    let event_ids: Vec<EventId> = source.event_ids().collect();
    tracing::info!(path = %args.path, events = event_ids.len(), "Loaded ledger snapshot");
    let mut reports = Vec::with_capacity(event_ids.len());
    for event_id in event_ids {
        let result = if args.members.is_empty() {
            service.compute(event_id)
        } else {
            service.settle_up(event_id, &args.members)
        };
        let settlement = result.map_err(|err| settlement_failure(event_id, err))?;

        if args.json {
            reports.push(SettlementReport::from(&settlement));
        } else {
            let ledger = source
                .fetch_ledger(event_id)
                .map_err(|err| format!("Event {event_id}: {err}"))?;
            println!("# {}", ledger.event().name);
            println!("{}", presenter.render_text(&settlement, &ledger));
        }
    }

    if args.json {
        let output = match reports.as_slice() {
            [single] => serde_json::to_string_pretty(single),
            _ => serde_json::to_string_pretty(&reports),
        }
        .map_err(|err| format!("Failed to serialize settlements: {err}"))?;
        println!("{output}");
    }

    Ok(())
}

fn settlement_failure(event_id: EventId, err: impl std::fmt::Display) -> String {
    format!(
        "{} (event {event_id}): {err}",
        i18n::SETTLEMENT_CALCULATION_FAILED
    )
}
