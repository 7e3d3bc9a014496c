use std::io;

use crate::config;
use crate::data::validate::{validate_catalog, validate_catalog_file, ValidationReport};
use crate::missions::progression::{progression_report, write_report_csv, MAX_REPORT_LEVEL};
use crate::missions::MissionGenerator;
use crate::server;
use crate::server::api::MAX_BATCH;

const USAGE: &str = "usage: roguesim <serve|generate|batch|report|validate>";
const DEFAULT_BATCH: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Generate,
    Batch,
    Report,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("generate") => Some(Command::Generate),
        Some("batch") => Some(Command::Batch),
        Some("report") => Some(Command::Report),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Generate) => handle_generate(args),
        Some(Command::Batch) => handle_batch(args),
        Some(Command::Report) => handle_report(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = config::bind_addr();
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn generator() -> Option<&'static MissionGenerator> {
    match config::active_generator() {
        Ok(generator) => Some(generator),
        Err(err) => {
            eprintln!("mission catalog unavailable: {err}");
            None
        }
    }
}

/// `roguesim generate <level> <reputation> [completed,...]`
fn handle_generate(args: &[String]) -> i32 {
    let Some(generator) = generator() else {
        return 1;
    };
    let level = parse_i32_arg(args.get(2), "level", 1);
    let reputation = args.get(3).map(String::as_str).unwrap_or("NOVICE");
    let completed = parse_completed(args.get(4));

    let generated = generator.generate_mission(level, &completed, reputation);
    print_json(&generated, "mission")
}

/// `roguesim batch <level> <reputation> <count> [completed,...]`
fn handle_batch(args: &[String]) -> i32 {
    let count = match args.get(4) {
        None => DEFAULT_BATCH,
        Some(raw) => match parse_batch_count(raw) {
            Some(count) => count,
            None => {
                eprintln!("invalid count '{raw}': must be between 1 and {MAX_BATCH}");
                eprintln!("usage: roguesim batch <level> <reputation> <count> [completed,...]");
                return 2;
            }
        },
    };
    let Some(generator) = generator() else {
        return 1;
    };
    let level = parse_i32_arg(args.get(2), "level", 1);
    let reputation = args.get(3).map(String::as_str).unwrap_or("NOVICE");
    let completed = parse_completed(args.get(5));

    let batch = generator.generate_mission_batch(level, &completed, reputation, count as usize);
    print_json(&batch, "batch")
}

/// `roguesim report [max_level] [--csv]`
fn handle_report(args: &[String]) -> i32 {
    let Some(generator) = generator() else {
        return 1;
    };
    let positional: Vec<&String> = args.iter().skip(2).filter(|arg| !arg.starts_with("--")).collect();
    let mut max_level = parse_i32_arg(positional.first().copied(), "max_level", 20);
    if max_level > MAX_REPORT_LEVEL {
        eprintln!("max_level {max_level} is above {MAX_REPORT_LEVEL}, clamping");
        max_level = MAX_REPORT_LEVEL;
    }
    let as_csv = args.iter().any(|arg| arg == "--csv");

    let rows = progression_report(generator, max_level);
    if as_csv {
        match write_report_csv(&rows, io::stdout().lock()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("failed to write report: {err}");
                1
            }
        }
    } else {
        print_json(&rows, "report")
    }
}

/// `roguesim validate [path]`; validates the active catalog when no path is given.
fn handle_validate(args: &[String]) -> i32 {
    let (label, report) = match args.get(2) {
        Some(path) => match validate_catalog_file(path) {
            Ok(report) => (path.clone(), report),
            Err(err) => {
                eprintln!("validation failed: {err}");
                return 1;
            }
        },
        None => {
            let Some(generator) = generator() else {
                return 1;
            };
            ("active catalog".to_string(), validate_catalog(generator.catalog()))
        }
    };

    print_report(&report);
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s) in {label}",
            report.count(crate::data::validate::ValidationSeverity::Error)
        );
        1
    } else {
        println!("validation passed: {label}");
        0
    }
}

fn print_report(report: &ValidationReport) {
    for diagnostic in report.sorted() {
        eprintln!("- {diagnostic}");
    }
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn parse_completed(raw: Option<&String>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_i32_arg(raw: Option<&String>, name: &str, default: i32) -> i32 {
    raw.and_then(|value| value.parse::<i32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_batch_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| (1..=MAX_BATCH).contains(count))
}
