//! Simulator entry point — CLI wiring and config-driven grid construction.

use std::path::Path;
use std::process;
use std::rc::Rc;

use v2g_sim::config::ScenarioConfig;
use v2g_sim::io::export::export_csv;
use v2g_sim::logging::{ConsoleSink, LogSink};
use v2g_sim::sim::report::RunReport;
use v2g_sim::viz;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    minutes_override: Option<u32>,
    telemetry_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("v2g-sim — tick-driven V2G energy grid simulator");
    eprintln!();
    eprintln!("Usage: v2g-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, renewable, depot)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --minutes <u32>          Override simulated run length");
    eprintln!("  --telemetry-out <path>   Export tick records to CSV");
    eprintln!("  --quiet                  Suppress per-tick output");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        minutes_override: None,
        telemetry_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--minutes" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --minutes requires a u32 argument");
                    process::exit(1);
                }
                if let Ok(m) = args[i].parse::<u32>() {
                    cli.minutes_override = Some(m);
                } else {
                    eprintln!("error: --minutes value \"{}\" is not a valid u32", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline.
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(minutes) = cli.minutes_override {
        scenario.simulation.run_minutes = minutes;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let sink: Rc<dyn LogSink> = Rc::new(ConsoleSink);
    let mut sim = match scenario.build(sink) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let records = sim.operate(scenario.simulation.run_minutes);

    if !cli.quiet {
        for record in &records {
            println!("{record}");
        }
    }

    println!("{}", viz::render_fleet(&sim));
    println!("{}", RunReport::from_records(&records));

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
}
