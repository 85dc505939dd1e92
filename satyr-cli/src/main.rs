use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::Error;
use clap::{App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use satyr::config::{JW, MOM, VSIDS};
use satyr::solver::Solver;
use satyr::state::SatState;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SATYR_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn heuristic_bits(name: &str) -> u32 {
    match name {
        "bcp" => 0,
        "vsids" => VSIDS,
        "vsids-mom" => VSIDS | MOM,
        "vsids-jw" => VSIDS | JW,
        _ => unreachable!(),
    }
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("satyr")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[timeout] --timeout=[SECONDS] 'Give up after this many seconds'")
        .arg(
            Arg::from_usage("[heuristic] --heuristic=[NAME] 'The branching heuristic to use'")
                .possible_values(&["bcp", "vsids", "vsids-mom", "vsids-jw"])
                .default_value("vsids-jw")
                .case_insensitive(true),
        )
        .get_matches();

    init_logging();

    info!("This is satyr {}", env!("CARGO_PKG_VERSION"));

    let mut solver = Solver::new();

    let heuristic = matches.value_of("heuristic").unwrap().to_ascii_lowercase();
    solver.set_mode(heuristic_bits(&heuristic));

    if let Some(timeout) = matches.value_of("timeout") {
        solver.set_timeout(Duration::from_secs(timeout.parse()?));
    }

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    solver.solve();

    match solver.sat_state() {
        SatState::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in solver.model().unwrap() {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        SatState::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        _ => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}
