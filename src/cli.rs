// src/cli.rs
use std::env;
use std::path::PathBuf;

use crate::adapters;
use crate::config::consts::{MARGIN_DAYS, STORE_DIR};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::runner::{self, RunParams};

pub struct Params {
    pub list: bool,
    pub jurisdictions: Vec<String>, // empty = all
    pub store_dir: PathBuf,
    pub margin_days: i64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            list: false,
            jurisdictions: Vec::new(),
            store_dir: PathBuf::from(STORE_DIR),
            margin_days: MARGIN_DAYS,
        }
    }
}

pub fn run() -> Result<()> {
    let mut params = Params::default();
    parse_cli(&mut params)?;

    if params.list {
        for name in adapters::jurisdiction_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let jurisdictions = if params.jurisdictions.is_empty() {
        adapters::jurisdiction_names()?
            .into_iter()
            .map(String::from)
            .collect()
    } else {
        // Resolve early so a typo fails before any fetching starts.
        let mut resolved = Vec::with_capacity(params.jurisdictions.len());
        for name in &params.jurisdictions {
            match adapters::adapter_for(name)? {
                Some(a) => resolved.push(s!(a.jurisdiction())),
                None => return Err(Error::Config(format!("unknown jurisdiction: {name}"))),
            }
        }
        resolved
    };

    let run_params = RunParams {
        jurisdictions,
        store_dir: params.store_dir,
        margin_days: params.margin_days,
    };

    let mut progress = ConsoleProgress;
    let report = runner::run(&run_params, Some(&mut progress))?;

    for s in &report.summaries {
        println!(
            "{}: {} fresh, {} total -> {}",
            s.jurisdiction,
            s.fresh_len,
            s.total_len,
            s.path.display()
        );
    }
    if !report.failures.is_empty() {
        // Failures were reported as they happened; just exit nonzero.
        eprintln!(
            "{} of {} jurisdiction(s) failed",
            report.failures.len(),
            run_params.jurisdictions.len()
        );
        std::process::exit(1);
    }
    Ok(())
}

fn parse_cli(params: &mut Params) -> Result<()> {
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--list" => params.list = true,
            "-a" | "--all" => params.jurisdictions.clear(),
            "-j" | "--jurisdiction" => {
                let v = args
                    .next()
                    .ok_or_else(|| Error::Config(s!("missing value for --jurisdiction")))?;
                params.jurisdictions.push(v);
            }
            "-o" | "--store-dir" => {
                let v = args
                    .next()
                    .ok_or_else(|| Error::Config(s!("missing value for --store-dir")))?;
                params.store_dir = PathBuf::from(v);
            }
            "--margin" => {
                let v = args
                    .next()
                    .ok_or_else(|| Error::Config(s!("missing value for --margin")))?;
                params.margin_days = v
                    .parse()
                    .map_err(|_| Error::Config(format!("bad --margin value: {v}")))?;
                if params.margin_days < 0 {
                    return Err(Error::Config(s!("--margin must be >= 0")));
                }
            }
            "-h" | "--help" => {
                eprintln!("{}", include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(Error::Config(format!("unknown arg: {a}"))),
        }
    }
    Ok(())
}

struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        eprintln!("Ingesting {total} jurisdiction(s)...");
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn item_done(&mut self, jurisdiction: &str) {
        eprintln!("  ok   {jurisdiction}");
    }
    fn item_failed(&mut self, jurisdiction: &str, msg: &str) {
        eprintln!("  FAIL {jurisdiction}: {msg}");
    }
}
