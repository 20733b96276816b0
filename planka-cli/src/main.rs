mod layout;
mod replay;
mod trace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use planka_keymap::{Config, Rollover};
use std::fs;
use std::io;

#[derive(Parser)]
#[command(name = "planka-cli")]
#[command(about = "Planka keyboard keymap tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every layer of the keymap as an HTML/SVG page
    Layout {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Replay a scan trace through the firmware core and print the events
    Replay {
        /// Trace file: one `<scans> [row:col ...]` step per line
        trace: String,
        /// Unchanged scans before a change is committed
        #[arg(long, default_value_t = Config::DEFAULT.debounce)]
        debounce: u8,
        /// Tap/hold decision time in milliseconds (one scan = 1 ms)
        #[arg(long, default_value_t = Config::DEFAULT.tapping_term_ms)]
        tapping_term: u16,
        /// What another key does to an undecided tap/hold key
        #[arg(long, value_enum, default_value_t = RolloverArg::HoldOnPress)]
        rollover: RolloverArg,
        /// Print the matrix whenever a scan commits
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RolloverArg {
    /// Pressing another key makes it a hold
    HoldOnPress,
    /// Tapping another key makes it a hold
    HoldOnTap,
}

impl From<RolloverArg> for Rollover {
    fn from(arg: RolloverArg) -> Self {
        match arg {
            RolloverArg::HoldOnPress => Rollover::HoldOnOtherKeyPress,
            RolloverArg::HoldOnTap => Rollover::HoldOnOtherKeyTap,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Layout { output } => {
            let html = layout::generate_html();
            match output {
                Some(path) => {
                    fs::write(&path, html).with_context(|| format!("writing {}", path))?;
                    println!("Layout written to {}", path);
                }
                None => print!("{html}"),
            }
        }
        Command::Replay {
            trace: path,
            debounce,
            tapping_term,
            rollover,
            dump,
        } => {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            let steps = trace::parse(&contents).with_context(|| format!("parsing {}", path))?;

            let config = Config {
                debounce,
                tapping_term_ms: tapping_term,
                rollover: rollover.into(),
                ..Config::DEFAULT
            };
            log::debug!("{:?}", config);
            replay::run(&steps, &config, dump, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}
