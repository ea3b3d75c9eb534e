// SPDX-License-Identifier: MIT
//
// keytap: watch what your terminal sends.
//
// Mounts a keypress context on the real terminal and prints one line per
// decoded key event: the chord, then the raw sequence with ESC spelled
// out. Ctrl+C or Ctrl+D quits. Piped stdin works too; the remaining
// input is flushed when it reaches EOF.
//
//   keytap [--log <file>] [--no-bracketed-paste]
//
// The terminal is in raw mode while running, so diagnostics go to a log
// file instead of stderr. `KEYTAP_LOG` takes an env-filter
// directive such as `keytap_term=trace` (default `debug`).

use std::cell::Cell;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use keytap_term::key::printable;
use keytap_term::{Key, KeypressConfig, KeypressContext, Pump};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How long one `pump` may block before the quit flag is checked again.
const PUMP_INTERVAL: Duration = Duration::from_millis(100);

const USAGE: &str = "\
usage: keytap [--log <file>] [--no-bracketed-paste]

Print every key event the terminal sends. Ctrl+C or Ctrl+D quits.

options:
  --log <file>           write diagnostics to <file> (filter from KEYTAP_LOG)
  --no-bracketed-paste   leave bracketed paste off; pastes arrive as keys
  -h, --help             show this help";

struct Options {
    log: Option<String>,
    bracketed_paste: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        log: None,
        bracketed_paste: true,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log" => {
                let path = args.next().ok_or("--log needs a file argument")?;
                options.log = Some(path);
            }
            "--no-bracketed-paste" => options.bracketed_paste = false,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn init_logging(path: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env("KEYTAP_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(())
}

fn print_key(key: &Key) {
    let chord = key.to_string();
    let mut out = io::stdout().lock();
    // Raw mode: no output post-processing, so `\n` alone would not return.
    let _ = write!(out, "{chord:<32} {}\r\n", printable(&key.sequence));
    let _ = out.flush();
}

fn is_quit(key: &Key) -> bool {
    key.ctrl && (key.is("c") || key.is("d"))
}

fn main() {
    let options = parse_args().unwrap_or_else(|e| {
        eprintln!("keytap: {e}\n\n{USAGE}");
        process::exit(2);
    });

    if let Some(path) = &options.log {
        if let Err(e) = init_logging(path) {
            eprintln!("keytap: {path}: {e}");
            process::exit(1);
        }
    }

    let mut ctx = KeypressContext::new(KeypressConfig {
        bracketed_paste: options.bracketed_paste,
        ..KeypressConfig::default()
    });

    let quit = Rc::new(Cell::new(false));
    let quit_flag = Rc::clone(&quit);
    ctx.subscribe(move |key| {
        print_key(key);
        if is_quit(key) {
            quit_flag.set(true);
        }
    });

    if let Err(e) = ctx.mount() {
        eprintln!("keytap: failed to take over the terminal: {e}");
        process::exit(1);
    }

    while !quit.get() {
        match ctx.pump(PUMP_INTERVAL) {
            Ok(Pump::Closed) => {
                info!("stdin closed, flushing pending input");
                while let Some(at) = ctx.next_deadline() {
                    ctx.tick(at);
                }
                break;
            }
            Ok(Pump::Delivered(_) | Pump::Idle) => {}
            Err(e) => {
                let _ = ctx.unmount();
                eprintln!("keytap: {e}");
                process::exit(1);
            }
        }
    }

    if let Err(e) = ctx.unmount() {
        eprintln!("keytap: failed to restore the terminal: {e}");
        process::exit(1);
    }
}
