// strqueue: run a queue command script, then replay it in the TUI

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use strqueue::constants::{DEFAULT_HEAP_LIMIT, DEFAULT_SNAPSHOT_LIMIT};
use strqueue::memory::heap::Heap;
use strqueue::shell::Session;
use strqueue::ui::App;

/// Command-line options
struct Options {
    script: String,
    batch: bool,
    heap_limit: usize,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} [--batch] [--heap-limit BYTES] <script.cmd>", program_name);
    eprintln!();
    eprintln!("  --batch             print the session output instead of opening the TUI");
    eprintln!("  --heap-limit BYTES  ledger limit (default {})", DEFAULT_HEAP_LIMIT);
    eprintln!("                      raise it for traces with millions of elements");
    eprintln!();
    eprintln!("Script commands: new, free, ih, it, rh, rhq, size, reverse, sort, show, fail, help, quit");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut script = None;
    let mut batch = false;
    let mut heap_limit = DEFAULT_HEAP_LIMIT;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--batch" => batch = true,
            "--heap-limit" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--heap-limit needs a value".to_string())?;
                heap_limit = value
                    .parse()
                    .map_err(|_| format!("invalid heap limit '{}'", value))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            path => {
                if script.replace(path.to_string()).is_some() {
                    return Err("only one script may be given".to_string());
                }
            }
        }
    }

    Ok(Options {
        script: script.ok_or_else(|| "no script provided".to_string())?,
        batch,
        heap_limit,
    })
}

/// Log to stderr; the TUI keeps logging off unless RUST_LOG asks for it
fn init_logging(batch: bool) {
    let default = if batch { "warn" } else { "off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("strqueue");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            usage(program_name);
            std::process::exit(1);
        }
    };

    init_logging(options.batch);

    if !Path::new(&options.script).exists() {
        eprintln!("Error: File '{}' not found", options.script);
        std::process::exit(1);
    }

    let script = fs::read_to_string(&options.script)?;

    eprintln!("Running {}...", options.script);
    let mut session = match Session::new(Heap::new(options.heap_limit), DEFAULT_SNAPSHOT_LIMIT) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    session.run_script(&script);
    eprintln!(
        "Finished with {} error(s); {} snapshot(s) recorded.",
        session.error_count(),
        session.total_snapshots()
    );
    if session.evicted_snapshots() > 0 {
        eprintln!(
            "{} early snapshot(s) dropped to stay under the history limit.",
            session.evicted_snapshots()
        );
    }

    if options.batch {
        for line in session.terminal().get_output() {
            println!("{}", line);
        }
        if session.error_count() > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Replay from the first snapshot
    session.rewind_to_start();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, script);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
