use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{eyre, WrapErr};
use tracing_subscriber::EnvFilter;

use tuiselect::{FilterPosition, MatchMode, OptionsDocument, Select, SelectValue};

mod app;
mod ui;
mod widgets;

use app::App;

/// Interactive dropdown select for the terminal. Prints the chosen value as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON options document (an array, or an object with `options`)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// A plain option value; repeat for more
    #[arg(long = "option", value_name = "VALUE")]
    options: Vec<String>,

    /// Allow selecting several values
    #[arg(long)]
    multiple: bool,

    /// Filter the list by typed text
    #[arg(long)]
    filter: bool,

    /// Match the filter text without regard to case
    #[arg(long)]
    ignore_case: bool,

    /// Use fuzzy matching instead of substring matching
    #[arg(long)]
    fuzzy: bool,

    /// Offer the typed text as a new option
    #[arg(long)]
    creatable: bool,

    /// Keep selected values that are not in the option list
    #[arg(long)]
    remote: bool,

    /// Maximum number of selected values in multiple mode
    #[arg(long)]
    count_limit: Option<usize>,

    /// Show a button that clears the selection
    #[arg(long)]
    clearable: bool,

    /// Put the filter input at the top of the list instead of in the control
    #[arg(long)]
    in_list_filter: bool,

    /// Initial value as JSON, e.g. '"Apple"' or '["Apple", 3]'
    #[arg(long)]
    value: Option<String>,

    /// Write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Generate usage spec for this tool
    #[arg(long)]
    usage: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    if args.usage {
        let mut cmd = Args::command();
        let bin_name = std::env::args()
            .next()
            .unwrap_or_else(|| "tuiselect".to_string());
        let mut buf = Vec::new();
        clap_usage::generate(&mut cmd, bin_name, &mut buf);
        print!("{}", String::from_utf8_lossy(&buf));
        return Ok(());
    }

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let (doc, title) = match (&args.file, args.options.is_empty()) {
        (Some(_), false) => {
            return Err(eyre!(
                "Cannot specify both --file and --option. Use --help for usage information."
            ));
        }
        (None, true) => {
            return Err(eyre!(
                "Must specify either --file or --option. Use --help for usage information."
            ));
        }
        (Some(path), true) => {
            let doc = OptionsDocument::from_path(path)
                .wrap_err_with(|| format!("Failed to load options from '{}'", path.display()))?;
            let title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "select".to_string());
            (doc, title)
        }
        (None, false) => {
            let options = args
                .options
                .iter()
                .map(|option| serde_json::Value::String(option.clone()))
                .collect();
            (
                OptionsDocument {
                    options,
                    key_config: None,
                    value: SelectValue::None,
                    config: None,
                },
                "select".to_string(),
            )
        }
    };

    let select = build_select(&args, doc)?;
    tracing::info!(title = %title, "starting");

    // Enable mouse capture before initializing the terminal
    crossterm::execute!(std::io::stderr(), crossterm::event::EnableMouseCapture)?;

    let mut terminal = ratatui::init();
    let mut app = App::new(select, title);
    let result = run_event_loop(&mut terminal, &mut app);

    ratatui::restore();
    crossterm::execute!(std::io::stderr(), crossterm::event::DisableMouseCapture)?;

    match result {
        Ok(Some(value)) => {
            println!("{value}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Layer the command-line switches over the document's own config.
fn build_select(args: &Args, doc: OptionsDocument) -> color_eyre::Result<Select> {
    let mut config = doc.config.unwrap_or_default();
    if let Some(keys) = doc.key_config {
        config.key_config = keys;
    }
    config.multiple |= args.multiple;
    config.filter |= args.filter;
    config.ignore_case |= args.ignore_case;
    config.creatable |= args.creatable;
    config.remote |= args.remote;
    config.clearable |= args.clearable;
    if args.fuzzy {
        config.match_mode = MatchMode::Fuzzy;
    }
    if args.in_list_filter {
        config.filter_position = FilterPosition::InList;
    }
    if let Some(limit) = args.count_limit {
        config.count_limit = limit;
    }

    let value = match args.value {
        Some(ref raw) => {
            let json: serde_json::Value = serde_json::from_str(raw)
                .wrap_err_with(|| format!("Invalid --value JSON '{raw}'"))?;
            SelectValue::from_json(&json)
        }
        None => doc.value,
    };

    let mut select = Select::new(config);
    select.set_options(doc.options);
    select.set_value(value);
    Ok(select)
}

fn init_logging(path: &Path) -> color_eyre::Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create log file '{}'", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tuiselect=debug")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> color_eyre::Result<Option<String>> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;
        app.run_frame();

        // Deferred work scheduled by the last frame needs another draw soon.
        if app.select.has_pending_frame() && !event::poll(Duration::from_millis(16))? {
            continue;
        }

        let action = match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return Ok(None);
                }

                app.handle_key(key)
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => app::Action::None,
        };

        match action {
            app::Action::None => {}
            app::Action::Quit => return Ok(None),
            app::Action::Accept => {
                app.select.blur();
                let value = app.select.value().to_json();
                return Ok(Some(serde_json::to_string(&value)?));
            }
        }
    }
}
