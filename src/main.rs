//! Stokes - a terminal viewer for HDF5 / netCDF-4 containers.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use stokes::app::{App, Focus};
use stokes::attributes::Bucket;
use stokes::config::{Theme, ViewerConfig};
use stokes::data::NetcdfOpener;
use stokes::plot::ColorScale;
use stokes::ui;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "stokes")]
#[command(about = "A terminal viewer for HDF5 / netCDF-4 containers", long_about = None)]
struct Args {
    /// Path to the container file to open
    file: Option<PathBuf>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Color theme
    #[arg(long, value_enum, default_value_t = Theme::GruvboxDark)]
    theme: Theme,

    /// Initial heatmap color scale
    #[arg(long, value_enum, default_value_t = ColorScale::Viridis)]
    color_scale: ColorScale,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting Stokes");
    }

    // Validate path if provided
    if let Some(ref path) = args.file {
        if !path.is_file() {
            eprintln!("Error: File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let config = ViewerConfig {
        theme: args.theme,
        color_scale: args.color_scale,
        ..ViewerConfig::default()
    };
    let mut app = App::new(Box::new(NetcdfOpener), config);
    if let Some(ref path) = args.file {
        if let Err(e) = app.open_path(path) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    if args.log.is_some() {
        tracing::info!("Stokes exited");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let mut pending_g = false; // For 'gg' vim binding

    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        // Queued backend work runs between key presses
        let timeout = if app.has_pending() {
            Duration::ZERO
        } else {
            Duration::from_millis(100)
        };
        if !event::poll(timeout)? {
            app.run_pending();
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Open-file prompt
        if app.prompt.is_some() {
            match key.code {
                KeyCode::Enter => app.submit_prompt(),
                KeyCode::Esc => app.cancel_prompt(),
                KeyCode::Backspace => app.prompt_pop(),
                KeyCode::Char(c) => app.prompt_push(c),
                _ => {},
            }
            continue;
        }

        // Plot overlay
        if app.plot.visible {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('q')) => {
                    app.close_plot();
                },
                (KeyModifiers::NONE, KeyCode::Char('m')) => app.toggle_plot_mode(),
                (_, KeyCode::Char('+')) | (KeyModifiers::NONE, KeyCode::Char('=')) => {
                    app.next_plot_row();
                },
                (KeyModifiers::NONE, KeyCode::Char('-')) => app.prev_plot_row(),
                (KeyModifiers::NONE, KeyCode::Char('c')) => app.cycle_color_scale(),
                _ => {},
            }
            continue;
        }

        match (key.modifiers, key.code) {
            // Quit
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(()),

            // Navigation
            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                match app.focus {
                    Focus::Tree => app.cursor_up(),
                    Focus::Attributes => app.attribute_up(),
                }
            },
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                match app.focus {
                    Focus::Tree => app.cursor_down(),
                    Focus::Attributes => app.attribute_down(),
                }
            },
            (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                app.collapse_current();
            },
            (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                app.expand_current();
            },

            // Vim navigation
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                if pending_g {
                    app.goto_first();
                    pending_g = false;
                } else {
                    pending_g = true;
                }
                continue;
            },
            (KeyModifiers::SHIFT, KeyCode::Char('G')) => app.goto_last(),

            // Details pane
            (KeyModifiers::NONE, KeyCode::Tab) => app.toggle_focus(),
            (KeyModifiers::NONE, KeyCode::Char('1')) => app.set_tab(Bucket::Measure),
            (KeyModifiers::NONE, KeyCode::Char('2')) => app.set_tab(Bucket::Spectrometer),
            (KeyModifiers::NONE, KeyCode::Char('3')) => app.set_tab(Bucket::Other),
            (KeyModifiers::NONE, KeyCode::Enter) | (KeyModifiers::NONE, KeyCode::Char(' ')) => {
                match app.focus {
                    Focus::Tree => app.toggle_current(),
                    Focus::Attributes => app.toggle_attribute(),
                }
            },
            (KeyModifiers::CONTROL, KeyCode::Char('d'))
            | (KeyModifiers::SHIFT, KeyCode::Char('J')) => app.explorer.scroll_down(),
            (KeyModifiers::CONTROL, KeyCode::Char('u'))
            | (KeyModifiers::SHIFT, KeyCode::Char('K')) => app.explorer.scroll_up(),

            // Features
            (KeyModifiers::NONE, KeyCode::Char('p')) => app.open_plot(),
            (KeyModifiers::NONE, KeyCode::Char('o')) => app.start_prompt(),
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => app.cycle_theme(),

            _ => {},
        }
        pending_g = false;
    }
}
