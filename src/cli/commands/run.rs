use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{capabilities, load_configured_manifest, shell_options};
use crate::config::Config;
use crate::shell::Shell;
use crate::tui::Theme;

const FRAME: Duration = Duration::from_millis(16);

pub async fn run_command(config: &Config) -> Result<()> {
    let manifest = Arc::new(load_configured_manifest(config)?);
    let theme = Theme::new(config.ui.theme).with_brand(manifest.app.theme.primary_color.as_deref());
    let mut shell = Shell::new(manifest, capabilities(config), shell_options(config));

    launch_tui(&mut shell, &theme).await
}

async fn launch_tui(shell: &mut Shell, theme: &Theme) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui(&mut terminal, shell, theme).await;

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Shell exited");
    result
}

async fn run_tui<B: Backend>(terminal: &mut Terminal<B>, shell: &mut Shell, theme: &Theme) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Drain pending input first for minimal latency
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    shell.handle_key(key);
                }
            }
            if shell.should_quit() {
                return Ok(());
            }
        }

        shell.poll_completions();
        if shell.should_quit() {
            return Ok(());
        }

        terminal.draw(|frame| shell.render(frame, theme))?;

        if let Some(remaining) = FRAME.checked_sub(frame_start.elapsed()) {
            tokio::time::sleep(remaining).await;
        }
    }
}
