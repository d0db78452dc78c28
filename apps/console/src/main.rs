mod config;
mod input;
mod render;

use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{HttpAdvisorBackend, SessionController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    input::{parse_line, to_events, ConsoleCommand, HELP},
    render::Renderer,
};

#[derive(Parser, Debug)]
#[command(about = "Terminal chat client for the student loan advisor")]
struct Args {
    /// Base URL of the advisor backend, e.g. http://localhost:8000
    #[arg(long)]
    api_base_url: Option<String>,
    /// Config file; defaults to ./advisor.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let backend = HttpAdvisorBackend::new(&settings.api_base_url, settings.request_timeout())?;
    info!(base_url = backend.base_url(), "using advisor backend");
    let mut controller = SessionController::new(Arc::new(backend));
    let mut renderer = Renderer::new(io::stdout());
    renderer.welcome()?;
    renderer.line("Type /help for commands.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !run_command(&mut controller, &mut renderer, parse_line(&line))? {
                    break;
                }
            }
            _ = controller.next_completion(), if controller.pending_calls() > 0 => {}
        }
        renderer.update(&controller.view())?;
    }

    if controller.pending_calls() > 0 {
        renderer.line("Waiting for outstanding replies...")?;
        controller.settle().await;
        renderer.update(&controller.view())?;
    }
    info!(session_id = %controller.session_id(), "session closed");
    Ok(())
}

/// Applies one console command. Returns `false` when the user asked to quit.
fn run_command(
    controller: &mut SessionController,
    renderer: &mut Renderer<io::Stdout>,
    command: ConsoleCommand,
) -> Result<bool> {
    match &command {
        ConsoleCommand::Quit => return Ok(false),
        ConsoleCommand::Help => renderer.line(HELP)?,
        ConsoleCommand::ShowForm => renderer.form(controller.view().form.as_ref())?,
        ConsoleCommand::Unknown(line) => renderer.notice(&format!("unknown command: {line}"))?,
        ConsoleCommand::Send if controller.state().request_state().any_in_flight() => {
            renderer.notice("Still waiting on a reply; your draft is kept.")?;
        }
        _ => {}
    }

    let opens_form = matches!(command, ConsoleCommand::OpenForm);
    let Some(events) = to_events(command, controller.view().input_enabled) else {
        renderer.notice("Still waiting on a reply; that line was dropped. Type it again once the reply arrives.")?;
        return Ok(true);
    };
    for event in events {
        if let Err(err) = controller.handle(event) {
            if !err.is_user_facing() {
                warn!(error = %err, "rejected console input");
            }
            renderer.notice(&err.to_string())?;
            break;
        }
    }
    if opens_form {
        renderer.form(controller.view().form.as_ref())?;
    }
    Ok(true)
}
