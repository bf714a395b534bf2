use abacus_cli::render::fatal_panel;
use abacus_cli::session::wait_for_interrupt;
use abacus_cli::{Editor, Renderer, Session, exit_status};
use abacus_core::{AgentLoop, Config, calculator_server, config, providers};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abacus")]
#[command(version, about = "abacus - a chat calculator that can add and subtract", long_about = None)]
struct Cli {}

async fn interactive_mode() -> Result<abacus_cli::Exit> {
    let config = Config::load_or_default()?;
    let provider = providers::create_provider(&config)?;

    let agent = AgentLoop::new(Arc::from(provider), Arc::new(calculator_server()))
        .with_max_iterations(config.max_iterations)
        .with_temperature(config.temperature)
        .with_pricing(config.pricing);

    let renderer = Renderer::stdout();
    let mut editor = Editor::new(Some(config::get_history_path()), renderer.is_styled())?;
    let mut session = Session::new(agent, renderer);

    session
        .run(&mut editor, || wait_for_interrupt(tokio::signal::ctrl_c()))
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = interactive_mode().await;
    if let Err(e) = &result {
        eprintln!("{}", fatal_panel(e));
    }
    ExitCode::from(exit_status(&result))
}
