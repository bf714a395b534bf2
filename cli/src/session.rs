//! The interactive read / dispatch / render loop.

use crate::input::{Input, LineSource};
use crate::render::Renderer;
use abacus_core::AgentRuntime;
use abacus_core::error::is_fatal;
use anyhow::Result;
use futures_util::StreamExt;
use std::future::Future;
use std::pin::pin;
use tracing::{debug, warn};

/// Lines that end the session, compared case-insensitively.
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

pub fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user.
    Idle,
    /// Text handed to the runtime, nothing received yet.
    Dispatching,
    /// Rendering events as they arrive.
    Streaming,
    Closed,
}

/// Why the session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Interrupted,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Interrupted,
    /// A recoverable error was shown; the session goes on.
    Failed,
}

/// Resolves when `signal` reports a delivered interrupt. If the listener
/// could not be installed it never resolves, so turns run to completion.
pub async fn wait_for_interrupt(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    if *state != next {
        debug!("Session {:?} -> {:?}", state, next);
        *state = next;
    }
}

/// One runtime connection reused across every turn, so the conversation
/// builds up.
pub struct Session<R> {
    runtime: R,
    renderer: Renderer,
    state: SessionState,
}

impl<R: AgentRuntime> Session<R> {
    pub fn new(runtime: R, renderer: Renderer) -> Self {
        Self {
            runtime,
            renderer,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Runs until the user leaves or a fatal error occurs. `interrupt` is
    /// called once per turn; when its future resolves the turn is abandoned.
    pub async fn run<L, F, Fut>(&mut self, input: &mut L, interrupt: F) -> Result<Exit>
    where
        L: LineSource,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let result = self.run_loop(input, interrupt).await;
        transition(&mut self.state, SessionState::Closed);
        input.save_history();
        result
    }

    async fn run_loop<L, F, Fut>(&mut self, input: &mut L, mut interrupt: F) -> Result<Exit>
    where
        L: LineSource,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.renderer.welcome()?;

        loop {
            transition(&mut self.state, SessionState::Idle);
            self.renderer.blank_line()?;

            let line = match input.read_line()? {
                Input::Line(line) => line,
                Input::Interrupted => {
                    self.renderer.goodbye(true)?;
                    return Ok(Exit::Interrupted);
                }
                Input::Eof => {
                    self.renderer.goodbye(false)?;
                    return Ok(Exit::EndOfInput);
                }
            };

            let line = line.trim();
            if is_exit_command(line) {
                self.renderer.goodbye(false)?;
                return Ok(Exit::Quit);
            }
            if line.is_empty() {
                continue;
            }

            input.add_history(line);
            self.run_turn(line, interrupt()).await?;
        }
    }

    /// Sends one line to the runtime and renders its reply.
    ///
    /// Recoverable failures are shown and reported as
    /// [`TurnOutcome::Failed`]; fatal ones are returned as errors.
    pub async fn run_turn(
        &mut self,
        prompt: &str,
        interrupt: impl Future<Output = ()>,
    ) -> Result<TurnOutcome> {
        transition(&mut self.state, SessionState::Dispatching);
        self.renderer.spinner_start();

        let mut interrupt = pin!(interrupt);
        let mut stream = self.runtime.query(prompt);

        let outcome = loop {
            tokio::select! {
                event = stream.next() => match event {
                    Some(Ok(event)) => {
                        transition(&mut self.state, SessionState::Streaming);
                        self.renderer.spinner_stop();
                        self.renderer.event(&event)?;
                        if !event.is_final() {
                            self.renderer.spinner_start();
                        }
                    }
                    Some(Err(e)) => {
                        self.renderer.spinner_stop();
                        if is_fatal(&e) {
                            return Err(e);
                        }
                        self.renderer.error(&e)?;
                        break TurnOutcome::Failed;
                    }
                    None => break TurnOutcome::Completed,
                },
                _ = &mut interrupt => {
                    self.renderer.spinner_stop();
                    self.renderer.turn_interrupted()?;
                    break TurnOutcome::Interrupted;
                }
            }
        };

        drop(stream);
        self.renderer.spinner_stop();
        transition(&mut self.state, SessionState::Idle);
        debug!("Turn finished: {:?}", outcome);
        Ok(outcome)
    }
}
