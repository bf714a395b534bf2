pub mod input;
pub mod panel;
pub mod render;
pub mod session;

pub use input::{Editor, Input, LineSource};
pub use panel::Panel;
pub use render::Renderer;
pub use session::{Exit, Session, SessionState, TurnOutcome, is_exit_command};

/// Process exit status for a finished session: 0 for any user-initiated end,
/// 1 when the session stopped on an error.
pub fn exit_status(result: &anyhow::Result<Exit>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
