/// Seed system message built from the reading guide.
pub mod context;
/// Append-only transcript and display derivation.
pub mod history;
pub mod message;
pub mod render;
pub mod session;

pub use context::{
    ContextBuilder, ContextError, ContextResult, GUIDE_FILE_NAME, default_guide_path,
    render_context,
};
pub use history::{ConversationHistory, assistant_display, contents_by_role, user_display};
pub use message::{Message, Role};
pub use render::{Bubble, render_transcript};
pub use session::{ChatSession, CompletionProfile, SessionError, SessionResult, SubmitOutcome};
