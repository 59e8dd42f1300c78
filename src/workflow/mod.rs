pub mod graph_view;
pub mod live_dashboard;
pub mod practice;
pub mod quiz_ctx;
pub mod quiz_runner;

pub use graph_view::{radial_layout, ConceptGraphView, ExpandOutcome, Position, VisibleGraph};
pub use live_dashboard::LiveDashboard;
pub use practice::{PracticeAnswer, PracticeSession, PracticeSummary};
pub use quiz_ctx::AttemptCtx;
pub use quiz_runner::{QuizBackend, QuizRunner, QuizState, QuizSummary};
