pub mod attempt;
pub mod course;
pub mod graph;
pub mod lecture;
pub mod loaders;
pub mod mcq;
pub mod quiz;

pub use attempt::{
    AnswerFeedback, AnswerSubmission, AttemptResult, AttemptStarted, LiveEvent, LiveStats,
    NextQuestion, SubmissionEvent, SubmissionSummary,
};
pub use course::{Course, Enrollment, Module};
pub use graph::{Concept, Edge, KnowledgeGraph};
pub use lecture::{JobStatus, ProcessingJob, Segment, SegmentDetail};
pub use loaders::{load_all_settings_presets, load_settings_preset};
pub use mcq::{BloomLevel, Difficulty, GraphGenerateRequest, Mcq, McqDraft, RawGenerateRequest};
pub use quiz::{FeedbackStyle, NewQuiz, Quiz, QuizDraft, QuizSettings};
