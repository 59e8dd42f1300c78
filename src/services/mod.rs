pub mod attempt_service;
pub mod course_service;
pub mod graph_service;
pub mod lecture_service;
pub mod mcq_service;
pub mod quiz_service;
pub mod result_writer;
pub mod stats_service;

pub use attempt_service::AttemptService;
pub use course_service::CourseService;
pub use graph_service::GraphService;
pub use lecture_service::LectureService;
pub use mcq_service::{fetch_or_generate_from, McqService, McqSource};
pub use quiz_service::QuizService;
pub use result_writer::ResultWriter;
pub use stats_service::StatsService;
