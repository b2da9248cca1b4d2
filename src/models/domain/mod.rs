pub mod document;
pub mod quiz;
pub mod quiz_question;
pub mod result_report;
pub use document::{Document, DocumentKind};
pub use quiz::Quiz;
pub use quiz_question::{Difficulty, QuizQuestion};
pub use result_report::{QuestionResult, ResultReport};
