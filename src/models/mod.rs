pub mod attempt;
pub mod paper;
pub mod result;
pub mod state;

pub use attempt::{Attempt, ResumeData, ResumedAnswer, SaveAnswerRequest};
pub use paper::{total_questions, ChoiceOption, Question, Section, TestMeta};
pub use result::{ResultData, SectionResult};
pub use state::{Position, QuestionState, QuestionStatus};
