//! 本地练习 - 流程层
//!
//! 对一组已经拿到手的题目逐题作答，本地判题，不经过作答接口

use crate::error::{AppResult, QuizError};
use crate::models::Mcq;
use crate::workflow::quiz_runner::mastery_message;

/// 一题的作答记录
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeAnswer {
    pub question: String,
    pub selected: String,
    pub is_correct: bool,
    pub correct_answer: Option<String>,
}

/// 练习汇总
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSummary {
    pub score: usize,
    pub total: usize,
    pub message: &'static str,
}

/// 本地练习
pub struct PracticeSession {
    mcqs: Vec<Mcq>,
    current: usize,
    answers: Vec<PracticeAnswer>,
}

impl PracticeSession {
    pub fn new(mcqs: Vec<Mcq>) -> Self {
        Self {
            mcqs,
            current: 0,
            answers: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.mcqs.len()
    }

    /// 当前题号，从 0 开始
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.mcqs.len()
    }

    pub fn current(&self) -> Option<&Mcq> {
        self.mcqs.get(self.current)
    }

    /// 当前题是否已经作答
    pub fn answered_current(&self) -> bool {
        self.answers.len() > self.current
    }

    pub fn answers(&self) -> &[PracticeAnswer] {
        &self.answers
    }

    /// 作答当前题
    pub fn answer(&mut self, option: &str) -> AppResult<&PracticeAnswer> {
        let mcq = self.mcqs.get(self.current).ok_or(QuizError::PracticeFinished)?;
        if self.answers.len() > self.current {
            return Err(QuizError::AlreadyAnswered {
                index: self.current + 1,
            }
            .into());
        }
        if !mcq.options.iter().any(|o| o == option) {
            return Err(QuizError::UnknownOption {
                option: option.to_string(),
            }
            .into());
        }

        self.answers.push(PracticeAnswer {
            question: mcq.question.clone(),
            selected: option.to_string(),
            is_correct: mcq.is_correct(option),
            correct_answer: mcq.answer.clone(),
        });
        Ok(&self.answers[self.answers.len() - 1])
    }

    /// 进入下一题，返回是否还有题
    pub fn next(&mut self) -> AppResult<bool> {
        if self.is_finished() {
            return Err(QuizError::PracticeFinished.into());
        }
        if !self.answered_current() {
            return Err(QuizError::InvalidTransition {
                state: "question-shown",
                action: "next",
            }
            .into());
        }
        self.current += 1;
        Ok(!self.is_finished())
    }

    pub fn summary(&self) -> PracticeSummary {
        let score = self.answers.iter().filter(|a| a.is_correct).count();
        PracticeSummary {
            score,
            total: self.mcqs.len(),
            message: mastery_message(score, self.mcqs.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::quiz_runner::{MASTERED_MESSAGE, REVIEW_MESSAGE};

    fn mcq(q: &str, answer: &str) -> Mcq {
        serde_json::from_value(serde_json::json!({
            "question": q,
            "options": ["A", "B", "C"],
            "answer": answer
        }))
        .unwrap()
    }

    #[test]
    fn scores_locally_and_reports_mastery() {
        let mut s = PracticeSession::new(vec![mcq("q1", "A"), mcq("q2", "C")]);
        assert!(s.answer("A").unwrap().is_correct);
        assert!(s.next().unwrap());
        let a = s.answer("B").unwrap();
        assert!(!a.is_correct);
        assert_eq!(a.correct_answer.as_deref(), Some("C"));
        assert!(!s.next().unwrap());
        assert!(s.is_finished());

        let summary = s.summary();
        assert_eq!((summary.score, summary.total), (1, 2));
        assert_eq!(summary.message, REVIEW_MESSAGE);
    }

    #[test]
    fn all_correct_is_mastered() {
        let mut s = PracticeSession::new(vec![mcq("q1", "B")]);
        s.answer("B").unwrap();
        s.next().unwrap();
        assert_eq!(s.summary().message, MASTERED_MESSAGE);
    }

    #[test]
    fn guards_against_misuse() {
        let mut s = PracticeSession::new(vec![mcq("q1", "A")]);
        assert!(s.next().is_err());
        assert!(s.answer("Z").is_err());
        s.answer("A").unwrap();
        assert!(matches!(
            s.answer("B"),
            Err(crate::error::AppError::Quiz(QuizError::AlreadyAnswered { index: 1 }))
        ));
        s.next().unwrap();
        assert!(matches!(
            s.answer("A"),
            Err(crate::error::AppError::Quiz(QuizError::PracticeFinished))
        ));
    }
}
