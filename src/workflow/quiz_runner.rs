//! 自适应测验 - 流程层
//!
//! 状态机：
//!
//! ```text
//! NotStarted --start--> QuestionShown --submit--> AnswerSubmitted
//!                            ^                         |
//!                            +--------retry------------+   (答错且后端允许重试)
//!                                                      |
//!                              QuestionShown <--advance--+--> Finished
//! ```
//!
//! 判题、提示、重试次数都由后端决定，本地只记录作答ID、当前题号和统计

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AppResult, QuizError};
use crate::models::{
    AnswerFeedback, AnswerSubmission, AttemptResult, AttemptStarted, Mcq, NextQuestion,
};
use crate::workflow::quiz_ctx::AttemptCtx;

/// 全部答对时的提示
pub const MASTERED_MESSAGE: &str = "Excellent! You've mastered this concept.";
/// 未全部答对时的提示
pub const REVIEW_MESSAGE: &str = "Review this concept and try again for mastery!";
/// 没有题目时的提示
pub const EMPTY_MESSAGE: &str = "No quiz available for this concept.";

/// 汇总提示语
pub fn mastery_message(correct: usize, total: usize) -> &'static str {
    if total == 0 {
        EMPTY_MESSAGE
    } else if correct == total {
        MASTERED_MESSAGE
    } else {
        REVIEW_MESSAGE
    }
}

/// 作答相关的后端能力
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn start_attempt(&self, quiz_id: &str, student_id: &str) -> AppResult<AttemptStarted>;

    async fn next_question(&self, attempt_id: &str) -> AppResult<NextQuestion>;

    async fn submit_answer(
        &self,
        attempt_id: &str,
        submission: &AnswerSubmission,
    ) -> AppResult<AnswerFeedback>;

    async fn finish_attempt(&self, attempt_id: &str) -> AppResult<AttemptResult>;
}

/// 测验结束后的本地统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizSummary {
    pub attempt_id: Option<String>,
    /// 作答过的题目数
    pub answered: usize,
    /// 最终答对的题目数
    pub correct: usize,
    /// 第一次就答对的题目数
    pub first_try_correct: usize,
    /// 使用的重试次数
    pub retries_used: usize,
    /// 后端给出的最终成绩
    pub server_result: Option<AttemptResult>,
}

impl QuizSummary {
    pub fn mastered(&self) -> bool {
        self.answered > 0 && self.correct == self.answered
    }

    pub fn message(&self) -> &'static str {
        mastery_message(self.correct, self.answered)
    }
}

/// 测验状态
#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    NotStarted,
    QuestionShown {
        question: Mcq,
        /// 题号，从 0 开始
        index: usize,
        /// 本题第几次作答，从 1 开始
        attempt_no: u32,
    },
    AnswerSubmitted {
        question: Mcq,
        index: usize,
        attempt_no: u32,
        selected: String,
        feedback: AnswerFeedback,
    },
    Finished(QuizSummary),
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::NotStarted => "not-started",
            QuizState::QuestionShown { .. } => "question-shown",
            QuizState::AnswerSubmitted { .. } => "answer-submitted",
            QuizState::Finished(_) => "finished",
        }
    }

    fn reject(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            state: self.name(),
            action,
        }
    }
}

/// 自适应测验执行器
pub struct QuizRunner<B: QuizBackend> {
    backend: B,
    ctx: AttemptCtx,
    state: QuizState,
    total: Option<usize>,
    tally: QuizSummary,
}

impl<B: QuizBackend> QuizRunner<B> {
    pub fn new(backend: B, quiz_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            backend,
            ctx: AttemptCtx::new(quiz_id, student_id),
            state: QuizState::NotStarted,
            total: None,
            tally: QuizSummary::default(),
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn ctx(&self) -> &AttemptCtx {
        &self.ctx
    }

    /// 后端告知的题目总数
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished(_))
    }

    /// 当前是否可以重试本题
    pub fn can_retry(&self) -> bool {
        matches!(
            &self.state,
            QuizState::AnswerSubmitted { feedback, .. } if !feedback.correct && feedback.can_retry
        )
    }

    /// 开始作答并拉取第一题
    ///
    /// 若上次已开启作答但第一题没拉到，沿用同一个作答，不再新开
    pub async fn start(&mut self) -> AppResult<&QuizState> {
        if !matches!(self.state, QuizState::NotStarted) {
            return Err(self.state.reject("start").into());
        }

        if self.ctx.attempt_id.is_none() {
            let started = self
                .backend
                .start_attempt(&self.ctx.quiz_id, &self.ctx.student_id)
                .await?;
            self.ctx.attempt_id = Some(started.attempt_id.clone());
            self.tally.attempt_id = Some(started.attempt_id);
            self.total = started.total;
            info!("{} ▶️ 开始作答", self.ctx);
        } else {
            info!("{} 🔁 继续未完成的作答", self.ctx);
        }

        self.load_next(0).await?;
        Ok(&self.state)
    }

    /// 提交当前题目的答案
    pub async fn submit(&mut self, option: &str) -> AppResult<AnswerFeedback> {
        let (question, index, attempt_no) = match &self.state {
            QuizState::QuestionShown {
                question,
                index,
                attempt_no,
            } => (question.clone(), *index, *attempt_no),
            other => return Err(other.reject("submit").into()),
        };

        if !question.options.iter().any(|o| o == option) {
            return Err(QuizError::UnknownOption {
                option: option.to_string(),
            }
            .into());
        }

        let attempt_id = self.attempt_id()?;
        let submission = AnswerSubmission {
            mcq_id: question.id.clone(),
            selected: option.to_string(),
        };
        let feedback = self.backend.submit_answer(&attempt_id, &submission).await?;

        if attempt_no == 1 {
            self.tally.answered += 1;
        }
        if feedback.correct {
            self.tally.correct += 1;
            if attempt_no == 1 {
                self.tally.first_try_correct += 1;
            }
        }
        debug!(
            "{} 第 {} 题第 {} 次作答: {}",
            self.ctx,
            index + 1,
            attempt_no,
            if feedback.correct { "正确" } else { "错误" }
        );

        self.state = QuizState::AnswerSubmitted {
            question,
            index,
            attempt_no,
            selected: option.to_string(),
            feedback: feedback.clone(),
        };
        Ok(feedback)
    }

    /// 答错后重做本题
    pub fn retry(&mut self) -> AppResult<()> {
        let (question, index, attempt_no) = match &self.state {
            QuizState::AnswerSubmitted {
                question,
                index,
                attempt_no,
                feedback,
                ..
            } => {
                if feedback.correct {
                    return Err(self.state.reject("retry").into());
                }
                if !feedback.can_retry {
                    return Err(QuizError::NoRetriesLeft.into());
                }
                (question.clone(), *index, *attempt_no)
            }
            other => return Err(other.reject("retry").into()),
        };

        self.tally.retries_used += 1;
        self.state = QuizState::QuestionShown {
            question,
            index,
            attempt_no: attempt_no + 1,
        };
        Ok(())
    }

    /// 进入下一题或结束
    pub async fn advance(&mut self) -> AppResult<&QuizState> {
        let index = match &self.state {
            QuizState::AnswerSubmitted { index, .. } => *index,
            other => return Err(other.reject("advance").into()),
        };
        self.load_next(index + 1).await?;
        Ok(&self.state)
    }

    async fn load_next(&mut self, expected_index: usize) -> AppResult<()> {
        let attempt_id = self.attempt_id()?;
        let next = self.backend.next_question(&attempt_id).await?;
        if next.total.is_some() {
            self.total = next.total;
        }

        match next.question {
            Some(question) if !next.done => {
                self.state = QuizState::QuestionShown {
                    question,
                    index: next.index.unwrap_or(expected_index),
                    attempt_no: 1,
                };
            }
            _ => {
                let result = self.backend.finish_attempt(&attempt_id).await?;
                let mut summary = self.tally.clone();
                summary.server_result = Some(result);
                info!(
                    "{} 🏁 作答结束: {}/{}",
                    self.ctx, summary.correct, summary.answered
                );
                self.state = QuizState::Finished(summary);
            }
        }
        Ok(())
    }

    fn attempt_id(&self) -> AppResult<String> {
        self.ctx
            .attempt_id
            .clone()
            .ok_or_else(|| self.state.reject("use-attempt").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_messages() {
        assert_eq!(mastery_message(3, 3), MASTERED_MESSAGE);
        assert_eq!(mastery_message(2, 3), REVIEW_MESSAGE);
        assert_eq!(mastery_message(0, 0), EMPTY_MESSAGE);
    }

    #[test]
    fn summary_mastered_requires_answers() {
        let summary = QuizSummary::default();
        assert!(!summary.mastered());
        let summary = QuizSummary {
            answered: 2,
            correct: 2,
            ..Default::default()
        };
        assert!(summary.mastered());
    }
}
