use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::mcq::{BloomLevel, Difficulty};

/// 测验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub concept_ids: Vec<String>,
}

/// 反馈方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStyle {
    /// 显示正确答案
    ShowAnswer,
    /// 只给提示
    HintOnly,
}

/// 测验设置
///
/// 所有可选字段为空时表示使用后端默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default, serialize_with = "lowercase_opt")]
    pub min_difficulty: Option<Difficulty>,
    #[serde(default, serialize_with = "lowercase_opt")]
    pub max_difficulty: Option<Difficulty>,
    #[serde(default)]
    pub min_bloom: Option<BloomLevel>,
    #[serde(default)]
    pub max_bloom: Option<BloomLevel>,
    #[serde(default)]
    pub max_questions: Option<u32>,
    #[serde(default)]
    pub allowed_retries: Option<u32>,
    #[serde(default)]
    pub feedback_style: Option<FeedbackStyle>,
    #[serde(default)]
    pub include_spaced: bool,
}

/// 测验设置里的难度沿用后端的小写写法
fn lowercase_opt<S: Serializer>(value: &Option<Difficulty>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.as_str().to_ascii_lowercase()),
        None => serializer.serialize_none(),
    }
}

impl QuizSettings {
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(min), Some(max)) = (self.min_difficulty, self.max_difficulty) {
            if min > max {
                return Err(AppError::invalid_settings(format!(
                    "最低难度 {} 高于最高难度 {}",
                    min, max
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_bloom, self.max_bloom) {
            if min > max {
                return Err(AppError::invalid_settings(format!(
                    "最低布鲁姆层级 {} 高于最高层级 {}",
                    min, max
                )));
            }
        }
        if self.max_questions == Some(0) {
            return Err(AppError::invalid_settings("每次测验至少一道题"));
        }
        Ok(())
    }
}

/// 创建测验的表单数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuiz {
    pub name: String,
    pub course_id: String,
    pub week: u32,
    pub instructor_id: String,
    pub concept_ids: Vec<String>,
}

/// 创建测验时的草稿：名称 + 勾选的知识点
#[derive(Debug, Clone, Default)]
pub struct QuizDraft {
    pub name: String,
    selected: Vec<String>,
}

impl QuizDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selected: Vec::new(),
        }
    }

    /// 勾选或取消勾选一个知识点，返回操作后是否处于选中状态
    pub fn toggle(&mut self, concept_id: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|c| c == concept_id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(concept_id.to_string());
            true
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// 校验并生成表单
    pub fn build(&self, course_id: &str, week: u32, instructor_id: &str) -> AppResult<NewQuiz> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BusinessError::EmptyQuizName.into());
        }
        if self.selected.is_empty() {
            return Err(BusinessError::NoConceptsSelected.into());
        }
        Ok(NewQuiz {
            name: name.to_string(),
            course_id: course_id.to_string(),
            week,
            instructor_id: instructor_id.to_string(),
            concept_ids: self.selected.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_serialize_like_the_backend_expects() {
        let settings = QuizSettings {
            week: Some(3),
            min_difficulty: Some(Difficulty::Easy),
            max_difficulty: Some(Difficulty::Hard),
            feedback_style: Some(FeedbackStyle::HintOnly),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["min_difficulty"], "easy");
        assert_eq!(json["max_difficulty"], "hard");
        assert_eq!(json["feedback_style"], "hint_only");
        assert_eq!(json["max_questions"], serde_json::Value::Null);
        assert_eq!(json["include_spaced"], false);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let settings = QuizSettings {
            min_difficulty: Some(Difficulty::Hard),
            max_difficulty: Some(Difficulty::Easy),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = QuizSettings {
            min_bloom: Some(BloomLevel::Create),
            max_bloom: Some(BloomLevel::Apply),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = QuizSettings {
            max_questions: Some(0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn draft_toggle_and_build() {
        let mut draft = QuizDraft::new("  Practice: Command Line Args ");
        assert!(draft.toggle("argv"));
        assert!(draft.toggle("argc"));
        assert!(!draft.toggle("argv"));
        assert_eq!(draft.selected(), &["argc".to_string()]);

        let quiz = draft.build("c1", 2, "inst-1").unwrap();
        assert_eq!(quiz.name, "Practice: Command Line Args");
        assert_eq!(quiz.concept_ids, vec!["argc".to_string()]);
    }

    #[test]
    fn draft_requires_name_and_concepts() {
        let mut draft = QuizDraft::new("   ");
        draft.toggle("argv");
        assert!(matches!(
            draft.build("c1", 1, "i"),
            Err(AppError::Business(BusinessError::EmptyQuizName))
        ));

        let draft = QuizDraft::new("Quiz");
        assert!(matches!(
            draft.build("c1", 1, "i"),
            Err(AppError::Business(BusinessError::NoConceptsSelected))
        ));
    }
}
