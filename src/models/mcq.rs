use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// 题目难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// 布鲁姆认知层级，按认知复杂度从低到高排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BloomLevel {
    #[default]
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomLevel {
    pub const ALL: [BloomLevel; 6] = [
        BloomLevel::Remember,
        BloomLevel::Understand,
        BloomLevel::Apply,
        BloomLevel::Analyze,
        BloomLevel::Evaluate,
        BloomLevel::Create,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloomLevel::Remember => "Remember",
            BloomLevel::Understand => "Understand",
            BloomLevel::Apply => "Apply",
            BloomLevel::Analyze => "Analyze",
            BloomLevel::Evaluate => "Evaluate",
            BloomLevel::Create => "Create",
        }
    }
}

/// 后端大小写不统一（"easy" / "Easy"），解析时忽略大小写
macro_rules! case_insensitive_enum {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> AppResult<Self> {
                let wanted = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| AppError::invalid_mcq(format!("未知的{}: {}", $what, s)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

case_insensitive_enum!(Difficulty, "难度");
case_insensitive_enum!(BloomLevel, "布鲁姆层级");

/// 选择题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mcq {
    /// 生成接口返回的题目可能还没有入库，因此没有 id
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub bloom_level: BloomLevel,
    #[serde(default)]
    pub concept_id: Option<String>,
}

impl Mcq {
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer.as_deref() == Some(option)
    }

    /// 选项字母，A 开始
    pub fn option_letter(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }
}

/// 题目编辑草稿
///
/// 修改选项文字时，如果该选项正是答案，答案同步更新
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqDraft {
    pub question: String,
    pub options: Vec<String>,
    pub answer: Option<String>,
    pub difficulty: Difficulty,
    pub bloom_level: BloomLevel,
}

impl From<&Mcq> for McqDraft {
    fn from(mcq: &Mcq) -> Self {
        Self {
            question: mcq.question.clone(),
            options: mcq.options.clone(),
            answer: mcq.answer.clone(),
            difficulty: mcq.difficulty,
            bloom_level: mcq.bloom_level,
        }
    }
}

impl McqDraft {
    /// 修改第 `index` 个选项的文字
    pub fn rename_option(&mut self, index: usize, text: impl Into<String>) -> AppResult<()> {
        let text = text.into();
        let slot = self.options.get_mut(index).ok_or_else(|| {
            AppError::invalid_mcq(format!("选项序号 {} 超出范围", index))
        })?;
        let was_answer = self.answer.as_deref() == Some(slot.as_str());
        *slot = text.clone();
        if was_answer {
            self.answer = Some(text);
        }
        Ok(())
    }

    /// 把第 `index` 个选项设为正确答案
    pub fn set_answer(&mut self, index: usize) -> AppResult<()> {
        let opt = self.options.get(index).ok_or_else(|| {
            AppError::invalid_mcq(format!("选项序号 {} 超出范围", index))
        })?;
        self.answer = Some(opt.clone());
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.question.trim().is_empty() {
            return Err(AppError::invalid_mcq("题干不能为空"));
        }
        if self.options.len() < 2 {
            return Err(AppError::invalid_mcq("至少需要两个选项"));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::invalid_mcq("选项不能为空"));
        }
        match &self.answer {
            Some(ans) if self.options.contains(ans) => Ok(()),
            _ => Err(AppError::invalid_mcq("答案必须是选项之一")),
        }
    }
}

/// 基于课件原文生成题目的请求
#[derive(Debug, Clone, Serialize)]
pub struct RawGenerateRequest {
    pub course_id: String,
    pub week: u32,
    pub concept_id: String,
    pub summary: String,
    pub contents: String,
}

/// 基于知识图谱生成题目的请求
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphGenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mcq {
        Mcq {
            id: Some("m1".into()),
            question: "Which variable holds the argument count?".into(),
            options: vec!["argc".into(), "argv".into(), "envp".into()],
            answer: Some("argc".into()),
            difficulty: Difficulty::Easy,
            bloom_level: BloomLevel::Remember,
            concept_id: Some("args".into()),
        }
    }

    #[test]
    fn difficulty_parses_any_case_and_orders() {
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(BloomLevel::Apply > BloomLevel::Understand);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn missing_tags_default() {
        let mcq: Mcq = serde_json::from_value(serde_json::json!({
            "question": "What is an example MCQ?",
            "options": ["A", "B", "C", "D"],
            "answer": "A"
        }))
        .unwrap();
        assert_eq!(mcq.difficulty, Difficulty::Medium);
        assert_eq!(mcq.bloom_level, BloomLevel::Remember);
        assert!(mcq.id.is_none());
        assert!(mcq.is_correct("A"));
    }

    #[test]
    fn renaming_the_answer_option_moves_the_answer() {
        let mut draft = McqDraft::from(&sample());
        draft.rename_option(0, "argc (int)").unwrap();
        assert_eq!(draft.answer.as_deref(), Some("argc (int)"));

        draft.rename_option(1, "argv (char**)").unwrap();
        assert_eq!(draft.answer.as_deref(), Some("argc (int)"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_validation_rejects_dangling_answer() {
        let mut draft = McqDraft::from(&sample());
        draft.answer = Some("nothing".into());
        assert!(draft.validate().is_err());

        draft.set_answer(2).unwrap();
        assert_eq!(draft.answer.as_deref(), Some("envp"));
        assert!(draft.set_answer(9).is_err());
    }

    #[test]
    fn option_letters() {
        assert_eq!(Mcq::option_letter(0), 'A');
        assert_eq!(Mcq::option_letter(3), 'D');
    }
}
