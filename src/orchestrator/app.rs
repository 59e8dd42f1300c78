//! 应用主结构 - 编排层
//!
//! 持有配置和唯一的 HttpExecutor，按子命令组装 services / workflow 并输出结果。
//! 终端输出统一在这里完成，下层只返回数据

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::HttpExecutor;
use crate::models::{
    load_all_settings_presets, load_settings_preset, Concept, GraphGenerateRequest, Mcq,
    McqDraft, QuizDraft, RawGenerateRequest,
};
use crate::orchestrator::batch_generator::{BatchGenerator, GenerationMode, GenerationStats};
use crate::services::{
    AttemptService, CourseService, GraphService, LectureService, McqService, QuizService,
    ResultWriter, StatsService,
};
use crate::utils::logging;
use crate::workflow::{
    live_dashboard, radial_layout, ConceptGraphView, ExpandOutcome, LiveDashboard,
    PracticeSession, QuizRunner, QuizState,
};

/// 空图谱时的提示
pub const EMPTY_GRAPH_MESSAGE: &str = "No concepts yet for this week.";

/// 应用主结构
pub struct App {
    config: Config,
    http: HttpExecutor,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let http = HttpExecutor::new(&config).context("创建 HTTP 客户端失败")?;
        logging::log_startup(http.base_url(), config.max_concurrent_requests);
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========== 课程 ==========

    /// 列出课程：给了学生ID时列出其已选课程，否则列出教师课程
    pub async fn courses(&self, student_id: Option<&str>) -> Result<()> {
        let service = CourseService::new(self.http.clone());
        let courses = match student_id {
            Some(sid) => service.student_courses(sid).await?,
            None => service.list_courses(self.config.instructor_id.as_deref()).await?,
        };

        if courses.is_empty() {
            println!("No courses found.");
            return Ok(());
        }
        for course in &courses {
            println!("{}\t{}", course.id, course.name);
        }
        Ok(())
    }

    pub async fn create_course(&self, name: &str) -> Result<()> {
        let instructor_id = self.config.require_instructor_id()?;
        let course = CourseService::new(self.http.clone())
            .create_course(name, instructor_id)
            .await?;
        println!("{}\t{}", course.id, course.name);
        Ok(())
    }

    pub async fn enroll(&self, course_id: &str) -> Result<()> {
        let student_id = self.config.require_student_id()?;
        let enrollment = CourseService::new(self.http.clone())
            .enroll(course_id, student_id)
            .await?;
        println!("{}", enrollment.status);
        Ok(())
    }

    pub async fn modules(&self, course_id: &str) -> Result<()> {
        let modules = CourseService::new(self.http.clone())
            .list_modules(course_id)
            .await?;
        for module in &modules {
            println!("Week {:>2}\t{}\t{}", module.week, module.id, module.name);
        }
        Ok(())
    }

    pub async fn create_module(&self, course_id: &str, name: &str, week: u32) -> Result<()> {
        self.check_week(week)?;
        let module = CourseService::new(self.http.clone())
            .create_module(name, course_id, week)
            .await?;
        println!("Week {:>2}\t{}\t{}", module.week, module.id, module.name);
        Ok(())
    }

    // ========== 课件 ==========

    pub async fn status(&self, processing_id: &str) -> Result<()> {
        let job = LectureService::new(self.http.clone())
            .lecture_status(processing_id)
            .await?;
        println!("{}", job.describe());
        Ok(())
    }

    pub async fn history(&self, course_id: &str, week: Option<u32>) -> Result<()> {
        let jobs = LectureService::new(self.http.clone())
            .lecture_history(course_id, week)
            .await?;
        if jobs.is_empty() {
            println!("No uploads yet.");
        }
        for job in &jobs {
            match job.week {
                Some(w) => println!("Week {:>2}\t{}", w, job.describe()),
                None => println!("\t{}", job.describe()),
            }
        }
        Ok(())
    }

    pub async fn segments(&self, course_id: &str, week: u32) -> Result<()> {
        let segments = LectureService::new(self.http.clone())
            .segments(course_id, week)
            .await?;
        for seg in &segments {
            println!(
                "#{:<3} {}\t{}\t[{}]",
                seg.segment_index,
                seg.id,
                seg.title.as_deref().unwrap_or("-"),
                seg.keyword_list().join(", ")
            );
        }
        Ok(())
    }

    pub async fn segment_detail(&self, segment_id: &str) -> Result<()> {
        let detail = LectureService::new(self.http.clone())
            .segment_detail(segment_id)
            .await?;
        println!("{}", detail.title.as_deref().unwrap_or(&detail.id));
        if let Some(summary) = &detail.summary {
            println!("\n{}", summary);
        }
        if let Some(content) = &detail.content {
            println!("\n{}", content);
        }
        Ok(())
    }

    // ========== 知识图谱 ==========

    /// 打印可见子图；`expand` 依次模拟点击
    pub async fn graph(&self, course_id: &str, week: u32, expand: &[String]) -> Result<()> {
        let graph = GraphService::new(self.http.clone())
            .knowledge_graph(course_id, week)
            .await?;
        let mut view = ConceptGraphView::new(graph);

        for id in expand {
            match view.expand(id) {
                ExpandOutcome::Expanded(added) => {
                    info!("展开 {}: 新增 {} 个概念", id, added.len())
                }
                ExpandOutcome::AlreadyExpanded => info!("{} 已经展开", id),
                ExpandOutcome::UnknownNode => warn!("⚠️ 图谱中没有概念 {}", id),
            }
        }

        let visible = view.visible_graph();
        if visible.is_empty() {
            println!("{}", EMPTY_GRAPH_MESSAGE);
            return Ok(());
        }

        let positions = radial_layout(&visible);
        for (node, (_, pos)) in visible.nodes.iter().zip(positions.iter()) {
            println!(
                "{}{}\t{}\tsize={}\t({:.1}, {:.1})",
                if node.is_root { "* " } else { "  " },
                node.id,
                node.name,
                node.size,
                pos.x,
                pos.y
            );
        }
        for link in &visible.links {
            println!("  {} -> {}", link.source, link.target);
        }
        Ok(())
    }

    // ========== 测验 ==========

    pub async fn create_quiz(
        &self,
        course_id: &str,
        week: u32,
        name: &str,
        concept_ids: &[String],
    ) -> Result<()> {
        self.check_week(week)?;
        let instructor_id = self.config.require_instructor_id()?;

        let mut draft = QuizDraft::new(name);
        for id in concept_ids {
            draft.toggle(id);
        }
        let new_quiz = draft.build(course_id, week, instructor_id)?;

        let quiz = QuizService::new(self.http.clone())
            .create_quiz(&new_quiz)
            .await?;
        println!("Quiz created successfully! ({})", quiz.id);
        Ok(())
    }

    pub async fn list_quizzes(&self, course_id: &str, week: u32) -> Result<()> {
        let quizzes = QuizService::new(self.http.clone())
            .list_quizzes(course_id, week)
            .await?;
        if quizzes.is_empty() {
            println!("No quizzes for week {}.", week);
        }
        for quiz in &quizzes {
            println!("{}\t{}\t{} concepts", quiz.id, quiz.name, quiz.concept_ids.len());
        }
        Ok(())
    }

    pub async fn show_settings(&self, quiz_id: &str) -> Result<()> {
        match QuizService::new(self.http.clone())
            .load_settings(quiz_id)
            .await?
        {
            Some(settings) => println!("{}", toml::to_string_pretty(&settings)?),
            None => println!("Quiz {} uses default settings.", quiz_id),
        }
        Ok(())
    }

    /// 从 TOML 预设文件读取设置并保存到后端
    pub async fn apply_settings(&self, quiz_id: &str, preset: &Path) -> Result<()> {
        let settings = load_settings_preset(preset).await?;
        QuizService::new(self.http.clone())
            .save_settings(quiz_id, &settings)
            .await?;
        println!("Settings saved.");
        Ok(())
    }

    pub async fn list_presets(&self, folder: &str) -> Result<()> {
        let presets = load_all_settings_presets(folder).await?;
        if presets.is_empty() {
            warn!("⚠️ {} 中没有可用的设置预设", folder);
        }
        for (name, settings) in &presets {
            println!(
                "{}\tquestions={}\tretries={}",
                name,
                settings.max_questions.map_or("-".to_string(), |n| n.to_string()),
                settings.allowed_retries.map_or("-".to_string(), |n| n.to_string())
            );
        }
        Ok(())
    }

    // ========== 选择题 ==========

    pub async fn list_mcqs(&self, segment_id: &str) -> Result<()> {
        let mcqs = McqService::new(self.http.clone())
            .list_for_segment(segment_id)
            .await?;
        for mcq in &mcqs {
            print_mcq(mcq, true);
        }
        Ok(())
    }

    /// 为单个概念出题
    pub async fn generate_mcqs(
        &self,
        course_id: &str,
        week: u32,
        concept_id: &str,
        use_graph: bool,
    ) -> Result<()> {
        let service = McqService::new(self.http.clone());
        let mcqs = if use_graph {
            service
                .generate_from_graph(&GraphGenerateRequest {
                    course_id: Some(course_id.to_string()),
                    week: Some(week),
                    concept_id: Some(concept_id.to_string()),
                    segment_id: None,
                })
                .await?
        } else {
            let concept = self.find_concept(course_id, week, concept_id).await?;
            service
                .generate_raw(&RawGenerateRequest {
                    course_id: course_id.to_string(),
                    week,
                    concept_id: concept.id,
                    summary: concept.summary.unwrap_or_default(),
                    contents: concept.contents.unwrap_or_default(),
                })
                .await?
        };

        for mcq in &mcqs {
            print_mcq(mcq, true);
        }
        Ok(())
    }

    /// 编辑一道已保存的题目
    ///
    /// # 参数
    /// - `renames`: (选项序号, 新文字)，序号从 0 开始
    /// - `answer`: 新答案的选项序号
    pub async fn edit_mcq(
        &self,
        segment_id: &str,
        mcq_id: &str,
        question: Option<String>,
        renames: &[(usize, String)],
        answer: Option<usize>,
    ) -> Result<()> {
        let service = McqService::new(self.http.clone());
        let mcqs = service.list_for_segment(segment_id).await?;
        let mcq = mcqs
            .iter()
            .find(|m| m.id.as_deref() == Some(mcq_id))
            .with_context(|| format!("片段 {} 中没有题目 {}", segment_id, mcq_id))?;

        let mut draft = McqDraft::from(mcq);
        if let Some(q) = question {
            draft.question = q;
        }
        for (index, text) in renames {
            draft.rename_option(*index, text.clone())?;
        }
        if let Some(index) = answer {
            draft.set_answer(index)?;
        }

        let updated = service.update(mcq_id, &draft).await?;
        print_mcq(&updated, true);
        Ok(())
    }

    /// 批量出题：未指定概念时对整周的所有概念出题
    pub async fn batch_generate(
        &self,
        course_id: &str,
        week: u32,
        concept_ids: &[String],
        use_graph: bool,
    ) -> Result<GenerationStats> {
        let graph = GraphService::new(self.http.clone())
            .knowledge_graph(course_id, week)
            .await?;
        if graph.is_empty() {
            println!("{}", EMPTY_GRAPH_MESSAGE);
            return Ok(GenerationStats::default());
        }

        let concepts: Vec<Concept> = if concept_ids.is_empty() {
            graph.nodes
        } else {
            let mut selected = Vec::new();
            for id in concept_ids {
                match graph.nodes.iter().find(|c| &c.id == id) {
                    Some(c) => selected.push(c.clone()),
                    None => warn!("⚠️ 图谱中没有概念 {}，跳过", id),
                }
            }
            selected
        };

        let mode = if use_graph {
            GenerationMode::KnowledgeGraph
        } else {
            GenerationMode::Raw
        };
        let generator = BatchGenerator::new(self.http.clone(), &self.config, mode);
        let (stats, results) = generator.run(course_id, week, &concepts).await?;

        for group in &results {
            println!("== {} ({})", group.concept_id, group.mcqs.len());
            for mcq in &group.mcqs {
                print_mcq(mcq, false);
            }
        }
        Ok(stats)
    }

    // ========== 作答 ==========

    /// 交互式自适应测验，从标准输入读取选项
    pub async fn take_quiz(&self, quiz_id: &str) -> Result<()> {
        let student_id = self.config.require_student_id()?.to_string();
        let backend = AttemptService::new(self.http.clone());
        let mut runner = QuizRunner::new(backend, quiz_id, student_id);
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        runner.start().await?;

        loop {
            let (question, index) = match runner.state() {
                QuizState::QuestionShown {
                    question, index, ..
                } => (question.clone(), *index),
                QuizState::Finished(_) => break,
                other => anyhow::bail!("意外的测验状态: {}", other.name()),
            };

            match runner.total() {
                Some(total) => println!("\nQuestion {}/{}", index + 1, total),
                None => println!("\nQuestion {}", index + 1),
            }
            print_mcq(&question, false);

            let Some(option) = prompt_choice(&mut input, &question).await? else {
                anyhow::bail!("输入已结束，测验未完成");
            };

            let feedback = runner.submit(&option).await?;
            if feedback.correct {
                println!("Correct!");
            } else {
                println!("Incorrect.");
                if let Some(hint) = &feedback.hint {
                    println!("Hint: {}", hint);
                }
                if let Some(answer) = &feedback.correct_answer {
                    println!("Correct answer: {}", answer);
                }
            }
            if let Some(text) = &feedback.feedback {
                println!("{}", text);
            }

            if runner.can_retry() {
                println!("Try again? ({} retries left) [y/N]", feedback.retries_left);
                let again = input.next_line().await?.unwrap_or_default();
                if again.trim().eq_ignore_ascii_case("y") {
                    runner.retry()?;
                    continue;
                }
            }
            runner.advance().await?;
        }

        if let QuizState::Finished(summary) = runner.state() {
            println!(
                "\nScore: {}/{} (first try: {}, retries: {})",
                summary.correct, summary.answered, summary.first_try_correct, summary.retries_used
            );
            if let Some(result) = &summary.server_result {
                if let Some(pct) = result.percentage {
                    println!("Server score: {}/{} ({:.0}%)", result.score, result.total, pct);
                }
            }
            println!("{}", summary.message());

            let writer = ResultWriter::new(self.config.results_file.clone());
            match writer.write(quiz_id, summary) {
                Ok(()) => info!("📝 结果已写入 {}", writer.path()),
                Err(e) => warn!("⚠️ 写入结果文件失败: {}", e),
            }
        }
        Ok(())
    }

    /// 本地练习：题目取自片段，判题在本地完成
    pub async fn practice(&self, segment_id: &str) -> Result<()> {
        let mcqs = McqService::new(self.http.clone())
            .fetch_or_generate(segment_id)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        let mut session = PracticeSession::new(mcqs);
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        while let Some(mcq) = session.current().cloned() {
            println!("\nQuestion {}/{}", session.position() + 1, session.total());
            print_mcq(&mcq, false);

            let Some(option) = prompt_choice(&mut input, &mcq).await? else {
                break;
            };
            let answer = session.answer(&option)?;
            if answer.is_correct {
                println!("Correct!");
            } else {
                println!(
                    "Incorrect. Correct answer: {}",
                    answer.correct_answer.as_deref().unwrap_or("-")
                );
            }
            session.next()?;
        }

        let summary = session.summary();
        println!("\nScore: {}/{}", summary.score, summary.total);
        println!("{}", summary.message);
        Ok(())
    }

    // ========== 实时面板 ==========

    pub async fn live(&self, quiz_id: &str) -> Result<()> {
        let ws_base = self.config.ws_base_url()?;
        let service = StatsService::new(self.http.clone(), ws_base);
        info!("📡 连接实时面板: {}", service.live_url(quiz_id));

        let dashboard = live_dashboard::follow(&service, quiz_id, render_dashboard).await?;
        info!(
            "连接已关闭，共 {} 次提交",
            dashboard.stats().total_submissions
        );
        Ok(())
    }

    async fn find_concept(&self, course_id: &str, week: u32, concept_id: &str) -> Result<Concept> {
        let graph = GraphService::new(self.http.clone())
            .knowledge_graph(course_id, week)
            .await?;
        graph
            .nodes
            .into_iter()
            .find(|c| c.id == concept_id)
            .ok_or_else(|| {
                crate::error::BusinessError::UnknownConcept {
                    node_id: concept_id.to_string(),
                }
                .into()
            })
    }

    fn check_week(&self, week: u32) -> Result<()> {
        if week == 0 || week > self.config.week_count {
            anyhow::bail!("周次必须在 1-{} 之间，实际为 {}", self.config.week_count, week);
        }
        Ok(())
    }
}

/// 把输入解析成选项：完整选项文字优先，其次字母（A/b）、序号（1 开始）
pub fn parse_choice(input: &str, options: &[String]) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // 选项文字本身可能就是字母或数字
    if let Some(opt) = options.iter().find(|o| o.trim() == input) {
        return Some(opt.clone());
    }

    if input.chars().count() == 1 {
        if let Some(c) = input.chars().next().filter(|c| c.is_ascii_alphabetic()) {
            let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
            if let Some(opt) = options.get(idx) {
                return Some(opt.clone());
            }
        }
    }
    if let Ok(n) = input.parse::<usize>() {
        if n >= 1 {
            if let Some(opt) = options.get(n - 1) {
                return Some(opt.clone());
            }
        }
    }
    None
}

async fn prompt_choice(input: &mut Lines<BufReader<Stdin>>, mcq: &Mcq) -> Result<Option<String>> {
    loop {
        println!("Your answer:");
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match parse_choice(&line, &mcq.options) {
            Some(option) => return Ok(Some(option)),
            None => println!("Please pick one of the listed options."),
        }
    }
}

fn print_mcq(mcq: &Mcq, with_answer: bool) {
    println!(
        "{} [{} / {}]",
        mcq.question, mcq.difficulty, mcq.bloom_level
    );
    for (i, opt) in mcq.options.iter().enumerate() {
        let mark = if with_answer && mcq.is_correct(opt) { "*" } else { " " };
        println!("  {}{}. {}", mark, Mcq::option_letter(i), opt);
    }
}

fn render_dashboard(dashboard: &LiveDashboard) {
    let stats = dashboard.stats();
    println!(
        "\nSubmissions: {}\tAverage: {:.1}",
        stats.total_submissions, stats.average_score
    );
    for sub in &stats.submissions {
        println!("  {}\t{:.0}%\t{}", sub.student_name, sub.percentage, sub.band());
    }
    for event in dashboard.feed() {
        println!(
            "  [{}] {} scored {}/{}",
            event.timestamp.format("%H:%M:%S"),
            event.short_student(),
            event.score,
            event.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Stack".into(), "Heap".into(), "Queue".into()]
    }

    #[test]
    fn parse_choice_accepts_letters_numbers_and_text() {
        let opts = options();
        assert_eq!(parse_choice("b", &opts).as_deref(), Some("Heap"));
        assert_eq!(parse_choice(" C ", &opts).as_deref(), Some("Queue"));
        assert_eq!(parse_choice("1", &opts).as_deref(), Some("Stack"));
        assert_eq!(parse_choice("Heap", &opts).as_deref(), Some("Heap"));
    }

    #[test]
    fn parse_choice_prefers_exact_option_text() {
        let numbers: Vec<String> = ["3", "4", "5", "6"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_choice("4", &numbers).as_deref(), Some("4"));
        assert_eq!(parse_choice("6", &numbers).as_deref(), Some("6"));
        // 不是任何选项文字时仍按序号解析
        assert_eq!(parse_choice("1", &numbers).as_deref(), Some("3"));

        let letters: Vec<String> = vec!["B".into(), "A".into()];
        assert_eq!(parse_choice("A", &letters).as_deref(), Some("A"));
        assert_eq!(parse_choice("B", &letters).as_deref(), Some("B"));
        assert_eq!(parse_choice("2", &letters).as_deref(), Some("A"));
    }

    #[test]
    fn parse_choice_rejects_out_of_range() {
        let opts = options();
        assert_eq!(parse_choice("D", &opts), None);
        assert_eq!(parse_choice("0", &opts), None);
        assert_eq!(parse_choice("4", &opts), None);
        assert_eq!(parse_choice("", &opts), None);
    }
}
