use std::path::PathBuf;

use aila_client::utils::logging;
use aila_client::{App, Config};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aila")]
#[command(about = "AILA 智能授课助手客户端")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 后端地址
    #[arg(long, env = "AILA_BACKEND_URL")]
    backend_url: Option<String>,

    /// 当前教师ID
    #[arg(long, env = "AILA_INSTRUCTOR_ID")]
    instructor: Option<String>,

    /// 当前学生ID
    #[arg(long, env = "AILA_STUDENT_ID")]
    student: Option<String>,

    /// 显示详细日志
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出课程（带 --enrolled 时列出当前学生已选课程）
    Courses {
        #[arg(long)]
        enrolled: bool,
        /// 以当前教师身份创建课程
        #[arg(long, value_name = "NAME")]
        create: Option<String>,
    },
    /// 当前学生选课
    Enroll { course_id: String },
    /// 列出课程的周模块
    Modules {
        course_id: String,
        /// 新建模块名称
        #[arg(long, value_name = "NAME", requires = "week")]
        create: Option<String>,
        #[arg(long)]
        week: Option<u32>,
    },
    /// 查询课件处理状态（只查询一次）
    Status { processing_id: String },
    /// 课件上传历史
    History {
        course_id: String,
        #[arg(long)]
        week: Option<u32>,
    },
    /// 列出某周的课件片段，或查看单个片段
    Segments {
        course_id: String,
        week: u32,
        #[arg(long, value_name = "SEGMENT_ID")]
        show: Option<String>,
    },
    /// 显示知识图谱
    Graph {
        course_id: String,
        week: u32,
        /// 依次展开这些概念
        #[arg(long, value_delimiter = ',')]
        expand: Vec<String>,
    },
    /// 测验管理
    #[command(subcommand)]
    Quiz(QuizCommands),
    /// 选择题管理
    #[command(subcommand)]
    Mcq(McqCommands),
    /// 批量为一周的概念出题
    BatchGenerate {
        course_id: String,
        week: u32,
        /// 只为这些概念出题，缺省为全部
        #[arg(long, value_delimiter = ',')]
        concepts: Vec<String>,
        /// 基于知识图谱出题
        #[arg(long)]
        kg: bool,
    },
    /// 参加自适应测验
    Take { quiz_id: String },
    /// 针对课件片段做本地练习
    Practice { segment_id: String },
    /// 实时面板
    Live { quiz_id: String },
}

#[derive(Subcommand)]
enum QuizCommands {
    /// 创建测验
    Create {
        course_id: String,
        week: u32,
        #[arg(long)]
        name: String,
        #[arg(long, value_delimiter = ',', required = true)]
        concepts: Vec<String>,
    },
    /// 列出某周的测验
    List { course_id: String, week: u32 },
    /// 查看测验设置
    Settings { quiz_id: String },
    /// 从 TOML 预设保存测验设置
    ApplySettings {
        quiz_id: String,
        #[arg(long)]
        preset: PathBuf,
    },
    /// 列出文件夹中的设置预设
    Presets {
        #[arg(default_value = "presets")]
        folder: String,
    },
}

#[derive(Subcommand)]
enum McqCommands {
    /// 列出片段的题目
    List { segment_id: String },
    /// 为单个概念出题
    Generate {
        course_id: String,
        week: u32,
        concept_id: String,
        #[arg(long)]
        kg: bool,
    },
    /// 修改题目
    Edit {
        segment_id: String,
        mcq_id: String,
        #[arg(long)]
        question: Option<String>,
        /// 修改选项文字，格式 序号=文字（序号从 0 开始）
        #[arg(long = "option", value_parser = parse_rename)]
        options: Vec<(usize, String)>,
        /// 正确答案的选项序号
        #[arg(long)]
        answer: Option<usize>,
    },
}

fn parse_rename(raw: &str) -> Result<(usize, String), String> {
    let (index, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("需要 序号=文字，实际为 {}", raw))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("无效的选项序号: {}", index))?;
    Ok((index, text.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if cli.instructor.is_some() {
        config.instructor_id = cli.instructor;
    }
    if cli.student.is_some() {
        config.student_id = cli.student;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config)?;

    match cli.command {
        Commands::Courses { enrolled, create } => match create {
            Some(name) => app.create_course(&name).await?,
            None if enrolled => {
                let student_id = app.config().require_student_id()?.to_string();
                app.courses(Some(&student_id)).await?
            }
            None => app.courses(None).await?,
        },
        Commands::Enroll { course_id } => app.enroll(&course_id).await?,
        Commands::Modules {
            course_id,
            create,
            week,
        } => match (create, week) {
            (Some(name), Some(week)) => app.create_module(&course_id, &name, week).await?,
            _ => app.modules(&course_id).await?,
        },
        Commands::Status { processing_id } => app.status(&processing_id).await?,
        Commands::History { course_id, week } => app.history(&course_id, week).await?,
        Commands::Segments {
            course_id,
            week,
            show,
        } => match show {
            Some(segment_id) => app.segment_detail(&segment_id).await?,
            None => app.segments(&course_id, week).await?,
        },
        Commands::Graph {
            course_id,
            week,
            expand,
        } => app.graph(&course_id, week, &expand).await?,
        Commands::Quiz(cmd) => match cmd {
            QuizCommands::Create {
                course_id,
                week,
                name,
                concepts,
            } => app.create_quiz(&course_id, week, &name, &concepts).await?,
            QuizCommands::List { course_id, week } => app.list_quizzes(&course_id, week).await?,
            QuizCommands::Settings { quiz_id } => app.show_settings(&quiz_id).await?,
            QuizCommands::ApplySettings { quiz_id, preset } => {
                app.apply_settings(&quiz_id, &preset).await?
            }
            QuizCommands::Presets { folder } => app.list_presets(&folder).await?,
        },
        Commands::Mcq(cmd) => match cmd {
            McqCommands::List { segment_id } => app.list_mcqs(&segment_id).await?,
            McqCommands::Generate {
                course_id,
                week,
                concept_id,
                kg,
            } => app.generate_mcqs(&course_id, week, &concept_id, kg).await?,
            McqCommands::Edit {
                segment_id,
                mcq_id,
                question,
                options,
                answer,
            } => {
                app.edit_mcq(&segment_id, &mcq_id, question, &options, answer)
                    .await?
            }
        },
        Commands::BatchGenerate {
            course_id,
            week,
            concepts,
            kg,
        } => {
            let stats = app.batch_generate(&course_id, week, &concepts, kg).await?;
            if stats.failed > 0 {
                anyhow::bail!("{} 个概念出题失败", stats.failed);
            }
        }
        Commands::Take { quiz_id } => app.take_quiz(&quiz_id).await?,
        Commands::Practice { segment_id } => app.practice(&segment_id).await?,
        Commands::Live { quiz_id } => app.live(&quiz_id).await?,
    }

    Ok(())
}
