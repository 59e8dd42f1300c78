//! 课程服务 - 业务能力层
//!
//! 课程、选课、周模块的增查

use tracing::{debug, info};

use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{Course, Enrollment, Module};

/// 课程服务
pub struct CourseService {
    http: HttpExecutor,
}

impl CourseService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }

    /// 列出课程，传入教师ID时只列该教师的课程
    pub async fn list_courses(&self, instructor_id: Option<&str>) -> AppResult<Vec<Course>> {
        let courses: Vec<Course> = match instructor_id {
            Some(id) => {
                self.http
                    .get_json_query("/api/courses", &[("instructor_id", id)])
                    .await?
            }
            None => self.http.get_json("/api/courses").await?,
        };
        debug!("获取到 {} 门课程", courses.len());
        Ok(courses)
    }

    pub async fn create_course(&self, name: &str, instructor_id: &str) -> AppResult<Course> {
        let course: Course = self
            .http
            .post_form(
                "/api/courses",
                &[("name", name), ("instructor_id", instructor_id)],
            )
            .await?;
        info!("✓ 课程已创建: {} ({})", course.name, course.id);
        Ok(course)
    }

    /// 学生已选的课程
    pub async fn student_courses(&self, student_id: &str) -> AppResult<Vec<Course>> {
        self.http
            .get_json_query("/api/student-courses", &[("student_id", student_id)])
            .await
    }

    pub async fn enroll(&self, course_id: &str, student_id: &str) -> AppResult<Enrollment> {
        let enrollment: Enrollment = self
            .http
            .post_form(
                "/api/enroll",
                &[("course_id", course_id), ("student_id", student_id)],
            )
            .await?;
        info!("✓ 选课成功: {}", enrollment.enrollment_id);
        Ok(enrollment)
    }

    /// 课程的周模块，按周排序
    pub async fn list_modules(&self, course_id: &str) -> AppResult<Vec<Module>> {
        let mut modules: Vec<Module> = self
            .http
            .get_json_query("/api/modules", &[("course_id", course_id)])
            .await?;
        modules.sort_by_key(|m| m.week);
        Ok(modules)
    }

    pub async fn create_module(&self, name: &str, course_id: &str, week: u32) -> AppResult<Module> {
        let week = week.to_string();
        let module: Module = self
            .http
            .post_form(
                "/api/modules",
                &[("name", name), ("course_id", course_id), ("week", week.as_str())],
            )
            .await?;
        info!("✓ 模块已创建: 第 {} 周 {}", module.week, module.name);
        Ok(module)
    }
}
