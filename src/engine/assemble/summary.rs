use std::collections::HashMap;

use tracing::debug;

use super::{distinct_students, load_assign_scope, remember_recent_task, stat_card};
use crate::engine::answers::{avg_time, difficulty_degree, round2};
use crate::engine::context::ReportContext;
use crate::errors::Result;
use crate::models::PaginationQuery;
use crate::models::reports::entities::{AnswerRecord, DifficultyDegree, StudentReport};
use crate::models::reports::responses::{ReportSummaryResponse, StudentSummary, TaskBrief};
use crate::models::roster::entities::StudentInfo;

/// 班级汇总：花名册分页后与学生统计合并，缺少统计的学生以 0 值出现
pub async fn report_summary(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    pagination: PaginationQuery,
) -> Result<ReportSummaryResponse> {
    let (task, assign) = load_assign_scope(ctx, task_id, assign_id).await?;
    let report = ctx.get_assign_report(&assign).await?;
    let roster = ctx
        .get_rosters(std::slice::from_ref(&assign))
        .await?
        .remove(0);

    let page: Vec<StudentInfo> = pagination.slice(&roster.students).to_vec();
    let page_ids: Vec<i64> = page.iter().map(|s| s.id).collect();
    let reports = ctx.get_student_reports(task_id, assign_id, &page_ids).await?;

    let questions = ctx.get_all_questions(task_id).await?;
    let answers = ctx.get_assign_answers(task_id, assign_id).await?;
    let mut answers_by_student: HashMap<i64, Vec<&AnswerRecord>> = HashMap::new();
    for record in answers.iter() {
        answers_by_student
            .entry(record.student_id)
            .or_default()
            .push(record);
    }

    let students: Vec<StudentSummary> = page
        .into_iter()
        .map(|student| {
            let degree = answers_by_student
                .get(&student.id)
                .map(|records| difficulty_degree(records.iter().copied(), &questions))
                .unwrap_or_default();
            let report = reports.get(&student.id);
            student_summary(student, report, degree)
        })
        .collect();

    let (class_accuracy_rate, class_avg_time) = class_averages(&students);
    debug!(
        "Summary for assign {}: {} learners on page, {} with records",
        assign_id,
        students.len(),
        students.iter().filter(|s| s.has_record).count()
    );

    remember_recent_task(ctx.deps(), &task).await;

    Ok(ReportSummaryResponse {
        task: TaskBrief::from(&task),
        assign: stat_card(&assign, &report, &roster, distinct_students(&answers)),
        class_accuracy_rate,
        class_avg_time,
        students,
        common_incorrect_questions: None,
        pagination: pagination.info(roster.students.len()),
    })
}

fn student_summary(
    student: StudentInfo,
    report: Option<&StudentReport>,
    difficulty_degree: DifficultyDegree,
) -> StudentSummary {
    match report {
        Some(r) => StudentSummary {
            student,
            has_record: true,
            answer_count: r.answer_count,
            correct_count: r.correct_count,
            incorrect_count: r.incorrect_count,
            accuracy_rate: r.accuracy_rate,
            completion_rate: r.completion_rate,
            total_time: r.total_time,
            avg_time: avg_time(r.total_time, r.answer_count),
            finished_at: r.finished_at,
            difficulty_degree,
        },
        None => StudentSummary {
            student,
            has_record: false,
            answer_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            accuracy_rate: 0.0,
            completion_rate: 0.0,
            total_time: 0,
            avg_time: 0,
            finished_at: None,
            difficulty_degree,
        },
    }
}

/// 当前页中有统计记录的学生的平均正确率和平均用时
fn class_averages(students: &[StudentSummary]) -> (f64, i64) {
    let recorded: Vec<&StudentSummary> = students.iter().filter(|s| s.has_record).collect();
    if recorded.is_empty() {
        return (0.0, 0);
    }
    let n = recorded.len();
    let accuracy = recorded.iter().map(|s| s.accuracy_rate).sum::<f64>() / n as f64;
    let time = recorded.iter().map(|s| s.avg_time).sum::<i64>() / n as i64;
    (round2(accuracy), time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::SingleKey;
    use crate::engine::test_support::{FakeWorld, question};
    use crate::models::tasks::entities::{GroupType, ResourceType, TaskType};

    fn student_report(student_id: i64, accuracy_rate: f64, total_time: i64, answer_count: i64) -> StudentReport {
        StudentReport {
            task_id: 1,
            assign_id: 10,
            student_id,
            answer_count,
            correct_count: answer_count,
            incorrect_count: 0,
            total_time,
            accuracy_rate,
            completion_rate: 100.0,
            finished_at: None,
        }
    }

    fn world() -> FakeWorld {
        let world = FakeWorld::new();
        world.add_task(1, TaskType::Homework, "作业");
        world.add_task_resource(1, 1, "qA", ResourceType::Question);
        world.add_task_resource(1, 2, "qB", ResourceType::Question);
        world.add_question(question("qA", 1, "第一题"));
        world.add_question(question("qB", 1, "第二题"));
        world.add_class(100, "一班", &[(1, "甲"), (2, "乙"), (3, "丙")]);
        world.add_assign(10, 1, GroupType::Class, 100);
        world
    }

    #[tokio::test]
    async fn test_missing_records_render_as_zero() {
        let world = world();
        world.add_student_report(student_report(1, 80.0, 40, 2));
        world.add_student_report(student_report(3, 60.0, 60, 2));
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let summary = report_summary(&mut ctx, 1, 10, PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(summary.students.len(), 3);
        assert!(!summary.students[1].has_record);
        assert_eq!(summary.students[1].student.name, "乙");
        assert_eq!(summary.students[1].accuracy_rate, 0.0);

        // 只统计有记录的学生
        assert_eq!(summary.class_accuracy_rate, 70.0);
        assert_eq!(summary.class_avg_time, 25);
        assert_eq!(summary.pagination.total, 3);
        assert!(summary.common_incorrect_questions.is_none());
    }

    #[tokio::test]
    async fn test_page_limits_statistics_lookup() {
        let world = world();
        world.add_student_report(student_report(3, 60.0, 60, 2));
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let summary = report_summary(&mut ctx, 1, 10, PaginationQuery { page: 2, size: 2 })
            .await
            .unwrap();
        assert_eq!(summary.students.len(), 1);
        assert_eq!(summary.students[0].student.id, 3);
        assert_eq!(summary.class_accuracy_rate, 60.0);
        assert_eq!(summary.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_difficulty_degree_per_learner() {
        let world = FakeWorld::new();
        world.add_task(1, TaskType::Homework, "作业");
        world.add_task_resource(1, 1, "qA", ResourceType::Question);
        world.add_task_resource(1, 2, "qB", ResourceType::Question);
        let mut hard = question("qA", 1, "难题");
        hard.difficulty = Some(5);
        let mut easy = question("qB", 1, "易题");
        easy.difficulty = Some(2);
        world.add_question(hard);
        world.add_question(easy);
        world.add_class(100, "一班", &[(1, "甲"), (2, "乙")]);
        world.add_assign(10, 1, GroupType::Class, 100);
        world.answer(1, 10, 1, "qA", ResourceType::Question, "qA", true, 5, 1);
        world.answer(1, 10, 1, "qB", ResourceType::Question, "qB", true, 5, 2);

        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);
        let summary = report_summary(&mut ctx, 1, 10, PaginationQuery::default())
            .await
            .unwrap();
        // (5 + 2) / 2 = 3.5，四舍五入为 4
        assert_eq!(summary.students[0].difficulty_degree, DifficultyDegree::RelativelyHard);
        assert_eq!(summary.students[1].difficulty_degree, DifficultyDegree::Medium);
        assert_eq!(summary.assign.answered_count, 1);
    }

    #[tokio::test]
    async fn test_broken_cache_does_not_fail_summary() {
        let world = world();
        world.break_cache();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);
        assert!(
            report_summary(&mut ctx, 1, 10, PaginationQuery::default())
                .await
                .is_ok()
        );
    }
}
