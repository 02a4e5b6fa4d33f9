use tracing::warn;

use super::{evaluation_key, load_assign_scope, read_evaluated};
use crate::engine::answers::round2;
use crate::engine::context::ReportContext;
use crate::errors::{ReportError, Result};
use crate::models::reports::responses::{StudentDetailResponse, TaskBrief};
use crate::models::roster::entities::StudentInfo;

/// 学生详情卡片：个人与班级的正确率、进度对比，以及表扬 / 关注计数
pub async fn student_detail(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    student_id: i64,
) -> Result<StudentDetailResponse> {
    if student_id <= 0 {
        return Err(ReportError::invalid_argument("student_id 必须提供"));
    }
    let (task, assign) = load_assign_scope(ctx, task_id, assign_id).await?;
    let deps = ctx.deps();

    let student = match deps.roster.get_students(&[student_id]).await?.into_iter().next() {
        Some(student) => student,
        None => {
            warn!("Student {} not found in roster service", student_id);
            StudentInfo::id_only(student_id)
        }
    };
    let tally = deps
        .behaviors
        .get_behavior_tally(task_id, assign_id, student_id)
        .await?;

    let class_report = ctx.get_assign_report(&assign).await?;
    let accuracy_rate = ctx
        .get_student_reports(task_id, assign_id, &[student_id])
        .await?
        .get(&student_id)
        .map(|r| r.accuracy_rate)
        .unwrap_or(0.0);

    let question_total = ctx.get_all_questions(task_id).await?.len();
    let answered = deps
        .stats
        .get_task_answer_count(task_id, assign_id, &[student_id])
        .await?
        .get(&student_id)
        .copied()
        .unwrap_or(0);
    let completion_rate = if question_total == 0 {
        0.0
    } else {
        round2((answered as f64 * 100.0 / question_total as f64).min(100.0))
    };

    let evaluated = read_evaluated(deps, &evaluation_key(task_id, assign_id, student_id)).await;
    let guidance = if accuracy_rate >= class_report.accuracy_rate {
        deps.settings.guidance_above.clone()
    } else {
        deps.settings.guidance_below.clone()
    };

    Ok(StudentDetailResponse {
        task: TaskBrief::from(&task),
        student,
        praise_count: tally.praise_count,
        attention_count: tally.attention_count,
        accuracy_rate,
        class_accuracy_rate: class_report.accuracy_rate,
        completion_rate,
        class_completion_rate: class_report.completion_rate,
        evaluated,
        guidance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::SingleKey;
    use crate::engine::test_support::{FakeWorld, question};
    use crate::models::reports::entities::{BehaviorTally, StudentReport, TaskReport};
    use crate::models::tasks::entities::{GroupType, ResourceType, TaskType};

    fn world() -> FakeWorld {
        let world = FakeWorld::new();
        world.add_task(1, TaskType::Homework, "作业");
        for (seq, id) in ["q1", "q2", "q3", "q4"].iter().enumerate() {
            world.add_task_resource(1, seq as i64 + 1, id, ResourceType::Question);
            world.add_question(question(id, 1, "题干"));
        }
        world.add_class(100, "一班", &[(1, "甲"), (2, "乙")]);
        world.add_assign(10, 1, GroupType::Class, 100);
        world.add_task_report(TaskReport {
            accuracy_rate: 60.0,
            completion_rate: 75.0,
            ..TaskReport::empty(1, 10)
        });
        world.add_student_report(StudentReport {
            task_id: 1,
            assign_id: 10,
            student_id: 1,
            answer_count: 1,
            correct_count: 1,
            incorrect_count: 0,
            total_time: 5,
            accuracy_rate: 100.0,
            completion_rate: 25.0,
            finished_at: None,
        });
        world.set_behavior(
            1,
            10,
            1,
            BehaviorTally {
                praise_count: 3,
                attention_count: 1,
            },
        );
        world.answer(1, 10, 1, "q1", ResourceType::Question, "q1", true, 5, 1);
        world
    }

    #[tokio::test]
    async fn test_student_card_joins_sources() {
        let world = world();
        world.put_cache(&evaluation_key(1, 10, 1), "1");
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let card = student_detail(&mut ctx, 1, 10, 1).await.unwrap();
        assert_eq!(card.student.name, "甲");
        assert_eq!(card.praise_count, 3);
        assert_eq!(card.attention_count, 1);
        assert_eq!(card.accuracy_rate, 100.0);
        assert_eq!(card.class_accuracy_rate, 60.0);
        assert_eq!(card.completion_rate, 25.0);
        assert_eq!(card.class_completion_rate, 75.0);
        assert!(card.evaluated);
        assert_eq!(card.guidance, "继续保持");
    }

    #[tokio::test]
    async fn test_learner_without_record_gets_below_guidance() {
        let world = world();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let card = student_detail(&mut ctx, 1, 10, 2).await.unwrap();
        assert_eq!(card.accuracy_rate, 0.0);
        assert_eq!(card.completion_rate, 0.0);
        assert_eq!(card.praise_count, 0);
        assert!(!card.evaluated);
        assert_eq!(card.guidance, "多加练习");
    }

    #[tokio::test]
    async fn test_unknown_profile_and_broken_cache() {
        let world = world();
        world.break_cache();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let card = student_detail(&mut ctx, 1, 10, 9).await.unwrap();
        assert_eq!(card.student, StudentInfo::id_only(9));
        assert!(!card.evaluated);
    }
}
