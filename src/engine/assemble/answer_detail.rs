use std::cmp::Reverse;

use super::{distinct_students, load_assign_scope, stat_card};
use crate::engine::answers::{build_question_answers, learner_answer_view, record_question_key};
use crate::engine::context::ReportContext;
use crate::engine::filter::QuestionFilter;
use crate::engine::keys;
use crate::engine::sequencer::{SortOverride, sequence_retain};
use crate::errors::{ReportError, Result};
use crate::models::reports::attempts::latest_attempts;
use crate::models::reports::entities::AnswerFilter;
use crate::models::reports::requests::{
    AnswerDetailParams, LearnerAnswerParams, StudentAnswerDetailParams,
};
use crate::models::reports::responses::{
    AssignAnswerDetailResponse, LearnerAnswerListResponse, StudentAnswerDetailResponse, TaskBrief,
};
use crate::models::roster::entities::StudentInfo;

/// 布置维度的作答详情：每道题的计数以及全部学生的作答
pub async fn assign_answer_detail(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    params: &AnswerDetailParams,
) -> Result<AssignAnswerDetailResponse> {
    let (task, assign) = load_assign_scope(ctx, task_id, assign_id).await?;
    let report = ctx.get_assign_report(&assign).await?;
    let roster = ctx
        .get_rosters(std::slice::from_ref(&assign))
        .await?
        .remove(0);

    // 编号覆盖全部题目，题型和关键字过滤之后编号不变
    let slots = ctx
        .get_resource_questions(task_id, &QuestionFilter::all())
        .await?;
    let counters = ctx.get_assign_answer_accuracy(task_id, assign_id).await?;
    let answers = ctx.get_assign_answers(task_id, assign_id).await?;

    let questions = build_question_answers(slots, &counters, &answers, &roster.names());
    let filter = QuestionFilter::from(params);
    let sort = SortOverride::from_params(params.sort_key.as_deref(), params.sort_order.as_deref());
    let questions = sequence_retain(
        task.task_type,
        questions,
        |q| filter.matches(&q.question),
        sort,
    );

    Ok(AssignAnswerDetailResponse {
        task: TaskBrief::from(&task),
        assign: stat_card(&assign, &report, &roster, distinct_students(&answers)),
        questions,
    })
}

/// 单个学生的作答详情。题目范围与布置详情相同，只挂该学生的作答；
/// `all_questions = false` 时去掉答对的题目。
pub async fn student_answer_detail(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    student_id: i64,
    params: &StudentAnswerDetailParams,
) -> Result<StudentAnswerDetailResponse> {
    if student_id <= 0 {
        return Err(ReportError::invalid_argument("student_id 必须提供"));
    }
    let (task, assign) = load_assign_scope(ctx, task_id, assign_id).await?;
    let roster = ctx
        .get_rosters(std::slice::from_ref(&assign))
        .await?
        .remove(0);

    let slots = ctx
        .get_resource_questions(task_id, &QuestionFilter::all())
        .await?;
    let counters = ctx.get_assign_answer_accuracy(task_id, assign_id).await?;
    let answers = latest_attempts(
        ctx.deps()
            .stats
            .get_task_student_answers(task_id, assign_id, student_id)
            .await?,
    );

    let questions = build_question_answers(slots, &counters, &answers, &roster.names());
    let filter = QuestionFilter::from(&params.detail);
    let wrong_only = !params.all_questions.unwrap_or(true);
    let sort = SortOverride::from_params(
        params.detail.sort_key.as_deref(),
        params.detail.sort_order.as_deref(),
    );
    // 编号与布置详情、答题面板一致；只保留答错和未作答时也不重新编号
    let questions = sequence_retain(
        task.task_type,
        questions,
        |q| filter.matches(&q.question) && !(wrong_only && q.answers.iter().any(|a| a.correct)),
        sort,
    );

    let student = roster
        .students
        .iter()
        .find(|s| s.id == student_id)
        .cloned()
        .unwrap_or_else(|| StudentInfo::id_only(student_id));

    Ok(StudentAnswerDetailResponse {
        task: TaskBrief::from(&task),
        student,
        questions,
    })
}

/// 原始作答列表（包含每一次作答），按作答时间倒序分页
pub async fn learner_answers(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    params: &LearnerAnswerParams,
) -> Result<LearnerAnswerListResponse> {
    let (_, assign) = load_assign_scope(ctx, task_id, assign_id).await?;

    let resource = match params.resource_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Some(keys::parse_resource_key(key).ok_or_else(|| {
            ReportError::invalid_argument(format!("无效的资源键: {key}"))
        })?),
        None => None,
    };
    let filter = AnswerFilter {
        student_id: params.student_id,
        resource,
    };
    let mut records = ctx
        .deps()
        .stats
        .get_task_assign_answers(task_id, assign_id, &filter)
        .await?;

    let questions = ctx.get_all_questions(task_id).await?;
    let question_filter = QuestionFilter::new(params.question_type, params.keyword.clone());
    if !question_filter.is_identity() {
        records.retain(|r| {
            questions
                .get_by_question_key(&record_question_key(r))
                .is_some_and(|slot| question_filter.matches(&slot.question))
        });
    }
    records.sort_by_key(|r| (Reverse(r.answered_at), Reverse(r.id)));

    let names = ctx
        .get_rosters(std::slice::from_ref(&assign))
        .await?
        .remove(0)
        .names();
    let items = params
        .pagination
        .slice(&records)
        .iter()
        .map(|r| learner_answer_view(r, &names, &questions))
        .collect();

    Ok(LearnerAnswerListResponse {
        items,
        pagination: params.pagination.info(records.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assemble::{answer_panel, report_summary};
    use crate::engine::resolver::SingleKey;
    use crate::engine::test_support::{FakeWorld, question};
    use crate::models::PaginationQuery;
    use crate::models::reports::requests::AnswerPanelParams;
    use crate::models::tasks::entities::{GroupType, ResourceType, TaskType};

    /// T1：作业，资源 [qA, qB]，布置给班级 C1（S1、S2）。
    /// S1 答对 qA 用时 5 秒，qB 未作答。
    fn t1() -> FakeWorld {
        let world = FakeWorld::new();
        world.add_task(1, TaskType::Homework, "T1");
        world.add_task_resource(1, 1, "qA", ResourceType::Question);
        world.add_task_resource(1, 2, "qB", ResourceType::Question);
        world.add_question(question("qA", 1, "第一题"));
        world.add_question(question("qB", 1, "第二题"));
        world.add_class(100, "C1", &[(1, "S1"), (2, "S2")]);
        world.add_assign(10, 1, GroupType::Class, 100);
        world.answer(1, 10, 1, "qA", ResourceType::Question, "qA", true, 5, 1);
        world
    }

    #[tokio::test]
    async fn test_t1_assign_detail() {
        let world = t1();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let detail = assign_answer_detail(&mut ctx, 1, 10, &AnswerDetailParams::default())
            .await
            .unwrap();
        assert_eq!(detail.questions.len(), 2);

        let qa = &detail.questions[0];
        assert_eq!(qa.question.id, "qA");
        assert_eq!(qa.index, 1);
        assert_eq!(qa.answer_count, 1);
        assert_eq!(qa.incorrect_count, 0);
        assert_eq!(qa.avg_time, 5);
        assert_eq!(qa.answers.len(), 1);
        assert_eq!(qa.answers[0].student_name, "S1");

        let qb = &detail.questions[1];
        assert_eq!(qb.question.id, "qB");
        assert_eq!(qb.answer_count, 0);
        assert_eq!(qb.avg_time, 0);
        assert!(qb.answers.is_empty());
    }

    #[tokio::test]
    async fn test_t1_student_detail_keeps_only_unanswered() {
        let world = t1();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let params = StudentAnswerDetailParams {
            detail: AnswerDetailParams::default(),
            all_questions: Some(false),
        };
        let detail = student_answer_detail(&mut ctx, 1, 10, 1, &params)
            .await
            .unwrap();
        let ids: Vec<&str> = detail.questions.iter().map(|q| q.question.id.as_str()).collect();
        assert_eq!(ids, vec!["qB"]);
        // 与答题面板编号一致
        assert_eq!(detail.questions[0].index, 2);
        assert_eq!(detail.student.name, "S1");

        let all = student_answer_detail(&mut ctx, 1, 10, 1, &StudentAnswerDetailParams::default())
            .await
            .unwrap();
        assert_eq!(all.questions.len(), 2);
    }

    #[tokio::test]
    async fn test_filtered_detail_keeps_panel_index() {
        let world = t1();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let params = AnswerDetailParams {
            keyword: Some("第二".to_string()),
            ..Default::default()
        };
        let detail = assign_answer_detail(&mut ctx, 1, 10, &params).await.unwrap();
        assert_eq!(detail.questions.len(), 1);
        assert_eq!(detail.questions[0].question.id, "qB");
        assert_eq!(detail.questions[0].index, 2);

        let panel = answer_panel(&mut ctx, 1, 10, &AnswerPanelParams::default())
            .await
            .unwrap();
        let qb = panel
            .rows
            .iter()
            .find(|q| q.question_id == "qB")
            .unwrap();
        assert_eq!(qb.index, 2);
    }

    #[tokio::test]
    async fn test_incorrect_answer_is_kept() {
        let world = t1();
        world.answer(1, 10, 2, "qA", ResourceType::Question, "qA", false, 9, 2);
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let params = StudentAnswerDetailParams {
            detail: AnswerDetailParams::default(),
            all_questions: Some(false),
        };
        let detail = student_answer_detail(&mut ctx, 1, 10, 2, &params)
            .await
            .unwrap();
        assert_eq!(detail.questions.len(), 2);
        assert_eq!(detail.questions[0].answers.len(), 1);
        assert!(!detail.questions[0].answers[0].correct);
        // 计数仍是整个布置的
        assert_eq!(detail.questions[0].answer_count, 2);
        assert_eq!(detail.questions[0].incorrect_count, 1);
    }

    #[tokio::test]
    async fn test_three_reports_share_fragments() {
        let world = t1();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        assign_answer_detail(&mut ctx, 1, 10, &AnswerDetailParams::default())
            .await
            .unwrap();
        answer_panel(&mut ctx, 1, 10, &AnswerPanelParams::default())
            .await
            .unwrap();
        report_summary(&mut ctx, 1, 10, PaginationQuery::default())
            .await
            .unwrap();

        let c = &world.counters;
        assert_eq!(c.get_task_by_id(), 1);
        assert_eq!(c.get_task_assign_info(), 1);
        assert_eq!(c.get_task_resources(), 1);
        assert_eq!(c.get_questions(), 1);
        assert_eq!(c.get_class_students(), 1);
        assert_eq!(c.get_task_reports(), 1);
        assert_eq!(c.get_answer_accuracy(), 1);
        assert_eq!(c.get_task_assign_answers(), 1);
    }

    #[tokio::test]
    async fn test_missing_ids_and_unknown_task() {
        let world = t1();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let err = assign_answer_detail(&mut ctx, 1, 0, &AnswerDetailParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");

        let err = assign_answer_detail(&mut ctx, 99, 10, &AnswerDetailParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_content_failure_aborts_detail() {
        let world = t1();
        world.break_content();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);
        let err = assign_answer_detail(&mut ctx, 1, 10, &AnswerDetailParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_learner_answers_lists_every_attempt() {
        let world = t1();
        world.answer(1, 10, 1, "qB", ResourceType::Question, "qB", false, 3, 2);
        world.answer(1, 10, 1, "qB", ResourceType::Question, "qB", true, 4, 3);
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &SingleKey);

        let params = LearnerAnswerParams {
            pagination: PaginationQuery { page: 1, size: 2 },
            student_id: Some(1),
            resource_key: None,
            question_type: None,
            keyword: None,
        };
        let response = learner_answers(&mut ctx, 1, 10, &params).await.unwrap();
        assert_eq!(response.pagination.total, 3);
        assert_eq!(response.items.len(), 2);
        // 最新的在前
        assert!(response.items[0].correct);
        assert_eq!(response.items[0].question_key, "qB#1#qB");
        assert_eq!(response.items[0].student_name, "S1");

        let by_keyword = LearnerAnswerParams {
            keyword: Some("第一".to_string()),
            ..params.clone()
        };
        let response = learner_answers(&mut ctx, 1, 10, &by_keyword).await.unwrap();
        assert_eq!(response.pagination.total, 1);

        let bad = LearnerAnswerParams {
            resource_key: Some("qA".to_string()),
            ..params
        };
        let err = learner_answers(&mut ctx, 1, 10, &bad).await.unwrap_err();
        assert_eq!(err.code(), "E006");
    }
}
