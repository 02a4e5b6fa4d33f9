use std::cmp::Ordering;

use super::load_assign_scope;
use crate::engine::answers::build_question_answers;
use crate::engine::context::ReportContext;
use crate::engine::filter::QuestionFilter;
use crate::engine::sequencer::{SortOrder, sequence};
use crate::errors::Result;
use crate::models::reports::requests::AnswerPanelParams;
use crate::models::reports::responses::{AnswerPanelResponse, AnswerPanelRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PanelSortKey {
    #[default]
    Index,
    AccuracyRate,
    AnswerCount,
    IncorrectCount,
}

impl PanelSortKey {
    // 无法识别时按编号
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("accuracyRate") => PanelSortKey::AccuracyRate,
            Some("answerCount") => PanelSortKey::AnswerCount,
            Some("incorrectCount") => PanelSortKey::IncorrectCount,
            _ => PanelSortKey::Index,
        }
    }

    fn compare(self, a: &AnswerPanelRow, b: &AnswerPanelRow) -> Ordering {
        match self {
            PanelSortKey::Index => a.index.cmp(&b.index),
            PanelSortKey::AccuracyRate => a.accuracy_rate.total_cmp(&b.accuracy_rate),
            PanelSortKey::AnswerCount => a.answer_count.cmp(&b.answer_count),
            PanelSortKey::IncorrectCount => a.incorrect_count.cmp(&b.incorrect_count),
        }
    }
}

/// 答题面板：每题一行，编号与作答详情一致
pub async fn answer_panel(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    params: &AnswerPanelParams,
) -> Result<AnswerPanelResponse> {
    let (task, _) = load_assign_scope(ctx, task_id, assign_id).await?;
    let slots = ctx
        .get_resource_questions(task_id, &QuestionFilter::all())
        .await?;
    let counters = ctx.get_assign_answer_accuracy(task_id, assign_id).await?;

    let questions = sequence(
        task.task_type,
        build_question_answers(slots, &counters, &[], &Default::default()),
        None,
    );
    let mut rows: Vec<AnswerPanelRow> = questions
        .into_iter()
        .map(|q| AnswerPanelRow {
            index: q.index,
            question_key: q.question_key,
            question_id: q.question.id,
            question_type: q.question.question_type,
            accuracy_rate: q.accuracy_rate,
            answer_count: q.answer_count,
            incorrect_count: q.incorrect_count,
        })
        .collect();

    let key = PanelSortKey::parse(params.sort_key.as_deref());
    let order = SortOrder::parse(params.sort_order.as_deref());
    rows.sort_by(|a, b| order.apply(key.compare(a, b)));

    Ok(AnswerPanelResponse {
        task_id,
        assign_id,
        rows,
    })
}
