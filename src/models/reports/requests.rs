use crate::models::common::de::option_string_or_value;
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

/// 布置作答详情查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AnswerDetailParams {
    /// 题型过滤，缺省或 0 表示全部
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub question_type: Option<i32>,
    /// 题干关键字
    pub keyword: Option<String>,
    /// answerCount / incorrectCount
    pub sort_key: Option<String>,
    /// asc / desc
    pub sort_order: Option<String>,
}

/// 单个学生作答详情查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentAnswerDetailParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub detail: AnswerDetailParams,
    /// false 时只保留答错和未作答的题目
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub all_questions: Option<bool>,
}

/// 学生原始作答列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct LearnerAnswerParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub student_id: Option<i64>,
    pub resource_key: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub question_type: Option<i32>,
    pub keyword: Option<String>,
}

/// 班级报告汇总查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportSummaryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}

/// CSV 导出参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ExportParams {
    /// 逗号分隔的字段列表，按调用方顺序输出
    pub fields: String,
    pub resource_key: Option<String>,
}

impl ExportParams {
    pub fn field_list(&self) -> Vec<String> {
        self.fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 答题面板查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AnswerPanelParams {
    /// index / accuracyRate / answerCount / incorrectCount
    pub sort_key: Option<String>,
    pub sort_order: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web;

    #[test]
    fn test_student_detail_query_string() {
        let query = web::Query::<StudentAnswerDetailParams>::from_query(
            "question_type=2&keyword=%E5%88%86%E6%95%B0&all_questions=false",
        )
        .unwrap()
        .into_inner();
        assert_eq!(query.detail.question_type, Some(2));
        assert_eq!(query.detail.keyword.as_deref(), Some("分数"));
        assert_eq!(query.all_questions, Some(false));
    }

    #[test]
    fn test_learner_answer_query_string() {
        let query =
            web::Query::<LearnerAnswerParams>::from_query("page=2&size=5&student_id=7")
                .unwrap()
                .into_inner();
        assert_eq!(query.pagination.normalized(), (2, 5));
        assert_eq!(query.student_id, Some(7));
        assert_eq!(query.question_type, None);
    }

    #[test]
    fn test_export_field_list_trims_blanks() {
        let params = ExportParams {
            fields: " studentName, ,accuracyRate ".to_string(),
            resource_key: None,
        };
        assert_eq!(params.field_list(), vec!["studentName", "accuracyRate"]);
    }
}
