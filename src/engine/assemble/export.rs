use std::collections::HashMap;

use tracing::debug;

use super::load_assign_scope;
use crate::engine::answers::{LearnerTally, avg_time, difficulty_degree};
use crate::engine::context::ReportContext;
use crate::engine::keys;
use crate::errors::{ReportError, Result};
use crate::models::reports::entities::{AnswerRecord, DifficultyDegree};
use crate::models::reports::requests::ExportParams;

/// 可导出的字段，按调用方给出的顺序输出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportField {
    StudentId,
    StudentName,
    AccuracyRate,
    CompletionRate,
    AnswerCount,
    CorrectCount,
    IncorrectCount,
    TotalTime,
    AvgTime,
    FinishedAt,
    DifficultyDegree,
}

impl ExportField {
    pub fn parse(name: &str) -> Option<Self> {
        let field = match name {
            "studentId" => ExportField::StudentId,
            "studentName" => ExportField::StudentName,
            "accuracyRate" => ExportField::AccuracyRate,
            "completionRate" => ExportField::CompletionRate,
            "answerCount" => ExportField::AnswerCount,
            "correctCount" => ExportField::CorrectCount,
            "incorrectCount" => ExportField::IncorrectCount,
            "totalTime" => ExportField::TotalTime,
            "avgTime" => ExportField::AvgTime,
            "finishedAt" => ExportField::FinishedAt,
            "difficultyDegree" => ExportField::DifficultyDegree,
            _ => return None,
        };
        Some(field)
    }

    pub fn header(self) -> &'static str {
        match self {
            ExportField::StudentId => "学生ID",
            ExportField::StudentName => "学生姓名",
            ExportField::AccuracyRate => "正确率(%)",
            ExportField::CompletionRate => "完成率(%)",
            ExportField::AnswerCount => "作答题数",
            ExportField::CorrectCount => "答对题数",
            ExportField::IncorrectCount => "答错题数",
            ExportField::TotalTime => "总用时(秒)",
            ExportField::AvgTime => "平均用时(秒)",
            ExportField::FinishedAt => "完成时间",
            ExportField::DifficultyDegree => "难度",
        }
    }
}

/// 内存中的导出表格
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvExport {
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| ReportError::export(format!("Failed to flush csv: {e}")))
    }
}

// 一行导出所需的学生数据；stats 为 None 表示没有统计记录
struct LearnerRow {
    id: i64,
    name: String,
    stats: Option<LearnerStats>,
}

struct LearnerStats {
    accuracy_rate: f64,
    completion_rate: f64,
    answer_count: i64,
    correct_count: i64,
    incorrect_count: i64,
    total_time: i64,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
    difficulty_degree: DifficultyDegree,
}

impl LearnerRow {
    fn cell(&self, field: ExportField, placeholder: &str) -> String {
        let stat = |f: fn(&LearnerStats) -> String| {
            self.stats
                .as_ref()
                .map(f)
                .unwrap_or_else(|| placeholder.to_string())
        };
        match field {
            ExportField::StudentId => self.id.to_string(),
            ExportField::StudentName => self.name.clone(),
            ExportField::AccuracyRate => stat(|s| format!("{:.2}", s.accuracy_rate)),
            ExportField::CompletionRate => stat(|s| format!("{:.2}", s.completion_rate)),
            ExportField::AnswerCount => stat(|s| s.answer_count.to_string()),
            ExportField::CorrectCount => stat(|s| s.correct_count.to_string()),
            ExportField::IncorrectCount => stat(|s| s.incorrect_count.to_string()),
            ExportField::TotalTime => stat(|s| s.total_time.to_string()),
            ExportField::AvgTime => stat(|s| avg_time(s.total_time, s.answer_count).to_string()),
            ExportField::DifficultyDegree => stat(|s| s.difficulty_degree.as_str().to_string()),
            ExportField::FinishedAt => self
                .stats
                .as_ref()
                .and_then(|s| s.finished_at)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| placeholder.to_string()),
        }
    }
}

/// 按学生导出布置的统计，每个学生一行，缺少统计的学生以占位符填充
pub async fn export_report(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
    params: &ExportParams,
) -> Result<CsvExport> {
    let names = params.field_list();
    if names.is_empty() {
        return Err(ReportError::invalid_argument("导出字段不能为空"));
    }
    let fields = names
        .iter()
        .map(|name| {
            ExportField::parse(name)
                .ok_or_else(|| ReportError::invalid_argument(format!("未知的导出字段: {name}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let resource = match params.resource_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            keys::parse_resource_key(key).ok_or_else(|| {
                ReportError::invalid_argument(format!("无效的资源键: {key}"))
            })?;
            Some(key.to_string())
        }
        None => None,
    };

    let (task, assign) = load_assign_scope(ctx, task_id, assign_id).await?;
    let roster = ctx
        .get_rosters(std::slice::from_ref(&assign))
        .await?
        .remove(0);
    let questions = ctx.get_all_questions(task_id).await?;
    let answers = ctx.get_assign_answers(task_id, assign_id).await?;

    let suffix = match &resource {
        Some(rkey) => {
            let slots = questions.slots_of_resource(rkey);
            if slots.is_empty() {
                return Err(ReportError::invalid_argument(format!(
                    "资源不属于任务 {task_id}: {rkey}"
                )));
            }
            questions
                .resource_name(rkey)
                .map(str::to_string)
                .unwrap_or_else(|| slots[0].resource_id.clone())
        }
        None => task.task_type.label().to_string(),
    };

    let mut answers_by_student: HashMap<i64, Vec<&AnswerRecord>> = HashMap::new();
    for record in answers.iter() {
        let in_scope = resource
            .as_deref()
            .is_none_or(|rkey| keys::resource_key(&record.resource_id, record.resource_type) == rkey);
        if in_scope {
            answers_by_student
                .entry(record.student_id)
                .or_default()
                .push(record);
        }
    }

    let learners: Vec<LearnerRow> = match &resource {
        // 单个资源范围内按最后一次作答现场统计
        Some(rkey) => {
            let total = questions.slots_of_resource(rkey).len();
            roster
                .students
                .iter()
                .map(|student| {
                    let records = answers_by_student.get(&student.id);
                    let stats = records.filter(|r| !r.is_empty()).map(|records| {
                        let tally = LearnerTally::from_records(records.iter().copied());
                        LearnerStats {
                            accuracy_rate: tally.accuracy_rate(),
                            completion_rate: tally.completion_rate(total),
                            answer_count: tally.answer_count,
                            correct_count: tally.correct_count,
                            incorrect_count: tally.incorrect_count,
                            total_time: tally.total_time,
                            finished_at: tally.last_answered_at,
                            difficulty_degree: difficulty_degree(records.iter().copied(), &questions),
                        }
                    });
                    LearnerRow {
                        id: student.id,
                        name: student.name.clone(),
                        stats,
                    }
                })
                .collect()
        }
        None => {
            let reports = ctx
                .get_student_reports(task_id, assign_id, &roster.student_ids())
                .await?;
            roster
                .students
                .iter()
                .map(|student| {
                    let stats = reports.get(&student.id).map(|r| LearnerStats {
                        accuracy_rate: r.accuracy_rate,
                        completion_rate: r.completion_rate,
                        answer_count: r.answer_count,
                        correct_count: r.correct_count,
                        incorrect_count: r.incorrect_count,
                        total_time: r.total_time,
                        finished_at: r.finished_at,
                        difficulty_degree: answers_by_student
                            .get(&student.id)
                            .map(|records| difficulty_degree(records.iter().copied(), &questions))
                            .unwrap_or_default(),
                    });
                    LearnerRow {
                        id: student.id,
                        name: student.name.clone(),
                        stats,
                    }
                })
                .collect()
        }
    };

    let placeholder = ctx.deps().settings.export_placeholder.as_str();
    let rows: Vec<Vec<String>> = learners
        .iter()
        .map(|learner| fields.iter().map(|f| learner.cell(*f, placeholder)).collect())
        .collect();
    debug!(
        "Exported {} rows x {} fields for assign {}",
        rows.len(),
        fields.len(),
        assign_id
    );

    Ok(CsvExport {
        filename: format!("{}-{}-{}.csv", task.name, roster.group_name, suffix),
        header: fields.iter().map(|f| f.header().to_string()).collect(),
        rows,
    })
}
