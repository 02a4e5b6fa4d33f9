//! 课堂行为事件统计

use super::{SeaOrmStorage, db_error};
use crate::entity::behavior_events::{Column, Entity as BehaviorEvents, KIND_ATTENTION, KIND_PRAISE};
use crate::errors::Result;
use crate::models::reports::entities::BehaviorTally;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::debug;

impl SeaOrmStorage {
    /// 某学生在某次布置下的表扬 / 关注次数
    pub async fn get_behavior_tally_impl(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<BehaviorTally> {
        let kinds: Vec<String> = BehaviorEvents::find()
            .select_only()
            .column(Column::Kind)
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::AssignId.eq(assign_id))
            .filter(Column::StudentId.eq(student_id))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_error("查询行为事件"))?;

        let mut tally = BehaviorTally::default();
        for kind in kinds {
            match kind.as_str() {
                KIND_PRAISE => tally.praise_count += 1,
                KIND_ATTENTION => tally.attention_count += 1,
                other => debug!("Ignoring behavior event kind {}", other),
            }
        }
        Ok(tally)
    }
}
