use api_types::sync::{
    AutomationRule, Category, SettingRow, SyncPullResponse, Transaction, User,
};
use sea_orm::TransactionTrait;

use crate::{
    EngineError, ResultEngine, record::SyncRecord, schema::check_timestamp, util::cursor_timestamp,
};

use super::{Engine, with_tx};

impl Engine {
    /// Rows changed after `cursor`, or every row when `cursor` is `None`.
    ///
    /// The returned cursor is the time the read started, not the newest row
    /// seen: a row written while the read runs shows up again on the next
    /// pull instead of being skipped.
    pub async fn pull(&self, cursor: Option<&str>) -> ResultEngine<SyncPullResponse> {
        if let Some(cursor) = cursor {
            check_timestamp("cursor", cursor).map_err(EngineError::Validation)?;
        }

        let started_at = cursor_timestamp();
        let response: ResultEngine<SyncPullResponse> = with_tx!(self, |db_tx| {
            Ok(SyncPullResponse {
                cursor: started_at,
                transactions: Transaction::changed_since(&db_tx, cursor).await?,
                categories: Category::changed_since(&db_tx, cursor).await?,
                rules: AutomationRule::changed_since(&db_tx, cursor).await?,
                settings: SettingRow::changed_since(&db_tx, cursor).await?,
                users: User::changed_since(&db_tx, cursor).await?,
            })
        });
        let response = response?;

        tracing::info!(
            cursor = cursor.unwrap_or("<bootstrap>"),
            next_cursor = %response.cursor,
            transactions = response.transactions.len(),
            categories = response.categories.len(),
            rules = response.rules.len(),
            settings = response.settings.len(),
            users = response.users.len(),
            "pull served"
        );

        Ok(response)
    }
}
