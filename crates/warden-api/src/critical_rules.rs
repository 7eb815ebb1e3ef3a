// Critical rule endpoints
//
// Pagination is page-based (`page`, `pageSize`) and the list answers with a
// `{data, total}` envelope.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CriticalRule, CriticalRuleCreate, CriticalRuleUpdate, Page};

impl ApiClient {
    /// List one page of critical rules.
    ///
    /// `GET /critical-rules?page={page}&pageSize={page_size}`
    pub async fn list_critical_rules(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<CriticalRule>, Error> {
        self.get_with_params(
            "critical-rules",
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }

    /// Create a critical rule.
    ///
    /// `POST /critical-rules`
    pub async fn create_critical_rule(
        &self,
        rule: &CriticalRuleCreate,
    ) -> Result<CriticalRule, Error> {
        debug!(title = %rule.title, action = %rule.action, "creating critical rule");
        self.post("critical-rules", rule).await
    }

    /// Update a critical rule. Only fields present in `update` change.
    ///
    /// `PUT /critical-rules/{id}`
    pub async fn update_critical_rule(
        &self,
        id: i64,
        update: &CriticalRuleUpdate,
    ) -> Result<CriticalRule, Error> {
        debug!(id, "updating critical rule");
        self.put(&format!("critical-rules/{id}"), update).await
    }

    /// Delete one critical rule.
    ///
    /// `DELETE /critical-rules/{id}`
    pub async fn delete_critical_rule(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting critical rule");
        self.delete(&format!("critical-rules/{id}")).await
    }

    /// Delete several critical rules in one call.
    ///
    /// `DELETE /critical-rules/` with the id list as JSON body.
    pub async fn delete_critical_rules(&self, ids: &[i64]) -> Result<(), Error> {
        debug!(?ids, "bulk deleting critical rules");
        self.delete_with_body("critical-rules/", &ids).await
    }
}
