// Firewall rule endpoints (read-only)

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{FirewallRule, Page};

impl ApiClient {
    /// List one page of firewall rules.
    ///
    /// `GET /firewall-rules?page={page}&pageSize={page_size}`
    pub async fn list_firewall_rules(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<FirewallRule>, Error> {
        self.get_with_params(
            "firewall-rules",
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }
}
