//! Variable set API operations

use crate::config::api;
use crate::error::Result;
use crate::hcp::pagination::PaginatedCollection;
use crate::hcp::TfeClient;

use super::models::{VariableSet, VarsetItem};

impl TfeClient {
    /// List all variable sets of an organization
    ///
    /// Pages are walked up to `api::MAX_VARSET_PAGES`; more variable sets
    /// than that is a fatal overflow.
    pub async fn list_varsets(&self, org: &str) -> Result<PaginatedCollection<VariableSet>> {
        let path = format!(
            "/{}/{}/{}",
            api::ORGANIZATIONS,
            urlencoding::encode(org),
            api::VARSETS
        );

        let collection = self
            .collect_named_pages::<VarsetItem>(
                &path,
                api::VARSET_PAGE_SIZE,
                api::MAX_VARSET_PAGES,
            )
            .await?;

        Ok(collection.map(VariableSet::from))
    }

    /// Raw attributes payload of a variable set
    pub async fn get_varset_attributes(&self, varset_id: &str) -> Result<Vec<u8>> {
        let path = format!("/{}/{}", api::VARSETS, varset_id);
        self.fetch_raw_json(&path).await
    }

    /// Raw variables payload of a variable set
    pub async fn get_varset_variables(&self, varset_id: &str) -> Result<Vec<u8>> {
        let path = format!(
            "/{}/{}/relationships/{}",
            api::VARSETS,
            varset_id,
            api::VARS
        );
        self.fetch_raw_json(&path).await
    }
}
