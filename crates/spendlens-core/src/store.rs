//! MongoDB access for the transaction store

use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Client, Collection};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::Result;

/// Collection holding transaction documents
pub const COLLECTION: &str = "transactions";

/// Handle to the transaction collection
pub struct TransactionStore {
    client: Client,
    collection: Collection<Document>,
}

impl TransactionStore {
    /// Connect to the store described by `config`
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        debug!("Connecting to transaction store (database {})", config.database);
        let client = Client::with_uri_str(&config.uri).await?;
        let collection = client.database(&config.database).collection(COLLECTION);
        Ok(Self { client, collection })
    }

    /// Fetch transactions, optionally scoped to a single owner
    pub async fn fetch_transactions(&self, owner: Option<&ObjectId>) -> Result<Vec<Document>> {
        let docs: Vec<Document> = self
            .collection
            .find(owner_filter(owner))
            .await?
            .try_collect()
            .await?;
        debug!("Fetched {} transactions", docs.len());
        Ok(docs)
    }

    /// Release the underlying connection pool
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

/// Build the find filter for an optional owner scope
fn owner_filter(owner: Option<&ObjectId>) -> Document {
    match owner {
        Some(id) => doc! { "userId": *id },
        None => doc! {},
    }
}

/// Parse an owner id, widening to all transactions when it is malformed
pub fn parse_owner_id(raw: &str) -> Option<ObjectId> {
    match ObjectId::parse_str(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(
                "Invalid owner id {:?}: {}, exporting all transactions",
                raw, err
            );
            None
        }
    }
}
