use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::ResultReport};

/// Append-only store of scored quizzes.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, report: ResultReport) -> AppResult<()>;
    /// Reports for `username`, newest `completed_at` first.
    async fn list_for(&self, username: &str) -> AppResult<Vec<ResultReport>>;
}

pub struct MongoHistoryRepository {
    collection: Collection<ResultReport>,
}

impl MongoHistoryRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz results collection");

        let user_completed_index = IndexModel::builder()
            .keys(doc! { "username": 1, "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("username_completed_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_completed_index).await?;

        log::info!("Successfully created indexes for quiz results collection");
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for MongoHistoryRepository {
    async fn append(&self, report: ResultReport) -> AppResult<()> {
        self.collection.insert_one(&report).await?;
        Ok(())
    }

    async fn list_for(&self, username: &str) -> AppResult<Vec<ResultReport>> {
        let reports = self
            .collection
            .find(doc! { "username": username })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(reports)
    }
}
