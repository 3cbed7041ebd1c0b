//! Document-database source for admission data
//!
//! The connection is opened once with a fixed server-selection timeout and
//! verified with a ping before any collection is touched; both collections
//! are read-only for the dashboard.

use std::time::Duration;

use bson::doc;
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::Client;

use crate::error::Result;
use crate::models::{Admission, PatientDocument};

/// Collection holding nested patient documents
pub const PATIENTS_COLLECTION: &str = "patients";
/// Collection holding flat admission records
pub const ADMISSIONS_COLLECTION: &str = "simulated_admissions";

/// A verified connection to the document database
pub struct MongoSource {
    client: Client,
    database: String,
}

impl MongoSource {
    /// Connect and verify the database responds within the timeout
    pub async fn connect(uri: &str, timeout: Duration, database: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(timeout);
        let client = Client::with_options(options)?;

        // force a round-trip so a dead server fails here, not mid-render
        client
            .database(database)
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(Self {
            client,
            database: database.to_string(),
        })
    }

    /// Fetch every patient document
    pub async fn fetch_patients(&self) -> Result<Vec<PatientDocument>> {
        let collection = self
            .client
            .database(&self.database)
            .collection::<PatientDocument>(PATIENTS_COLLECTION);
        let cursor = collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Fetch every flat admission record
    pub async fn fetch_admissions(&self) -> Result<Vec<Admission>> {
        let collection = self
            .client
            .database(&self.database)
            .collection::<Admission>(ADMISSIONS_COLLECTION);
        let cursor = collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }
}
