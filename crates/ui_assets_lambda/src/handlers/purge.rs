use thiserror::Error;
use tracing::info;
use ui_assets_core::contract::{ResourceProperties, ValidationError, UNEXPECTED_EVENT_MESSAGE};

use crate::adapters::object_store::{ObjectRef, ObjectStore};

/// Upper bound S3 accepts in a single `DeleteObjects` request.
pub const MAX_DELETE_BATCH: usize = 1_000;

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("missing resource property: {0}")]
    MissingBuckets(#[from] ValidationError),
    #[error("failed to disable access logging on bucket '{bucket}': {message}")]
    DisableLogging { bucket: String, message: String },
    #[error("failed to list {listing} in bucket '{bucket}': {message}")]
    List {
        bucket: String,
        listing: &'static str,
        message: String,
    },
    #[error("failed to delete objects from bucket '{bucket}': {message}")]
    Delete { bucket: String, message: String },
}

impl PurgeError {
    pub fn callback_message(&self) -> &'static str {
        UNEXPECTED_EVENT_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPurgeSummary {
    pub bucket: String,
    pub versions_deleted: usize,
    pub objects_deleted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub buckets: Vec<BucketPurgeSummary>,
}

pub fn handle_purge_request(
    properties: &ResourceProperties,
    store: &dyn ObjectStore,
) -> Result<PurgeSummary, PurgeError> {
    let buckets = properties.purge_targets()?;
    purge_buckets(buckets, store)
}

/// Empties every bucket in order, stopping at the first failure.
pub fn purge_buckets(
    buckets: &[String],
    store: &dyn ObjectStore,
) -> Result<PurgeSummary, PurgeError> {
    let mut summary = PurgeSummary::default();
    for bucket in buckets {
        summary.buckets.push(purge_bucket(bucket, store)?);
    }
    Ok(summary)
}

/// Stops access logging, then deletes every object version and every
/// current object in `bucket`.
///
/// Logging goes first: S3 would otherwise keep delivering access logs into
/// the bucket while it is emptied, leaving it non-empty for stack deletion.
pub fn purge_bucket(
    bucket: &str,
    store: &dyn ObjectStore,
) -> Result<BucketPurgeSummary, PurgeError> {
    info!(component = "purge", bucket, "stopping access logging");
    store
        .disable_access_logging(bucket)
        .map_err(|message| PurgeError::DisableLogging {
            bucket: bucket.to_string(),
            message,
        })?;

    info!(component = "purge", bucket, "purging bucket");
    let versions_deleted = delete_all_versions(bucket, store)?;
    let objects_deleted = delete_all_objects(bucket, store)?;

    info!(
        component = "purge",
        bucket,
        versions_deleted,
        objects_deleted,
        "bucket purged"
    );
    Ok(BucketPurgeSummary {
        bucket: bucket.to_string(),
        versions_deleted,
        objects_deleted,
    })
}

fn delete_all_versions(bucket: &str, store: &dyn ObjectStore) -> Result<usize, PurgeError> {
    let mut deleted = 0usize;
    let mut marker = None;
    loop {
        let page = store
            .list_object_versions(bucket, marker.as_ref())
            .map_err(|message| PurgeError::List {
                bucket: bucket.to_string(),
                listing: "object versions",
                message,
            })?;
        deleted += delete_in_batches(bucket, &page.versions, store)?;

        match page.next_marker {
            Some(next) => marker = Some(next),
            None => return Ok(deleted),
        }
    }
}

fn delete_all_objects(bucket: &str, store: &dyn ObjectStore) -> Result<usize, PurgeError> {
    let mut deleted = 0usize;
    let mut continuation_token: Option<String> = None;
    loop {
        let page = store
            .list_objects(bucket, continuation_token.as_deref())
            .map_err(|message| PurgeError::List {
                bucket: bucket.to_string(),
                listing: "objects",
                message,
            })?;
        let objects: Vec<ObjectRef> = page.keys.into_iter().map(ObjectRef::current).collect();
        deleted += delete_in_batches(bucket, &objects, store)?;

        match page.continuation_token {
            Some(token) => continuation_token = Some(token),
            None => return Ok(deleted),
        }
    }
}

fn delete_in_batches(
    bucket: &str,
    objects: &[ObjectRef],
    store: &dyn ObjectStore,
) -> Result<usize, PurgeError> {
    for batch in objects.chunks(MAX_DELETE_BATCH) {
        store
            .delete_objects(bucket, batch)
            .map_err(|message| PurgeError::Delete {
                bucket: bucket.to_string(),
                message,
            })?;
    }
    Ok(objects.len())
}
