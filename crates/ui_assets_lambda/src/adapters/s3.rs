use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
use aws_sdk_s3::operation::list_object_versions::ListObjectVersionsOutput;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLoggingStatus, Delete, ObjectIdentifier};
use ui_assets_core::storage_keys::copy_source;

use crate::adapters::object_store::{
    ObjectPage, ObjectRef, ObjectStore, VersionMarker, VersionPage,
};
use crate::adapters::run_blocking;

/// [`ObjectStore`] backed by the AWS S3 SDK client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), String> {
        run_blocking(
            self.client
                .copy_object()
                .copy_source(copy_source(source_bucket, source_key))
                .bucket(destination_bucket)
                .key(destination_key)
                .send(),
        )
        .map(|_| ())
        .map_err(|error| sdk_failure("copy object", error))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), String> {
        run_blocking(
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(body.to_vec()))
                .send(),
        )
        .map(|_| ())
        .map_err(|error| sdk_failure("write object", error))
    }

    fn disable_access_logging(&self, bucket: &str) -> Result<(), String> {
        run_blocking(
            self.client
                .put_bucket_logging()
                .bucket(bucket)
                .bucket_logging_status(BucketLoggingStatus::builder().build())
                .send(),
        )
        .map(|_| ())
        .map_err(|error| sdk_failure("disable bucket logging", error))
    }

    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage, String> {
        let output = run_blocking(
            self.client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(marker.map(|value| value.key_marker.clone()))
                .set_version_id_marker(marker.and_then(|value| value.version_id_marker.clone()))
                .send(),
        )
        .map_err(|error| sdk_failure("list object versions", error))?;
        Ok(version_page(&output))
    }

    fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String> {
        let output = run_blocking(
            self.client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.map(str::to_string))
                .send(),
        )
        .map_err(|error| sdk_failure("list objects", error))?;
        Ok(object_page(&output))
    }

    fn delete_objects(&self, bucket: &str, objects: &[ObjectRef]) -> Result<(), String> {
        if objects.is_empty() {
            return Ok(());
        }

        let identifiers = objects
            .iter()
            .map(|object| {
                ObjectIdentifier::builder()
                    .key(&object.key)
                    .set_version_id(object.version_id.clone())
                    .build()
                    .map_err(|error| format!("invalid object identifier '{}': {error}", object.key))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|error| format!("invalid delete request: {error}"))?;

        let output = run_blocking(
            self.client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send(),
        )
        .map_err(|error| sdk_failure("delete objects", error))?;

        match delete_errors(&output) {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }
}

/// Flattens the SDK error chain so the cause reaches the callback reason.
fn sdk_failure<E: std::error::Error>(action: &str, error: E) -> String {
    format!("failed to {action}: {}", DisplayErrorContext(error))
}

fn version_page(output: &ListObjectVersionsOutput) -> VersionPage {
    let versions = output
        .versions()
        .iter()
        .filter_map(|version| {
            version.key().map(|key| ObjectRef {
                key: key.to_string(),
                version_id: version.version_id().map(str::to_string),
            })
        })
        .chain(output.delete_markers().iter().filter_map(|marker| {
            marker.key().map(|key| ObjectRef {
                key: key.to_string(),
                version_id: marker.version_id().map(str::to_string),
            })
        }))
        .collect();

    let next_marker = if output.is_truncated().unwrap_or(false) {
        output.next_key_marker().map(|key| VersionMarker {
            key_marker: key.to_string(),
            version_id_marker: output.next_version_id_marker().map(str::to_string),
        })
    } else {
        None
    };

    VersionPage {
        versions,
        next_marker,
    }
}

fn object_page(output: &ListObjectsV2Output) -> ObjectPage {
    let keys = output
        .contents()
        .iter()
        .filter_map(|object| object.key().map(str::to_string))
        .collect();
    let continuation_token = if output.is_truncated().unwrap_or(false) {
        output.next_continuation_token().map(str::to_string)
    } else {
        None
    };

    ObjectPage {
        keys,
        continuation_token,
    }
}

fn delete_errors(output: &DeleteObjectsOutput) -> Option<String> {
    let failures: Vec<String> = output
        .errors()
        .iter()
        .map(|error| {
            format!(
                "{} ({}): {}",
                error.key().unwrap_or("<unknown>"),
                error.code().unwrap_or("Unknown"),
                error.message().unwrap_or("no message"),
            )
        })
        .collect();

    if failures.is_empty() {
        None
    } else {
        Some(format!(
            "failed to delete {} object(s): {}",
            failures.len(),
            failures.join("; ")
        ))
    }
}
