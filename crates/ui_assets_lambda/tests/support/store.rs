use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use ui_assets_lambda::adapters::object_store::{
    ObjectPage, ObjectRef, ObjectStore, VersionMarker, VersionPage,
};

/// Storage call observed by [`InMemoryStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Copy {
        source_bucket: String,
        source_key: String,
        destination_bucket: String,
        destination_key: String,
    },
    Put {
        bucket: String,
        key: String,
    },
    DisableLogging {
        bucket: String,
    },
    ListVersions {
        bucket: String,
    },
    ListObjects {
        bucket: String,
    },
    Delete {
        bucket: String,
    },
}

impl Operation {
    pub fn bucket(&self) -> &str {
        match self {
            Self::Copy {
                destination_bucket, ..
            } => destination_bucket,
            Self::Put { bucket, .. }
            | Self::DisableLogging { bucket }
            | Self::ListVersions { bucket }
            | Self::ListObjects { bucket }
            | Self::Delete { bucket } => bucket,
        }
    }
}

#[derive(Debug, Clone)]
struct Version {
    id: u64,
    /// `None` marks a delete marker.
    body: Option<Vec<u8>>,
}

#[derive(Default)]
struct State {
    /// bucket -> key -> versions, oldest first.
    buckets: BTreeMap<String, BTreeMap<String, Vec<Version>>>,
    logging_enabled: BTreeSet<String>,
    operations: Vec<Operation>,
    next_version: u64,
}

impl State {
    fn push_version(&mut self, bucket: &str, key: &str, body: Option<Vec<u8>>) {
        self.next_version += 1;
        let id = self.next_version;
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(Version { id, body });
    }

    fn current_body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .get(bucket)?
            .get(key)?
            .last()
            .and_then(|version| version.body.clone())
    }
}

/// Versioned, in-memory stand-in for S3 with small listing pages so
/// pagination is exercised.
pub struct InMemoryStore {
    state: Mutex<State>,
    page_size: usize,
    failures: Mutex<Vec<Operation>>,
}

impl InMemoryStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size,
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn seed(&self, bucket: &str, key: &str, body: &[u8]) {
        self.state
            .lock()
            .expect("poisoned mutex")
            .push_version(bucket, key, Some(body.to_vec()));
    }

    pub fn seed_delete_marker(&self, bucket: &str, key: &str) {
        self.state
            .lock()
            .expect("poisoned mutex")
            .push_version(bucket, key, None);
    }

    pub fn enable_logging(&self, bucket: &str) {
        self.state
            .lock()
            .expect("poisoned mutex")
            .logging_enabled
            .insert(bucket.to_string());
    }

    /// Makes the next matching call fail.
    pub fn fail_on(&self, operation: Operation) {
        self.failures
            .lock()
            .expect("poisoned mutex")
            .push(operation);
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state
            .lock()
            .expect("poisoned mutex")
            .operations
            .clone()
    }

    pub fn current_body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .expect("poisoned mutex")
            .current_body(bucket, key)
    }

    /// Current objects of a bucket, keyed by object key.
    pub fn snapshot(&self, bucket: &str) -> BTreeMap<String, Vec<u8>> {
        let state = self.state.lock().expect("poisoned mutex");
        state
            .buckets
            .get(bucket)
            .map(|objects| {
                objects
                    .iter()
                    .filter_map(|(key, versions)| {
                        versions
                            .last()
                            .and_then(|version| version.body.clone())
                            .map(|body| (key.clone(), body))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Object versions and delete markers held by a bucket.
    pub fn version_count(&self, bucket: &str) -> usize {
        let state = self.state.lock().expect("poisoned mutex");
        state
            .buckets
            .get(bucket)
            .map(|objects| objects.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn logging_enabled(&self, bucket: &str) -> bool {
        self.state
            .lock()
            .expect("poisoned mutex")
            .logging_enabled
            .contains(bucket)
    }

    fn record(&self, operation: Operation) -> Result<(), String> {
        let mut failures = self.failures.lock().expect("poisoned mutex");
        let injected = failures
            .iter()
            .position(|candidate| *candidate == operation);
        self.state
            .lock()
            .expect("poisoned mutex")
            .operations
            .push(operation.clone());

        match injected {
            Some(index) => {
                failures.remove(index);
                Err(format!("injected failure for {operation:?}"))
            }
            None => Ok(()),
        }
    }
}

impl ObjectStore for InMemoryStore {
    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), String> {
        self.record(Operation::Copy {
            source_bucket: source_bucket.to_string(),
            source_key: source_key.to_string(),
            destination_bucket: destination_bucket.to_string(),
            destination_key: destination_key.to_string(),
        })?;

        let mut state = self.state.lock().expect("poisoned mutex");
        let body = state
            .current_body(source_bucket, source_key)
            .ok_or_else(|| format!("NoSuchKey: s3://{source_bucket}/{source_key}"))?;
        state.push_version(destination_bucket, destination_key, Some(body));
        Ok(())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        _content_type: &str,
    ) -> Result<(), String> {
        self.record(Operation::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        self.state
            .lock()
            .expect("poisoned mutex")
            .push_version(bucket, key, Some(body.to_vec()));
        Ok(())
    }

    fn disable_access_logging(&self, bucket: &str) -> Result<(), String> {
        self.record(Operation::DisableLogging {
            bucket: bucket.to_string(),
        })?;

        self.state
            .lock()
            .expect("poisoned mutex")
            .logging_enabled
            .remove(bucket);
        Ok(())
    }

    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage, String> {
        self.record(Operation::ListVersions {
            bucket: bucket.to_string(),
        })?;

        let state = self.state.lock().expect("poisoned mutex");
        let resume_after = |key: &str, id: u64| match marker {
            None => true,
            Some(marker) => {
                let marker_id = marker
                    .version_id_marker
                    .as_deref()
                    .and_then(|value| value.parse::<u64>().ok());
                match key.cmp(marker.key_marker.as_str()) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Equal => marker_id.is_some_and(|marker_id| id < marker_id),
                    std::cmp::Ordering::Less => false,
                }
            }
        };

        // Newest version first within a key, as S3 lists them.
        let remaining: Vec<(String, u64)> = state
            .buckets
            .get(bucket)
            .into_iter()
            .flat_map(|objects| objects.iter())
            .flat_map(|(key, versions)| {
                versions
                    .iter()
                    .rev()
                    .map(move |version| (key.clone(), version.id))
            })
            .filter(|(key, id)| resume_after(key.as_str(), *id))
            .collect();

        let page: Vec<(String, u64)> = remaining.iter().take(self.page_size).cloned().collect();
        let next_marker = if remaining.len() > page.len() {
            page.last().map(|(key, id)| VersionMarker {
                key_marker: key.clone(),
                version_id_marker: Some(id.to_string()),
            })
        } else {
            None
        };

        Ok(VersionPage {
            versions: page
                .into_iter()
                .map(|(key, id)| ObjectRef::version(key, id.to_string()))
                .collect(),
            next_marker,
        })
    }

    fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String> {
        self.record(Operation::ListObjects {
            bucket: bucket.to_string(),
        })?;

        let resumes = |key: &String| continuation_token.is_none_or(|token| key.as_str() > token);
        let state = self.state.lock().expect("poisoned mutex");
        let remaining: Vec<String> = state
            .buckets
            .get(bucket)
            .into_iter()
            .flat_map(|objects| objects.iter())
            .filter(|(_, versions)| {
                versions
                    .last()
                    .is_some_and(|version| version.body.is_some())
            })
            .map(|(key, _)| key.clone())
            .filter(resumes)
            .collect();

        let keys: Vec<String> = remaining.iter().take(self.page_size).cloned().collect();
        let continuation_token = if remaining.len() > keys.len() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            continuation_token,
        })
    }

    fn delete_objects(&self, bucket: &str, objects: &[ObjectRef]) -> Result<(), String> {
        assert!(objects.len() <= 1_000, "delete batch over 1000 keys");
        self.record(Operation::Delete {
            bucket: bucket.to_string(),
        })?;

        let mut state = self.state.lock().expect("poisoned mutex");
        for object in objects {
            match &object.version_id {
                Some(version_id) => {
                    let Ok(id) = version_id.parse::<u64>() else {
                        continue;
                    };
                    if let Some(versions) = state
                        .buckets
                        .get_mut(bucket)
                        .and_then(|objects| objects.get_mut(&object.key))
                    {
                        versions.retain(|version| version.id != id);
                    }
                }
                None => state.push_version(bucket, &object.key, None),
            }
        }
        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.retain(|_, versions| !versions.is_empty());
        }
        Ok(())
    }
}
