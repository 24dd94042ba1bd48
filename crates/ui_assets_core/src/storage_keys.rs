/// Key of a manifest asset under the source prefix.
pub fn source_object_key(source_prefix: &str, asset_key: &str) -> String {
    let prefix = source_prefix.trim_end_matches('/');
    let asset = asset_key.trim_start_matches('/');
    if prefix.is_empty() {
        asset.to_string()
    } else {
        format!("{prefix}/{asset}")
    }
}

/// `CopySource` value for a copy request: the bucket followed by the
/// URL-encoded key, with path separators left intact.
pub fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{bucket}/{}", encoded.join("/"))
}
