//! Namespace and object path helpers.
//!
//! Namespaces are dotted (`com.example.Service`), object paths are slashed
//! (`/com/example/Service`). Declaring code may use either spelling for a
//! namespace; it is normalized to dots.

/// Converts slashes to dots.
pub fn dot_notation(name: &str) -> String {
    name.replace('/', ".")
}

/// Converts dots to slashes.
pub fn slash_notation(name: &str) -> String {
    name.replace('.', "/")
}

/// Joins namespace segments with dots, normalizing each to dot notation.
///
/// Leading and trailing separators of each segment are trimmed and empty
/// segments are skipped.
///
/// ```
/// # use busdecl_core::path::join_path;
/// assert_eq!(join_path(["com/example", "Service"]), "com.example.Service");
/// assert_eq!(join_path(["com.example.", "", "Service"]), "com.example.Service");
/// ```
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| dot_notation(segment.as_ref()).trim_matches('.').to_string())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Derives the default object path for a service or interface name.
///
/// ```
/// # use busdecl_core::path::service_path;
/// assert_eq!(service_path("com.example.service"), "/com/example/service");
/// ```
pub fn service_path(service_name: &str) -> String {
    format!("/{}", slash_notation(service_name.trim_matches('.')))
}
