use url::Url;

/// Returns true when `target` points inside this application.
///
/// Accepts `/path` and `~/path`. Rejects absolute URLs, protocol-relative
/// `//host` forms, and the `/\host` trick some browsers treat as `//host`.
pub fn is_local_url(target: &str) -> bool {
    if target.is_empty() || target.chars().any(|c| c.is_control()) {
        return false;
    }
    if Url::parse(target).is_ok() {
        return false;
    }

    let bytes = target.as_bytes();
    match bytes[0] {
        b'/' => bytes.len() == 1 || (bytes[1] != b'/' && bytes[1] != b'\\'),
        b'~' => {
            bytes.len() > 1
                && bytes[1] == b'/'
                && (bytes.len() == 2 || (bytes[2] != b'/' && bytes[2] != b'\\'))
        }
        _ => false,
    }
}

/// Picks where to send the user after login: the requested page when it is
/// local, the home page otherwise.
pub fn local_or_home(target: Option<&str>) -> String {
    match target {
        Some(t) if is_local_url(t) => match t.strip_prefix('~') {
            Some(rest) => rest.to_string(),
            None => t.to_string(),
        },
        _ => "/".to_string(),
    }
}
