use crate::bucket::Granularity;

use super::http::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Route {
    Health,
    Sites,
    /// Percent-decoded site identifier.
    Data(String),
    Averages(Granularity),
}

/// Maps a request line onto a route. Unknown paths are 404 regardless of
/// method; known paths answer 405 to anything but GET.
pub(super) fn resolve_route(method: &str, target: &str) -> Result<Route, RequestError> {
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').skip(1).collect();

    let route = match segments.as_slice() {
        ["health"] => Route::Health,
        ["api", "sites"] => Route::Sites,
        ["api", "data", site] => Route::Data(decode_site(site)?),
        ["api", "averages", granularity] => {
            let granularity = granularity
                .parse::<Granularity>()
                .map_err(|err| RequestError::new(400, err.to_string()))?;
            Route::Averages(granularity)
        }
        _ => return Err(RequestError::new(404, format!("No route for '{}'", path))),
    };

    if method != "GET" {
        return Err(RequestError::new(
            405,
            format!("Method {} not allowed for '{}'", method, path),
        ));
    }
    Ok(route)
}

fn decode_site(raw: &str) -> Result<String, RequestError> {
    let decoded = urlencoding::decode(raw).map_err(|err| {
        RequestError::new(400, format!("Invalid percent-encoding in '{}': {}", raw, err))
    })?;
    Ok(decoded.into_owned())
}
