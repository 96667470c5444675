//! Frame configuration from the page URL.

use web_sys::{UrlSearchParams, Window};

use inkframe_core::{FrameConfig, PlatformError};

/// Query keys the frame understands.
pub const QUERY_KEYS: [&str; 3] = ["isReadOnly", "isCalHeight", "placeholder"];

/// Read `window.location.search` into a `FrameConfig`.
pub fn config_from_location(window: &Window) -> Result<FrameConfig, PlatformError> {
    let search = window
        .location()
        .search()
        .map_err(|e| PlatformError::from(format!("location.search unavailable: {:?}", e)))?;
    config_from_search(&search)
}

/// Parse a `?a=b&c=d` search string.
pub fn config_from_search(search: &str) -> Result<FrameConfig, PlatformError> {
    let params = UrlSearchParams::new_with_str(search)
        .map_err(|e| PlatformError::from(format!("invalid query string: {:?}", e)))?;
    let pairs = QUERY_KEYS
        .into_iter()
        .filter_map(|key| params.get(key).map(|value| (key, value)));
    Ok(FrameConfig::from_query_pairs(pairs))
}
