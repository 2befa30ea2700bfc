use anyhow::{Context, Result};

use crate::analysis::Coordinate;

/// Web map URL centered on `coord` with a marker.
pub fn map_url(coord: Coordinate) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lng:.6}#map=17/{lat:.6}/{lng:.6}",
        lat = coord.lat,
        lng = coord.lng
    )
}

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Show `coord` on a web map.
pub fn open_map(coord: Coordinate) -> Result<String> {
    let url = map_url(coord);
    open_url(&url)?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_url_marks_location() {
        let url = map_url(Coordinate {
            lat: 40.7589,
            lng: -73.9851,
        });
        assert_eq!(
            url,
            "https://www.openstreetmap.org/?mlat=40.758900&mlon=-73.985100#map=17/40.758900/-73.985100"
        );
    }
}
