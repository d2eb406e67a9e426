use serde::Deserialize;

use scanner_core::{BookRecord, Isbn};
use scanner_logging::scanner_debug;

use crate::{FailureKind, LookupError, LookupResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    total_items: Option<u64>,
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    published_date: Option<String>,
    page_count: Option<u32>,
    image_links: Option<ImageLinks>,
    info_link: Option<String>,
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
}

/// Parses a `volumes?q=isbn:` response body and projects the first item.
///
/// Missing fields never fail the projection; only a body that is not a JSON
/// object of the expected shape does.
pub fn project_volumes(isbn: &Isbn, body: &[u8]) -> Result<LookupResult, LookupError> {
    let response: VolumesResponse = serde_json::from_slice(body)
        .map_err(|err| LookupError::new(FailureKind::InvalidResponse, err.to_string()))?;

    // Only an explicit zero overrides the item list; an absent count does not.
    if response.total_items == Some(0) {
        return Ok(LookupResult::NotFound);
    }
    let Some(volume) = response.items.and_then(|items| items.into_iter().next()) else {
        return Ok(LookupResult::NotFound);
    };

    let info = volume.volume_info.unwrap_or_default();
    let identifiers = info.industry_identifiers.unwrap_or_default();
    if !identifiers.is_empty()
        && !identifiers
            .iter()
            .any(|id| id.identifier.as_deref() == Some(isbn.as_str()))
    {
        let reported: Vec<String> = identifiers
            .iter()
            .map(|id| {
                format!(
                    "{}={}",
                    id.kind.as_deref().unwrap_or("?"),
                    id.identifier.as_deref().unwrap_or("?")
                )
            })
            .collect();
        scanner_debug!(
            "First volume for {} reports identifiers [{}]",
            isbn,
            reported.join(", ")
        );
    }

    Ok(LookupResult::Found(BookRecord {
        isbn: isbn.as_str().to_string(),
        title: info.title,
        authors: info.authors.unwrap_or_default(),
        published_date: info.published_date,
        page_count: info.page_count,
        thumbnail: info.image_links.and_then(|links| links.thumbnail),
        info_link: info.info_link,
    }))
}
