// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// One song entry returned by the catalog search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// Catalog track id (`trackId`).
    #[serde(rename = "trackId")]
    pub id: i64,
    /// Track title (`trackName`).
    #[serde(rename = "trackName")]
    pub title: String,
    /// Album or collection the track belongs to (`collectionName`).
    #[serde(rename = "collectionName")]
    pub album_or_collection_name: String,
}

/// Ordered list of tracks, in the order the server returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    tracks: Vec<Track>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

impl From<Vec<Track>> for SearchResult {
    fn from(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Top-level body of `GET /search`. Fields other than `results`
/// (e.g. `resultCount`) are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub results: Vec<Track>,
}

/// How the search term is placed into the `term` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryEncoding {
    /// Replace spaces with `+` and leave every other character as typed.
    /// Reserved characters such as `&` or `#` therefore leak into the URL.
    #[default]
    Spaces,
    /// Full `application/x-www-form-urlencoded` encoding of the term.
    Form,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_results_in_order_and_ignores_extra_fields() {
        let body = serde_json::json!({
            "resultCount": 2,
            "results": [
                {
                    "wrapperType": "track",
                    "trackId": 2,
                    "trackName": "Billie Jean",
                    "collectionName": "Thriller",
                    "artistName": "Michael Jackson"
                },
                {
                    "trackId": 1,
                    "trackName": "Beat It",
                    "collectionName": "Thriller"
                }
            ]
        });

        let response: SearchResponse = serde_json::from_value(body).unwrap();
        let result = SearchResult::from(response.results);

        let titles: Vec<_> = result.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Billie Jean", "Beat It"]);
        assert_eq!(result.tracks()[0].id, 2);
    }

    #[test]
    fn mistyped_field_fails_whole_decode() {
        let body = serde_json::json!({
            "results": [
                { "trackId": 1, "trackName": "A", "collectionName": "B" },
                { "trackId": "2", "trackName": "C", "collectionName": "D" }
            ]
        });

        assert!(serde_json::from_value::<SearchResponse>(body).is_err());
    }

    #[test]
    fn missing_results_field_fails() {
        let body = serde_json::json!({ "resultCount": 0 });
        assert!(serde_json::from_value::<SearchResponse>(body).is_err());
    }

    #[test]
    fn encoding_parses_from_lowercase_names() {
        let spaces: QueryEncoding = serde_json::from_str("\"spaces\"").unwrap();
        let form: QueryEncoding = serde_json::from_str("\"form\"").unwrap();
        assert_eq!(spaces, QueryEncoding::Spaces);
        assert_eq!(form, QueryEncoding::Form);
    }
}
