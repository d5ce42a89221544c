use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            _ => Err(anyhow::anyhow!("media kind must be 'movie' or 'tv'")),
        }
    }
}

/// A search hit reduced to the fields the card grid needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub media_type: MediaKind,
    pub title: String,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub original_language: Option<String>,
}

impl SearchResult {
    pub fn display_title(&self) -> &str {
        first_non_empty(&[Some(self.title.as_str()), self.name.as_deref()]).unwrap_or(UNTITLED)
    }

    pub fn year(&self) -> String {
        year_from(self.release_date.as_deref(), None)
    }

    /// Cards treat a zero average as "no votes yet".
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v != 0.0 => format!("{v:.1}"),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn language_label(&self) -> String {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| l.to_uppercase())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<CastMember>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Video>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub video_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full detail payload for one title, as returned by the metadata service.
///
/// Fields not named here are kept in `extra`, so serializing a `Details`
/// reproduces the payload it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Videos>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Details {
    pub fn display_title(&self) -> &str {
        first_non_empty(&[self.title.as_deref(), self.name.as_deref()]).unwrap_or(UNTITLED)
    }

    pub fn year(&self) -> String {
        year_from(self.release_date.as_deref(), self.first_air_date.as_deref())
    }

    pub fn release_label(&self) -> Option<&str> {
        first_non_empty(&[self.release_date.as_deref(), self.first_air_date.as_deref()])
    }

    pub fn rating_label(&self) -> String {
        rating_label(self.vote_average)
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .as_ref()
            .map(|g| {
                g.iter()
                    .filter_map(|x| x.name.as_deref().filter(|n| !n.is_empty()))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    /// Names of the first `max` billed cast members, skipping nameless entries.
    pub fn top_cast(&self, max: usize) -> Vec<&str> {
        self.credits
            .as_ref()
            .and_then(|c| c.cast.as_ref())
            .map(|cast| {
                cast.iter()
                    .filter_map(|c| c.name.as_deref().filter(|n| !n.is_empty()))
                    .take(max)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn trailer_url(&self) -> Option<String> {
        let videos = self.videos.as_ref()?.results.as_ref()?;
        let youtube = |kind: &str| {
            videos.iter().find_map(|v| {
                let on_youtube = v
                    .site
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case("YouTube"));
                let key = v.key.as_deref().filter(|k| !k.is_empty())?;
                (on_youtube && v.video_type.as_deref() == Some(kind)).then_some(key)
            })
        };
        youtube("Trailer")
            .or_else(|| youtube("Teaser"))
            .map(|key| format!("https://www.youtube.com/watch?v={key}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_priority: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Offers for one region. Categories not named here (`ads`, `free`, ...) stay in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionProviders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatrate: Option<Vec<WatchProvider>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Vec<WatchProvider>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy: Option<Vec<WatchProvider>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchProviders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<BTreeMap<String, RegionProviders>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchProviders {
    pub fn region(&self, region: &str) -> Option<&RegionProviders> {
        self.results.as_ref()?.get(region)
    }

    /// Subscription ("flatrate") offers for one region; empty when the region or list is absent.
    pub fn subscription(&self, region: &str) -> &[WatchProvider] {
        self.region(region)
            .and_then(|r| r.flatrate.as_deref())
            .unwrap_or(&[])
    }
}

pub fn image_url(base: &str, size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", base.trim_end_matches('/'), size, p))
}

pub fn rating_label(vote_average: Option<f64>) -> String {
    vote_average
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Four-digit year of the first present date, or `N/A`.
pub fn year_from(primary: Option<&str>, fallback: Option<&str>) -> String {
    first_non_empty(&[primary, fallback])
        .and_then(extract_year)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

fn extract_year(date: &str) -> Option<String> {
    date.split('-')
        .next()
        .filter(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit()))
        .map(|s| s.to_string())
}
