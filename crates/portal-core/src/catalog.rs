//! Catalog of media items and series.
//!
//! The catalog is seeded from a TOML file and grows through contributions.
//! Items are never mutated or removed once added.

use crate::error::{PortalError, PortalResult};
use crate::models::{AgeRating, MediaItem, MediaType, Series};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    media: Vec<MediaItem>,
}

/// Library shelves for the browse view
#[derive(Debug, Default)]
pub struct Shelves<'a> {
    pub papers: Vec<&'a MediaItem>,
    pub magazines: Vec<&'a MediaItem>,
    pub ebooks: Vec<&'a MediaItem>,
    pub podcasts: Vec<&'a MediaItem>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    series: Vec<Series>,
    media: Vec<MediaItem>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating every item as it is added.
    ///
    /// `current_episodes` is recomputed from the linked items.
    pub fn from_parts(series: Vec<Series>, media: Vec<MediaItem>) -> PortalResult<Self> {
        let mut catalog = Self::new();
        for mut s in series {
            if catalog.series(&s.id).is_some() {
                return Err(PortalError::DuplicateItem(s.id));
            }
            s.current_episodes = 0;
            catalog.series.push(s);
        }
        for item in media {
            catalog.add_item(item)?;
        }
        Ok(catalog)
    }

    /// Load the catalog seed from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let file: CatalogFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;

        let catalog = Self::from_parts(file.series, file.media)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

        info!(
            path = %path.display(),
            series = catalog.series.len(),
            media = catalog.media.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    pub fn all_series(&self) -> &[Series] {
        &self.series
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn series(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.id == id)
    }

    /// Ingest an item. Episodes must reference a known series with a fresh,
    /// positive episode number; the series' episode counter is bumped.
    pub fn add_item(&mut self, item: MediaItem) -> PortalResult<()> {
        if self.item(&item.id).is_some() {
            return Err(PortalError::DuplicateItem(item.id));
        }

        match (&item.series_id, item.episode_number) {
            (None, None) => {}
            (Some(series_id), Some(episode)) if episode > 0 => {
                let taken = self.media.iter().any(|m| {
                    m.series_id.as_deref() == Some(series_id.as_str())
                        && m.episode_number == Some(episode)
                });
                if taken {
                    return Err(PortalError::DuplicateEpisode {
                        series_id: series_id.clone(),
                        episode,
                    });
                }

                let series = self
                    .series
                    .iter_mut()
                    .find(|s| &s.id == series_id)
                    .ok_or_else(|| PortalError::UnknownSeries(series_id.clone()))?;
                series.current_episodes += 1;

                debug!(
                    series_id = %series_id,
                    episode,
                    current_episodes = series.current_episodes,
                    "Episode added to series"
                );
            }
            _ => return Err(PortalError::InvalidEpisode(item.id)),
        }

        self.media.push(item);
        Ok(())
    }

    /// Episodes of a series in episode order
    pub fn episodes(&self, series_id: &str) -> Vec<&MediaItem> {
        let mut episodes: Vec<_> = self
            .media
            .iter()
            .filter(|m| m.series_id.as_deref() == Some(series_id))
            .collect();
        episodes.sort_by_key(|m| m.episode_number.unwrap_or(0));
        episodes
    }

    /// Case-insensitive match on title, author or topic, optionally limited
    /// to one category
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&MediaItem> {
        let query = query.to_lowercase();
        self.media
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&query)
                    || m.author.to_lowercase().contains(&query)
                    || m.topic.to_lowercase().contains(&query)
            })
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect()
    }

    pub fn shelves(&self) -> Shelves<'_> {
        let mut shelves = Shelves::default();
        for item in &self.media {
            match item.media_type {
                MediaType::Paper => shelves.papers.push(item),
                MediaType::Magazine | MediaType::Tabloid => shelves.magazines.push(item),
                MediaType::Ebook => shelves.ebooks.push(item),
                MediaType::Podcast => shelves.podcasts.push(item),
                _ => {}
            }
        }
        shelves
    }

    /// The Sunday film shelf
    pub fn films(&self) -> Vec<&MediaItem> {
        self.media
            .iter()
            .filter(|m| m.media_type == MediaType::Film)
            .collect()
    }

    /// Items rated at or below the given preference
    pub fn age_appropriate(&self, preference: AgeRating) -> Vec<&MediaItem> {
        self.media
            .iter()
            .filter(|m| m.age_rating <= preference)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReleasePattern;
    use tempfile::TempDir;

    const SEED: &str = r#"
[[series]]
id = "s1"
title = "The Neural Frontier"
author = "AI Research Hub"
category = "Computer Science"
duration = 15
episodes_per_period = 36
pattern = "MWF"
cycle_start_month = 0

[[media]]
id = "paper1"
title = "The Global Observer"
author = "Objective Press"
type = "paper"
duration = 15
category = "Civics"
topic = "Constitutional Law"
age_rating = "13+"
is_human_made = true
release_frequency = "daily"

[[media]]
id = "ep2"
title = "Backpropagation"
author = "AI Research Hub"
type = "video"
duration = 15
category = "Computer Science"
topic = "Neural Networks"
age_rating = "8+"
series_id = "s1"
episode_number = 2

[[media]]
id = "ep1"
title = "Neurons"
author = "AI Research Hub"
type = "video"
duration = 15
category = "Computer Science"
topic = "Neural Networks"
age_rating = "8+"
series_id = "s1"
episode_number = 1

[[media]]
id = "film1"
title = "Origins"
author = "Darewast Films"
type = "film"
duration = 120
category = "Biology"
age_rating = "18+"
"#;

    fn episode(id: &str, series_id: &str, episode_number: u32) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: id.to_string(),
            author: String::new(),
            media_type: MediaType::Video,
            duration: 15,
            category: "Computer Science".to_string(),
            topic: String::new(),
            theme: String::new(),
            genre: String::new(),
            description: String::new(),
            age_rating: AgeRating::Eight,
            is_human_made: false,
            series_id: Some(series_id.to_string()),
            episode_number: Some(episode_number),
            release_frequency: None,
        }
    }

    fn load_seed() -> Result<Catalog> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(&path, SEED)?;
        Catalog::from_file(&path)
    }

    #[test]
    fn test_load_seed_file() -> Result<()> {
        let catalog = load_seed()?;

        assert_eq!(catalog.all_series().len(), 1);
        assert_eq!(catalog.media().len(), 4);

        let series = catalog.series("s1").unwrap();
        assert_eq!(series.pattern, ReleasePattern::Mwf);
        assert_eq!(series.current_episodes, 2);

        let order: Vec<_> = catalog.episodes("s1").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["ep1", "ep2"]);

        Ok(())
    }

    #[test]
    fn test_add_episode_validation() -> Result<()> {
        let mut catalog = load_seed()?;

        assert_eq!(
            catalog.add_item(episode("dup", "s1", 1)),
            Err(PortalError::DuplicateEpisode {
                series_id: "s1".to_string(),
                episode: 1
            })
        );
        assert_eq!(
            catalog.add_item(episode("orphan", "nope", 1)),
            Err(PortalError::UnknownSeries("nope".to_string()))
        );
        assert_eq!(
            catalog.add_item(episode("zero", "s1", 0)),
            Err(PortalError::InvalidEpisode("zero".to_string()))
        );
        assert_eq!(
            catalog.add_item(episode("ep1", "s1", 9)),
            Err(PortalError::DuplicateItem("ep1".to_string()))
        );

        // Gaps are tolerated
        catalog.add_item(episode("ep5", "s1", 5))?;
        assert_eq!(catalog.series("s1").unwrap().current_episodes, 3);
        assert_eq!(catalog.episodes("s1").last().unwrap().id, "ep5");

        Ok(())
    }

    #[test]
    fn test_search_and_filter() -> Result<()> {
        let catalog = load_seed()?;

        assert_eq!(catalog.search("NEURAL", None).len(), 2);
        assert_eq!(catalog.search("observer", Some("Civics")).len(), 1);
        assert!(catalog.search("observer", Some("Biology")).is_empty());
        assert_eq!(catalog.search("", None).len(), 4);

        Ok(())
    }

    #[test]
    fn test_shelves_films_and_ratings() -> Result<()> {
        let catalog = load_seed()?;

        let shelves = catalog.shelves();
        assert_eq!(shelves.papers.len(), 1);
        assert!(shelves.magazines.is_empty());

        assert_eq!(catalog.films().len(), 1);
        assert_eq!(catalog.age_appropriate(AgeRating::Thirteen).len(), 3);
        assert_eq!(catalog.age_appropriate(AgeRating::Three).len(), 0);

        Ok(())
    }

    #[test]
    fn test_bundled_seed_is_valid() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(&path, include_str!("../../../data/catalog.toml"))?;

        let catalog = Catalog::from_file(&path)?;
        assert_eq!(catalog.series("s1").unwrap().current_episodes, 2);
        assert!(!catalog.series("s2").unwrap().releases_daily());
        Ok(())
    }

    #[test]
    fn test_unknown_pattern_loads_as_unknown() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[series]]
id = "s9"
title = "Fortnightly Forum"
author = "Civic Desk"
category = "Civics"
duration = 15
episodes_per_period = 6
pattern = "BIWEEKLY"
cycle_start_month = 0
"#,
        )?;

        let catalog = Catalog::from_file(&path)?;
        assert_eq!(catalog.series("s9").unwrap().pattern, ReleasePattern::Unknown);
        Ok(())
    }

    #[test]
    fn test_negative_duration_rejected_at_parse() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[media]]
id = "bad"
title = "Bad"
type = "video"
duration = -5
category = "Math"
age_rating = "3+"
"#,
        )?;

        assert!(Catalog::from_file(&path).is_err());
        Ok(())
    }
}
