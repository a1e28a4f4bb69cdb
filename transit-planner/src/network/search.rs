//! Stop lookup by name.
//!
//! Travellers rarely know stop ids, so the service layer resolves free text
//! to stops here.

use super::Network;
use crate::domain::StopId;

/// A stop matching a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMatch {
    pub id: StopId,
    pub name: String,
}

/// How well a stop matched; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Id,
    ExactName,
    NamePrefix,
    NameContains,
}

impl Network {
    /// Search stops by id or by case-insensitive name substring.
    ///
    /// Results are ordered exact id first, then exact name, name prefix and
    /// plain substring matches, each group by name and then id. An empty
    /// query matches nothing.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<StopMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(Rank, &str, &StopId)> = self
            .stops()
            .iter()
            .filter_map(|stop| {
                let name = stop.name().to_lowercase();
                let rank = if stop.id().as_str().to_lowercase() == needle {
                    Rank::Id
                } else if name == needle {
                    Rank::ExactName
                } else if name.starts_with(&needle) {
                    Rank::NamePrefix
                } else if name.contains(&needle) {
                    Rank::NameContains
                } else {
                    return None;
                };
                Some((rank, stop.name(), stop.id()))
            })
            .collect();

        hits.sort();
        hits.into_iter()
            .take(limit)
            .map(|(_, name, id)| StopMatch {
                id: id.clone(),
                name: name.to_string(),
            })
            .collect()
    }
}
