//! Topic word pools.
//!
//! The repository is built once at startup and never mutated afterwards.
//! Every topic it holds has at least two distinct words, so a round can
//! always draw a citizen word and a different wolf word from it.
//!
//! Topic files are UTF-8, one topic per line:
//!
//! ```text
//! # comment
//! animals|dog,cat,rabbit
//! fruit|apple,pear
//! ```

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// A named category with its candidate words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    name: String,
    words: Vec<String>,
}

impl Topic {
    /// Create a topic. Words are trimmed, empty entries dropped and
    /// duplicates removed (first occurrence wins).
    pub fn new<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.clone()))
            .collect();
        Self {
            name: name.into().trim().to_string(),
            words,
        }
    }

    /// Topic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct candidate words.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whether a round can be played with this topic.
    pub fn is_playable(&self) -> bool {
        self.words.len() >= 2
    }
}

/// Immutable collection of playable topics, in load order.
#[derive(Debug, Clone, Default)]
pub struct ThemeRepository {
    topics: Vec<Topic>,
}

impl ThemeRepository {
    /// Build a repository, rejecting unplayable or duplicate topics.
    pub fn from_topics(topics: impl IntoIterator<Item = Topic>) -> GameResult<Self> {
        let mut repo = Self::default();
        for topic in topics {
            repo.insert(topic)?;
        }
        Ok(repo)
    }

    /// Parse the line-oriented topic format.
    pub fn parse(source: &str) -> GameResult<Self> {
        let mut repo = Self::default();
        for (idx, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            let Some((name, words)) = line.split_once('|') else {
                return Err(GameError::Configuration(format!(
                    "line {line_no}: expected `topic|word,word,...`"
                )));
            };
            if name.trim().is_empty() {
                return Err(GameError::Configuration(format!(
                    "line {line_no}: topic name is empty"
                )));
            }
            repo.insert(Topic::new(name, words.split(',')))
                .map_err(|e| match e {
                    GameError::Configuration(msg) => {
                        GameError::Configuration(format!("line {line_no}: {msg}"))
                    }
                    other => other,
                })?;
        }
        Ok(repo)
    }

    /// Read and parse a topic file.
    pub fn load(path: &Path) -> GameResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            GameError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let repo = Self::parse(&source)?;
        tracing::info!(path = %path.display(), topics = repo.len(), "loaded topics");
        Ok(repo)
    }

    fn insert(&mut self, topic: Topic) -> GameResult<()> {
        if !topic.is_playable() {
            return Err(GameError::Configuration(format!(
                "topic \"{}\" needs at least 2 distinct words, has {}",
                topic.name,
                topic.words.len()
            )));
        }
        if self.get(&topic.name).is_some() {
            return Err(GameError::Configuration(format!(
                "duplicate topic \"{}\"",
                topic.name
            )));
        }
        self.topics.push(topic);
        Ok(())
    }

    /// Look up a topic by exact name.
    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    /// Pick a topic uniformly at random.
    pub fn pick_random_topic(&self, rng: &mut StdRng) -> GameResult<&Topic> {
        if self.topics.is_empty() {
            return Err(GameError::NoTopicsAvailable);
        }
        Ok(&self.topics[rng.random_range(0..self.topics.len())])
    }

    /// Topic names in load order.
    pub fn list_topics(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }

    /// All topics in load order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the repository holds no topics.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const SAMPLE: &str = "\
# party topics
animals|dog,cat,rabbit

fruit| apple , pear
";

    #[test]
    fn parse_skips_comments_and_blanks() {
        let repo = ThemeRepository::parse(SAMPLE).unwrap();
        assert_eq!(repo.list_topics(), vec!["animals", "fruit"]);
        assert_eq!(repo.get("fruit").unwrap().words(), ["apple", "pear"]);
    }

    #[test]
    fn parse_rejects_missing_delimiter() {
        let err = ThemeRepository::parse("animals dog,cat").unwrap_err();
        assert!(matches!(err, GameError::Configuration(ref m) if m.starts_with("line 1")));
    }

    #[test]
    fn parse_rejects_single_word_topic() {
        let err = ThemeRepository::parse("animals|dog,cat\nfruit|apple").unwrap_err();
        match err {
            GameError::Configuration(msg) => {
                assert!(msg.starts_with("line 2"));
                assert!(msg.contains("fruit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_words_do_not_count() {
        let err = ThemeRepository::parse("animals|dog,dog, dog").unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)));
    }

    #[test]
    fn parse_rejects_duplicate_topics() {
        let err = ThemeRepository::parse("a|x,y\na|z,w").unwrap_err();
        assert!(matches!(err, GameError::Configuration(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn parse_rejects_empty_name() {
        assert!(ThemeRepository::parse("|x,y").is_err());
    }

    #[test]
    fn topic_new_dedupes_and_trims() {
        let topic = Topic::new(" sea ", ["whale", " whale", "", "shark"]);
        assert_eq!(topic.name(), "sea");
        assert_eq!(topic.words(), ["whale", "shark"]);
        assert!(topic.is_playable());
    }

    #[test]
    fn pick_random_from_empty_fails() {
        let repo = ThemeRepository::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            repo.pick_random_topic(&mut rng).unwrap_err(),
            GameError::NoTopicsAvailable
        );
    }

    #[test]
    fn pick_random_returns_known_topic() {
        let repo = ThemeRepository::parse(SAMPLE).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let topic = repo.pick_random_topic(&mut rng).unwrap();
            assert!(repo.get(topic.name()).is_some());
        }
    }

    #[test]
    fn load_missing_file_is_configuration_error() {
        let err = ThemeRepository::load(Path::new("/nonexistent/topics.txt")).unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)));
    }

    #[test]
    fn empty_source_is_empty_repository() {
        let repo = ThemeRepository::parse("# nothing here\n").unwrap();
        assert!(repo.is_empty());
        assert_eq!(repo.len(), 0);
    }
}
