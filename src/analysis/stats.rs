use crate::models::scorecard::{Scorecard, GENERALIST, MAX_LEVEL, MIN_LEVEL, SUB_SCORE_CAP};
use crate::models::{GitHubUser, Repository};
use crate::taxonomy::archetype_for;

#[derive(Debug, Clone)]
pub struct StatWeights {
    pub commit_divisor: f64,
    pub follower_multiplier: f64,
    pub commits_per_repo_estimate: u64,
}

impl Default for StatWeights {
    fn default() -> Self {
        Self {
            commit_divisor: 25.0,
            follower_multiplier: 2.0,
            commits_per_repo_estimate: 20,
        }
    }
}

pub struct ScoreEngine {
    weights: StatWeights,
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self {
            weights: StatWeights::default(),
        }
    }

    pub fn with_weights(weights: StatWeights) -> Self {
        Self { weights }
    }

    pub fn compute_scorecard(
        &self,
        user: &GitHubUser,
        repos: &[Repository],
        total_commit_estimate: u64,
    ) -> Scorecard {
        let total_stars = repos
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.stargazers_count));

        // Square roots give diminishing returns so no single metric dominates.
        let commit_term = (total_commit_estimate as f64 / self.weights.commit_divisor).sqrt();
        let star_term = (total_stars as f64).sqrt();
        let social_term = (user.followers as f64 * self.weights.follower_multiplier).sqrt();

        let raw_level = (1.0 + commit_term + star_term + social_term).floor();
        // Degenerate weights (a zero divisor with no commits) give NaN.
        let level = if raw_level.is_nan() {
            MIN_LEVEL
        } else {
            raw_level.clamp(MIN_LEVEL as f64, MAX_LEVEL as f64) as u32
        };

        let tally = language_tally(repos);
        let top_language = top_language(&tally)
            .unwrap_or(GENERALIST)
            .to_string();
        let archetype = archetype_for(&top_language);

        let volume = cap((user.public_repos / 2).saturating_add(1));
        let breadth = cap((tally.len() as u64).saturating_mul(2).saturating_add(3));
        let velocity = cap((level as f64 * 1.5).floor() as u64 + 2);
        let social = cap((user.followers as f64).sqrt().floor() as u64 + 1);

        tracing::debug!(
            "Scorecard for {}: level {} ({}), top language {}",
            user.login,
            level,
            archetype,
            top_language
        );

        Scorecard {
            level,
            archetype,
            ability: archetype.ability().to_string(),
            volume,
            breadth,
            velocity,
            social,
            top_language,
            total_stars,
        }
    }

    pub fn estimate_total_commits(&self, user: &GitHubUser, sampled_commits: usize) -> u64 {
        user.public_repos
            .saturating_mul(self.weights.commits_per_repo_estimate)
            .saturating_add(sampled_commits as u64)
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub fn compute_scorecard(
    user: &GitHubUser,
    repos: &[Repository],
    total_commit_estimate: u64,
) -> Scorecard {
    ScoreEngine::new().compute_scorecard(user, repos, total_commit_estimate)
}

pub fn language_tally(repos: &[Repository]) -> Vec<(String, usize)> {
    let mut tally: Vec<(String, usize)> = Vec::new();

    for language in repos.iter().filter_map(Repository::language_label) {
        match tally.iter_mut().find(|(l, _)| l == language) {
            Some((_, count)) => *count += 1,
            None => tally.push((language.to_string(), 1)),
        }
    }

    tally
}

/// Most frequent label. Ties go to whichever label was seen first, so the
/// result depends on provider order, not on alphabetical order.
pub fn top_language(tally: &[(String, usize)]) -> Option<&str> {
    let mut best: Option<&(String, usize)> = None;
    for entry in tally {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(language, _)| language.as_str())
}

fn cap(value: u64) -> u32 {
    value.min(SUB_SCORE_CAP as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Archetype;
    use proptest::prelude::*;

    fn user(public_repos: u64, followers: u64) -> GitHubUser {
        let mut user = GitHubUser::new("tester");
        user.public_repos = public_repos;
        user.followers = followers;
        user
    }

    fn repo(language: Option<&str>, stars: u64) -> Repository {
        let mut repo = Repository::new("repo");
        repo.language = language.map(str::to_string);
        repo.stargazers_count = stars;
        repo
    }

    #[test]
    fn test_zero_input_yields_minimum_scorecard() {
        let card = compute_scorecard(&user(0, 0), &[], 0);
        assert_eq!(card.level, 1);
        assert_eq!(card.volume, 1);
        assert_eq!(card.breadth, 3);
        assert_eq!(card.velocity, 3);
        assert_eq!(card.social, 1);
        assert_eq!(card.top_language, GENERALIST);
        assert_eq!(card.archetype, Archetype::FullstackRanger);
        assert_eq!(card.ability, "Bug Hunt");
        assert_eq!(card.total_stars, 0);
    }

    #[test]
    fn test_single_repo_without_language() {
        let card = compute_scorecard(&user(1, 0), &[repo(None, 0)], 0);
        assert_eq!(card.top_language, GENERALIST);
        assert_eq!(card.breadth, 3);
        assert_eq!(card.archetype, Archetype::FullstackRanger);
    }

    #[test]
    fn test_huge_follower_count_clamps() {
        let card = compute_scorecard(&user(u64::MAX, u64::MAX), &[repo(Some("Go"), u64::MAX)], u64::MAX);
        assert_eq!(card.level, 99);
        assert_eq!(card.volume, 20);
        assert_eq!(card.velocity, 20);
        assert_eq!(card.social, 20);
        assert_eq!(card.total_stars, u64::MAX);
    }

    #[test]
    fn test_level_formula() {
        // 1 + sqrt(100/25) + sqrt(9) + sqrt(8*2) = 1 + 2 + 3 + 4
        let card = compute_scorecard(&user(4, 8), &[repo(Some("Rust"), 9)], 100);
        assert_eq!(card.level, 10);
        assert_eq!(card.velocity, 17);
        assert_eq!(card.volume, 3);
        assert_eq!(card.social, 3);
        assert_eq!(card.archetype, Archetype::MemoryWarlord);
    }

    #[test]
    fn test_top_language_tie_break_is_first_seen() {
        let repos = [repo(Some("A"), 0), repo(Some("B"), 0), repo(Some("A"), 0)];
        assert_eq!(compute_scorecard(&user(3, 0), &repos, 0).top_language, "A");

        let repos = [repo(Some("B"), 0), repo(Some("A"), 0)];
        assert_eq!(compute_scorecard(&user(2, 0), &repos, 0).top_language, "B");
    }

    #[test]
    fn test_breadth_counts_distinct_languages() {
        let repos = [
            repo(Some("Rust"), 1),
            repo(Some("Python"), 2),
            repo(Some("Rust"), 3),
            repo(None, 4),
        ];
        let card = compute_scorecard(&user(4, 0), &repos, 0);
        assert_eq!(card.breadth, 7);
        assert_eq!(card.total_stars, 10);
    }

    #[test]
    fn test_commit_estimate() {
        let engine = ScoreEngine::new();
        assert_eq!(engine.estimate_total_commits(&user(3, 0), 12), 72);
        assert_eq!(engine.estimate_total_commits(&user(u64::MAX, 0), 1), u64::MAX);
    }

    #[test]
    fn test_degenerate_weights_keep_level_in_range() {
        let engine = ScoreEngine::with_weights(StatWeights {
            commit_divisor: 0.0,
            ..StatWeights::default()
        });
        // 0 / 0 is NaN.
        assert_eq!(engine.compute_scorecard(&user(0, 0), &[], 0).level, MIN_LEVEL);
        // n / 0 is infinite and clamps to the top.
        assert_eq!(engine.compute_scorecard(&user(0, 0), &[], 10).level, MAX_LEVEL);

        let engine = ScoreEngine::with_weights(StatWeights {
            commits_per_repo_estimate: 5,
            ..StatWeights::default()
        });
        assert_eq!(engine.estimate_total_commits(&user(3, 0), 1), 16);
    }

    proptest! {
        #[test]
        fn prop_level_and_sub_scores_stay_in_range(
            public_repos in 0u64..=10_000,
            followers in 0u64..=10_000,
            commits in 0u64..=1_000_000,
            stars in proptest::collection::vec(0u64..=100_000, 0..20),
        ) {
            let repos: Vec<_> = stars.iter().map(|s| repo(Some("Rust"), *s)).collect();
            let card = compute_scorecard(&user(public_repos, followers), &repos, commits);
            prop_assert!((1..=99).contains(&card.level));
            prop_assert!((1..=20).contains(&card.volume));
            prop_assert!((3..=20).contains(&card.breadth));
            prop_assert!((3..=20).contains(&card.velocity));
            prop_assert!((1..=20).contains(&card.social));
        }
    }
}
