use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use devcard::models::{BattleReport, DeveloperReport, Scorecard};
use devcard::{
    AnalysisPipeline, Cache, ChatCompletionsProvider, Config, GeneratorSettings, GitHubClient,
    NoCache, PipelineConfig, SqliteCache,
};

#[derive(Parser, Debug)]
#[command(name = "devcard")]
#[command(version = "0.1.0")]
#[command(about = "Gamified GitHub scorecards with AI analysis and head-to-head battles")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Always fetch fresh data from GitHub
    #[arg(long, global = true)]
    no_cache: bool,

    /// Cache database path (overrides CACHE_PATH)
    #[arg(long, global = true)]
    cache_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scorecard and analysis for one developer
    Profile {
        /// GitHub username
        username: String,
    },
    /// Compare two developers
    Battle {
        first: String,
        second: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("devcard=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let cache: Arc<dyn Cache> = if args.no_cache {
        Arc::new(NoCache)
    } else {
        let path = args.cache_path.as_deref().unwrap_or(&config.cache_path);
        Arc::new(SqliteCache::new(path)?)
    };

    let github = GitHubClient::new(config.github_token.as_ref())?;
    let generator = ChatCompletionsProvider::new(GeneratorSettings::from_config(&config))?;
    if !generator.has_credentials() {
        tracing::warn!("No GROQ_API_KEY or OPENAI_API_KEY set; analysis will use local heuristics");
    }

    let pipeline = AnalysisPipeline::new(
        Arc::new(github),
        Arc::new(generator),
        cache,
        PipelineConfig::from(&config),
    );

    let output = match &args.command {
        Command::Profile { username } => {
            let spinner = spinner(format!("Analyzing {}...", username))?;
            let report = pipeline.analyze_user(username).await;
            spinner.finish_and_clear();
            render_profile(&report?, args.format)?
        }
        Command::Battle { first, second } => {
            let spinner = spinner(format!("{} vs {}...", first, second))?;
            let report = pipeline.battle(first, second).await;
            spinner.finish_and_clear();
            render_battle(&report?, args.format)?
        }
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn render_profile(report: &DeveloperReport, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(report)?,
        Format::Markdown => profile_markdown(report),
        Format::Text => profile_text(report),
    })
}

fn render_battle(report: &BattleReport, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(report)?,
        Format::Markdown => battle_markdown(report),
        Format::Text => battle_text(report),
    })
}

fn scorecard_text(card: &Scorecard) -> String {
    format!(
        "Level {} {} ({})\n\
         Top language: {}  Stars: {}\n\
         Volume {:>2}  Breadth {:>2}  Velocity {:>2}  Social {:>2}\n",
        card.level,
        card.archetype,
        card.ability,
        card.top_language,
        card.total_stars,
        card.volume,
        card.breadth,
        card.velocity,
        card.social
    )
}

fn profile_text(report: &DeveloperReport) -> String {
    let mut output = String::new();
    let analysis = &report.analysis;

    output.push_str(&format!(
        "\n=== Developer Card: {} ===\n\n",
        report.user.display_name()
    ));
    if let Some(ref bio) = report.user.bio {
        output.push_str(&format!("{}\n\n", bio));
    }

    output.push_str(&scorecard_text(&report.scorecard));
    output.push_str(&format!(
        "Repositories: {}  Followers: {}  Commits sampled: {}\n",
        report.user.public_repos, report.user.followers, report.commits_sampled
    ));

    output.push_str(&format!("\nAnalysis ({}):\n", analysis.origin));
    if let Some(ref diagnostic) = analysis.diagnostic {
        output.push_str(&format!("  Reason: {}\n", diagnostic));
    }
    output.push_str(&format!(
        "  Productivity: {}/100  Quality: {}/100\n",
        analysis.commit_pattern.productivity_score, analysis.code_quality.overall_quality_score
    ));
    output.push_str(&format!("  {}\n", analysis.commit_pattern.work_pattern));
    output.push_str(&format!(
        "  Peak hours: {}\n",
        analysis.commit_pattern.peak_hours.join(", ")
    ));

    if !analysis.code_quality.strengths.is_empty() {
        output.push_str("\nStrengths:\n");
        for strength in &analysis.code_quality.strengths {
            output.push_str(&format!("  + {}\n", strength));
        }
    }
    if !analysis.code_quality.improvements.is_empty() {
        output.push_str("\nAreas for Improvement:\n");
        for improvement in &analysis.code_quality.improvements {
            output.push_str(&format!("  - {}\n", improvement));
        }
    }
    if !analysis.commit_pattern.recommendations.is_empty() {
        output.push_str("\nRecommendations:\n");
        for rec in &analysis.commit_pattern.recommendations {
            output.push_str(&format!("  * {}\n", rec));
        }
    }

    output.push_str(&format!(
        "\nGenerated on: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}

fn profile_markdown(report: &DeveloperReport) -> String {
    let mut output = String::new();
    let card = &report.scorecard;
    let analysis = &report.analysis;

    output.push_str(&format!("# {}\n\n", report.user.display_name()));
    if let Some(ref bio) = report.user.bio {
        output.push_str(&format!("> {}\n\n", bio));
    }

    output.push_str("## Scorecard\n\n");
    output.push_str("| Stat | Value |\n|------|-------|\n");
    output.push_str(&format!("| Level | {} |\n", card.level));
    output.push_str(&format!("| Class | {} |\n", card.archetype));
    output.push_str(&format!("| Ability | {} |\n", card.ability));
    output.push_str(&format!("| Top Language | {} |\n", card.top_language));
    output.push_str(&format!("| Stars | {} |\n", card.total_stars));
    output.push_str(&format!("| Volume | {} |\n", card.volume));
    output.push_str(&format!("| Breadth | {} |\n", card.breadth));
    output.push_str(&format!("| Velocity | {} |\n", card.velocity));
    output.push_str(&format!("| Social | {} |\n", card.social));

    output.push_str(&format!("\n## Analysis ({})\n\n", analysis.origin));
    if let Some(ref diagnostic) = analysis.diagnostic {
        output.push_str(&format!("> {}\n\n", diagnostic));
    }
    output.push_str(&format!(
        "**Productivity:** {}/100 · **Quality:** {}/100\n\n",
        analysis.commit_pattern.productivity_score, analysis.code_quality.overall_quality_score
    ));
    output.push_str(&format!("{}\n\n", analysis.commit_pattern.work_pattern));

    for (title, items) in [
        ("Strengths", &analysis.code_quality.strengths),
        ("Areas for Improvement", &analysis.code_quality.improvements),
        ("Recommendations", &analysis.commit_pattern.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        output.push_str(&format!("### {}\n\n", title));
        for item in items {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "---\n*Generated on {}*\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}

fn battle_text(report: &BattleReport) -> String {
    let mut output = String::new();
    let judgment = &report.judgment;

    output.push_str(&format!(
        "\n=== Battle: {} vs {} ===\n\n",
        report.first.user.login, report.second.user.login
    ));
    output.push_str(&format!("[A] {}\n", report.first.user.login));
    output.push_str(&scorecard_text(&report.first.scorecard));
    output.push_str(&format!("\n[B] {}\n", report.second.user.login));
    output.push_str(&scorecard_text(&report.second.scorecard));

    output.push_str(&format!(
        "\nWinner: {} ({} - {}, {})\n{}\n",
        judgment.winner_id, judgment.score_a, judgment.score_b, judgment.origin, judgment.reason
    ));
    output
}

fn battle_markdown(report: &BattleReport) -> String {
    let mut output = String::new();
    let (a, b) = (&report.first, &report.second);
    let judgment = &report.judgment;

    output.push_str(&format!("# {} vs {}\n\n", a.user.login, b.user.login));
    output.push_str(&format!("| Stat | {} | {} |\n", a.user.login, b.user.login));
    output.push_str("|------|------|------|\n");
    output.push_str(&format!("| Level | {} | {} |\n", a.scorecard.level, b.scorecard.level));
    output.push_str(&format!(
        "| Class | {} | {} |\n",
        a.scorecard.archetype, b.scorecard.archetype
    ));
    output.push_str(&format!(
        "| Repos | {} | {} |\n",
        a.user.public_repos, b.user.public_repos
    ));
    output.push_str(&format!(
        "| Followers | {} | {} |\n",
        a.user.followers, b.user.followers
    ));
    output.push_str(&format!(
        "| Stars | {} | {} |\n",
        a.scorecard.total_stars, b.scorecard.total_stars
    ));
    output.push_str(&format!(
        "| Judge Score | {} | {} |\n",
        judgment.score_a, judgment.score_b
    ));

    output.push_str(&format!(
        "\n**Winner:** {} ({})\n\n> {}\n",
        judgment.winner_id, judgment.origin, judgment.reason
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use devcard::analysis::{compute_scorecard, synthesize_after_failure, synthesize_analysis};
    use devcard::models::GitHubUser;

    fn report(diagnostic: Option<&str>) -> DeveloperReport {
        let user = GitHubUser::new("octocat");
        let analysis = match diagnostic {
            Some(reason) => synthesize_after_failure(&user, &[], reason),
            None => synthesize_analysis(&user, &[]),
        };
        DeveloperReport {
            scorecard: compute_scorecard(&user, &[], 0),
            user,
            repositories: Vec::new(),
            commits_sampled: 0,
            analysis,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_failure_reason_is_rendered() {
        let report = report(Some("no response within 8s"));
        assert!(profile_text(&report).contains("Reason: no response within 8s"));
        assert!(profile_markdown(&report).contains("> no response within 8s"));
    }

    #[test]
    fn test_no_reason_line_without_diagnostic() {
        let report = report(None);
        assert!(!profile_text(&report).contains("Reason:"));
        assert!(profile_markdown(&report).contains("## Analysis (fallback)"));
    }
}
