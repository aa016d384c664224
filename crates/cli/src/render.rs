//! Terminal rendering of a dashboard summary

use gitdash_analyzer::DashboardSummary;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;

/// Format an integer with thousands separators
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{}", title)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

pub fn render_dashboard(summary: &DashboardSummary) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let profile = &summary.profile;
    let stats = &summary.stats;

    writeln!(out, "{} (@{})", profile.display_name(), profile.login)?;
    if !profile.html_url.is_empty() {
        writeln!(out, "{}", profile.html_url)?;
    }
    writeln!(
        out,
        "{}",
        profile
            .bio
            .as_deref()
            .unwrap_or("This developer prefers to keep an air of mystery...")
    )?;

    let mut details = Vec::new();
    if let Some(ref location) = profile.location {
        details.push(location.clone());
    }
    if let Some(ref email) = profile.email {
        details.push(email.clone());
    }
    if let Some(ref twitter) = profile.twitter_username {
        details.push(format!("@{}", twitter));
    }
    details.push(format!("Joined {}", profile.created_at.format("%B %Y")));
    writeln!(out, "{}", details.join(" · "))?;

    heading(&mut out, "Statistics")?;
    let rows = [
        ("Followers", group_thousands(stats.followers)),
        ("Repositories", group_thousands(stats.public_repos)),
        ("Total stars", group_thousands(stats.total_stars)),
        ("Total forks", group_thousands(stats.total_forks)),
        ("Avg stars/repo", format!("{:.1}", stats.avg_stars_per_repo)),
        ("Years on GitHub", stats.years_on_github.to_string()),
    ];
    for (label, value) in rows {
        writeln!(out, "  {:<18} {:>12}", label, value)?;
    }

    heading(&mut out, "Languages")?;
    if summary.languages.is_empty() {
        writeln!(out, "  No languages found.")?;
    }
    for lang in &summary.languages {
        writeln!(
            out,
            "  {:<18} {:>10.2} KB {:>6.1}%",
            lang.name,
            lang.bytes as f64 / 1024.0,
            lang.percent
        )?;
    }

    heading(&mut out, "Recent activity")?;
    if summary.activity.is_empty() {
        writeln!(out, "  No recent activity found.")?;
    }
    for item in &summary.activity {
        writeln!(
            out,
            "  {}  {} {}",
            item.created_at.format("%Y-%m-%d"),
            item.verb,
            item.repo
        )?;
    }

    if !summary.organizations.is_empty() {
        heading(&mut out, "Organizations")?;
        for org in &summary.organizations {
            writeln!(out, "  {:<24} {}", org.login, org.url)?;
        }
    }

    heading(&mut out, "Popular repositories")?;
    if summary.popular_repos.is_empty() {
        writeln!(out, "  No public repositories found.")?;
    }
    for repo in &summary.popular_repos {
        let private = if repo.private { " [private]" } else { "" };
        writeln!(out, "  {}. {}{}", repo.rank, repo.name, private)?;
        writeln!(
            out,
            "     {}",
            repo.description.as_deref().unwrap_or("No description available.")
        )?;

        let mut line = format!(
            "     ⭐{} 🍴{}",
            group_thousands(repo.stars),
            group_thousands(repo.forks)
        );
        if repo.watchers > 0 {
            write!(line, " 👀{}", group_thousands(repo.watchers))?;
        }
        if let Some(ref language) = repo.language {
            write!(line, "  {}", language)?;
        }
        if !repo.topics.is_empty() {
            write!(line, "  [{}]", repo.topics.join(", "))?;
        }
        writeln!(out, "{}", line)?;
    }

    Ok(out)
}
