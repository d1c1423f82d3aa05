use risk_core::{AnalysisReport, RiskTier, SubAnalysis};
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::Timestamp;

const COLOR_BLUE: u32 = 0x3498DB;
const MAX_FIELD_FLAGS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 4;
// Discord rejects embeds whose title exceeds 256 chars
const MAX_TITLE_SYMBOL: usize = 32;
const MAX_DESCRIPTION_TOKEN: usize = 64;

pub fn tier_color(tier: RiskTier) -> u32 {
    match tier {
        RiskTier::Safe => 0x2ECC71,
        RiskTier::Low => 0xA3D977,
        RiskTier::Medium => 0xF1C40F,
        RiskTier::High => 0xE67E22,
        RiskTier::Critical => 0xE74C3C,
    }
}

fn tier_emoji(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Safe | RiskTier::Low => "\u{1F7E2}",
        RiskTier::Medium => "\u{1F7E1}",
        RiskTier::High => "\u{1F7E0}",
        RiskTier::Critical => "\u{1F534}",
    }
}

fn footer() -> CreateEmbedFooter {
    CreateEmbedFooter::new("RugScore | Not financial advice")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        address.to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

fn sub_analysis_text(analysis: &SubAnalysis) -> String {
    let mut text = format!("**{:.0}/100**", analysis.risk_score);
    for flag in analysis.red_flags.iter().take(MAX_FIELD_FLAGS) {
        text.push_str(&format!("\n- {}", truncate(flag, 90)));
    }
    if analysis.red_flags.len() > MAX_FIELD_FLAGS {
        text.push_str(&format!(
            "\n...and {} more",
            analysis.red_flags.len() - MAX_FIELD_FLAGS
        ));
    }
    text
}

pub fn build_report_embed(report: &AnalysisReport) -> CreateEmbed {
    let tier = report.risk_level;

    let recommendations = report
        .recommendations
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n");

    let mut embed = CreateEmbed::new()
        .title(format!(
            "{} {} - {} ({}/100)",
            tier_emoji(tier),
            truncate(&report.symbol, MAX_TITLE_SYMBOL),
            tier,
            report.risk_score
        ))
        .description(format!("`{}`", truncate(&report.token, MAX_DESCRIPTION_TOKEN)))
        .color(tier_color(tier))
        .field("\u{26D3}\u{FE0F} On-chain (50%)", sub_analysis_text(&report.analyses.on_chain), false)
        .field("\u{1F4AC} Social (30%)", sub_analysis_text(&report.analyses.social), false)
        .field("\u{1F4DC} Code (20%)", sub_analysis_text(&report.analyses.code), false)
        .footer(footer());

    if !recommendations.is_empty() {
        embed = embed.field("\u{1F4A1} Recommendations", recommendations, false);
    }

    match Timestamp::from_unix_timestamp(report.timestamp.timestamp()) {
        Ok(ts) => embed.timestamp(ts),
        Err(_) => embed.timestamp(Timestamp::now()),
    }
}

pub fn build_error_embed(token: &str, message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Could not analyze {}", short_address(token)))
        .description(truncate(message, 300))
        .color(tier_color(RiskTier::Critical))
        .footer(footer())
}

pub fn build_help_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("\u{1F6A8} RugScore Bot Commands")
        .color(COLOR_BLUE)
        .description("Use `/rug <command>` to check a Solana token for rug-pull risk.")
        .field(
            "\u{1F50D} Analysis",
            "`analyze <token>` - Risk report for a ticker ($BONK) or mint address",
            false,
        )
        .field(
            "\u{1F4CA} Score",
            "On-chain 50% | Social 30% | Code 20%\n\
             SAFE < 20 <= LOW < 40 <= MEDIUM < 60 <= HIGH < 80 <= CRITICAL",
            false,
        )
        .footer(footer())
}
