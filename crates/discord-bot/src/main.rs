mod embeds;

use risk_core::AnalysisReport;
use serde::Deserialize;
use serenity::{
    all::{
        Command, CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandOptionType,
        CreateCommand, CreateCommandOption, CreateInteractionResponse,
        CreateInteractionResponseMessage, EditInteractionResponse, Interaction,
    },
    async_trait,
    builder::{CreateEmbed, CreateMessage},
    model::{channel::Message, gateway::Ready, id::UserId},
    prelude::*,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const API_BASE_URL: &str = "http://localhost:3000";
const RATE_LIMIT_COMMANDS: u32 = 5;
const RATE_LIMIT_WINDOW_SECS: u64 = 60;
const MAX_TOKEN_LEN: usize = 44;

/// Skips API calls for `COOLDOWN_SECS` after `THRESHOLD` consecutive failures.
struct CircuitBreaker {
    consecutive_failures: AtomicU32,
    open_until_epoch_secs: AtomicU64,
}

const CIRCUIT_BREAKER_THRESHOLD: u32 = 5;
const CIRCUIT_BREAKER_COOLDOWN_SECS: u64 = 30;

fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl CircuitBreaker {
    fn new() -> Self {
        Self {
            consecutive_failures: AtomicU32::new(0),
            open_until_epoch_secs: AtomicU64::new(0),
        }
    }

    fn is_open(&self) -> bool {
        let until = self.open_until_epoch_secs.load(Ordering::Relaxed);
        if until == 0 {
            return false;
        }
        if epoch_secs() >= until {
            // Cooldown over: half-open
            self.open_until_epoch_secs.store(0, Ordering::Relaxed);
            self.consecutive_failures.store(0, Ordering::Relaxed);
            false
        } else {
            true
        }
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.open_until_epoch_secs.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        let count = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= CIRCUIT_BREAKER_THRESHOLD {
            self.open_until_epoch_secs
                .store(epoch_secs() + CIRCUIT_BREAKER_COOLDOWN_SECS, Ordering::Relaxed);
            tracing::warn!(
                "Circuit breaker OPEN: {} consecutive API failures, skipping for {}s",
                count,
                CIRCUIT_BREAKER_COOLDOWN_SECS
            );
        }
    }
}

/// Envelope returned by the API server.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    data: Option<AnalysisReport>,
    error: Option<String>,
}

/// Accepts `$TICKER`, `TICKER` or a base58 mint address; anything else could
/// escape the URL path.
fn sanitize_token(input: &str) -> Option<String> {
    let token = input.trim();
    let body = token.strip_prefix('$').unwrap_or(token);
    if body.is_empty() || body.len() > MAX_TOKEN_LEN {
        return None;
    }
    if !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(token.to_string())
}

struct Handler {
    http_client: reqwest::Client,
    api_base: String,
    rate_limits: Arc<RwLock<HashMap<UserId, (Instant, u32)>>>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl Handler {
    async fn check_rate_limit(&self, user_id: UserId) -> Result<(), u64> {
        let mut limits = self.rate_limits.write().await;
        let now = Instant::now();

        if limits.len() > 1000 {
            limits.retain(|_, (ts, _)| now.duration_since(*ts).as_secs() < RATE_LIMIT_WINDOW_SECS);
        }

        if let Some((window_start, count)) = limits.get_mut(&user_id) {
            let elapsed = now.duration_since(*window_start).as_secs();
            if elapsed >= RATE_LIMIT_WINDOW_SECS {
                *window_start = now;
                *count = 1;
                Ok(())
            } else if *count >= RATE_LIMIT_COMMANDS {
                Err(RATE_LIMIT_WINDOW_SECS - elapsed)
            } else {
                *count += 1;
                Ok(())
            }
        } else {
            limits.insert(user_id, (now, 1));
            Ok(())
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        if command.data.name != "rug" {
            return;
        }

        if let Err(wait_secs) = self.check_rate_limit(command.user.id).await {
            let _ = respond_ephemeral(
                &ctx,
                &command,
                &format!("Rate limited. Try again in {}s.", wait_secs),
            )
            .await;
            return;
        }

        let Some(subcommand) = command.data.options.first() else {
            let _ = respond_ephemeral(&ctx, &command, "Use `/rug help` for commands.").await;
            return;
        };

        match subcommand.name.as_str() {
            "analyze" => self.handle_analyze(&ctx, &command, subcommand).await,
            "help" => self.handle_help(&ctx, &command).await,
            _ => {
                let _ =
                    respond_ephemeral(&ctx, &command, "Unknown subcommand. Use `/rug help`.").await;
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !msg.content.starts_with("!rug") {
            return;
        }

        let _ = msg
            .channel_id
            .say(
                &ctx.http,
                "**Note:** `!rug` prefix commands are deprecated. Please use `/rug analyze` instead.",
            )
            .await;

        let Some(raw) = msg.content.split_whitespace().nth(1) else {
            return;
        };
        if let Err(wait_secs) = self.check_rate_limit(msg.author.id).await {
            let _ = msg
                .channel_id
                .say(&ctx.http, format!("Rate limited. Try again in {}s.", wait_secs))
                .await;
            return;
        }

        let embed = match sanitize_token(raw) {
            Some(token) => {
                let _ = msg.channel_id.broadcast_typing(&ctx.http).await;
                self.analysis_embed(&token).await
            }
            None => embeds::build_error_embed(raw, "Not a valid ticker or mint address."),
        };
        if let Err(e) = msg
            .channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await
        {
            tracing::warn!("Failed to send analysis for {}: {}", raw, e);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("{} is connected and ready!", ready.user.name);

        match Command::set_global_commands(&ctx.http, vec![create_rug_command()]).await {
            Ok(commands) => {
                tracing::info!("Registered {} global slash commands", commands.len());
            }
            Err(e) => {
                tracing::error!("Failed to register slash commands: {}", e);
            }
        }
    }
}

// === Command Handlers ===

impl Handler {
    /// GET against the API server, respecting the circuit breaker.
    async fn api_get(&self, url: &str) -> Result<reqwest::Response, String> {
        if self.circuit_breaker.is_open() {
            return Err("API server circuit breaker is open, skipping request".to_string());
        }
        match self.http_client.get(url).send().await {
            Ok(resp) => {
                if resp.status().is_server_error() {
                    self.circuit_breaker.record_failure();
                } else {
                    self.circuit_breaker.record_success();
                }
                Ok(resp)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                Err(format!("{}", e))
            }
        }
    }

    /// Run an analysis through the API and render the outcome, success or not.
    async fn analysis_embed(&self, token: &str) -> CreateEmbed {
        let url = format!("{}/api/analyze/{}", self.api_base, token);

        let resp = match self.api_get(&url).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Analysis request for {} failed: {}", token, e);
                return embeds::build_error_embed(token, "The analysis service is unreachable.");
            }
        };

        let status = resp.status();
        match resp.json::<ApiEnvelope>().await {
            Ok(ApiEnvelope {
                success: true,
                data: Some(report),
                ..
            }) => embeds::build_report_embed(&report),
            Ok(envelope) => {
                let message = match (status.as_u16(), envelope.error) {
                    (404, _) => "Token not found.".to_string(),
                    (504, _) => "The analysis took too long. Try again shortly.".to_string(),
                    (_, Some(e)) => e,
                    (_, None) => format!("Unexpected response ({})", status),
                };
                embeds::build_error_embed(token, &message)
            }
            Err(e) => {
                tracing::warn!("Unreadable analysis response for {}: {}", token, e);
                embeds::build_error_embed(token, &format!("Unexpected response ({})", status))
            }
        }
    }

    async fn handle_analyze(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        subcommand: &CommandDataOption,
    ) {
        let Some(raw) = get_string_opt(subcommand, "token") else {
            let _ = respond_ephemeral(ctx, command, "Please provide a token.").await;
            return;
        };
        let Some(token) = sanitize_token(&raw) else {
            let _ = respond_ephemeral(
                ctx,
                command,
                "Please provide a ticker like `$BONK` or a mint address.",
            )
            .await;
            return;
        };

        if let Err(e) = command.defer(&ctx.http).await {
            tracing::warn!("Failed to defer analysis of {}: {}", token, e);
        }

        let embed = self.analysis_embed(&token).await;
        if let Err(e) = command
            .edit_response(&ctx.http, EditInteractionResponse::new().embed(embed))
            .await
        {
            tracing::warn!("Failed to deliver analysis of {}: {}", token, e);
        }
    }

    async fn handle_help(&self, ctx: &Context, command: &CommandInteraction) {
        let msg = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().embed(embeds::build_help_embed()),
        );
        let _ = command.create_response(&ctx.http, msg).await;
    }
}

// === Slash Command Registration ===

fn create_rug_command() -> CreateCommand {
    CreateCommand::new("rug")
        .description("Solana rug-pull risk checks")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "analyze",
                "Rug-pull risk report for a token",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "token",
                    "Ticker ($BONK) or mint address",
                )
                .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "help",
            "Show available commands",
        ))
}

// === Helpers ===

fn get_sub_options(opt: &CommandDataOption) -> &[CommandDataOption] {
    match &opt.value {
        CommandDataOptionValue::SubCommand(opts) => opts,
        _ => &[],
    }
}

fn get_string_opt(subcommand: &CommandDataOption, name: &str) -> Option<String> {
    for opt in get_sub_options(subcommand) {
        if opt.name == name {
            if let CommandDataOptionValue::String(s) = &opt.value {
                return Some(s.clone());
            }
        }
    }
    None
}

async fn respond_ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
) -> serenity::Result<()> {
    let msg = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    command.create_response(&ctx.http, msg).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "discord_bot=info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let discord_token = std::env::var("DISCORD_BOT_TOKEN")
        .map_err(|_| anyhow::anyhow!("DISCORD_BOT_TOKEN must be set"))?;
    let api_base = std::env::var("API_BASE_URL").unwrap_or_else(|_| API_BASE_URL.to_string());
    let api_base = api_base.trim_end_matches('/').to_string();

    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler {
        http_client,
        api_base,
        rate_limits: Arc::new(RwLock::new(HashMap::new())),
        circuit_breaker: Arc::new(CircuitBreaker::new()),
    };

    let mut client = Client::builder(&discord_token, intents)
        .event_handler(handler)
        .await?;

    tracing::info!("RugScore bot starting with slash commands...");

    let shard_manager = client.shard_manager.clone();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                tracing::error!("Discord client error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down Discord bot...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down Discord bot...");
        }
    }

    shard_manager.shutdown_all().await;
    tracing::info!("Discord bot shut down.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_token() {
        assert_eq!(sanitize_token(" $bonk "), Some("$bonk".to_string()));
        assert_eq!(
            sanitize_token("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
            Some("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263".to_string())
        );
        assert_eq!(sanitize_token("$"), None);
        assert_eq!(sanitize_token("../health"), None);
        assert_eq!(sanitize_token("BONK?x=1"), None);
        assert_eq!(sanitize_token(&"a".repeat(45)), None);
    }

    #[test]
    fn test_circuit_breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new();
        for _ in 0..CIRCUIT_BREAKER_THRESHOLD - 1 {
            breaker.record_failure();
        }
        assert!(!breaker.is_open());

        breaker.record_failure();
        assert!(breaker.is_open());

        breaker.record_success();
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_envelope_error_parses() {
        let envelope: ApiEnvelope = serde_json::from_str(
            r#"{"success":false,"data":null,"error":"Token not found: abc"}"#,
        )
        .unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("Token not found: abc"));
    }

    #[tokio::test]
    async fn test_rate_limit_window() {
        let handler = Handler {
            http_client: reqwest::Client::new(),
            api_base: API_BASE_URL.to_string(),
            rate_limits: Arc::new(RwLock::new(HashMap::new())),
            circuit_breaker: Arc::new(CircuitBreaker::new()),
        };
        let user = UserId::new(42);

        for _ in 0..RATE_LIMIT_COMMANDS {
            assert!(handler.check_rate_limit(user).await.is_ok());
        }
        assert!(handler.check_rate_limit(user).await.is_err());
        assert!(handler.check_rate_limit(UserId::new(7)).await.is_ok());
    }
}
