use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotrec::{
    cli, config, error,
    recommendations::{RecommendOptions, SelectionMode},
    types::TimeRange,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the web app
    Serve(ServeOptions),

    /// Show your top tracks, artists, genres and albums
    Top(TopOptions),

    /// Get track recommendations seeded by your top genres
    Recommend(RecommendArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to listen on (defaults to SERVER_ADDRESS)
    #[clap(long)]
    pub addr: Option<String>,

    #[clap(flatten)]
    pub recommend: RecommendArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct TopOptions {
    /// Time window: short, medium or long (falls back from long to short if omitted)
    #[clap(long)]
    pub time_range: Option<TimeRange>,

    /// Number of top tracks and artists to fetch
    #[clap(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct RecommendArgs {
    /// Maximum number of recommended tracks (1-30)
    #[clap(long, default_value_t = 10)]
    pub cap: usize,

    /// Tracks requested per genre search
    #[clap(long, default_value_t = 10)]
    pub per_genre: u32,

    /// Take one track per genre in turn instead of genre by genre
    #[clap(long)]
    pub round_robin: bool,

    /// Shuffle search results before picking
    #[clap(long)]
    pub shuffle: bool,
}

impl RecommendArgs {
    fn options(&self) -> RecommendOptions {
        RecommendOptions {
            per_genre_limit: self.per_genre,
            cap: self.cap,
            mode: if self.round_robin {
                SelectionMode::RoundRobin
            } else {
                SelectionMode::Sequential
            },
            shuffle: self.shuffle,
            ..RecommendOptions::default()
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.addr, opt.recommend.options()).await,
        Command::Top(opt) => cli::top(opt.time_range, opt.limit).await,
        Command::Recommend(opt) => cli::recommend(opt.options()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
