use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use typing_racer::{
    account::{self, AccountError, NewAccount, DEFAULT_AVATAR_COLOR},
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, FileConfigStore},
    corpus::{Corpus, RaceText, TextSource},
    export,
    leaderboard::{Leaderboard, EMPTY_MESSAGE},
    model::User,
    profile::Profile,
    runtime::{ChannelEventSource, FixedTicker, Runner},
    store::{FileStore, KeyValueStore, Storage},
};

/// terminal typing race with scores, achievements and a local leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Race against a text, get scored on words per minute and accuracy, unlock achievements and climb a leaderboard kept on this machine."
)]
pub struct Cli {
    /// race this text instead of a random one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// file with race texts, one per line
    #[clap(short = 't', long)]
    texts: Option<PathBuf>,

    /// where players and races are stored
    #[clap(long)]
    data_file: Option<PathBuf>,

    /// config file to read instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// create a player with this username and sign in
    #[clap(long, requires = "email", conflicts_with = "login")]
    register: Option<String>,

    /// email for --register
    #[clap(long)]
    email: Option<String>,

    /// car color for --register, as #RRGGBB
    #[clap(long, default_value = DEFAULT_AVATAR_COLOR)]
    color: String,

    /// sign in as the player registered with this email
    #[clap(long)]
    login: Option<String>,

    /// sign out the current player
    #[clap(long, conflicts_with_all = ["register", "login"])]
    logout: bool,

    /// print the leaderboard and exit
    #[clap(long)]
    leaderboard: bool,

    /// print the current player's profile and exit
    #[clap(long)]
    profile: bool,

    /// write the current player's race history as CSV and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// log at debug level
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Flags win over the config file.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(data_file) = &self.data_file {
            config.data_file = Some(data_file.clone());
        }
        if let Some(texts) = &self.texts {
            config.texts_file = Some(texts.clone());
        }
        config
    }

    fn text_source(&self, config: &Config) -> io::Result<TextSource> {
        if let Some(text) = self.prompt.as_deref().and_then(|p| RaceText::new(p.trim())) {
            return Ok(TextSource::Fixed(text));
        }
        match &config.texts_file {
            Some(path) => Corpus::from_file(path).map(TextSource::Random),
            None => Ok(TextSource::default()),
        }
    }
}

fn init_logging(data_path: &Path, verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_path = AppDirs::log_path_for(data_path);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
}

fn exit_with(kind: ErrorKind, message: impl std::fmt::Display) -> ! {
    let mut cmd = Cli::command();
    cmd.error(kind, message).exit()
}

fn account_error(e: AccountError) -> ! {
    match e {
        AccountError::Store(e) => exit_with(ErrorKind::Io, e),
        e => exit_with(ErrorKind::ValueValidation, e),
    }
}

fn require_user<K: KeyValueStore>(storage: &Storage<K>) -> Result<User, Box<dyn Error>> {
    match storage.current_user()? {
        Some(user) => Ok(user),
        None => exit_with(
            ErrorKind::MissingRequiredArgument,
            "no player signed in, use --register <USERNAME> --email <EMAIL> or --login <EMAIL>",
        ),
    }
}

fn print_leaderboard<K: KeyValueStore>(
    storage: &Storage<K>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let current = storage.current_user()?.map(|u| u.id);
    let board = Leaderboard::load(storage, current, config.leaderboard_size)?;

    if board.is_empty() {
        println!("{EMPTY_MESSAGE}");
        return Ok(());
    }

    for row in &board.rows {
        let medal = row.medal().map(|m| m.icon()).unwrap_or("  ");
        let mut badges = String::new();
        if row.is_current_user {
            badges.push_str(" YOU");
        }
        if row.is_personal_best {
            badges.push_str(" PB");
        }
        println!(
            "{medal} {:>2}. {:<16} {:>4} wpm {:>4}%  {}{badges}",
            row.rank,
            row.username,
            row.wpm,
            row.accuracy,
            row.created_at.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

fn print_profile<K: KeyValueStore>(
    storage: &Storage<K>,
    user: &User,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let profile = Profile::load(storage, user, config.recent_sessions)?;

    println!("{} <{}>", user.username, user.email);
    println!(
        "races: {}   best: {} wpm   best accuracy: {}%",
        user.total_games, user.best_wpm, user.best_accuracy
    );
    if let (Some(mean), Some(sd)) = (profile.mean_wpm, profile.wpm_std_dev) {
        println!("average: {mean:.1} wpm (sd {sd:.1})");
    }

    println!(
        "achievements: {}/{}",
        profile.unlocked_count(),
        profile.achievements.len()
    );
    for achievement in profile.unlocked() {
        println!("  {} {} - {}", achievement.icon, achievement.title, achievement.description);
    }

    if !profile.recent_sessions.is_empty() {
        println!("recent races:");
        for race in &profile.recent_sessions {
            println!(
                "  {}  {:>4} wpm {:>4}%  {:.1}s{}",
                race.created_at.format("%Y-%m-%d %H:%M"),
                race.wpm,
                race.accuracy,
                race.time_taken_seconds,
                if race.is_personal_best { "  PB" } else { "" }
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.apply(config_store.load_or_init());
    let data_path = config.data_path();

    if let Err(e) = init_logging(&data_path, cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }
    info!(data = %data_path.display(), "starting");

    let mut storage = Storage::new(FileStore::open(&data_path)?);

    if cli.logout {
        account::sign_out(&mut storage).unwrap_or_else(|e| account_error(e));
        println!("Signed out.");
        return Ok(());
    }

    if let Some(username) = &cli.register {
        let email = cli.email.clone().unwrap_or_default();
        let account = NewAccount::new(username.clone(), email).with_color(cli.color.clone());
        let user = account::sign_up(&mut storage, account).unwrap_or_else(|e| account_error(e));
        println!("Welcome, {}!", user.username);
    } else if let Some(email) = &cli.login {
        let user = account::sign_in(&mut storage, email).unwrap_or_else(|e| account_error(e));
        println!("Signed in as {}.", user.username);
    }

    if cli.leaderboard {
        return print_leaderboard(&storage, &config);
    }

    if cli.profile {
        let user = require_user(&storage)?;
        return print_profile(&storage, &user, &config);
    }

    if let Some(path) = &cli.export_csv {
        let user = require_user(&storage)?;
        let mut history = storage.user_sessions(user.id)?;
        history.reverse();
        export::export_history(path, &history)?;
        println!("Exported {} races to {}", history.len(), path.display());
        return Ok(());
    }

    // registering or signing in alone does not start a race
    if cli.register.is_some() || cli.login.is_some() {
        return Ok(());
    }

    if !stdin().is_tty() {
        exit_with(ErrorKind::Io, "stdin must be a tty");
    }

    let user = require_user(&storage)?;
    let texts = match cli.text_source(&config) {
        Ok(texts) => texts,
        Err(e) => exit_with(ErrorKind::Io, format!("could not read race texts: {e}")),
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(storage, user, texts, &config);
    let result = start_tui(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, K: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        ChannelEventSource::terminal(),
        FixedTicker::from_millis(config.tick_rate_ms),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.handle(runner.step())? == Control::Quit {
            break;
        }
    }

    info!("quit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["typing-racer"]);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.color, DEFAULT_AVATAR_COLOR);
        assert!(!cli.leaderboard);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_register_needs_email() {
        assert!(Cli::try_parse_from(["typing-racer", "--register", "racer"]).is_err());
        let cli = Cli::try_parse_from([
            "typing-racer",
            "--register",
            "racer",
            "--email",
            "racer@example.com",
            "--color",
            "#10B981",
        ])
        .unwrap();
        assert_eq!(cli.register.as_deref(), Some("racer"));
        assert_eq!(cli.color, "#10B981");
    }

    #[test]
    fn test_cli_logout_conflicts_with_login() {
        assert!(Cli::try_parse_from(["typing-racer", "--logout", "--login", "a@b.c"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["typing-racer", "--data-file", "/tmp/x.json", "-t", "/tmp/t.txt"]);
        let config = cli.apply(Config {
            data_file: Some(PathBuf::from("/elsewhere.json")),
            ..Config::default()
        });
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(config.texts_file, Some(PathBuf::from("/tmp/t.txt")));
    }

    #[test]
    fn test_prompt_beats_texts_file() {
        let cli = Cli::parse_from(["typing-racer", "--prompt", " custom race "]);
        match cli.text_source(&Config::default()).unwrap() {
            TextSource::Fixed(text) => assert_eq!(text.as_str(), "custom race"),
            TextSource::Random(_) => panic!("expected the prompt"),
        }
    }

    #[test]
    fn test_logging_reports_unwritable_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        assert!(init_logging(&blocker.join("store.json"), false).is_err());
    }

    #[test]
    fn test_blank_prompt_falls_back_to_corpus() {
        let cli = Cli::parse_from(["typing-racer", "--prompt", "   "]);
        assert!(matches!(
            cli.text_source(&Config::default()).unwrap(),
            TextSource::Random(_)
        ));
    }
}
