//! Command-line interface for the wordvault vocabulary trainer.
//!
//! This CLI looks words up (saved translations first, then the online
//! translator), saves them, quizzes you on saved words and pages through
//! everything saved so far.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, error, info};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use wordvault::{
    HttpTranslator, Session, SessionConfig, Translation, TranslatorConfig, Vault, VaultError,
    VaultOptions, WordEntry, error::Result, pager::DEFAULT_PAGE_SIZE,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Vocabulary trainer backed by a local word vault", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a custom database file (optional)
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// Remove every saved word before running the command
    #[arg(long, global = true, default_value_t = false)]
    force_reset: bool,

    /// Words shown per page when browsing
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u64,

    /// Language of the words you look up
    #[arg(long, global = true, default_value = "en")]
    from: String,

    /// Language translations are shown in
    #[arg(long, global = true, default_value = "ru")]
    to: String,

    /// Set verbosity level (use -v, -vv, or -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a word, using the saved translation when there is one
    Lookup {
        /// The word to translate
        word: String,
        /// Save the translation to the vault
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Translate and save one or more words
    Add {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Quiz yourself on saved words, missed words come up more often
    Quiz {
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u32>,
        /// Show the translation and recall the word instead
        #[arg(long, default_value_t = false)]
        reverse: bool,
    },
    /// Page through saved words, newest first
    Browse,
    /// Show how many words are saved
    Count,
    /// Delete the vault database
    ClearDb,
}

/// Sets up logging based on verbosity level.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Command failed: {}", e);
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

/// Runs one command; every failure comes back as an error for `main` to report.
async fn run(cli: Cli) -> Result<()> {
    if let Commands::ClearDb = cli.command {
        info!("Clearing database...");
        Vault::clear_database(cli.db_path.map(PathBuf::from))?;
        println!("{}", "Database cleared successfully.".green());
        return Ok(());
    }

    let vault = Vault::open(VaultOptions {
        db_path: cli.db_path.as_ref().map(PathBuf::from),
        force_reset: cli.force_reset,
    })?;
    let mut session = Session::start(
        &vault,
        SessionConfig {
            page_size: cli.page_size,
        },
    )?;
    let translator = HttpTranslator::new(TranslatorConfig {
        source_lang: cli.from,
        target_lang: cli.to,
        ..Default::default()
    });

    match cli.command {
        Commands::Lookup { word, save } => {
            handle_lookup(&vault, &mut session, &translator, &word, save).await
        }
        Commands::Add { words } => handle_add(&vault, &mut session, &translator, &words).await,
        Commands::Quiz { rounds, reverse } => handle_quiz(&vault, &mut session, rounds, reverse),
        Commands::Browse => handle_browse(&vault, &mut session),
        Commands::Count => vault.count().map(|n| println!("Total: {}", n)),
        Commands::ClearDb => Ok(()), // Handled before the vault is opened.
    }
}

/// Translates `word` with a spinner on screen; returns false if nothing was found.
async fn translate_with_spinner(
    vault: &Vault,
    session: &mut Session,
    translator: &HttpTranslator,
    word: &str,
) -> Result<bool> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Looking up '{}'...", word));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = session.translate(vault, translator, word).await;
    spinner.finish_and_clear();

    match result? {
        Some(pending) => {
            print_card(&pending.word, &pending.translation);
            if pending.saved {
                println!("  {}", "(saved)".dimmed());
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

async fn handle_lookup(
    vault: &Vault,
    session: &mut Session,
    translator: &HttpTranslator,
    word: &str,
    save: bool,
) -> Result<()> {
    if !translate_with_spinner(vault, session, translator, word).await? {
        println!("{}", "Nothing to look up.".yellow());
        return Ok(());
    }
    if save {
        let total = session.save_pending(vault)?;
        println!("{} Total: {}", "Saved!".green(), total);
    }
    Ok(())
}

async fn handle_add(
    vault: &Vault,
    session: &mut Session,
    translator: &HttpTranslator,
    words: &[String],
) -> Result<()> {
    for word in words {
        match translate_with_spinner(vault, session, translator, word).await {
            Ok(true) => {
                let total = session.save_pending(vault)?;
                println!("{} Total: {}\n", "Saved!".green(), total);
            }
            Ok(false) => {}
            Err(e @ VaultError::Network(_)) | Err(e @ VaultError::Translation(_)) => {
                // One failed word should not stop the rest.
                eprintln!("{}", format!("Could not translate '{}': {}", word, e).red());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn handle_quiz(
    vault: &Vault,
    session: &mut Session,
    rounds: Option<u32>,
    reverse: bool,
) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut rng = rand::rng();
    let mut played = 0;

    while rounds.is_none_or(|max| played < max) {
        let entry = match session.draw_quiz_word(vault, &mut rng) {
            Ok(entry) => entry,
            Err(VaultError::EmptyStore) => {
                println!("{}", "No saved words yet. Add some first.".yellow());
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        played += 1;

        let (label, cue) = quiz_cue(&entry, reverse);
        println!("\n{} {}", label.magenta(), cue.bold().cyan());
        prompt("Press Enter to reveal (q to quit) ")?;
        match lines.next().transpose()? {
            Some(line) if line.trim() != "q" => {}
            _ => return Ok(()),
        }

        let shown = session.current_quiz_word(vault)?;
        print_card(&shown.word, &shown.translation);

        let succeeded = loop {
            prompt("Did you remember it? [y/n] ")?;
            match lines.next().transpose()? {
                Some(line) => match line.trim() {
                    "y" | "Y" => break true,
                    "n" | "N" => break false,
                    _ => continue,
                },
                None => return Ok(()),
            }
        };

        let outcome = session.report_outcome(vault, succeeded)?;
        println!(
            "  {} {}  {} {}",
            "guessed".green(),
            outcome.guesses,
            "missed".red(),
            outcome.misses
        );
    }
    Ok(())
}

fn handle_browse(vault: &Vault, session: &mut Session) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut reset = true;

    loop {
        let page = session.render_page(vault, reset)?;
        reset = false;
        if page.is_empty() {
            println!("{}", "No entries".yellow());
            return Ok(());
        }
        for entry in &page {
            print_row(entry);
        }
        println!(
            "{}  Total: {}",
            session.page_info(vault, false)?.to_string().bold(),
            vault.count()?
        );

        prompt("[n]ext [p]rev [f]irst [l]ast [q]uit > ")?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        match line.trim() {
            "n" => session.next_page(vault)?,
            "p" => session.prev_page(),
            "f" => session.first_page(),
            "l" => session.last_page(vault)?,
            "q" => return Ok(()),
            _ => {}
        }
    }
}

/// What a quiz round shows before the reveal.
fn quiz_cue(entry: &WordEntry, reverse: bool) -> (&'static str, &str) {
    if reverse {
        ("Translation:", entry.translation.text.as_str())
    } else {
        ("Word:", entry.word.as_str())
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

fn print_row(entry: &WordEntry) {
    println!(
        "{:>4}. {} ~ {}  {}",
        entry.ordinal,
        entry.word.bold().cyan(),
        entry.translation.text.green(),
        format!("({}/{})", entry.guesses, entry.misses).dimmed()
    );
}

/// Prints the full translation card of a word.
fn print_card(word: &str, translation: &Translation) {
    match &translation.phonetic {
        Some(phonetic) => println!("\n{} [{}]", word.bold().cyan(), phonetic.dimmed()),
        None => println!("\n{}", word.bold().cyan()),
    }
    println!("  {}", translation.text.green().bold());

    for (label, terms) in translation.alternates.groups() {
        let label = label.unwrap_or("other");
        println!("  {}: {}", label.italic(), terms.join(", "));
    }

    for (label, defs) in translation.definitions.groups() {
        if let Some(label) = label {
            println!("  {}", label.magenta());
        }
        for (i, def) in defs.iter().enumerate() {
            println!("    {}: {}", (i + 1).to_string().bold(), def.text.trim());
            if let Some(example) = &def.example {
                println!("        {}", example.trim().italic());
            }
        }
    }

    if !translation.examples.is_empty() {
        println!("  {}:", "Examples".magenta());
        for example in &translation.examples {
            println!("    {}", example.trim().italic());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reverse_quiz_shows_translation_first() {
        let entry = WordEntry {
            word: "cat".to_string(),
            translation: Translation::new("кот"),
            ordinal: 1,
            guesses: 0,
            misses: 0,
        };
        assert_eq!(quiz_cue(&entry, false), ("Word:", "cat"));
        assert_eq!(quiz_cue(&entry, true), ("Translation:", "кот"));
    }

    #[tokio::test]
    async fn run_returns_errors_instead_of_exiting() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("words.db");
        let path_arg = db_path.to_str().unwrap();

        let cli = Cli::parse_from(["wordvault", "--db-path", path_arg, "count"]);
        run(cli).await.unwrap();
        assert!(db_path.exists());

        // A directory cannot be opened as a database.
        let dir_arg = temp_dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["wordvault", "--db-path", dir_arg, "count"]);
        assert!(run(cli).await.is_err());

        let cli = Cli::parse_from(["wordvault", "--db-path", path_arg, "clear-db"]);
        run(cli).await.unwrap();
        assert!(!db_path.exists());
    }
}
