//! Terminal front end: line-based REPL for running interviews.

use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::interview::export::{self, ExportFormat};
use crate::interview::model::{Company, ExperienceLevel, Position, Profile, SessionRecord};
use crate::interview::{InterviewEngine, InterviewPhase, MAX_QUESTIONS, TurnOutcome};
use crate::store::SessionStore;

pub const HELP_TEXT: &str = "\
COMMANDS:
- /new                      Fill in a profile and start a new interview
- /list                     List saved sessions, newest first
- /load <file>              Load a saved session
- /delete <file>            Delete a saved session
- /show                     Print the current transcript
- /save                     Save the current session
- /feedback                 Retry the feedback step for a finished interview
- /export <txt|json> [path] Export the current session
- /help                     Show this help
- /quit                     Exit

While an interview is running, any other line is sent as your answer.";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Load(String),
    Delete(String),
    Show,
    Save,
    Feedback,
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    Help,
    Quit,
    Answer(String),
    Invalid(String),
}

impl Command {
    /// Parse one input line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Answer(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(String::from);

        let cmd = match (name.as_str(), arg) {
            ("new", _) => Command::New,
            ("list" | "ls", _) => Command::List,
            ("load", Some(file)) => Command::Load(file),
            ("delete" | "rm", Some(file)) => Command::Delete(file),
            ("load" | "delete" | "rm", None) => {
                Command::Invalid(format!("/{name} needs a session file name"))
            }
            ("show", _) => Command::Show,
            ("save", _) => Command::Save,
            ("feedback", _) => Command::Feedback,
            ("export", Some(format)) => match format.parse::<ExportFormat>() {
                Ok(format) => Command::Export {
                    format,
                    path: parts.next().map(PathBuf::from),
                },
                Err(e) => Command::Invalid(e),
            },
            ("export", None) => Command::Invalid("/export needs a format: txt or json".to_string()),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit" | "q", _) => Command::Quit,
            (other, _) => Command::Invalid(format!("unknown command /{other}, try /help")),
        };
        Some(cmd)
    }
}

/// Parse a menu selection: a 1-based index or an option label.
pub fn parse_choice<T>(input: &str, options: &[T]) -> Option<T>
where
    T: Copy + Display,
{
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .copied()
        .find(|o| o.to_string().eq_ignore_ascii_case(input))
}

/// Interactive session loop. Owns the single active `SessionRecord`.
pub struct Cli<R> {
    engine: InterviewEngine,
    store: Arc<dyn SessionStore>,
    lines: Lines<R>,
    active: Option<SessionRecord>,
}

impl<R> Cli<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(engine: InterviewEngine, store: Arc<dyn SessionStore>, reader: R) -> Self {
        Self {
            engine,
            store,
            lines: reader.lines(),
            active: None,
        }
    }

    /// Read commands until `/quit` or EOF.
    pub async fn run(&mut self) -> io::Result<()> {
        eprintln!("{HELP_TEXT}\n");
        loop {
            let Some(line) = self.read_line("> ").await? else {
                break;
            };
            let Some(cmd) = Command::parse(&line) else {
                continue;
            };
            if cmd == Command::Quit {
                break;
            }
            self.handle(cmd).await?;
        }
        Ok(())
    }

    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        eprint!("{prompt}");
        self.lines.next_line().await
    }

    async fn handle(&mut self, cmd: Command) -> io::Result<()> {
        match cmd {
            Command::New => self.new_interview().await?,
            Command::List => self.list().await,
            Command::Load(file) => match self.store.load(&file).await {
                Ok(record) => {
                    eprintln!("📂 Loaded {file} ({})", record.phase());
                    print_transcript(&record);
                    self.active = Some(record);
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            Command::Delete(file) => match self.store.delete(&file).await {
                Ok(()) => {
                    eprintln!("🗑️  Deleted {file}");
                    if self.active.as_ref().is_some_and(|r| r.file_name == file) {
                        self.active = None;
                    }
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            Command::Show => match self.active {
                Some(ref record) => print_transcript(record),
                None => eprintln!("ℹ️  No active session"),
            },
            Command::Save => {
                if let Some(ref mut record) = self.active {
                    match self.engine.save(record).await {
                        Ok(name) => eprintln!("💾 Saved {name}"),
                        Err(e) => eprintln!("❌ {e}"),
                    }
                } else {
                    eprintln!("ℹ️  No active session");
                }
            }
            Command::Feedback => {
                if let Some(ref mut record) = self.active {
                    match self.engine.request_feedback(record).await {
                        Ok(outcome) => render_outcome(&outcome),
                        Err(e) => eprintln!("❌ {e}"),
                    }
                } else {
                    eprintln!("ℹ️  No active session");
                }
            }
            Command::Export { format, path } => self.export(format, path).await,
            Command::Help => eprintln!("{HELP_TEXT}"),
            Command::Quit => {}
            Command::Answer(text) => self.answer(&text).await,
            Command::Invalid(msg) => eprintln!("❌ {msg}"),
        }
        Ok(())
    }

    async fn answer(&mut self, text: &str) {
        let Some(ref mut record) = self.active else {
            eprintln!("ℹ️  No interview in progress. Type /new to start one.");
            return;
        };
        if record.phase() != InterviewPhase::AwaitingAnswer {
            eprintln!("ℹ️  This interview is {}. Use /feedback, /export or /new.", record.phase());
            return;
        }
        if record.question_count + 1 == MAX_QUESTIONS {
            eprintln!("⏳ Last answer received, preparing your feedback...");
        }
        match self.engine.submit_answer(record, text).await {
            Ok(outcome) => render_outcome(&outcome),
            Err(e) => {
                eprintln!("❌ {e}");
                if record.phase() == InterviewPhase::FeedbackPending {
                    eprintln!("   Your answers are saved. Type /feedback to try again.");
                }
            }
        }
    }

    async fn list(&self) {
        match self.store.list().await {
            Ok(summaries) if summaries.is_empty() => {
                eprintln!("No saved conversations yet.");
            }
            Ok(summaries) => {
                eprintln!("Total saved: {}", summaries.len());
                for s in summaries {
                    let status = if s.completed {
                        "completed".to_string()
                    } else {
                        format!("{}/{MAX_QUESTIONS} answered", s.question_count)
                    };
                    println!(
                        "- {} | {} | {} at {} | {} | saved {}",
                        s.file_name,
                        s.display_name,
                        s.position,
                        s.company,
                        status,
                        s.saved_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
            Err(e) => eprintln!("❌ {e}"),
        }
    }

    async fn export(&self, format: ExportFormat, path: Option<PathBuf>) {
        let Some(ref record) = self.active else {
            eprintln!("ℹ️  No active session to export");
            return;
        };
        let bytes = match export::render(record, format) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("❌ {e}");
                return;
            }
        };
        let path = path.unwrap_or_else(|| PathBuf::from(export::export_file_name(record, format)));
        match tokio::fs::write(&path, bytes).await {
            Ok(()) => eprintln!("📥 Exported {} ({})", path.display(), format.mime_type()),
            Err(e) => eprintln!("❌ Could not write {}: {e}", path.display()),
        }
    }

    async fn new_interview(&mut self) -> io::Result<()> {
        let Some(profile) = self.profile_wizard().await? else {
            eprintln!("ℹ️  Setup cancelled");
            return Ok(());
        };
        eprintln!(
            "Your information: {} at {}\n⏳ Starting interview...",
            profile.role_title(),
            profile.company
        );
        match self.engine.start(profile).await {
            Ok(record) => {
                eprintln!("💡 Question 1 of {MAX_QUESTIONS}");
                if let Some(question) = record.last_question() {
                    println!("\n{question}\n");
                }
                self.active = Some(record);
            }
            Err(e) => eprintln!("❌ {e}"),
        }
        Ok(())
    }

    /// Collect a validated profile. `None` on EOF.
    async fn profile_wizard(&mut self) -> io::Result<Option<Profile>> {
        loop {
            let Some(name) = self.read_line("Name: ").await? else {
                return Ok(None);
            };
            let Some(level) = self.choose("Choose level", ExperienceLevel::ALL).await? else {
                return Ok(None);
            };
            let Some(skills) = self.read_line("Skills: ").await? else {
                return Ok(None);
            };
            let Some(background) = self.read_line("Experience (optional): ").await? else {
                return Ok(None);
            };
            let Some(position) = self.choose("Choose a position", Position::ALL).await? else {
                return Ok(None);
            };
            let Some(company) = self.choose("Choose a company", Company::ALL).await? else {
                return Ok(None);
            };

            match Profile::new(&name, level, &skills, Some(&background), position, company) {
                Ok(profile) => return Ok(Some(profile)),
                Err(e) => eprintln!("❌ {e}. Let's try again."),
            }
        }
    }

    async fn choose<T>(&mut self, label: &str, options: &[T]) -> io::Result<Option<T>>
    where
        T: Copy + Display,
    {
        eprintln!("{label}:");
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}. {option}", i + 1);
        }
        loop {
            let Some(input) = self.read_line("> ").await? else {
                return Ok(None);
            };
            match parse_choice(&input, options) {
                Some(choice) => return Ok(Some(choice)),
                None => eprintln!("Pick a number between 1 and {}", options.len()),
            }
        }
    }
}

fn render_outcome(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::AwaitingAnswer {
            question,
            question_number,
        } => {
            eprintln!("💡 Question {question_number} of {MAX_QUESTIONS}");
            println!("\n{question}\n");
        }
        TurnOutcome::Completed { feedback } => {
            eprintln!("💾 Conversation with feedback saved!");
            match feedback.score {
                Some(score) => println!("\nScore: {score}/10"),
                None => println!("\nScore: n/a"),
            }
            println!("{}\n", feedback.text);
        }
    }
}

fn print_transcript(record: &SessionRecord) {
    println!("{}", export::to_text(record));
}
