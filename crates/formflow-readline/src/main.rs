use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use formflow_application::SessionController;
use formflow_core::session::{ChatMessage, MessageRole, SessionMode};
use formflow_interaction::{FormFlowConfig, HttpDocumentAnalyzer, HttpFormAssistant};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/load".to_string(),
                "/example".to_string(),
                "/fill".to_string(),
                "/field".to_string(),
                "/fields".to_string(),
                "/clear".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints transcript messages appended since the last render and returns the
/// new high-water mark.
fn render_transcript(controller: &SessionController, printed: usize) -> usize {
    let messages = controller.session().transcript().messages();
    for message in &messages[printed..] {
        print_message(message);
    }
    messages.len()
}

fn print_message(message: &ChatMessage) {
    match message.role {
        MessageRole::User => {
            println!("{}", format!("> {}", message.text).green());
        }
        MessageRole::System => {
            println!("{}", message.text.bright_yellow());
        }
        MessageRole::Ai => {
            let color: fn(&str) -> String = if message.is_interview {
                |line| line.bright_magenta().to_string()
            } else {
                |line| line.bright_blue().to_string()
            };
            for line in message.text.lines() {
                println!("{}", color(line));
            }
        }
    }
}

fn print_fields(controller: &SessionController) {
    let fields = controller.session().fields().fields();
    if fields.is_empty() {
        println!("{}", "No fields detected yet. Use /load or /example.".bright_black());
        return;
    }

    let active_id = controller
        .session()
        .active_field()
        .map(|f| f.id.clone());

    for field in fields {
        let marker = if active_id.as_deref() == Some(field.id.as_str()) {
            "*"
        } else {
            " "
        };
        let value = field.value.as_deref().unwrap_or("-");
        println!(
            "{} {} {} = {}",
            marker.bright_cyan(),
            format!("[{}]", field.simple_id).bright_cyan(),
            field.label,
            value.green()
        );
    }
}

/// Resolves a `/field` argument against the registry: either a stable field
/// id or a stringified simple id.
fn resolve_field_id(controller: &SessionController, arg: &str) -> Option<String> {
    controller
        .session()
        .fields()
        .fields()
        .iter()
        .find(|f| f.id == arg || f.simple_id.to_string() == arg)
        .map(|f| f.id.clone())
}

async fn run_command(controller: &mut SessionController, command: &str, args: &str) {
    let outcome = match command {
        "/example" => controller.load_example().await,
        "/load" => {
            if args.is_empty() {
                println!("{}", "Usage: /load <path-to-document>".bright_black());
                return;
            }
            match tokio::fs::read(args).await {
                Ok(content) => {
                    let file_name = Path::new(args)
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| args.to_string());
                    controller.load_from_upload(&file_name, content).await
                }
                Err(e) => {
                    eprintln!("{}", format!("Cannot read '{}': {}", args, e).red());
                    return;
                }
            }
        }
        "/fill" => controller.start_auto_fill().await,
        "/field" => {
            if args.is_empty() {
                controller.set_active_field(None)
            } else {
                match resolve_field_id(controller, args) {
                    Some(id) => {
                        let result = controller.set_active_field(Some(&id));
                        if result.is_ok() {
                            if let Some(field) = controller.session().active_field() {
                                println!(
                                    "{}",
                                    format!("Active field: {}", field.label).bright_cyan()
                                );
                            }
                        }
                        result
                    }
                    None => {
                        eprintln!("{}", format!("No field matches '{}'", args).red());
                        return;
                    }
                }
            }
        }
        "/fields" => {
            print_fields(controller);
            return;
        }
        "/clear" => controller.clear_document(),
        _ => {
            println!("{}", format!("Unknown command: {}", command).bright_black());
            return;
        }
    };

    if let Err(e) = outcome {
        eprintln!("{}", format!("Error: {}", e).red());
    }

    if let Some(error) = controller.session().last_error() {
        eprintln!("{}", format!("Load error: {}", error).red());
    }
}

/// The main entry point for the FormFlow REPL.
///
/// Sets up a rustyline-based shell around a [`SessionController`] backed by
/// the HTTP collaborator clients: slash commands manage the document and the
/// interview, everything else is chat input routed by the session mode.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = FormFlowConfig::resolve()?;
    let base_url = config.server.base_url;

    let analyzer = Arc::new(HttpDocumentAnalyzer::new(base_url.clone()));
    let assistant = Arc::new(HttpFormAssistant::new(base_url.clone()));
    let mut controller = SessionController::new(analyzer, assistant);

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== FormFlow ===".bright_magenta().bold());
    println!("{}", format!("Collaborator endpoint: {}", base_url).bright_black());
    println!(
        "{}",
        "Commands: /load <path>, /example, /fill, /field [id], /fields, /clear, quit".bright_black()
    );
    println!();

    // Print the greeting the session opens with.
    let mut printed = render_transcript(&controller, 0);

    loop {
        let prompt = match controller.session().mode() {
            SessionMode::Interview => "interview>> ",
            SessionMode::Manual => ">> ",
        };

        let readline = rl.readline(prompt);

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                // Handle quit command
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                // Skip empty lines
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    let (command, args) = match trimmed.split_once(' ') {
                        Some((cmd, rest)) => (cmd, rest.trim()),
                        None => (trimmed, ""),
                    };
                    run_command(&mut controller, command, args).await;
                } else if let Err(e) = controller.handle_input(trimmed).await {
                    eprintln!("{}", format!("Error: {}", e).red());
                }

                printed = render_transcript(&controller, printed);
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
