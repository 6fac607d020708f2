//! Command-line front end for the student registry.
//!
//! # Responsibility
//! - Drive the same form and repository the mobile screen uses.
//! - Keep output plain text, one card per student.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use studentreg_core::db::open_db;
use studentreg_core::{
    default_log_level, init_logging, student_cards, RegistrationForm, RegistryConfig,
    SqliteDocumentStore, StudentRepository, SubmitAction,
};

/// studentreg - register students from the terminal
#[derive(Debug, Parser)]
#[command(name = "studentreg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file (defaults to $STUDENTREG_DB_PATH or a temp-dir file)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Collection name (defaults to $STUDENTREG_COLLECTION or `students`)
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Write rolling logs to this absolute directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every registered student
    List,
    /// Register a new student
    Add(StudentArgs),
    /// Edit a registered student; omitted fields keep their value
    Update {
        /// Document key shown by `list`
        doc_id: String,
        #[command(flatten)]
        fields: StudentArgs,
    },
    /// Delete a registered student
    Delete {
        /// Document key shown by `list`
        doc_id: String,
    },
    /// Check core linkage
    Ping,
}

#[derive(Debug, Args)]
struct StudentArgs {
    /// External student ID
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    program: Option<String>,
    /// Phone number; repeat for several. Replaces the stored list when given.
    #[arg(long = "phone")]
    phones: Vec<String>,
}

impl StudentArgs {
    fn apply(self, form: &mut RegistrationForm) {
        if let Some(id) = self.id {
            form.student_id = id;
        }
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(program) = self.program {
            form.program = program;
        }
        if !self.phones.is_empty() {
            form.phones.clear();
            for phone in self.phones {
                form.phone_input = phone;
                form.add_phone_from_input();
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(|err| err.to_string())?;
    }

    let mut config = RegistryConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(collection) = cli.collection {
        config.collection = collection;
    }

    match cli.command {
        Command::Ping => {
            println!("studentreg_core ping={}", studentreg_core::ping());
            println!("studentreg_core version={}", studentreg_core::core_version());
            Ok(())
        }
        command => run_against_db(&config, command),
    }
}

fn run_against_db(config: &RegistryConfig, command: Command) -> Result<(), String> {
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let mut repo =
        StudentRepository::new(SqliteDocumentStore::new(&conn), config.collection.as_str())
            .map_err(|err| err.to_string())?;
    let mut form = RegistrationForm::new();

    match command {
        Command::List | Command::Ping => {}
        Command::Add(fields) => {
            fields.apply(&mut form);
            report_submit(&mut form, &repo)?;
        }
        Command::Update { doc_id, fields } => {
            let listed = repo
                .find(doc_id.trim())
                .cloned()
                .ok_or_else(|| format!("student not found: {doc_id}"))?;
            form.begin_edit(&listed);
            fields.apply(&mut form);
            report_submit(&mut form, &repo)?;
        }
        Command::Delete { doc_id } => {
            let listed = repo
                .find(doc_id.trim())
                .cloned()
                .ok_or_else(|| format!("student not found: {doc_id}"))?;
            form.delete_entry(&repo, &listed).map_err(|err| err.to_string())?;
            println!("deleted {}", listed.doc_id);
        }
    }

    repo.sync();
    print_list(&repo);
    Ok(())
}

fn report_submit(
    form: &mut RegistrationForm,
    repo: &StudentRepository<SqliteDocumentStore<'_>>,
) -> Result<(), String> {
    let outcome = form.submit(repo);
    let saved = outcome.result.map_err(|err| err.to_string())?;
    match outcome.action {
        SubmitAction::Create => println!("added {}", saved.doc_id()),
        SubmitAction::Update(_) => println!("updated {}", saved.doc_id()),
    }
    Ok(())
}

fn print_list(repo: &StudentRepository<SqliteDocumentStore<'_>>) {
    let cards = student_cards(repo.students());
    if cards.is_empty() {
        println!("no students");
        return;
    }
    for card in cards {
        println!("[{}]", card.doc_id);
        for line in card.lines {
            println!("  {line}");
        }
    }
}
