use clap::{Parser, Subcommand};
use settei::criteria::{CriteriaSet, Record, record_from_json};
use settei::prelude::*;
use settei::session::SessionSnapshot;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Runs the built-in agent configuration wizards from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered wizards and their variants
    List,
    /// Run a wizard, either from a JSON answers file or interactively
    Run {
        /// Wizard type, e.g. `sdr` or `analyser`
        wizard: String,
        /// JSON file holding one answers object per step, in order
        answers_path: Option<String>,
        /// Schema variant to run instead of the default one
        #[arg(long)]
        variant: Option<String>,
        /// Continue a session saved with `--suspend`
        #[arg(long)]
        resume: Option<String>,
        /// Save the session to this file after the answers instead of finishing it
        #[arg(long)]
        suspend: Option<String>,
        /// Prompt for each field of each step
        #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
        human: bool,
    },
    /// Print the records of a JSON file that match a JSON criteria file
    Filter {
        /// JSON array of `{ field, operator, value }` criteria
        criteria_path: String,
        /// JSON array of record objects
        records_path: String,
        /// Explain the outcome for every record
        #[arg(short, long)]
        explain: bool,
    },
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List => run_list(),
        Command::Run {
            wizard,
            answers_path,
            variant,
            resume,
            suspend,
            human,
        } => run_wizard(RunOptions {
            wizard,
            answers_path,
            variant,
            resume,
            suspend,
            human,
        }),
        Command::Filter {
            criteria_path,
            records_path,
            explain,
        } => run_filter(&criteria_path, &records_path, explain),
    }
}

fn load_catalog() -> Arc<Catalog> {
    let catalog = settei::catalog::builtin()
        .unwrap_or_else(|e| exit_with_error(&format!("Built-in catalog is invalid: {}", e)));
    Arc::new(catalog)
}

fn read_json(path: &str, what: &str) -> serde_json::Value {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    });
    serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)))
}

fn run_list() {
    let catalog = load_catalog();
    println!("--- Registered Wizards ---");
    for wizard in catalog.wizards() {
        let Some(definition) = catalog.definition(wizard) else {
            continue;
        };
        for (variant, schema) in definition.variants() {
            let steps: Vec<&str> = schema.steps().iter().map(|s| s.id.as_str()).collect();
            println!("{:<12} {:<10} steps: {}", wizard, variant, steps.join(" -> "));
        }
    }
    let unregistered: Vec<String> = WizardType::ALL
        .into_iter()
        .filter(|w| !catalog.contains(*w))
        .map(|w| w.to_string())
        .collect();
    if !unregistered.is_empty() {
        println!("\nNot registered: {}", unregistered.join(", "));
    }
}

struct RunOptions {
    wizard: String,
    answers_path: Option<String>,
    variant: Option<String>,
    resume: Option<String>,
    suspend: Option<String>,
    human: bool,
}

fn run_wizard(options: RunOptions) {
    let wizard: WizardType = options
        .wizard
        .parse()
        .unwrap_or_else(|e: SessionError| exit_with_error(&e.to_string()));
    let mut service = WizardService::in_memory(load_catalog());

    let session = match (&options.resume, &options.variant) {
        (Some(path), _) => {
            let snapshot = SessionSnapshot::from_file(path)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to resume: {}", e)));
            if snapshot.wizard != wizard {
                exit_with_error(&format!(
                    "Snapshot '{}' belongs to wizard '{}', not '{}'",
                    path, snapshot.wizard, wizard
                ));
            }
            service.resume(snapshot)
        }
        (None, Some(variant)) => service.start_wizard_variant(wizard, variant),
        (None, None) => service.start_wizard(wizard),
    }
    .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("Session {} started for '{}'", session, wizard);

    if let Some(path) = &options.answers_path {
        let steps = match read_json(path, "answers") {
            serde_json::Value::Array(steps) => steps,
            single => vec![single],
        };
        for (index, answers) in steps.iter().enumerate() {
            let result = service
                .submit_step_json(session, answers)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            print_step_result(index + 1, &result);
            if !result.ok {
                exit_with_error("Step was rejected; stopping.");
            }
        }
    }
    if options.human {
        run_interactive(&mut service, session);
    }

    if let Some(path) = &options.suspend {
        service
            .snapshot(session)
            .and_then(|snapshot| Ok(snapshot.save(path)?))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to suspend: {}", e)));
        println!("\nSession saved to '{}'", path);
        return;
    }

    let preview = service
        .get_preview(session)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("\n--- Agent Output ---\n{}", preview.agent_output);
    println!("\n--- System Prompt ---\n{}", preview.system_prompt);

    let config = service
        .finish_wizard(session)
        .unwrap_or_else(|e| exit_with_error(&format!("Could not finish the wizard: {}", e)));
    let json = serde_json::to_string_pretty(&config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode configuration: {}", e)));
    println!("\n--- Final Configuration ---\n{}", json);
}

fn print_step_result(index: usize, result: &StepResult) {
    match (result.ok, &result.next_step_id) {
        (true, Some(next)) => println!("  Step {}: accepted -> {}", index, next),
        (true, None) => println!("  Step {}: accepted (last step)", index),
        (false, _) => {
            println!("  Step {}: rejected", index);
            for error in &result.errors {
                println!("    - {}", error);
            }
        }
    }
}

/// Prompts for every applicable field of the current step until the last step is done.
fn run_interactive(service: &mut WizardService, session: SessionId) {
    println!("--- Settei Interactive Mode ---");
    loop {
        let Some(step) = service
            .current_step(session)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()))
            .cloned()
        else {
            return;
        };
        println!("\n[{}]", step.title.as_deref().unwrap_or(&step.id));

        let schema = service
            .schema(session)
            .map(Arc::clone)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        let mut answers = Answers::new();
        for field_id in &step.fields {
            let Some(spec) = schema.field(field_id) else {
                continue;
            };
            let allowed = service
                .allowed_values(session, field_id)
                .unwrap_or(AllowedValues::Inapplicable);
            let hint = match &allowed {
                AllowedValues::Inapplicable => continue,
                AllowedValues::OneOf(options) => format!(" ({})", options.join(" | ")),
                AllowedValues::Any => format!(" <{}>", spec.value_type),
            };
            let input = prompt_for_input(&format!("{}{}", spec.display_name(), hint));
            if input.is_empty() {
                continue;
            }
            match parse_input(spec.value_type, &input) {
                Some(value) => {
                    answers.insert(field_id.clone(), value);
                }
                None => println!("  ignored: not a valid {} value", spec.value_type),
            }
        }

        let result = service
            .submit_step(session, answers)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        for error in &result.errors {
            println!("  - {}", error);
        }
        if result.ok && result.next_step_id.is_none() {
            return;
        }
    }
}

fn parse_input(value_type: ValueType, input: &str) -> Option<Value> {
    match value_type {
        ValueType::MultiEnum => Some(Value::List(
            input
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )),
        ValueType::Criteria => serde_json::from_str::<serde_json::Value>(input)
            .ok()
            .and_then(|json| value_type.value_from_json(&json)),
        _ => value_type.value_from_json(&serde_json::Value::String(input.to_string())),
    }
}

fn run_filter(criteria_path: &str, records_path: &str, explain: bool) {
    let criteria = CriteriaSet::from_json(&read_json(criteria_path, "criteria"))
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid criteria: {}", e)));
    let records: Vec<Record> = match read_json(records_path, "records") {
        serde_json::Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                record_from_json(item).unwrap_or_else(|| {
                    exit_with_error(&format!("Record #{} is not a JSON object", i + 1))
                })
            })
            .collect(),
        _ => exit_with_error("Records file must hold a JSON array of objects"),
    };

    println!("Criteria: {}", criteria);
    if explain {
        for (i, record) in records.iter().enumerate() {
            println!("  #{:<4} {}", i + 1, criteria.explain(record));
        }
    }
    let matched = criteria.filter(&records);
    println!("\n{} of {} records match", matched.len(), records.len());
    for record in matched {
        let json: serde_json::Map<String, serde_json::Value> = record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        println!("{}", serde_json::Value::Object(json));
    }
}

/// A helper function to prompt the user and read a line of input. Exits on end of input.
fn prompt_for_input(prompt_text: &str) -> String {
    print!("> {}: ", prompt_text);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }
    match read_trimmed_line(&mut io::stdin().lock()) {
        Ok(Some(line)) => line,
        Ok(None) => exit_with_error("Input closed before the wizard finished"),
        Err(e) => exit_with_error(&format!("Failed to read line: {}", e)),
    }
}

/// `None` once the reader is exhausted.
fn read_trimmed_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    match reader.read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line.trim().to_string())),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_trimmed_line_reports_end_of_input() {
        let mut input = io::Cursor::new("  sales \n\n");
        assert_eq!(read_trimmed_line(&mut input).unwrap(), Some("sales".to_string()));
        assert_eq!(read_trimmed_line(&mut input).unwrap(), Some(String::new()));
        assert_eq!(read_trimmed_line(&mut input).unwrap(), None);
    }
}
