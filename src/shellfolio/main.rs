use clap::Parser;
use colored::*;
use console::Term;
use directories::ProjectDirs;
use shellfolio::logging::{self, Profile};
use shellfolio::{ClientIdentity, CommandRequest, Outcome, Result, Shell, ShellConfig, ShellError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod args;
use args::{Cli, Commands};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

struct AppContext {
    shell: Shell,
    identity: ClientIdentity,
}

/// Returns whether the command succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let profile = if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    logging::init(profile, cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }
    let ctx = init_context(&cli)?;

    match cli.command {
        Commands::Exec { command, args } => Ok(handle_exec(&ctx, &command, &args)),
        Commands::Request { body } => handle_request(&ctx, &body),
        Commands::Commands { category } => Ok(handle_commands(&ctx, category.as_deref())),
        Commands::Repl => handle_repl(&ctx),
    }
}

fn config_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.config_dir {
        return Ok(dir.clone());
    }
    ProjectDirs::from("com", "shellfolio", "shellfolio")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ShellError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine config dir",
            ))
        })
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let mut config = ShellConfig::load(config_dir(cli)?)?;
    if cli.no_color {
        config.use_color = false;
    }
    let shell = Shell::from_config(config)?;
    let identity =
        ClientIdentity::from_headers(cli.forwarded_for.as_deref(), cli.user_agent.as_deref());
    Ok(AppContext { shell, identity })
}

fn handle_exec(ctx: &AppContext, command: &str, args: &[String]) -> bool {
    let outcome = ctx.shell.execute(command, args, &ctx.identity);
    print_outcome(outcome)
}

fn handle_request(ctx: &AppContext, body: &str) -> Result<bool> {
    let request: CommandRequest = serde_json::from_str(body)?;
    let outcome = ctx.shell.execute_request(&request, &ctx.identity);
    for (name, value) in outcome.rate_limit().headers() {
        eprintln!("{}: {}", name, value);
    }
    match outcome.response() {
        Some(response) => {
            println!("{}", serde_json::to_string(response)?);
            Ok(!response.error)
        }
        None => {
            println!("{}", serde_json::json!({"error": "Too many requests"}));
            Ok(false)
        }
    }
}

fn handle_commands(ctx: &AppContext, category: Option<&str>) -> bool {
    let specs = ctx.shell.list_commands(category);
    if specs.is_empty() {
        println!("No commands found.");
        return true;
    }

    let mut current: Option<&str> = None;
    for spec in specs {
        if current != Some(spec.category.as_str()) {
            if current.is_some() {
                println!();
            }
            println!("{}", spec.category.to_uppercase().bold());
            current = Some(spec.category.as_str());
        }
        println!("  {:<12} {}", spec.name.green(), spec.description);
    }
    true
}

fn handle_repl(ctx: &AppContext) -> Result<bool> {
    let interactive = console::user_attended();
    let prompt = format!("{}@shellfolio:~$ ", ctx.shell.config().user);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("{}", prompt.green());
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        if matches!(command, "exit" | "quit") {
            break;
        }
        let args: Vec<String> = words.map(str::to_string).collect();
        print_outcome(ctx.shell.execute(command, &args, &ctx.identity));
    }
    Ok(true)
}

fn print_outcome(outcome: Outcome) -> bool {
    match outcome {
        Outcome::Completed { response, .. } => {
            if response.is_clear() {
                let term = Term::stdout();
                if term.is_term() {
                    let _ = term.clear_screen();
                }
                true
            } else if response.error {
                eprintln!("{}", response.output.red());
                false
            } else {
                if !response.output.is_empty() {
                    println!("{}", response.output);
                }
                true
            }
        }
        Outcome::Rejected { rate_limit } => {
            eprintln!(
                "{} retry after {}s",
                "Too many requests:".yellow().bold(),
                rate_limit.retry_after.unwrap_or_default()
            );
            false
        }
    }
}
