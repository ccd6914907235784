use chrono::{Duration, TimeZone, Utc};
use shellfolio::catalog::Catalog;
use shellfolio::model::{ProjectRecord, CLEAR_SENTINEL};
use shellfolio::rate_limit::RateLimitProfile;
use shellfolio::security::SecurityEventKind;
use shellfolio::store::memory::MemoryStore;
use shellfolio::store::ProjectStore;
use shellfolio::{ClientIdentity, CommandResponse, Shell, ShellConfig, ShellState};
use std::sync::Arc;

fn projects(count: usize) -> Vec<ProjectRecord> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (1..=count)
        .map(|i| {
            let stack: &[&str] = if i % 2 == 0 { &["Rust", "Axum"] } else { &["React"] };
            ProjectRecord::new(format!("Project {}", i), base - Duration::days(i as i64))
                .with_description(format!("Demo number {}", i))
                .with_stack(stack)
        })
        .collect()
}

fn shell(config: ShellConfig, count: usize) -> Shell {
    let state = Arc::new(ShellState::new(&config));
    let store: Arc<dyn ProjectStore> = Arc::new(MemoryStore::with_projects(projects(count)));
    Shell::new(config, state, Catalog::embedded().unwrap(), store).unwrap()
}

fn plain() -> ShellConfig {
    ShellConfig {
        use_color: false,
        terminal_rate_limit: RateLimitProfile::new(60_000, 1_000),
        ..ShellConfig::default()
    }
}

fn who() -> ClientIdentity {
    ClientIdentity::from_headers(Some("198.51.100.7, 10.0.0.1"), Some("Mozilla/5.0"))
}

fn exec(shell: &Shell, line: &str) -> CommandResponse {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<String> = words.map(str::to_string).collect();
    shell.execute(command, &args, &who()).into_result().unwrap()
}

fn hint(output: &str, label: &str) -> Option<String> {
    output
        .lines()
        .find_map(|l| l.strip_prefix(&format!("{}: ", label)))
        .map(str::to_string)
}

fn header(output: &str) -> &str {
    output.lines().next().unwrap_or_default()
}

#[test]
fn next_and_prev_hints_round_trip() {
    let shell = shell(plain(), 23);

    let first = exec(&shell, "projects rust --per 4 --page 2");
    assert_eq!(header(&first.output), "Page 2/3 • Showing 5-8 of 11");

    let next_line = hint(&first.output, "Next").unwrap();
    assert_eq!(next_line, "projects rust --per 4 --page 3");
    let next = exec(&shell, &next_line);
    assert_eq!(header(&next.output), "Page 3/3 • Showing 9-11 of 11");
    assert!(hint(&next.output, "Next").is_none());

    let back_line = hint(&next.output, "Prev").unwrap();
    let back = exec(&shell, &back_line);
    assert_eq!(back.output, first.output);
}

#[test]
fn listing_is_case_insensitive_and_newest_first() {
    let shell = shell(plain(), 3);
    let out = exec(&shell, "PROJECTS");
    let first = out.output.find("Project 1 ").unwrap();
    let third = out.output.find("Project 3 ").unwrap();
    assert!(first < third);
    assert_eq!(exec(&shell, "projects").output, out.output);
}

#[test]
fn embedded_catalog_templates() {
    let shell = shell(plain(), 0);
    assert_eq!(exec(&shell, "whoami").output, "guest");
    assert_eq!(exec(&shell, "profile title").output, "Full-stack Developer");
    assert_eq!(exec(&shell, "navigate about").output, "Navigating to /about...");
    assert_eq!(exec(&shell, "theme amber").output, "Theme set to amber.");
    assert_eq!(
        exec(&shell, "version").output,
        format!("shellfolio {}", env!("CARGO_PKG_VERSION"))
    );
    assert!(exec(&shell, "uptime").output.starts_with("up "));
    assert_eq!(exec(&shell, "Clear").output, CLEAR_SENTINEL);
    assert!(exec(&shell, "sudo").error);
}

#[test]
fn help_is_grouped_by_category() {
    let shell = shell(plain(), 0);
    let out = exec(&shell, "help").output;
    let general = out.find("GENERAL").unwrap();
    let system = out.find("SYSTEM").unwrap();
    assert!(general < system);
    assert!(!out.contains("sudo"));
}

#[test]
fn colored_output_keeps_escape_sequences() {
    let config = ShellConfig {
        use_color: true,
        ..plain()
    };
    let shell = shell(config, 0);
    let out = exec(&shell, "contact").output;
    assert!(out.contains("\u{1b}["));
    assert!(out.contains("navigate contact"));
}

#[test]
fn identities_are_limited_independently() {
    let config = ShellConfig {
        terminal_rate_limit: RateLimitProfile::new(60_000, 3),
        ..plain()
    };
    let shell = Arc::new(shell(config, 0));
    let handles: Vec<_> = (0..6)
        .map(|client| {
            let shell = Arc::clone(&shell);
            std::thread::spawn(move || {
                let identity = ClientIdentity::from_headers(Some(&format!("10.1.0.{}", client)), None);
                (0..5)
                    .filter(|_| shell.execute("whoami", &[], &identity).response().is_some())
                    .count()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }

    let rejected = shell
        .state()
        .security()
        .snapshot()
        .into_iter()
        .filter(|e| e.kind == SecurityEventKind::RateLimitExceeded)
        .count();
    assert_eq!(rejected, 12);
}

#[test]
fn security_log_respects_configured_capacity() {
    let config = ShellConfig {
        security_log_capacity: 4,
        ..plain()
    };
    let shell = shell(config, 0);
    for i in 0..10 {
        exec(&shell, &format!("echo $(id) {}", i));
    }
    let events = shell.state().security().snapshot();
    assert_eq!(events.len(), 4);
    assert!(events[3].details.ends_with("9"));
    assert!(events.iter().all(|e| e.details.starts_with("command substitution")));
}
