//! # Command dispatch
//!
//! [`Shell::execute`] is the single entry point for running a command:
//!
//! 1. the terminal limiter admits or rejects the caller ([`Outcome::Rejected`]
//!    short-circuits everything else)
//! 2. the command name and every argument are sanitized
//! 3. the raw text is scanned for dangerous patterns; matches are recorded as
//!    security events and change nothing else
//! 4. the name is resolved case-insensitively against the catalog
//! 5. built-ins run their handler, template entries go through the
//!    [`TemplateProcessor`] with a fresh [`TemplateContext`]
//!
//! Every completed execution is audit-logged inside a span carrying a
//! per-request id.

use crate::builtins::{self, BuiltinEnv, BuiltinRenderer, Invocation};
use crate::catalog::json::JsonCatalog;
use crate::catalog::Catalog;
use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::model::{CommandBody, CommandResponse, CommandSpec};
use crate::rate_limit::{ClientIdentity, RateLimitDecision};
use crate::sanitize::{self, DEFAULT_MAX_STRING_LEN};
use crate::security::{scan_dangerous, SecurityEvent, SecurityEventKind};
use crate::state::ShellState;
use crate::store::json::JsonProjectStore;
use crate::store::memory::MemoryStore;
use crate::store::ProjectStore;
use crate::template::{TemplateContext, TemplateProcessor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

/// The JSON body of a command request. Values are untyped until sanitized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: Value,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CommandRequest {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: Value::from(command),
            args: args.iter().map(|a| Value::from(*a)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed {
        response: CommandResponse,
        rate_limit: RateLimitDecision,
    },
    Rejected {
        rate_limit: RateLimitDecision,
    },
}

impl Outcome {
    pub fn rate_limit(&self) -> &RateLimitDecision {
        match self {
            Outcome::Completed { rate_limit, .. } | Outcome::Rejected { rate_limit } => rate_limit,
        }
    }

    pub fn response(&self) -> Option<&CommandResponse> {
        match self {
            Outcome::Completed { response, .. } => Some(response),
            Outcome::Rejected { .. } => None,
        }
    }

    /// The response, or [`ShellError::RateLimited`] for a rejection.
    pub fn into_result(self) -> Result<CommandResponse> {
        match self {
            Outcome::Completed { response, .. } => Ok(response),
            Outcome::Rejected { rate_limit } => Err(rate_limit
                .rejection()
                .unwrap_or(ShellError::RateLimited { retry_after: 1 })),
        }
    }
}

pub struct Shell {
    config: ShellConfig,
    state: Arc<ShellState>,
    catalog: Catalog,
    store: Arc<dyn ProjectStore>,
    templates: TemplateProcessor,
    renderer: BuiltinRenderer,
}

impl Shell {
    pub fn new(
        config: ShellConfig,
        state: Arc<ShellState>,
        catalog: Catalog,
        store: Arc<dyn ProjectStore>,
    ) -> Result<Self> {
        let templates = TemplateProcessor::new(config.use_color);
        let renderer = BuiltinRenderer::new(config.use_color)?;
        Ok(Self {
            config,
            state,
            catalog,
            store,
            templates,
            renderer,
        })
    }

    /// Builds the data sources named in `config` and a state with a running
    /// sweeper.
    pub fn from_config(config: ShellConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(&JsonCatalog::new(path))?,
            None => Catalog::embedded()?,
        };
        let store: Arc<dyn ProjectStore> = match &config.projects_path {
            Some(path) => Arc::new(JsonProjectStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        let state = Arc::new(ShellState::with_sweeper(&config)?);
        info!(commands = catalog.len(), "shell ready");
        Self::new(config, state, catalog, store)
    }

    pub fn state(&self) -> &Arc<ShellState> {
        &self.state
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn execute(&self, command: &str, args: &[String], identity: &ClientIdentity) -> Outcome {
        self.execute_at(command, args, identity, Utc::now())
    }

    pub fn execute_at(
        &self,
        command: &str,
        args: &[String],
        identity: &ClientIdentity,
        now: DateTime<Utc>,
    ) -> Outcome {
        let command = Value::from(command);
        let args: Vec<Value> = args.iter().map(|a| Value::from(a.as_str())).collect();
        self.run(&command, &args, identity, now)
    }

    pub fn execute_request(&self, request: &CommandRequest, identity: &ClientIdentity) -> Outcome {
        self.run(&request.command, &request.args, identity, Utc::now())
    }

    /// Admission check for non-command routes.
    pub fn admit_api(&self, identity: &ClientIdentity) -> RateLimitDecision {
        let decision = self.state.api_limiter().admit(identity);
        if !decision.allowed {
            self.record_rate_limit(identity, &decision);
        }
        decision
    }

    /// Active commands, optionally limited to one category.
    pub fn list_commands(&self, category: Option<&str>) -> Vec<&CommandSpec> {
        self.catalog.list(category)
    }

    fn run(&self, command: &Value, args: &[Value], identity: &ClientIdentity, now: DateTime<Utc>) -> Outcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("command", request_id = %request_id, client = %identity);
        let _guard = span.enter();

        let rate_limit = self.state.terminal_limiter().admit_at(identity, now);
        if !rate_limit.allowed {
            self.record_rate_limit(identity, &rate_limit);
            return Outcome::Rejected { rate_limit };
        }

        let (name, response) = match sanitize_request(command, args) {
            Ok((name, clean_args)) => {
                self.scan(command, args, identity);
                let response = self.dispatch(&name, &clean_args, now);
                (name, response)
            }
            Err(e) => {
                self.state.security().record(SecurityEvent::new(
                    SecurityEventKind::InvalidInput,
                    identity.key(),
                    e.to_string(),
                ));
                (String::new(), CommandResponse::error(e.to_string()))
            }
        };

        info!(command = %name, error = response.error, "command executed");
        Outcome::Completed {
            response,
            rate_limit,
        }
    }

    fn dispatch(&self, command: &str, args: &[String], now: DateTime<Utc>) -> CommandResponse {
        // A command line sent as one string is split into name and arguments.
        let mut words = command.split_whitespace();
        let Some(name) = words.next() else {
            return CommandResponse::ok("");
        };
        let args: Vec<String> = words.map(str::to_string).chain(args.iter().cloned()).collect();

        let Some(spec) = self.catalog.lookup(name) else {
            debug!(command = %name, "unknown command");
            return CommandResponse::error(ShellError::NotFound(name.to_string()).to_string());
        };

        let invocation = Invocation {
            command: &spec.name,
            args: &args,
            default_page_size: self.config.default_page_size,
            timeout: self.config.store_timeout(),
            now,
        };
        match &spec.body {
            CommandBody::Builtin(handler) => {
                let env = BuiltinEnv {
                    catalog: &self.catalog,
                    store: &self.store,
                    renderer: &self.renderer,
                };
                builtins::run(*handler, &env, &invocation).unwrap_or_else(|e| {
                    error!(command = %spec.name, error = %e, "built-in failed");
                    CommandResponse::error(e.to_string())
                })
            }
            CommandBody::Template(template) => {
                let context = self.context_for(spec, &args, now);
                CommandResponse::ok(self.templates.process(template, &context))
            }
        }
    }

    fn context_for(&self, spec: &CommandSpec, args: &[String], now: DateTime<Utc>) -> TemplateContext {
        TemplateContext::new(args.to_vec(), &self.config.user, &self.config.timezone, now)
            .with_extra("command", &spec.name)
            .with_extra("uptime", self.state.uptime().as_secs().to_string())
            .with_extra("version", env!("CARGO_PKG_VERSION"))
    }

    fn scan(&self, command: &Value, args: &[Value], identity: &ClientIdentity) {
        let raw = std::iter::once(command)
            .chain(args)
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let matches = scan_dangerous(&raw);
        if !matches.is_empty() {
            self.state.security().record(SecurityEvent::new(
                SecurityEventKind::SuspiciousCommand,
                identity.key(),
                format!("{}: {}", matches.join(", "), sanitize::sanitize_string(&raw, DEFAULT_MAX_STRING_LEN)),
            ));
        }
    }

    fn record_rate_limit(&self, identity: &ClientIdentity, decision: &RateLimitDecision) {
        self.state.security().record(SecurityEvent::new(
            SecurityEventKind::RateLimitExceeded,
            identity.key(),
            format!("retry after {}s", decision.retry_after.unwrap_or_default()),
        ));
    }
}

fn sanitize_request(command: &Value, args: &[Value]) -> Result<(String, Vec<String>)> {
    let name = sanitize::sanitize_command_value(command)?;
    let args = args
        .iter()
        .map(|a| sanitize::sanitize_value(a, DEFAULT_MAX_STRING_LEN))
        .collect::<Result<Vec<_>>>()?;
    Ok((name, args))
}
