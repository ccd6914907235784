use super::render::{names, BuiltinRenderer};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::model::CommandResponse;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

const MIN_NAME_WIDTH: usize = 10;

#[derive(Serialize)]
struct HelpCommand<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct HelpGroup<'a> {
    heading: String,
    commands: Vec<HelpCommand<'a>>,
}

#[derive(Serialize)]
struct HelpData<'a> {
    groups: Vec<HelpGroup<'a>>,
    width: usize,
}

#[derive(Serialize)]
struct TopicData<'a> {
    name: &'a str,
    category: &'a str,
    description: &'a str,
}

/// `help` lists active commands grouped by category; `help <command>` shows
/// one entry.
pub fn run(catalog: &Catalog, args: &[String], renderer: &BuiltinRenderer) -> Result<CommandResponse> {
    if let Some(topic) = args.first() {
        return match catalog.lookup(topic) {
            Some(spec) => renderer
                .render(
                    names::HELP_TOPIC,
                    &TopicData {
                        name: &spec.name,
                        category: &spec.category,
                        description: &spec.description,
                    },
                )
                .map(CommandResponse::ok),
            None => Ok(CommandResponse::error(format!(
                "No help topic: {}. Type 'help' to see available commands.",
                topic
            ))),
        };
    }

    let specs = catalog.list(None);
    let width = specs
        .iter()
        .map(|s| s.name.width())
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);

    let mut groups: Vec<HelpGroup> = Vec::new();
    for spec in specs {
        let heading = spec.category.to_uppercase();
        let command = HelpCommand {
            name: &spec.name,
            description: &spec.description,
        };
        match groups.last_mut() {
            Some(group) if group.heading == heading => group.commands.push(command),
            _ => groups.push(HelpGroup {
                heading,
                commands: vec![command],
            }),
        }
    }

    renderer
        .render(names::HELP, &HelpData { groups, width })
        .map(CommandResponse::ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::model::BuiltinHandler;

    fn catalog() -> Catalog {
        Catalog::load(
            &MemoryCatalog::new()
                .with_builtin(BuiltinHandler::Help, "system")
                .with_builtin(BuiltinHandler::Clear, "system")
                .with_template("whoami", "general", "{{user}}"),
        )
        .unwrap()
    }

    fn renderer() -> BuiltinRenderer {
        BuiltinRenderer::new(false).unwrap()
    }

    #[test]
    fn groups_commands_by_category() {
        let out = run(&catalog(), &[], &renderer()).unwrap();
        assert!(!out.error);
        let expected = "Available commands:\n\
                        \n\
                        GENERAL\n  \
                        whoami      whoami command\n\
                        \n\
                        SYSTEM\n  \
                        clear       clear command\n  \
                        help        help command\n\
                        \n\
                        Type help <command> for details.";
        assert_eq!(out.output, expected);
    }

    #[test]
    fn topic_shows_single_command() {
        let out = run(&catalog(), &["WHOAMI".to_string()], &renderer()).unwrap();
        assert_eq!(out.output, "whoami (general)\n  whoami command");
    }

    #[test]
    fn unknown_topic_is_an_error() {
        let out = run(&catalog(), &["nope".to_string()], &renderer()).unwrap();
        assert!(out.error);
        assert!(out.output.starts_with("No help topic: nope."));
    }
}
