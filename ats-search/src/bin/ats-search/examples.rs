use crate::commands::{compile, explain, import, index, matching, search};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "compile",
            groups: compile::EXAMPLES,
        },
        CommandExample {
            name: "explain",
            groups: explain::EXAMPLES,
        },
        CommandExample {
            name: "match",
            groups: matching::EXAMPLES,
        },
        CommandExample {
            name: "index",
            groups: index::EXAMPLES,
        },
        CommandExample {
            name: "search",
            groups: search::EXAMPLES,
        },
        CommandExample {
            name: "import",
            groups: import::EXAMPLES,
        },
    ]
}
