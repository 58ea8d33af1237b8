//! Themed `--help` output: clap styles, per-command examples and the
//! environment appendix.

use std::fmt::Write;
use std::io::{self, Write as _};

use clap::{
    ColorChoice, Command, FromArgMatches,
    builder::{
        Styles,
        styling::{Ansi256Color, Color as ClapColor, RgbColor, Style},
    },
    error::{Error, ErrorKind},
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};

use crate::examples::{ExampleGroup, command_examples};
use crate::theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL (overrides [redis] url)"),
    ("ATS_SEARCH_CONFIG", "Path to the configuration file"),
    ("ATS_TENANT", "Default tenant for explain, match and search"),
    ("RUST_LOG", "Log filter for diagnostics (e.g. ats_search=debug)"),
];

/// Parse the process arguments against `command`.
///
/// Help, version and usage errors are printed here and end the process.
pub fn parse_styled<T: FromArgMatches>(command: Command) -> T {
    let command = decorate(command);
    let parsed = command
        .clone()
        .try_get_matches()
        .and_then(|matches| T::from_arg_matches(&matches));

    match parsed {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            exit_with_help(command, &err)
        }
        Err(err) => exit_with(&err),
    }
}

pub fn blank_line(to_stdout: bool) {
    let _ = if to_stdout {
        writeln!(io::stdout())
    } else {
        writeln!(io::stderr())
    };
}

fn exit_with(err: &Error) -> ! {
    let to_stdout = !err.use_stderr();
    blank_line(to_stdout);
    if let Err(print_err) = err.print()
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to print usage: {print_err}");
    }
    blank_line(to_stdout);
    std::process::exit(err.exit_code());
}

fn exit_with_help(mut command: Command, err: &Error) -> ! {
    blank_line(false);
    eprintln!("error: '{}' requires a subcommand", command.get_name());
    blank_line(false);

    let mut stderr = io::stderr();
    if command.write_long_help(&mut stderr).is_ok() {
        let _ = writeln!(stderr);
    }
    std::process::exit(err.exit_code());
}

fn decorate(command: Command) -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = command
        .styles(styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(appendix(use_color));

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let help = render_examples(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(help);
        }
    }
    command
}

fn paint(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => text.color(color).to_string(),
        (true, true) => text.color(color).bold().to_string(),
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let arrow = paint(ICONS.arrow, THEME.secondary, false, use_color);
    let sections: Vec<String> = groups
        .iter()
        .map(|group| {
            let mut section = format!("  {}\n", paint(group.title, THEME.primary, true, use_color));
            for line in group.commands {
                let _ = writeln!(section, "    {arrow} {}", paint(line, THEME.secondary, false, use_color));
            }
            section
        })
        .collect();

    format!(
        "{}\n{}",
        paint("Examples:", THEME.highlight, true, use_color),
        sections.join("\n")
    )
}

fn appendix(use_color: bool) -> String {
    let width = ENVIRONMENT_VARIABLES.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut out = format!("{}\n", paint("Environment Variables:", THEME.highlight, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            out,
            "  {}  {}",
            paint(&format!("{key:<width$}"), THEME.key, true, use_color),
            paint(description, THEME.value, false, use_color)
        );
    }
    let _ = writeln!(
        out,
        "\n{} {}",
        paint("Tip:", THEME.highlight, true, use_color),
        paint(
            "Run 'ats-search <command> --help' for examples of each command.",
            THEME.secondary,
            false,
            use_color
        )
    );
    out
}

fn styles() -> Styles {
    let fg = |color: ThemeColor| Style::new().fg_color(Some(clap_color(color)));
    Styles::styled()
        .usage(fg(THEME.primary).bold())
        .header(fg(THEME.highlight).bold())
        .literal(fg(THEME.secondary))
        .placeholder(fg(THEME.muted))
        .valid(fg(THEME.success))
        .invalid(fg(THEME.warning))
        .error(fg(THEME.error).bold())
}

/// Map a terminal color onto clap's palette through its SGR code
/// (30-37 normal, 90-97 bright).
fn clap_color(color: ThemeColor) -> ClapColor {
    if let ThemeColor::TrueColor { r, g, b } = color {
        return ClapColor::Rgb(RgbColor(r, g, b));
    }
    let index = match color.to_fg_str().parse::<u8>() {
        Ok(code @ 30..=37) => code - 30,
        Ok(code @ 90..=97) => code - 82,
        _ => 7,
    };
    ClapColor::Ansi256(Ansi256Color(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_theme_colors_to_palette_indexes() {
        assert_eq!(clap_color(ThemeColor::Green), ClapColor::Ansi256(Ansi256Color(2)));
        assert_eq!(clap_color(ThemeColor::BrightBlue), ClapColor::Ansi256(Ansi256Color(12)));
        assert_eq!(
            clap_color(ThemeColor::TrueColor { r: 1, g: 2, b: 3 }),
            ClapColor::Rgb(RgbColor(1, 2, 3))
        );
    }

    #[test]
    fn examples_render_without_color() {
        let rendered = render_examples(crate::commands::compile::EXAMPLES, false);
        assert!(rendered.starts_with("Examples:\n  Inspect a Query\n    → ats-search compile"));
    }

    #[test]
    fn appendix_aligns_variable_names() {
        let rendered = appendix(false);
        assert!(rendered.contains("  REDIS_URL          Redis connection URL"));
        assert!(rendered.contains("Tip: Run 'ats-search <command> --help'"));
    }
}
