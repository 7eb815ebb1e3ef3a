//! Shared helpers for command handlers.

use std::fmt::Write as _;
use std::future::Future;
use std::io::{self, BufRead, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use tabled::Tabled;

use warden_core::{CoreError, FormState, FormValues, Page, PaginationModel, Paginator};

use crate::cli::{GlobalOpts, OutputFormat, PageArgs};
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Copy the flags that were given into the form. Absent flags leave the
/// form's value alone.
pub fn fill(form: &mut FormState, values: &[(&str, Option<&str>)]) {
    for (name, value) in values {
        if let Some(value) = value {
            form.set_value(name, *value);
        }
    }
}

/// Validate the form and hand out its values, or a per-field diagnostic.
pub fn validated(form: &mut FormState) -> Result<FormValues, CliError> {
    if let Some(values) = form.begin_submit() {
        return Ok(values);
    }
    let mut details = String::new();
    for (name, message) in form.errors() {
        let label = form.field(name).map_or(name.as_str(), |f| f.label);
        let _ = writeln!(details, "{label}: {message}");
    }
    Err(CliError::InvalidForm {
        form: form.title().to_owned(),
        count: form.errors().len(),
        details: details.trim_end().to_owned(),
    })
}

/// Read a secret from the first line of stdin, or prompt without echo.
pub fn read_secret(prompt: &str, from_stdin: bool) -> Result<SecretString, CliError> {
    let secret = if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password(prompt)?
    };
    Ok(SecretString::from(secret))
}

/// Spinner on stderr while a request runs. Hidden with `--quiet` or when
/// stderr is not a terminal.
pub fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner().with_message(message.to_owned());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Fetch the page selected by `args` into a paginator.
pub async fn fetch_page<T, F, Fut>(args: &PageArgs, fetch: F) -> Result<Paginator<T>, CoreError>
where
    F: FnOnce(PaginationModel) -> Fut,
    Fut: Future<Output = Result<Page<T>, CoreError>>,
{
    let mut paginator = Paginator::new(PaginationModel {
        page: args.page,
        page_size: args.page_size,
    });
    let request = paginator.refresh();
    let page = fetch(request.model()).await?;
    paginator.apply(request, Ok(page));
    Ok(paginator)
}

/// Print a fetched page; tables get a range footer on stderr.
pub fn print_page<T, R>(
    global: &GlobalOpts,
    paginator: &Paginator<T>,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<(), CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    let out = output::render_list(&global.output, paginator.rows(), to_row, id_fn)?;
    output::print_output(&out, global.quiet);
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!(
            "{}",
            output::page_footer(
                &paginator.range_label(),
                paginator.model().page + 1,
                paginator.page_count(),
                paginator.is_open_ended()
            )
        );
    }
    Ok(())
}

/// "yes" / "no".
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Optional text for detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
