use crate::chat::{ActivityObserver, Message, MessageKind};
use crate::operations::OperationResult;
use crate::providers::gemini::types::FunctionCall;
use crate::store::Invoice;
use console::{Alignment, measure_text_width, pad_str, style, truncate_str};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// How much operation activity is printed while the assistant works.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Operation name, arguments and result.
    Verbose,
    /// Operation name only.
    #[default]
    Minimal,
    Hidden,
}

impl DisplayMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" => Some(DisplayMode::Verbose),
            "minimal" => Some(DisplayMode::Minimal),
            "hidden" => Some(DisplayMode::Hidden),
            _ => None,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            DisplayMode::Verbose => 0,
            DisplayMode::Minimal => 1,
            DisplayMode::Hidden => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => DisplayMode::Verbose,
            2 => DisplayMode::Hidden,
            _ => DisplayMode::Minimal,
        }
    }
}

static DISPLAY_MODE: AtomicU8 = AtomicU8::new(1);

pub fn set_display_mode(mode: DisplayMode) {
    DISPLAY_MODE.store(mode.to_u8(), Ordering::Relaxed);
}

pub fn display_mode() -> DisplayMode {
    DisplayMode::from_u8(DISPLAY_MODE.load(Ordering::Relaxed))
}

pub fn display_mode_help() {
    println!("{}", style("Display modes").bold().underlined());
    println!(
        "  {}  operation name, arguments and result",
        style("verbose").cyan()
    );
    println!("  {}  operation name only (default)", style("minimal").cyan());
    println!("  {}   no operation activity", style("hidden").cyan());
    println!("\nCurrent mode: {:?}", display_mode());
}

/// Render assistant text. Replies are markdown more often than not.
pub fn display_markdown(text: &str) {
    let skin = termimad::MadSkin::default();
    skin.print_text(text);
}

/// Print one session message according to its kind.
pub fn display_message(message: &Message) {
    match message.kind {
        MessageKind::Conversation | MessageKind::Greeting => {
            println!();
            display_markdown(&message.text);
        }
        MessageKind::Notice => {
            println!("\n{} {}", style("!").bold().yellow(), style(&message.text).yellow());
        }
        MessageKind::Failure => {
            println!("\n{} {}", style("✗").bold().red(), style(&message.text).red());
        }
    }
}

pub fn display_info(text: &str) {
    println!("{}", style(text).dim());
}

pub fn display_error(text: &str) {
    eprintln!("{} {}", style("error:").bold().red(), text);
}

/// Lines describing an operation as it starts, per mode.
pub fn format_call(mode: DisplayMode, call: &FunctionCall) -> Option<String> {
    match mode {
        DisplayMode::Hidden => None,
        DisplayMode::Minimal => Some(format!(
            "{} {}",
            style("⚙").cyan(),
            style(&call.name).bold()
        )),
        DisplayMode::Verbose => {
            let args = serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string());
            Some(format!(
                "{} {} {}",
                style("⚙").cyan(),
                style(&call.name).bold(),
                style(args).dim()
            ))
        }
    }
}

/// Result line for an operation. Only verbose mode shows results.
pub fn format_result(mode: DisplayMode, result: &OperationResult) -> Option<String> {
    if mode != DisplayMode::Verbose {
        return None;
    }
    Some(match result {
        OperationResult::Success(value) => {
            let text = serde_json::to_string(value).unwrap_or_default();
            format!("  {} {}", style("→").green(), truncate_str(&text, 160, "…"))
        }
        OperationResult::Failure(message) => {
            format!("  {} {}", style("→").red(), style(message).red())
        }
    })
}

/// Prints operation activity as the orchestrator dispatches calls.
#[derive(Debug, Default)]
pub struct TerminalObserver;

impl ActivityObserver for TerminalObserver {
    fn on_call(&self, call: &FunctionCall) {
        if let Some(line) = format_call(display_mode(), call) {
            println!("{}", line);
        }
    }

    fn on_result(&self, _call: &FunctionCall, result: &OperationResult) {
        if let Some(line) = format_result(display_mode(), result) {
            println!("{}", line);
        }
    }
}

const HEADERS: [&str; 6] = ["ID", "Client", "Amount", "Issued", "Due", "Status"];

/// Longer client names are cut; every other column fits its widest cell.
const CLIENT_WIDTH: usize = 24;

/// Plain-text table of invoices; no styling so it can be piped.
pub fn invoice_table(invoices: &[Invoice]) -> String {
    if invoices.is_empty() {
        return "No invoices stored.".to_string();
    }

    let rows: Vec<[String; 6]> = invoices
        .iter()
        .map(|invoice| {
            [
                invoice.id.clone(),
                truncate_str(&invoice.client_name, CLIENT_WIDTH, "…").into_owned(),
                format!("${:.2}", invoice.amount),
                invoice.issue_date.to_string(),
                invoice.due_date.to_string(),
                invoice.status.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(measure_text_width);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let align = if cell.starts_with('$') {
                    Alignment::Right
                } else {
                    Alignment::Left
                };
                pad_str(cell, width, align, None).into_owned()
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(HEADERS.map(String::from).as_slice())];
    lines.push("─".repeat(widths.iter().sum::<usize>() + 2 * (HEADERS.len() - 1)));
    lines.extend(rows.iter().map(|cells| render(cells.as_slice())));
    lines.join("\n")
}
