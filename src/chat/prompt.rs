use chrono::NaiveDate;

/// Fixed user-facing sentences. Translating them is the caller's business;
/// the defaults are English.
#[derive(Debug, Clone)]
pub struct Notices {
    pub greeting: String,
    pub unavailable: String,
    pub unreachable: String,
    pub failure_prefix: String,
    pub too_many_calls: String,
    pub empty_reply: String,
}

impl Default for Notices {
    fn default() -> Self {
        Self {
            greeting: "Hi! I can create, look up, update, delete and list your invoices. \
                       What would you like to do?"
                .to_string(),
            unavailable: "The assistant service is unavailable right now. \
                          Please contact the administrator."
                .to_string(),
            unreachable: "I could not reach the assistant service yet. \
                          Your next message will try again."
                .to_string(),
            failure_prefix: "Sorry, something went wrong:".to_string(),
            too_many_calls: "the assistant kept requesting operations without finishing, \
                             so the request was stopped"
                .to_string(),
            empty_reply: "Done.".to_string(),
        }
    }
}

pub fn system_instruction(today: NaiveDate, language: &str) -> String {
    format!(
        "You are an assistant that manages the user's invoices through the provided \
functions: create, read, update, delete and list.\n\
Today's date is {today}. Interpret relative dates (\"next Friday\", \"in 30 days\") \
against it and always pass dates to functions as YYYY-MM-DD.\n\
Rules:\n\
- Before calling delete, describe the invoice and ask the user to confirm explicitly; \
only call delete after they confirm.\n\
- When the user refers to an invoice ambiguously (by client name, for example), use list \
or read first to find the right id instead of guessing.\n\
- Ask for any missing required information (client name, amount, due date) instead of \
inventing it.\n\
- If a function returns an error, explain it plainly and suggest what to do next.\n\
- Present amounts with two decimals and keep answers short.\n\
Always answer in {language}.",
        today = today.format("%Y-%m-%d"),
        language = language,
    )
}
