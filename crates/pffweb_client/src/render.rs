use pffweb_core::{LoadMore, Message, SearchViewModel};

/// Text for one render pass, plus the load-more affordance that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResults {
    pub lines: Vec<String>,
    pub load_more: Option<LoadMore>,
}

pub fn render(view: &SearchViewModel) -> RenderedResults {
    let mut lines = Vec::new();

    match view.term.as_deref() {
        None => lines.push("Type to search.".to_string()),
        Some(term) if view.loading && view.messages.is_empty() => {
            lines.push(format!("Searching for \"{}\"...", term.trim()));
        }
        Some(term) => {
            lines.push(format!(
                "{} of {} matches for \"{}\"",
                view.messages.len(),
                view.total_matches,
                term.trim()
            ));
        }
    }

    for (index, message) in view.messages.iter().enumerate() {
        lines.push(message_line(index + 1, message));
    }

    if let Some(load_more) = view.load_more {
        lines.push(format!("-- {} more (:more) --", load_more.remaining));
    } else if view.loading && !view.messages.is_empty() {
        lines.push("-- loading more --".to_string());
    }

    if let Some(error) = &view.error {
        if error.can_retry {
            lines.push(format!("Error: {} (:retry to try again)", error.message));
        } else {
            lines.push(format!("Error: {}", error.message));
        }
    }

    if let Some(opened) = &view.opened {
        lines.push(format!("--- message {} ---", opened.id));
        match &opened.body {
            None => lines.push("Loading message...".to_string()),
            Some(Ok(body)) => lines.extend(body.value.lines().map(ToOwned::to_owned)),
            Some(Err(failure)) => lines.push(format!("Could not open message: {failure}")),
        }
    }

    RenderedResults {
        lines,
        load_more: view.load_more,
    }
}

fn message_line(number: usize, message: &Message) -> String {
    let subject = message.subject().unwrap_or("(no subject)");
    let mut line = format!("{number:>3}. {subject}");
    if let Some(sender) = message.sender() {
        line.push_str(" | ");
        line.push_str(sender);
    }
    if let Some(sent) = message.send_time() {
        line.push_str(" | ");
        line.push_str(sent);
    }
    line
}
