//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Lines are read as a single local user:
//! `/cmd` is a command, `#code` presses an option,
//! `!photo <file_id> <unique_id>` uploads a photo, anything else is text.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;
use crate::form::{FormEvent, PhotoSize, Reply};

/// User id every CLI line is attributed to.
pub const CLI_USER_ID: &str = "local-user";

/// A simple CLI channel that reads from stdin and writes to stdout.
pub struct CliChannel {
    language: Option<String>,
}

impl CliChannel {
    pub fn new(language: Option<String>) -> Self {
        Self { language }
    }
}

/// Decode one input line into a form event.
fn parse_line(line: &str) -> FormEvent {
    if let Some(code) = line.strip_prefix('#') {
        return FormEvent::choice(code.trim());
    }
    if let Some(rest) = line.strip_prefix("!photo") {
        let mut parts = rest.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(file_id), unique_id) => FormEvent::Photo {
                sizes: vec![PhotoSize {
                    file_id: file_id.to_string(),
                    file_unique_id: unique_id.unwrap_or(file_id).to_string(),
                    width: 1,
                    height: 1,
                }],
            },
            (None, _) => FormEvent::Photo { sizes: Vec::new() },
        };
    }
    FormEvent::from_text(line)
}

/// Render a reply for the terminal, listing options as `#code` hints.
fn render(reply: &Reply) -> String {
    match reply {
        Reply::Text { text, choices } => {
            let mut out = text.clone();
            for row in choices {
                let options: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{} → #{}]", b.label, b.code))
                    .collect();
                out.push('\n');
                out.push_str(&options.join("  "));
            }
            out
        }
        Reply::Photo { file_id, caption } => format!("[photo {file_id}]\n{caption}"),
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let language = self.language.clone();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            // Print prompt
            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let mut msg = IncomingMessage::new("cli", CLI_USER_ID, parse_line(line));
                        if let Some(ref code) = language {
                            msg = msg.with_language(code.clone());
                        }
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(&self, _msg: &IncomingMessage, reply: Reply) -> Result<(), ChannelError> {
        println!("\n{}\n", render(&reply));
        eprint!("> ");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ChoiceButton, Command};

    #[test]
    fn parse_line_kinds() {
        assert_eq!(
            parse_line("/cancel"),
            FormEvent::Command {
                command: Command::Cancel
            }
        );
        assert_eq!(parse_line("#higher"), FormEvent::choice("higher"));
        assert_eq!(parse_line("Alice"), FormEvent::from_text("Alice"));
    }

    #[test]
    fn parse_photo_line() {
        match parse_line("!photo p1 u1") {
            FormEvent::Photo { sizes } => {
                assert_eq!(sizes.len(), 1);
                assert_eq!(sizes[0].file_id, "p1");
                assert_eq!(sizes[0].file_unique_id, "u1");
            }
            other => panic!("expected photo, got {other:?}"),
        }

        // Unique id defaults to the file id.
        match parse_line("!photo p2") {
            FormEvent::Photo { sizes } => assert_eq!(sizes[0].file_unique_id, "p2"),
            other => panic!("expected photo, got {other:?}"),
        }

        assert_eq!(parse_line("!photo"), FormEvent::Photo { sizes: Vec::new() });
    }

    #[test]
    fn render_lists_options() {
        let reply = Reply::with_choices(
            "Pick one",
            vec![vec![ChoiceButton::new("Yes", "yes_news"), ChoiceButton::new("No", "no_news")]],
        );
        assert_eq!(
            render(&reply),
            "Pick one\n[Yes → #yes_news]  [No → #no_news]"
        );

        let photo = Reply::Photo {
            file_id: "p1".into(),
            caption: "Name: Alice".into(),
        };
        assert_eq!(render(&photo), "[photo p1]\nName: Alice");
    }
}
