// Terminal rendition of the quiz and the chat view, used by `garden-quiz quiz`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::answers::FieldUpdate;
use crate::chat::ChatSession;
use crate::constants::PAGE_TITLE;
use crate::llm_interaction::OllamaClient;
use crate::prompt::Prompt;
use crate::questions::{InputKind, QUESTIONS};
use crate::quiz_form::QuizForm;

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    // EOF reads as a blank answer
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Parses "1, 3" into zero-based option indexes. Blank means no selection.
fn parse_choices(line: &str, count: usize, single: bool) -> Result<Vec<usize>, String> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let mut picks = Vec::new();
    for part in line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => {
                if !picks.contains(&(n - 1)) {
                    picks.push(n - 1);
                }
            }
            _ => return Err(format!("Please enter numbers between 1 and {}.", count)),
        }
    }
    if single && picks.len() > 1 {
        return Err("Please pick just one option.".to_string());
    }
    Ok(picks)
}

/// Asks the seven questions and returns the prompt built from the answers.
pub fn run_quiz<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Prompt> {
    let mut result = None;
    let mut form = QuizForm::new(|prompt| result = Some(prompt));

    writeln!(out, "{}", PAGE_TITLE)?;
    writeln!(out, "Press Enter to skip a question.")?;

    for question in QUESTIONS.iter() {
        writeln!(out)?;
        writeln!(out, "{}. {}", question.number, question.heading)?;
        match question.kind {
            InputKind::Text | InputKind::Number => {
                for entry in question.entries {
                    let answer = ask(input, out, &format!("   {}: ", entry.placeholder))?;
                    form.update(FieldUpdate::from_input(entry.field.name(), answer, false)?);
                }
            }
            InputKind::Checkbox | InputKind::Radio => {
                let Some(field) = question.field else {
                    continue;
                };
                for (i, option) in question.options.iter().enumerate() {
                    writeln!(out, "   {}) {}", i + 1, option)?;
                }
                let single = question.kind == InputKind::Radio;
                let label = if single {
                    "   Choose one number: "
                } else {
                    "   Choose numbers, separated by commas: "
                };
                let picks = loop {
                    let line = ask(input, out, label)?;
                    match parse_choices(&line, question.options.len(), single) {
                        Ok(picks) => break picks,
                        Err(message) => writeln!(out, "   {}", message)?,
                    }
                };
                for index in picks {
                    form.update(FieldUpdate::from_input(
                        field.name(),
                        question.options[index],
                        true,
                    )?);
                }
            }
        }
    }

    form.submit();
    result.context("Quiz finished without producing a prompt")
}

/// Chats with the model on stdin/stdout, starting from the quiz prompt, until EOF or `exit`.
pub async fn run_chat(llm: &OllamaClient, initial_prompt: &Prompt) -> Result<()> {
    info!("Starting terminal chat...");
    let mut chat = ChatSession::new(initial_prompt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if chat.needs_reply() {
            println!("(thinking...)");
            let reply = llm
                .reply(chat.messages())
                .await
                .context("Chat request failed")?;
            println!("\nGardener: {}\n", chat.push_assistant(reply).content);
        }

        print!("You: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        chat.push_user(line);
    }
    println!();
    info!("Terminal chat finished.");
    Ok(())
}
