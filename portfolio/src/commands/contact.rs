use anyhow::Context;
use portfolio_client::{
    submission::{HttpSubmissionClient, SubmissionClient},
    wizard::{Advance, ContactWizard, Step, SubmissionResult, WizardField},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

const HELP: &str = "Commands: :back, :step <1-3>, :reset, :quit";

/// Fill in and submit the contact form interactively.
pub async fn contact(endpoint: Url) -> anyhow::Result<()> {
    let client = HttpSubmissionClient::new(endpoint)?;
    let mut wizard = ContactWizard::new();
    wizard.start();

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{}", prompt(&wizard));
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            return Ok(());
        };

        match line.trim() {
            ":quit" => return Ok(()),
            ":back" => {
                wizard.retreat();
            }
            ":reset" => {
                wizard.reset();
                wizard.start();
            }
            command if command.starts_with(":step") => {
                let step = command[":step".len()..]
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(|x| Step::try_from(x).ok());
                match step {
                    Some(step) if wizard.jump_to_step(step) => {}
                    Some(_) => println!("Complete the previous steps first."),
                    None => println!("{HELP}"),
                }
            }
            input => {
                fill_current_step(&mut wizard, input);

                if let Advance::Submit(request) = wizard.advance() {
                    println!("Sending...");
                    let outcome = client.send(&request).await;
                    wizard.complete(outcome);

                    match wizard.result() {
                        Some(SubmissionResult::Success) => {
                            println!("Thank you! Your message has been sent.");
                            return Ok(());
                        }
                        Some(SubmissionResult::Failure(message)) => println!("{message}"),
                        None => {}
                    }
                }
            }
        }

        for (field, error) in wizard.errors() {
            if *field != WizardField::Submit {
                println!("{error}");
            }
        }
    }
}

/// Store `input` in the field of the current step. An empty line keeps the
/// value entered before.
fn fill_current_step(wizard: &mut ContactWizard, input: &str) {
    if input.is_empty() {
        return;
    }

    match wizard.current_step() {
        Step::Name => wizard.set_name(input),
        Step::Email => wizard.set_email(input),
        Step::Message => wizard.set_message(input),
    }
}

fn prompt(wizard: &ContactWizard) -> String {
    let (label, value) = match wizard.current_step() {
        Step::Name => ("What's your name?", &wizard.form().name),
        Step::Email => ("What's your email address?", &wizard.form().email),
        Step::Message => ("What would you like to say?", &wizard.form().message),
    };

    let step = wizard.current_step().number();
    if wizard.can_proceed() {
        format!("[{step}/3] {label} ({value}, press Enter to keep)")
    } else if value.is_empty() {
        format!("[{step}/3] {label}")
    } else {
        format!("[{step}/3] {label} ({value})")
    }
}
