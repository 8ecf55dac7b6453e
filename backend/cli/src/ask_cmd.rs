//! `mathmentor ask`: run one tutor action from the command line.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use mathmentor_core::{ActionKind, ApiKey};
use mathmentor_session::{ActionInputs, ActionOutcome, Session, SessionView, Tutor};

use crate::terminal_output::{note_error, note_success, note_warn, print_section};

pub struct AskArgs {
    pub action: ActionKind,
    pub problem: Option<String>,
    pub image: Option<PathBuf>,
    pub answer: Option<String>,
    pub message: Option<String>,
}

pub async fn run(tutor: &Tutor, api_key: Option<String>, args: AskArgs) -> Result<()> {
    let Some(raw_key) = api_key else {
        bail!("an API key is required: pass --api-key or set GROQ_API_KEY");
    };
    let mut session = Session::with_credential(ApiKey::new(raw_key)?);

    if let Some(path) = &args.image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image {}", path.display()))?;
        let filename = path.file_name().and_then(|n| n.to_str());
        let outcome = tutor.upload_image(&mut session, filename, &bytes).await?;
        if outcome.is_success() {
            note_success(&outcome.notice());
        } else {
            note_warn(&outcome.notice());
        }
    }

    let inputs = ActionInputs {
        problem: args.problem.unwrap_or_default(),
        answer: args.answer.unwrap_or_default(),
        message: args.message.unwrap_or_default(),
    };

    match tutor.dispatch(&mut session, args.action, &inputs).await? {
        ActionOutcome::Completed(_) => {
            let view = SessionView::render(&session);
            for (title, body) in view.sections() {
                print_section(title, body);
            }
            Ok(())
        }
        ActionOutcome::Skipped(requirement) => {
            bail!("{} cannot run: {}", args.action.label(), requirement.describe())
        }
        ActionOutcome::Failed(error) => {
            note_error(&error.display_text());
            Err(error.into())
        }
    }
}
