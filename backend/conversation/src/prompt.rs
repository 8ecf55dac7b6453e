//! Prompt templates for the four tutor actions.
//!
//! Rendering is a pure function of its input. Problem and answer text are
//! inserted verbatim; judging whether they are sensible math is left to the
//! model.

use mathmentor_core::ActionKind;

/// The fields one action contributes to its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptInput<'a> {
    Solve { problem: &'a str },
    Hint { problem: &'a str },
    Check { problem: &'a str, answer: &'a str },
    Chat { message: &'a str },
}

/// A rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Full text sent to the model as the newest user turn.
    pub text: String,
    /// Short line recorded in the session history in place of `text`.
    pub transcript: String,
}

impl<'a> PromptInput<'a> {
    pub fn kind(&self) -> ActionKind {
        match self {
            PromptInput::Solve { .. } => ActionKind::Solve,
            PromptInput::Hint { .. } => ActionKind::Hint,
            PromptInput::Check { .. } => ActionKind::Check,
            PromptInput::Chat { .. } => ActionKind::Chat,
        }
    }

    pub fn render(&self) -> Prompt {
        match *self {
            PromptInput::Solve { problem } => Prompt {
                text: solve_template(problem),
                transcript: format!("Problem: {problem}"),
            },
            PromptInput::Hint { problem } => Prompt {
                text: hint_template(problem),
                transcript: format!("Hint request: {problem}"),
            },
            PromptInput::Check { problem, answer } => Prompt {
                text: check_template(problem, answer),
                transcript: format!("Question: {problem}\nMy answer: {answer}"),
            },
            PromptInput::Chat { message } => Prompt {
                text: message.to_string(),
                transcript: message.to_string(),
            },
        }
    }
}

fn solve_template(problem: &str) -> String {
    format!(
        "You are a **math expert tutor** helping a student. The student has asked for a \
**step-by-step solution** to the following math problem:

**Problem:** {problem}

**Instructions:**
- **Break down the solution into clear logical steps.**
- **Explain every mathematical operation.**
- If relevant, **mention multiple methods** to solve the problem.
- Make the explanation **interactive** by suggesting what the student should think about at each step.

Provide an **expert-level detailed solution** with explanations a student can easily understand."
    )
}

fn hint_template(problem: &str) -> String {
    format!(
        "You are a **friendly and engaging math tutor**. A student is working on the following problem:

**Problem:** {problem}

**Instructions:**
- **Do NOT provide the full solution.**
- Instead, **give a logical hint** that guides the student towards solving it.
- If applicable, **suggest a formula or concept they should use.**
- Ask **leading questions** to help them think critically.
- Keep the response **encouraging and motivational**.

Provide a useful **hint without revealing the answer**."
    )
}

fn check_template(problem: &str, answer: &str) -> String {
    format!(
        "You are an **interactive math tutor** helping a student. They attempted to solve this problem:

**Question:** {problem}
**Student's Answer:** {answer}

**Instructions:**
- First, **check whether the student's answer is correct**.
- If the answer is **correct**, praise them and reinforce their understanding.
- If the answer is **wrong**, do NOT just say \"wrong.\" Instead:
  - **Find the mistake.**
  - **Explain why it is incorrect.**
  - Guide the student towards the **correct answer** without giving it away.
- If the answer is **partially correct**, acknowledge the correct part and guide them to fix the mistake.
- Ask whether the student wants to **retry or see the full solution**.

Provide **constructive, engaging, and logical feedback**."
    )
}
