//! Interactive terminal session.
//!
//! Reads commands line by line while insight requests are in flight. Each
//! request runs as a future in a `FuturesUnordered`; when one completes its
//! outcome goes back through the controller, which drops it if a newer
//! request was started in the meantime.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::ai::{AiInsight, CompletionBackend, InsightClient, InsightResult, WordProblemAnswer};
use crate::calculator::is_keypad_input;
use crate::ui::controller::{Controller, Ticket, WordProblemRequest};
use crate::ui::render::{render_history, render_insight, render_result, render_status};

pub const HELP: &str = "\
Type an expression (digits, . + - * / % and parentheses) to calculate it.
A line starting with an operator continues from the last result.

  :explain [n]     explain history entry n (1 = newest)
  :solve <text>    answer a word problem (shortcut: ? <text>)
  :history         list past calculations
  :clear           clear the insight panel and drop pending requests
  :help            show this help
  :quit            exit
";

/// A parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Keys(String),
    Explain(usize),
    Solve(String),
    History,
    Clear,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(problem) = line.strip_prefix('?') {
            return Some(Self::Solve(problem.trim().to_string()));
        }

        let Some(command) = line.strip_prefix(':') else {
            return Some(Self::Keys(line.to_string()));
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));

        let parsed = match name {
            "explain" | "e" if rest.is_empty() => Self::Explain(1),
            "explain" | "e" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Explain(n),
                _ => Self::Invalid(format!("not a history position: {}", rest)),
            },
            "solve" | "s" => Self::Solve(rest.to_string()),
            "history" | "h" => Self::History,
            "clear" | "c" => Self::Clear,
            "help" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command :{}", other)),
        };
        Some(parsed)
    }
}

/// A finished insight request.
pub enum Completion {
    Explanation {
        ticket: Ticket,
        outcome: InsightResult<AiInsight>,
    },
    WordProblem {
        request: WordProblemRequest,
        outcome: InsightResult<WordProblemAnswer>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a, B, W> {
    controller: Controller,
    client: &'a InsightClient<B>,
    out: W,
    history_path: Option<PathBuf>,
    pending: FuturesUnordered<LocalBoxFuture<'a, Completion>>,
}

impl<'a, B: CompletionBackend, W: Write> Session<'a, B, W> {
    pub fn new(controller: Controller, client: &'a InsightClient<B>, out: W) -> Self {
        Self {
            controller,
            client,
            out,
            history_path: None,
            pending: FuturesUnordered::new(),
        }
    }

    /// Save the history to `path` after every change.
    pub fn persist_to(mut self, path: PathBuf) -> Self {
        self.history_path = Some(path);
        self
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run until stdin closes or `:quit`.
    pub async fn run(&mut self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Read commands from `input` until it ends or `:quit`. Requests still
    /// in flight at end of input are awaited; `:quit` drops them.
    pub async fn run_with<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        enum Event {
            Line(Option<String>),
            Done(Completion),
        }

        loop {
            let event = tokio::select! {
                line = lines.next_line() => Event::Line(line?),
                Some(done) = self.pending.next(), if !self.pending.is_empty() => Event::Done(done),
            };

            match event {
                Event::Line(None) => {
                    self.drain().await?;
                    break;
                }
                Event::Line(Some(line)) => {
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                Event::Done(done) => self.apply(done)?,
            }
        }

        if !self.pending.is_empty() {
            info!(count = self.pending.len(), "Dropping unfinished insight requests");
        }
        Ok(())
    }

    /// Wait for every in-flight request and apply the results.
    pub async fn drain(&mut self) -> Result<()> {
        while let Some(done) = self.pending.next().await {
            self.apply(done)?;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = Command::parse(line) else {
            return Ok(Flow::Continue);
        };

        match command {
            Command::Keys(text) => self.calculate(&text)?,
            Command::Explain(position) => self.explain(position)?,
            Command::Solve(problem) => self.solve(&problem)?,
            Command::History => write!(self.out, "{}", render_history(self.controller.history()))?,
            Command::Clear => {
                self.controller.reset();
                writeln!(self.out, "Cleared.")?;
            }
            Command::Help => write!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Invalid(message) => writeln!(self.out, "{}", message)?,
        }
        Ok(Flow::Continue)
    }

    fn calculate(&mut self, text: &str) -> Result<()> {
        let before = self.latest_id();
        if let Err(err) = self.controller.enter(text) {
            writeln!(self.out, "{}", err)?;
            if !is_keypad_input(text) && text.chars().any(char::is_alphabetic) {
                writeln!(self.out, "Use ? <question> to ask a word problem.")?;
            }
            return Ok(());
        }

        // A line ending in `C` leaves the keypad cleared.
        if text.trim_end().ends_with(['c', 'C']) {
            writeln!(self.out, "{}", self.controller.display())?;
        } else {
            match self.controller.calculate() {
                Ok(Some(calc)) => {
                    let line = render_result(calc);
                    writeln!(self.out, "{}", line)?;
                }
                Ok(None) => writeln!(self.out, "= {}", self.controller.display())?,
                Err(err) => writeln!(self.out, "{} ({})", self.controller.display(), err)?,
            }
        }

        // `=` inside the line records calculations before `calculate` runs.
        if self.latest_id() != before {
            self.save_history();
        }
        Ok(())
    }

    fn latest_id(&self) -> Option<String> {
        self.controller.history().latest().map(|calc| calc.id.clone())
    }

    fn explain(&mut self, position: usize) -> Result<()> {
        let id = match self.controller.history().nth(position - 1) {
            Some(calc) => calc.id.clone(),
            None => {
                writeln!(self.out, "No calculation at position {}.", position)?;
                return Ok(());
            }
        };

        let Some(request) = self.controller.begin_explanation(&id) else {
            return Ok(());
        };

        let client = self.client;
        self.pending.push(
            async move {
                let outcome = client.explain(&request.expression, &request.result).await;
                Completion::Explanation {
                    ticket: request.ticket,
                    outcome,
                }
            }
            .boxed_local(),
        );
        self.write_status()
    }

    fn solve(&mut self, problem: &str) -> Result<()> {
        let Some(request) = self.controller.begin_word_problem(problem) else {
            writeln!(self.out, "Type a word problem after :solve.")?;
            return Ok(());
        };

        let client = self.client;
        self.pending.push(
            async move {
                let outcome = client.solve_word_problem(&request.problem).await;
                Completion::WordProblem { request, outcome }
            }
            .boxed_local(),
        );
        self.write_status()
    }

    /// Hand a finished request to the controller and show the result.
    pub fn apply(&mut self, done: Completion) -> Result<()> {
        let (applied, answered) = match done {
            Completion::Explanation { ticket, outcome } => {
                (self.controller.finish_explanation(ticket, outcome), false)
            }
            Completion::WordProblem { request, outcome } => {
                let answered = outcome.is_ok();
                (
                    self.controller.finish_word_problem(request, outcome),
                    answered,
                )
            }
        };

        if !applied {
            return Ok(());
        }

        if answered && let Some(calc) = self.controller.history().latest() {
            let line = render_result(calc);
            writeln!(self.out, "{}", line)?;
            self.save_history();
        }

        if let Some(insight) = self.controller.active_insight() {
            let text = render_insight(insight);
            write!(self.out, "{}", text)?;
        }
        self.write_status()
    }

    fn write_status(&mut self) -> Result<()> {
        if let Some(status) = render_status(&self.controller) {
            writeln!(self.out, "{}", status)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn save_history(&self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(e) = self.controller.history().save(path) {
            warn!(error = %e, path = %path.display(), "Failed to save history");
        }
    }
}
