use crate::domain::model::StudentRecord;
use crate::domain::ports::ChoicePrompter;
use crate::utils::error::{MailerError, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Asks the operator on a terminal (or any reader/writer pair).
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            max_attempts: 3,
        }
    }

    /// How many blank answers to the sheet-number question are tolerated.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(MailerError::IoError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )));
        }
        Ok(line.trim().to_string())
    }

    /// The sheet number exactly as typed, trimmed.
    pub fn ask_sheet_number(&mut self) -> Result<String> {
        for _ in 0..self.max_attempts {
            write!(self.output, "Homework Sheet No.: ")?;
            self.output.flush()?;
            let answer = self.read_answer()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
        Err(MailerError::SelectionError {
            surname: "<sheet number>".to_string(),
            message: "no sheet number entered".to_string(),
        })
    }
}

impl<R: BufRead, W: Write> ChoicePrompter for ConsolePrompter<R, W> {
    fn resolve_ambiguity(
        &mut self,
        surname: &str,
        candidates: &[&StudentRecord],
    ) -> Result<Option<usize>> {
        writeln!(
            self.output,
            "There are {} students named {}:",
            candidates.len(),
            surname
        )?;
        for (idx, candidate) in candidates.iter().enumerate() {
            writeln!(self.output, "  [{}] {}", idx, candidate.first_name)?;
        }
        write!(self.output, "Which one do you mean? ")?;
        self.output.flush()?;

        let answer = self.read_answer()?;
        match answer.parse::<usize>() {
            Ok(choice) => {
                if choice >= candidates.len() {
                    writeln!(self.output, "{} is not one of the listed numbers.", choice)?;
                }
                Ok(Some(choice))
            }
            Err(_) => {
                writeln!(self.output, "'{}' is not a number.", answer)?;
                Ok(None)
            }
        }
    }
}

/// Answers disambiguation questions from a fixed list, in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChooser {
    answers: VecDeque<Option<usize>>,
    asked: usize,
}

impl ScriptedChooser {
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self::from_answers(choices.into_iter().map(Some))
    }

    /// `None` stands for an answer that was not a number.
    pub fn from_answers(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: 0,
        }
    }

    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl ChoicePrompter for ScriptedChooser {
    fn resolve_ambiguity(
        &mut self,
        surname: &str,
        _candidates: &[&StudentRecord],
    ) -> Result<Option<usize>> {
        self.asked += 1;
        self.answers
            .pop_front()
            .ok_or_else(|| MailerError::SelectionError {
                surname: surname.to_string(),
                message: "no scripted choice left".to_string(),
            })
    }
}
