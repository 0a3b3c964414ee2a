//! Markdown import for bulk card creation.
//!
//! # Format
//! ```markdown
//! Q: What is Rust?
//! A: A systems programming language.
//!
//! Q: Explain borrowing
//! A: Borrowing allows references without ownership.
//! Multiple lines are supported.
//! ```
//!
//! Inline math such as `$e^{i\pi}$` is kept verbatim.

use crate::error::ParseError;
use crate::types::RawCard;

/// Parse markdown content into raw cards.
pub fn parse(content: &str) -> Result<Vec<RawCard>, ParseError> {
    let mut parser = Parser::default();
    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1)?;
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
}

#[derive(Default)]
struct Pending {
    question: Option<String>,
    answer: Option<String>,
    start_line: usize,
}

impl Pending {
    fn build(self) -> Result<RawCard, ParseError> {
        let question = self.question.ok_or(ParseError::MissingQuestion {
            line: self.start_line,
        })?;
        let answer = self.answer.ok_or(ParseError::MissingAnswer {
            line: self.start_line,
        })?;
        Ok(RawCard {
            question: question.trim().to_string(),
            answer: answer.trim().to_string(),
            line_number: self.start_line,
        })
    }
}

#[derive(Default)]
struct Parser {
    cards: Vec<RawCard>,
    current: Option<Pending>,
    field: Option<Field>,
    buffer: Vec<String>,
}

enum Line<'a> {
    Question(&'a str),
    Answer(&'a str),
    Text(&'a str),
    Empty,
}

impl Parser {
    fn classify(line: &str) -> Line<'_> {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("Q:") {
            Line::Question(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("A:") {
            Line::Answer(rest.trim())
        } else if trimmed.is_empty() {
            Line::Empty
        } else {
            Line::Text(line)
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), ParseError> {
        match Self::classify(line) {
            Line::Question(text) => {
                self.flush();
                if let Some(done) = self.current.take() {
                    self.cards.push(done.build()?);
                }
                self.current = Some(Pending {
                    start_line: line_num,
                    ..Default::default()
                });
                self.field = Some(Field::Question);
                self.buffer.push(text.to_string());
            }
            Line::Answer(text) => {
                self.flush();
                if self.current.is_none() {
                    return Err(ParseError::MissingQuestion { line: line_num });
                }
                self.field = Some(Field::Answer);
                self.buffer.push(text.to_string());
            }
            Line::Text(text) => self.buffer.push(text.to_string()),
            Line::Empty => self.buffer.push(String::new()),
        }
        Ok(())
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let content = self.buffer.join("\n");
        self.buffer.clear();

        if let Some(card) = self.current.as_mut() {
            match self.field {
                Some(Field::Question) => card.question = Some(content),
                Some(Field::Answer) => card.answer = Some(content),
                None => {}
            }
        }
    }

    fn finish(mut self) -> Result<Vec<RawCard>, ParseError> {
        self.flush();
        if let Some(card) = self.current.take() {
            self.cards.push(card.build()?);
        }
        Ok(self.cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_content_yields_no_cards() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("\n  \n").unwrap(), vec![]);
    }

    #[test]
    fn parses_multiple_cards() {
        let content = "Q: What is Rust?\nA: A language.\n\nQ: 2+2?\nA: 4\n";
        let cards = parse(content).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is Rust?");
        assert_eq!(cards[0].answer, "A language.");
        assert_eq!(cards[1].line_number, 4);
    }

    #[test]
    fn keeps_multiline_answers_and_math() {
        let content = "Q: Euler\nA: $e^{i\\pi} + 1 = 0$\nsecond line\n";
        let cards = parse(content).unwrap();
        assert_eq!(cards[0].answer, "$e^{i\\pi} + 1 = 0$\nsecond line");
    }

    #[test]
    fn text_before_first_question_is_ignored() {
        let cards = parse("# Heading\n\nQ: q\nA: a").unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "q");
    }

    #[test]
    fn question_without_answer_fails() {
        let err = parse("Q: one\nA: 1\n\nQ: two\n").unwrap_err();
        assert_eq!(err, ParseError::MissingAnswer { line: 4 });
    }

    #[test]
    fn answer_without_question_fails() {
        let err = parse("A: orphan\n").unwrap_err();
        assert_eq!(err, ParseError::MissingQuestion { line: 1 });
    }
}
