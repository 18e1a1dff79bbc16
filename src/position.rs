use std::rc::Rc;

/// A location in the source text. Positions mutate while the lexer scans, so
/// every token, node, and error captures its own clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub source_name: Rc<str>,
}

impl Position {
    pub fn start(source_name: &str) -> Self {
        Self {
            offset: 0,
            line: 0,
            column: 0,
            source_name: Rc::from(source_name),
        }
    }

    /// Moves past one character. A newline bumps the line counter and resets
    /// the column; `current` is the character being left behind.
    pub fn advance(&mut self, current: Option<char>) {
        self.offset += 1;
        self.column += 1;

        if current == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A one-character span beginning at `start`.
    pub fn single(start: Position) -> Self {
        let mut end = start.clone();
        end.advance(None);
        Self { start, end }
    }

    /// Character range, for diagnostics that label the source.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}
