use super::error::{SyntaxError, SyntaxErrorKind};

/// A cursor over one command line. Positions are byte offsets into the line.
#[derive(Debug, Clone)]
pub struct StringReader<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> StringReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.input.len());
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    pub fn can_read(&self) -> bool {
        self.cursor < self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.skip();
        }
    }

    /// The next whitespace-delimited token, without moving the cursor.
    pub fn peek_token(&self) -> &'a str {
        let rest = self.remaining();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        &rest[..end]
    }

    pub fn read_token(&mut self) -> &'a str {
        let token = self.peek_token();
        self.cursor += token.len();
        token
    }

    pub fn read_remaining(&mut self) -> &'a str {
        let rest = self.remaining();
        self.cursor = self.input.len();
        rest
    }

    pub fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.input, self.cursor)
    }

    fn error_at(&self, kind: SyntaxErrorKind, cursor: usize) -> SyntaxError {
        SyntaxError::new(kind, self.input, cursor)
    }

    pub fn read_quoted_string(&mut self) -> Result<String, SyntaxError> {
        let start = self.cursor;
        let quote = match self.peek() {
            Some(c @ ('"' | '\'')) => c,
            _ => return Err(self.error(SyntaxErrorKind::ExpectedStartOfQuote)),
        };
        self.skip();

        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.skip();
            if escaped {
                if c == quote || c == '\\' {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(self.error(SyntaxErrorKind::InvalidEscape(c)));
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Ok(result);
            } else {
                result.push(c);
            }
        }

        Err(self.error_at(SyntaxErrorKind::ExpectedEndOfQuote, start))
    }

    /// A quoted string if the next character opens a quote, a single token otherwise.
    pub fn read_string(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            Some('"' | '\'') => self.read_quoted_string(),
            Some(_) => Ok(self.read_token().to_string()),
            None => Err(self.error(SyntaxErrorKind::ExpectedWord)),
        }
    }

    pub fn read_int(&mut self) -> Result<i32, SyntaxError> {
        let start = self.cursor;
        let token = self.read_token();
        if token.is_empty() {
            return Err(self.error(SyntaxErrorKind::ExpectedInt));
        }
        token
            .parse::<i32>()
            .map_err(|_| self.error_at(SyntaxErrorKind::InvalidInt(token.to_string()), start))
    }

    pub fn read_float(&mut self) -> Result<f32, SyntaxError> {
        let start = self.cursor;
        let token = self.read_token();
        if token.is_empty() {
            return Err(self.error(SyntaxErrorKind::ExpectedFloat));
        }
        token
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.error_at(SyntaxErrorKind::InvalidFloat(token.to_string()), start))
    }

    pub fn read_double(&mut self) -> Result<f64, SyntaxError> {
        let start = self.cursor;
        let token = self.read_token();
        if token.is_empty() {
            return Err(self.error(SyntaxErrorKind::ExpectedDouble));
        }
        token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.error_at(SyntaxErrorKind::InvalidDouble(token.to_string()), start))
    }

    pub fn read_boolean(&mut self) -> Result<bool, SyntaxError> {
        let start = self.cursor;
        let token = self.read_token();
        match token.to_lowercase().as_str() {
            "" => Err(self.error(SyntaxErrorKind::ExpectedBool)),
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(self.error_at(SyntaxErrorKind::InvalidBool(token.to_string()), start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_stop_at_whitespace() {
        let mut reader = StringReader::new("tp Steve 10");
        assert_eq!(reader.read_token(), "tp");
        assert_eq!(reader.cursor(), 2);
        reader.skip();
        assert_eq!(reader.peek_token(), "Steve");
        assert_eq!(reader.read_token(), "Steve");
        reader.skip_whitespace();
        assert_eq!(reader.read_remaining(), "10");
        assert!(!reader.can_read());
    }

    #[test]
    fn invalid_number_reports_token_start() {
        let mut reader = StringReader::new("abc");
        let err = reader.read_int().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidInt("abc".to_string()));
        assert_eq!(err.cursor(), 0);

        let mut reader = StringReader::new("");
        assert_eq!(
            reader.read_double().unwrap_err().kind,
            SyntaxErrorKind::ExpectedDouble
        );
    }

    #[test]
    fn quoted_strings_handle_escapes() {
        let mut reader = StringReader::new(r#""hello \"world\"" rest"#);
        assert_eq!(reader.read_string().unwrap(), r#"hello "world""#);
        assert_eq!(reader.remaining(), " rest");

        let mut reader = StringReader::new("'unterminated");
        let err = reader.read_quoted_string().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectedEndOfQuote);
        assert_eq!(err.cursor(), 0);

        let mut reader = StringReader::new(r#""bad \n""#);
        assert_eq!(
            reader.read_quoted_string().unwrap_err().kind,
            SyntaxErrorKind::InvalidEscape('n')
        );
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert!(StringReader::new("on").read_boolean().unwrap());
        assert!(!StringReader::new("FALSE").read_boolean().unwrap());
        assert_eq!(
            StringReader::new("maybe").read_boolean().unwrap_err().kind,
            SyntaxErrorKind::InvalidBool("maybe".to_string())
        );
    }
}
