use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl<'a> Token<'a> {
    fn as_str(self) -> &'a str {
        match self {
            Token::Digits(value) | Token::Text(value) => value,
        }
    }
}

fn tokenize(value: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut digits: Option<bool> = None;
    for (idx, ch) in value.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match digits {
            Some(current) if current == is_digit => {}
            Some(current) => {
                tokens.push(token(&value[start..idx], current));
                start = idx;
                digits = Some(is_digit);
            }
            None => digits = Some(is_digit),
        }
    }
    if let Some(current) = digits {
        tokens.push(token(&value[start..], current));
    }
    tokens
}

fn token(text: &str, digits: bool) -> Token<'_> {
    if digits {
        Token::Digits(text)
    } else {
        Token::Text(text)
    }
}

/// Integer comparison on digit strings of any length.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Orders printed card numbers so that embedded digit runs compare by value:
/// "9" < "10", "SWSH9" < "SWSH10". A token sequence that runs out first sorts
/// first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = tokenize(a);
    let right = tokenize(b);
    for (x, y) in left.iter().zip(right.iter()) {
        let ordering = match (x, y) {
            (Token::Digits(x), Token::Digits(y)) => cmp_digits(x, y),
            _ => x.as_str().cmp(y.as_str()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}
