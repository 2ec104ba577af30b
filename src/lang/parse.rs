use super::node::Node;
use super::Error;

type Result<T> = std::result::Result<T, Error>;

/// Build a node tree from a lexed token list.
///
/// `[` and `]` nest quotations; a token that parses as an i16 is a number;
/// `(NNNN)` is a device address; anything else stays a plain token.
pub fn parse(tokens: &[String]) -> Result<Vec<Node>> {
    Parse {
        token_stream: tokens.iter().peekable(),
    }
    .start()
}

struct Parse<'a, T: Iterator<Item = &'a String>> {
    token_stream: std::iter::Peekable<T>,
}

impl<'a, T: Iterator<Item = &'a String>> Parse<'a, T> {
    fn start(&mut self) -> Result<Vec<Node>> {
        let nodes = self.sequence(false)?;
        match self.token_stream.next() {
            None => Ok(nodes),
            Some(_) => Err(error!(SyntaxError; "UNMATCHED ]")),
        }
    }

    fn sequence(&mut self, nested: bool) -> Result<Vec<Node>> {
        let mut nodes: Vec<Node> = vec![];
        while let Some(token) = self.token_stream.peek() {
            match token.as_str() {
                "[" => {
                    self.token_stream.next();
                    nodes.push(Node::Quotation(self.sequence(true)?));
                }
                "]" => {
                    if !nested {
                        break;
                    }
                    self.token_stream.next();
                    return Ok(nodes);
                }
                _ => {
                    let token = self.token_stream.next().unwrap();
                    nodes.push(atom(token)?);
                }
            }
        }
        if nested {
            return Err(error!(SyntaxError; "UNMATCHED ["));
        }
        Ok(nodes)
    }
}

fn atom(token: &str) -> Result<Node> {
    if let Ok(number) = token.parse::<i16>() {
        return Ok(Node::Number(number));
    }
    if token.len() > 2 && token.starts_with('(') && token.ends_with(')') {
        let inner = &token[1..token.len() - 1];
        let numeric = inner
            .strip_prefix('-')
            .unwrap_or(inner)
            .chars()
            .all(|c| c.is_ascii_digit())
            && inner != "-";
        if numeric {
            match inner.parse::<i32>() {
                Ok(addr) if (0..=0x7FFF).contains(&addr) => {
                    return Ok(Node::Address(addr as i16));
                }
                _ => return Err(error!(SyntaxError; "MALFORMED ADDRESS")),
            }
        }
    }
    Ok(Node::Token(token.to_string()))
}
