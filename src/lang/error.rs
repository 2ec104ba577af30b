use super::Column;

#[derive(Debug, PartialEq, Clone)]
pub struct Error {
    code: u16,
    message: Option<String>,
    column: Option<Column>,
}

macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::from_code($crate::lang::ErrorCode::$err)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::from_code($crate::lang::ErrorCode::$err).message($msg)
    };
}

impl Error {
    pub fn from_code(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            message: None,
            column: None,
        }
    }

    pub fn message<T: AsRef<str>>(mut self, message: T) -> Error {
        self.message = Some(message.as_ref().to_string());
        self
    }

    pub fn in_column(mut self, column: &Column) -> Error {
        self.column = Some(column.clone());
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn column(&self) -> Option<Column> {
        self.column.clone()
    }
}

#[repr(u16)]
pub enum ErrorCode {
    SyntaxError = 2,
    UnknownWord = 10,
    QuoteTooLarge = 11,
    AddressOutOfRange = 12,
    BadDirective = 13,
    EncodingError = 14,
    NotConnected = 20,
    ConnectFailed = 21,
    WriteFailed = 22,
    ProtocolError = 23,
    FileError = 30,
    InternalError = 51,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self.code {
            2 => "SYNTAX ERROR",
            10 => "UNKNOWN WORD",
            11 => "QUOTATION TOO LARGE",
            12 => "ADDRESS OUT OF RANGE",
            13 => "BAD DIRECTIVE",
            14 => "ENCODING ERROR",
            20 => "NOT CONNECTED",
            21 => "CONNECT FAILED",
            22 => "WRITE FAILED",
            23 => "PROTOCOL ERROR",
            30 => "FILE ERROR",
            51 => "INTERNAL ERROR",
            _ => "",
        };
        if s.is_empty() {
            write!(f, "ERROR {}", self.code)?;
        } else {
            write!(f, "{}", s)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}
