use std::fmt;

/// A parsed command line.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Command {
    /// The upper cased command name, e.g. `RETR`
    pub directive: String,
    /// Everything after the directive that isn't a flag, joined by single spaces
    pub argument: Option<String>,
    /// Single letter options like `-a`, in the order given
    pub flags: Vec<String>,
    /// The line as received
    pub raw: String,
}

impl Command {
    /// The argument or the empty string.
    pub(crate) fn arg(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }

    fn is_secret(&self) -> bool {
        self.directive == "PASS" && self.argument.is_some()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (argument, raw): (&dyn fmt::Debug, &dyn fmt::Debug) = if self.is_secret() {
            (&"********", &"PASS ********")
        } else {
            (&self.argument, &self.raw)
        };
        f.debug_struct("Command")
            .field("directive", &self.directive)
            .field("argument", argument)
            .field("flags", &self.flags)
            .field("raw", raw)
            .finish()
    }
}

// Used for logging: passwords never show up.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(_) if self.is_secret() => write!(f, "PASS ********"),
            Some(arg) => write!(f, "{} {}", self.directive, arg),
            None => write!(f, "{}", self.directive),
        }?;
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::line_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_redacts_passwords() {
        assert_eq!(parse("PASS hunter2").unwrap().to_string(), "PASS ********");
        assert_eq!(parse("LIST -a dir").unwrap().to_string(), "LIST dir -a");
        assert!(!format!("{:?}", parse("PASS hunter2").unwrap()).contains("hunter2"));
    }
}
