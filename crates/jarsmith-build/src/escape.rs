//! Argument escaping for command interpreters and persisted metadata
//!
//! The same runtime options end up both on real command lines and inside
//! archive metadata that a later invocation reads back, so each target gets
//! its own quoting rule.

use std::fmt;
use std::str::FromStr;

/// Target interpreter for an escaped argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellDialect {
    /// POSIX shells (bash, sh, zsh)
    Posix,
    /// Windows `cmd.exe`
    Cmd,
    /// PowerShell
    PowerShell,
    /// Quoting used for values persisted in archive metadata
    Portable,
}

impl ShellDialect {
    /// Dialect of the shell the current platform launches by default
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::Cmd
        } else {
            Self::Posix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posix => "bash",
            Self::Cmd => "cmd",
            Self::PowerShell => "powershell",
            Self::Portable => "portable",
        }
    }

    /// Characters that never need quoting in this dialect (besides ASCII alphanumerics)
    fn safe_punctuation(&self) -> &'static str {
        match self {
            Self::Posix | Self::Portable => "._+=:@%/-",
            Self::Cmd | Self::PowerShell => ".,_+=:;@()-",
        }
    }

    /// Whether `arg` can be passed through unmodified; an empty argument never can
    pub fn is_safe(&self, arg: &str) -> bool {
        let punctuation = self.safe_punctuation();
        !arg.is_empty()
            && arg
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || punctuation.contains(c))
    }

    /// Escape a single argument
    pub fn escape(&self, arg: &str) -> String {
        if self.is_safe(arg) {
            return arg.to_string();
        }
        match self {
            Self::Posix => escape_posix(arg),
            Self::Cmd => escape_cmd(arg),
            Self::PowerShell => escape_powershell(arg),
            Self::Portable => escape_portable(arg),
        }
    }
}

impl Default for ShellDialect {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for ShellDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShellDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bash" | "sh" | "posix" => Ok(Self::Posix),
            "cmd" => Ok(Self::Cmd),
            "powershell" | "pwsh" => Ok(Self::PowerShell),
            "portable" => Ok(Self::Portable),
            other => Err(format!("unknown shell '{}'", other)),
        }
    }
}

/// Escape a single argument for `dialect`
pub fn escape(arg: &str, dialect: ShellDialect) -> String {
    dialect.escape(arg)
}

/// Escape every argument for `dialect`
pub fn escape_all<S: AsRef<str>>(args: &[S], dialect: ShellDialect) -> Vec<String> {
    args.iter().map(|a| dialect.escape(a.as_ref())).collect()
}

/// Render a command line for display in `dialect`
pub fn command_line<S: AsRef<str>>(args: &[S], dialect: ShellDialect) -> String {
    escape_all(args, dialect).join(" ")
}

fn escape_posix(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

fn escape_cmd(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 8);
    out.push_str("^\"");
    for c in arg.chars() {
        match c {
            '(' | ')' | '!' | '^' | '<' | '>' | '&' | '|' | '%' | ' ' => {
                out.push('^');
                out.push(c);
            }
            '"' => out.push_str("\\^\""),
            _ => out.push(c),
        }
    }
    out.push_str("^\"");
    out
}

fn escape_powershell(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "''"))
}

fn escape_portable(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        match c {
            '"' | '\'' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Split a persisted options string back into arguments.
///
/// Understands the portable form (double quotes with backslash escapes,
/// `\n` and `\r` for line breaks) as well as POSIX single quoting, so values
/// written by either rule read back.
pub fn split_portable(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some('n') => current.push('\n'),
                            Some('r') => current.push('\r'),
                            Some(escaped) => current.push(escaped),
                            None => {}
                        },
                        _ => current.push(q),
                    }
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '\\' => {
                in_token = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(ShellDialect::Posix, "-Dfoo=bar", "-Dfoo=bar")]
    #[case(ShellDialect::Posix, "hello world", "'hello world'")]
    #[case(ShellDialect::Posix, "it's", r"'it'\''s'")]
    #[case(ShellDialect::Posix, "/usr/lib:%PATH%", "/usr/lib:%PATH%")]
    #[case(ShellDialect::Cmd, "a,b;c", "a,b;c")]
    #[case(ShellDialect::Cmd, "hello world", "^\"hello^ world^\"")]
    #[case(ShellDialect::Cmd, "say \"hi\"", "^\"say^ \\^\"hi\\^\"^\"")]
    #[case(ShellDialect::Cmd, "100%", "^\"100^%^\"")]
    #[case(ShellDialect::Cmd, "a&b", "^\"a^&b^\"")]
    #[case(ShellDialect::PowerShell, "(x)", "(x)")]
    #[case(ShellDialect::PowerShell, "it's here", "'it''s here'")]
    #[case(ShellDialect::Portable, "-Xmx2g", "-Xmx2g")]
    #[case(ShellDialect::Portable, "a b", "\"a b\"")]
    #[case(ShellDialect::Portable, r#"q"u'o\te"#, r#""q\"u\'o\\te""#)]
    fn test_escape(#[case] dialect: ShellDialect, #[case] arg: &str, #[case] expected: &str) {
        assert_eq!(escape(arg, dialect), expected);
    }

    #[test]
    fn test_cmd_parentheses_escaped_only_when_quoting() {
        assert_eq!(ShellDialect::Cmd.escape("f(x)"), "f(x)");
        assert_eq!(ShellDialect::Cmd.escape("f (x)"), "^\"f^ ^(x^)^\"");
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("bash".parse::<ShellDialect>().unwrap(), ShellDialect::Posix);
        assert_eq!("CMD".parse::<ShellDialect>().unwrap(), ShellDialect::Cmd);
        assert_eq!(
            "pwsh".parse::<ShellDialect>().unwrap(),
            ShellDialect::PowerShell
        );
        assert!("fish".parse::<ShellDialect>().is_err());
    }

    #[test]
    fn test_command_line() {
        let line = command_line(&["javac", "-d", "my dir"], ShellDialect::Posix);
        assert_eq!(line, "javac -d 'my dir'");
    }

    #[test]
    fn test_split_portable_reads_escaped_options() {
        let options = vec![
            "-Xmx1g".to_string(),
            "-Dgreeting=hello world".to_string(),
            r#"-Dq="quoted" \path 'x'"#.to_string(),
        ];
        let joined = command_line(&options, ShellDialect::Portable);
        assert_eq!(split_portable(&joined), options);
    }

    #[test]
    fn test_split_portable_reads_posix_quoting() {
        let joined = command_line(&["-Da=it's", "plain"], ShellDialect::Posix);
        assert_eq!(split_portable(&joined), vec!["-Da=it's", "plain"]);
    }

    #[test]
    fn test_split_portable_empty() {
        assert!(split_portable("   ").is_empty());
    }

    #[test]
    fn test_line_breaks_stay_on_one_line() {
        let options = vec!["-Dmsg=line1\nline2".to_string(), "-Dcr=a\r\nb".to_string()];
        let joined = command_line(&options, ShellDialect::Portable);
        assert!(!joined.contains('\n') && !joined.contains('\r'));
        assert_eq!(joined, r#""-Dmsg=line1\nline2" "-Dcr=a\r\nb""#);
        assert_eq!(split_portable(&joined), options);
    }

    #[rstest]
    #[case(ShellDialect::Posix, "''")]
    #[case(ShellDialect::Cmd, "^\"^\"")]
    #[case(ShellDialect::PowerShell, "''")]
    #[case(ShellDialect::Portable, "\"\"")]
    fn test_empty_argument_is_quoted(#[case] dialect: ShellDialect, #[case] expected: &str) {
        assert_eq!(dialect.escape(""), expected);
    }

    #[test]
    fn test_empty_option_survives_round_trip() {
        let options = vec!["-Da=1".to_string(), String::new(), "-Db=2".to_string()];
        let joined = command_line(&options, ShellDialect::Portable);
        assert_eq!(split_portable(&joined), options);
    }

    fn dialects() -> impl Strategy<Value = ShellDialect> {
        prop_oneof![
            Just(ShellDialect::Posix),
            Just(ShellDialect::Cmd),
            Just(ShellDialect::PowerShell),
            Just(ShellDialect::Portable),
        ]
    }

    proptest! {
        #[test]
        fn safe_arguments_pass_through(dialect in dialects(), arg in "[a-zA-Z0-9._+=:@-]{1,24}") {
            prop_assert_eq!(dialect.escape(&arg), arg);
        }

        #[test]
        fn unsafe_arguments_are_quoted(
            dialect in dialects(),
            prefix in "[a-z]{0,8}",
            bad in "[ \"'&|<>!^$*?`\\\\]",
            suffix in "[a-z]{0,8}",
        ) {
            let arg = format!("{}{}{}", prefix, bad, suffix);
            prop_assert_ne!(dialect.escape(&arg), arg);
        }

        #[test]
        fn portable_round_trips(args in proptest::collection::vec("[ -~\n\r]{0,16}", 0..6)) {
            let joined = command_line(&args, ShellDialect::Portable);
            prop_assert_eq!(split_portable(&joined), args);
        }
    }
}
