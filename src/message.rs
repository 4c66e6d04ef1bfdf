//! Trace message arguments and rendering
//!
//! `trace` takes a list of [`TraceArg`]s. When the first one is text it acts
//! as a format string whose `{}` placeholders are filled by the rest, the way
//! `println!` would. Otherwise every argument is printed, space separated.
//!
//! Format strings are interpreted at run time, so only positional `{}` and
//! `{:?}` placeholders are supported; `{{` and `}}` produce literal braces.
//!
//! Arguments are rendered to strings when they are converted, not when the
//! format is applied, so `{:?}` is an alias for `{}`. The `Debug` form of a
//! value is chosen at conversion time with [`TraceArg::debug`].

use std::fmt;

/// One argument to a trace call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceArg {
    /// String-like argument, usable as a format string in first position
    Text(String),
    /// Any other value, already rendered
    Value(String),
}

impl TraceArg {
    /// Wraps a value through its `Display` implementation.
    pub fn display(value: impl fmt::Display) -> Self {
        TraceArg::Value(value.to_string())
    }

    /// Wraps a value through its `Debug` implementation.
    pub fn debug(value: impl fmt::Debug) -> Self {
        TraceArg::Value(format!("{:?}", value))
    }

    fn as_str(&self) -> &str {
        match self {
            TraceArg::Text(s) | TraceArg::Value(s) => s,
        }
    }
}

impl fmt::Display for TraceArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion used by the `trace!` macro for each argument
pub trait IntoTraceArg {
    fn into_trace_arg(self) -> TraceArg;
}

impl IntoTraceArg for TraceArg {
    fn into_trace_arg(self) -> TraceArg {
        self
    }
}

impl IntoTraceArg for &str {
    fn into_trace_arg(self) -> TraceArg {
        TraceArg::Text(self.to_string())
    }
}

impl IntoTraceArg for String {
    fn into_trace_arg(self) -> TraceArg {
        TraceArg::Text(self)
    }
}

impl IntoTraceArg for &String {
    fn into_trace_arg(self) -> TraceArg {
        TraceArg::Text(self.clone())
    }
}

impl IntoTraceArg for fmt::Arguments<'_> {
    fn into_trace_arg(self) -> TraceArg {
        TraceArg::Text(self.to_string())
    }
}

macro_rules! impl_value_arg {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoTraceArg for $t {
                fn into_trace_arg(self) -> TraceArg {
                    TraceArg::Value(self.to_string())
                }
            }

            impl IntoTraceArg for &$t {
                fn into_trace_arg(self) -> TraceArg {
                    TraceArg::Value(self.to_string())
                }
            }
        )*
    };
}

impl_value_arg!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Builds the message for a trace call from its arguments.
///
/// With a text first argument the rest fill its placeholders. Otherwise the
/// format becomes one `{} ` per argument and all arguments are printed.
pub fn message_from(args: &[TraceArg]) -> String {
    match args.split_first() {
        None => String::new(),
        Some((TraceArg::Text(format), values)) => render(format, values),
        Some(_) => render(&"{} ".repeat(args.len()), args),
    }
}

/// Substitutes `values` into the `{}`/`{:?}` placeholders of `format`.
///
/// `{:?}` uses the value's `Display` form, like `{}`. Missing values render
/// as `{MISSING}`; leftover values are appended, space separated.
pub fn render<D: fmt::Display>(format: &str, values: &[D]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut next = values.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut spec = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    spec.push(inner);
                }
                if !closed {
                    out.push('{');
                    out.push_str(&spec);
                } else if spec.is_empty() || spec == ":?" {
                    match next.next() {
                        Some(value) => out.push_str(&value.to_string()),
                        None => out.push_str("{MISSING}"),
                    }
                } else {
                    out.push('{');
                    out.push_str(&spec);
                    out.push('}');
                }
            }
            other => out.push(other),
        }
    }

    for extra in next {
        out.push(' ');
        out.push_str(&extra.to_string());
    }
    out
}

/// Escapes braces so `text` survives [`render`] unchanged.
pub fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> TraceArg {
        TraceArg::Text(s.to_string())
    }

    #[test]
    fn test_empty_args_give_empty_message() {
        assert_eq!(message_from(&[]), "");
    }

    #[test]
    fn test_format_string_with_values() {
        let args = [text("Alice: [{}] {}"), TraceArg::display(7), text("x")];
        assert_eq!(message_from(&args), "Alice: [7] x");
    }

    #[test]
    fn test_format_string_alone() {
        assert_eq!(message_from(&[text("Start")]), "Start");
    }

    #[test]
    fn test_non_text_first_argument_prints_all_values() {
        let args = [TraceArg::display(1), text("two"), TraceArg::display(3.5)];
        assert_eq!(message_from(&args), "1 two 3.5 ");
    }

    #[test]
    fn test_missing_values_are_marked() {
        assert_eq!(message_from(&[text("{} and {}"), TraceArg::display(1)]), "1 and {MISSING}");
    }

    #[test]
    fn test_extra_values_are_appended() {
        let args = [text("n={}"), TraceArg::display(1), TraceArg::display(2)];
        assert_eq!(message_from(&args), "n=1 2");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(message_from(&[text("{{literal}} {}"), TraceArg::display("v")]), "{literal} v");
    }

    #[test]
    fn test_debug_placeholder() {
        let args = [text("{:?}"), TraceArg::debug(vec![1, 2])];
        assert_eq!(message_from(&args), "[1, 2]");
    }

    #[test]
    fn test_debug_form_is_chosen_at_conversion() {
        let plain = [text("{:?}"), "hi".into_trace_arg()];
        assert_eq!(message_from(&plain), "hi");

        let quoted = [text("{:?}"), TraceArg::debug("hi")];
        assert_eq!(message_from(&quoted), "\"hi\"");
    }

    #[test]
    fn test_unknown_spec_is_left_alone() {
        assert_eq!(render::<String>("{:>5}", &[]), "{:>5}");
    }

    #[test]
    fn test_unclosed_brace_is_kept() {
        assert_eq!(render::<String>("open {", &[]), "open {");
    }

    #[test]
    fn test_escape_round_trips_through_render() {
        let name = "demo::run::{{closure}}";
        assert_eq!(render::<String>(&escape_braces(name), &[]), name);
    }

    #[test]
    fn test_into_trace_arg_kinds() {
        assert_eq!("s".into_trace_arg(), text("s"));
        assert_eq!(String::from("s").into_trace_arg(), text("s"));
        assert_eq!(42u8.into_trace_arg(), TraceArg::Value("42".to_string()));
        assert_eq!(true.into_trace_arg(), TraceArg::Value("true".to_string()));
        assert_eq!(format_args!("{}-{}", 1, 2).into_trace_arg(), text("1-2"));
    }
}
