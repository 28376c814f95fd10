use std::error::Error as StdError;
use std::fmt::Write as _;

use super::StackError;

/// Indentation unit per nesting level.
pub const INDENT: &str = "  ";

/// Render an error chain, one line per error.
///
/// The error itself is written at `level`, each source one level deeper.
/// A `StackError` in the chain contributes one line per descriptor, all at
/// the stack's own level.
///
/// ```ignore
/// match dataset.extent(0, -15) {
///     Err(e) => eprint!("{}", print_nested(&e, 0)),
///     Ok(()) => {}
/// }
/// ```
pub fn print_nested(error: &(dyn StdError + 'static), level: usize) -> String {
    let mut out = String::new();
    let mut current = Some(error);
    let mut depth = level;
    while let Some(e) = current {
        match e.downcast_ref::<StackError>() {
            Some(stack) => write_stack(&mut out, stack, depth),
            None => write_line(&mut out, depth, e),
        }
        current = e.source();
        depth += 1;
    }
    out
}

pub(crate) fn write_stack(out: &mut String, stack: &StackError, level: usize) {
    for descriptor in stack {
        write_line(out, level, descriptor);
    }
}

fn write_line<D: std::fmt::Display + ?Sized>(out: &mut String, level: usize, item: &D) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
    let _ = writeln!(out, "{}", item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_plain_chain() {
        let inner = Error::local("inner");
        let outer = Error::local("outer").with_source(inner);
        assert_eq!(print_nested(&outer, 0), "outer\n  inner\n");
        assert_eq!(print_nested(&outer, 2), "    outer\n      inner\n");
    }

    #[test]
    fn test_empty_stack_adds_nothing() {
        let e = Error::native("A").with_source(StackError::default());
        assert_eq!(print_nested(&e, 0), "A\n");
    }
}
