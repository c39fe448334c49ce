use std::{fmt::Debug, str::FromStr};

use miette::SourceSpan;

use winnow::{
    bytes::take_till1,
    stream::{AsChar, Stream, StreamIsPartial},
    IResult, Parser,
};

/// Takes any amount of winnow parsers and returns a parser that parses them
/// in sequence, separated by any amount of whitespace.
#[macro_export]
macro_rules! ws_separated {
    ($($t:expr),*) => {
        {
            winnow::sequence::terminated(
                (
                    $(
                        winnow::sequence::preceded(
                            winnow::ascii::space0,
                            $t
                        )
                    ),+
                ),
                winnow::ascii::space0)
                .context(concat!("ws_separated!(", stringify!($($t),+), ")"))
        }
    };
}

/// Stores the entire input to work out where in the file errors occured.
///
/// Span arithmetic borrowed from kdl-rs' parser error reporting: since every
/// line and token we parse is a subslice of the buffered `.b` text, pointer
/// arithmetic against the full input recovers its byte range for diagnostics.
#[derive(Debug)]
pub struct InputLocator<'a> {
    pub full_input: &'a str,
}

impl<'a> InputLocator<'a> {
    pub fn new(full_input: &'a str) -> Self {
        Self { full_input }
    }

    /// Creates a span for an item using a substring of self.full_input
    ///
    /// Note that substr must be a literal substring, as in it must be
    /// a pointer into the same string!
    pub fn span_from_substr(&self, substr: &str) -> SourceSpan {
        let base_addr = self.full_input.as_ptr() as usize;
        let substr_addr = substr.as_ptr() as usize;
        assert!(
            substr_addr >= base_addr,
            "tried to get the span of a non-substring!"
        );
        let start = substr_addr - base_addr;
        let end = start + substr.len();
        SourceSpan::from(start..end)
    }
}

pub fn non_ws<I>(i: I) -> IResult<I, I::Slice>
where
    I: StreamIsPartial + Stream,
    <I as Stream>::Token: AsChar,
{
    take_till1(|x: <I as Stream>::Token| "\r\n\t ".contains(x.as_char()))
        .context("non_ws")
        .parse_next(i)
}

pub fn from_str<I, T: FromStr>(i: I, context: impl Debug + Clone) -> IResult<I, T>
where
    I: StreamIsPartial + Stream,
    <I as Stream>::Token: AsChar + Copy,
    <I as Stream>::Slice: AsRef<str>,
{
    non_ws
        .try_map(|x: I::Slice| x.as_ref().parse::<T>())
        .context(context)
        .parse_next(i)
}

macro_rules! from_str_impl {
    ($($t:ident),+) => {
        $(pub fn $t<I>(i: I) -> IResult<I, $t>
        where
            I: StreamIsPartial + Stream,
            <I as Stream>::Token: AsChar + Copy,
            <I as Stream>::Slice: AsRef<str>,
        {
            from_str(i, stringify!($t))
        })+
    };
}

from_str_impl!(f32, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_separated() {
        let input = "lorem 1 ipsum 5.3";
        let (rest, parsed) =
            ws_separated!("lorem", usize, "ipsum", f32).parse_next(input).unwrap();
        assert_eq!(parsed, ("lorem", 1, "ipsum", 5.3));
        assert_eq!(rest, "");
    }

    #[test]
    fn span_of_substr() {
        let locator = InputLocator::new("alpha beta");
        let span = locator.span_from_substr(&locator.full_input[6..]);
        assert_eq!(span.offset(), 6);
        assert_eq!(span.len(), 4);
    }
}
