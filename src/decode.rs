//! Incremental decoders for whitespace-separated value lists.
//!
//! The XML tokenizer hands text to the parser in fragments whose boundaries
//! have nothing to do with token boundaries. A [`ChunkDecoder`] keeps the
//! partially accumulated token between calls, so a list like
//! `<float_array>` is decoded in one pass without first collecting the
//! whole element text into a string.
//!
//! ```rust
//! use collada_rs::decode::FloatDecoder;
//!
//! let mut values = Vec::new();
//! let mut decoder = FloatDecoder::floats();
//! decoder.add_chunk("1.5 2", |v| values.push(v)).unwrap();
//! decoder.add_chunk(".25\n3", |v| values.push(v)).unwrap();
//! decoder.finish(|v| values.push(v)).unwrap();
//! assert_eq!(values, vec![1.5, 2.25, 3.0]);
//! ```

use crate::error::{Error, Result};

/// Decoder producing `f32` values.
pub type FloatDecoder = ChunkDecoder<f32>;

/// Decoder producing `u32` values (index lists).
pub type IntDecoder = ChunkDecoder<u32>;

/// Decoder producing owned string tokens (name arrays).
pub type StringDecoder = ChunkDecoder<String>;

/// Returns true for the characters that separate list tokens.
pub fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parses a float token.
pub fn parse_f32(token: &str) -> Result<f32> {
    token.parse().map_err(|source| Error::InvalidFloat {
        value: token.to_string(),
        source,
    })
}

/// Parses an unsigned integer token.
pub fn parse_u32(token: &str) -> Result<u32> {
    token.parse().map_err(|source| Error::InvalidInteger {
        value: token.to_string(),
        source,
    })
}

fn parse_string(token: &str) -> Result<String> {
    Ok(token.to_string())
}

/// Splits fragmented text into tokens and converts each one.
///
/// Call [`add_chunk`](Self::add_chunk) for every fragment of a list and
/// [`finish`](Self::finish) exactly once afterwards; a token that is not
/// followed by a delimiter is only emitted by `finish`.
pub struct ChunkDecoder<T> {
    token: String,
    parse: fn(&str) -> Result<T>,
}

impl<T> std::fmt::Debug for ChunkDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkDecoder")
            .field("token", &self.token)
            .finish()
    }
}

impl<T> ChunkDecoder<T> {
    /// Creates a decoder with a custom token conversion.
    pub fn with_parser(parse: fn(&str) -> Result<T>) -> Self {
        Self {
            token: String::new(),
            parse,
        }
    }

    /// Returns the partially accumulated token, if any.
    pub fn pending(&self) -> &str {
        &self.token
    }

    /// Feeds one fragment of text, emitting every token it completes.
    pub fn add_chunk(&mut self, chunk: &str, mut emit: impl FnMut(T)) -> Result<()> {
        let mut rest = chunk;
        while let Some(pos) = rest.find(is_delimiter) {
            let head = &rest[..pos];
            if self.token.is_empty() {
                if !head.is_empty() {
                    emit((self.parse)(head)?);
                }
            } else {
                self.token.push_str(head);
                emit((self.parse)(&self.token)?);
                self.token.clear();
            }
            // delimiters are single-byte ASCII
            rest = &rest[pos + 1..];
        }
        self.token.push_str(rest);
        Ok(())
    }

    /// Emits the trailing token left by the last chunk, if any.
    pub fn finish(&mut self, mut emit: impl FnMut(T)) -> Result<()> {
        if !self.token.is_empty() {
            let value = (self.parse)(&self.token)?;
            self.token.clear();
            emit(value);
        }
        Ok(())
    }
}

impl ChunkDecoder<f32> {
    /// Creates a float decoder.
    pub fn floats() -> Self {
        Self::with_parser(parse_f32)
    }
}

impl ChunkDecoder<u32> {
    /// Creates an integer decoder.
    pub fn integers() -> Self {
        Self::with_parser(parse_u32)
    }
}

impl ChunkDecoder<String> {
    /// Creates a decoder that keeps each token verbatim.
    pub fn strings() -> Self {
        Self::with_parser(parse_string)
    }
}

/// A destination array written sequentially through a cursor.
///
/// When the expected length is known up front the storage is allocated
/// once; writes past that length grow the array.
#[derive(Debug, Clone, Default)]
pub struct ArrayWriter<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T: Default + Clone> ArrayWriter<T> {
    /// Creates a writer pre-sized to `len` values.
    pub fn with_len(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
            cursor: 0,
        }
    }

    /// Writes the next value.
    pub fn write(&mut self, value: T) {
        if self.cursor < self.values.len() {
            self.values[self.cursor] = value;
        } else {
            self.values.push(value);
        }
        self.cursor += 1;
    }

    /// Number of values written so far.
    pub fn written(&self) -> usize {
        self.cursor
    }

    /// Size the writer was allocated for (or has grown to).
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the written values, dropping any unwritten tail.
    pub fn into_values(mut self) -> Vec<T> {
        self.values.truncate(self.cursor);
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_floats(chunks: &[&str]) -> Vec<f32> {
        let mut out = Vec::new();
        let mut decoder = FloatDecoder::floats();
        for chunk in chunks {
            decoder.add_chunk(chunk, |v| out.push(v)).unwrap();
        }
        decoder.finish(|v| out.push(v)).unwrap();
        out
    }

    #[test]
    fn test_token_split_across_chunks() {
        assert_eq!(decode_floats(&["1.5 2", ".25\n3"]), vec![1.5, 2.25, 3.0]);
    }

    #[test]
    fn test_finish_flushes_trailing_token() {
        let mut out = Vec::new();
        let mut decoder = IntDecoder::integers();
        decoder.add_chunk("42", |v| out.push(v)).unwrap();
        assert!(out.is_empty());
        assert_eq!(decoder.pending(), "42");

        decoder.finish(|v| out.push(v)).unwrap();
        assert_eq!(out, vec![42]);
        assert_eq!(decoder.pending(), "");
    }

    #[test]
    fn test_runs_of_delimiters() {
        assert_eq!(
            decode_floats(&["\n\t  1 ", "  ", "\r\n2\t\t", "3  "]),
            vec![1.0, 2.0, 3.0]
        );
        assert!(decode_floats(&["   ", "\n"]).is_empty());
    }

    #[test]
    fn test_string_tokens_verbatim() {
        let mut out = Vec::new();
        let mut decoder = StringDecoder::strings();
        decoder.add_chunk("joint_root joi", |v| out.push(v)).unwrap();
        decoder.add_chunk("nt_arm #ref", |v| out.push(v)).unwrap();
        decoder.finish(|v| out.push(v)).unwrap();
        assert_eq!(out, vec!["joint_root", "joint_arm", "#ref"]);
    }

    #[test]
    fn test_invalid_token_fails() {
        let mut decoder = FloatDecoder::floats();
        let err = decoder.add_chunk("1.0 abc ", |_| {}).unwrap_err();
        assert!(matches!(err, Error::InvalidFloat { ref value, .. } if value == "abc"));

        let mut decoder = IntDecoder::integers();
        decoder.add_chunk("1 -2", |_| {}).unwrap();
        assert!(matches!(
            decoder.finish(|_| {}),
            Err(Error::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_array_writer() {
        let mut writer = ArrayWriter::with_len(3);
        writer.write(1u32);
        writer.write(2);
        assert_eq!(writer.capacity(), 3);
        assert_eq!(writer.into_values(), vec![1, 2]);

        let mut writer = ArrayWriter::with_len(1);
        writer.write(1u32);
        writer.write(2);
        assert_eq!(writer.written(), 2);
        assert_eq!(writer.into_values(), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn prop_chunk_boundaries_do_not_matter(
            values in prop::collection::vec(-100_000i32..100_000, 0..40),
            seps in prop::collection::vec(prop::sample::select(vec![" ", "\n", "\t", "  ", "\r\n"]), 40),
            cuts in prop::collection::vec(0usize..400, 0..8),
        ) {
            let mut text = String::new();
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    text.push_str(seps[i]);
                }
                text.push_str(&format!("{}", *v as f32 / 8.0));
            }

            let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(text.len())).collect();
            cuts.sort_unstable();
            let mut chunks = Vec::new();
            let mut start = 0;
            for cut in cuts {
                chunks.push(&text[start..cut]);
                start = cut;
            }
            chunks.push(&text[start..]);

            prop_assert_eq!(decode_floats(&chunks), decode_floats(&[text.as_str()]));
            prop_assert_eq!(decode_floats(&chunks).len(), values.len());
        }
    }
}
