use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Lines of a reader, decoded leniently so one badly encoded entry does not
/// end the scan. Only real read failures surface as errors.
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).trim().to_string())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Boxed line iterator handed to a discovery worker.
pub type WordIter = Box<dyn Iterator<Item = io::Result<String>> + Send>;

/// Candidate path segments, one per line.
///
/// A wordlist is read-only; the same value can be cloned into any number of
/// jobs, each of which opens its own reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wordlist {
    File(PathBuf),
    Words(Vec<String>),
}

impl Wordlist {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Wordlist::Words(words.into_iter().map(Into::into).collect())
    }

    /// Opens the wordlist, yielding trimmed entries lazily.
    ///
    /// Blank lines are kept: every line is one candidate.
    pub fn entries(&self) -> io::Result<WordIter> {
        match self {
            Wordlist::File(path) => {
                let reader = BufReader::new(File::open(path)?);
                Ok(Box::new(LossyLines {
                    reader,
                    buf: Vec::new(),
                }))
            }
            Wordlist::Words(words) => Ok(Box::new(
                words
                    .clone()
                    .into_iter()
                    .map(|w| Ok(w.trim().to_string())),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn file_entries_are_trimmed_and_keep_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "  users \r\n\nnotes\t\n").unwrap();
        let wordlist = Wordlist::File(file.path().to_path_buf());

        let words: Vec<String> = wordlist.entries().unwrap().map(Result::unwrap).collect();
        assert_eq!(words, vec!["users", "", "notes"]);
    }

    #[test]
    fn invalid_utf8_lines_are_decoded_not_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a\ncaf\xe9\nb\n").unwrap();
        let wordlist = Wordlist::File(file.path().to_path_buf());

        let words: Vec<String> = wordlist.entries().unwrap().map(Result::unwrap).collect();
        assert_eq!(words, vec!["a", "caf\u{FFFD}", "b"]);
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "users\nnotes").unwrap();
        let wordlist = Wordlist::File(file.path().to_path_buf());
        assert_eq!(wordlist.entries().unwrap().count(), 2);
    }

    #[test]
    fn in_memory_words_keep_order_and_duplicates() {
        let wordlist = Wordlist::from_words(["b", " a", "b"]);
        let words: Vec<String> = wordlist.entries().unwrap().map(Result::unwrap).collect();
        assert_eq!(words, vec!["b", "a", "b"]);
        // reusable
        assert_eq!(wordlist.entries().unwrap().count(), 3);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let wordlist = Wordlist::File(PathBuf::from("/definitely/not/here/words.txt"));
        assert!(wordlist.entries().is_err());
    }
}
