use crate::error::{WdbcError, WdbcResult};
use crate::format::FormatSpecification;
use crate::types::FastMap;
use smol_str::SmolStr;
use std::path::Path;

/// Suffix carried by declarations in the format header (`Spellfmt[]`).
pub const DECL_SUFFIX: &str = "fmt";
/// Suffix carried by struct-style declarations (`SpellEntry[]`).
pub const ENTRY_SUFFIX: &str = "Entry";

/// Short table names whose declaration does not follow the usual naming.
const DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("Spell", "SpellEntry"),
    ("AreaTable", "AreaTableEntry"),
    ("ChrClasses", "ChrClasses"),
    ("ChrRaces", "ChrRaces"),
    ("CreatureDisplayInfo", "CreatureDisplayInfo"),
    ("CreatureFamily", "CreatureFamily"),
    ("Talent", "TalentEntry"),
    ("TalentTab", "TalentTabEntry"),
];

// ─── Tokenizer ──────────────────────────────────────────────────────────────
//
// Only the pieces of a declaration are tokens. Comments, preprocessor lines
// and whitespace vanish; anything else becomes `Other` and is ignored unless
// it interrupts a declaration.
//
//   decl := qualifier* IDENT '[' ']' '=' STRING ';'?

#[derive(Debug, Clone, PartialEq)]
enum Tok<'a> {
    Ident(&'a str),
    LBracket,
    RBracket,
    Eq,
    Str(&'a str),
    Other(char),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_until_newline(&mut self) {
        while let Some(b) = self.peek_byte(0) {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, start_line: usize) -> WdbcResult<()> {
        // opening "/*" already consumed
        loop {
            match (self.peek_byte(0), self.peek_byte(1)) {
                (Some(b'*'), Some(b'/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => {
                    return Err(WdbcError::CatalogParse {
                        line: start_line,
                        reason: "unterminated block comment".into(),
                    });
                }
            }
        }
    }

    fn string(&mut self, start_line: usize) -> WdbcResult<&'a str> {
        // opening quote already consumed
        let start = self.pos;
        loop {
            match self.peek_byte(0) {
                Some(b'"') => {
                    let s = &self.src[start..self.pos];
                    self.pos += 1;
                    return Ok(s);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.bump();
                }
                Some(b'\n') | None => {
                    return Err(WdbcError::CatalogParse {
                        line: start_line,
                        reason: "unterminated string literal".into(),
                    });
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Next token with the line it started on.
    fn next_tok(&mut self) -> WdbcResult<Option<(Tok<'a>, usize)>> {
        let mut at_line_start = self.pos == 0;
        loop {
            let Some(b) = self.peek_byte(0) else {
                return Ok(None);
            };
            let line = self.line;
            match b {
                b'\n' => {
                    self.bump();
                    at_line_start = true;
                }
                b' ' | b'\t' | b'\r' => {
                    self.bump();
                }
                b'#' if at_line_start => self.skip_until_newline(),
                b'/' if self.peek_byte(1) == Some(b'/') => self.skip_until_newline(),
                b'/' if self.peek_byte(1) == Some(b'*') => {
                    self.pos += 2;
                    self.skip_block_comment(line)?;
                }
                b'"' => {
                    self.pos += 1;
                    return Ok(Some((Tok::Str(self.string(line)?), line)));
                }
                b'[' => {
                    self.pos += 1;
                    return Ok(Some((Tok::LBracket, line)));
                }
                b']' => {
                    self.pos += 1;
                    return Ok(Some((Tok::RBracket, line)));
                }
                b'=' => {
                    self.pos += 1;
                    return Ok(Some((Tok::Eq, line)));
                }
                b if b == b'_' || b.is_ascii_alphabetic() => {
                    let start = self.pos;
                    while let Some(c) = self.peek_byte(0) {
                        if c == b'_' || c.is_ascii_alphanumeric() {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    return Ok(Some((Tok::Ident(&self.src[start..self.pos]), line)));
                }
                _ => {
                    let ch = self.bump().unwrap_or('\0');
                    return Ok(Some((Tok::Other(ch), line)));
                }
            }
        }
    }

    fn tokenize(mut self) -> WdbcResult<Vec<(Tok<'a>, usize)>> {
        let mut out = Vec::new();
        while let Some(t) = self.next_tok()? {
            out.push(t);
        }
        Ok(out)
    }
}

// ─── FormatCatalog ──────────────────────────────────────────────────────────

/// Named format strings extracted from a declaration source, plus the
/// override table consulted first during resolution.
#[derive(Debug, Clone, Default)]
pub struct FormatCatalog {
    formats: FastMap<SmolStr, FormatSpecification>,
    overrides: FastMap<SmolStr, SmolStr>,
}

impl FormatCatalog {
    /// Extract every `name[] = "<format>"` declaration from `source`.
    ///
    /// Keys are stored exactly as declared. A declaration that starts but
    /// does not complete is an error, never a silent skip.
    pub fn parse(source: &str) -> WdbcResult<Self> {
        let toks = Lexer::new(source).tokenize()?;
        let mut formats: FastMap<SmolStr, FormatSpecification> = FastMap::default();

        let mut i = 0;
        while i < toks.len() {
            let &(Tok::Ident(name), line) = &toks[i] else {
                i += 1;
                continue;
            };
            if !matches!(toks.get(i + 1), Some((Tok::LBracket, _))) {
                i += 1;
                continue;
            }

            let expect = |at: usize, want: Tok<'_>, what: &str| -> WdbcResult<()> {
                match toks.get(at) {
                    Some((t, _)) if *t == want => Ok(()),
                    Some((_, l)) => Err(WdbcError::CatalogParse {
                        line: *l,
                        reason: format!("expected {what} in declaration of `{name}`"),
                    }),
                    None => Err(WdbcError::CatalogParse {
                        line,
                        reason: format!("unexpected end of input in declaration of `{name}`"),
                    }),
                }
            };
            expect(i + 2, Tok::RBracket, "']'")?;
            expect(i + 3, Tok::Eq, "'='")?;
            let format = match toks.get(i + 4) {
                Some((Tok::Str(s), _)) if !s.is_empty() => *s,
                Some((Tok::Str(_), l)) => {
                    return Err(WdbcError::CatalogParse {
                        line: *l,
                        reason: format!("empty format string for `{name}`"),
                    });
                }
                Some((_, l)) => {
                    return Err(WdbcError::CatalogParse {
                        line: *l,
                        reason: format!("expected quoted format string for `{name}`"),
                    });
                }
                None => {
                    return Err(WdbcError::CatalogParse {
                        line,
                        reason: format!("unexpected end of input in declaration of `{name}`"),
                    });
                }
            };

            let spec = FormatSpecification::parse(format)?;
            if formats.insert(SmolStr::from(name), spec).is_some() {
                tracing::warn!(name, line, "duplicate format declaration, keeping the later one");
            }
            i += 5;
        }

        tracing::debug!(count = formats.len(), "parsed format catalog");
        Ok(Self {
            formats,
            overrides: FastMap::default(),
        })
    }

    /// Read and parse a declaration file.
    pub fn from_path(path: impl AsRef<Path>) -> WdbcResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WdbcError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Replace the override table.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<SmolStr>,
    {
        self.overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Install the built-in override table for the common client tables.
    pub fn with_default_overrides(self) -> Self {
        self.with_overrides(DEFAULT_OVERRIDES.iter().copied())
    }

    pub fn insert_override(&mut self, short: impl Into<SmolStr>, key: impl Into<SmolStr>) {
        self.overrides.insert(short.into(), key.into());
    }

    /// Resolve a table name to its catalog key. First matching rule wins:
    ///
    /// 1. override table
    /// 2. exact name
    /// 3. name without trailing `fmt`
    /// 4. name + `Entry`
    /// 5. name + `fmt`
    ///
    /// Override targets and the `Entry` form name the struct (`SpellEntry`),
    /// so both also match the declaration carrying the `fmt` suffix
    /// (`SpellEntryfmt`). A name that already ends in `fmt` stops at rule 3.
    pub fn resolve_key(&self, name: &str) -> WdbcResult<&str> {
        let hit = |k: &str| self.formats.get_key_value(k).map(|(k, _)| k.as_str());
        let hit_decl = |k: &str| hit(k).or_else(|| hit(&format!("{k}{DECL_SUFFIX}")));

        let found = if let Some(key) = self
            .overrides
            .get(name)
            .and_then(|target| hit_decl(target.as_str()))
        {
            Some(key)
        } else if let Some(key) = hit(name) {
            Some(key)
        } else if let Some(stem) = name.strip_suffix(DECL_SUFFIX) {
            hit(stem)
        } else {
            hit_decl(&format!("{name}{ENTRY_SUFFIX}"))
                .or_else(|| hit(&format!("{name}{DECL_SUFFIX}")))
        };

        match found {
            Some(key) => {
                tracing::trace!(name, key, "resolved format");
                Ok(key)
            }
            None => Err(WdbcError::NameNotResolved(name.to_string())),
        }
    }

    /// Resolve a table name to its parsed specification.
    pub fn resolve(&self, name: &str) -> WdbcResult<FormatSpecification> {
        let key = self.resolve_key(name)?;
        Ok(self.formats[key].clone())
    }

    /// Resolve a table name to its raw format string.
    pub fn resolve_format(&self, name: &str) -> WdbcResult<&str> {
        let key = self.resolve_key(name)?;
        Ok(self.formats[key].format_string())
    }

    /// Direct lookup by catalog key, no fallback.
    pub fn get(&self, key: &str) -> Option<&FormatSpecification> {
        self.formats.get(key)
    }

    /// Every catalog key, sorted.
    pub fn list_available(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.formats.keys().map(SmolStr::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
