// Copyright (C) 2026 by GiGa infosystems

//! A line based parser for `go.mod` files
//!
//! Only `module`, `go`, `toolchain` & `require` directives are interpreted. All other known
//! directives are checked for balanced blocks & skipped.

use super::{ParsedManifest, Requirement};
use itertools::Itertools;
use thiserror::Error;

/// A `go.mod` syntax error, with the 1-based line it occurred on if there is one
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{}{message}", line_prefix(.line))]
pub struct ParseError {
    pub line: Option<usize>,
    pub message: String,
}

impl ParseError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line: Some(line),
            message: message.into(),
        }
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|line| format!("line {line}: "))
        .unwrap_or_default()
}

const BLOCK_DIRECTIVES: &[&str] = &[
    "require", "replace", "exclude", "retract", "godebug", "tool", "ignore",
];
const LINE_DIRECTIVES: &[&str] = &["module", "go", "toolchain"];

#[derive(Clone, PartialEq, Eq, Debug)]
enum Token {
    Word(String),
    Open,
    Close,
}

/// A tokenized line, with the text of a trailing `//` comment
struct Line {
    tokens: Vec<Token>,
    comment: Option<String>,
}

fn tokenize(number: usize, line: &str) -> Result<Line, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => (),
            '/' if line[idx..].starts_with("//") => {
                return Ok(Line {
                    tokens,
                    comment: Some(line[idx + 2..].trim().to_owned()),
                });
            }
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '"' | '`' => {
                let quote = c;
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ParseError::at(number, "unterminated quoted string")),
                        Some((_, c)) if c == quote => break,
                        Some((_, '\\')) if quote == '"' => match chars.next() {
                            Some((_, escaped)) => word.push(escaped),
                            None => {
                                return Err(ParseError::at(number, "unterminated quoted string"));
                            }
                        },
                        Some((_, c)) => word.push(c),
                    }
                }
                tokens.push(Token::Word(word));
            }
            c => {
                let mut word = String::from(c);
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
                        break;
                    }
                    if line[idx..].starts_with("//") {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(Line {
        tokens,
        comment: None,
    })
}

/// Checks for versions like `1.21`, `1.21.0` or `1.21rc1`
fn is_valid_go_version(version: &str) -> bool {
    let is_number = |s: &str| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
    };

    let (release, prerelease) = match version.find(|c: char| c.is_ascii_lowercase()) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };

    let valid_release = match release.split('.').collect_tuple() {
        Some((major, minor)) => is_number(major) && major != "0" && is_number(minor),
        None => match release.split('.').collect_tuple() {
            Some((major, minor, patch)) => {
                is_number(major) && major != "0" && is_number(minor) && is_number(patch)
            }
            None => false,
        },
    };

    let valid_prerelease = prerelease.is_empty() || {
        let digits = prerelease.trim_start_matches(|c: char| c.is_ascii_lowercase());
        digits.len() < prerelease.len()
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
    };

    valid_release && valid_prerelease
}

/// Checks for `default` or toolchain names like `go1.21.3` or `go1.22rc1-custom`
fn is_valid_toolchain(toolchain: &str) -> bool {
    if toolchain == "default" {
        return true;
    }
    toolchain.strip_prefix("go").is_some_and(|version| {
        let version = version.split_once('-').map_or(version, |(version, _)| version);
        is_valid_go_version(version)
    })
}

fn words(number: usize, tokens: &[Token]) -> Result<Vec<&str>, ParseError> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Word(word) => Ok(word.as_str()),
            Token::Open | Token::Close => Err(ParseError::at(number, "unexpected parenthesis")),
        })
        .collect()
}

fn set_once(
    number: usize,
    slot: &mut Option<String>,
    directive: &str,
    args: &[&str],
) -> Result<(), ParseError> {
    let Some((value,)) = args.iter().collect_tuple() else {
        return Err(ParseError::at(
            number,
            format!("usage: {directive} <single argument>"),
        ));
    };
    if slot.is_some() {
        return Err(ParseError::at(
            number,
            format!("repeated {directive} directive"),
        ));
    }
    *slot = Some((*value).to_owned());
    Ok(())
}

fn apply(
    manifest: &mut ParsedManifest,
    number: usize,
    directive: &str,
    args: &[&str],
    comment: Option<&str>,
) -> Result<(), ParseError> {
    match directive {
        "module" => set_once(number, &mut manifest.module, directive, args)?,
        "go" => {
            set_once(number, &mut manifest.go_version, directive, args)?;
            if !is_valid_go_version(args[0]) {
                return Err(ParseError::at(
                    number,
                    format!("invalid go version {:?}: must match format 1.23.0", args[0]),
                ));
            }
        }
        "toolchain" => {
            set_once(number, &mut manifest.toolchain, directive, args)?;
            if !is_valid_toolchain(args[0]) {
                return Err(ParseError::at(
                    number,
                    format!("invalid toolchain {:?}: must match format go1.23.0 or default", args[0]),
                ));
            }
        }
        "require" => {
            let Some((path, version)) = args.iter().collect_tuple() else {
                return Err(ParseError::at(
                    number,
                    "usage: require module/path v1.2.3",
                ));
            };
            let indirect = comment.is_some_and(|comment| {
                comment == "indirect" || comment.starts_with("indirect;")
            });
            manifest.requirements.push(Requirement {
                path: (*path).to_owned(),
                version: (*version).to_owned(),
                indirect,
            });
        }
        _ => (),
    }

    Ok(())
}

/// Parse the contents of a `go.mod` file
pub fn parse(contents: &[u8]) -> Result<ParsedManifest, ParseError> {
    let contents = std::str::from_utf8(contents).map_err(|error| ParseError {
        line: None,
        message: format!("invalid UTF-8: {error}"),
    })?;

    let mut manifest = ParsedManifest::default();
    // The directive of the currently open block & the line it was opened on
    let mut block: Option<(String, usize)> = None;

    for (idx, line) in contents.lines().enumerate() {
        let number = idx + 1;
        let Line { tokens, comment } = tokenize(number, line)?;
        let comment = comment.as_deref();

        if tokens.is_empty() {
            continue;
        }

        if block.is_some() && tokens == [Token::Close] {
            block = None;
            continue;
        }

        if let Some((directive, _)) = &block {
            let args = words(number, &tokens)?;
            apply(&mut manifest, number, directive, &args, comment)?;
            continue;
        }

        let directive = match &tokens[0] {
            Token::Word(word) => word.as_str(),
            Token::Close => return Err(ParseError::at(number, "unexpected `)`")),
            Token::Open => return Err(ParseError::at(number, "unexpected `(`")),
        };

        let allows_block = BLOCK_DIRECTIVES.contains(&directive);
        if !allows_block && !LINE_DIRECTIVES.contains(&directive) {
            return Err(ParseError::at(
                number,
                format!("unknown directive: {directive}"),
            ));
        }

        if tokens[1..] == [Token::Open] {
            if !allows_block {
                return Err(ParseError::at(
                    number,
                    format!("{directive} directive does not allow a block"),
                ));
            }
            block = Some((directive.to_owned(), number));
            continue;
        }

        let args = words(number, &tokens[1..])?;
        apply(&mut manifest, number, directive, &args, comment)?;
    }

    if let Some((directive, opened_at)) = block {
        return Err(ParseError::at(
            opened_at,
            format!("unterminated {directive} block"),
        ));
    }

    Ok(manifest)
}
