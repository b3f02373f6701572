use sea_orm::{
    DatabaseBackend,
    sea_query::{ColumnRef, Condition, Expr, SimpleExpr},
};

use super::conditions::{PredicateContext, build_like_condition};

// Basic safety limit
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Full-text flavours behind `fts`, `plfts` and `phfts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSearchMode {
    /// Web-search syntax: quoted phrases, `-term` exclusions, `or` alternatives
    WebSearch,
    /// Every term must match
    Plain,
    /// The whole phrase must match
    Phrase,
}

impl TextSearchMode {
    const fn postgres_function(self) -> &'static str {
        match self {
            Self::WebSearch => "websearch_to_tsquery",
            Self::Plain => "plainto_tsquery",
            Self::Phrase => "phraseto_tsquery",
        }
    }
}

fn truncate_query(query: &str) -> &str {
    if query.len() <= MAX_SEARCH_QUERY_LENGTH {
        return query.trim();
    }
    let mut end = MAX_SEARCH_QUERY_LENGTH;
    while !query.is_char_boundary(end) {
        end -= 1;
    }
    query[..end].trim()
}

/// Build a full-text predicate on one column.
///
/// `PostgreSQL` gets a native `@@` match with the configured language. Other backends
/// fall back to case-insensitive substring matching with the same term semantics.
#[must_use]
pub fn build_fulltext_condition(
    mode: TextSearchMode,
    column: &ColumnRef,
    query: &str,
    context: PredicateContext<'_>,
) -> Condition {
    let query = truncate_query(query);
    match context.backend {
        DatabaseBackend::Postgres => Condition::all().add(build_postgres_fulltext_condition(
            mode,
            column,
            query,
            context.language,
        )),
        _ => build_fallback_fulltext_condition(mode, column, query),
    }
}

fn build_postgres_fulltext_condition(
    mode: TextSearchMode,
    column: &ColumnRef,
    query: &str,
    language: &str,
) -> SimpleExpr {
    Expr::cust_with_exprs(
        format!(
            "$1 @@ {}(CAST($2 AS regconfig), $3)",
            mode.postgres_function()
        ),
        [
            Expr::col(column.clone()).into(),
            Expr::val(language).into(),
            Expr::val(query).into(),
        ],
    )
}

fn build_fallback_fulltext_condition(mode: TextSearchMode, column: &ColumnRef, query: &str) -> Condition {
    match mode {
        TextSearchMode::Phrase => Condition::all().add(build_like_condition(column, query)),
        TextSearchMode::Plain => query
            .split_whitespace()
            .fold(Condition::all(), |condition, term| {
                condition.add(build_like_condition(column, term))
            }),
        TextSearchMode::WebSearch => {
            let groups = parse_websearch(query);
            if groups.is_empty() {
                return Condition::all();
            }
            groups.iter().fold(Condition::any(), |any, group| {
                any.add(group.iter().fold(Condition::all(), |all, term| {
                    let like = build_like_condition(column, &term.text);
                    if term.negated {
                        all.add(Condition::all().add(like).not())
                    } else {
                        all.add(like)
                    }
                }))
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WebTerm {
    text: String,
    negated: bool,
}

/// Split a web-search query into OR-groups of AND-ed terms.
fn parse_websearch(query: &str) -> Vec<Vec<WebTerm>> {
    let mut groups = Vec::new();
    let mut current: Vec<WebTerm> = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negated = false;
        if c == '-' {
            chars.next();
            match chars.peek() {
                Some(next) if !next.is_whitespace() => negated = true,
                _ => continue,
            }
        }

        let quoted = chars.peek() == Some(&'"');
        let mut text = String::new();
        if quoted {
            chars.next();
            for next in chars.by_ref() {
                if next == '"' {
                    break;
                }
                text.push(next);
            }
        } else {
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                text.push(next);
                chars.next();
            }
        }

        if !quoted && !negated && text.eq_ignore_ascii_case("or") {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            continue;
        }

        let text = text.trim().to_string();
        if !text.is_empty() {
            current.push(WebTerm { text, negated });
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Free-text `q`: case-insensitive substring match on any of `columns`.
///
/// Returns `None` for a blank query or when the entity has no searchable columns.
#[must_use]
pub fn build_free_text_condition(q: &str, columns: &[ColumnRef]) -> Option<Condition> {
    let q = truncate_query(q);
    if q.is_empty() || columns.is_empty() {
        return None;
    }
    Some(
        columns
            .iter()
            .fold(Condition::any(), |any, column| any.add(build_like_condition(column, q))),
    )
}
