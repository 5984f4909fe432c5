use crate::constant::*;
use crate::error::DefinitionError;

const KEYWORDS: [&str; 52] = [
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "try", "type", "unsafe", "use", "where", "while",
    // Reserved for future use.
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "typeof",
    "unsized", "virtual", "yield",
];

/// Validate (and normalize) a destination.
/// The empty destination is let through as-is: it marks a declaration which never stores.
pub(crate) fn check_dest(dest: &str) -> Result<String, DefinitionError> {
    if dest.is_empty() {
        return Ok(String::default());
    }

    let dest = dest.replace('-', "_");
    let mut characters = dest.chars();
    let identifier = match characters.next() {
        Some(first) => {
            (first == '_' || first.is_alphabetic())
                && characters.all(|c| c == '_' || c.is_alphanumeric())
        }
        None => false,
    };

    if !identifier {
        return Err(DefinitionError::InvalidDestination(dest));
    }

    if KEYWORDS.contains(&dest.as_str()) {
        return Err(DefinitionError::ReservedDestination(dest));
    }

    Ok(dest)
}

pub(crate) fn check_reserved(decl: &str) -> Result<(), DefinitionError> {
    if decl.contains(RESERVED_CHARACTERS) {
        Err(DefinitionError::InvalidDeclaration(format!(
            "Declaration {decl} cannot contain any of {}.",
            RESERVED_CHARACTERS
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join(" ")
        )))
    } else {
        Ok(())
    }
}

/// Split option declarations into `(long_keys, short_keys)`.
pub(crate) fn parse_decls(decls: &[String]) -> Result<(Vec<String>, Vec<String>), DefinitionError> {
    if decls.is_empty() {
        return Err(DefinitionError::InvalidDeclaration(
            "No option defined.".to_string(),
        ));
    }

    let mut long_keys = Vec::default();
    let mut short_keys = Vec::default();

    for decl in decls {
        check_reserved(decl)?;

        if decl.contains('=') {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Option '{decl}' cannot contain '='."
            )));
        }

        let length = decl.chars().count();

        if decl.starts_with(LONG_PREFIX) {
            if length == LONG_PREFIX.len() {
                return Err(DefinitionError::InvalidDeclaration(format!(
                    "'{decl}' is not a valid long option."
                )));
            }

            if length <= LONG_PREFIX.len() + 1 {
                return Err(DefinitionError::InvalidDeclaration(format!(
                    "Long option '{decl}' is too short."
                )));
            }

            long_keys.push(decl.clone());
        } else if decl.starts_with(SHORT_PREFIX) {
            if length == SHORT_PREFIX.len() {
                return Err(DefinitionError::InvalidDeclaration(format!(
                    "'{decl}' is not a valid short option."
                )));
            }

            if length >= SHORT_PREFIX.len() + 2 {
                return Err(DefinitionError::InvalidDeclaration(format!(
                    "Short option '{decl}' is too long."
                )));
            }

            short_keys.push(decl.clone());
        } else {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Option must start with '{LONG_PREFIX}' or '{SHORT_PREFIX}', got '{decl}'."
            )));
        }
    }

    Ok((long_keys, short_keys))
}

/// The destination implied by the first long key, otherwise the first short key.
pub(crate) fn infer_dest(long_keys: &[String], short_keys: &[String]) -> Result<String, DefinitionError> {
    let stem = match (long_keys.first(), short_keys.first()) {
        (Some(long), _) => &long[LONG_PREFIX.len()..],
        (None, Some(short)) => &short[SHORT_PREFIX.len()..],
        (None, None) => {
            return Err(DefinitionError::InvalidDeclaration(
                "No option defined.".to_string(),
            ))
        }
    };

    check_dest(stem)
}
