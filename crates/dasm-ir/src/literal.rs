//! Literal grammar for DASM data declarations.
//!
//! Values are parsed from whitespace-stripped text:
//!
//! - `num`: a finite float, e.g. `-1.5`
//! - `vec2` / `vec3`: a parenthesised tuple, e.g. `(1,2)`
//! - lists: a bracketed, comma-separated sequence of the above, e.g.
//!   `[1,2,3]` or `[(1,2),(3,4)]`
//!
//! Vector tuples never nest, so vector lists are split on the literal `),(`
//! separator instead of running a general parser.

use crate::data::DataValue;
use crate::error::{CompileError, Result, Span};
use crate::types::DataType;

/// Remove all whitespace.
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn parse_num(text: &str, span: Span) -> Result<f64> {
    let compact = compact(text);
    match compact.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CompileError::invalid_literal(text, "num", span)),
    }
}

/// Parse a `(a,b)` or `(a,b,c)` tuple with exactly `ty.width()` components.
pub fn parse_vector(text: &str, ty: DataType, span: Span) -> Result<DataValue> {
    let compact = compact(text);
    let invalid = || CompileError::invalid_literal(text, ty.name(), span);

    let inner = compact
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != ty.width() {
        return Err(invalid());
    }

    let mut components = [0.0; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = parse_num(part, span).map_err(|_| invalid())?;
    }

    match ty {
        DataType::Vec2 => Ok(DataValue::Vec2([components[0], components[1]])),
        DataType::Vec3 => Ok(DataValue::Vec3(components)),
        DataType::Num => Err(invalid()),
    }
}

/// Parse a single value of the given type.
pub fn parse_value(text: &str, ty: DataType, span: Span) -> Result<DataValue> {
    match ty {
        DataType::Num => parse_num(text, span).map(DataValue::Num),
        DataType::Vec2 | DataType::Vec3 => parse_vector(text, ty, span),
    }
}

/// Parse a bracketed list literal whose elements are all of type `ty`.
pub fn parse_list(text: &str, ty: DataType, span: Span) -> Result<Vec<DataValue>> {
    let compact = compact(text);
    let inner = compact
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| CompileError::invalid_literal(text, format!("{}[]", ty), span))?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    match ty {
        DataType::Num => inner
            .split(',')
            .map(|piece| parse_num(piece, span).map(DataValue::Num))
            .collect(),
        DataType::Vec2 | DataType::Vec3 => split_vector_list(inner)
            .iter()
            .map(|piece| parse_vector(piece, ty, span))
            .collect(),
    }
}

/// Split the inside of a vector list (`(1,2),(3,4)`) into its tuples,
/// each re-wrapped in parentheses (`["(1,2)", "(3,4)"]`).
///
/// Expects whitespace-stripped input. Malformed pieces are returned as-is
/// so that the tuple parser reports them.
pub fn split_vector_list(inner: &str) -> Vec<String> {
    let body = inner.strip_prefix('(').unwrap_or(inner);
    let body = body.strip_suffix(')').unwrap_or(body);
    body.split("),(").map(|piece| format!("({piece})")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn span() -> Span {
        Span::new(1, 1)
    }

    #[test]
    fn test_parse_num() {
        assert_eq!(parse_num("1", span()).unwrap(), 1.0);
        assert_eq!(parse_num(" -2.5 ", span()).unwrap(), -2.5);
        assert_eq!(parse_num("1e3", span()).unwrap(), 1000.0);
        assert_eq!(
            parse_num("abc", span()).unwrap_err().kind(),
            ErrorKind::InvalidLiteral
        );
        assert!(parse_num("", span()).is_err());
        assert!(parse_num("inf", span()).is_err());
        assert!(parse_num("NaN", span()).is_err());
    }

    #[test]
    fn test_parse_vector_arity() {
        assert_eq!(
            parse_vector("(1, 2)", DataType::Vec2, span()).unwrap(),
            DataValue::Vec2([1.0, 2.0])
        );
        assert_eq!(
            parse_vector("(1,2,3)", DataType::Vec3, span()).unwrap(),
            DataValue::Vec3([1.0, 2.0, 3.0])
        );
        assert!(parse_vector("(1,2,3)", DataType::Vec2, span()).is_err());
        assert!(parse_vector("(1,2)", DataType::Vec3, span()).is_err());
        assert!(parse_vector("1,2", DataType::Vec2, span()).is_err());
        assert!(parse_vector("(1,x)", DataType::Vec2, span()).is_err());
        assert!(parse_vector("(1,)", DataType::Vec2, span()).is_err());
    }

    #[test]
    fn test_split_vector_list() {
        assert_eq!(split_vector_list("(1,2),(3,4)"), vec!["(1,2)", "(3,4)"]);
        assert_eq!(split_vector_list("(1,2,3)"), vec!["(1,2,3)"]);
        assert_eq!(
            split_vector_list("(1,2),(3,4),(5,6)"),
            vec!["(1,2)", "(3,4)", "(5,6)"]
        );
    }

    #[test]
    fn test_split_vector_list_malformed_pieces_surface() {
        // A missing separator leaves a piece the tuple parser rejects.
        let pieces = split_vector_list("(1,2)(3,4)");
        assert_eq!(pieces, vec!["(1,2)(3,4)"]);
        assert!(parse_vector(&pieces[0], DataType::Vec2, span()).is_err());
    }

    #[test]
    fn test_parse_num_list() {
        assert_eq!(
            parse_list("[0, 1, 5]", DataType::Num, span()).unwrap(),
            vec![DataValue::Num(0.0), DataValue::Num(1.0), DataValue::Num(5.0)]
        );
        assert_eq!(parse_list("[]", DataType::Num, span()).unwrap(), vec![]);
        assert!(parse_list("0,1", DataType::Num, span()).is_err());
        assert!(parse_list("[0,,1]", DataType::Num, span()).is_err());
    }

    #[test]
    fn test_parse_vector_list_with_whitespace() {
        assert_eq!(
            parse_list("[ (1, 2) , (3,4) ]", DataType::Vec2, span()).unwrap(),
            vec![DataValue::Vec2([1.0, 2.0]), DataValue::Vec2([3.0, 4.0])]
        );
        assert!(parse_list("[(1,2),(3,4,5)]", DataType::Vec2, span()).is_err());
    }

    #[test]
    fn test_vector_list_reserialises() {
        let values = parse_list("[(1,2),(3,4)]", DataType::Vec2, span()).unwrap();
        let text = format!(
            "[{}]",
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        assert_eq!(text, "[(1,2),(3,4)]");
        assert_eq!(parse_list(&text, DataType::Vec2, span()).unwrap(), values);
    }
}
