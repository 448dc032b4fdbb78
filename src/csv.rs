/// Quotes a CSV field when it contains a delimiter, quote, or newline.
pub fn csv_quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn csv_record(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_quote(f))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_quote("Matemática"), "Matemática");
        assert_eq!(csv_quote("87.5"), "87.5");
    }

    #[test]
    fn commas_quotes_and_newlines_force_quoting() {
        assert_eq!(csv_quote("Silva, Ana"), "\"Silva, Ana\"");
        assert_eq!(csv_quote("said \"ok\""), "\"said \"\"ok\"\"\"");
        assert_eq!(csv_quote("line1\nline2"), "\"line1\nline2\"");
        assert_eq!(csv_quote("line1\rline2"), "\"line1\rline2\"");
    }

    #[test]
    fn record_joins_quoted_fields() {
        let fields = vec![
            "2025-03-15".to_string(),
            "Silva, Ana".to_string(),
            "History".to_string(),
        ];
        assert_eq!(csv_record(&fields), "2025-03-15,\"Silva, Ana\",History");
    }
}
