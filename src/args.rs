use crate::error::CheckError;

/// Asset name endings to look for. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixList(Vec<String>);

impl SuffixList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Drop one leading and one trailing `'`, for shells that pass quotes through.
pub fn strip_quotes(raw: &str) -> &str {
    let s = raw.strip_prefix('\'').unwrap_or(raw);
    s.strip_suffix('\'').unwrap_or(s)
}

pub fn normalize_suffixes<I>(raw: I) -> Result<SuffixList, CheckError>
where
    I: IntoIterator<Item = String>,
{
    let suffixes: Vec<String> = raw
        .into_iter()
        .map(|arg| strip_quotes(&arg).to_string())
        .collect();
    if suffixes.is_empty() {
        return Err(CheckError::Usage);
    }
    tracing::debug!("args: suffixes={:?}", suffixes);
    Ok(SuffixList(suffixes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_at_most_one_quote_each_side() {
        assert_eq!(strip_quotes("'v1.0'"), "v1.0");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("'only-leading"), "only-leading");
        assert_eq!(strip_quotes("only-trailing'"), "only-trailing");
        assert_eq!(strip_quotes("''double''"), "'double'");
        assert_eq!(strip_quotes("in'side"), "in'side");
        assert_eq!(strip_quotes("'"), "");
    }

    #[test]
    fn keeps_order_and_interior() {
        let list = normalize_suffixes(strings(&["'.exe'", "-linux x64.tar.gz", "'.dmg"])).unwrap();
        let got: Vec<&str> = list.iter().collect();
        assert_eq!(got, vec![".exe", "-linux x64.tar.gz", ".dmg"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn empty_input_is_usage_error() {
        let err = normalize_suffixes(Vec::new()).unwrap_err();
        assert!(matches!(err, CheckError::Usage));
    }
}
